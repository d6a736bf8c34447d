//! Built-in programs shipped with the crate.

use crate::machine::TuringMachine;
use crate::tape::Tape;
use crate::types::{Program, TuringMachineError};

use std::sync::{RwLock, RwLockReadGuard};

/// Name of the built-in palindrome checker.
pub const PALINDROME: &str = "Palindrome Checker";
/// Symbol the palindrome checker expects after its input.
pub const PALINDROME_END_MARKER: char = '#';
/// State the palindrome checker ends in when the input is a palindrome.
pub const PALINDROME_ACCEPT: &str = "q_accept";

// Embedded sources, in registry order.
const PROGRAM_TEXTS: [&str; 3] = [
    include_str!("../programs/palindrome.tur"),
    include_str!("../programs/binary-increment.tur"),
    include_str!("../programs/busy-beaver-2.tur"),
];

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<Program>> = RwLock::new(Vec::new());
}

fn lock_error(what: &str) -> TuringMachineError {
    TuringMachineError::FileError(format!("Program registry {} lock poisoned", what))
}

fn not_found(name: &str) -> TuringMachineError {
    TuringMachineError::ValidationError(format!("Program '{}' not found", name))
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded programs into the registry, replacing its contents.
    ///
    /// The registry index of a program is the index of its text in the embedded
    /// sources, so a built-in that fails to parse fails the whole load.
    pub fn load() -> Result<(), TuringMachineError> {
        let programs = PROGRAM_TEXTS
            .iter()
            .map(|text| crate::parser::parse(text))
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(count = programs.len(), "loaded built-in programs");
        *PROGRAMS.write().map_err(|_| lock_error("write"))? = programs;

        Ok(())
    }

    /// Loads the registry on first use.
    fn ensure_loaded() -> Result<(), TuringMachineError> {
        if PROGRAMS.read().map_err(|_| lock_error("read"))?.is_empty() {
            Self::load()?;
        }

        Ok(())
    }

    /// Read access to the loaded registry.
    fn programs() -> Result<RwLockReadGuard<'static, Vec<Program>>, TuringMachineError> {
        Self::ensure_loaded()?;
        PROGRAMS.read().map_err(|_| lock_error("read"))
    }

    pub fn get_program_count() -> Result<usize, TuringMachineError> {
        Ok(Self::programs()?.len())
    }

    pub fn get_program_by_index(index: usize) -> Result<Program, TuringMachineError> {
        Self::programs()?.get(index).cloned().ok_or_else(|| {
            TuringMachineError::ValidationError(format!("Program index {} out of range", index))
        })
    }

    /// Position of the built-in called `name` in the registry.
    pub fn find_program(name: &str) -> Result<usize, TuringMachineError> {
        Self::programs()?
            .iter()
            .position(|program| program.name == name)
            .ok_or_else(|| not_found(name))
    }

    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        Self::get_program_by_index(Self::find_program(name)?)
    }

    /// The built-in palindrome checker.
    pub fn palindrome() -> Result<Program, TuringMachineError> {
        Self::get_program_by_name(PALINDROME)
    }

    /// A palindrome checker loaded with `input`, ready to run.
    ///
    /// The input is taken literally (`_` is not a blank here); see [`palindrome_input`].
    pub fn palindrome_machine(input: &str) -> Result<TuringMachine, TuringMachineError> {
        let program = Self::palindrome()?;
        let mut machine = TuringMachine::from_program(&program);
        machine.load_tape(Tape::new(&palindrome_input(input)?, program.blank));

        Ok(machine)
    }

    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            state_count: program.states().len(),
            transition_count: program.rules.len(),
            name: program.name,
            initial_state: program.initial_state,
            initial_tape: program.tape,
        })
    }

    /// Indices of the programs whose name contains `query`, ignoring case.
    pub fn search_programs(query: &str) -> Result<Vec<usize>, TuringMachineError> {
        let query = query.to_lowercase();

        Ok(Self::programs()?
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect())
    }

    /// The `.tur` source of the built-in called `name`.
    pub fn get_program_text(name: &str) -> Result<&'static str, TuringMachineError> {
        let index = Self::find_program(name)?;

        PROGRAM_TEXTS.get(index).copied().ok_or_else(|| not_found(name))
    }
}

/// Turns raw user input into the palindrome checker's tape: trimmed, lowercased and
/// terminated by the end marker.
///
/// Input that already contains the end marker is rejected, since the checker would
/// stop comparing at the first marker.
pub fn palindrome_input(input: &str) -> Result<String, TuringMachineError> {
    let mut tape = input.trim().to_lowercase();

    if tape.contains(PALINDROME_END_MARKER) {
        return Err(TuringMachineError::ValidationError(format!(
            "Input must not contain the end marker '{}'",
            PALINDROME_END_MARKER
        )));
    }

    tape.push(PALINDROME_END_MARKER);
    Ok(tape)
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub initial_state: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub transition_count: usize,
}
