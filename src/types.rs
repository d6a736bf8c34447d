//! This module defines the core data structures and types shared by the tape, the machine
//! and the program loader: directions, transition tables, programs, configuration
//! snapshots, execution results and the error type.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::Rule;

/// The default blank symbol used on the tape.
pub const DEFAULT_BLANK_SYMBOL: char = ' ';
/// A special input symbol used in program definitions to represent the blank symbol.
pub const INPUT_BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a program definition in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The default step budget for [`crate::TuringMachine::run`].
pub const DEFAULT_MAX_STEPS: usize = 1000;

/// Represents the possible directions the tape head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl FromStr for Direction {
    type Err = TuringMachineError;

    /// Parses `L`/`<` as [`Direction::Left`] and `R`/`>` as [`Direction::Right`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" | "<" => Ok(Direction::Left),
            "R" | ">" => Ok(Direction::Right),
            other => Err(TuringMachineError::InvalidDirection(other.to_string())),
        }
    }
}

impl TryFrom<char> for Direction {
    type Error = TuringMachineError;

    fn try_from(c: char) -> Result<Self, Self::Error> {
        c.to_string().parse()
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Left => write!(f, "L"),
            Direction::Right => write!(f, "R"),
        }
    }
}

/// The action taken when a rule fires: the symbol to write, where to move the head,
/// and the state to enter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The next state the machine transitions to.
    pub next_state: String,
    /// The symbol written under the head.
    pub write: char,
    /// The direction the head moves after writing.
    pub direction: Direction,
}

impl Transition {
    pub fn new(next_state: impl Into<String>, write: char, direction: Direction) -> Self {
        Self {
            next_state: next_state.into(),
            write,
            direction,
        }
    }
}

/// A deterministic transition table keyed on `(state, symbol)`.
///
/// Each key maps to at most one [`Transition`]. A missing key is not an error: it is
/// the condition under which the machine halts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionTable {
    rules: HashMap<(String, char), Transition>,
}

impl TransitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule, returning the transition it replaced (if any).
    pub fn insert(
        &mut self,
        state: impl Into<String>,
        symbol: char,
        transition: Transition,
    ) -> Option<Transition> {
        self.rules.insert((state.into(), symbol), transition)
    }

    /// Builder-style variant of [`TransitionTable::insert`].
    ///
    /// ```
    /// use tape_machine::{Direction, TransitionTable};
    ///
    /// let table = TransitionTable::new().rule("q0", '#', "q_accept", '#', Direction::Right);
    /// assert!(table.get("q0", '#').is_some());
    /// ```
    pub fn rule(
        mut self,
        state: impl Into<String>,
        symbol: char,
        next_state: impl Into<String>,
        write: char,
        direction: Direction,
    ) -> Self {
        self.insert(state, symbol, Transition::new(next_state, write, direction));
        self
    }

    /// Looks up the transition for a state and the symbol under the head.
    pub fn get(&self, state: &str, symbol: char) -> Option<&Transition> {
        // Tuple keys can't be borrowed as (&str, char), so the lookup allocates.
        self.rules.get(&(state.to_string(), symbol))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Iterates over all `(state, symbol, transition)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, char, &Transition)> {
        self.rules
            .iter()
            .map(|((state, symbol), t)| (state.as_str(), *symbol, t))
    }

    /// Returns every state that has at least one outgoing rule, sorted.
    pub fn states(&self) -> BTreeSet<&str> {
        self.rules.keys().map(|(state, _)| state.as_str()).collect()
    }
}

/// A complete machine definition as read from a `.tur` program file.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// The name of the program.
    pub name: String,
    /// The state the machine starts in.
    pub initial_state: String,
    /// States that end a run successfully.
    pub final_states: BTreeSet<String>,
    /// The initial tape content, with input blanks already rewritten.
    pub tape: String,
    /// The blank symbol that fills unvisited cells.
    pub blank: char,
    /// The transition rules.
    pub rules: TransitionTable,
}

impl Program {
    /// Returns every state named anywhere in the program, sorted.
    pub fn states(&self) -> BTreeSet<&str> {
        let mut states = self.rules.states();
        states.insert(&self.initial_state);
        states.extend(self.final_states.iter().map(String::as_str));
        states.extend(self.rules.iter().map(|(_, _, t)| t.next_state.as_str()));
        states
    }
}

/// A snapshot of the machine: current state, full tape contents and head position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub state: String,
    pub tape: String,
    pub head: isize,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "State: {}", self.state)?;
        writeln!(f, "Tape: {}", self.tape)?;
        write!(f, "Head: {}", self.head)
    }
}

/// Represents the outcome of a single execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// A transition fired.
    Continue,
    /// The machine did not change.
    Halt(Halt),
}

/// Why a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The machine reached one of its final states.
    Final,
    /// No rule matches the current state and symbol.
    NoTransition,
    /// The step budget was spent before reaching a final state.
    StepLimit,
}

impl Halt {
    /// Returns `true` if the run ended in a final state.
    pub fn is_accepted(&self) -> bool {
        matches!(self, Halt::Final)
    }
}

/// Represents various errors that can occur while building or loading a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// A head movement other than left or right was requested.
    #[error("Invalid direction: {0:?} (expected 'L' or 'R')")]
    InvalidDirection(String),
    /// Indicates an error during the parsing of a program definition.
    #[error("Program parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error during the validation of a program's structure or logic.
    #[error("Program validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to reading program files.
    #[error("File error: {0}")]
    FileError(String),
}
