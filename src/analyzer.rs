//! This module provides functions for analyzing programs to detect common errors before
//! execution: an unusable start state, final states nothing leads to, unreachable states,
//! and tape symbols no rule reads.
//!
//! A missing rule is never reported here. The machine halts on it, which is normal.

use crate::types::{Program, TuringMachineError};
use std::collections::{BTreeSet, VecDeque};

/// Represents the problems that can be found during the analysis of a program.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// The initial state has no rules and is not final, so the machine can never move.
    InvalidStartState(String),
    /// Final states that are neither the initial state nor the target of any rule.
    UnreachableFinalStates(Vec<String>),
    /// States with rules that cannot be reached from the initial state.
    UnreachableStates(Vec<String>),
    /// Symbols on the initial tape that no rule reads.
    InvalidTapeSymbols(Vec<char>),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::InvalidStartState(state) => {
                TuringMachineError::ValidationError(format!("Invalid start state: {}", state))
            }
            AnalysisError::UnreachableFinalStates(states) => TuringMachineError::ValidationError(
                format!("Final states never entered by any rule: {:?}", states),
            ),
            AnalysisError::UnreachableStates(states) => TuringMachineError::ValidationError(
                format!("Unreachable states detected: {:?}", states),
            ),
            AnalysisError::InvalidTapeSymbols(symbols) => {
                TuringMachineError::ValidationError(format!(
                    "Initial tape contains symbols not handled by any transition: {:?}",
                    symbols
                ))
            }
        }
    }
}

/// Analyzes a `Program` for logical errors.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(TuringMachineError::ValidationError)` describing the first problem found.
pub fn analyze(program: &Program) -> Result<(), TuringMachineError> {
    [
        check_valid_start_state,
        check_final_states,
        check_unreachable_states,
        check_tape_symbols,
    ]
    .iter()
    .try_for_each(|check| check(program))
    .map_err(Into::into)
}

/// Checks that the initial state can do something: it either has rules or is final.
fn check_valid_start_state(program: &Program) -> Result<(), AnalysisError> {
    let has_rules = program.rules.states().contains(program.initial_state.as_str());

    if !has_rules && !program.final_states.contains(&program.initial_state) {
        return Err(AnalysisError::InvalidStartState(
            program.initial_state.clone(),
        ));
    }

    Ok(())
}

/// Checks that every final state can actually be entered.
fn check_final_states(program: &Program) -> Result<(), AnalysisError> {
    let targets: BTreeSet<&str> = program
        .rules
        .iter()
        .map(|(_, _, t)| t.next_state.as_str())
        .collect();

    // BTreeSet iteration keeps the report sorted.
    let invalid: Vec<String> = program
        .final_states
        .iter()
        .filter(|state| **state != program.initial_state && !targets.contains(state.as_str()))
        .cloned()
        .collect();

    if !invalid.is_empty() {
        return Err(AnalysisError::UnreachableFinalStates(invalid));
    }

    Ok(())
}

/// Checks for states with rules that cannot be reached from the initial state.
fn check_unreachable_states(program: &Program) -> Result<(), AnalysisError> {
    let mut reachable = BTreeSet::new();
    let mut queue = VecDeque::from([program.initial_state.as_str()]);

    while let Some(state) = queue.pop_front() {
        if !reachable.insert(state) {
            continue;
        }

        queue.extend(
            program
                .rules
                .iter()
                .filter(|(from, _, _)| *from == state)
                .map(|(_, _, t)| t.next_state.as_str()),
        );
    }

    let unreachable: Vec<String> = program
        .rules
        .states()
        .into_iter()
        .filter(|state| !reachable.contains(state))
        .map(String::from)
        .collect();

    if !unreachable.is_empty() {
        return Err(AnalysisError::UnreachableStates(unreachable));
    }

    Ok(())
}

/// Checks that every symbol on the initial tape is read by at least one rule.
fn check_tape_symbols(program: &Program) -> Result<(), AnalysisError> {
    let handled: BTreeSet<char> = program.rules.iter().map(|(_, symbol, _)| symbol).collect();

    let invalid: BTreeSet<char> = program
        .tape
        .chars()
        .filter(|symbol| *symbol != program.blank && !handled.contains(symbol))
        .collect();

    if !invalid.is_empty() {
        return Err(AnalysisError::InvalidTapeSymbols(
            invalid.into_iter().collect(),
        ));
    }

    Ok(())
}
