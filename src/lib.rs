//! This crate provides the core logic for a single-tape deterministic Turing Machine
//! simulator: an unbounded tape, the transition engine, and a loader for `.tur` program
//! files with a small collection of built-in programs.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `TuringMachine` struct from the machine module.
pub use machine::TuringMachine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports the shared types from the types module.
pub use types::{
    Configuration, Direction, Halt, Program, Step, Transition, TransitionTable,
    TuringMachineError, DEFAULT_BLANK_SYMBOL, DEFAULT_MAX_STEPS, MAX_PROGRAM_SIZE,
};
