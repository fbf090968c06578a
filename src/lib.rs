//! This crate provides the core logic for a single-tape Turing machine interpreter.
//! It includes modules for parsing transition programs, running them on a growable tape,
//! analyzing programs for likely mistakes, and managing a catalog of built-in programs.

pub mod analyzer;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `Diagnostic` enum from the analyzer module.
pub use analyzer::{analyze, Diagnostic};
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the `Machine` struct and its `Snapshot` from the machine module.
pub use machine::{Machine, Snapshot};
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramInfo, ProgramManager, PROGRAMS};
pub use table::TransitionTable;
pub use tape::{Tape, TapeInput};
/// Re-exports the types shared by the parser, the tape and the machine.
pub use types::{
    Component, Direction, Field, MachineError, Mode, Outcome, Step, Symbol, Transition,
    Verdict, BLANK_SYMBOL, MAX_PROGRAM_SIZE, WILDCARD,
};
