//! This module defines the core data structures and types used throughout the interpreter,
//! including symbols, transition rules, run outcomes, and the error type.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// A single tape symbol.
pub type Symbol = char;

/// The blank symbol, used for padding and for every newly materialized cell.
pub const BLANK_SYMBOL: Symbol = '_';
/// The symbol used to render blanks in a final tape.
pub const DISPLAY_BLANK_SYMBOL: char = ' ';
/// The wildcard. Means "any" when read, "unchanged" when written.
pub const WILDCARD: Symbol = '*';
/// The wildcard as a state name.
pub const WILDCARD_STATE: &str = "*";
/// The mandatory initial state.
pub const START_STATE: &str = "start";
/// Halting state that yields [`Verdict::Accept`].
pub const HALT_ACCEPT: &str = "halt-accept";
/// Halting state that yields [`Verdict::Reject`].
pub const HALT_REJECT: &str = "halt-reject";
/// Halting state that yields [`Verdict::Undetermined`].
pub const HALT: &str = "halt";
/// The storage index of the first content cell after padding.
pub const INITIAL_HEAD: usize = 1;
/// The maximum allowed size for a program in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB

/// Returns `true` if `state` is one of the three halting states.
pub fn is_halting(state: &str) -> bool {
    matches!(state, HALT_ACCEPT | HALT_REJECT | HALT)
}

/// Controls how a program load treats two rules sharing the same `(state, symbol)` key.
///
/// - `Normal` (default): the later rule replaces the earlier one.
/// - `Strict`: the duplicate is reported as [`MachineError::DuplicateRule`].
#[derive(Debug, Default, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Mode {
    /// Last write wins.
    #[default]
    Normal,
    /// Duplicate keys are errors.
    Strict,
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

impl Direction {
    /// Parses `l`, `r` or `*` (case-insensitive).
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "l" | "L" => Some(Direction::Left),
            "r" | "R" => Some(Direction::Right),
            "*" => Some(Direction::Stay),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            Direction::Left => 'l',
            Direction::Right => 'r',
            Direction::Stay => '*',
        };
        write!(f, "{c}")
    }
}

/// A single transition rule.
///
/// The rule is keyed on `(state, read)`. Either may be the wildcard. A `write` of
/// [`WILDCARD`] leaves the cell untouched and a `next_state` of [`WILDCARD_STATE`]
/// keeps the machine in whatever state it was in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// The state this rule applies to.
    pub state: String,
    /// The symbol this rule applies to.
    pub read: Symbol,
    /// The symbol written under the head.
    pub write: Symbol,
    /// Where the head moves after writing.
    pub direction: Direction,
    /// The state the machine moves to.
    pub next_state: String,
    /// 1-based line in the program source, 0 for rules built in code.
    pub line: usize,
}

impl Transition {
    /// The state the machine ends up in when this rule fires from `current`.
    pub fn target<'a>(&'a self, current: &'a str) -> &'a str {
        if self.next_state == WILDCARD_STATE {
            current
        } else {
            &self.next_state
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {}",
            self.state, self.read, self.write, self.direction, self.next_state
        )
    }
}

/// The fields of an instruction line, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    CurrentState,
    InputSymbol,
    WriteSymbol,
    Direction,
    NextState,
}

impl Field {
    /// All fields in the order they appear on a line.
    pub const ALL: [Field; 5] = [
        Field::CurrentState,
        Field::InputSymbol,
        Field::WriteSymbol,
        Field::Direction,
        Field::NextState,
    ];
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::CurrentState => "current state",
            Field::InputSymbol => "input symbol",
            Field::WriteSymbol => "write symbol",
            Field::Direction => "move direction",
            Field::NextState => "next state",
        };
        f.write_str(name)
    }
}

/// The classification of a completed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Accept,
    Reject,
    Undetermined,
}

impl Verdict {
    /// Maps a halting state to its verdict. Returns `None` for any other state.
    pub fn from_state(state: &str) -> Option<Self> {
        match state {
            HALT_ACCEPT => Some(Verdict::Accept),
            HALT_REJECT => Some(Verdict::Reject),
            HALT => Some(Verdict::Undetermined),
            _ => None,
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Verdict::Accept => "ACCEPT",
            Verdict::Reject => "REJECT",
            Verdict::Undetermined => "UNDETERMINED",
        };
        f.write_str(name)
    }
}

/// Represents the outcome of a machine step or run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The machine can keep going.
    Continue,
    /// The machine reached a halting state.
    Halt(Verdict),
}

/// The result of a completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub verdict: Verdict,
    /// Final tape contents, trimmed, with blanks rendered as spaces.
    pub tape: String,
}

/// The machine component a lifecycle error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Tape,
    Program,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Tape => f.write_str("tape"),
            Component::Program => f.write_str("program"),
        }
    }
}

/// Represents various errors that can occur while loading or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    /// A tape symbol that is not exactly one character.
    ///
    /// Bad symbols in a program are reported as [`MachineError::ProgramSyntax`] instead,
    /// naming the line and the field.
    #[error("Invalid symbol '{0}': symbols must be exactly one character")]
    InvalidSymbol(String),
    /// A malformed instruction line.
    #[error("Syntax error on line {line} ({field}): {message}")]
    ProgramSyntax {
        line: usize,
        field: Field,
        message: String,
    },
    /// Two rules share a key while loading in [`Mode::Strict`].
    #[error("Duplicate rule for state {state} and symbol '{symbol}' on line {line} (first defined on line {first_line})")]
    DuplicateRule {
        state: String,
        symbol: Symbol,
        line: usize,
        first_line: usize,
    },
    /// A one-shot load was repeated.
    #[error("The {0} is already loaded")]
    AlreadyLoaded(Component),
    /// A step was requested after the machine halted.
    #[error("The machine has already halted")]
    AlreadyComplete,
    /// A step was requested before the tape or program was loaded.
    #[error("The machine is not ready: no {0} loaded")]
    NotReady(Component),
    /// A result was requested before the machine halted.
    #[error("The machine has not halted yet")]
    NotComplete,
    /// No rule resolves for the current state and symbol.
    #[error("No rule defined for state {state} and symbol '{symbol}'")]
    NoMatchingRule { state: String, symbol: Symbol },
    /// The program text could not be tokenized at all.
    #[error("Program parsing error: {0}")]
    Grammar(#[from] Box<pest::error::Error<Rule>>),
    /// A catalog lookup by index or name found nothing.
    #[error("Unknown program: {0}")]
    UnknownProgram(String),
    /// Reading a program from disk failed.
    #[error("File error: {0}")]
    FileError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        assert_eq!(left_json, "\"Left\"");

        let left: Direction = serde_json::from_str(&left_json).unwrap();
        assert_eq!(left, Direction::Left);
    }

    #[test]
    fn test_direction_tokens() {
        assert_eq!(Direction::from_token("l"), Some(Direction::Left));
        assert_eq!(Direction::from_token("R"), Some(Direction::Right));
        assert_eq!(Direction::from_token("*"), Some(Direction::Stay));
        assert_eq!(Direction::from_token("x"), None);
        assert_eq!(Direction::from_token("rr"), None);
    }

    #[test]
    fn test_transition_target() {
        let mut transition = Transition {
            state: "scan".to_string(),
            read: 'a',
            write: WILDCARD,
            direction: Direction::Right,
            next_state: WILDCARD_STATE.to_string(),
            line: 1,
        };
        assert_eq!(transition.target("scan"), "scan");

        transition.next_state = "done".to_string();
        assert_eq!(transition.target("scan"), "done");
        assert_eq!(transition.to_string(), "scan a * r done");
    }

    #[test]
    fn test_verdict_from_state() {
        assert_eq!(Verdict::from_state(HALT_ACCEPT), Some(Verdict::Accept));
        assert_eq!(Verdict::from_state(HALT_REJECT), Some(Verdict::Reject));
        assert_eq!(Verdict::from_state(HALT), Some(Verdict::Undetermined));
        assert_eq!(Verdict::from_state("halted"), None);
        assert!(is_halting("halt"));
        assert!(!is_halting(START_STATE));
    }

    #[test]
    fn test_error_display() {
        let error = MachineError::NoMatchingRule {
            state: "start".to_string(),
            symbol: 'x',
        };
        let error_msg = error.to_string();
        assert!(error_msg.contains("start"));
        assert!(error_msg.contains("'x'"));

        let error = MachineError::ProgramSyntax {
            line: 3,
            field: Field::WriteSymbol,
            message: "missing field".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Syntax error on line 3 (write symbol): missing field"
        );
    }
}
