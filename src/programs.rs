use crate::parser::parse;
use crate::table::TransitionTable;
use crate::types::{MachineError, Mode};
use log::error;

// Built-in programs as (name, sample tape, source), sorted by name
const PROGRAM_TEXTS: [(&str, &str, &str); 5] = [
    (
        "binary-increment",
        "1011",
        include_str!("../programs/binary-increment.tm"),
    ),
    (
        "busy-beaver-2",
        "",
        include_str!("../programs/busy-beaver-2.tm"),
    ),
    (
        "even-parity",
        "1001",
        include_str!("../programs/even-parity.tm"),
    ),
    (
        "palindrome",
        "10101",
        include_str!("../programs/palindrome.tm"),
    ),
    (
        "unary-increment",
        "111",
        include_str!("../programs/unary-increment.tm"),
    ),
];

/// A parsed built-in program.
#[derive(Debug, Clone)]
pub struct Program {
    pub name: String,
    /// A tape the program is meant to be tried on.
    pub sample_tape: String,
    pub source: &'static str,
    pub table: TransitionTable,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = load_builtin();
}

fn load_builtin() -> Vec<Program> {
    PROGRAM_TEXTS
        .iter()
        .filter_map(|&(name, sample_tape, source)| match parse(source, Mode::Strict) {
            Ok(table) => Some(Program {
                name: name.to_string(),
                sample_tape: sample_tape.to_string(),
                source,
                table,
            }),
            Err(e) => {
                error!("Failed to parse built-in program {name}: {e}");
                None
            }
        })
        .collect()
}

pub struct ProgramManager;

impl ProgramManager {
    /// Get the number of available programs
    pub fn count() -> usize {
        PROGRAMS.len()
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<Program, MachineError> {
        PROGRAMS
            .get(index)
            .cloned()
            .ok_or_else(|| MachineError::UnknownProgram(format!("index {index} out of range")))
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, MachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| MachineError::UnknownProgram(format!("'{name}' not found")))
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS
            .iter()
            .map(|program| program.name.clone())
            .collect()
    }

    /// Get information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, MachineError> {
        let program = Self::get_program_by_index(index)?;

        Ok(ProgramInfo {
            index,
            name: program.name,
            sample_tape: program.sample_tape,
            state_count: program.table.states().len(),
            rule_count: program.table.len(),
        })
    }

    /// Search for programs by name
    pub fn search_programs(query: &str) -> Vec<usize> {
        let query = query.to_lowercase();

        PROGRAMS
            .iter()
            .enumerate()
            .filter(|(_, program)| program.name.to_lowercase().contains(&query))
            .map(|(index, _)| index)
            .collect()
    }

    /// Get the original text of a program by its index
    pub fn get_program_text_by_index(index: usize) -> Result<&'static str, MachineError> {
        PROGRAMS
            .get(index)
            .map(|program| program.source)
            .ok_or_else(|| MachineError::UnknownProgram(format!("index {index} out of range")))
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub sample_tape: String,
    pub state_count: usize,
    pub rule_count: usize,
}
