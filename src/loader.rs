//! This module provides the `ProgramLoader` struct, responsible for loading transition
//! programs from files, strings and whole directories.

use crate::parser::parse;
use crate::table::TransitionTable;
use crate::types::{MachineError, Mode, MAX_PROGRAM_SIZE};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// The file extension of program files.
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading programs.
/// It provides methods to read program sources from disk, parse them, and discover
/// every `.tm` file within a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Reads the source of a program file.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` with the file contents.
    /// * `Err(MachineError::FileError)` if the file cannot be read or exceeds
    ///   `MAX_PROGRAM_SIZE`.
    pub fn read_source(path: &Path) -> Result<String, MachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            MachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        if content.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::FileError(format!(
                "Program {} is {} bytes, the limit is {}",
                path.display(),
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        debug!("Read {} bytes from {}", content.len(), path.display());
        Ok(content)
    }

    /// Loads a single program from the specified file path.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if the file is successfully read and parsed.
    /// * `Err(MachineError::FileError)` if the file cannot be read.
    /// * `Err(MachineError::ProgramSyntax)` if the content is not a valid program.
    pub fn load_program(path: &Path, mode: Mode) -> Result<TransitionTable, MachineError> {
        let content = Self::read_source(path)?;
        parse(&content, mode)
    }

    /// Loads a single program from the provided string content.
    pub fn load_program_from_string(
        content: &str,
        mode: Mode,
    ) -> Result<TransitionTable, MachineError> {
        parse(content, mode)
    }

    /// Lists the program files (`.tm` extension) in a directory, sorted by file name.
    ///
    /// The position of a file in this list is its program index.
    pub fn list_programs(directory: &Path) -> Result<Vec<PathBuf>, MachineError> {
        let entries = fs::read_dir(directory).map_err(|e| {
            MachineError::FileError(format!(
                "Failed to read directory {}: {}",
                directory.display(),
                e
            ))
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let path = entry
                .map_err(|e| {
                    MachineError::FileError(format!("Failed to read directory entry: {}", e))
                })?
                .path();

            // Skip directories and non-.tm files
            if path.is_dir() || path.extension().is_none_or(|ext| ext != PROGRAM_EXTENSION) {
                continue;
            }

            paths.push(path);
        }

        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(paths)
    }

    /// Loads every program in a directory, in [`ProgramLoader::list_programs`] order.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, TransitionTable), MachineError>>` - one element per program
    ///   file, or a single error if the directory itself cannot be read.
    pub fn load_programs(
        directory: &Path,
        mode: Mode,
    ) -> Vec<Result<(PathBuf, TransitionTable), MachineError>> {
        let paths = match Self::list_programs(directory) {
            Ok(paths) => paths,
            Err(e) => return vec![Err(e)],
        };

        paths
            .into_iter()
            .map(|path| match Self::load_program(&path, mode) {
                Ok(table) => Ok((path, table)),
                Err(e) => Err(MachineError::FileError(format!(
                    "Failed to load program from {}: {}",
                    path.display(),
                    e
                ))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(path: &Path, content: &str) {
        let mut file = File::create(path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_load_valid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.tm");
        write_file(&file_path, "# test\nstart a b r halt\n");

        let table = ProgramLoader::load_program(&file_path, Mode::Normal).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("start", 'a').unwrap().write, 'b');
    }

    #[test]
    fn test_load_invalid_program() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("invalid.tm");
        write_file(&file_path, "This is not a valid program");

        let result = ProgramLoader::load_program(&file_path, Mode::Normal);
        assert!(matches!(
            result,
            Err(MachineError::ProgramSyntax { line: 1, .. })
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let result = ProgramLoader::load_program(&dir.path().join("missing.tm"), Mode::Normal);
        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_load_oversized_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("big.tm");
        write_file(&file_path, &"#".repeat(MAX_PROGRAM_SIZE + 1));

        let result = ProgramLoader::read_source(&file_path);
        assert!(matches!(result, Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_list_programs_sorted() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("b-second.tm"), "start a a r halt");
        write_file(&dir.path().join("a-first.tm"), "start a a r halt");
        write_file(&dir.path().join("notes.txt"), "ignored");
        fs::create_dir(dir.path().join("nested.tm")).unwrap();

        let paths = ProgramLoader::list_programs(dir.path()).unwrap();
        let names: Vec<_> = paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();

        assert_eq!(names, vec!["a-first.tm", "b-second.tm"]);
    }

    #[test]
    fn test_load_programs_from_directory() {
        let dir = tempdir().unwrap();
        write_file(&dir.path().join("valid.tm"), "start a b r halt");
        write_file(&dir.path().join("invalid.tm"), "start a");
        write_file(&dir.path().join("ignored.txt"), "This file should be ignored");

        let results = ProgramLoader::load_programs(dir.path(), Mode::Normal);
        assert_eq!(results.len(), 2);

        // Sorted by name: invalid.tm comes first
        assert!(results[0].is_err());
        assert!(results[1].is_ok());
    }

    #[test]
    fn test_load_programs_missing_directory() {
        let dir = tempdir().unwrap();
        let results = ProgramLoader::load_programs(&dir.path().join("nope"), Mode::Normal);

        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(MachineError::FileError(_))));
    }

    #[test]
    fn test_load_program_from_string_strict() {
        let result = ProgramLoader::load_program_from_string(
            "start a a r halt\nstart a b r halt",
            Mode::Strict,
        );
        assert!(matches!(result, Err(MachineError::DuplicateRule { .. })));
    }
}
