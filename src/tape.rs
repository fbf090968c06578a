//! This module defines the `Tape`, an unbounded sequence of symbols that is materialized
//! lazily in both directions as the head walks off either end.

use crate::types::{
    Component, Direction, MachineError, Symbol, BLANK_SYMBOL, DISPLAY_BLANK_SYMBOL, INITIAL_HEAD,
    WILDCARD,
};
use std::collections::VecDeque;

/// Initial tape content, either as a raw string or as a sequence of symbol tokens.
///
/// A literal space in either form stands for the blank symbol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapeInput {
    /// Every character is one symbol.
    Raw(String),
    /// Every element must be exactly one character long.
    Symbols(Vec<String>),
}

impl TapeInput {
    /// Converts the input into tape symbols, rejecting any element that is not a single character.
    pub fn symbols(&self) -> Result<Vec<Symbol>, MachineError> {
        match self {
            TapeInput::Raw(raw) => Ok(raw.chars().map(map_blank).collect()),
            TapeInput::Symbols(tokens) => tokens
                .iter()
                .map(|token| {
                    let mut chars = token.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => Ok(map_blank(c)),
                        _ => Err(MachineError::InvalidSymbol(token.clone())),
                    }
                })
                .collect(),
        }
    }
}

impl From<&str> for TapeInput {
    fn from(raw: &str) -> Self {
        TapeInput::Raw(raw.to_string())
    }
}

impl From<String> for TapeInput {
    fn from(raw: String) -> Self {
        TapeInput::Raw(raw)
    }
}

impl From<Vec<String>> for TapeInput {
    fn from(tokens: Vec<String>) -> Self {
        TapeInput::Symbols(tokens)
    }
}

impl From<&[&str]> for TapeInput {
    fn from(tokens: &[&str]) -> Self {
        TapeInput::Symbols(tokens.iter().map(|t| t.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for TapeInput {
    fn from(tokens: [&str; N]) -> Self {
        TapeInput::Symbols(tokens.iter().map(|t| t.to_string()).collect())
    }
}

fn map_blank(c: char) -> Symbol {
    if c == DISPLAY_BLANK_SYMBOL {
        BLANK_SYMBOL
    } else {
        c
    }
}

/// A single tape.
///
/// Cells live in a deque so growth at either end is cheap. `prepended` counts how many
/// cells were added on the left since loading, which maps storage indices back to
/// stable logical positions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tape {
    cells: VecDeque<Symbol>,
    prepended: usize,
}

impl Tape {
    /// Creates an empty, unloaded tape.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the initial content, padded with one blank on each side.
    ///
    /// Fails with `AlreadyLoaded` if the tape already holds content, and with
    /// `InvalidSymbol` if any token is not a single character. A failed load leaves
    /// the tape untouched.
    pub fn load(&mut self, content: impl Into<TapeInput>) -> Result<(), MachineError> {
        if self.is_loaded() {
            return Err(MachineError::AlreadyLoaded(Component::Tape));
        }

        let symbols = content.into().symbols()?;

        self.cells.reserve(symbols.len() + 2);
        self.cells.push_back(BLANK_SYMBOL);
        self.cells.extend(symbols);
        self.cells.push_back(BLANK_SYMBOL);
        self.prepended = 0;

        Ok(())
    }

    /// Returns `true` once content has been loaded.
    pub fn is_loaded(&self) -> bool {
        !self.cells.is_empty()
    }

    /// Returns the symbol at `position`.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the materialized cells.
    pub fn read(&self, position: usize) -> Symbol {
        self.cells[position]
    }

    /// Writes `symbol` at `position`. Writing the wildcard leaves the cell unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `position` is outside the materialized cells.
    pub fn write(&mut self, position: usize, symbol: Symbol) {
        if symbol != WILDCARD {
            self.cells[position] = symbol;
        }
    }

    /// Moves a head at `position` one cell in `direction` and returns its new position,
    /// materializing one blank cell if the head would leave the tape.
    ///
    /// Moving left from index 0 prepends a cell and keeps the head at 0, so the head
    /// never goes negative.
    pub fn grow_and_move(&mut self, position: usize, direction: Direction) -> usize {
        match direction {
            Direction::Left => {
                if position == 0 {
                    self.cells.push_front(BLANK_SYMBOL);
                    self.prepended += 1;
                    0
                } else {
                    position - 1
                }
            }
            Direction::Right => {
                let position = position + 1;
                while position >= self.cells.len() {
                    self.cells.push_back(BLANK_SYMBOL);
                }
                position
            }
            Direction::Stay => position,
        }
    }

    /// Number of materialized cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if no cells are materialized.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Number of cells grown on the left since loading.
    pub fn prepended(&self) -> usize {
        self.prepended
    }

    /// Maps a storage index to a logical position, where 0 is the first input cell.
    pub fn logical(&self, position: usize) -> isize {
        position as isize - self.prepended as isize - INITIAL_HEAD as isize
    }

    /// Iterates over the materialized cells from left to right.
    pub fn cells(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.cells.iter().copied()
    }

    /// The tape contents with blanks rendered as spaces and trimmed from both ends.
    pub fn contents(&self) -> String {
        self.cells
            .iter()
            .map(|&c| {
                if c == BLANK_SYMBOL {
                    DISPLAY_BLANK_SYMBOL
                } else {
                    c
                }
            })
            .collect::<String>()
            .trim_matches(DISPLAY_BLANK_SYMBOL)
            .to_string()
    }

    /// Drops all content so the tape can be loaded again.
    pub(crate) fn clear(&mut self) {
        self.cells.clear();
        self.prepended = 0;
    }
}
