//! This module provides the parser for transition programs, utilizing the `pest` crate.
//! The grammar in `grammar.pest` only splits the source into lines of tokens; this module
//! turns each line into a `Transition` and builds the `TransitionTable`.

use crate::{
    table::TransitionTable,
    types::{Direction, Field, MachineError, Mode, Symbol, Transition},
};
use log::warn;
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the program grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct ProgramParser;

/// Parses program text into a `TransitionTable`.
///
/// Blank lines and comments are skipped. Every other line must hold exactly five
/// whitespace-separated fields. Duplicate `(state, symbol)` keys are resolved by `mode`:
/// the later rule wins in [`Mode::Normal`], and loading fails in [`Mode::Strict`].
///
/// # Returns
///
/// * `Ok(TransitionTable)` if every line is a valid instruction.
/// * `Err(MachineError::ProgramSyntax)` naming the first bad line and field.
/// * `Err(MachineError::DuplicateRule)` for a repeated key in strict mode.
pub fn parse(input: &str, mode: Mode) -> Result<TransitionTable, MachineError> {
    let root = ProgramParser::parse(Rule::program, input)
        .map_err(|e| MachineError::Grammar(Box::new(e)))?
        .next()
        .ok_or_else(|| syntax_error(1, Field::CurrentState, "empty parse tree"))?;

    let mut table = TransitionTable::new();

    // Every line of the source yields one `line` pair, including blank ones, so the
    // position among them is the line number whatever the line terminator was.
    let lines = root.into_inner().filter(|pair| pair.as_rule() == Rule::line);

    for (index, pair) in lines.enumerate() {
        let Some(transition) = parse_line(pair, index + 1)? else {
            continue;
        };

        if let Some(existing) = table.get(&transition.state, transition.read) {
            match mode {
                Mode::Strict => {
                    return Err(MachineError::DuplicateRule {
                        state: transition.state,
                        symbol: transition.read,
                        line: transition.line,
                        first_line: existing.line,
                    });
                }
                Mode::Normal => warn!(
                    "line {}: rule for ({}, '{}') replaces the one on line {}",
                    transition.line, transition.state, transition.read, existing.line
                ),
            }
        }

        table.insert(transition);
    }

    Ok(table)
}

/// Parses one `line` pair. Returns `Ok(None)` for lines with no tokens.
fn parse_line(pair: Pair<Rule>, line: usize) -> Result<Option<Transition>, MachineError> {
    let tokens: Vec<&str> = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::token)
        .map(|p| p.as_str())
        .collect();

    match tokens.len() {
        0 => return Ok(None),
        n if n < Field::ALL.len() => {
            return Err(syntax_error(
                line,
                Field::ALL[n],
                &format!("expected 5 fields, found {n}"),
            ));
        }
        n if n > Field::ALL.len() => {
            return Err(syntax_error(
                line,
                Field::NextState,
                &format!("unexpected trailing token '{}'", tokens[Field::ALL.len()]),
            ));
        }
        _ => {}
    }

    let read = parse_symbol(tokens[1], line, Field::InputSymbol)?;
    let write = parse_symbol(tokens[2], line, Field::WriteSymbol)?;
    let direction = Direction::from_token(tokens[3]).ok_or_else(|| {
        syntax_error(
            line,
            Field::Direction,
            &format!("unsupported direction '{}', expected l, r or *", tokens[3]),
        )
    })?;

    Ok(Some(Transition {
        state: tokens[0].to_string(),
        read,
        write,
        direction,
        next_state: tokens[4].to_string(),
        line,
    }))
}

/// Parses a token that must be a single character.
fn parse_symbol(token: &str, line: usize, field: Field) -> Result<Symbol, MachineError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(symbol), None) => Ok(symbol),
        _ => Err(syntax_error(
            line,
            field,
            &format!("invalid symbol '{token}', symbols must be exactly one character"),
        )),
    }
}

/// Creates a `MachineError::ProgramSyntax` for `line` and `field`.
fn syntax_error(line: usize, field: Field, message: &str) -> MachineError {
    MachineError::ProgramSyntax {
        line,
        field,
        message: message.to_string(),
    }
}

impl std::str::FromStr for TransitionTable {
    type Err = MachineError;

    /// Parses in [`Mode::Normal`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s, Mode::Normal)
    }
}
