//! This module provides static checks over a loaded program to surface likely mistakes
//! before execution: a missing `start`, no way to halt, unreachable or dead-end states,
//! and tape symbols nothing reads. Findings are warnings; none of them stops a run.

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{is_halting, Symbol, BLANK_SYMBOL, START_STATE, WILDCARD, WILDCARD_STATE};
use std::collections::BTreeSet;
use std::fmt;

/// A single finding of the analyzer.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Diagnostic {
    /// No rule can fire from the initial state.
    MissingStart,
    /// No rule ever moves the machine into a halting state.
    NoHaltingState,
    /// States that own rules but can never be entered from `start`.
    UnreachableStates(Vec<String>),
    /// Non-halting states that are entered but have no rules to continue with.
    DeadEndStates(Vec<String>),
    /// Tape symbols that no rule reads.
    UnhandledTapeSymbols(Vec<Symbol>),
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MissingStart => {
                write!(f, "No rule applies to the initial state '{START_STATE}'")
            }
            Diagnostic::NoHaltingState => {
                write!(f, "No rule leads to a halting state")
            }
            Diagnostic::UnreachableStates(states) => {
                write!(f, "Unreachable states detected: {states:?}")
            }
            Diagnostic::DeadEndStates(states) => {
                write!(f, "States without outgoing rules: {states:?}")
            }
            Diagnostic::UnhandledTapeSymbols(symbols) => {
                write!(f, "Tape contains symbols not handled by any rule: {symbols:?}")
            }
        }
    }
}

type Check = fn(&TransitionTable, Option<&Tape>) -> Option<Diagnostic>;

/// Analyzes a transition table, and optionally the tape it will run on.
///
/// # Returns
///
/// Every diagnostic found, in a fixed order. An empty vector means nothing looked wrong.
pub fn analyze(table: &TransitionTable, tape: Option<&Tape>) -> Vec<Diagnostic> {
    let checks: [Check; 5] = [
        check_start,
        check_halting,
        check_unreachable_states,
        check_dead_ends,
        check_tape_symbols,
    ];

    checks.iter().filter_map(|check| check(table, tape)).collect()
}

/// Checks that some rule applies in `start`, either directly or through a wildcard state.
fn check_start(table: &TransitionTable, _: Option<&Tape>) -> Option<Diagnostic> {
    (!table.has_rules_for(START_STATE) && !table.has_wildcard_state())
        .then_some(Diagnostic::MissingStart)
}

/// Checks that at least one rule targets a halting state.
fn check_halting(table: &TransitionTable, _: Option<&Tape>) -> Option<Diagnostic> {
    if table.is_empty() {
        return None;
    }

    let halts = table
        .transitions()
        .iter()
        .any(|transition| is_halting(&transition.next_state));

    (!halts).then_some(Diagnostic::NoHaltingState)
}

/// Walks the state graph from `start` and reports states with rules that were never visited.
///
/// Wildcard-state rules apply in every non-halting state, so their targets are reachable
/// from every visited state.
fn check_unreachable_states(table: &TransitionTable, _: Option<&Tape>) -> Option<Diagnostic> {
    let mut visited = BTreeSet::new();
    let mut queue = vec![START_STATE.to_string()];

    while let Some(state) = queue.pop() {
        if !visited.insert(state.clone()) || is_halting(&state) {
            continue;
        }

        for transition in table
            .rules_for(&state)
            .chain(table.rules_for(WILDCARD_STATE))
        {
            let next = transition.target(&state);
            if !visited.contains(next) {
                queue.push(next.to_string());
            }
        }
    }

    let unreachable: Vec<String> = table
        .states()
        .iter()
        .filter(|state| table.has_rules_for(state) && !visited.contains(*state))
        .cloned()
        .collect();

    (!unreachable.is_empty()).then_some(Diagnostic::UnreachableStates(unreachable))
}

/// Reports non-halting next states that have no rules of their own.
///
/// A wildcard-state rule can pick up any state, so nothing is reported when one exists.
fn check_dead_ends(table: &TransitionTable, _: Option<&Tape>) -> Option<Diagnostic> {
    if table.has_wildcard_state() {
        return None;
    }

    let dead_ends: BTreeSet<String> = table
        .transitions()
        .into_iter()
        .map(|transition| transition.target(&transition.state))
        .filter(|next| !is_halting(next) && !table.has_rules_for(next))
        .map(str::to_string)
        .collect();

    (!dead_ends.is_empty())
        .then(|| Diagnostic::DeadEndStates(dead_ends.into_iter().collect()))
}

/// Checks that every non-blank tape symbol is read by some rule or covered by a wildcard.
fn check_tape_symbols(table: &TransitionTable, tape: Option<&Tape>) -> Option<Diagnostic> {
    let tape = tape?;
    let handled: BTreeSet<Symbol> = table
        .transitions()
        .iter()
        .map(|transition| transition.read)
        .collect();

    if handled.contains(&WILDCARD) {
        return None;
    }

    let unhandled: BTreeSet<Symbol> = tape
        .cells()
        .filter(|symbol| *symbol != BLANK_SYMBOL && !handled.contains(symbol))
        .collect();

    (!unhandled.is_empty())
        .then(|| Diagnostic::UnhandledTapeSymbols(unhandled.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(source: &str) -> TransitionTable {
        source.parse().unwrap()
    }

    #[test]
    fn test_valid_program() {
        let table = table("start 1 1 r start\nstart _ 1 r halt-accept");
        assert!(analyze(&table, None).is_empty());
    }

    #[test]
    fn test_empty_program() {
        let table = TransitionTable::new();
        assert_eq!(analyze(&table, None), vec![Diagnostic::MissingStart]);
    }

    #[test]
    fn test_missing_start() {
        let table = table("begin a a r halt");
        let diagnostics = analyze(&table, None);

        assert!(diagnostics.contains(&Diagnostic::MissingStart));
        assert!(diagnostics.contains(&Diagnostic::UnreachableStates(vec!["begin".to_string()])));
    }

    #[test]
    fn test_wildcard_state_counts_as_start() {
        let table = table("* a a r halt");
        assert!(analyze(&table, None).is_empty());
    }

    #[test]
    fn test_no_halting_state() {
        let table = table("start a a r start");
        assert_eq!(analyze(&table, None), vec![Diagnostic::NoHaltingState]);
    }

    #[test]
    fn test_unreachable_states() {
        let table = table(
            r#"
start a a r halt
orphan a a r other
other a a r halt
"#,
        );
        assert_eq!(
            analyze(&table, None),
            vec![Diagnostic::UnreachableStates(vec![
                "orphan".to_string(),
                "other".to_string()
            ])]
        );
    }

    #[test]
    fn test_wildcard_targets_are_reachable() {
        let table = table(
            r#"
start a a r *
* b b r found
found _ _ * halt-accept
"#,
        );
        assert!(analyze(&table, None).is_empty());
    }

    #[test]
    fn test_dead_end_states() {
        let table = table("start a a r middle\nstart b b r halt-reject\nstart c c r *");
        assert_eq!(
            analyze(&table, None),
            vec![Diagnostic::DeadEndStates(vec!["middle".to_string()])]
        );
    }

    #[test]
    fn test_unhandled_tape_symbols() {
        let table = table("start a a r halt");
        let mut tape = Tape::new();
        tape.load("abcab").unwrap();

        assert_eq!(
            analyze(&table, Some(&tape)),
            vec![Diagnostic::UnhandledTapeSymbols(vec!['b', 'c'])]
        );
    }

    #[test]
    fn test_wildcard_input_handles_every_symbol() {
        let table = table("start * * r halt");
        let mut tape = Tape::new();
        tape.load("xyz").unwrap();

        assert!(analyze(&table, Some(&tape)).is_empty());
    }

    #[test]
    fn test_diagnostic_display() {
        let message = Diagnostic::UnreachableStates(vec!["q1".to_string()]).to_string();
        assert!(message.contains("Unreachable states"));
        assert!(message.contains("q1"));
    }
}
