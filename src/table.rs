//! This module defines the `TransitionTable`, the read-only rule set a machine executes,
//! and the wildcard-aware lookup used to pick a rule on every cycle.

use crate::types::{Symbol, Transition, BLANK_SYMBOL, WILDCARD, WILDCARD_STATE};
use std::collections::{BTreeSet, HashMap};

/// The alphabet every table and machine starts from.
pub fn default_alphabet() -> BTreeSet<Symbol> {
    BTreeSet::from([WILDCARD, BLANK_SYMBOL])
}

/// A mapping from `(state, symbol)` to the rule for that pair.
///
/// Rules are grouped by state, so a lookup never allocates. The table also records every
/// state name and symbol it has seen; those sets feed diagnostics only.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTable {
    rules: HashMap<String, HashMap<Symbol, Transition>>,
    states: BTreeSet<String>,
    alphabet: BTreeSet<Symbol>,
}

impl Default for TransitionTable {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            states: BTreeSet::new(),
            alphabet: default_alphabet(),
        }
    }

    /// Inserts a rule, returning the rule it replaced if one had the same key.
    pub fn insert(&mut self, transition: Transition) -> Option<Transition> {
        for state in [&transition.state, &transition.next_state] {
            if state != WILDCARD_STATE {
                self.states.insert(state.clone());
            }
        }
        self.alphabet.insert(transition.read);
        self.alphabet.insert(transition.write);

        self.rules
            .entry(transition.state.clone())
            .or_default()
            .insert(transition.read, transition)
    }

    /// Returns the rule stored under exactly this key, without wildcard fallback.
    pub fn get(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        self.rules.get(state).and_then(|by_symbol| by_symbol.get(&symbol))
    }

    /// Finds the rule that applies to `state` reading `symbol`.
    ///
    /// Keys are probed in order of decreasing specificity and the first hit wins:
    /// `(state, symbol)`, `(state, *)`, `(*, symbol)`, `(*, *)`.
    pub fn resolve(&self, state: &str, symbol: Symbol) -> Option<&Transition> {
        self.get(state, symbol)
            .or_else(|| self.get(state, WILDCARD))
            .or_else(|| self.get(WILDCARD_STATE, symbol))
            .or_else(|| self.get(WILDCARD_STATE, WILDCARD))
    }

    /// Rules keyed on exactly `state`, in no particular order.
    pub fn rules_for<'a>(&'a self, state: &str) -> impl Iterator<Item = &'a Transition> + 'a {
        self.rules
            .get(state)
            .into_iter()
            .flat_map(HashMap::values)
    }

    /// Returns `true` if any rule is keyed on `state` (not counting wildcard-state rules).
    pub fn has_rules_for(&self, state: &str) -> bool {
        self.rules
            .get(state)
            .is_some_and(|by_symbol| !by_symbol.is_empty())
    }

    /// Returns `true` if any rule is keyed on the wildcard state.
    pub fn has_wildcard_state(&self) -> bool {
        self.has_rules_for(WILDCARD_STATE)
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.values().map(HashMap::len).sum()
    }

    /// Returns `true` if the table holds no rules.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All rules, ordered by source line and then by key.
    pub fn transitions(&self) -> Vec<&Transition> {
        let mut transitions: Vec<&Transition> =
            self.rules.values().flat_map(HashMap::values).collect();
        transitions.sort_by(|a, b| {
            (a.line, &a.state, a.read).cmp(&(b.line, &b.state, b.read))
        });
        transitions
    }

    /// Every state name mentioned by a rule, excluding the wildcard.
    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }

    /// Every symbol mentioned by a rule, plus the wildcard and the blank.
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn rule(state: &str, read: Symbol, next_state: &str) -> Transition {
        Transition {
            state: state.to_string(),
            read,
            write: WILDCARD,
            direction: Direction::Stay,
            next_state: next_state.to_string(),
            line: 0,
        }
    }

    #[test]
    fn test_exact_match_wins() {
        let mut table = TransitionTable::new();
        table.insert(rule("s", 'a', "exact"));
        table.insert(rule("s", WILDCARD, "state-any"));
        table.insert(rule(WILDCARD_STATE, 'a', "any-symbol"));
        table.insert(rule(WILDCARD_STATE, WILDCARD, "default"));

        assert_eq!(table.resolve("s", 'a').unwrap().next_state, "exact");
    }

    #[test]
    fn test_state_wildcard_beats_symbol_wildcard() {
        let mut table = TransitionTable::new();
        table.insert(rule("s", WILDCARD, "state-any"));
        table.insert(rule(WILDCARD_STATE, 'a', "any-symbol"));
        table.insert(rule(WILDCARD_STATE, WILDCARD, "default"));

        assert_eq!(table.resolve("s", 'a').unwrap().next_state, "state-any");
    }

    #[test]
    fn test_symbol_wildcard_beats_default() {
        let mut table = TransitionTable::new();
        table.insert(rule(WILDCARD_STATE, 'a', "any-symbol"));
        table.insert(rule(WILDCARD_STATE, WILDCARD, "default"));

        assert_eq!(table.resolve("s", 'a').unwrap().next_state, "any-symbol");
        assert_eq!(table.resolve("s", 'b').unwrap().next_state, "default");
    }

    #[test]
    fn test_no_match() {
        let mut table = TransitionTable::new();
        table.insert(rule("s", 'a', "t"));

        assert!(table.resolve("s", 'b').is_none());
        assert!(table.resolve("t", 'a').is_none());
    }

    #[test]
    fn test_insert_replaces_same_key() {
        let mut table = TransitionTable::new();
        assert!(table.insert(rule("s", 'a', "first")).is_none());
        let replaced = table.insert(rule("s", 'a', "second"));

        assert_eq!(replaced.unwrap().next_state, "first");
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("s", 'a').unwrap().next_state, "second");
    }

    #[test]
    fn test_states_and_alphabet() {
        let mut table = TransitionTable::new();
        assert_eq!(table.alphabet(), &default_alphabet());

        table.insert(Transition {
            write: 'b',
            ..rule("s", 'a', "t")
        });
        table.insert(rule(WILDCARD_STATE, 'c', WILDCARD_STATE));

        let states: Vec<&str> = table.states().iter().map(String::as_str).collect();
        assert_eq!(states, vec!["s", "t"]);
        assert_eq!(table.alphabet().iter().collect::<String>(), "*_abc");
        assert!(table.has_rules_for("s"));
        assert!(!table.has_rules_for("t"));
        assert!(table.has_wildcard_state());
    }
}
