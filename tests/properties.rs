//! Property-based tests for the tape and rule resolution.
//!
//! Uses proptest to check that the tape and the transition table keep their invariants
//! for arbitrary inputs and head movements.

use proptest::prelude::*;
use tmi::{Direction, Tape, Transition, TransitionTable, BLANK_SYMBOL, WILDCARD};

fn direction() -> impl Strategy<Value = Direction> {
    prop::sample::select(vec![Direction::Left, Direction::Right, Direction::Stay])
}

// =============================================================================
// Tape Properties
// =============================================================================

proptest! {
    /// A loaded tape holds the input plus one blank on each side
    #[test]
    fn prop_load_pads_both_ends(input in "[01ab _]{0,16}") {
        let mut tape = Tape::new();
        tape.load(input.as_str()).unwrap();

        let cells: Vec<char> = tape.cells().collect();
        prop_assert_eq!(cells.len(), input.chars().count() + 2);
        prop_assert_eq!(cells[0], BLANK_SYMBOL);
        prop_assert_eq!(cells[cells.len() - 1], BLANK_SYMBOL);
        prop_assert!(!cells.contains(&' '), "spaces must load as blanks");
    }

    /// The rendered contents are the input with blanks as spaces, trimmed
    #[test]
    fn prop_contents_trimmed(input in "[01_ ]{0,16}") {
        let mut tape = Tape::new();
        tape.load(input.as_str()).unwrap();

        let expected = input.replace('_', " ");
        prop_assert_eq!(tape.contents(), expected.trim());
    }

    /// Growth materializes exactly the cells the head has visited beyond the padding,
    /// and the head always stays on a materialized cell
    #[test]
    fn prop_growth_tracks_extremes(
        input in "[01]{0,8}",
        moves in prop::collection::vec(direction(), 0..64),
    ) {
        let mut tape = Tape::new();
        tape.load(input.as_str()).unwrap();

        let length = input.len() as isize;
        let mut head = 1;
        let mut position: isize = 0;
        let mut min_position: isize = 0;
        let mut max_position: isize = 0;

        for direction in moves {
            head = tape.grow_and_move(head, direction);
            position += match direction {
                Direction::Left => -1,
                Direction::Right => 1,
                Direction::Stay => 0,
            };
            min_position = min_position.min(position);
            max_position = max_position.max(position);

            let expected_len = max_position.max(length) - min_position.min(-1) + 1;
            prop_assert!(head < tape.len());
            prop_assert_eq!(tape.len() as isize, expected_len);
            prop_assert_eq!(tape.logical(head), position);
        }
    }
}

// =============================================================================
// Resolution Properties
// =============================================================================

proptest! {
    /// The most specific rule present always wins:
    /// (state, symbol), then (state, *), then (*, symbol), then (*, *)
    #[test]
    fn prop_wildcard_precedence(
        present in any::<[bool; 4]>(),
        symbol in prop::char::range('a', 'z'),
    ) {
        let keys = [
            ("s", symbol, "exact"),
            ("s", WILDCARD, "state-any"),
            ("*", symbol, "any-symbol"),
            ("*", WILDCARD, "default"),
        ];

        let mut table = TransitionTable::new();
        for ((state, read, label), _) in keys.iter().zip(present).filter(|(_, p)| *p) {
            table.insert(Transition {
                state: state.to_string(),
                read: *read,
                write: WILDCARD,
                direction: Direction::Stay,
                next_state: label.to_string(),
                line: 0,
            });
        }

        let expected = keys
            .iter()
            .zip(present)
            .find(|(_, p)| *p)
            .map(|((_, _, label), _)| label.to_string());
        let resolved = table
            .resolve("s", symbol)
            .map(|transition| transition.next_state.clone());

        prop_assert_eq!(resolved, expected);
    }

    /// Rules for one state never answer for another state
    #[test]
    fn prop_exact_rules_do_not_leak(symbol in prop::char::range('a', 'z')) {
        let mut table = TransitionTable::new();
        table.insert(Transition {
            state: "s".to_string(),
            read: symbol,
            write: symbol,
            direction: Direction::Right,
            next_state: "t".to_string(),
            line: 1,
        });

        prop_assert!(table.resolve("s", symbol).is_some());
        prop_assert!(table.resolve("t", symbol).is_none());
    }
}
