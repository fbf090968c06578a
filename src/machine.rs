//! This module defines the `Machine` struct, which runs a single-tape Turing machine.
//! It owns the control state, the head, the tape and the transition table, and applies
//! one rule per cycle until a halting state is reached.

use crate::analyzer::{analyze, Diagnostic};
use crate::parser::parse;
use crate::table::{default_alphabet, TransitionTable};
use crate::tape::{Tape, TapeInput};
use crate::types::{
    is_halting, Component, MachineError, Mode, Outcome, Step, Symbol, Verdict, INITIAL_HEAD,
    START_STATE,
};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A point-in-time view of a machine, suitable for rendering or tracing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The current control state.
    pub state: String,
    /// The head as a storage index into `tape`.
    pub head: usize,
    /// The head as a logical position, where 0 is the first input cell.
    pub position: isize,
    /// Every materialized cell, left to right.
    pub tape: Vec<Symbol>,
    /// Number of completed cycles.
    pub cycle_count: usize,
    /// Whether a halting state has been reached.
    pub complete: bool,
}

/// A single-tape, single-head Turing machine.
///
/// A machine starts in `start` with the head on the first input cell. The program and the
/// tape are each loaded once; [`Machine::reset`] makes the machine reusable.
#[derive(Debug, Clone)]
pub struct Machine {
    state: String,
    head: usize,
    tape: Tape,
    table: Option<TransitionTable>,
    complete: bool,
    cycle_count: usize,
    mode: Mode,
    alphabet: BTreeSet<Symbol>,
    states: BTreeSet<String>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Creates an empty machine that loads programs in [`Mode::Normal`].
    pub fn new() -> Self {
        Self::with_mode(Mode::default())
    }

    /// Creates an empty machine with the given duplicate-rule `mode`.
    pub fn with_mode(mode: Mode) -> Self {
        Self {
            state: START_STATE.to_string(),
            head: INITIAL_HEAD,
            tape: Tape::new(),
            table: None,
            complete: false,
            cycle_count: 0,
            mode,
            alphabet: default_alphabet(),
            states: BTreeSet::new(),
        }
    }

    /// Parses `source` and loads it as the machine's program.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the program was parsed and loaded.
    /// * `Err(MachineError::AlreadyLoaded)` if a program is already loaded.
    /// * `Err(MachineError::ProgramSyntax)` or `Err(MachineError::DuplicateRule)` if the
    ///   source is invalid. Nothing is loaded in that case.
    pub fn load_program(&mut self, source: &str) -> Result<(), MachineError> {
        if self.table.is_some() {
            return Err(MachineError::AlreadyLoaded(Component::Program));
        }

        let table = parse(source, self.mode)?;
        self.load_table(table)
    }

    /// Loads an already built transition table.
    pub fn load_table(&mut self, table: TransitionTable) -> Result<(), MachineError> {
        if self.table.is_some() {
            return Err(MachineError::AlreadyLoaded(Component::Program));
        }

        info!(
            "Loaded program with {} rules over {} states",
            table.len(),
            table.states().len()
        );
        for diagnostic in analyze(&table, None) {
            warn!("{diagnostic}");
        }

        self.alphabet.extend(table.alphabet().iter().copied());
        self.states.extend(table.states().iter().cloned());
        self.table = Some(table);

        Ok(())
    }

    /// Loads the initial tape content.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if the tape was loaded.
    /// * `Err(MachineError::AlreadyLoaded)` if a tape is already loaded.
    /// * `Err(MachineError::InvalidSymbol)` if a token is not a single character.
    pub fn load_tape(&mut self, content: impl Into<TapeInput>) -> Result<(), MachineError> {
        self.tape.load(content)?;
        self.alphabet.extend(self.tape.cells());
        debug!("Loaded tape of {} cells", self.tape.len());
        Ok(())
    }

    /// Executes exactly one cycle: read, resolve, update state, write, move.
    ///
    /// A failed cycle leaves the machine untouched and is not counted.
    ///
    /// # Returns
    ///
    /// * `Ok(Step::Continue)` if the machine is still running.
    /// * `Ok(Step::Halt(verdict))` if this cycle entered a halting state.
    /// * `Err(MachineError::NotReady)` if the program or tape is missing.
    /// * `Err(MachineError::AlreadyComplete)` if the machine already halted.
    /// * `Err(MachineError::NoMatchingRule)` if no rule applies.
    pub fn step(&mut self) -> Result<Step, MachineError> {
        let table = self
            .table
            .as_ref()
            .ok_or(MachineError::NotReady(Component::Program))?;
        if !self.tape.is_loaded() {
            return Err(MachineError::NotReady(Component::Tape));
        }
        if self.complete {
            return Err(MachineError::AlreadyComplete);
        }

        let symbol = self.tape.read(self.head);
        let transition = table.resolve(&self.state, symbol).ok_or_else(|| {
            MachineError::NoMatchingRule {
                state: self.state.clone(),
                symbol,
            }
        })?;

        debug!(
            "cycle {}: ({}, '{}') matched `{}`",
            self.cycle_count + 1,
            self.state,
            symbol,
            transition
        );

        self.state = transition.target(&self.state).to_string();
        self.tape.write(self.head, transition.write);
        self.head = self.tape.grow_and_move(self.head, transition.direction);
        self.cycle_count += 1;
        self.complete = is_halting(&self.state);

        Ok(match self.verdict() {
            Some(verdict) => Step::Halt(verdict),
            None => Step::Continue,
        })
    }

    /// Steps until the machine halts.
    ///
    /// With `max_cycles` set, at most that many cycles run in this call and
    /// `Step::Continue` is returned if the machine is still running afterwards. `None`
    /// runs without a bound, so a program that never halts never returns.
    pub fn run(&mut self, max_cycles: Option<usize>) -> Result<Step, MachineError> {
        self.run_with(max_cycles, |_| {})
    }

    /// Like [`Machine::run`], calling `observer` after every completed cycle.
    ///
    /// Pacing and rendering hook in here; the observer cannot change the machine.
    pub fn run_with<F>(
        &mut self,
        max_cycles: Option<usize>,
        mut observer: F,
    ) -> Result<Step, MachineError>
    where
        F: FnMut(&Machine),
    {
        let mut executed = 0;

        while !self.complete {
            if max_cycles.is_some_and(|max| executed >= max) {
                info!("Stopped after {executed} cycles without halting");
                return Ok(Step::Continue);
            }

            self.step()?;
            executed += 1;
            observer(self);
        }

        Ok(self.verdict().map_or(Step::Continue, Step::Halt))
    }

    /// Returns the verdict and final tape of a halted machine.
    ///
    /// # Returns
    ///
    /// * `Ok(Outcome)` once the machine has halted.
    /// * `Err(MachineError::NotComplete)` while it is still running.
    pub fn result(&self) -> Result<Outcome, MachineError> {
        let verdict = self.verdict().ok_or(MachineError::NotComplete)?;

        Ok(Outcome {
            verdict,
            tape: self.tape.contents(),
        })
    }

    /// Restores the initial state, head, flag and cycle count and unloads the tape.
    ///
    /// A `hard` reset also unloads the program and forgets the discovered alphabet and
    /// states, so the machine can run an unrelated program.
    pub fn reset(&mut self, hard: bool) {
        self.state = START_STATE.to_string();
        self.head = INITIAL_HEAD;
        self.complete = false;
        self.cycle_count = 0;
        self.tape.clear();

        if hard {
            self.table = None;
            self.alphabet = default_alphabet();
            self.states.clear();
        }
    }

    /// Returns a snapshot of the current machine.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            head: self.head,
            position: self.tape.logical(self.head),
            tape: self.tape.cells().collect(),
            cycle_count: self.cycle_count,
            complete: self.complete,
        }
    }

    /// Runs the analyzer over the loaded program and tape.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.table
            .as_ref()
            .map(|table| analyze(table, self.tape.is_loaded().then_some(&self.tape)))
            .unwrap_or_default()
    }

    /// The verdict, if the machine has halted.
    pub fn verdict(&self) -> Option<Verdict> {
        if self.complete {
            Verdict::from_state(&self.state)
        } else {
            None
        }
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the head as a storage index into the tape.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the number of completed cycles.
    pub fn cycle_count(&self) -> usize {
        self.cycle_count
    }

    /// Returns `true` once a halting state has been reached.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Returns `true` when both a program and a tape are loaded.
    pub fn is_ready(&self) -> bool {
        self.table.is_some() && self.tape.is_loaded()
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn table(&self) -> Option<&TransitionTable> {
        self.table.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Every symbol seen in the program or on the tape, plus the wildcard and the blank.
    pub fn alphabet(&self) -> &BTreeSet<Symbol> {
        &self.alphabet
    }

    /// Every state name seen in the program.
    pub fn states(&self) -> &BTreeSet<String> {
        &self.states
    }
}
