//! The bounded seen-tape simulator shared by the forward deciders. \
//! The tape is a fixed array of `2 * space_limit + 2` cells with the head starting at the
//! midpoint. Besides the symbol every cell carries a seen flag and the last time the head
//! sat on it; the cycler fingerprints and the translated-cycler equivalence walk are built
//! on this bookkeeping. \
//! Every resource violation (step limit, space limit, tape bound) ends the run as a
//! distinct [StepOutcome]; the deciders map all of them to an undecided verdict, never to
//! a proof.

use crate::{
    config::StepTypeSmall,
    machine_binary::MachineBinary,
    transition_binary::{TransitionType, STATE_HALT_BINARY},
};

/// Start state of every machine in the seed database.
pub const STATE_START: TransitionType = 1;

#[derive(Debug, Default, Clone, Copy)]
pub struct TapeCell {
    pub symbol: u8,
    pub seen: bool,
    pub last_time_seen: StepTypeSmall,
}

/// Outcome of a single simulation step.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum StepOutcome {
    Stepped,
    /// The machine reached a halting transition. The halting step is counted.
    Halted,
    StepLimit,
    SpaceLimit,
    /// The head would run over the working array. Deciders treat this as unknown.
    TapeBound,
}

#[derive(Debug)]
pub struct Simulation {
    machine: MachineBinary,
    cells: Vec<TapeCell>,
    pub head: usize,
    /// 1..=MAX_STATES, 0 = halted
    pub state: TransitionType,
    /// Number of steps executed so far.
    pub time: StepTypeSmall,
    min_pos_seen: usize,
    max_pos_seen: usize,
    time_limit: StepTypeSmall,
    space_limit: usize,
}

impl Simulation {
    pub fn new(machine: &MachineBinary, time_limit: StepTypeSmall, space_limit: usize) -> Self {
        // Two margin cells so that a span of exactly space_limit never leaves the array.
        let cells = vec![TapeCell::default(); 2 * space_limit + 2];
        let midpoint = space_limit + 1;
        Self {
            machine: *machine,
            cells,
            head: midpoint,
            state: STATE_START,
            time: 0,
            min_pos_seen: midpoint,
            max_pos_seen: midpoint,
            time_limit,
            space_limit,
        }
    }

    /// Symbol under the head without marking the cell.
    #[inline]
    pub fn peek_symbol(&self) -> u8 {
        self.cells[self.head].symbol
    }

    /// Marks the cell under the head as seen at the current time, extends the seen range to
    /// the head and returns the symbol. Idempotent within one step.
    pub fn observe(&mut self) -> u8 {
        self.widen_seen_range_to_head();
        let cell = &mut self.cells[self.head];
        cell.seen = true;
        cell.last_time_seen = self.time;
        cell.symbol
    }

    /// Extends `min_pos_seen..=max_pos_seen` to include the head. The translated-cycler
    /// decider calls this itself so record positions stay outside the range until the
    /// record was handled.
    pub fn widen_seen_range_to_head(&mut self) {
        if self.head < self.min_pos_seen {
            self.min_pos_seen = self.head;
        }
        if self.head > self.max_pos_seen {
            self.max_pos_seen = self.head;
        }
    }

    /// Executes one transition.
    pub fn step(&mut self) -> StepOutcome {
        if self.state == STATE_HALT_BINARY {
            return StepOutcome::Halted;
        }
        if self.time >= self.time_limit {
            return StepOutcome::StepLimit;
        }

        let read = self.observe();
        let tr = self
            .machine
            .transition(self.state as usize * 2 + read as usize);
        self.cells[self.head].symbol = tr.symbol() as u8;
        self.time += 1;

        if tr.is_halt() {
            self.state = STATE_HALT_BINARY;
            return StepOutcome::Halted;
        }
        self.state = tr.state();

        let next = self.head as isize + tr.direction() as isize;
        if next < 0 || next >= self.cells.len() as isize {
            return StepOutcome::TapeBound;
        }
        self.head = next as usize;

        if self.span() > self.space_limit {
            return StepOutcome::SpaceLimit;
        }

        StepOutcome::Stepped
    }

    /// Number of cells between the outermost seen positions.
    #[inline]
    pub fn span(&self) -> usize {
        self.max_pos_seen - self.min_pos_seen
    }

    pub fn min_pos_seen(&self) -> usize {
        self.min_pos_seen
    }

    pub fn max_pos_seen(&self) -> usize {
        self.max_pos_seen
    }

    pub fn is_halted(&self) -> bool {
        self.state == STATE_HALT_BINARY
    }

    #[inline]
    pub fn cell(&self, pos: usize) -> &TapeCell {
        &self.cells[pos]
    }

    pub fn tape_len(&self) -> usize {
        self.cells.len()
    }

    /// The symbols of the seen range, lowest position first. Combined with the head position
    /// this is a canonical fingerprint of the configuration: the seen range only grows, so
    /// equal length implies the identical range.
    pub fn seen_symbols(&self) -> Box<[u8]> {
        self.cells[self.min_pos_seen..=self.max_pos_seen]
            .iter()
            .map(|c| c.symbol)
            .collect()
    }

    /// Snapshot of all tape symbols, for the translated-cycler records.
    pub fn snapshot_symbols(&self) -> Box<[u8]> {
        self.cells.iter().map(|c| c.symbol).collect()
    }

    /// The symbols of the inclusive position range. Empty if start > end.
    pub fn tape_segment(&self, start: isize, end: isize) -> Vec<u8> {
        if start > end {
            return Vec::new();
        }
        self.cells[start as usize..=end as usize]
            .iter()
            .map(|c| c.symbol)
            .collect()
    }
}
