//! This is the halting-segment decider. \
//! It generalizes backward reasoning to a bounded tape window of half-width w: configurations
//! carry the known cells of the window, the state and a head position which may lie outside
//! the window. Outside the window the state is abstracted away, which keeps the search space
//! finite. \
//! Reversing a transition against a configuration prunes contradictions (a known cell which
//! does not hold the written symbol) and transitions which would re-enter the window from the
//! wrong side while the head is outside. \
//! If a reachable predecessor fits the start configuration (state 1 or head outside the
//! window, and no known one on the tape) the proof attempt fails; in recursive mode the
//! search retries with a wider window and the remaining node budget. If the frontier empties
//! the machine is proven non-halting.

use hashbrown::{HashMap, HashSet};

use crate::{
    config::Config,
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, DECIDER_HALTING_SEGMENT_ID,
    },
    machine_binary::{MachineBinary, MachineId},
    status::{MachineStatus, NonHaltReason, UndecidedReason},
    transition_binary::TransitionType,
};

/// State marker of the dedup key when the head is outside the window.
const STATE_OUTSIDE: u8 = u8::MAX;
/// Cell marker of the dedup key for unknown cells.
const CELL_UNKNOWN: u8 = 2;

/// A configuration of the backward search: known window cells, state and head. The head may
/// be outside the window `[-half_width, half_width]`; the state is meaningless then.
#[derive(Debug, Clone)]
struct SegmentConfig {
    state: TransitionType,
    head: i32,
    tape: HashMap<i32, u8>,
}

impl SegmentConfig {
    fn is_inside(&self, min_pos: i32, max_pos: i32) -> bool {
        self.head >= min_pos && self.head <= max_pos
    }

    /// A start-fitting configuration could have been reached from the all-zero start tape:
    /// the state is the start state or the head is outside the window, and no known cell
    /// holds a one.
    fn fits_start(&self, min_pos: i32, max_pos: i32) -> bool {
        (self.state == 1 || !self.is_inside(min_pos, max_pos))
            && self.tape.values().all(|&symbol| symbol == 0)
    }

    fn key(&self, min_pos: i32, max_pos: i32) -> SegmentKey {
        let state = if self.is_inside(min_pos, max_pos) {
            self.state as u8
        } else {
            STATE_OUTSIDE
        };
        let cells = (min_pos..=max_pos)
            .map(|pos| *self.tape.get(&pos).unwrap_or(&CELL_UNKNOWN))
            .collect();
        SegmentKey {
            head: self.head,
            state,
            cells,
        }
    }
}

/// Dedup key: head, state (abstracted outside the window) and the window cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SegmentKey {
    head: i32,
    state: u8,
    cells: Box<[u8]>,
}

/// Outcome of one bounded search with a fixed window.
enum SegmentSearch {
    /// The frontier emptied: proof. Carries the nodes expanded.
    Closed(usize),
    /// A start-fitting predecessor was found. Carries the remaining node budget.
    StartFit(usize),
    BudgetExhausted,
}

#[derive(Debug)]
pub struct DeciderHaltingSegment {
    half_width_init: usize,
    node_limit: usize,
    recursive: bool,
}

impl DeciderHaltingSegment {
    pub fn new(config: &Config) -> Self {
        Self {
            half_width_init: config.segment_half_width(),
            node_limit: config.segment_node_limit(),
            recursive: config.segment_recursive(),
        }
    }

    /// Reverses one forward transition (given by its field id) against the configuration.
    /// Returns None when that transition cannot be a predecessor.
    fn backward_transition(
        config: &SegmentConfig,
        table: &MachineBinary,
        field_id: usize,
        min_pos: i32,
        max_pos: i32,
    ) -> Option<SegmentConfig> {
        let tr = table.transition(field_id);
        // No predecessor can use the halting transition.
        if tr.is_halt() {
            return None;
        }

        // If the head is left of the window, it must have left the window to the left at
        // some earlier point, so transitions to the right cannot be relevant predecessors.
        if config.head < min_pos && tr.is_dir_right() {
            return None;
        }
        // Mirror argument on the right of the window.
        if config.head > max_pos && tr.is_dir_left() {
            return None;
        }
        // Inside the window the transition must arrive at the configuration's state.
        if config.is_inside(min_pos, max_pos) && tr.state() != config.state {
            return None;
        }

        // Going in the reversed direction.
        let previous_head = config.head - tr.direction() as i32;

        // The transition wrote its symbol at the previous head position. A known cell with a
        // different symbol is a contradiction.
        if let Some(&symbol) = config.tape.get(&previous_head) {
            if symbol as TransitionType != tr.symbol() {
                return None;
            }
        }

        let mut tape = config.tape.clone();
        // The cell the transition left from held the read symbol, unless it lies outside
        // the window where nothing is tracked.
        if previous_head >= min_pos && previous_head <= max_pos {
            tape.insert(previous_head, (field_id & 1) as u8);
        }

        Some(SegmentConfig {
            state: (field_id >> 1) as TransitionType,
            head: previous_head,
            tape,
        })
    }

    /// One bounded DFS with the window `[-half_width, half_width]`.
    fn search(table: &MachineBinary, half_width: usize, node_budget: usize) -> SegmentSearch {
        let min_pos = -(half_width as i32);
        let max_pos = half_width as i32;
        let mut stack: Vec<SegmentConfig> = Vec::new();
        let mut seen: HashSet<SegmentKey> = HashSet::new();

        // The configurations which halt on the next step start the search.
        for field_id in 2..table.fields_used_end() {
            if table.transition(field_id).is_halt() {
                let mut tape = HashMap::new();
                tape.insert(0, (field_id & 1) as u8);
                let halting_config = SegmentConfig {
                    state: (field_id >> 1) as TransitionType,
                    head: 0,
                    tape,
                };
                seen.insert(halting_config.key(min_pos, max_pos));
                stack.push(halting_config);
            }
        }

        // continue until too many nodes had to be checked
        for nodes in 1..=node_budget {
            // All possible predecessors have been checked against the seen set, the
            // machine cannot reach a halting transition.
            let Some(config) = stack.pop() else {
                return SegmentSearch::Closed(nodes - 1);
            };

            // test which of the transitions could have led to the current configuration
            for field_id in 2..table.fields_used_end() {
                let Some(predecessor) =
                    Self::backward_transition(&config, table, field_id, min_pos, max_pos)
                else {
                    continue;
                };
                // A start-fitting predecessor means a path to the halting state could
                // exist, this window proves nothing.
                if predecessor.fits_start(min_pos, max_pos) {
                    return SegmentSearch::StartFit(node_budget - nodes);
                }
                let key = predecessor.key(min_pos, max_pos);
                if !seen.contains(&key) {
                    seen.insert(key);
                    stack.push(predecessor);
                }
            }
        }

        SegmentSearch::BudgetExhausted
    }
}

impl Decider for DeciderHaltingSegment {
    fn decider_id() -> &'static DeciderId {
        &DECIDER_HALTING_SEGMENT_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        let table = machine.machine();
        let mut half_width = self.half_width_init;
        let mut node_budget = self.node_limit;
        let mut nodes_spent = 0u64;

        loop {
            match Self::search(table, half_width, node_budget) {
                SegmentSearch::Closed(nodes) => {
                    return MachineStatus::DecidedNonHalt(NonHaltReason::HaltingSegment(
                        2 * half_width as u32 + 1,
                        nodes_spent as u32 + nodes as u32,
                    ))
                }
                SegmentSearch::StartFit(remaining_budget) => {
                    if !self.recursive {
                        return MachineStatus::Undecided(
                            UndecidedReason::StartConfigurationReachable,
                            nodes_spent + (node_budget - remaining_budget) as u64,
                            2 * half_width as u32 + 1,
                        );
                    }
                    nodes_spent += (node_budget - remaining_budget) as u64;
                    node_budget = remaining_budget;
                    half_width += 1;
                    if node_budget == 0 {
                        return MachineStatus::Undecided(
                            UndecidedReason::NodeLimit,
                            nodes_spent,
                            2 * half_width as u32 + 1,
                        );
                    }
                }
                SegmentSearch::BudgetExhausted => {
                    return MachineStatus::Undecided(
                        UndecidedReason::NodeLimit,
                        nodes_spent + node_budget as u64,
                        2 * half_width as u32 + 1,
                    )
                }
            }
        }
    }

    fn decide_single_machine(machine: &MachineId, config: &Config) -> MachineStatus {
        let mut d = Self::new(config);
        d.decide_machine(machine)
    }

    fn decider_run_batch(batch_data: &mut BatchData) -> ResultUnitEndReason {
        let decider = Self::new(batch_data.config);
        decider::decider_generic_run_batch(decider, batch_data)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::machine_binary::{MachineBinary, NotableMachineBinary};

    fn decide(tm: &str, half_width: usize, node_limit: usize, recursive: bool) -> MachineStatus {
        let machine = MachineId::new_no_id(MachineBinary::try_from(tm).unwrap());
        let config = Config::builder(machine.machine().n_states())
            .segment_half_width(half_width)
            .segment_node_limit(node_limit)
            .segment_recursive(recursive)
            .build();
        DeciderHaltingSegment::decide_single_machine(&machine, &config)
    }

    #[test]
    fn decider_halting_segment_unreachable_halt() {
        // same machine the backward-reasoning tests use, the window argument closes too
        let status = decide("0RB1RB_0LA---", 1, 1000, true);
        assert!(status.is_non_halt_proof());
    }

    #[test]
    fn decider_halting_segment_is_monotone_in_width() {
        let status_narrow = decide("0RB1RB_0LA---", 0, 1000, true);
        let status_wide = decide("0RB1RB_0LA---", 2, 1000, true);
        assert!(status_narrow.is_non_halt_proof());
        assert!(status_wide.is_non_halt_proof());
    }

    #[test]
    fn decider_halting_segment_bb5_champion_is_not_decided() {
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Max.machine());
        let config = Config::builder(5)
            .segment_half_width(1)
            .segment_node_limit(1000)
            .segment_recursive(true)
            .build();
        let status = DeciderHaltingSegment::decide_single_machine(&machine, &config);
        assert!(!status.is_non_halt_proof());
    }

    #[test]
    fn decider_halting_segment_no_halt_transition_is_trivial_proof() {
        let status = decide("1RB1LB_1LA1RA", 1, 1000, false);
        assert!(status.is_non_halt_proof());
    }

    #[test]
    fn decider_halting_segment_budget_zero_is_unknown() {
        // budget so small that even the trivial case cannot be expanded... the frontier
        // is non-empty after the seeds, so one node is not enough to close the search
        let status = decide("0RB1RB_0LA---", 1, 1, true);
        assert!(status.is_undecided());
    }
}
