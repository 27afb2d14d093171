//! This is the backward-reasoning decider. \
//! Instead of running the machine forward it searches backward from every halting transition:
//! if no chain of immediate predecessor configurations of bounded length is consistent, the
//! machine can never reach a halting transition and runs forever. \
//! A configuration here is partial knowledge: the state, the head position and the known cells
//! of the tape. Off-tape cells are unknown, never assumed zero. Reversing a forward transition
//! `(state, read) -> (write, move, next_state)` against a configuration requires the cell the
//! predecessor head sat on to hold `write` if it is known (else that predecessor is
//! contradictory and pruned); the cell is then rewritten to `read`, which the predecessor is
//! about to consume. \
//! The search is a DFS over all predecessors, deduplicated on the full configuration including
//! the known-cell map. If the frontier empties the machine is proven non-halting; if any chain
//! survives to the depth bound the decider gives up.

use std::sync::Arc;

use hashbrown::{HashMap, HashSet};

use crate::{
    config::Config,
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, DECIDER_BACKWARD_REASONING_ID,
    },
    machine_binary::MachineId,
    records::BackwardRecords,
    status::{MachineStatus, NonHaltReason, UndecidedReason},
    transition_binary::TransitionType,
};

/// A partial configuration of the backward search. The tape holds only the known cells,
/// keyed by position relative to the head position of the halting configuration.
#[derive(Debug, Clone)]
struct BackwardNode {
    state: TransitionType,
    head: i32,
    depth: usize,
    tape: HashMap<i32, u8>,
}

/// Dedup key: the full configuration including the known-cell map (sorted by position).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct BackwardKey {
    state: TransitionType,
    head: i32,
    cells: Box<[(i32, u8)]>,
}

impl BackwardKey {
    fn new(state: TransitionType, head: i32, tape: &HashMap<i32, u8>) -> Self {
        let mut cells: Vec<(i32, u8)> = tape.iter().map(|(&p, &s)| (p, s)).collect();
        cells.sort_unstable();
        Self {
            state,
            head,
            cells: cells.into_boxed_slice(),
        }
    }
}

#[derive(Debug)]
pub struct DeciderBackwardReasoning {
    depth_limit: usize,
    stack: Vec<BackwardNode>,
    visited: HashSet<BackwardKey>,
    records_aggregator: Option<Arc<BackwardRecords>>,
}

impl DeciderBackwardReasoning {
    pub fn new(config: &Config) -> Self {
        Self {
            depth_limit: config.backward_depth(),
            stack: Vec::new(),
            visited: HashSet::new(),
            records_aggregator: None,
        }
    }

    pub fn new_with_aggregator(config: &Config, records_aggregator: Arc<BackwardRecords>) -> Self {
        let mut decider = Self::new(config);
        decider.records_aggregator = Some(records_aggregator);
        decider
    }
}

impl Decider for DeciderBackwardReasoning {
    fn decider_id() -> &'static DeciderId {
        &DECIDER_BACKWARD_REASONING_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        self.stack.clear();
        self.visited.clear();
        let table = machine.machine();

        // Seed the frontier with every halting transition: the machine is in the source
        // state with the read symbol under the head, one step from halting.
        for field_id in 2..table.fields_used_end() {
            if table.transition(field_id).is_halt() {
                let mut tape = HashMap::new();
                tape.insert(0, (field_id & 1) as u8);
                let node = BackwardNode {
                    state: (field_id >> 1) as TransitionType,
                    head: 0,
                    depth: 0,
                    tape,
                };
                self.visited
                    .insert(BackwardKey::new(node.state, node.head, &node.tape));
                self.stack.push(node);
            }
        }

        let mut max_depth = 0;
        while let Some(node) = self.stack.pop() {
            if node.depth >= self.depth_limit {
                // a predecessor chain survived to the bound, give up
                return MachineStatus::Undecided(
                    UndecidedReason::DepthLimit,
                    node.depth as u64,
                    0,
                );
            }
            if node.depth > max_depth {
                max_depth = node.depth;
            }

            for field_id in 2..table.fields_used_end() {
                let tr = table.transition(field_id);
                // No predecessor can use a halting transition.
                if tr.is_halt() || tr.state() != node.state {
                    continue;
                }

                // Moving backward, so in the opposite direction.
                let prev_head = node.head - tr.direction() as i32;

                // The predecessor wrote `write` at its head cell. A known conflicting
                // symbol is a contradiction, that predecessor is pruned.
                if let Some(&symbol) = node.tape.get(&prev_head) {
                    if symbol as TransitionType != tr.symbol() {
                        continue;
                    }
                }

                // Before the write the cell held the symbol the predecessor read.
                let mut tape = node.tape.clone();
                tape.insert(prev_head, (field_id & 1) as u8);

                let state = (field_id >> 1) as TransitionType;
                let key = BackwardKey::new(state, prev_head, &tape);
                if self.visited.insert(key) {
                    self.stack.push(BackwardNode {
                        state,
                        head: prev_head,
                        depth: node.depth + 1,
                        tape,
                    });
                }
            }
        }

        // Every chain ran into a contradiction within the depth bound.
        if let Some(aggregator) = &self.records_aggregator {
            aggregator.note(max_depth, machine.id());
        }
        MachineStatus::DecidedNonHalt(NonHaltReason::BackwardReasoning(max_depth as u32))
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

    fn decide(tm: &str, depth: usize) -> MachineStatus {
        let machine = MachineId::new_no_id(MachineBinary::try_from(tm).unwrap());
        let config = Config::builder(machine.machine().n_states())
            .backward_depth(depth)
            .build();
        DeciderBackwardReasoning::decide_single_machine(&machine, &config)
    }

    #[test]
    fn decider_backward_reasoning_unreachable_halt() {
        // B1 halts but the cell can only hold a 1 which B0 (the only way back to A0) must
        // have overwritten with a 0, every predecessor chain is contradictory at depth 2
        let status = decide("0RB1RB_0LA---", 50);
        assert!(status.is_non_halt_proof());
    }

    #[test]
    fn decider_backward_reasoning_is_monotone_in_depth() {
        // a proof at depth D implies the proof for every larger depth
        let status_small = decide("0RB1RB_0LA---", 5);
        let status_large = decide("0RB1RB_0LA---", 300);
        assert!(status_small.is_non_halt_proof());
        assert_eq!(status_small, status_large);
    }

    #[test]
    fn decider_backward_reasoning_gives_up_on_reachable_halt() {
        // the halt of the BB5 champion is reachable, chains survive any depth
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Max.machine());
        let config = Config::builder(5).backward_depth(50).build();
        let status = DeciderBackwardReasoning::decide_single_machine(&machine, &config);
        assert!(!status.is_non_halt_proof());
        assert!(status.is_undecided());
    }

    #[test]
    fn decider_backward_reasoning_no_halt_transition_is_trivial_proof() {
        // without a halting transition the frontier starts empty
        let status = decide("1RB1LB_1LA1RA", 5);
        assert_eq!(
            MachineStatus::DecidedNonHalt(NonHaltReason::BackwardReasoning(0)),
            status
        );
    }
}
