//! This is the cycler decider. \
//! It is a very effective decider and should run first with a small number of steps to eliminate
//! most of the cyclers and machines which halt quickly (both are identified). \
//! How it works: \
//! Before every step the full configuration is fingerprinted as
//! (state, read symbol, seen tape symbols, head position). If the same fingerprint appears a
//! second time the machine repeats this exact configuration forever: the tape outside the seen
//! range is all zero and never influenced the run, so the execution between the two occurrences
//! replays indefinitely. \
//! The seen range only ever grows and the head position is part of the key, so equal
//! fingerprints imply the identical configuration and the argument is sound.

use hashbrown::HashMap;

use crate::{
    config::{Config, StepTypeSmall},
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, DECIDER_CYCLER_ID,
    },
    machine_binary::MachineId,
    status::{MachineStatus, NonHaltReason, UndecidedReason},
    tape::{Simulation, StepOutcome},
    transition_binary::TransitionType,
};

/// Initial capacity for the fingerprint table. Not so relevant.
const MAP_INIT_CAPACITY: usize = 4_096;

/// One full configuration, used as key of the fingerprint table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConfigFingerprint {
    state: TransitionType,
    read: u8,
    head: u32,
    /// Symbols of the seen range, lowest position first.
    tape: Box<[u8]>,
}

#[derive(Debug)]
pub struct DeciderCycler {
    step_limit: StepTypeSmall,
    space_limit: usize,
    /// Fingerprint -> step it was first seen, to report the cycle size.
    configs_seen: HashMap<ConfigFingerprint, StepTypeSmall>,
}

impl DeciderCycler {
    pub fn new(config: &Config) -> Self {
        Self {
            step_limit: config.step_limit_cycler(),
            space_limit: config.space_limit_cells(),
            configs_seen: HashMap::with_capacity(MAP_INIT_CAPACITY),
        }
    }
}

impl Decider for DeciderCycler {
    fn decider_id() -> &'static DeciderId {
        &DECIDER_CYCLER_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        self.configs_seen.clear();
        let mut sim = Simulation::new(machine.machine(), self.step_limit, self.space_limit);

        loop {
            let read = sim.observe();
            let fingerprint = ConfigFingerprint {
                state: sim.state,
                read,
                head: sim.head as u32,
                tape: sim.seen_symbols(),
            };
            if let Some(&first_seen) = self.configs_seen.get(&fingerprint) {
                return MachineStatus::DecidedNonHalt(NonHaltReason::Cycler(
                    sim.time,
                    sim.time - first_seen,
                ));
            }
            self.configs_seen.insert(fingerprint, sim.time);

            match sim.step() {
                StepOutcome::Stepped => {}
                StepOutcome::Halted => return MachineStatus::DecidedHalts(sim.time as u64),
                StepOutcome::StepLimit => {
                    return MachineStatus::Undecided(
                        UndecidedReason::StepLimit,
                        sim.time as u64,
                        sim.span() as u32,
                    )
                }
                StepOutcome::SpaceLimit => {
                    return MachineStatus::Undecided(
                        UndecidedReason::SpaceLimit,
                        sim.time as u64,
                        sim.span() as u32,
                    )
                }
                StepOutcome::TapeBound => {
                    return MachineStatus::Undecided(
                        UndecidedReason::TapeBoundReached,
                        sim.time as u64,
                        sim.span() as u32,
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

    fn decide(tm: &str) -> MachineStatus {
        let machine = MachineId::new_no_id(MachineBinary::try_from(tm).unwrap());
        let config = Config::builder(machine.machine().n_states())
            .step_limit_cycler(5000)
            .space_limit_cells(500)
            .build();
        DeciderCycler::decide_single_machine(&machine, &config)
    }

    #[test]
    fn decider_cycler_finds_two_cell_shuttle() {
        // writes nothing, bounces between two cells
        let status = decide("0RB0RB_0LA0LA");
        assert!(status.is_cycler());
    }

    #[test]
    fn decider_cycler_finds_cycle_bb4() {
        let status = decide("1RB1LD_1RC---_1LC0RA_0RA0RA");
        assert!(status.is_cycler());
    }

    #[test]
    fn decider_cycler_drifting_machine_is_not_a_cycler() {
        // runs right forever, each configuration has a larger seen range
        let status = decide("1RB1RB_1RA1RA");
        assert!(status.is_undecided());
    }

    #[test]
    fn decider_cycler_reports_halt_of_bb5_champion() {
        // the champion runs 47M steps, within 1000 steps the verdict is unknown
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Max.machine());
        let config = Config::builder(5)
            .step_limit_cycler(1000)
            .space_limit_cells(500)
            .build();
        let status = DeciderCycler::decide_single_machine(&machine, &config);
        assert!(!status.is_non_halt_proof());
        assert!(status.is_undecided());
    }

    #[test]
    fn decider_cycler_reports_halt_with_step_count() {
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Steps105.machine());
        let config = Config::builder(5)
            .step_limit_cycler(1000)
            .space_limit_cells(500)
            .build();
        let status = DeciderCycler::decide_single_machine(&machine, &config);
        assert_eq!(MachineStatus::DecidedHalts(105), status);
    }

    #[test]
    fn decider_cycler_reuse_leaks_no_state_between_machines() {
        // the decider instance is re-used over a batch, earlier machines must not
        // influence later verdicts
        let config = Config::new_default(5);
        let mut decider = DeciderCycler::new(&config);
        let cycler = MachineId::new_no_id(MachineBinary::try_from("0RB0RB_0LA0LA").unwrap());
        let halter = MachineId::new_no_id(NotableMachineBinary::BB5Steps105.machine());
        let first = decider.decide_machine(&cycler);
        let second = decider.decide_machine(&halter);
        let third = decider.decide_machine(&cycler);
        assert!(first.is_cycler());
        assert_eq!(MachineStatus::DecidedHalts(105), second);
        assert_eq!(first, third);
    }

    #[test]
    fn decider_cycler_verdict_is_monotone_in_limits() {
        // once decided, scaling the limits up does not change the verdict
        let machine = MachineId::new_no_id(MachineBinary::try_from("0RB0RB_0LA0LA").unwrap());
        let config_small = Config::builder(2)
            .step_limit_cycler(100)
            .space_limit_cells(50)
            .build();
        let config_large = Config::builder(2)
            .step_limit_cycler(10_000)
            .space_limit_cells(500)
            .build();
        let status_small = DeciderCycler::decide_single_machine(&machine, &config_small);
        let status_large = DeciderCycler::decide_single_machine(&machine, &config_large);
        assert!(status_small.is_cycler());
        assert_eq!(status_small, status_large);
    }
}
