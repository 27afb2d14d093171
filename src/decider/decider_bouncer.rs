//! This is the unilateral-bouncer decider. \
//! A unilateral bouncer shuttles between a fixed left end and a right end which grows by a
//! repeated increment, so the tape takes the shape \
//! `...000 (Base)(Increment)* (Buffer)(Head) 000...` \
//! The decider watches a forward simulation with a checker state machine of six phases which
//! verifies one full bounce: \
//! phase 0 picks the head and buffer sizes from the visited span, phase 1 records base, buffer
//! and state when the head enters the right u-turn zone, phases 2-5 verify that the machine
//! walks base - increment - buffer - head in order while every segment which had no opportunity
//! to change is in fact unchanged. Any violation resets the checker to phase 0; reaching phase
//! 6 closes the bounce loop and proves the machine bounces forever. \
//! Left-growing bouncers are caught by running the identical check on the mirrored machine
//! (all L/R directions swapped).

use std::sync::Arc;

use crate::{
    config::{Config, StepTypeSmall},
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, DECIDER_BOUNCER_ID,
    },
    machine_binary::MachineId,
    records::BouncerRecords,
    status::{MachineStatus, NonHaltReason, UndecidedReason},
    tape::{Simulation, StepOutcome},
    transition_binary::TransitionType,
};

const PHASE_ACCEPT: u8 = 6;

/// The checker for right-growing bouncers. A single instance is advanced by each simulation
/// step; all positions are taken from the live simulation.
#[derive(Debug, Default)]
struct BouncerChecker {
    phase: u8,
    /// The left u-turn zone (Base) including one margin cell.
    base: Vec<u8>,
    /// The right u-turn zone (Head).
    head_zone: Vec<u8>,
    buffer1: Vec<u8>,
    buffer2: Vec<u8>,
    increment1: Vec<u8>,
    state1: TransitionType,
    state2: TransitionType,
    base_len: isize,
    head_len: isize,
    buffer_len: isize,
    increment_len: isize,
}

impl BouncerChecker {
    fn clear(&mut self) {
        *self = Self::default();
    }

    fn check(&mut self, sim: &Simulation) {
        let curr = sim.head as isize;
        let min_pos = sim.min_pos_seen() as isize;
        let max_pos = sim.max_pos_seen() as isize;

        match self.phase {
            0 => {
                // Wait until 4 or more cells are visited and the head is in the left half. If
                // the machine is a unilateral bouncer to the right that has to happen between
                // bounces once the repeated section grows big enough. The sizes are picked as
                // growing values, so bouncers are caught even if the values are bigger than
                // necessary.
                if max_pos - min_pos >= 3 && curr <= (min_pos + max_pos) / 2 {
                    self.head_len = (max_pos - min_pos) / 3;
                    self.buffer_len = (max_pos - min_pos) / 3;
                    self.phase = 1;
                }
            }
            1 => {
                // The checker stays in phase 1 as long as the head stays on the Base and
                // Buffer segments.
                if curr == max_pos - self.head_len + 1 {
                    // the head entered the Head zone:
                    //   ...000 (Base)(Buffer1)(Head) 000...  head at start of (Head), State1
                    self.base_len = curr - self.buffer_len - min_pos;
                    self.base = sim.tape_segment(min_pos, min_pos + self.base_len);
                    self.buffer1 = sim.tape_segment(curr - self.buffer_len, curr - 1);
                    self.state1 = sim.state;
                    self.head_zone = sim.tape_segment(curr, max_pos);
                    self.phase = 2;
                }
            }
            2 => {
                // The checker stays in phase 2 while the head stays on Buffer and Head,
                // moving those to the right as max_pos grows.
                if curr == max_pos - self.head_len - self.buffer_len {
                    // the head entered the Increment segment:
                    //   ...000 (Base)(Increment1)(Buffer2)(Head) 000...  State2
                    // Base and Head must be unchanged; there was no opportunity to change
                    // Base, so only Head is checked.
                    if self.head_zone == sim.tape_segment(max_pos - self.head_len + 1, max_pos) {
                        self.increment_len = (curr + 1) - (min_pos + self.base_len);
                        if self.increment_len > 0 {
                            self.increment1 = sim.tape_segment(min_pos + self.base_len, curr);
                            self.state2 = sim.state;
                            self.buffer2 = sim.tape_segment(curr + 1, curr + self.buffer_len);
                            self.phase = 3;
                        } else {
                            // no growth
                            self.phase = 0;
                        }
                    } else {
                        self.phase = 0;
                    }
                }
            }
            3 => {
                // The checker stays in phase 3 while the head stays on Buffer and Increment.
                if curr == min_pos + self.base_len - 1 {
                    // the head entered the Base segment:
                    //   ...000 (Base)(Buffer2)(Increment2)(Head) 000...  State2
                    if self.state2 == sim.state
                        && self.buffer2 == sim.tape_segment(curr + 1, curr + self.buffer_len)
                    {
                        // the new increment needs no check here, nothing left of the head
                        // zone had an opportunity to change since it was written
                        self.phase = 4;
                    } else {
                        self.phase = 0;
                    }
                }
                if curr == max_pos - self.head_len + 1 {
                    // wrong exit direction
                    self.phase = 0;
                }
            }
            4 => {
                // The checker stays in phase 4 while the head stays on Base and Buffer.
                if curr == min_pos + self.base_len + self.buffer_len {
                    // the head entered the Increment segment from the left:
                    //   ...000 (Base)(Buffer1)(Increment2)(Head) 000...  State1
                    if self.state1 == sim.state
                        && self.base == sim.tape_segment(min_pos, curr - self.buffer_len)
                        && self.buffer1 == sim.tape_segment(min_pos + self.base_len, curr - 1)
                    {
                        self.phase = 5;
                    } else {
                        self.phase = 0;
                    }
                }
                if max_pos - min_pos
                    > self.base_len + self.head_len + self.increment_len + self.buffer_len
                {
                    // the visited tape grows while the head is on the left side, this drift
                    // is not handled and the checks start from the beginning
                    self.phase = 0;
                }
            }
            5 => {
                // The checker stays in phase 5 while the head stays on Buffer and Increment.
                if curr == max_pos - self.head_len + 1 {
                    // the head re-entered the Head zone:
                    //   ...000 (Base)(Increment1)(Buffer1)(Head) 000...  State1, loop closed
                    if self.state1 == sim.state
                        && self.increment1
                            == sim.tape_segment(
                                min_pos + self.base_len,
                                curr - self.buffer_len - 1,
                            )
                        && self.buffer1 == sim.tape_segment(curr - self.buffer_len, curr - 1)
                    {
                        self.phase = PHASE_ACCEPT;
                    } else {
                        self.phase = 0;
                    }
                }
                if curr == min_pos + self.base_len - 1 {
                    // wrong exit direction
                    self.phase = 0;
                }
            }
            _ => {}
        }
    }
}

#[derive(Debug)]
pub struct DeciderBouncer {
    step_limit: StepTypeSmall,
    space_limit: usize,
    /// Runs the check on the mirrored machine to detect left-growing bouncers.
    mirrored: bool,
    checker: BouncerChecker,
    records_aggregator: Option<Arc<BouncerRecords>>,
}

impl DeciderBouncer {
    pub fn new(config: &Config) -> Self {
        Self {
            step_limit: config.step_limit_bouncer(),
            space_limit: config.space_limit_cells(),
            mirrored: config.bouncer_mirrored(),
            checker: BouncerChecker::default(),
            records_aggregator: None,
        }
    }

    pub fn new_with_aggregator(config: &Config, records_aggregator: Arc<BouncerRecords>) -> Self {
        let mut decider = Self::new(config);
        decider.records_aggregator = Some(records_aggregator);
        decider
    }
}

impl Decider for DeciderBouncer {
    fn decider_id() -> &'static DeciderId {
        &DECIDER_BOUNCER_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        self.checker.clear();
        let machine_run = if self.mirrored {
            machine.machine().mirrored()
        } else {
            *machine.machine()
        };
        let mut sim = Simulation::new(&machine_run, self.step_limit, self.space_limit);

        loop {
            sim.observe();
            self.checker.check(&sim);
            if self.checker.phase == PHASE_ACCEPT {
                if let Some(aggregator) = &self.records_aggregator {
                    aggregator.note(
                        self.checker.increment1.len(),
                        sim.time,
                        sim.span(),
                        machine.id(),
                    );
                }
                return MachineStatus::DecidedNonHalt(NonHaltReason::Bouncer(sim.time));
            }

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

    // grows one cell to the right per bounce, left end fixed
    const RIGHT_BOUNCER: &str = "1LB1RA_0RA1LB";

    fn decide(tm: &str, mirrored: bool) -> MachineStatus {
        let machine = MachineId::new_no_id(MachineBinary::try_from(tm).unwrap());
        let config = Config::builder(machine.machine().n_states())
            .step_limit_bouncer(10_000)
            .space_limit_cells(500)
            .bouncer_mirrored(mirrored)
            .build();
        DeciderBouncer::decide_single_machine(&machine, &config)
    }

    #[test]
    fn decider_bouncer_finds_right_bouncer() {
        assert!(decide(RIGHT_BOUNCER, false).is_bouncer());
    }

    #[test]
    fn decider_bouncer_right_bouncer_not_found_mirrored() {
        // mirrored the machine grows to the left, which the right check cannot see
        assert!(!decide(RIGHT_BOUNCER, true).is_non_halt_proof());
    }

    #[test]
    fn decider_bouncer_finds_left_bouncer_mirrored_only() {
        let left_bouncer = MachineBinary::try_from(RIGHT_BOUNCER)
            .unwrap()
            .mirrored()
            .to_standard_tm_text_format();
        assert!(!decide(&left_bouncer, false).is_non_halt_proof());
        assert!(decide(&left_bouncer, true).is_bouncer());
    }

    #[test]
    fn decider_bouncer_cycler_is_not_a_bouncer() {
        assert!(!decide("0RB0RB_0LA0LA", false).is_non_halt_proof());
        assert!(!decide("0RB0RB_0LA0LA", true).is_non_halt_proof());
    }

    #[test]
    fn decider_bouncer_bb5_champion_is_not_decided() {
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Max.machine());
        let config = Config::builder(5)
            .step_limit_bouncer(1000)
            .space_limit_cells(500)
            .build();
        let status = DeciderBouncer::decide_single_machine(&machine, &config);
        assert!(!status.is_non_halt_proof());
    }

    #[test]
    fn decider_bouncer_reports_increment_record() {
        let machine = MachineId::new_no_id(MachineBinary::try_from(RIGHT_BOUNCER).unwrap());
        let config = Config::builder(2).step_limit_bouncer(10_000).build();
        let aggregator = Arc::new(BouncerRecords::default());
        let mut decider = DeciderBouncer::new_with_aggregator(&config, Arc::clone(&aggregator));
        let status = decider.decide_machine(&machine);
        assert!(status.is_bouncer());
        let snapshot = aggregator.snapshot();
        assert!(snapshot.max_increment_size > 0);
        assert!(snapshot.max_detection_time > 0);
    }
}
