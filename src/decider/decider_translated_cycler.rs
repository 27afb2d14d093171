//! This is the translated-cycler decider. \
//! A translated cycler repeats an earlier configuration up to a rigid translation of the tape
//! while drifting into fresh territory on one side. \
//! How it works: \
//! A record step is a step where the head visits a cell strictly outside the seen range. For
//! each record the full tape is snapshotted, keyed by the record side and the (state, read)
//! pair. On a new record every past record with the same key is tested for translational
//! equivalence: walk from both record positions simultaneously towards the seen region and
//! compare symbols until a cell is reached which was not touched since the past record. If all
//! compared symbols match, everything the machine can still reach is identical up to the
//! translation and the run repeats shifted forever. \
//! The detection also yields the values S (steps before the first record, plus one) and P (the
//! period), which can be reported to a shared record aggregator.

use std::sync::Arc;

use crate::{
    config::{Config, StepTypeSmall, NUM_FIELDS},
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, DECIDER_TRANSLATED_CYCLER_ID,
    },
    machine_binary::MachineId,
    records::TranslatedCyclerRecords,
    status::{MachineStatus, NonHaltReason, UndecidedReason},
    tape::{Simulation, StepOutcome},
};

const SIDE_MIN: usize = 0;
const SIDE_MAX: usize = 1;

/// A record-breaking configuration: tape snapshot, step and head position.
#[derive(Debug)]
struct Record {
    tape: Box<[u8]>,
    time: StepTypeSmall,
    pos: usize,
}

#[derive(Debug)]
pub struct DeciderTranslatedCycler {
    step_limit: StepTypeSmall,
    space_limit: usize,
    /// Past records by side (min/max) and transition field id (state * 2 + read).
    records: [[Vec<Record>; NUM_FIELDS]; 2],
    /// Optional shared aggregator for the S and P maxima.
    records_aggregator: Option<Arc<TranslatedCyclerRecords>>,
}

impl DeciderTranslatedCycler {
    pub fn new(config: &Config) -> Self {
        Self {
            step_limit: config.step_limit_cycler(),
            space_limit: config.space_limit_cells(),
            records: Default::default(),
            records_aggregator: None,
        }
    }

    pub fn new_with_aggregator(
        config: &Config,
        records_aggregator: Arc<TranslatedCyclerRecords>,
    ) -> Self {
        let mut decider = Self::new(config);
        decider.records_aggregator = Some(records_aggregator);
        decider
    }

    fn clear(&mut self) {
        for side in self.records.iter_mut() {
            for field in side.iter_mut() {
                field.clear();
            }
        }
    }

    /// Tests translational equivalence of the past record and the current (not yet stored)
    /// record at the head of the simulation. The walk moves towards the seen region: to the
    /// right for min-side records, to the left for max-side records.
    fn records_are_equivalent(side: usize, past: &Record, sim: &Simulation) -> bool {
        let walk = if side == SIDE_MIN { 1 } else { -1 };
        let mut offset: isize = 0;

        loop {
            let past_pos = past.pos as isize + offset;
            if past_pos < 0 || past_pos >= sim.tape_len() as isize {
                break;
            }

            let cell = sim.cell(past_pos as usize);
            if !cell.seen || cell.last_time_seen < past.time {
                break;
            }

            // The walk stays between the record positions and the seen region, so the
            // current-side index is always in bounds when the past-side index is.
            let curr_pos = (sim.head as isize + offset) as usize;
            if sim.cell(curr_pos).symbol != past.tape[past_pos as usize] {
                return false;
            }

            offset += walk;
        }

        true
    }
}

impl Decider for DeciderTranslatedCycler {
    fn decider_id() -> &'static DeciderId {
        &DECIDER_TRANSLATED_CYCLER_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        self.clear();
        let mut sim = Simulation::new(machine.machine(), self.step_limit, self.space_limit);

        loop {
            // A record step: the head is strictly outside the seen range.
            if sim.head < sim.min_pos_seen() || sim.head > sim.max_pos_seen() {
                let side = if sim.head < sim.min_pos_seen() {
                    SIDE_MIN
                } else {
                    SIDE_MAX
                };
                let field_id = sim.state as usize * 2 + sim.peek_symbol() as usize;

                for past in self.records[side][field_id].iter() {
                    if Self::records_are_equivalent(side, past, &sim) {
                        // See https://groups.google.com/g/busy-beaver-discuss/c/lcr_6buFz_8
                        let value_s = past.time + 1;
                        let value_p = sim.time - past.time;
                        if let Some(aggregator) = &self.records_aggregator {
                            aggregator.note(value_s, value_p, machine.id());
                        }
                        return MachineStatus::DecidedNonHalt(NonHaltReason::TranslatedCycler(
                            sim.time, value_p,
                        ));
                    }
                }

                self.records[side][field_id].push(Record {
                    tape: sim.snapshot_symbols(),
                    time: sim.time,
                    pos: sim.head,
                });
                sim.widen_seen_range_to_head();
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
    use crate::{
        decider::decider_cycler::DeciderCycler, machine_binary::MachineBinary,
        machine_binary::NotableMachineBinary,
    };

    fn decide(tm: &str) -> MachineStatus {
        let machine = MachineId::new_no_id(MachineBinary::try_from(tm).unwrap());
        let config = Config::builder(machine.machine().n_states())
            .step_limit_cycler(1000)
            .space_limit_cells(500)
            .build();
        DeciderTranslatedCycler::decide_single_machine(&machine, &config)
    }

    #[test]
    fn decider_translated_cycler_finds_right_drifting_machine() {
        let status = decide("1RB1RB_1RA1RA");
        assert!(status.is_translated_cycler());
    }

    #[test]
    fn decider_translated_cycler_finds_left_drifting_machine() {
        let status = decide("1LB1LB_1LA1LA");
        assert!(status.is_translated_cycler());
    }

    #[test]
    fn decider_translated_cycler_plain_cycler_is_not_decided() {
        // bounces in place, breaks only two records and never an equivalent pair
        let status = decide("0RB0RB_0LA0LA");
        assert!(status.is_undecided());
        // but the plain cycler decider finds it
        let machine = MachineId::new_no_id(MachineBinary::try_from("0RB0RB_0LA0LA").unwrap());
        let config = Config::new_default(2);
        assert!(DeciderCycler::decide_single_machine(&machine, &config).is_cycler());
    }

    #[test]
    fn decider_translated_cycler_bb5_champion_is_not_decided() {
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Max.machine());
        let config = Config::builder(5)
            .step_limit_cycler(1000)
            .space_limit_cells(500)
            .build();
        let status = DeciderTranslatedCycler::decide_single_machine(&machine, &config);
        assert!(!status.is_non_halt_proof());
    }

    #[test]
    fn decider_translated_cycler_reuse_leaks_no_state_between_machines() {
        let config = Config::new_default(2);
        let mut decider = DeciderTranslatedCycler::new(&config);
        let drifting = MachineId::new_no_id(MachineBinary::try_from("1RB1RB_1RA1RA").unwrap());
        let shuttle = MachineId::new_no_id(MachineBinary::try_from("0RB0RB_0LA0LA").unwrap());
        let first = decider.decide_machine(&drifting);
        assert!(decider.decide_machine(&shuttle).is_undecided());
        let third = decider.decide_machine(&drifting);
        assert!(first.is_translated_cycler());
        assert_eq!(first, third);
    }

    #[test]
    fn decider_translated_cycler_reports_s_and_p_records() {
        let machine = MachineId::new_no_id(MachineBinary::try_from("1RB1RB_1RA1RA").unwrap());
        let config = Config::new_default(2);
        let aggregator = Arc::new(TranslatedCyclerRecords::default());
        let mut decider =
            DeciderTranslatedCycler::new_with_aggregator(&config, Arc::clone(&aggregator));
        let status = decider.decide_machine(&machine);
        assert!(status.is_translated_cycler());
        let snapshot = aggregator.snapshot();
        assert!(snapshot.max_value_s > 0);
        assert!(snapshot.max_value_p > 0);
    }
}
