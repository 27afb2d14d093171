//! Record-counting heuristic. \
//! Having only a few records in a long run is a hint of an exponential-counter type of
//! behavior. Typical values are <= 80 records for 10M steps. \
//! This is a coarse filter for counter candidates, not a proof of anything.

use crate::{
    config::{Config, StepTypeSmall},
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, HEURISTIC_COUNT_RECORDS_ID,
    },
    heuristic::sampler::{record_times, SIDE_L, SIDE_R},
    machine_binary::MachineId,
    status::{HeuristicReason, MachineStatus, UndecidedReason},
};

#[derive(Debug)]
pub struct HeuristicCountRecords {
    time_limit: StepTypeSmall,
    record_limit: usize,
}

impl HeuristicCountRecords {
    pub fn new(config: &Config) -> Self {
        Self {
            time_limit: config.step_limit_sampler(),
            record_limit: config.record_limit_counting(),
        }
    }
}

impl Decider for HeuristicCountRecords {
    fn decider_id() -> &'static DeciderId {
        &HEURISTIC_COUNT_RECORDS_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        let records = record_times(machine.machine(), self.time_limit, self.record_limit);

        if records[SIDE_R].len() <= self.record_limit && records[SIDE_L].len() <= self.record_limit
        {
            MachineStatus::HeuristicNonHalt(HeuristicReason::FewRecords)
        } else {
            MachineStatus::Undecided(UndecidedReason::DeciderNoResult, self.time_limit as u64, 0)
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
    use crate::machine_binary::MachineBinary;

    #[test]
    fn heuristic_count_records_flags_in_place_machine() {
        // the two-cell shuttle breaks two records in total
        let machine = MachineId::new_no_id(MachineBinary::try_from("0RB0RB_0LA0LA").unwrap());
        let config = Config::builder(2)
            .step_limit_sampler(10_000)
            .record_limit_counting(80)
            .build();
        let status = HeuristicCountRecords::decide_single_machine(&machine, &config);
        assert_eq!(
            MachineStatus::HeuristicNonHalt(HeuristicReason::FewRecords),
            status
        );
    }

    #[test]
    fn heuristic_count_records_does_not_flag_drifting_machine() {
        // every step of the drifting machine is a record
        let machine = MachineId::new_no_id(MachineBinary::try_from("1RB1RB_1RA1RA").unwrap());
        let config = Config::builder(2)
            .step_limit_sampler(10_000)
            .record_limit_counting(80)
            .build();
        let status = HeuristicCountRecords::decide_single_machine(&machine, &config);
        assert!(!status.is_heuristic());
    }
}
