//! Exponential record-times heuristic. \
//! A counter-like machine extends its touched region at times which grow roughly like a
//! geometric sequence R[i+1] ~ A * R[i]. On the side with more records the sequence
//! e_i = R[i+1] - A * R[i] is formed for every multiplier A and subsampling step; a vanishing
//! second finite difference on the last points flags the machine. \
//! This is a HEURISTIC: the result is a suspicion, not a proof.

use crate::{
    config::{Config, StepTypeSmall},
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, HEURISTIC_EXPONENTIAL_ID,
    },
    heuristic::{
        all_zero, discrete_difference, sample_list,
        sampler::{record_times, SIDE_L, SIDE_R},
    },
    machine_binary::MachineId,
    status::{HeuristicReason, MachineStatus, UndecidedReason},
};

#[derive(Debug)]
pub struct HeuristicExponentialRecordTimes {
    time_limit: StepTypeSmall,
    record_limit: usize,
    points_to_conclude: usize,
    max_multiplier: i64,
    max_sampling_step: usize,
}

impl HeuristicExponentialRecordTimes {
    pub fn new(config: &Config) -> Self {
        Self {
            time_limit: config.step_limit_sampler(),
            record_limit: config.record_limit(),
            points_to_conclude: config.points_to_conclude(),
            max_multiplier: config.max_multiplier(),
            max_sampling_step: config.max_sampling_step_exponential(),
        }
    }
}

impl Decider for HeuristicExponentialRecordTimes {
    fn decider_id() -> &'static DeciderId {
        &HEURISTIC_EXPONENTIAL_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        let records = record_times(machine.machine(), self.time_limit, self.record_limit);

        // take the side with the most records
        let side = if records[SIDE_L].len() > records[SIDE_R].len() {
            SIDE_L
        } else {
            SIDE_R
        };

        // too many records means exponential behavior is unlikely
        if records[side].len() > self.record_limit {
            return MachineStatus::Undecided(
                UndecidedReason::DeciderNoResult,
                self.time_limit as u64,
                0,
            );
        }

        for sampling_step in 1..=self.max_sampling_step {
            for multiplier in 2..=self.max_multiplier {
                let subseq = sample_list(&records[side], 0, sampling_step);
                let exponential_seq: Vec<i64> = subseq
                    .windows(2)
                    .map(|w| w[1] - multiplier * w[0])
                    .collect();

                let second_difference = discrete_difference(&exponential_seq, 2);
                if second_difference.len() >= self.points_to_conclude
                    && all_zero(
                        &second_difference[second_difference.len() - self.points_to_conclude..],
                    )
                {
                    return MachineStatus::HeuristicNonHalt(
                        HeuristicReason::ExponentialRecordTimes,
                    );
                }
            }
        }

        MachineStatus::Undecided(UndecidedReason::DeciderNoResult, self.time_limit as u64, 0)
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

    #[test]
    fn heuristic_exponential_does_not_flag_bb5_champion() {
        // the champion produces far more than record_limit records within the time limit
        let machine = MachineId::new_no_id(NotableMachineBinary::BB5Max.machine());
        let config = Config::builder(5)
            .step_limit_sampler(10_000_000)
            .record_limit(200)
            .points_to_conclude(8)
            .max_multiplier(5)
            .max_sampling_step_exponential(5)
            .build();
        let status = HeuristicExponentialRecordTimes::decide_single_machine(&machine, &config);
        assert!(!status.is_heuristic());
    }

    #[test]
    fn heuristic_exponential_flags_fitting_record_sequence() {
        // linear record times leave a linear e_i for any multiplier, which the second
        // difference cannot distinguish from a true exponential fit... the heuristic is
        // unsound on purpose
        let machine = MachineId::new_no_id(MachineBinary::try_from("1RB1RB_1RA1RA").unwrap());
        let config = Config::builder(2)
            .step_limit_sampler(300)
            .record_limit(500)
            .points_to_conclude(10)
            .build();
        let status = HeuristicExponentialRecordTimes::decide_single_machine(&machine, &config);
        assert_eq!(
            MachineStatus::HeuristicNonHalt(HeuristicReason::ExponentialRecordTimes),
            status
        );
    }

    #[test]
    fn heuristic_exponential_does_not_flag_quadratic_records() {
        // the bouncer's record times are quadratic, the second difference of e_i stays at
        // a non-zero constant for every multiplier
        let machine = MachineId::new_no_id(MachineBinary::try_from("1LB1RA_0RA1LB").unwrap());
        let config = Config::builder(2)
            .step_limit_sampler(100_000)
            .record_limit(500)
            .points_to_conclude(10)
            .build();
        let status = HeuristicExponentialRecordTimes::decide_single_machine(&machine, &config);
        assert!(!status.is_heuristic());
    }
}
