//! Polynomial passage-times heuristic. \
//! A machine whose behavior is polynomial passes every tape cell at times which eventually
//! follow a polynomial of low degree. For every cell the passage-time list is subsampled with
//! steps 1..max_sampling_step; when a subsample which starts early enough has a vanishing
//! third finite difference on its last points, the machine is flagged. \
//! This is a HEURISTIC: the result is a suspicion, not a proof.

use crate::{
    config::{Config, StepTypeSmall},
    decider::{
        self,
        decider_result::{BatchData, ResultUnitEndReason},
        Decider, DeciderId, HEURISTIC_POLYNOMIAL_ID,
    },
    heuristic::{all_zero, discrete_difference, sample_list, sampler::passage_times},
    machine_binary::MachineId,
    status::{HeuristicReason, MachineStatus, UndecidedReason},
};

#[derive(Debug)]
pub struct HeuristicPolynomialPassageTimes {
    time_limit: StepTypeSmall,
    points_to_conclude: usize,
    max_time_behavior_begin: StepTypeSmall,
    max_sampling_step: usize,
}

impl HeuristicPolynomialPassageTimes {
    pub fn new(config: &Config) -> Self {
        Self {
            time_limit: config.step_limit_sampler(),
            points_to_conclude: config.points_to_conclude(),
            max_time_behavior_begin: config.max_time_behavior_begin(),
            max_sampling_step: config.max_sampling_step(),
        }
    }
}

impl Decider for HeuristicPolynomialPassageTimes {
    fn decider_id() -> &'static DeciderId {
        &HEURISTIC_POLYNOMIAL_ID
    }

    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus {
        let passages = passage_times(machine.machine(), self.time_limit);

        for passage in passages.values() {
            for sampling_step in 1..self.max_sampling_step {
                if sampling_step >= passage.len() {
                    break;
                }
                let subseq = sample_list(passage, 0, sampling_step);
                if subseq[0] >= self.max_time_behavior_begin as i64 {
                    continue;
                }
                let third_difference = discrete_difference(&subseq, 3);
                if third_difference.len() > self.points_to_conclude
                    && all_zero(
                        &third_difference[third_difference.len() - 1 - self.points_to_conclude..],
                    )
                {
                    return MachineStatus::HeuristicNonHalt(
                        HeuristicReason::PolynomialPassageTimes,
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
