pub mod decider_backward_reasoning;
pub mod decider_bouncer;
pub mod decider_cycler;
pub mod decider_engine;
pub mod decider_halting_segment;
pub mod decider_result;
pub mod decider_translated_cycler;

use crate::{
    config::Config,
    decider::{
        decider_backward_reasoning::DeciderBackwardReasoning,
        decider_bouncer::DeciderBouncer,
        decider_cycler::DeciderCycler,
        decider_halting_segment::DeciderHaltingSegment,
        decider_result::{BatchData, EndReason, ResultUnitEndReason},
        decider_translated_cycler::DeciderTranslatedCycler,
    },
    heuristic::{
        heuristic_count_records::HeuristicCountRecords,
        heuristic_exponential::HeuristicExponentialRecordTimes,
        heuristic_polynomial::HeuristicPolynomialPassageTimes,
    },
    machine_binary::MachineId,
    status::MachineStatus,
};

// Deciders in this library
pub const DECIDER_CYCLER_ID: DeciderId = DeciderId {
    id: 10,
    name: "Decider Cycler",
    sub_dir: "cyclers",
};
pub const DECIDER_TRANSLATED_CYCLER_ID: DeciderId = DeciderId {
    id: 20,
    name: "Decider Translated Cycler",
    sub_dir: "translated-cyclers",
};
pub const DECIDER_BOUNCER_ID: DeciderId = DeciderId {
    id: 30,
    name: "Decider Unilateral Bouncer",
    sub_dir: "unilateral-bouncers",
};
pub const DECIDER_BACKWARD_REASONING_ID: DeciderId = DeciderId {
    id: 40,
    name: "Decider Backward Reasoning",
    sub_dir: "backward-reasoning",
};
pub const DECIDER_HALTING_SEGMENT_ID: DeciderId = DeciderId {
    id: 50,
    name: "Decider Halting Segment",
    sub_dir: "halting-segment",
};
// The heuristics are run through the same harness but their output is routed to a
// separate sink, they never certify machines as decided.
pub const HEURISTIC_POLYNOMIAL_ID: DeciderId = DeciderId {
    id: 60,
    name: "Heuristic Polynomial Passage Times",
    sub_dir: "heuristic-polynomial-passage-times",
};
pub const HEURISTIC_EXPONENTIAL_ID: DeciderId = DeciderId {
    id: 61,
    name: "Heuristic Exponential Record Times",
    sub_dir: "heuristic-exponential-record-times",
};
pub const HEURISTIC_COUNT_RECORDS_ID: DeciderId = DeciderId {
    id: 62,
    name: "Heuristic Counting Record Times",
    sub_dir: "heuristic-counting-record-times",
};

pub type FnDeciderRunBatch = fn(&mut BatchData) -> ResultUnitEndReason;

/// These are the provided deciders and heuristics. This library should enable you to write
/// your own decider.
#[derive(Debug, Clone, Copy)]
pub enum DeciderStandard {
    Cycler,
    TranslatedCycler,
    Bouncer,
    BackwardReasoning,
    HaltingSegment,
    PolynomialPassageTimes,
    ExponentialRecordTimes,
    CountRecordTimes,
}

impl DeciderStandard {
    pub fn decider_caller(&self) -> DeciderCaller<'static> {
        match self {
            DeciderStandard::Cycler => {
                DeciderCaller::new(&DECIDER_CYCLER_ID, DeciderCycler::decider_run_batch)
            }
            DeciderStandard::TranslatedCycler => DeciderCaller::new(
                &DECIDER_TRANSLATED_CYCLER_ID,
                DeciderTranslatedCycler::decider_run_batch,
            ),
            DeciderStandard::Bouncer => {
                DeciderCaller::new(&DECIDER_BOUNCER_ID, DeciderBouncer::decider_run_batch)
            }
            DeciderStandard::BackwardReasoning => DeciderCaller::new(
                &DECIDER_BACKWARD_REASONING_ID,
                DeciderBackwardReasoning::decider_run_batch,
            ),
            DeciderStandard::HaltingSegment => DeciderCaller::new(
                &DECIDER_HALTING_SEGMENT_ID,
                DeciderHaltingSegment::decider_run_batch,
            ),
            DeciderStandard::PolynomialPassageTimes => DeciderCaller::new(
                &HEURISTIC_POLYNOMIAL_ID,
                HeuristicPolynomialPassageTimes::decider_run_batch,
            ),
            DeciderStandard::ExponentialRecordTimes => DeciderCaller::new(
                &HEURISTIC_EXPONENTIAL_ID,
                HeuristicExponentialRecordTimes::decider_run_batch,
            ),
            DeciderStandard::CountRecordTimes => DeciderCaller::new(
                &HEURISTIC_COUNT_RECORDS_ID,
                HeuristicCountRecords::decider_run_batch,
            ),
        }
    }
}

/// This struct defines the call to the decider function and its name.
#[derive(Debug, Clone, Copy)]
pub struct DeciderCaller<'a> {
    decider_id: &'a DeciderId,
    f_decider: FnDeciderRunBatch,
}

impl<'a> DeciderCaller<'a> {
    pub fn new(decider_id: &'a DeciderId, f_decider: FnDeciderRunBatch) -> Self {
        Self {
            decider_id,
            f_decider,
        }
    }

    pub fn decider_id(&self) -> &'a DeciderId {
        self.decider_id
    }

    pub fn f_decider(&self) -> FnDeciderRunBatch {
        self.f_decider
    }
}

/// Decider identification. As only the function to run the decider is passed, the id can not
/// be requested from the decider and needs to be carried separately.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeciderId {
    pub id: usize,
    pub name: &'static str,
    pub sub_dir: &'static str,
}

pub trait Decider {
    fn decider_id() -> &'static DeciderId;

    /// Returns the result of this decider for one single machine. \
    /// Each run must clear self variables as the decider is re-used for all machines (in a batch).
    fn decide_machine(&mut self, machine: &MachineId) -> MachineStatus;

    /// Allows to test a single machine. This is just a convenience function, where a decider
    /// is created and one machine is run. This causes more overhead than setting up the decider
    /// once and use it for multiple machines.
    fn decide_single_machine(machine: &MachineId, config: &Config) -> MachineStatus;

    fn decider_run_batch(batch_data: &mut BatchData) -> ResultUnitEndReason;
}

/// Runs one decider over all machines of the batch, sorting the ids into the proven and the
/// heuristic list. This part is identical for all deciders.
#[inline]
pub fn decider_generic_run_batch(
    mut decider: impl Decider,
    batch_data: &mut BatchData,
) -> ResultUnitEndReason {
    if batch_data.machines.is_empty() {
        return Err(EndReason::NoBatchData);
    }

    for machine in batch_data.machines.iter() {
        let status = decider.decide_machine(machine);
        match status {
            MachineStatus::DecidedNonHalt(_) => batch_data.ids_nonhalt.push(machine.id()),
            MachineStatus::HeuristicNonHalt(_) => batch_data.ids_heuristic.push(machine.id()),
            _ => {}
        }
        batch_data.result_decided.add(machine, &status);
    }

    Ok(())
}
