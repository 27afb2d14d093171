use std::fmt::Display;

use num_format::ToFormattedString;

use crate::config::{user_locale, StepTypeBig, StepTypeSmall};

/// Some defined reasons why the machine will never halt. \
/// These are proofs: a decider only returns one of these when the non-halt argument is closed.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NonHaltReason {
    /// Cycler (steps run, number of steps in the cycle)
    Cycler(StepTypeSmall, StepTypeSmall),
    /// Translated cycler (steps run, period between the two equivalent records)
    TranslatedCycler(StepTypeSmall, StepTypeSmall),
    /// Unilateral bouncer (steps run until the bounce loop closed)
    Bouncer(StepTypeSmall),
    /// Backward reasoning closed every predecessor chain (deepest chain expanded)
    BackwardReasoning(StepTypeSmall),
    /// Halting segment closed (segment size in cells, nodes expanded)
    HaltingSegment(StepTypeSmall, StepTypeSmall),
}

/// Reasons of the unsound heuristics. These are suspicions, not proofs, and their machine ids
/// must be written to a separate sink.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum HeuristicReason {
    PolynomialPassageTimes,
    ExponentialRecordTimes,
    /// Both record lists stayed below the record limit (exponential counter candidate).
    FewRecords,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum UndecidedReason {
    DeciderNoResult,
    StepLimit,
    /// max_pos_seen - min_pos_seen exceeded the space limit
    SpaceLimit,
    /// The head ran over the bounds of the working tape array
    TapeBoundReached,
    /// Backward reasoning: a predecessor chain survived to the depth bound
    DepthLimit,
    /// Halting segment: the node budget ran out with a non-empty frontier
    NodeLimit,
    /// Halting segment: a predecessor fits the start configuration (non-recursive mode)
    StartConfigurationReachable,
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum MachineStatus {
    #[default]
    NoDecision,
    /// Proven: the machine never halts from the all-zero tape.
    DecidedNonHalt(NonHaltReason),
    /// The machine halted during forward simulation after the given steps.
    DecidedHalts(StepTypeBig),
    /// Suspected non-halt by an unsound heuristic. Never a proof.
    HeuristicNonHalt(HeuristicReason),
    /// UndecidedReason, stopped after steps, tape size in cells
    Undecided(UndecidedReason, StepTypeBig, u32),
}

impl MachineStatus {
    /// True only for proven non-halting, never for heuristic results.
    pub fn is_non_halt_proof(&self) -> bool {
        matches!(self, MachineStatus::DecidedNonHalt(_))
    }

    pub fn is_heuristic(&self) -> bool {
        matches!(self, MachineStatus::HeuristicNonHalt(_))
    }

    pub fn is_undecided(&self) -> bool {
        matches!(self, MachineStatus::Undecided(_, _, _))
    }

    pub fn is_cycler(&self) -> bool {
        matches!(
            self,
            MachineStatus::DecidedNonHalt(NonHaltReason::Cycler(_, _))
        )
    }

    pub fn is_translated_cycler(&self) -> bool {
        matches!(
            self,
            MachineStatus::DecidedNonHalt(NonHaltReason::TranslatedCycler(_, _))
        )
    }

    pub fn is_bouncer(&self) -> bool {
        matches!(self, MachineStatus::DecidedNonHalt(NonHaltReason::Bouncer(_)))
    }
}

impl Display for MachineStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let locale = user_locale();
        match self {
            MachineStatus::NoDecision => write!(f, "No decision"),
            MachineStatus::DecidedHalts(steps) => write!(
                f,
                "Decided: Halts after {} steps",
                steps.to_formatted_string(&locale)
            ),
            MachineStatus::DecidedNonHalt(reason) => match reason {
                NonHaltReason::Cycler(steps, cycle) => write!(
                    f,
                    "Decided: Non-halt, cycler with cycle size {cycle} found after {steps} steps"
                ),
                NonHaltReason::TranslatedCycler(steps, period) => write!(
                    f,
                    "Decided: Non-halt, translated cycler with period {period} found after {steps} steps"
                ),
                NonHaltReason::Bouncer(steps) => write!(
                    f,
                    "Decided: Non-halt, unilateral bouncer closed after {steps} steps"
                ),
                NonHaltReason::BackwardReasoning(depth) => write!(
                    f,
                    "Decided: Non-halt, backward reasoning closed at depth {depth}"
                ),
                NonHaltReason::HaltingSegment(segment_size, nodes) => write!(
                    f,
                    "Decided: Non-halt, halting segment of size {segment_size} closed after {nodes} nodes"
                ),
            },
            MachineStatus::HeuristicNonHalt(reason) => match reason {
                HeuristicReason::PolynomialPassageTimes => {
                    write!(f, "Heuristic: polynomial passage times (no proof)")
                }
                HeuristicReason::ExponentialRecordTimes => {
                    write!(f, "Heuristic: exponential record times (no proof)")
                }
                HeuristicReason::FewRecords => {
                    write!(f, "Heuristic: few side records (no proof)")
                }
            },
            MachineStatus::Undecided(reason, steps, tape_size) => match reason {
                UndecidedReason::DeciderNoResult => write!(f, "Undecided: No result"),
                UndecidedReason::StepLimit => write!(
                    f,
                    "Undecided: Step limit reached, machine did not halt for {} steps.",
                    steps.to_formatted_string(&locale)
                ),
                UndecidedReason::SpaceLimit => write!(
                    f,
                    "Undecided: Space limit {tape_size} reached after {steps} steps"
                ),
                UndecidedReason::TapeBoundReached => write!(
                    f,
                    "Undecided: Tape bound reached after {steps} steps (tape size {tape_size})"
                ),
                UndecidedReason::DepthLimit => write!(
                    f,
                    "Undecided: A predecessor chain reached the depth bound {steps}"
                ),
                UndecidedReason::NodeLimit => write!(
                    f,
                    "Undecided: Node budget exhausted after {steps} expansions"
                ),
                UndecidedReason::StartConfigurationReachable => write!(
                    f,
                    "Undecided: A backward path to the start configuration is possible"
                ),
            },
        }
    }
}
