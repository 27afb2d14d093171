use num_format::ToFormattedString;
use std::{fmt::Display, time::Duration};

use crate::{
    config::{user_locale, Config, IdBig},
    decider::DeciderId,
    machine_binary::MachineId,
    reporter::format_duration_hhmmss_ms,
    status::{MachineStatus, NonHaltReason},
};

pub type ResultUnitEndReason = Result<(), EndReason>;

#[non_exhaustive]
#[derive(Debug, Default, Clone, PartialEq)]
pub enum EndReason {
    /// Final end reason of the decider run.
    AllMachinesChecked,
    /// Error Machine Id, msg
    Error(u64, String),
    /// A legit result, e.g. when a batch carries no machines.
    NoBatchData,
    /// Default state indicating no action has been taken yet.
    #[default]
    None,
}

impl From<std::io::Error> for EndReason {
    fn from(error: std::io::Error) -> Self {
        Self::Error(0, error.to_string())
    }
}

impl Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EndReason::AllMachinesChecked => write!(f, "All machines checked"),
            EndReason::Error(m_id, message) => {
                let ms = if *m_id != 0 {
                    format!("Machine Id: {m_id}, ")
                } else {
                    String::new()
                };
                write!(f, "{ms}Error: {message}")
            }
            EndReason::NoBatchData => write!(f, "No data in this batch"),
            EndReason::None => write!(f, "No end reason"),
        }
    }
}

/// Breakdown of the proven non-halting machines by argument.
#[derive(Debug, Default, Clone, Copy)]
pub struct NonHaltCount {
    pub num_cycler: u64,
    pub num_translated_cycler: u64,
    pub num_bouncer: u64,
    pub num_backward_reasoning: u64,
    pub num_halting_segment: u64,
}

impl NonHaltCount {
    pub fn add_reason(&mut self, reason: &NonHaltReason) {
        match reason {
            NonHaltReason::Cycler(_, _) => self.num_cycler += 1,
            NonHaltReason::TranslatedCycler(_, _) => self.num_translated_cycler += 1,
            NonHaltReason::Bouncer(_) => self.num_bouncer += 1,
            NonHaltReason::BackwardReasoning(_) => self.num_backward_reasoning += 1,
            NonHaltReason::HaltingSegment(_, _) => self.num_halting_segment += 1,
        }
    }

    pub fn add_count(&mut self, other: &NonHaltCount) {
        self.num_cycler += other.num_cycler;
        self.num_translated_cycler += other.num_translated_cycler;
        self.num_bouncer += other.num_bouncer;
        self.num_backward_reasoning += other.num_backward_reasoning;
        self.num_halting_segment += other.num_halting_segment;
    }

    pub fn num_total(&self) -> u64 {
        self.num_cycler
            + self.num_translated_cycler
            + self.num_bouncer
            + self.num_backward_reasoning
            + self.num_halting_segment
    }
}

/// The result of a decider run. It holds a number of counters for each result type and may
/// carry a sample of the undecided machines for later analysis.
#[derive(Debug, Default)]
pub struct DeciderResultStats {
    /// Number of machines which have run through the decider.
    num_evaluated: u64,
    /// Machines proven to never halt. Only these ids go into the decided index file.
    num_nonhalt: u64,
    /// Machines flagged by an unsound heuristic. Kept strictly apart from num_nonhalt.
    num_heuristic: u64,
    /// Machines which halted during forward simulation.
    num_halt: u64,
    /// Machines without any result.
    num_undecided: u64,
    /// Breakdown of the proven non-halting machines.
    nonhalt_count: NonHaltCount,

    /// Store undecided machines up to this limit for later analysis.
    limit_machines_undecided: usize,
    machines_undecided: Vec<(MachineId, MachineStatus)>,
    pub end_reason: EndReason,

    // for statistical purposes and performance tests
    pub duration: Duration,
    /// Optional name of the run or any other info.
    names: Vec<String>,
}

impl DeciderResultStats {
    pub fn new(config: &Config) -> Self {
        DeciderResultStats {
            limit_machines_undecided: config.limit_machines_undecided(),
            ..Default::default()
        }
    }

    /// Records the status of one machine.
    pub fn add(&mut self, machine: &MachineId, status: &MachineStatus) {
        self.num_evaluated += 1;
        match status {
            MachineStatus::DecidedNonHalt(reason) => {
                self.num_nonhalt += 1;
                self.nonhalt_count.add_reason(reason);
            }
            MachineStatus::HeuristicNonHalt(_) => self.num_heuristic += 1,
            MachineStatus::DecidedHalts(_) => self.num_halt += 1,
            MachineStatus::Undecided(_, _, _) => {
                self.num_undecided += 1;
                if self.machines_undecided.len() < self.limit_machines_undecided {
                    self.machines_undecided.push((*machine, *status));
                }
            }
            MachineStatus::NoDecision => self.num_undecided += 1,
        }
    }

    /// Merges the result of another (batch or worker) run into this one.
    pub fn add_result(&mut self, other: &DeciderResultStats) {
        self.num_evaluated += other.num_evaluated;
        self.num_nonhalt += other.num_nonhalt;
        self.num_heuristic += other.num_heuristic;
        self.num_halt += other.num_halt;
        self.num_undecided += other.num_undecided;
        self.nonhalt_count.add_count(&other.nonhalt_count);
        for m in other.machines_undecided.iter() {
            if self.machines_undecided.len() >= self.limit_machines_undecided {
                break;
            }
            self.machines_undecided.push(*m);
        }
        if self.end_reason == EndReason::None {
            self.end_reason = other.end_reason.clone();
        }
        self.names.extend(other.names.iter().cloned());
    }

    pub fn machines_undecided(&self) -> &[(MachineId, MachineStatus)] {
        &self.machines_undecided
    }

    pub fn num_evaluated(&self) -> u64 {
        self.num_evaluated
    }

    pub fn num_halt(&self) -> u64 {
        self.num_halt
    }

    pub fn num_heuristic(&self) -> u64 {
        self.num_heuristic
    }

    pub fn num_nonhalt(&self) -> u64 {
        self.num_nonhalt
    }

    pub fn num_undecided(&self) -> u64 {
        self.num_undecided
    }

    pub fn nonhalt_count(&self) -> &NonHaltCount {
        &self.nonhalt_count
    }

    pub fn set_name(&mut self, name: String) {
        self.names.push(name);
    }
}

impl Display for DeciderResultStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let locale = user_locale();
        for name in self.names.iter() {
            writeln!(f, "{name}")?;
        }
        writeln!(
            f,
            "Evaluated: {}, Non-Halt: {}, Heuristic: {}, Halt: {}, Undecided: {}",
            self.num_evaluated.to_formatted_string(&locale),
            self.num_nonhalt.to_formatted_string(&locale),
            self.num_heuristic.to_formatted_string(&locale),
            self.num_halt.to_formatted_string(&locale),
            self.num_undecided.to_formatted_string(&locale),
        )?;
        let nc = &self.nonhalt_count;
        if nc.num_total() > 0 {
            writeln!(
                f,
                "  Cycler: {}, Translated Cycler: {}, Bouncer: {}, Backward: {}, Halting Segment: {}",
                nc.num_cycler.to_formatted_string(&locale),
                nc.num_translated_cycler.to_formatted_string(&locale),
                nc.num_bouncer.to_formatted_string(&locale),
                nc.num_backward_reasoning.to_formatted_string(&locale),
                nc.num_halting_segment.to_formatted_string(&locale),
            )?;
        }
        write!(f, "Duration: {}", format_duration_hhmmss_ms(self.duration))
    }
}

/// The work unit of one decider batch. The decider fills the result and the id lists; the
/// engine routes the proven ids and the heuristic ids to their separate sinks.
pub struct BatchData<'a> {
    pub machines: &'a [MachineId],
    pub result_decided: DeciderResultStats,
    /// Ids proven non-halting, for the decided index file.
    pub ids_nonhalt: Vec<IdBig>,
    /// Ids flagged by a heuristic, for the heuristically_decided index file.
    pub ids_heuristic: Vec<IdBig>,
    pub decider_id: &'a DeciderId,
    pub config: &'a Config,
}

impl<'a> BatchData<'a> {
    pub fn new(machines: &'a [MachineId], decider_id: &'a DeciderId, config: &'a Config) -> Self {
        Self {
            machines,
            result_decided: DeciderResultStats::new(config),
            ids_nonhalt: Vec::new(),
            ids_heuristic: Vec::new(),
            decider_id,
            config,
        }
    }
}
