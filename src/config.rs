//! This crate holds the Config struct which is used to configure a decider run.

use std::fmt::Display;

use num_format::ToFormattedString;

use crate::toml::ConfigToml;

/// Lazily loaded config.toml with the machine-local file paths.
pub static CONFIG_TOML: std::sync::LazyLock<ConfigToml> =
    std::sync::LazyLock::new(ConfigToml::read_toml);

/// Number of machines in the full bbchallenge seed database.
pub const TOTAL_UNDECIDED: u64 = 88_664_064;

// --- Below are program defining definitions, where changes may have a serious impact. ---

/// Number type used for step counters and node counters of a single machine run.
/// u32 is sufficient for every configured limit and keeps the recorded data small.
pub type StepTypeSmall = u32;
/// Number type used for accumulated counters over many machines.
pub type StepTypeBig = u64;
/// Number type for the machine id in the seed database.
pub type IdBig = u64;

/// Number of states the program can handle. The seed database is all 5-state machines.
pub const MAX_STATES: usize = 5;
/// Size of the 1D transition array: 2 fields per state plus the unused fields for state 0.
pub const NUM_FIELDS: usize = MAX_STATES * 2 + 2;

/// Direction encoding of the seed database. The arithmetic in the backward deciders relies on it.
pub const DIR_RIGHT_SEED: u8 = 0;
pub const DIR_LEFT_SEED: u8 = 1;

/// Only used in Default to initialize, use new_default() instead.
pub const N_STATES_DEFAULT: usize = 5;
const BATCH_SIZE_DEFAULT: usize = 1000;
const CPU_UTILIZATION_DEFAULT: usize = 100;

// Limit defaults, these are the values the production runs over the seed database used.
const STEP_LIMIT_CYCLER_DEFAULT: StepTypeSmall = 1000;
const STEP_LIMIT_BOUNCER_DEFAULT: StepTypeSmall = 100_000;
const STEP_LIMIT_SAMPLER_DEFAULT: StepTypeSmall = 100_000;
const SPACE_LIMIT_DEFAULT: usize = 500;
const BACKWARD_DEPTH_DEFAULT: usize = 5;
const SEGMENT_NODE_LIMIT_DEFAULT: usize = 100;
const RECORD_LIMIT_DEFAULT: usize = 200;
const RECORD_LIMIT_COUNTING_DEFAULT: usize = 80;
const POINTS_TO_CONCLUDE_DEFAULT: usize = 10;
const MAX_TIME_BEHAVIOR_BEGIN_DEFAULT: StepTypeSmall = 5;
const MAX_SAMPLING_STEP_DEFAULT: usize = 40;
const MAX_SAMPLING_STEP_EXPONENTIAL_DEFAULT: usize = 5;
const MAX_MULTIPLIER_DEFAULT: i64 = 5;

/// This sets the configuration for a decider run. \
/// Use [Self::new_default] or the [Self::builder] to create a Config. \
/// Since the config is designed immutable, one can use [Self::builder_from_config] to copy values
/// of an existing config and make changes.
/// # Example
/// ```
/// use bb_nonhalt::config::Config;
///
/// let config = Config::new_default(5);
/// assert_eq!(5, config.n_states());
/// assert_eq!(1000, config.step_limit_cycler());
///
/// let config = Config::builder(5).step_limit_cycler(10_000).build();
/// assert_eq!(10_000, config.step_limit_cycler());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    n_states: usize,
    /// Search step limit for the cycler and translated-cycler deciders. A cycle can only be
    /// identified once the repeated configuration is reached a second time, so the loop size
    /// found is at most half this limit.
    step_limit_cycler: StepTypeSmall,
    /// Search step limit for the bouncer decider.
    step_limit_bouncer: StepTypeSmall,
    /// Forward simulation limit for the sampling heuristics.
    step_limit_sampler: StepTypeSmall,
    /// Limit on `max_pos_seen - min_pos_seen` of the forward simulations. The working tape
    /// array is allocated as twice this value, head starting at the midpoint.
    space_limit_cells: usize,
    /// Depth bound of the backward-reasoning predecessor search.
    backward_depth: usize,
    /// Node budget of the halting-segment search (total expansions over all widenings).
    segment_node_limit: usize,
    /// Initial half-width of the halting-segment window.
    segment_half_width: usize,
    /// If set, the halting segment search retries with a wider window when a
    /// start-fitting predecessor is found, until the node budget runs out.
    segment_recursive: bool,
    /// Record-count cap of the sampling heuristics.
    record_limit: usize,
    /// Record-count cap of the record-counting heuristic (lower than record_limit on purpose).
    record_limit_counting: usize,
    /// Number of zero points of the finite difference the heuristics require to conclude.
    points_to_conclude: usize,
    /// Latest first-passage time for the polynomial behavior to begin.
    max_time_behavior_begin: StepTypeSmall,
    /// Maximum subsampling step of the polynomial heuristic.
    max_sampling_step: usize,
    /// Maximum subsampling step of the exponential heuristic.
    max_sampling_step_exponential: usize,
    /// Maximum multiplier A of the exponential recurrence fitting.
    max_multiplier: i64,
    /// Run the bouncer check on the mirrored (L/R swapped) machine to detect left bouncers.
    bouncer_mirrored: bool,
    /// Ids from the seed database (start, end exclusive). If None then all.
    file_id_range: Option<std::ops::Range<IdBig>>,
    /// batch size of the per-worker decider batches
    batch_size: usize,
    /// Number of workers. 0 derives the count from cpu_utilization_percent.
    n_workers: usize,
    /// CPU utilization in percent, e.g. 75 -> 6 of 8 cores used. 0-150 allowed.
    cpu_utilization_percent: usize,
    /// This many undecided machines are kept in the DeciderResultStats for later analysis.
    limit_machines_undecided: usize,
}

impl Config {
    /// Builder to initialize required values.
    pub fn builder(n_states: usize) -> ConfigBuilder {
        ConfigBuilder::new(n_states)
    }

    /// Builder to initialize required values taking over values of existing config.
    pub fn builder_from_config(config: &Config) -> ConfigBuilder {
        ConfigBuilder::new_config(config)
    }

    /// Default values as used by the production runs. Better use builder.
    pub fn new_default(n_states: usize) -> Config {
        Self {
            n_states,
            step_limit_cycler: STEP_LIMIT_CYCLER_DEFAULT,
            step_limit_bouncer: STEP_LIMIT_BOUNCER_DEFAULT,
            step_limit_sampler: STEP_LIMIT_SAMPLER_DEFAULT,
            space_limit_cells: SPACE_LIMIT_DEFAULT,
            backward_depth: BACKWARD_DEPTH_DEFAULT,
            segment_node_limit: SEGMENT_NODE_LIMIT_DEFAULT,
            segment_half_width: 0,
            segment_recursive: true,
            record_limit: RECORD_LIMIT_DEFAULT,
            record_limit_counting: RECORD_LIMIT_COUNTING_DEFAULT,
            points_to_conclude: POINTS_TO_CONCLUDE_DEFAULT,
            max_time_behavior_begin: MAX_TIME_BEHAVIOR_BEGIN_DEFAULT,
            max_sampling_step: MAX_SAMPLING_STEP_DEFAULT,
            max_sampling_step_exponential: MAX_SAMPLING_STEP_EXPONENTIAL_DEFAULT,
            max_multiplier: MAX_MULTIPLIER_DEFAULT,
            bouncer_mirrored: false,
            file_id_range: None,
            batch_size: BATCH_SIZE_DEFAULT,
            n_workers: 0,
            cpu_utilization_percent: CPU_UTILIZATION_DEFAULT,
            limit_machines_undecided: 0,
        }
    }

    pub fn backward_depth(&self) -> usize {
        self.backward_depth
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn bouncer_mirrored(&self) -> bool {
        self.bouncer_mirrored
    }

    pub fn cpu_utilization_percent(&self) -> usize {
        self.cpu_utilization_percent
    }

    pub fn file_id_range(&self) -> Option<std::ops::Range<IdBig>> {
        self.file_id_range.clone()
    }

    pub fn file_id_range_to_string(&self) -> String {
        let locale = user_locale();
        if let Some(range) = &self.file_id_range {
            format!(
                "{}..{}",
                range.start.to_formatted_string(&locale),
                range.end.to_formatted_string(&locale)
            )
        } else {
            "unlimited".to_string()
        }
    }

    pub fn limit_machines_undecided(&self) -> usize {
        self.limit_machines_undecided
    }

    pub fn max_multiplier(&self) -> i64 {
        self.max_multiplier
    }

    pub fn max_sampling_step(&self) -> usize {
        self.max_sampling_step
    }

    pub fn max_sampling_step_exponential(&self) -> usize {
        self.max_sampling_step_exponential
    }

    pub fn max_time_behavior_begin(&self) -> StepTypeSmall {
        self.max_time_behavior_begin
    }

    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Returns the worker count: the explicit -n value, or the cpu percentage if not set.
    pub fn n_workers(&self) -> usize {
        if self.n_workers > 0 {
            self.n_workers
        } else {
            workers_for_cpu_percentage(self.cpu_utilization_percent)
        }
    }

    pub fn points_to_conclude(&self) -> usize {
        self.points_to_conclude
    }

    pub fn record_limit(&self) -> usize {
        self.record_limit
    }

    pub fn record_limit_counting(&self) -> usize {
        self.record_limit_counting
    }

    pub fn segment_half_width(&self) -> usize {
        self.segment_half_width
    }

    pub fn segment_node_limit(&self) -> usize {
        self.segment_node_limit
    }

    pub fn segment_recursive(&self) -> bool {
        self.segment_recursive
    }

    pub fn space_limit_cells(&self) -> usize {
        self.space_limit_cells
    }

    pub fn step_limit_bouncer(&self) -> StepTypeSmall {
        self.step_limit_bouncer
    }

    pub fn step_limit_cycler(&self) -> StepTypeSmall {
        self.step_limit_cycler
    }

    pub fn step_limit_sampler(&self) -> StepTypeSmall {
        self.step_limit_sampler
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new_default(N_STATES_DEFAULT)
    }
}

#[derive(Default)]
pub struct ConfigBuilder {
    ref_config: Config,
    n_states: usize,
    step_limit_cycler: Option<StepTypeSmall>,
    step_limit_bouncer: Option<StepTypeSmall>,
    step_limit_sampler: Option<StepTypeSmall>,
    space_limit_cells: Option<usize>,
    backward_depth: Option<usize>,
    segment_node_limit: Option<usize>,
    segment_half_width: Option<usize>,
    segment_recursive: Option<bool>,
    record_limit: Option<usize>,
    record_limit_counting: Option<usize>,
    points_to_conclude: Option<usize>,
    max_time_behavior_begin: Option<StepTypeSmall>,
    max_sampling_step: Option<usize>,
    max_sampling_step_exponential: Option<usize>,
    max_multiplier: Option<i64>,
    bouncer_mirrored: Option<bool>,
    file_id_range: Option<std::ops::Range<IdBig>>,
    batch_size: Option<usize>,
    n_workers: Option<usize>,
    cpu_utilization_percent: Option<usize>,
    limit_machines_undecided: Option<usize>,
}

impl ConfigBuilder {
    fn new(n_states: usize) -> Self {
        Self {
            n_states,
            ref_config: Config::new_default(n_states),
            ..Default::default() // All: None,
        }
    }

    fn new_config(config: &Config) -> ConfigBuilder {
        Self {
            ref_config: config.clone(),
            n_states: config.n_states,
            ..Default::default()
        }
    }

    pub fn backward_depth(mut self, depth: usize) -> Self {
        self.backward_depth = Some(depth);
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    pub fn bouncer_mirrored(mut self, value: bool) -> Self {
        self.bouncer_mirrored = Some(value);
        self
    }

    pub fn cpu_utilization(mut self, percent: usize) -> Self {
        self.cpu_utilization_percent = Some(percent);
        self
    }

    pub fn file_id_range(mut self, file_id_range: std::ops::Range<IdBig>) -> Self {
        self.file_id_range = Some(file_id_range);
        self
    }

    pub fn limit_machines_undecided(mut self, value: usize) -> Self {
        self.limit_machines_undecided = Some(value);
        self
    }

    pub fn max_multiplier(mut self, value: i64) -> Self {
        self.max_multiplier = Some(value);
        self
    }

    pub fn max_sampling_step(mut self, value: usize) -> Self {
        self.max_sampling_step = Some(value);
        self
    }

    pub fn max_sampling_step_exponential(mut self, value: usize) -> Self {
        self.max_sampling_step_exponential = Some(value);
        self
    }

    pub fn max_time_behavior_begin(mut self, value: StepTypeSmall) -> Self {
        self.max_time_behavior_begin = Some(value);
        self
    }

    pub fn n_workers(mut self, value: usize) -> Self {
        self.n_workers = Some(value);
        self
    }

    pub fn points_to_conclude(mut self, value: usize) -> Self {
        self.points_to_conclude = Some(value);
        self
    }

    pub fn record_limit(mut self, value: usize) -> Self {
        self.record_limit = Some(value);
        self
    }

    pub fn record_limit_counting(mut self, value: usize) -> Self {
        self.record_limit_counting = Some(value);
        self
    }

    pub fn segment_half_width(mut self, value: usize) -> Self {
        self.segment_half_width = Some(value);
        self
    }

    pub fn segment_node_limit(mut self, value: usize) -> Self {
        self.segment_node_limit = Some(value);
        self
    }

    pub fn segment_recursive(mut self, value: bool) -> Self {
        self.segment_recursive = Some(value);
        self
    }

    pub fn space_limit_cells(mut self, value: usize) -> Self {
        self.space_limit_cells = Some(value);
        self
    }

    pub fn step_limit_bouncer(mut self, step_limit: StepTypeSmall) -> Self {
        self.step_limit_bouncer = Some(step_limit);
        self
    }

    pub fn step_limit_cycler(mut self, step_limit: StepTypeSmall) -> Self {
        self.step_limit_cycler = Some(step_limit);
        self
    }

    pub fn step_limit_sampler(mut self, step_limit: StepTypeSmall) -> Self {
        self.step_limit_sampler = Some(step_limit);
        self
    }

    pub fn build(self) -> Config {
        Config {
            n_states: self.n_states,
            step_limit_cycler: self
                .step_limit_cycler
                .unwrap_or(self.ref_config.step_limit_cycler),
            step_limit_bouncer: self
                .step_limit_bouncer
                .unwrap_or(self.ref_config.step_limit_bouncer),
            step_limit_sampler: self
                .step_limit_sampler
                .unwrap_or(self.ref_config.step_limit_sampler),
            space_limit_cells: self
                .space_limit_cells
                .unwrap_or(self.ref_config.space_limit_cells),
            backward_depth: self.backward_depth.unwrap_or(self.ref_config.backward_depth),
            segment_node_limit: self
                .segment_node_limit
                .unwrap_or(self.ref_config.segment_node_limit),
            segment_half_width: self
                .segment_half_width
                .unwrap_or(self.ref_config.segment_half_width),
            segment_recursive: self
                .segment_recursive
                .unwrap_or(self.ref_config.segment_recursive),
            record_limit: self.record_limit.unwrap_or(self.ref_config.record_limit),
            record_limit_counting: self
                .record_limit_counting
                .unwrap_or(self.ref_config.record_limit_counting),
            points_to_conclude: self
                .points_to_conclude
                .unwrap_or(self.ref_config.points_to_conclude),
            max_time_behavior_begin: self
                .max_time_behavior_begin
                .unwrap_or(self.ref_config.max_time_behavior_begin),
            max_sampling_step: self
                .max_sampling_step
                .unwrap_or(self.ref_config.max_sampling_step),
            max_sampling_step_exponential: self
                .max_sampling_step_exponential
                .unwrap_or(self.ref_config.max_sampling_step_exponential),
            max_multiplier: self.max_multiplier.unwrap_or(self.ref_config.max_multiplier),
            bouncer_mirrored: self
                .bouncer_mirrored
                .unwrap_or(self.ref_config.bouncer_mirrored),
            file_id_range: self.file_id_range.or(self.ref_config.file_id_range),
            batch_size: self.batch_size.unwrap_or(self.ref_config.batch_size),
            n_workers: self.n_workers.unwrap_or(self.ref_config.n_workers),
            cpu_utilization_percent: self
                .cpu_utilization_percent
                .unwrap_or(self.ref_config.cpu_utilization_percent),
            limit_machines_undecided: self
                .limit_machines_undecided
                .unwrap_or(self.ref_config.limit_machines_undecided),
        }
    }
}

impl Display for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let locale = user_locale();
        write!(
            f,
            "Limit Steps Cycler: {}, Bouncer: {}, Sampler: {}, Space: {}, ",
            self.step_limit_cycler.to_formatted_string(&locale),
            self.step_limit_bouncer.to_formatted_string(&locale),
            self.step_limit_sampler.to_formatted_string(&locale),
            self.space_limit_cells.to_formatted_string(&locale),
        )?;
        write!(
            f,
            "Backward Depth: {}, Segment Nodes: {}, File Id Range: {}",
            self.backward_depth,
            self.segment_node_limit,
            self.file_id_range_to_string()
        )
    }
}

pub fn user_locale() -> num_format::Locale {
    num_format::Locale::en
}

/// Worker count for the given CPU utilization. Clamped to 0-150% (110% can be better to
/// actually utilize 100%), always at least one worker.
fn workers_for_cpu_percentage(percent: usize) -> usize {
    (num_cpus::get() * percent.min(150) / 100).max(1)
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn config_workers_for_cpu_percentage_is_clamped() {
        let cpus = num_cpus::get();
        assert_eq!(1, workers_for_cpu_percentage(0));
        assert_eq!(cpus.max(1), workers_for_cpu_percentage(100));
        assert_eq!((cpus * 3 / 2).max(1), workers_for_cpu_percentage(900));
    }

    #[test]
    fn config_n_workers_prefers_explicit_count() {
        let config = Config::builder(5).n_workers(3).build();
        assert_eq!(3, config.n_workers());
        let config = Config::new_default(5);
        assert!(config.n_workers() >= 1);
    }
}
