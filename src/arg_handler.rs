//! This crate provides an argument handler for the typical flags of a decider run, e.g.
//! '-t 1000 -s 500 -m 0 -M 1000000 -n 8'. See below in the help_string().

use crate::config::{Config, IdBig, StepTypeSmall, TOTAL_UNDECIDED};

/// The parsed run arguments. Every flag is optional, [Self::to_config] falls back to the
/// configured defaults.
#[derive(Debug, Default)]
pub struct RunArgs {
    /// -m: min machine index to consider in the seed database
    pub min_index: Option<IdBig>,
    /// -M: max machine index to consider in the seed database (exclusive)
    pub max_index: Option<IdBig>,
    /// -n: worker count
    pub n_workers: Option<usize>,
    /// -f: undecided index file to use
    pub index_file: Option<String>,
    /// -t: time limit (steps, or nodes for the halting segment)
    pub time_limit: Option<StepTypeSmall>,
    /// -s: space limit
    pub space_limit: Option<usize>,
    /// -d: depth of the backward reasoning tree
    pub depth: Option<usize>,
    /// -r: record limit of the heuristics
    pub record_limit: Option<usize>,
    /// -c: number of points needed for a heuristic to conclude
    pub points_to_conclude: Option<usize>,
    /// -b: maximum time for the polynomial behavior to begin
    pub behavior_begin: Option<StepTypeSmall>,
    /// -k: maximum subsampling step used by a heuristic
    pub sampling_step: Option<usize>,
    /// -A: maximum multiplier in the recurrence equation fitting
    pub multiplier: Option<i64>,
    /// -i: invert the L and R direction of the machine to detect bouncers to the left
    pub invert_direction: bool,
    /// -p: report max S and P values of translated cyclers
    pub report_records: bool,
}

pub fn help_string() -> String {
    let mut s = String::new();
    s.push_str("This program accepts the following arguments:\n");
    s.push_str("-h, --help:       This help text\n");
    s.push_str("-m <index>:       min machine index to consider in seed database\n");
    s.push_str("-M <index>:       max machine index to consider in seed database\n");
    s.push_str("-n <workers>:     number of workers\n");
    s.push_str("-f <file>:        undecided index file to use\n");
    s.push_str("-t <steps>:       time limit (node limit for the halting segment)\n");
    s.push_str("-s <cells>:       space limit\n");
    s.push_str("-d <depth>:       depth of backward reasoning tree\n");
    s.push_str("-r <records>:     record limit of the heuristics\n");
    s.push_str("-c <points>:      points needed for a heuristic to conclude\n");
    s.push_str("-b <steps>:       max time for the polynomial behavior to begin\n");
    s.push_str("-k <step>:        max subsampling step of a heuristic\n");
    s.push_str("-A <multiplier>:  max multiplier in recurrence fitting\n");
    s.push_str("-i:               invert L/R to detect left bouncers\n");
    s.push_str("-p:               report max S and P values\n");
    s
}

/// Parses the arguments (args\[0\] is expected to be the program path).
pub fn parse_run_args(args: &[String]) -> Result<RunArgs, String> {
    let mut run_args = RunArgs::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                return Err(help_string());
            }
            "-i" => {
                run_args.invert_direction = true;
                i += 1;
            }
            "-p" => {
                run_args.report_records = true;
                i += 1;
            }
            flag => {
                let Some(value) = args.get(i + 1) else {
                    return Err(format!("Missing value for argument '{flag}'.\n{}", help_string()));
                };
                match flag {
                    "-m" => run_args.min_index = Some(parse_number(flag, value)?),
                    "-M" => run_args.max_index = Some(parse_number(flag, value)?),
                    "-n" => run_args.n_workers = Some(parse_number(flag, value)? as usize),
                    "-f" => run_args.index_file = Some(value.clone()),
                    "-t" => run_args.time_limit = Some(parse_number(flag, value)? as StepTypeSmall),
                    "-s" => run_args.space_limit = Some(parse_number(flag, value)? as usize),
                    "-d" => run_args.depth = Some(parse_number(flag, value)? as usize),
                    "-r" => run_args.record_limit = Some(parse_number(flag, value)? as usize),
                    "-c" => run_args.points_to_conclude = Some(parse_number(flag, value)? as usize),
                    "-b" => {
                        run_args.behavior_begin = Some(parse_number(flag, value)? as StepTypeSmall)
                    }
                    "-k" => run_args.sampling_step = Some(parse_number(flag, value)? as usize),
                    "-A" => run_args.multiplier = Some(parse_number(flag, value)? as i64),
                    _ => {
                        return Err(format!("Invalid argument '{flag}'.\n{}", help_string()));
                    }
                }
                i += 2;
            }
        }
    }

    Ok(run_args)
}

fn parse_number(flag: &str, value: &str) -> Result<u64, String> {
    value
        .parse::<u64>()
        .map_err(|_| format!("Invalid number '{value}' for argument '{flag}'."))
}

impl RunArgs {
    /// Builds a Config with the parsed values, unset flags fall back to the defaults.
    pub fn to_config(&self, n_states: usize) -> Config {
        let mut builder = Config::builder(n_states);
        if let Some(t) = self.time_limit {
            builder = builder
                .step_limit_cycler(t)
                .step_limit_bouncer(t)
                .step_limit_sampler(t)
                .segment_node_limit(t as usize);
        }
        if let Some(s) = self.space_limit {
            builder = builder.space_limit_cells(s);
        }
        if let Some(d) = self.depth {
            builder = builder.backward_depth(d);
        }
        if let Some(r) = self.record_limit {
            builder = builder.record_limit(r).record_limit_counting(r);
        }
        if let Some(c) = self.points_to_conclude {
            builder = builder.points_to_conclude(c);
        }
        if let Some(b) = self.behavior_begin {
            builder = builder.max_time_behavior_begin(b);
        }
        if let Some(k) = self.sampling_step {
            builder = builder
                .max_sampling_step(k)
                .max_sampling_step_exponential(k);
        }
        if let Some(a) = self.multiplier {
            builder = builder.max_multiplier(a);
        }
        if let Some(n) = self.n_workers {
            builder = builder.n_workers(n);
        }
        builder = builder.bouncer_mirrored(self.invert_direction);
        let min_index = self.min_index.unwrap_or(0);
        let max_index = self.max_index.unwrap_or(TOTAL_UNDECIDED);
        builder = builder.file_id_range(min_index..max_index);

        builder.build()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    fn to_args(args: &[&str]) -> Vec<String> {
        let mut v = vec!["path".to_string()];
        v.extend(args.iter().map(|s| s.to_string()));
        v
    }

    #[test]
    fn arg_handler_parses_common_flags() {
        let args = to_args(&["-t", "1000", "-s", "500", "-m", "10", "-M", "2000", "-n", "4", "-i"]);
        let run_args = parse_run_args(&args).unwrap();
        let config = run_args.to_config(5);
        assert_eq!(1000, config.step_limit_cycler());
        assert_eq!(500, config.space_limit_cells());
        assert_eq!(4, config.n_workers());
        assert!(config.bouncer_mirrored());
        assert_eq!(Some(10..2000), config.file_id_range());
    }

    #[test]
    fn arg_handler_rejects_unknown_flag() {
        let args = to_args(&["-x", "5"]);
        assert!(parse_run_args(&args).is_err());
    }

    #[test]
    fn arg_handler_rejects_missing_value() {
        let args = to_args(&["-t"]);
        assert!(parse_run_args(&args).is_err());
    }
}
