//! The worker harness of a decider run. \
//! The machines of the configured id range are fanned out over N workers; worker i strides
//! through the range with step N, so the work is spread evenly without any coordination.
//! When an undecided-index file is supplied the workers stride over the index entries
//! instead, still clamped to the id range. \
//! Each worker owns its decider instance and runs batches of machines; the proven non-halt
//! ids are appended to the decided sink, heuristic ids to the separate heuristic sink.
//! Appends are atomic at 4-byte record granularity, the order of ids in the output file is
//! unspecified.

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        mpsc,
    },
    thread,
    time::{Duration, Instant},
};

use crate::{
    config::{Config, IdBig},
    data_provider::{bb_file_reader::SeedDatabase, undecided_index::UndecidedIndex},
    decider::{
        decider_result::{BatchData, DeciderResultStats, EndReason, ResultUnitEndReason},
        DeciderCaller,
    },
    index_file::IndexFileWriter,
    machine_binary::MachineId,
    reporter::Reporter,
};

/// The output sinks of a run. Proven ids and heuristic ids are kept strictly apart:
/// heuristic results never certify machines as decided.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunSinks<'a> {
    pub decided: Option<&'a IndexFileWriter>,
    pub heuristic: Option<&'a IndexFileWriter>,
}

/// Runs one decider over the seed database with the strided worker fan-out. \
/// Blocks until all workers are done and returns the merged result stats.
pub fn run_decider_strided(
    decider_caller: &DeciderCaller,
    config: &Config,
    db: &SeedDatabase,
    undecided_index: Option<&UndecidedIndex>,
    sinks: &RunSinks,
) -> DeciderResultStats {
    let num_machines_db = db.num_machines();
    let range = config.file_id_range().unwrap_or(0..num_machines_db);
    let min_index = range.start;
    let max_index = range.end.min(num_machines_db);
    let num_workers = config.n_workers();

    let total = match undecided_index {
        Some(index) => index.len() as u64,
        None => max_index.saturating_sub(min_index),
    };
    let mut reporter = Reporter::new_default(total);
    let num_processed = AtomicU64::new(0);

    let mut result_main = DeciderResultStats::new(config);
    result_main.set_name(format!(
        "{}: {} workers over {} machines",
        decider_caller.decider_id().name,
        num_workers,
        total
    ));
    let start = Instant::now();

    thread::scope(|s| {
        let (send_finished_worker, receive_finished_worker) = mpsc::channel::<DeciderResultStats>();
        for worker_no in 0..num_workers {
            let send = send_finished_worker.clone();
            let num_processed = &num_processed;
            let decider_caller = *decider_caller;
            let sinks = *sinks;
            s.spawn(move || {
                let result = run_worker(
                    worker_no,
                    num_workers,
                    &decider_caller,
                    config,
                    db,
                    undecided_index,
                    &sinks,
                    min_index,
                    max_index,
                    num_processed,
                );
                // unwrap error can occur if the main thread gave up, nothing to do then
                send.send(result).unwrap_or_default();
            });
        }
        drop(send_finished_worker);

        let mut num_finished = 0;
        while num_finished < num_workers {
            match receive_finished_worker.recv_timeout(Duration::from_millis(500)) {
                Ok(worker_result) => {
                    result_main.add_result(&worker_result);
                    num_finished += 1;
                }
                Err(mpsc::RecvTimeoutError::Timeout) => {
                    if reporter.is_due_progress() {
                        println!("{}", reporter.report(num_processed.load(Ordering::Relaxed)));
                    }
                }
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    // A worker ended without reporting its result, the totals are
                    // incomplete and the run must not look clean.
                    result_main.end_reason = EndReason::Error(
                        0,
                        format!(
                            "only {num_finished} of {num_workers} workers reported a result"
                        ),
                    );
                    break;
                }
            }
        }
    });

    result_main.duration = start.elapsed();
    result_main
}

#[allow(clippy::too_many_arguments)]
fn run_worker(
    worker_no: usize,
    num_workers: usize,
    decider_caller: &DeciderCaller,
    config: &Config,
    db: &SeedDatabase,
    undecided_index: Option<&UndecidedIndex>,
    sinks: &RunSinks,
    min_index: IdBig,
    max_index: IdBig,
    num_processed: &AtomicU64,
) -> DeciderResultStats {
    let mut result = DeciderResultStats::new(config);
    let mut machines: Vec<MachineId> = Vec::with_capacity(config.batch_size());

    match undecided_index {
        None => {
            let mut machine_id = min_index + worker_no as IdBig;
            while machine_id < max_index {
                match db.machine(machine_id) {
                    Ok(machine) => machines.push(machine),
                    Err(e) => {
                        // A bad record ends this worker, the partial totals stay in the
                        // result and the error is surfaced with the run.
                        result.end_reason = EndReason::Error(machine_id, e.to_string());
                        return result;
                    }
                }
                if machines.len() >= config.batch_size() {
                    if !run_batch(&machines, decider_caller, config, sinks, &mut result) {
                        return result;
                    }
                    num_processed.fetch_add(machines.len() as u64, Ordering::Relaxed);
                    machines.clear();
                }
                machine_id += num_workers as IdBig;
            }
        }
        Some(index) => {
            let mut entry_no = worker_no;
            while entry_no < index.len() {
                let machine_id = index.machine_id(entry_no);
                if machine_id >= min_index && machine_id < max_index {
                    match db.machine(machine_id) {
                        Ok(machine) => machines.push(machine),
                        Err(e) => {
                            result.end_reason = EndReason::Error(machine_id, e.to_string());
                            return result;
                        }
                    }
                    if machines.len() >= config.batch_size() {
                        if !run_batch(&machines, decider_caller, config, sinks, &mut result) {
                            return result;
                        }
                        num_processed.fetch_add(machines.len() as u64, Ordering::Relaxed);
                        machines.clear();
                    }
                } else {
                    num_processed.fetch_add(1, Ordering::Relaxed);
                }
                entry_no += num_workers;
            }
        }
    }

    // remaining partial batch
    if !machines.is_empty() {
        run_batch(&machines, decider_caller, config, sinks, &mut result);
        num_processed.fetch_add(machines.len() as u64, Ordering::Relaxed);
    }

    result
}

/// Runs one batch and routes the resulting ids to the sinks. Returns false when the run
/// must stop (the error is kept in the result).
fn run_batch(
    machines: &[MachineId],
    decider_caller: &DeciderCaller,
    config: &Config,
    sinks: &RunSinks,
    result: &mut DeciderResultStats,
) -> bool {
    match run_batch_inner(machines, decider_caller, config, sinks, result) {
        Ok(()) => true,
        Err(end_reason) => {
            result.end_reason = end_reason;
            false
        }
    }
}

fn run_batch_inner(
    machines: &[MachineId],
    decider_caller: &DeciderCaller,
    config: &Config,
    sinks: &RunSinks,
    result: &mut DeciderResultStats,
) -> ResultUnitEndReason {
    let mut batch_data = BatchData::new(machines, decider_caller.decider_id(), config);
    decider_caller.f_decider()(&mut batch_data)?;

    if let Some(writer) = sinks.decided {
        for &machine_id in batch_data.ids_nonhalt.iter() {
            writer.append_id(machine_id)?;
        }
    }
    if let Some(writer) = sinks.heuristic {
        for &machine_id in batch_data.ids_heuristic.iter() {
            writer.append_id(machine_id)?;
        }
    }
    result.add_result(&batch_data.result_decided);

    Ok(())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::{
        config::MAX_STATES,
        decider::DeciderStandard,
        index_file,
        machine_binary::MachineBinary,
    };

    /// Builds a minimal seed database in the teachers file format: a 30-byte header
    /// followed by the given machines.
    fn build_test_db(machines: &[&str], file_name: &str) -> String {
        let dir = std::env::temp_dir().join("bb_nonhalt_test_engine");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);

        let mut bytes = vec![0u8; 30];
        bytes[8..12].copy_from_slice(&(machines.len() as u32).to_be_bytes());
        for tm in machines {
            let machine = MachineBinary::try_from(*tm).unwrap();
            for state in 1..=MAX_STATES {
                for symbol in 0..2 {
                    let tr = machine.transition_for_state_symbol(state, symbol);
                    if tr.is_halt() || tr.is_unused() {
                        bytes.extend_from_slice(&[0, 0, 0]);
                    } else {
                        bytes.extend_from_slice(&[
                            tr.symbol() as u8,
                            if tr.is_dir_left() { 1 } else { 0 },
                            tr.state() as u8,
                        ]);
                    }
                }
            }
        }
        std::fs::write(&path, bytes).unwrap();

        path.to_str().unwrap().to_string()
    }

    fn out_file(file_name: &str) -> String {
        let dir = std::env::temp_dir().join("bb_nonhalt_test_engine");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);
        let _ = std::fs::remove_file(&path);
        path.to_str().unwrap().to_string()
    }

    #[test]
    fn engine_strided_run_writes_decided_ids() {
        // machine 0 and 2 are cyclers, machine 1 halts
        let db_path = build_test_db(
            &[
                "0RB0RB_0LA0LA",
                "1RB1LC_0LB1LA_1RD1LB_1RE0RD_0RA---",
                "0RB0RB_0LA0LA",
            ],
            "db_cyclers",
        );
        let db = SeedDatabase::try_load(&db_path).unwrap();
        assert_eq!(3, db.num_machines());

        let out_path = out_file("out_cyclers");
        let writer = IndexFileWriter::create(&out_path).unwrap();
        let sinks = RunSinks {
            decided: Some(&writer),
            heuristic: None,
        };
        let config = Config::builder(5).n_workers(2).batch_size(2).build();
        let caller = DeciderStandard::Cycler.decider_caller();

        let result = run_decider_strided(&caller, &config, &db, None, &sinks);
        assert_eq!(3, result.num_evaluated());
        assert_eq!(2, result.num_nonhalt());
        assert_eq!(1, result.num_halt());
        // a clean run carries no error end reason
        assert_eq!(EndReason::None, result.end_reason);

        // the output order is unspecified, compare as a set
        let ids = index_file::read_index_file(&out_path).unwrap();
        assert!(index_file::same_id_set(&[0, 2], &ids));
        std::fs::remove_file(&out_path).unwrap();
    }

    #[test]
    fn engine_undecided_index_filters_machines() {
        let db_path = build_test_db(
            &[
                "0RB0RB_0LA0LA",
                "1RB1LC_0LB1LA_1RD1LB_1RE0RD_0RA---",
                "0RB0RB_0LA0LA",
            ],
            "db_filtered",
        );
        let db = SeedDatabase::try_load(&db_path).unwrap();

        // only machine 2 is in the undecided index
        let index_bytes: Vec<u8> = 2u32.to_be_bytes().to_vec();
        let index = UndecidedIndex::try_from_bytes(&index_bytes).unwrap();

        let out_path = out_file("out_filtered");
        let writer = IndexFileWriter::create(&out_path).unwrap();
        let sinks = RunSinks {
            decided: Some(&writer),
            heuristic: None,
        };
        let config = Config::builder(5).n_workers(2).build();
        let caller = DeciderStandard::Cycler.decider_caller();

        let result = run_decider_strided(&caller, &config, &db, Some(&index), &sinks);
        assert_eq!(1, result.num_evaluated());
        assert_eq!(1, result.num_nonhalt());

        let ids = index_file::read_index_file(&out_path).unwrap();
        assert_eq!(vec![2u32], ids);
        std::fs::remove_file(&out_path).unwrap();
    }

    #[test]
    fn engine_heuristic_ids_go_to_separate_sink() {
        // the shuttle is a cycler for the decider and a few-records machine for the
        // counting heuristic
        let db_path = build_test_db(&["0RB0RB_0LA0LA"], "db_heuristic");
        let db = SeedDatabase::try_load(&db_path).unwrap();

        let out_decided = out_file("out_heuristic_decided");
        let out_heuristic = out_file("out_heuristic_flagged");
        let writer_decided = IndexFileWriter::create(&out_decided).unwrap();
        let writer_heuristic = IndexFileWriter::create(&out_heuristic).unwrap();
        let sinks = RunSinks {
            decided: Some(&writer_decided),
            heuristic: Some(&writer_heuristic),
        };
        let config = Config::builder(5)
            .n_workers(1)
            .step_limit_sampler(10_000)
            .build();
        let caller = DeciderStandard::CountRecordTimes.decider_caller();

        let result = run_decider_strided(&caller, &config, &db, None, &sinks);
        assert_eq!(1, result.num_heuristic());
        assert_eq!(0, result.num_nonhalt());

        // the heuristic id landed in the heuristic sink only
        assert!(index_file::read_index_file(&out_decided).unwrap().is_empty());
        assert_eq!(
            vec![0u32],
            index_file::read_index_file(&out_heuristic).unwrap()
        );
        std::fs::remove_file(&out_decided).unwrap();
        std::fs::remove_file(&out_heuristic).unwrap();
    }
}
