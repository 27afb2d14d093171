//! Forward-simulation sampler of the heuristics. \
//! Contrary to the deciders this runs on an unbounded sparse tape: the heuristics only look at
//! the collected sequences and the time limit bounds the touched cells anyway. \
//! Two samplings are taken: per-cell passage times (every step index at which the head sat on
//! the cell) and per-side record times (every step index at which the touched region grew).

use hashbrown::HashMap;

use crate::{
    config::StepTypeSmall,
    machine_binary::MachineBinary,
    tape::STATE_START,
    transition_binary::TransitionType,
};

/// Side index of the record lists, following the direction encoding of the seed database.
pub const SIDE_R: usize = 0;
pub const SIDE_L: usize = 1;

/// Per-cell passage times of a bounded forward run.
pub fn passage_times(
    machine: &MachineBinary,
    time_limit: StepTypeSmall,
) -> HashMap<i32, Vec<StepTypeSmall>> {
    let mut passages: HashMap<i32, Vec<StepTypeSmall>> = HashMap::new();
    let mut tape: HashMap<i32, u8> = HashMap::new();
    let mut pos: i32 = 0;
    let mut state: TransitionType = STATE_START;
    let mut time: StepTypeSmall = 0;

    while state > 0 && time < time_limit {
        passages.entry(pos).or_default().push(time);

        let read = *tape.get(&pos).unwrap_or(&0);
        let tr = machine.transition(state as usize * 2 + read as usize);
        tape.insert(pos, tr.symbol() as u8);
        state = tr.state();
        pos += tr.direction() as i32;
        time += 1;
    }

    passages
}

/// Per-side record times of a bounded forward run, index [SIDE_R] and [SIDE_L]. \
/// Step 0 counts as a record on both sides. Sampling stops early when either list exceeds
/// the record limit, the heuristics assume a bounded record count.
pub fn record_times(
    machine: &MachineBinary,
    time_limit: StepTypeSmall,
    record_limit: usize,
) -> [Vec<StepTypeSmall>; 2] {
    let mut records: [Vec<StepTypeSmall>; 2] = [vec![0], vec![0]];
    let mut tape: HashMap<i32, u8> = HashMap::new();
    let mut pos: i32 = 0;
    let mut state: TransitionType = STATE_START;
    let mut time: StepTypeSmall = 0;
    let mut min_record: i32 = 0;
    let mut max_record: i32 = 0;

    while state > 0
        && time < time_limit
        && records[SIDE_R].len() <= record_limit
        && records[SIDE_L].len() <= record_limit
    {
        if pos < min_record {
            min_record = pos;
            records[SIDE_L].push(time);
        }
        if pos > max_record {
            max_record = pos;
            records[SIDE_R].push(time);
        }

        let read = *tape.get(&pos).unwrap_or(&0);
        let tr = machine.transition(state as usize * 2 + read as usize);
        tape.insert(pos, tr.symbol() as u8);
        state = tr.state();
        pos += tr.direction() as i32;
        time += 1;
    }

    records
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::machine_binary::NotableMachineBinary;

    #[test]
    fn sampler_passage_times_of_halting_machine() {
        let machine = NotableMachineBinary::BB5Steps105.machine();
        let passages = passage_times(&machine, 100_000);
        // 105 steps in total, one passage entry per step
        let total: usize = passages.values().map(|p| p.len()).sum();
        assert_eq!(105, total);
        // the start cell is passed at step 0
        assert_eq!(0, passages[&0][0]);
    }

    #[test]
    fn sampler_record_times_of_drifting_machine() {
        // moves right every step, each step is a right record
        let machine = crate::machine_binary::MachineBinary::try_from("1RB1RB_1RA1RA").unwrap();
        let records = record_times(&machine, 1000, 2000);
        assert_eq!(vec![0u32], records[SIDE_L]);
        // initial 0 plus records at steps 1, 2, ...
        assert_eq!(0, records[SIDE_R][0]);
        assert_eq!(1, records[SIDE_R][1]);
        assert_eq!(2, records[SIDE_R][2]);
        assert!(records[SIDE_R].len() > 900);
    }

    #[test]
    fn sampler_record_times_stops_at_record_limit() {
        let machine = crate::machine_binary::MachineBinary::try_from("1RB1RB_1RA1RA").unwrap();
        let records = record_times(&machine, 1_000_000, 50);
        // one past the limit, the simulation stops there
        assert_eq!(51, records[SIDE_R].len());
    }
}
