//! The output index files of a run and the small utilities around them. \
//! An index file is an append-only concatenation of 4-byte big-endian machine ids in
//! arbitrary order. Appends go through a mutex so concurrent workers stay atomic at record
//! granularity; downstream consumers treat the file as a set and sort before comparing.

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    sync::Mutex,
};

use chrono::Local;

use crate::{
    config::{Config, IdBig},
    decider::DeciderId,
};

/// Append-only writer shared by the workers of a run.
#[derive(Debug)]
pub struct IndexFileWriter {
    file: Mutex<File>,
}

impl IndexFileWriter {
    pub fn create(file_path: &str) -> io::Result<Self> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(file_path)?;

        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one machine id as 4 bytes big-endian.
    pub fn append_id(&self, machine_id: IdBig) -> io::Result<()> {
        let bytes = (machine_id as u32).to_be_bytes();
        let mut file = self.file.lock().unwrap();
        file.write_all(&bytes)
    }
}

/// The output file name of a run, e.g.
/// `output/cyclers-20240812_153045-time-1000-space-500-minIndex-0-maxIndex-88664064`.
pub fn run_file_name(decider_id: &DeciderId, config: &Config, output_path: &str) -> String {
    let time_string = Local::now().format("%Y%m%d_%H%M%S");
    let range = config.file_id_range().unwrap_or(0..crate::config::TOTAL_UNDECIDED);
    format!(
        "{}{}-{}-time-{}-space-{}-minIndex-{}-maxIndex-{}",
        output_path,
        decider_id.sub_dir,
        time_string,
        config.step_limit_cycler(),
        config.space_limit_cells(),
        range.start,
        range.end,
    )
}

/// Reads all machine ids of an index file.
pub fn read_index_file(file_path: &str) -> io::Result<Vec<u32>> {
    let bytes = std::fs::read(file_path)?;
    if bytes.len() % 4 != 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("index file size {} is not a multiple of 4", bytes.len()),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| u32::from_be_bytes(c.try_into().unwrap()))
        .collect())
}

/// Writes the machine ids as an index file (not append, full content).
pub fn write_index_file(file_path: &str, machine_ids: &[u32]) -> io::Result<()> {
    let mut file = File::create(file_path)?;
    for id in machine_ids {
        file.write_all(&id.to_be_bytes())?;
    }

    Ok(())
}

pub fn is_sorted(machine_ids: &[u32]) -> bool {
    machine_ids.windows(2).all(|w| w[0] <= w[1])
}

/// Membership test on a sorted id list.
pub fn contains(sorted_machine_ids: &[u32], machine_id: u32) -> bool {
    sorted_machine_ids.binary_search(&machine_id).is_ok()
}

/// Tests that two index files hold the same ids modulo order.
pub fn same_id_set(machine_ids_a: &[u32], machine_ids_b: &[u32]) -> bool {
    if machine_ids_a.len() != machine_ids_b.len() {
        return false;
    }
    let mut a = machine_ids_a.to_vec();
    let mut b = machine_ids_b.to_vec();
    a.sort_unstable();
    b.sort_unstable();

    a == b
}

#[cfg(test)]
mod tests {

    use super::*;

    fn temp_file_path(name: &str) -> String {
        let dir = std::env::temp_dir().join("bb_nonhalt_test_index");
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name).to_str().unwrap().to_string()
    }

    #[test]
    fn index_file_write_read_round_trip_preserves_id_set() {
        let path = temp_file_path("round_trip");
        let _ = std::fs::remove_file(&path);
        let writer = IndexFileWriter::create(&path).unwrap();
        let ids = [7u32, 3, 70, 4500, 3];
        for &id in ids.iter() {
            writer.append_id(id as IdBig).unwrap();
        }
        drop(writer);

        let read_back = read_index_file(&path).unwrap();
        assert_eq!(ids.to_vec(), read_back);
        assert!(same_id_set(&ids, &read_back));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn index_file_same_id_set_ignores_order_only() {
        assert!(same_id_set(&[1, 2, 3], &[3, 1, 2]));
        assert!(!same_id_set(&[1, 2, 3], &[1, 2]));
        assert!(!same_id_set(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn index_file_sorted_and_membership() {
        let ids = [3u32, 70, 4500];
        assert!(is_sorted(&ids));
        assert!(contains(&ids, 70));
        assert!(!contains(&ids, 71));
        assert!(!is_sorted(&[70, 3]));
    }
}
