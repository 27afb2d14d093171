//! Reader of the bbchallenge seed database
//! (`all_5_states_undecided_machines_with_global_header`). \
//! <https://bbchallenge.org/method#format> \
//! The file is a flat sequence of 30-byte records. Record 0 is the global header, machine i
//! occupies the bytes \[30*(i+1), 30*(i+2)). Each machine record is the transition table with
//! 3 bytes per (state, read) field: write symbol, direction (R=0, L=1) and next state
//! (0 = halt). \
//! The whole file is loaded once and shared read-only between the workers.

use std::fs;

use crate::{
    config::{IdBig, CONFIG_TOML, MAX_STATES},
    data_provider::DataProviderError,
    machine_binary::{MachineBinary, MachineId, TransitionTableBinaryArray1D, TRANSITION_TABLE_BINARY_DEFAULT},
    transition_binary::TransitionBinary,
};

const BYTES_MACHINE: usize = 30;

/// The 30-byte global header of the seed database.
#[derive(Debug, Clone, Copy)]
pub struct Header {
    pub num_undecided_machines_exceed_47m_steps: u64,
    pub num_undecided_machines_exceed_12k_cells: u64,
    pub num_undecided_machines: u64,
    pub is_sorted: bool,
}

#[derive(Debug)]
pub struct SeedDatabase {
    bytes: Vec<u8>,
    header: Header,
}

impl SeedDatabase {
    pub fn try_load_toml_path() -> Result<Self, DataProviderError> {
        Self::try_load(CONFIG_TOML.seed_db_filename_path())
    }

    /// Loads the full seed database. A wrong file size is an input-format error which
    /// callers must treat as fatal.
    pub fn try_load(file_path: &str) -> Result<Self, DataProviderError> {
        let bytes = fs::read(file_path).map_err(|e| DataProviderError {
            name: "Seed database".to_string(),
            msg: format!("{file_path}: {e}"),
        })?;
        if bytes.len() < BYTES_MACHINE || bytes.len() % BYTES_MACHINE != 0 {
            return Err(DataProviderError {
                name: "Seed database".to_string(),
                msg: format!(
                    "{file_path}: file size {} is not a multiple of {BYTES_MACHINE} bytes",
                    bytes.len()
                ),
            });
        }
        let header = Self::read_header(&bytes);

        Ok(Self { bytes, header })
    }

    fn read_header(bytes: &[u8]) -> Header {
        Header {
            num_undecided_machines_exceed_47m_steps: u32::from_be_bytes(
                bytes[0..4].try_into().unwrap(),
            ) as u64,
            num_undecided_machines_exceed_12k_cells: u32::from_be_bytes(
                bytes[4..8].try_into().unwrap(),
            ) as u64,
            num_undecided_machines: u32::from_be_bytes(bytes[8..12].try_into().unwrap()) as u64,
            is_sorted: bytes[12] == 1,
        }
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Number of machine records in the file (excluding the header record).
    pub fn num_machines(&self) -> u64 {
        (self.bytes.len() / BYTES_MACHINE) as u64 - 1
    }

    /// Returns machine `machine_id`, counting from 0.
    pub fn machine(&self, machine_id: IdBig) -> Result<MachineId, DataProviderError> {
        if machine_id >= self.num_machines() {
            return Err(DataProviderError {
                name: "Seed database".to_string(),
                msg: format!(
                    "machine id {machine_id} out of range (0..{})",
                    self.num_machines()
                ),
            });
        }
        let offset = (machine_id as usize + 1) * BYTES_MACHINE;
        let transitions =
            Self::file_data_array_into_transitions(&self.bytes[offset..offset + BYTES_MACHINE]);

        Ok(MachineId::new(
            machine_id,
            MachineBinary::new_with_n_states(transitions, MAX_STATES),
        ))
    }

    /// Convenience to load a single machine without keeping the database around. Slow, do
    /// not use in loops.
    pub fn read_machine_single(
        machine_id: IdBig,
        file_path: &str,
    ) -> Result<MachineId, DataProviderError> {
        let db = Self::try_load(file_path)?;
        db.machine(machine_id)
    }

    /// Converts the transitions in the file format into transitions of the library.
    pub fn file_data_array_into_transitions(array: &[u8]) -> TransitionTableBinaryArray1D {
        let mut transitions = TRANSITION_TABLE_BINARY_DEFAULT;
        for i in 0..MAX_STATES {
            let p = i * 6;
            transitions[(i + 1) * 2] =
                TransitionBinary::try_new(array[p..p + 3].try_into().unwrap())
                    .expect("File Data Error");
            transitions[(i + 1) * 2 + 1] =
                TransitionBinary::try_new(array[p + 3..p + 6].try_into().unwrap())
                    .expect("File Data Error");
        }

        transitions
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn seed_record_bytes_decode_to_machine() {
        // the BB5 champion in seed-database encoding
        #[rustfmt::skip]
        let record: [u8; 30] = [
            1, 0, 2, 1, 1, 3, // A: 1RB 1LC
            1, 0, 3, 1, 0, 2, // B: 1RC 1RB
            1, 0, 4, 0, 1, 5, // C: 1RD 0LE
            1, 1, 1, 1, 1, 4, // D: 1LA 1LD
            0, 0, 0, 0, 1, 1, // E: --- 0LA
        ];
        let transitions = SeedDatabase::file_data_array_into_transitions(&record);
        let machine = MachineBinary::new_with_n_states(transitions, MAX_STATES);
        assert_eq!(
            "1RB1LC_1RC1RB_1RD0LE_1LA1LD_---0LA",
            machine.to_standard_tm_text_format()
        );
    }

    #[test]
    fn seed_database_rejects_truncated_file() {
        let dir = std::env::temp_dir().join("bb_nonhalt_test_db");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("truncated_db");
        std::fs::write(&path, [0u8; 45]).unwrap();
        let r = SeedDatabase::try_load(path.to_str().unwrap());
        assert!(r.is_err());
    }
}
