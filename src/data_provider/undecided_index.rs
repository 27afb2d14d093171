//! The undecided-index file: a concatenation of 4-byte big-endian machine ids, sorted
//! ascending. A run restricted by such an index strides over the index entries instead of
//! the raw id range.

use crate::{config::IdBig, data_provider::DataProviderError};

#[derive(Debug, Default)]
pub struct UndecidedIndex {
    ids: Vec<u32>,
    is_sorted: bool,
}

impl UndecidedIndex {
    pub fn try_load(file_path: &str) -> Result<Self, DataProviderError> {
        let bytes = std::fs::read(file_path).map_err(|e| DataProviderError {
            name: "Undecided index".to_string(),
            msg: format!("{file_path}: {e}"),
        })?;
        Self::try_from_bytes(&bytes)
    }

    pub fn try_from_bytes(bytes: &[u8]) -> Result<Self, DataProviderError> {
        if bytes.len() % 4 != 0 {
            return Err(DataProviderError {
                name: "Undecided index".to_string(),
                msg: format!("file size {} is not a multiple of 4 bytes", bytes.len()),
            });
        }
        let ids: Vec<u32> = bytes
            .chunks_exact(4)
            .map(|c| u32::from_be_bytes(c.try_into().unwrap()))
            .collect();
        let is_sorted = ids.windows(2).all(|w| w[0] <= w[1]);

        Ok(Self { ids, is_sorted })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn is_sorted(&self) -> bool {
        self.is_sorted
    }

    /// The machine id of index entry `n`.
    pub fn machine_id(&self, n: usize) -> IdBig {
        self.ids[n] as IdBig
    }

    /// Membership test: binary search on a sorted index, linear scan otherwise.
    pub fn contains(&self, machine_id: IdBig) -> bool {
        if machine_id > u32::MAX as IdBig {
            return false;
        }
        let id = machine_id as u32;
        if self.is_sorted {
            self.ids.binary_search(&id).is_ok()
        } else {
            self.ids.contains(&id)
        }
    }
}
