pub mod bb_file_reader;
pub mod undecided_index;

use std::fmt::Display;

/// Error of the file based data providers. Input-format errors are not recoverable, the
/// callers abort the run.
#[derive(Debug, Default)]
pub struct DataProviderError {
    pub name: String,
    pub msg: String,
}

impl std::error::Error for DataProviderError {}

impl From<std::io::Error> for DataProviderError {
    fn from(error: std::io::Error) -> Self {
        Self {
            name: String::new(),
            msg: error.to_string(),
        }
    }
}

impl Display for DataProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.msg)
        } else {
            write!(f, "{}: {}", self.name, self.msg)
        }
    }
}
