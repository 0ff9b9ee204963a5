use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way a simulation run can fail. None of these are retried: the
/// inputs are static, so a failure aborts the run at the point it is found.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid replacement policy {0:?} (expected FIFO, LRU or OPT)")]
    InvalidPolicy(String),

    #[error("malformed address on line {line}: {text:?}")]
    MalformedAddress { line: usize, text: String },

    #[error("backing store corrupted: {0}")]
    StorageCorruption(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, SimError>;
