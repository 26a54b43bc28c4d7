//! Error types shared across the export pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Failure reported by a host adapter while reading live game data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("{source_name} is not available")]
    Unavailable { source_name: &'static str },
    #[error("index {index} is out of range for {source_name} (len {len})")]
    OutOfRange {
        source_name: &'static str,
        index: usize,
        len: usize,
    },
    #[error("host read failed: {0}")]
    Read(String),
}

/// Failure reading one field of a loosely-typed host record.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("field {field} has unexpected shape: {detail}")]
    Shape { field: String, detail: String },
    #[error("record access failed: {0}")]
    Access(String),
}

/// Errors raised while building or writing an export artifact.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no empire statistics were supplied")]
    NoEmpireStatistics,
    #[error(transparent)]
    Host(#[from] HostError),
    #[error(transparent)]
    Record(#[from] RecordError),
    #[error("serializing export document failed")]
    Serialize(#[from] serde_json::Error),
    #[error("writing {path} failed")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised when an export configuration cannot be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("parsing export configuration failed")]
    Parse(#[from] serde_json::Error),
    #[error("file prefix must not be empty")]
    EmptyFilePrefix,
}
