use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum SnapshotDecodeError {
    #[error("malformed snapshot: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported snapshot format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },
}

/// No snapshot for today could be produced by any path. Distinct from an
/// empty catalog, which is a valid (empty) snapshot.
#[derive(Debug, Clone, Error)]
pub enum DataUnavailable {
    #[error("catalog could not be loaded: {0}")]
    Catalog(String),
    #[error("none of the {0} catalog objects could be propagated")]
    NoObjects(usize),
    #[error("trajectory sweep timed out after {0:?}")]
    Timeout(Duration),
    #[error("trajectory sweep failed: {0}")]
    Sweep(String),
}
