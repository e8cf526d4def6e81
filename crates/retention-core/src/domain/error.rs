//! Error taxonomy for loading snapshots and running selection off-thread.
//!
//! Selection itself never fails; these errors come from the collaborators
//! around it.

use std::path::PathBuf;

/// Release retention errors.
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    #[error("snapshot file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("selection worker failed: {0}")]
    Worker(String),
}

/// Result type for release retention operations.
pub type Result<T> = std::result::Result<T, RetentionError>;
