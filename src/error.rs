use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that stop a run; anything finer-grained is logged and skipped
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Chrome not found (searched: {searched:?})")]
    BrowserNotFound { searched: Vec<PathBuf> },
    #[error("failed to launch Chrome: {0}")]
    BrowserLaunch(String),
    #[error("artifact '{name}' could not be written: {source}")]
    ArtifactWrite {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("artifact '{name}' could not be read: {source}")]
    ArtifactRead {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
