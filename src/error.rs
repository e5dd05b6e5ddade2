//! Crate-level error type

use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;
use crate::data::DataError;
use crate::train::CheckpointError;

/// Anything that can abort a training run.
#[derive(Debug, Error)]
pub enum TrainError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("data loading error: {0}")]
    Data(#[from] DataError),

    #[error("checkpoint error: {0}")]
    Checkpoint(#[from] CheckpointError),

    #[error("failed to write result log {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every epoch produced a non-finite validation loss, so no checkpoint
    /// was ever written and the run has nothing to report.
    #[error("no epoch produced a finite validation loss")]
    NoUsableEpoch,
}
