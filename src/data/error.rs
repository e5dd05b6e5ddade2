//! Data loading error types

use std::path::PathBuf;

/// Data loading error
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("Fold file does not exist: {0}")]
    FoldFileMissing(PathBuf),

    #[error("Graph example {id} does not exist: {path}")]
    ExampleMissing { id: String, path: PathBuf },

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Example {id}: node feature dimension {found} (expected {expected})")]
    FeatureDimMismatch { id: String, expected: usize, found: usize },

    #[error("Example {id}: label {label} out of range for {n_classes} classes")]
    LabelOutOfRange { id: String, label: usize, n_classes: usize },

    #[error("Example {id} has no nodes")]
    EmptyExample { id: String },

    #[error("The {split} split is empty")]
    EmptySplit { split: &'static str },
}
