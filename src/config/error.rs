//! Configuration error types

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unknown model name: {0} (must be one of: gat-bert, triple-gat-bert, ccct)")]
    UnknownModel(String),

    #[error("Unknown dataset mode: {0} (must be one of: comment-tree, user-tree, combined)")]
    UnknownDatasetMode(String),

    #[error("Model {model} exposes {stages} graph-encoder stages (expected 2 or 3)")]
    UnsupportedEncoderStages { model: String, stages: usize },

    #[error("Invalid learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidLearningRate(f32),

    #[error("Invalid graph learning rate: {0} (must be > 0.0 and <= 1.0)")]
    InvalidGraphLearningRate(f32),

    #[error("Invalid weight decay: {0} (must be >= 0.0)")]
    InvalidWeightDecay(f32),

    #[error("Invalid batch size: {0} (must be > 0)")]
    InvalidBatchSize(usize),

    #[error("Invalid epochs: {0} (must be > 0)")]
    InvalidEpochs(usize),

    #[error("Invalid patience: {0} (must be > 0)")]
    InvalidPatience(usize),

    #[error("Invalid class count: {0} (must be between 2 and 4)")]
    InvalidClassCount(usize),

    #[error("Invalid dropout: {0} (must be in [0.0, 1.0))")]
    InvalidDropout(f32),

    #[error("Invalid feature dimension: {0} (must be > 0)")]
    InvalidFeatureDim(usize),

    #[error("Invalid hidden dimension: {0} (must be > 0)")]
    InvalidHiddenDim(usize),

    #[error("Invalid max tree length: {0} (must be > 0)")]
    InvalidMaxTreeLen(usize),
}
