//! Resolved run configuration
//!
//! A [`TrainSpec`] is built once at startup (normally from the CLI), is
//! validated up front, and is read-only for the rest of the run. Model names
//! and dataset modes are closed enumerations parsed at configuration time,
//! so an unknown key fails before any data is touched.

mod error;

pub use error::ConfigError;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Model architecture selector.
///
/// The variants name architecture families; the concrete network behind
/// each is resolved by the model registry. How many graph-encoder stages a
/// model has is a capability of the model object itself, never derived
/// from this tag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelKind {
    /// Graph-attention encoder fused with contextual text embeddings.
    GatBert,
    /// Three-stage variant of the graph-attention encoder.
    TripleGatBert,
    /// Comment-tree / user-tree dual-encoder network.
    Ccct,
}

impl ModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ModelKind::GatBert => "gat-bert",
            ModelKind::TripleGatBert => "triple-gat-bert",
            ModelKind::Ccct => "ccct",
        }
    }
}

impl FromStr for ModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gat-bert" => Ok(ModelKind::GatBert),
            "triple-gat-bert" => Ok(ModelKind::TripleGatBert),
            "ccct" => Ok(ModelKind::Ccct),
            other => Err(ConfigError::UnknownModel(other.to_string())),
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dataset construction mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DatasetMode {
    /// Graphs built from the comment reply tree.
    CommentTree,
    /// Graphs built from the user interaction tree.
    UserTree,
    /// Graphs carrying both comment and user structure.
    Combined,
}

impl DatasetMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetMode::CommentTree => "comment-tree",
            DatasetMode::UserTree => "user-tree",
            DatasetMode::Combined => "combined",
        }
    }
}

impl FromStr for DatasetMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "comment-tree" => Ok(DatasetMode::CommentTree),
            "user-tree" => Ok(DatasetMode::UserTree),
            "combined" => Ok(DatasetMode::Combined),
            other => Err(ConfigError::UnknownDatasetMode(other.to_string())),
        }
    }
}

impl fmt::Display for DatasetMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable, resolved configuration for one training run.
#[derive(Clone, Debug)]
pub struct TrainSpec {
    /// Random seed for shuffling and weight initialization.
    pub seed: u64,
    /// Model architecture to train.
    pub model: ModelKind,
    /// Dataset construction mode.
    pub mode: DatasetMode,
    /// Dataset name, keys the fold directory and the result file.
    pub dataset: String,
    /// Fold index within the k-fold split.
    pub fold: usize,
    /// Data directory holding fold files and graph examples.
    pub base_dir: PathBuf,
    /// Directory for the append-only result log.
    pub result_dir: PathBuf,
    /// Directory for best-model checkpoints.
    pub checkpoint_dir: PathBuf,
    /// Learning rate for the base (non-encoder) parameters.
    pub lr: f32,
    /// Learning rate for the graph-encoder stages.
    pub graph_lr: f32,
    /// L2 weight decay.
    pub weight_decay: f32,
    /// Epochs without validation-loss improvement before stopping.
    pub patience: usize,
    /// Epoch budget.
    pub epochs: usize,
    /// Examples per batch.
    pub batch_size: usize,
    /// Number of target classes.
    pub n_classes: usize,
    /// Dropout probability on the pooled graph representation.
    pub dropout: f32,
    /// Maximum nodes kept per tree; longer trees are truncated.
    pub max_tree_len: usize,
    /// Node feature dimensionality.
    pub feature_dim: usize,
    /// Hidden dimensionality of the graph-encoder stages.
    pub hidden_dim: usize,
    /// Loader worker processes. The orchestrator consumes batches
    /// synchronously either way; 0 means in-process loading.
    pub workers: usize,
}

impl TrainSpec {
    /// Check every field against its valid range.
    ///
    /// Called once after construction; a run never starts from an invalid
    /// spec.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.lr > 0.0 && self.lr <= 1.0) {
            return Err(ConfigError::InvalidLearningRate(self.lr));
        }
        if !(self.graph_lr > 0.0 && self.graph_lr <= 1.0) {
            return Err(ConfigError::InvalidGraphLearningRate(self.graph_lr));
        }
        if !(self.weight_decay >= 0.0) {
            return Err(ConfigError::InvalidWeightDecay(self.weight_decay));
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }
        if self.epochs == 0 {
            return Err(ConfigError::InvalidEpochs(self.epochs));
        }
        if self.patience == 0 {
            return Err(ConfigError::InvalidPatience(self.patience));
        }
        if !(2..=4).contains(&self.n_classes) {
            return Err(ConfigError::InvalidClassCount(self.n_classes));
        }
        if !(0.0..1.0).contains(&self.dropout) {
            return Err(ConfigError::InvalidDropout(self.dropout));
        }
        if self.feature_dim == 0 {
            return Err(ConfigError::InvalidFeatureDim(self.feature_dim));
        }
        if self.hidden_dim == 0 {
            return Err(ConfigError::InvalidHiddenDim(self.hidden_dim));
        }
        if self.max_tree_len == 0 {
            return Err(ConfigError::InvalidMaxTreeLen(self.max_tree_len));
        }
        Ok(())
    }

    /// Checkpoint key for this run: `{model}{dataset}{fold}`.
    pub fn checkpoint_key(&self) -> String {
        format!("{}{}{}", self.model.as_str(), self.dataset, self.fold)
    }
}

impl Default for TrainSpec {
    fn default() -> Self {
        Self {
            seed: 42,
            model: ModelKind::GatBert,
            mode: DatasetMode::Combined,
            dataset: String::new(),
            fold: 0,
            base_dir: PathBuf::from("."),
            result_dir: PathBuf::from("./result"),
            checkpoint_dir: PathBuf::from("./checkpoints"),
            lr: 5e-5,
            graph_lr: 1e-5,
            weight_decay: 0.0,
            patience: 10,
            epochs: 10,
            batch_size: 256,
            n_classes: 4,
            dropout: 0.5,
            max_tree_len: 1000,
            feature_dim: 768,
            hidden_dim: 64,
            workers: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spec_is_valid() {
        assert!(TrainSpec::default().validate().is_ok());
    }

    #[test]
    fn test_unknown_model_fails_at_parse() {
        let err = "Simple_GAT_BERT".parse::<ModelKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownModel(_)));
    }

    #[test]
    fn test_unknown_mode_fails_at_parse() {
        let err = "duck".parse::<DatasetMode>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownDatasetMode(_)));
    }

    #[test]
    fn test_known_keys_round_trip() {
        for kind in [ModelKind::GatBert, ModelKind::TripleGatBert, ModelKind::Ccct] {
            assert_eq!(kind.as_str().parse::<ModelKind>().unwrap(), kind);
        }
        for mode in [DatasetMode::CommentTree, DatasetMode::UserTree, DatasetMode::Combined] {
            assert_eq!(mode.as_str().parse::<DatasetMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_validate_rejects_bad_learning_rate() {
        let mut spec = TrainSpec::default();
        spec.lr = 0.0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidLearningRate(_))));

        spec.lr = 2.0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidLearningRate(_))));
    }

    #[test]
    fn test_validate_rejects_bad_dropout() {
        let mut spec = TrainSpec::default();
        spec.dropout = 1.0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidDropout(_))));
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let mut spec = TrainSpec::default();
        spec.batch_size = 0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidBatchSize(0))));

        let mut spec = TrainSpec::default();
        spec.epochs = 0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidEpochs(0))));

        let mut spec = TrainSpec::default();
        spec.patience = 0;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidPatience(0))));
    }

    #[test]
    fn test_validate_rejects_class_count_out_of_range() {
        let mut spec = TrainSpec::default();
        spec.n_classes = 1;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidClassCount(1))));

        spec.n_classes = 5;
        assert!(matches!(spec.validate(), Err(ConfigError::InvalidClassCount(5))));
    }

    #[test]
    fn test_checkpoint_key_format() {
        let spec = TrainSpec {
            dataset: "twitter15".to_string(),
            fold: 3,
            ..TrainSpec::default()
        };
        assert_eq!(spec.checkpoint_key(), "gat-berttwitter153");
    }
}
