//! Best-model checkpointing
//!
//! A checkpoint is the flat parameter vectors of a model, serialized as
//! JSON. The write goes through a temp file in the target directory and a
//! rename, so a crash mid-write never leaves a truncated checkpoint behind.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::GraphClassifier;

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("failed to write checkpoint {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read checkpoint {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize checkpoint {path}: {source}")]
    Serialize {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed checkpoint {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("checkpoint for model `{model}` has {found} parameter tensors, expected {expected}")]
    ParamCountMismatch {
        model: String,
        expected: usize,
        found: usize,
    },

    #[error("checkpoint parameter {index} has {found} values, expected {expected}")]
    ParamShapeMismatch {
        index: usize,
        expected: usize,
        found: usize,
    },
}

/// Snapshot of a model's parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub model: String,
    pub params: Vec<Vec<f32>>,
}

impl Checkpoint {
    /// Capture the current parameter values of a model.
    pub fn capture(model: &dyn GraphClassifier) -> Self {
        let params = model
            .parameters()
            .iter()
            .map(|p| p.data().to_vec())
            .collect();
        Self {
            model: model.name().to_string(),
            params,
        }
    }

    /// Serialize to `path`, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        let wrap = |source| CheckpointError::Write { path: path.to_path_buf(), source };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        let json = serde_json::to_string(self).map_err(|e| CheckpointError::Serialize {
            path: path.to_path_buf(),
            source: e,
        })?;

        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(wrap)?;
        fs::rename(&tmp, path).map_err(wrap)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CheckpointError> {
        let json = fs::read_to_string(path).map_err(|source| CheckpointError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| CheckpointError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Copy the stored values back into a model's parameters.
    pub fn restore(&self, model: &dyn GraphClassifier) -> Result<(), CheckpointError> {
        let params = model.parameters();
        if params.len() != self.params.len() {
            return Err(CheckpointError::ParamCountMismatch {
                model: self.model.clone(),
                expected: params.len(),
                found: self.params.len(),
            });
        }
        for (index, (param, stored)) in params.iter().zip(&self.params).enumerate() {
            if param.len() != stored.len() {
                return Err(CheckpointError::ParamShapeMismatch {
                    index,
                    expected: param.len(),
                    found: stored.len(),
                });
            }
            param
                .data_mut()
                .iter_mut()
                .zip(stored)
                .for_each(|(dst, &src)| *dst = src);
        }
        Ok(())
    }
}

/// Checkpoint path for a run key inside the checkpoint directory.
pub fn checkpoint_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}
