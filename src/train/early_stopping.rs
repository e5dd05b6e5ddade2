//! Patience-based early stopping with best-model checkpointing

use std::path::{Path, PathBuf};

use crate::eval::EpochMetrics;
use crate::model::GraphClassifier;

use super::checkpoint::{checkpoint_path, Checkpoint, CheckpointError};

/// The epoch that holds the best validation loss so far.
#[derive(Debug, Clone)]
pub struct BestSnapshot {
    pub epoch: usize,
    pub val_loss: f64,
    pub metrics: EpochMetrics,
}

/// Outcome of one epoch's early-stopping decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopState {
    /// New best; its checkpoint has been written.
    Improved,
    /// No improvement, patience not yet exhausted.
    Stalled,
    /// Patience exhausted; training should stop.
    Stopped,
}

/// Stops training after `patience` consecutive epochs without a new best
/// validation loss.
///
/// Every new best is checkpointed immediately; a failed checkpoint write is
/// fatal, since the run's whole output is the best model. The snapshot of
/// the best epoch is what the run reports, not the final epoch.
#[derive(Debug)]
pub struct EarlyStopping {
    patience: usize,
    counter: usize,
    best: Option<BestSnapshot>,
    checkpoint_file: PathBuf,
}

impl EarlyStopping {
    pub fn new(patience: usize, checkpoint_dir: &Path, key: &str) -> Self {
        Self {
            patience,
            counter: 0,
            best: None,
            checkpoint_file: checkpoint_path(checkpoint_dir, key),
        }
    }

    /// Feed one epoch's validation result.
    ///
    /// A non-finite loss can never become the best epoch; it burns
    /// patience like any other non-improving epoch.
    pub fn observe(
        &mut self,
        epoch: usize,
        val_loss: f64,
        metrics: &EpochMetrics,
        model: &dyn GraphClassifier,
    ) -> Result<StopState, CheckpointError> {
        let improved = val_loss.is_finite()
            && self.best.as_ref().map_or(true, |b| val_loss < b.val_loss);

        if improved {
            Checkpoint::capture(model).save(&self.checkpoint_file)?;
            self.best = Some(BestSnapshot {
                epoch,
                val_loss,
                metrics: metrics.clone(),
            });
            self.counter = 0;
            return Ok(StopState::Improved);
        }

        self.counter += 1;
        if self.counter >= self.patience {
            Ok(StopState::Stopped)
        } else {
            Ok(StopState::Stalled)
        }
    }

    pub fn best(&self) -> Option<&BestSnapshot> {
        self.best.as_ref()
    }

    /// Epochs since the last improvement.
    pub fn counter(&self) -> usize {
        self.counter
    }

    pub fn checkpoint_file(&self) -> &Path {
        &self.checkpoint_file
    }
}
