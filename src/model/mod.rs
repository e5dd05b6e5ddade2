//! Classifier contract and model registry
//!
//! Models enter the trainer through [`GraphClassifier`]: a forward pass
//! producing per-example log-probabilities, a backward pass consuming the
//! loss gradient, and a capability query for the graph-encoder stages used
//! by the parameter-group splitter. The stage count is a property of the
//! model object, never inferred from its name.

mod linear;

pub use linear::LinearGraphNet;

use ndarray::Array2;
use std::ops::{Deref, DerefMut};

use crate::config::{ModelKind, TrainSpec};
use crate::data::GraphBatch;
use crate::tensor::Tensor;

/// A trainable graph classifier.
pub trait GraphClassifier {
    /// Compute per-example class log-probabilities, shape
    /// `[batch_len, n_classes]`. In training mode the forward pass caches
    /// what `backward` needs.
    fn forward(&mut self, batch: &GraphBatch) -> Array2<f32>;

    /// Backpropagate from the gradient of the loss with respect to the
    /// log-probability output, accumulating into parameter gradients.
    fn backward(&mut self, batch: &GraphBatch, grad_output: &Array2<f32>);

    /// All trainable parameters.
    fn parameters(&self) -> Vec<Tensor>;

    /// How many graph-encoder stages this model exposes.
    fn encoder_stages(&self) -> usize;

    /// Parameters of one graph-encoder stage, `stage` in
    /// `0..encoder_stages()`.
    fn encoder_stage_params(&self, stage: usize) -> Vec<Tensor>;

    /// Toggle training mode (dropout active) vs evaluation mode.
    fn set_training(&mut self, training: bool);

    fn is_training(&self) -> bool;

    fn name(&self) -> &'static str;
}

/// Scoped evaluation-mode toggle.
///
/// Puts the model into evaluation mode on construction and restores the
/// previous mode on drop, so the evaluation phase cannot leak its mode into
/// the next training phase however it exits.
pub struct EvalModeGuard<'a> {
    model: &'a mut dyn GraphClassifier,
    was_training: bool,
}

impl<'a> EvalModeGuard<'a> {
    pub fn new(model: &'a mut dyn GraphClassifier) -> Self {
        let was_training = model.is_training();
        model.set_training(false);
        Self { model, was_training }
    }
}

impl Drop for EvalModeGuard<'_> {
    fn drop(&mut self) {
        self.model.set_training(self.was_training);
    }
}

impl<'a> Deref for EvalModeGuard<'a> {
    type Target = dyn GraphClassifier + 'a;

    fn deref(&self) -> &Self::Target {
        self.model
    }
}

impl DerefMut for EvalModeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}

/// Construct the model for a validated configuration.
///
/// `ModelKind` is a closed enumeration checked at configuration-parse
/// time, so construction cannot fail on an unknown name.
pub fn build_model(kind: ModelKind, spec: &TrainSpec) -> Box<dyn GraphClassifier> {
    let stages = match kind {
        ModelKind::GatBert | ModelKind::Ccct => 2,
        ModelKind::TripleGatBert => 3,
    };
    Box::new(LinearGraphNet::new(
        kind.as_str(),
        stages,
        spec.feature_dim,
        spec.hidden_dim,
        spec.n_classes,
        spec.dropout,
        spec.seed,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model() -> Box<dyn GraphClassifier> {
        build_model(ModelKind::GatBert, &TrainSpec::default())
    }

    #[test]
    fn test_registry_stage_counts() {
        let spec = TrainSpec::default();
        assert_eq!(build_model(ModelKind::GatBert, &spec).encoder_stages(), 2);
        assert_eq!(build_model(ModelKind::Ccct, &spec).encoder_stages(), 2);
        assert_eq!(build_model(ModelKind::TripleGatBert, &spec).encoder_stages(), 3);
    }

    #[test]
    fn test_eval_guard_restores_training_mode() {
        let mut m = model();
        assert!(m.is_training());
        {
            let guard = EvalModeGuard::new(m.as_mut());
            assert!(!guard.is_training());
        }
        assert!(m.is_training());
    }

    #[test]
    fn test_eval_guard_restores_eval_mode() {
        let mut m = model();
        m.set_training(false);
        {
            let _guard = EvalModeGuard::new(m.as_mut());
        }
        assert!(!m.is_training());
    }
}
