//! Training orchestration
//!
//! One `Trainer` owns the model, the grouped optimizer, and the early
//! stopper for a single fold. `run` drives the epoch loop: a shuffled
//! training phase, a full evaluation phase, then the early-stopping
//! decision. The run's result is the best epoch's snapshot, with the model
//! restored to the matching checkpoint.

use std::path::PathBuf;

use rand::rngs::StdRng;

use crate::config::TrainSpec;
use crate::data::{epoch_batches, GraphExample};
use crate::error::TrainError;
use crate::eval::{argmax_rows, EpochMetrics, EvalAccumulator};
use crate::model::{build_model, EvalModeGuard, GraphClassifier};
use crate::optim::{split_param_groups, Adam, Optimizer};

use super::checkpoint::Checkpoint;
use super::early_stopping::{BestSnapshot, EarlyStopping, StopState};
use super::loss::{nll, nll_grad};
use super::report;

/// One epoch of history.
#[derive(Debug, Clone)]
pub struct EpochRecord {
    pub epoch: usize,
    /// Mean per-batch training loss over the finite batches.
    pub train_loss: f64,
    pub train_accuracy: f64,
    /// Batches skipped for a non-finite loss.
    pub skipped_batches: usize,
    pub val_loss: f64,
    pub val_metrics: EpochMetrics,
}

/// Outcome of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub best: BestSnapshot,
    pub epochs_run: usize,
    pub stopped_early: bool,
    pub report_path: PathBuf,
    pub checkpoint_path: PathBuf,
}

pub struct Trainer {
    spec: TrainSpec,
    model: Box<dyn GraphClassifier>,
    optimizer: Adam,
    early_stopping: EarlyStopping,
    history: Vec<EpochRecord>,
}

impl Trainer {
    pub fn new(spec: TrainSpec) -> Result<Self, TrainError> {
        spec.validate()?;
        let model = build_model(spec.model, &spec);
        let groups = split_param_groups(model.as_ref(), spec.lr, spec.graph_lr)?;
        let optimizer = Adam::new(groups, spec.weight_decay);
        let early_stopping =
            EarlyStopping::new(spec.patience, &spec.checkpoint_dir, &spec.checkpoint_key());
        Ok(Self {
            spec,
            model,
            optimizer,
            early_stopping,
            history: Vec::new(),
        })
    }

    pub fn history(&self) -> &[EpochRecord] {
        &self.history
    }

    pub fn model(&self) -> &dyn GraphClassifier {
        self.model.as_ref()
    }

    /// Run the full epoch loop over one fold, appending the best epoch's
    /// metrics to the result log and leaving the model restored to its
    /// best checkpoint.
    pub fn run(
        &mut self,
        train: &[GraphExample],
        test: &[GraphExample],
        rng: &mut StdRng,
        mut on_epoch: impl FnMut(&EpochRecord),
    ) -> Result<RunSummary, TrainError> {
        let mut stopped_early = false;
        let mut epochs_run = 0;

        for epoch in 0..self.spec.epochs {
            let (train_loss, train_accuracy, skipped_batches) = self.train_epoch(train, rng);
            let (val_loss, val_metrics) = self.eval_epoch(test);

            let record = EpochRecord {
                epoch,
                train_loss,
                train_accuracy,
                skipped_batches,
                val_loss,
                val_metrics,
            };
            on_epoch(&record);
            let state = self.early_stopping.observe(
                epoch,
                record.val_loss,
                &record.val_metrics,
                self.model.as_ref(),
            )?;
            self.history.push(record);
            epochs_run = epoch + 1;

            if state == StopState::Stopped {
                stopped_early = true;
                break;
            }
        }

        let best = self
            .early_stopping
            .best()
            .cloned()
            .ok_or(TrainError::NoUsableEpoch)?;

        let checkpoint_path = self.early_stopping.checkpoint_file().to_path_buf();
        Checkpoint::load(&checkpoint_path)?.restore(self.model.as_ref())?;
        let report_path = report::append_row(&self.spec, &best.metrics)?;

        Ok(RunSummary {
            best,
            epochs_run,
            stopped_early,
            report_path,
            checkpoint_path,
        })
    }

    /// One pass over the training split in shuffled batches. Batches whose
    /// loss comes out non-finite are skipped without an optimizer step.
    fn train_epoch(&mut self, train: &[GraphExample], rng: &mut StdRng) -> (f64, f64, usize) {
        self.model.set_training(true);
        let batches = epoch_batches(train, self.spec.batch_size, Some(rng));

        let mut loss_sum = 0.0_f64;
        let mut batch_count = 0_usize;
        let mut correct = 0_usize;
        let mut seen = 0_usize;
        let mut skipped = 0_usize;

        for batch in &batches {
            self.optimizer.zero_grad();
            let log_probs = self.model.forward(batch);
            let loss = nll(&log_probs, &batch.labels);
            if !loss.is_finite() {
                skipped += 1;
                continue;
            }

            let grad = nll_grad(&log_probs, &batch.labels);
            self.model.backward(batch, &grad);
            self.optimizer.step();

            loss_sum += f64::from(loss);
            batch_count += 1;
            correct += argmax_rows(log_probs.view())
                .iter()
                .zip(&batch.labels)
                .filter(|(p, l)| p == l)
                .count();
            seen += batch.len();
        }

        let mean_loss = if batch_count == 0 {
            f64::INFINITY
        } else {
            loss_sum / batch_count as f64
        };
        // Accuracy is example-weighted over the whole epoch, not a mean of
        // per-batch ratios, so the final partial batch carries its true
        // weight.
        let accuracy = if seen == 0 {
            0.0
        } else {
            correct as f64 / seen as f64
        };
        (mean_loss, accuracy, skipped)
    }

    /// One pass over the evaluation split, predictions aggregated across
    /// the whole phase before metrics are computed.
    fn eval_epoch(&mut self, test: &[GraphExample]) -> (f64, EpochMetrics) {
        let mut guard = EvalModeGuard::new(self.model.as_mut());
        let mut acc = EvalAccumulator::new(self.spec.n_classes);

        for batch in epoch_batches(test, self.spec.batch_size, None) {
            let log_probs = guard.forward(&batch);
            let loss = nll(&log_probs, &batch.labels);
            acc.push_batch(log_probs.view(), &batch.labels, loss);
        }

        (acc.mean_loss(), acc.metrics())
    }
}
