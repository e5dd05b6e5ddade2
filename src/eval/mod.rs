//! Evaluation: prediction aggregation and classification metrics
//!
//! Predictions are accumulated across an entire evaluation phase before any
//! metric is computed, so per-class counts are never distorted by batch
//! boundaries. Metrics are one-vs-rest per class plus the macro F1; any
//! zero denominator yields 0 rather than NaN.

use ndarray::{Array2, ArrayView2};

/// Confusion counts over a fixed class universe.
///
/// Indexed `[true_class][predicted_class]`. The dimension comes from the
/// configured class count, not from the labels observed, so classes absent
/// from a fold still report zeroed metrics.
#[derive(Debug, Clone)]
pub struct ConfusionMatrix {
    counts: Array2<u64>,
    n_classes: usize,
}

impl ConfusionMatrix {
    pub fn new(n_classes: usize) -> Self {
        Self {
            counts: Array2::zeros((n_classes, n_classes)),
            n_classes,
        }
    }

    /// Record one (true, predicted) pair. Out-of-range indices panic; the
    /// data loader has already bounds-checked every label.
    pub fn record(&mut self, true_class: usize, predicted: usize) {
        self.counts[[true_class, predicted]] += 1;
    }

    pub fn record_all(&mut self, truth: &[usize], predicted: &[usize]) {
        debug_assert_eq!(truth.len(), predicted.len());
        for (&t, &p) in truth.iter().zip(predicted) {
            self.record(t, p);
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Total number of recorded pairs.
    pub fn total(&self) -> u64 {
        self.counts.sum()
    }

    fn true_positives(&self, class: usize) -> u64 {
        self.counts[[class, class]]
    }

    /// Examples whose true label is `class`.
    fn support(&self, class: usize) -> u64 {
        self.counts.row(class).sum()
    }

    /// Examples predicted as `class`.
    fn predicted(&self, class: usize) -> u64 {
        self.counts.column(class).sum()
    }

    /// One-vs-rest metrics for a single class.
    pub fn class_metrics(&self, class: usize) -> ClassMetrics {
        let tp = self.true_positives(class);
        let support = self.support(class);
        let predicted = self.predicted(class);
        let total = self.total();

        // Off-diagonal mass touching this class, split by direction.
        let missed = support - tp;
        let spurious = predicted - tp;
        let tn = total - tp - missed - spurious;

        let accuracy = ratio(tp + tn, total);
        let precision = ratio(tp, support);
        let recall = ratio(tp, predicted);
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        ClassMetrics { accuracy, precision, recall, f1 }
    }

    /// Full metric set over every class.
    pub fn metrics(&self) -> EpochMetrics {
        let per_class: Vec<ClassMetrics> =
            (0..self.n_classes).map(|c| self.class_metrics(c)).collect();

        let total = self.total();
        let correct: u64 = (0..self.n_classes).map(|c| self.true_positives(c)).sum();
        let accuracy = ratio(correct, total);

        let macro_f1 = if per_class.is_empty() {
            0.0
        } else {
            per_class.iter().map(|m| m.f1).sum::<f64>() / per_class.len() as f64
        };

        EpochMetrics { accuracy, macro_f1, per_class }
    }
}

fn ratio(num: u64, denom: u64) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

/// One-vs-rest metrics for a single class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl ClassMetrics {
    pub fn zeroed() -> Self {
        Self { accuracy: 0.0, precision: 0.0, recall: 0.0, f1: 0.0 }
    }
}

/// Metrics for one evaluation phase.
#[derive(Debug, Clone, PartialEq)]
pub struct EpochMetrics {
    /// Overall accuracy: diagonal mass over total.
    pub accuracy: f64,
    /// Unweighted mean of the per-class F1 scores.
    pub macro_f1: f64,
    pub per_class: Vec<ClassMetrics>,
}

impl EpochMetrics {
    /// All-zero metrics over `n_classes`, used when an evaluation phase
    /// produced no predictions.
    pub fn zeroed(n_classes: usize) -> Self {
        Self {
            accuracy: 0.0,
            macro_f1: 0.0,
            per_class: vec![ClassMetrics::zeroed(); n_classes],
        }
    }
}

/// Accumulates predictions across the batches of one evaluation phase.
#[derive(Debug)]
pub struct EvalAccumulator {
    n_classes: usize,
    predictions: Vec<usize>,
    labels: Vec<usize>,
    loss_sum: f64,
    batch_count: usize,
}

impl EvalAccumulator {
    pub fn new(n_classes: usize) -> Self {
        Self {
            n_classes,
            predictions: Vec::new(),
            labels: Vec::new(),
            loss_sum: 0.0,
            batch_count: 0,
        }
    }

    /// Fold in one batch: per-row argmax of the log-probabilities plus the
    /// batch loss.
    pub fn push_batch(&mut self, log_probs: ArrayView2<'_, f32>, labels: &[usize], loss: f32) {
        debug_assert_eq!(log_probs.nrows(), labels.len());
        self.predictions.extend(argmax_rows(log_probs));
        self.labels.extend_from_slice(labels);
        self.loss_sum += f64::from(loss);
        self.batch_count += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.batch_count == 0
    }

    /// Mean per-batch loss, infinite when no batch was recorded so an empty
    /// phase can never look like an improvement.
    pub fn mean_loss(&self) -> f64 {
        if self.batch_count == 0 {
            f64::INFINITY
        } else {
            self.loss_sum / self.batch_count as f64
        }
    }

    /// Compute metrics over everything accumulated so far.
    pub fn metrics(&self) -> EpochMetrics {
        if self.labels.is_empty() {
            return EpochMetrics::zeroed(self.n_classes);
        }
        let mut cm = ConfusionMatrix::new(self.n_classes);
        cm.record_all(&self.labels, &self.predictions);
        cm.metrics()
    }
}

/// Index of the maximum entry in each row, ties resolved to the lowest
/// index.
pub fn argmax_rows(scores: ArrayView2<'_, f32>) -> Vec<usize> {
    scores
        .rows()
        .into_iter()
        .map(|row| {
            let mut best = 0;
            let mut best_val = f32::NEG_INFINITY;
            for (i, &v) in row.iter().enumerate() {
                if v > best_val {
                    best = i;
                    best_val = v;
                }
            }
            best
        })
        .collect()
}
