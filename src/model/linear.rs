//! Reference graph classifier
//!
//! A linear graph network: 2 or 3 mean-aggregation convolution stages with
//! ReLU, mean pooling over each example's nodes, dropout on the pooled
//! representation, and a linear head with a log-softmax output. It stands
//! in for the heavier attention/embedding stacks behind the same
//! [`GraphClassifier`](super::GraphClassifier) contract and is small enough
//! to gradient-check.

use ndarray::{Array1, Array2, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::data::GraphBatch;
use crate::tensor::Tensor;

use super::GraphClassifier;

struct ConvStage {
    weight: Tensor,
    rows: usize,
    cols: usize,
}

impl ConvStage {
    fn matrix(&self) -> Array2<f32> {
        Array2::from_shape_vec((self.rows, self.cols), self.weight.data().to_vec())
            .expect("weight buffer matches its shape")
    }
}

struct StageCache {
    agg: Array2<f32>,
    pre: Array2<f32>,
}

struct ForwardCache {
    stage_io: Vec<StageCache>,
    inv_deg: Vec<f32>,
    pooled_counts: Vec<f32>,
    dropout_mask: Option<Array2<f32>>,
    dropped: Array2<f32>,
    probs: Array2<f32>,
}

/// Linear graph network with a configurable number of encoder stages.
pub struct LinearGraphNet {
    name: &'static str,
    stages: Vec<ConvStage>,
    head_w: Tensor,
    head_b: Tensor,
    hidden_dim: usize,
    n_classes: usize,
    dropout: f32,
    training: bool,
    rng: StdRng,
    cache: Option<ForwardCache>,
}

impl LinearGraphNet {
    pub fn new(
        name: &'static str,
        encoder_stages: usize,
        feature_dim: usize,
        hidden_dim: usize,
        n_classes: usize,
        dropout: f32,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stages = Vec::with_capacity(encoder_stages);
        let mut in_dim = feature_dim;
        for _ in 0..encoder_stages {
            stages.push(ConvStage {
                weight: glorot(&mut rng, in_dim, hidden_dim),
                rows: in_dim,
                cols: hidden_dim,
            });
            in_dim = hidden_dim;
        }
        let head_w = glorot(&mut rng, hidden_dim, n_classes);
        let head_b = Tensor::zeros(n_classes, true);

        Self {
            name,
            stages,
            head_w,
            head_b,
            hidden_dim,
            n_classes,
            dropout,
            training: true,
            rng,
            cache: None,
        }
    }

    fn head_matrix(&self) -> Array2<f32> {
        Array2::from_shape_vec((self.hidden_dim, self.n_classes), self.head_w.data().to_vec())
            .expect("head buffer matches its shape")
    }
}

impl GraphClassifier for LinearGraphNet {
    fn forward(&mut self, batch: &GraphBatch) -> Array2<f32> {
        let inv_deg = inv_degrees(batch.num_nodes(), &batch.edges);

        let mut h = batch.nodes.clone();
        let mut stage_io = Vec::with_capacity(self.stages.len());
        for stage in &self.stages {
            let agg = aggregate(&h, &batch.edges, &inv_deg);
            let pre = agg.dot(&stage.matrix());
            h = pre.mapv(|x| x.max(0.0));
            stage_io.push(StageCache { agg, pre });
        }

        // Mean pooling per example.
        let n_examples = batch.len();
        let mut pooled = Array2::zeros((n_examples, self.hidden_dim));
        let mut counts = vec![0.0f32; n_examples];
        for (i, &example) in batch.assignment.iter().enumerate() {
            counts[example] += 1.0;
            let mut row = pooled.row_mut(example);
            row += &h.row(i);
        }
        for (k, mut row) in pooled.rows_mut().into_iter().enumerate() {
            if counts[k] > 0.0 {
                row /= counts[k];
            }
        }

        // Inverted dropout on the pooled representation.
        let keep = 1.0 - self.dropout;
        let dropout_mask = if self.training && self.dropout > 0.0 {
            Some(Array2::from_shape_fn(pooled.raw_dim(), |_| {
                if self.rng.gen::<f32>() < keep {
                    1.0 / keep
                } else {
                    0.0
                }
            }))
        } else {
            None
        };
        let dropped = match &dropout_mask {
            Some(mask) => &pooled * mask,
            None => pooled,
        };

        let mut log_probs = dropped.dot(&self.head_matrix());
        let bias = Array1::from(self.head_b.data().to_vec());
        for mut row in log_probs.rows_mut() {
            row += &bias;
        }
        for mut row in log_probs.rows_mut() {
            let max = row.fold(f32::NEG_INFINITY, |m, &x| m.max(x));
            let log_z = max + row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();
            row.mapv_inplace(|x| x - log_z);
        }
        let probs = log_probs.mapv(f32::exp);

        self.cache = Some(ForwardCache {
            stage_io,
            inv_deg,
            pooled_counts: counts,
            dropout_mask,
            dropped,
            probs,
        });

        log_probs
    }

    fn backward(&mut self, batch: &GraphBatch, grad_output: &Array2<f32>) {
        let cache = self.cache.take().expect("forward must precede backward");

        // Through log-softmax: dL/dz = g - p * rowsum(g).
        let row_sums = grad_output.sum_axis(Axis(1));
        let mut grad_logits = grad_output.clone();
        for (i, mut row) in grad_logits.rows_mut().into_iter().enumerate() {
            row -= &(cache.probs.row(i).to_owned() * row_sums[i]);
        }

        let grad_head_w = cache.dropped.t().dot(&grad_logits);
        let grad_head_b = grad_logits.sum_axis(Axis(0));
        self.head_w.accumulate_grad(&flatten(&grad_head_w));
        self.head_b.accumulate_grad(&grad_head_b);

        let mut grad_pooled = grad_logits.dot(&self.head_matrix().t());
        if let Some(mask) = &cache.dropout_mask {
            grad_pooled *= mask;
        }

        // Through mean pooling.
        let mut grad_h = Array2::zeros((batch.num_nodes(), self.hidden_dim));
        for (i, &example) in batch.assignment.iter().enumerate() {
            let scaled = grad_pooled.row(example).to_owned() / cache.pooled_counts[example];
            let mut row = grad_h.row_mut(i);
            row += &scaled;
        }

        // Through the conv stages, last to first.
        for (stage, io) in self.stages.iter().zip(cache.stage_io.iter()).rev() {
            let mut grad_pre = grad_h;
            grad_pre.zip_mut_with(&io.pre, |g, &p| {
                if p <= 0.0 {
                    *g = 0.0;
                }
            });
            let grad_w = io.agg.t().dot(&grad_pre);
            stage.weight.accumulate_grad(&flatten(&grad_w));
            let grad_agg = grad_pre.dot(&stage.matrix().t());
            grad_h = aggregate_transpose(&grad_agg, &batch.edges, &cache.inv_deg);
        }
    }

    fn parameters(&self) -> Vec<Tensor> {
        let mut params: Vec<Tensor> = self.stages.iter().map(|s| s.weight.clone()).collect();
        params.push(self.head_w.clone());
        params.push(self.head_b.clone());
        params
    }

    fn encoder_stages(&self) -> usize {
        self.stages.len()
    }

    fn encoder_stage_params(&self, stage: usize) -> Vec<Tensor> {
        vec![self.stages[stage].weight.clone()]
    }

    fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    fn is_training(&self) -> bool {
        self.training
    }

    fn name(&self) -> &'static str {
        self.name
    }
}

fn glorot(rng: &mut StdRng, rows: usize, cols: usize) -> Tensor {
    let bound = (6.0 / (rows + cols) as f32).sqrt();
    let data = (0..rows * cols).map(|_| rng.gen_range(-bound..bound)).collect();
    Tensor::from_vec(data, true)
}

fn flatten(a: &Array2<f32>) -> Array1<f32> {
    Array1::from_iter(a.iter().copied())
}

fn inv_degrees(n_nodes: usize, edges: &[(usize, usize)]) -> Vec<f32> {
    // Self-loop plus incoming neighbors.
    let mut deg = vec![1.0f32; n_nodes];
    for &(_, dst) in edges {
        deg[dst] += 1.0;
    }
    deg.into_iter().map(|d| 1.0 / d).collect()
}

/// Mean aggregation over each node's in-neighborhood (including itself).
fn aggregate(h: &Array2<f32>, edges: &[(usize, usize)], inv_deg: &[f32]) -> Array2<f32> {
    let mut out = h.clone();
    for &(src, dst) in edges {
        let contribution = h.row(src).to_owned();
        let mut row = out.row_mut(dst);
        row += &contribution;
    }
    for (i, mut row) in out.rows_mut().into_iter().enumerate() {
        row *= inv_deg[i];
    }
    out
}

/// Adjoint of [`aggregate`] for the backward pass.
fn aggregate_transpose(g: &Array2<f32>, edges: &[(usize, usize)], inv_deg: &[f32]) -> Array2<f32> {
    let mut out = g.clone();
    for (i, mut row) in out.rows_mut().into_iter().enumerate() {
        row *= inv_deg[i];
    }
    for &(src, dst) in edges {
        let scaled = g.row(dst).to_owned() * inv_deg[dst];
        let mut row = out.row_mut(src);
        row += &scaled;
    }
    out
}
