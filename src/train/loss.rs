//! Negative log-likelihood over log-probabilities

use ndarray::Array2;

/// Mean negative log-likelihood of the target classes.
///
/// `log_probs` rows are already log-softmaxed; the loss is the mean of
/// `-log_probs[i, labels[i]]`.
pub fn nll(log_probs: &Array2<f32>, labels: &[usize]) -> f32 {
    debug_assert_eq!(log_probs.nrows(), labels.len());
    if labels.is_empty() {
        return 0.0;
    }
    let sum: f32 = labels
        .iter()
        .enumerate()
        .map(|(i, &c)| -log_probs[[i, c]])
        .sum();
    sum / labels.len() as f32
}

/// Gradient of [`nll`] with respect to the log-probabilities: `-1/N` at
/// each target entry, zero elsewhere.
pub fn nll_grad(log_probs: &Array2<f32>, labels: &[usize]) -> Array2<f32> {
    debug_assert_eq!(log_probs.nrows(), labels.len());
    let mut grad = Array2::zeros(log_probs.raw_dim());
    if labels.is_empty() {
        return grad;
    }
    let scale = -1.0 / labels.len() as f32;
    for (i, &c) in labels.iter().enumerate() {
        grad[[i, c]] = scale;
    }
    grad
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::arr2;

    #[test]
    fn test_nll_picks_target_entries() {
        let lp = arr2(&[[-0.1_f32, -2.3], [-1.6, -0.2]]);
        let loss = nll(&lp, &[0, 1]);
        assert_abs_diff_eq!(loss, (0.1 + 0.2) / 2.0, epsilon = 1e-6);
    }

    #[test]
    fn test_nll_grad_shape_and_mass() {
        let lp = arr2(&[[-0.1_f32, -2.3], [-1.6, -0.2], [-0.7, -0.7]]);
        let grad = nll_grad(&lp, &[0, 1, 1]);
        assert_eq!(grad.dim(), (3, 2));
        assert_abs_diff_eq!(grad[[0, 0]], -1.0 / 3.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grad[[0, 1]], 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(grad.sum(), -1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_batch() {
        let lp = Array2::<f32>::zeros((0, 4));
        assert_eq!(nll(&lp, &[]), 0.0);
        assert_eq!(nll_grad(&lp, &[]).nrows(), 0);
    }
}
