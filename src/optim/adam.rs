//! Adam over parameter groups
//!
//! Standard Adam with bias correction and L2 weight decay folded into the
//! gradient. Each group carries its own learning rate; moments are kept
//! per parameter.

use ndarray::Array1;

use super::{Optimizer, ParamGroup};

/// Adam optimizer over learning-rate groups.
pub struct Adam {
    groups: Vec<ParamGroup>,
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    weight_decay: f32,
    t: u64,
    m: Vec<Vec<Option<Array1<f32>>>>,
    v: Vec<Vec<Option<Array1<f32>>>>,
}

impl Adam {
    /// Create an Adam optimizer with default betas (0.9, 0.999).
    pub fn new(groups: Vec<ParamGroup>, weight_decay: f32) -> Self {
        let m = groups.iter().map(|g| vec![None; g.params.len()]).collect();
        let v = groups.iter().map(|g| vec![None; g.params.len()]).collect();
        Self {
            groups,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            weight_decay,
            t: 0,
            m,
            v,
        }
    }

    /// Number of update steps taken.
    pub fn step_count(&self) -> u64 {
        self.t
    }

    pub fn groups(&self) -> &[ParamGroup] {
        &self.groups
    }
}

impl Optimizer for Adam {
    fn zero_grad(&mut self) {
        for group in &self.groups {
            for param in &group.params {
                param.zero_grad();
            }
        }
    }

    fn step(&mut self) {
        self.t += 1;
        let t = self.t as i32;
        let bias_correction =
            (1.0 - self.beta2.powi(t)).sqrt() / (1.0 - self.beta1.powi(t));

        for (gi, group) in self.groups.iter().enumerate() {
            let lr_t = group.lr * bias_correction;
            for (pi, param) in group.params.iter().enumerate() {
                let Some(mut grad) = param.grad() else { continue };
                if self.weight_decay > 0.0 {
                    grad = grad + &*param.data() * self.weight_decay;
                }

                let m_t = match &self.m[gi][pi] {
                    Some(m) => m * self.beta1 + &grad * (1.0 - self.beta1),
                    None => &grad * (1.0 - self.beta1),
                };
                let grad_sq = &grad * &grad;
                let v_t = match &self.v[gi][pi] {
                    Some(v) => v * self.beta2 + &grad_sq * (1.0 - self.beta2),
                    None => &grad_sq * (1.0 - self.beta2),
                };

                let update = &m_t / &(v_t.mapv(f32::sqrt) + self.epsilon) * lr_t;
                {
                    let mut data = param.data_mut();
                    *data = &*data - &update;
                }

                self.m[gi][pi] = Some(m_t);
                self.v[gi][pi] = Some(v_t);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;
    use approx::assert_abs_diff_eq;

    fn single_group(params: Vec<Tensor>, lr: f32) -> Vec<ParamGroup> {
        vec![ParamGroup { params, lr }]
    }

    #[test]
    fn test_quadratic_convergence() {
        // f(x) = x^2, gradient 2x
        let param = Tensor::from_vec(vec![5.0, -3.0, 2.0], true);
        let mut opt = Adam::new(single_group(vec![param.clone()], 0.1), 0.0);

        for _ in 0..100 {
            let grad = param.data().mapv(|x| 2.0 * x);
            param.set_grad(grad);
            opt.step();
        }

        for &val in param.data().iter() {
            assert!(val.abs() < 0.5, "value {val} did not converge");
        }
    }

    #[test]
    fn test_group_learning_rates_differ() {
        let fast = Tensor::from_vec(vec![1.0], true);
        let slow = Tensor::from_vec(vec![1.0], true);
        let groups = vec![
            ParamGroup { params: vec![fast.clone()], lr: 0.1 },
            ParamGroup { params: vec![slow.clone()], lr: 0.001 },
        ];
        let mut opt = Adam::new(groups, 0.0);

        for _ in 0..5 {
            fast.set_grad(ndarray::arr1(&[1.0]));
            slow.set_grad(ndarray::arr1(&[1.0]));
            opt.step();
        }

        let fast_moved = 1.0 - fast.data()[0];
        let slow_moved = 1.0 - slow.data()[0];
        assert!(fast_moved > slow_moved * 10.0);
    }

    #[test]
    fn test_weight_decay_pulls_toward_zero() {
        let with_decay = Tensor::from_vec(vec![2.0], true);
        let without = Tensor::from_vec(vec![2.0], true);
        let mut opt_decay = Adam::new(single_group(vec![with_decay.clone()], 0.01), 0.1);
        let mut opt_plain = Adam::new(single_group(vec![without.clone()], 0.01), 0.0);

        for _ in 0..20 {
            with_decay.set_grad(ndarray::arr1(&[0.1]));
            without.set_grad(ndarray::arr1(&[0.1]));
            opt_decay.step();
            opt_plain.step();
        }

        assert!(with_decay.data()[0] < without.data()[0]);
    }

    #[test]
    fn test_param_without_grad_is_untouched() {
        let param = Tensor::from_vec(vec![1.5], true);
        let mut opt = Adam::new(single_group(vec![param.clone()], 0.1), 0.0);
        opt.step();
        assert_abs_diff_eq!(param.data()[0], 1.5, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_grad_clears_all_groups() {
        let a = Tensor::from_vec(vec![1.0], true);
        let b = Tensor::from_vec(vec![1.0], true);
        let groups = vec![
            ParamGroup { params: vec![a.clone()], lr: 0.1 },
            ParamGroup { params: vec![b.clone()], lr: 0.2 },
        ];
        let mut opt = Adam::new(groups, 0.0);

        a.set_grad(ndarray::arr1(&[1.0]));
        b.set_grad(ndarray::arr1(&[1.0]));
        opt.zero_grad();
        assert!(a.grad().is_none());
        assert!(b.grad().is_none());
    }

    #[test]
    fn test_step_count_increments() {
        let param = Tensor::from_vec(vec![1.0], true);
        let mut opt = Adam::new(single_group(vec![param.clone()], 0.1), 0.0);
        assert_eq!(opt.step_count(), 0);
        opt.step();
        opt.step();
        assert_eq!(opt.step_count(), 2);
    }

    #[test]
    fn test_updates_stay_finite_with_extreme_values() {
        let param = Tensor::from_vec(vec![1e6, -1e6, 1e-6, -1e-6], true);
        let mut opt = Adam::new(single_group(vec![param.clone()], 0.001), 0.0);

        let grad = param.data().mapv(|x| 2.0 * x);
        param.set_grad(grad);
        opt.step();

        for &val in param.data().iter() {
            assert!(val.is_finite());
        }
    }
}
