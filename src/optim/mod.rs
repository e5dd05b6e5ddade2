//! Optimization: parameter grouping and gradient descent
//!
//! The splitter partitions a model's parameters into graph-encoder stage
//! groups and a base group so the two can train at different learning
//! rates; [`Adam`] then steps every group with its own rate.

mod adam;
mod groups;

pub use adam::Adam;
pub use groups::{split_param_groups, ParamGroup};

/// Gradient-descent update over parameter groups.
pub trait Optimizer {
    /// Apply one update step to every parameter holding a gradient.
    fn step(&mut self);

    /// Clear the gradients of every parameter in every group.
    fn zero_grad(&mut self);
}
