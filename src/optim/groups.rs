//! Differential-learning-rate parameter groups

use crate::config::ConfigError;
use crate::model::GraphClassifier;
use crate::tensor::Tensor;

/// Parameters sharing one learning rate.
#[derive(Debug)]
pub struct ParamGroup {
    pub params: Vec<Tensor>,
    pub lr: f32,
}

/// Partition a model's parameters into learning-rate groups.
///
/// Each graph-encoder stage becomes one group at `graph_lr`; every
/// remaining parameter lands in the leading base group at `base_lr`. The
/// groups are pairwise disjoint and together cover every parameter of the
/// model.
///
/// Only 2- and 3-stage encoders are known shapes; anything else is a
/// configuration fault.
pub fn split_param_groups(
    model: &dyn GraphClassifier,
    base_lr: f32,
    graph_lr: f32,
) -> Result<Vec<ParamGroup>, ConfigError> {
    let stages = model.encoder_stages();
    if !(2..=3).contains(&stages) {
        return Err(ConfigError::UnsupportedEncoderStages {
            model: model.name().to_string(),
            stages,
        });
    }

    let stage_groups: Vec<Vec<Tensor>> =
        (0..stages).map(|s| model.encoder_stage_params(s)).collect();

    let base: Vec<Tensor> = model
        .parameters()
        .into_iter()
        .filter(|p| {
            !stage_groups
                .iter()
                .flatten()
                .any(|stage_param| Tensor::ptr_eq(p, stage_param))
        })
        .collect();

    let mut groups = vec![ParamGroup { params: base, lr: base_lr }];
    groups.extend(stage_groups.into_iter().map(|params| ParamGroup { params, lr: graph_lr }));
    Ok(groups)
}
