//! Mode-keyed dataset builders
//!
//! Each [`DatasetMode`] maps to a builder that turns a fold's identifier
//! list into graph examples. The on-disk layout is one JSON file per
//! example under a mode-specific subdirectory:
//!
//! ```text
//! {base}/{dataset}/{subdir}/{id}.json
//! ```
//!
//! with `subdir` being `comment_trees`, `user_trees`, or `combined_trees`.
//! Trees longer than `max_tree_len` are truncated to bound memory; edges
//! into truncated nodes are dropped with them.

use std::path::{Path, PathBuf};

use ndarray::Array2;
use serde::Deserialize;

use crate::config::{DatasetMode, TrainSpec};

use super::{DataError, GraphExample};

/// Builds graph examples for one dataset mode.
pub trait DatasetBuilder {
    /// Build the examples named by `ids`, in order.
    fn build(
        &self,
        spec: &TrainSpec,
        ids: &[String],
        base: &Path,
    ) -> Result<Vec<GraphExample>, DataError>;
}

/// Resolve the builder for a dataset mode.
///
/// The mode enumeration is closed and validated at configuration-parse
/// time, so this lookup cannot fail.
pub fn builder_for(mode: DatasetMode) -> Box<dyn DatasetBuilder> {
    match mode {
        DatasetMode::CommentTree => Box::new(TreeFileBuilder { subdir: "comment_trees" }),
        DatasetMode::UserTree => Box::new(TreeFileBuilder { subdir: "user_trees" }),
        DatasetMode::Combined => Box::new(TreeFileBuilder { subdir: "combined_trees" }),
    }
}

/// On-disk shape of one graph example.
#[derive(Deserialize)]
struct RawExample {
    nodes: Vec<Vec<f32>>,
    edges: Vec<(usize, usize)>,
    label: usize,
}

struct TreeFileBuilder {
    subdir: &'static str,
}

impl TreeFileBuilder {
    fn example_path(&self, base: &Path, dataset: &str, id: &str) -> PathBuf {
        base.join(dataset).join(self.subdir).join(format!("{id}.json"))
    }

    fn load_example(
        &self,
        spec: &TrainSpec,
        base: &Path,
        id: &str,
    ) -> Result<GraphExample, DataError> {
        let path = self.example_path(base, &spec.dataset, id);
        if !path.is_file() {
            return Err(DataError::ExampleMissing { id: id.to_string(), path });
        }
        let text = std::fs::read_to_string(&path)
            .map_err(|source| DataError::Io { path: path.clone(), source })?;
        let raw: RawExample = serde_json::from_str(&text)
            .map_err(|source| DataError::Parse { path: path.clone(), source })?;

        if raw.nodes.is_empty() {
            return Err(DataError::EmptyExample { id: id.to_string() });
        }
        if raw.label >= spec.n_classes {
            return Err(DataError::LabelOutOfRange {
                id: id.to_string(),
                label: raw.label,
                n_classes: spec.n_classes,
            });
        }

        let keep = raw.nodes.len().min(spec.max_tree_len);
        let mut nodes = Array2::zeros((keep, spec.feature_dim));
        for (i, row) in raw.nodes.iter().take(keep).enumerate() {
            if row.len() != spec.feature_dim {
                return Err(DataError::FeatureDimMismatch {
                    id: id.to_string(),
                    expected: spec.feature_dim,
                    found: row.len(),
                });
            }
            for (j, &v) in row.iter().enumerate() {
                nodes[[i, j]] = v;
            }
        }

        let edges = raw
            .edges
            .into_iter()
            .filter(|&(s, t)| s < keep && t < keep)
            .collect();

        Ok(GraphExample { nodes, edges, label: raw.label })
    }
}

impl DatasetBuilder for TreeFileBuilder {
    fn build(
        &self,
        spec: &TrainSpec,
        ids: &[String],
        base: &Path,
    ) -> Result<Vec<GraphExample>, DataError> {
        ids.iter().map(|id| self.load_example(spec, base, id)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec_for(tmp: &Path) -> TrainSpec {
        TrainSpec {
            dataset: "d".to_string(),
            base_dir: tmp.to_path_buf(),
            feature_dim: 2,
            n_classes: 4,
            max_tree_len: 3,
            ..TrainSpec::default()
        }
    }

    fn write_example(base: &Path, subdir: &str, id: &str, json: &str) {
        let dir = base.join("d").join(subdir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{id}.json")), json).unwrap();
    }

    #[test]
    fn test_builds_examples_in_id_order() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_for(tmp.path());
        write_example(
            tmp.path(),
            "comment_trees",
            "a",
            r#"{"nodes": [[1.0, 0.0]], "edges": [], "label": 0}"#,
        );
        write_example(
            tmp.path(),
            "comment_trees",
            "b",
            r#"{"nodes": [[0.0, 1.0], [1.0, 1.0]], "edges": [[0, 1]], "label": 2}"#,
        );

        let builder = builder_for(DatasetMode::CommentTree);
        let examples = builder
            .build(&spec, &["a".to_string(), "b".to_string()], tmp.path())
            .unwrap();
        assert_eq!(examples.len(), 2);
        assert_eq!(examples[0].label, 0);
        assert_eq!(examples[1].label, 2);
        assert_eq!(examples[1].edges, vec![(0, 1)]);
    }

    #[test]
    fn test_missing_example_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_for(tmp.path());
        let builder = builder_for(DatasetMode::UserTree);
        let err = builder.build(&spec, &["nope".to_string()], tmp.path()).unwrap_err();
        assert!(matches!(err, DataError::ExampleMissing { .. }));
    }

    #[test]
    fn test_label_out_of_range_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_for(tmp.path());
        write_example(
            tmp.path(),
            "combined_trees",
            "x",
            r#"{"nodes": [[0.0, 0.0]], "edges": [], "label": 7}"#,
        );
        let builder = builder_for(DatasetMode::Combined);
        let err = builder.build(&spec, &["x".to_string()], tmp.path()).unwrap_err();
        assert!(matches!(err, DataError::LabelOutOfRange { label: 7, .. }));
    }

    #[test]
    fn test_feature_dim_mismatch_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_for(tmp.path());
        write_example(
            tmp.path(),
            "combined_trees",
            "x",
            r#"{"nodes": [[0.0, 0.0, 0.0]], "edges": [], "label": 1}"#,
        );
        let builder = builder_for(DatasetMode::Combined);
        let err = builder.build(&spec, &["x".to_string()], tmp.path()).unwrap_err();
        assert!(matches!(err, DataError::FeatureDimMismatch { expected: 2, found: 3, .. }));
    }

    #[test]
    fn test_long_trees_are_truncated() {
        let tmp = tempfile::tempdir().unwrap();
        let spec = spec_for(tmp.path()); // max_tree_len = 3
        write_example(
            tmp.path(),
            "combined_trees",
            "long",
            r#"{"nodes": [[0,0],[0,1],[1,0],[1,1],[2,2]],
                "edges": [[0,1],[0,2],[0,3],[3,4]], "label": 1}"#,
        );
        let builder = builder_for(DatasetMode::Combined);
        let examples = builder.build(&spec, &["long".to_string()], tmp.path()).unwrap();
        assert_eq!(examples[0].num_nodes(), 3);
        // edges touching truncated nodes 3 and 4 are dropped
        assert_eq!(examples[0].edges, vec![(0, 1), (0, 2)]);
    }
}
