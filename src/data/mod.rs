//! Graph examples, batches, fold files, and dataset builders
//!
//! Everything the orchestrator consumes is assembled here: fold identifier
//! lists loaded once per run, graph examples built by a mode-keyed builder,
//! and batches produced by a seeded shuffling loader. Raw-tree parsing and
//! tokenization happen upstream; the files read here already contain node
//! feature matrices.

mod builder;
mod error;
mod fold;
mod loader;

pub use builder::{builder_for, DatasetBuilder};
pub use error::DataError;
pub use fold::{load_fold, Fold};
pub use loader::epoch_batches;

use ndarray::Array2;

/// One graph-structured example with an integer class label.
#[derive(Clone, Debug)]
pub struct GraphExample {
    /// Node feature matrix, one row per node.
    pub nodes: Array2<f32>,
    /// Directed edges as (source, target) node indices.
    pub edges: Vec<(usize, usize)>,
    /// Class label in `[0, n_classes)`.
    pub label: usize,
}

impl GraphExample {
    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.nodes.nrows()
    }
}

/// A batch of graph examples merged into one disjoint graph.
///
/// Node rows of all member examples are stacked; edges are offset
/// accordingly; `assignment[i]` maps node `i` back to its example index
/// within the batch. Labels align 1:1 with member examples.
#[derive(Clone, Debug)]
pub struct GraphBatch {
    pub nodes: Array2<f32>,
    pub edges: Vec<(usize, usize)>,
    /// Node index -> example index within the batch.
    pub assignment: Vec<usize>,
    pub labels: Vec<usize>,
}

impl GraphBatch {
    /// Merge examples into one batch graph.
    pub fn from_examples(examples: &[&GraphExample]) -> Self {
        let total_nodes: usize = examples.iter().map(|e| e.num_nodes()).sum();
        let feature_dim = examples.first().map_or(0, |e| e.nodes.ncols());

        let mut nodes = Array2::zeros((total_nodes, feature_dim));
        let mut edges = Vec::new();
        let mut assignment = Vec::with_capacity(total_nodes);
        let mut labels = Vec::with_capacity(examples.len());

        let mut offset = 0;
        for (idx, example) in examples.iter().enumerate() {
            let n = example.num_nodes();
            nodes
                .slice_mut(ndarray::s![offset..offset + n, ..])
                .assign(&example.nodes);
            edges.extend(example.edges.iter().map(|&(s, t)| (s + offset, t + offset)));
            assignment.extend(std::iter::repeat(idx).take(n));
            labels.push(example.label);
            offset += n;
        }

        Self { nodes, edges, assignment, labels }
    }

    /// Number of examples in the batch.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Number of nodes across all member examples.
    pub fn num_nodes(&self) -> usize {
        self.nodes.nrows()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr2;

    fn example(n: usize, label: usize) -> GraphExample {
        GraphExample {
            nodes: Array2::from_elem((n, 2), label as f32),
            edges: (1..n).map(|i| (0, i)).collect(),
            label,
        }
    }

    #[test]
    fn test_batch_offsets_edges_and_assignment() {
        let a = example(2, 0);
        let b = example(3, 1);
        let batch = GraphBatch::from_examples(&[&a, &b]);

        assert_eq!(batch.len(), 2);
        assert_eq!(batch.num_nodes(), 5);
        assert_eq!(batch.labels, vec![0, 1]);
        assert_eq!(batch.assignment, vec![0, 0, 1, 1, 1]);
        // a's edge (0,1) stays, b's edges (0,1),(0,2) shift by 2 nodes
        assert_eq!(batch.edges, vec![(0, 1), (2, 3), (2, 4)]);
    }

    #[test]
    fn test_batch_stacks_node_features() {
        let a = GraphExample {
            nodes: arr2(&[[1.0, 2.0]]),
            edges: vec![],
            label: 0,
        };
        let b = GraphExample {
            nodes: arr2(&[[3.0, 4.0]]),
            edges: vec![],
            label: 1,
        };
        let batch = GraphBatch::from_examples(&[&a, &b]);
        assert_eq!(batch.nodes, arr2(&[[1.0, 2.0], [3.0, 4.0]]));
    }

    #[test]
    fn test_empty_batch() {
        let batch = GraphBatch::from_examples(&[]);
        assert!(batch.is_empty());
        assert_eq!(batch.num_nodes(), 0);
    }
}
