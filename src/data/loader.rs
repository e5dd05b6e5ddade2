//! Batch assembly with per-epoch shuffling
//!
//! The training loader reshuffles example order every epoch from the run's
//! seeded generator; the evaluation loader keeps dataset order. Batches are
//! assembled eagerly and consumed synchronously by the orchestrator.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use super::{GraphBatch, GraphExample};

/// Assemble one epoch's batches.
///
/// With `rng` set, example order is reshuffled before chunking; without it,
/// dataset order is kept. The final batch may be partial.
pub fn epoch_batches(
    examples: &[GraphExample],
    batch_size: usize,
    rng: Option<&mut StdRng>,
) -> Vec<GraphBatch> {
    let mut order: Vec<usize> = (0..examples.len()).collect();
    if let Some(rng) = rng {
        order.shuffle(rng);
    }

    order
        .chunks(batch_size.max(1))
        .map(|chunk| {
            let members: Vec<&GraphExample> = chunk.iter().map(|&i| &examples[i]).collect();
            GraphBatch::from_examples(&members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeded_rng;
    use ndarray::Array2;

    fn examples(n: usize) -> Vec<GraphExample> {
        (0..n)
            .map(|i| GraphExample {
                nodes: Array2::from_elem((1, 1), i as f32),
                edges: vec![],
                label: i % 4,
            })
            .collect()
    }

    #[test]
    fn test_unshuffled_batches_keep_order() {
        let data = examples(5);
        let batches = epoch_batches(&data, 2, None);
        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].labels, vec![0, 1]);
        assert_eq!(batches[1].labels, vec![2, 3]);
        // final partial batch
        assert_eq!(batches[2].labels, vec![0]);
    }

    #[test]
    fn test_every_example_appears_exactly_once() {
        let data = examples(7);
        let mut rng = seeded_rng(9);
        let batches = epoch_batches(&data, 3, Some(&mut rng));

        let mut seen: Vec<f32> = batches
            .iter()
            .flat_map(|b| b.nodes.column(0).to_vec())
            .collect();
        seen.sort_by(f32::total_cmp);
        assert_eq!(seen, (0..7).map(|i| i as f32).collect::<Vec<_>>());
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let data = examples(8);
        let mut a = seeded_rng(5);
        let mut b = seeded_rng(5);
        let first: Vec<Vec<usize>> = epoch_batches(&data, 3, Some(&mut a))
            .iter()
            .map(|batch| batch.labels.clone())
            .collect();
        let second: Vec<Vec<usize>> = epoch_batches(&data, 3, Some(&mut b))
            .iter()
            .map(|batch| batch.labels.clone())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_shuffle_changes_across_epochs() {
        let data = examples(32);
        let mut rng = seeded_rng(5);
        let first: Vec<f32> = epoch_batches(&data, 32, Some(&mut rng))[0].nodes.column(0).to_vec();
        let second: Vec<f32> = epoch_batches(&data, 32, Some(&mut rng))[0].nodes.column(0).to_vec();
        assert_ne!(first, second);
    }
}
