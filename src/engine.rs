//! PageRank power iteration over a [`GraphIndex`].
//!
//! Each pass is synchronous: every new rank is computed from the previous
//! snapshot only, into a separate buffer that replaces the snapshot once the
//! whole pass is done. With `parallel` set the per-node work is spread over
//! Rayon's thread pool; every node still sums its predecessors sequentially,
//! so parallel and sequential runs produce identical bits.

use std::fmt::Debug;
use std::hash::Hash;

use rayon::prelude::*;
use tracing::{debug, trace};

use crate::config::{PageRankConfig, SinkPolicy};
use crate::error::RankError;
use crate::graph_index::GraphIndex;
use crate::ranks::RankMap;

/// Change between two successive snapshots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationDelta {
    /// Sum of absolute per-node changes
    pub l1: f64,
    /// Largest absolute per-node change
    pub max: f64,
}

/// Iteration state for one ranking computation.
pub struct PageRank<'g, N> {
    index: &'g GraphIndex<N>,
    config: PageRankConfig,
    /// Random-jump contribution `(1 - d) / V`
    base_term: f64,
    ranks: Vec<f64>,
    next_ranks: Vec<f64>,
    completed: usize,
}

impl<'g, N> PageRank<'g, N>
where
    N: Eq + Hash + Clone + Debug + Sync,
{
    /// Create the engine with every node at rank `1 / V`.
    pub fn new(index: &'g GraphIndex<N>, config: &PageRankConfig) -> Result<Self, RankError> {
        config.validate()?;

        let num_nodes = index.node_count();
        let n = num_nodes as f64;

        Ok(Self {
            index,
            config: *config,
            base_term: (1.0 - config.damping_factor) / n,
            ranks: vec![1.0 / n; num_nodes],
            next_ranks: vec![0.0; num_nodes],
            completed: 0,
        })
    }

    /// Run one pass. Returns `None` once the iteration budget is spent.
    pub fn step(&mut self) -> Option<IterationDelta> {
        if self.completed >= self.config.iterations {
            return None;
        }

        let index = self.index;
        let prev = &self.ranks;
        let damping = self.config.damping_factor;
        let base_term = self.base_term;

        let sink_share = match self.config.sink_policy {
            SinkPolicy::Leak => 0.0,
            SinkPolicy::Redistribute => {
                let sink_mass: f64 = index.sinks().map(|i| prev[i]).sum();
                sink_mass / index.node_count() as f64
            }
        };

        let update = |node: usize| -> f64 {
            let incoming: f64 = index
                .predecessors(node)
                .iter()
                .map(|&p| prev[p] / index.out_degree(p) as f64)
                .sum();
            base_term + damping * (incoming + sink_share)
        };

        if self.config.parallel {
            self.next_ranks
                .par_iter_mut()
                .enumerate()
                .for_each(|(i, rank)| *rank = update(i));
        } else {
            self.next_ranks
                .iter_mut()
                .enumerate()
                .for_each(|(i, rank)| *rank = update(i));
        }

        let delta = self
            .ranks
            .iter()
            .zip(&self.next_ranks)
            .map(|(old, new)| (old - new).abs())
            .fold(IterationDelta { l1: 0.0, max: 0.0 }, |acc, diff| IterationDelta {
                l1: acc.l1 + diff,
                max: acc.max.max(diff),
            });

        std::mem::swap(&mut self.ranks, &mut self.next_ranks);
        self.completed += 1;

        trace!(iteration = self.completed, l1 = delta.l1, max = delta.max, "pagerank pass");
        Some(delta)
    }

    /// Spend the remaining iteration budget and return the final snapshot.
    pub fn run(&mut self) -> &[f64] {
        debug!(
            nodes = self.index.node_count(),
            damping = self.config.damping_factor,
            iterations = self.config.iterations,
            sink_policy = ?self.config.sink_policy,
            "running pagerank"
        );

        let mut last = None;
        while let Some(delta) = self.step() {
            last = Some(delta);
        }

        if let Some(delta) = last {
            debug!(l1 = delta.l1, max = delta.max, "pagerank finished");
        }
        &self.ranks
    }

    /// Current snapshot, aligned with the index's node order.
    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    pub fn base_term(&self) -> f64 {
        self.base_term
    }

    pub fn iterations_completed(&self) -> usize {
        self.completed
    }

    pub fn iterations_remaining(&self) -> usize {
        self.config.iterations - self.completed
    }

    /// Current snapshot keyed by node.
    pub fn to_rank_map(&self) -> RankMap<N> {
        self.index.clone().into_rank_map(self.ranks.clone())
    }

    pub(crate) fn into_scores(self) -> Vec<f64> {
        self.ranks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(pairs: &[(&'static str, &[&'static str])]) -> GraphIndex<&'static str> {
        GraphIndex::from_adjacency(pairs.iter().map(|(n, links)| (*n, links.to_vec()))).unwrap()
    }

    #[test]
    fn test_uniform_start_and_base_term() {
        let idx = index(&[("a", &["b"]), ("b", &["a"]), ("c", &[])]);
        let engine = PageRank::new(&idx, &PageRankConfig::default()).unwrap();
        assert!(engine.ranks().iter().all(|&r| r == 1.0 / 3.0));
        assert!((engine.base_term() - 0.05).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_damping_rejected() {
        let idx = index(&[("a", &[])]);
        let config = PageRankConfig::default().with_damping_factor(1.0);
        assert!(matches!(PageRank::new(&idx, &config), Err(RankError::InvalidParameter(_))));
    }

    #[test]
    fn test_budget_is_exact() {
        let idx = index(&[("a", &["b"]), ("b", &["a"])]);
        let config = PageRankConfig::default().with_iterations(3);
        let mut engine = PageRank::new(&idx, &config).unwrap();
        assert!(engine.step().is_some());
        assert_eq!(engine.iterations_remaining(), 2);
        engine.run();
        assert_eq!(engine.iterations_completed(), 3);
        assert!(engine.step().is_none());
    }

    #[test]
    fn test_single_pass_matches_hand_computation() {
        // a -> b, a -> c, b -> c, c -> a
        let idx = index(&[("a", &["b", "c"]), ("b", &["c"]), ("c", &["a"])]);
        let config = PageRankConfig::default().with_iterations(1);
        let mut engine = PageRank::new(&idx, &config).unwrap();
        engine.run();

        let third = 1.0 / 3.0;
        let t = 0.15 / 3.0;
        let expected = [
            t + 0.85 * third,
            t + 0.85 * (third / 2.0),
            t + 0.85 * (third / 2.0 + third),
        ];
        for (got, want) in engine.ranks().iter().zip(expected) {
            assert!((got - want).abs() < 1e-15, "{got} != {want}");
        }
    }

    #[test]
    fn test_parallel_matches_sequential_exactly() {
        let idx = index(&[
            ("a", &["b", "c", "d"]),
            ("b", &["c"]),
            ("c", &["a", "d"]),
            ("d", &["a", "b", "c"]),
            ("e", &["a"]),
        ]);
        let sequential = PageRankConfig::default().with_parallel(false);
        let parallel = PageRankConfig::default().with_parallel(true);

        let mut seq = PageRank::new(&idx, &sequential).unwrap();
        let mut par = PageRank::new(&idx, &parallel).unwrap();
        assert_eq!(seq.run(), par.run());
    }

    #[test]
    fn test_self_loop_feeds_itself() {
        let idx = index(&[("a", &["a"]), ("b", &[])]);
        let config = PageRankConfig::default().with_iterations(1);
        let mut engine = PageRank::new(&idx, &config).unwrap();
        engine.run();
        let t = 0.15 / 2.0;
        assert!((engine.ranks()[0] - (t + 0.85 * 0.5)).abs() < 1e-15);
        assert!((engine.ranks()[1] - t).abs() < 1e-15);
    }

    #[test]
    fn test_redistribute_conserves_mass() {
        let idx = index(&[("a", &["b"]), ("b", &[]), ("c", &["a", "b"])]);
        let config = PageRankConfig::default().with_sink_policy(SinkPolicy::Redistribute);
        let mut engine = PageRank::new(&idx, &config).unwrap();
        let total: f64 = engine.run().iter().sum();
        assert!((total - 1.0).abs() < 1e-9, "total = {total}");
    }

    #[test]
    fn test_leak_loses_mass_with_sink() {
        let idx = index(&[("a", &["b"]), ("b", &[]), ("c", &["a", "b"])]);
        let mut engine = PageRank::new(&idx, &PageRankConfig::default()).unwrap();
        let total: f64 = engine.run().iter().sum();
        assert!(total < 1.0);
    }

    #[test]
    fn test_to_rank_map_tracks_snapshot() {
        let idx = index(&[("a", &["b"]), ("b", &["a"])]);
        let engine = PageRank::new(&idx, &PageRankConfig::default()).unwrap();
        let ranks = engine.to_rank_map();
        assert_eq!(ranks.get(&"a"), Some(0.5));
        assert_eq!(ranks.len(), 2);
    }
}
