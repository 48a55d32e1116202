//! Final rank mapping returned to callers.

use std::hash::Hash;

use hashbrown::HashMap;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::graph_index::FxBuildHasher;

/// Mapping from node to rank, covering exactly the nodes of the ranked graph.
///
/// Iteration follows node order (first appearance in the input).
#[derive(Debug, Clone)]
pub struct RankMap<N> {
    nodes: Vec<N>,
    scores: Vec<f64>,
    positions: HashMap<N, usize, FxBuildHasher>,
}

impl<N> RankMap<N> {
    pub(crate) fn from_parts(
        nodes: Vec<N>,
        scores: Vec<f64>,
        positions: HashMap<N, usize, FxBuildHasher>,
    ) -> Self {
        debug_assert_eq!(nodes.len(), scores.len());
        Self {
            nodes,
            scores,
            positions,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    /// Scores aligned with [`RankMap::nodes`].
    pub fn scores(&self) -> &[f64] {
        &self.scores
    }

    pub fn iter(&self) -> impl Iterator<Item = (&N, f64)> + '_ {
        self.nodes.iter().zip(self.scores.iter().copied())
    }

    /// Sum of all ranks. Below 1 when sink nodes leak mass.
    pub fn total_mass(&self) -> f64 {
        self.scores.iter().sum()
    }

    /// Get the top `n` nodes by score, highest first.
    ///
    /// Equal scores keep node order.
    pub fn top_n(&self, n: usize) -> Vec<(&N, f64)> {
        let mut ranked: Vec<(&N, f64)> = self.iter().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

impl<N: Eq + Hash> RankMap<N> {
    /// Rank of a node, or `None` if it was not part of the graph.
    pub fn get(&self, node: &N) -> Option<f64> {
        self.positions.get(node).map(|&idx| self.scores[idx])
    }

    pub fn contains(&self, node: &N) -> bool {
        self.positions.contains_key(node)
    }

    pub fn into_hash_map(self) -> HashMap<N, f64> {
        self.nodes.into_iter().zip(self.scores).collect()
    }
}

impl<N> IntoIterator for RankMap<N> {
    type Item = (N, f64);
    type IntoIter = std::iter::Zip<std::vec::IntoIter<N>, std::vec::IntoIter<f64>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter().zip(self.scores)
    }
}

impl<N: Serialize> Serialize for RankMap<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (node, score) in self.iter() {
            map.serialize_entry(node, &score)?;
        }
        map.end()
    }
}
