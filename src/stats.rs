//! Degree statistics for an indexed graph.
//!
//! Sinks and self-loops are counted separately since both change how rank
//! flows through the iteration.

use rayon::prelude::*;
use serde::Serialize;

use crate::graph_index::GraphIndex;

/// Statistics about degree distribution in the graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphStats {
    pub total_nodes: usize,
    pub total_edges: usize,
    /// Nodes without outlinks
    pub sink_nodes: usize,
    pub self_loops: usize,
    /// Nodes with neither inlinks nor outlinks
    pub isolated_nodes: usize,
    pub max_in_degree: usize,
    pub max_out_degree: usize,
    pub avg_out_degree: f64,
}

impl GraphStats {
    pub fn from_index<N: Sync>(index: &GraphIndex<N>) -> Self {
        let num_nodes = index.node_count();

        let (sink_nodes, self_loops, isolated_nodes, max_in_degree, max_out_degree) = (0..num_nodes)
            .into_par_iter()
            .map(|i| {
                let out_deg = index.out_degree(i);
                let in_deg = index.in_degree(i);
                let loops = index.successors(i).iter().filter(|&&t| t == i).count();
                (
                    usize::from(out_deg == 0),
                    loops,
                    usize::from(out_deg == 0 && in_deg == 0),
                    in_deg,
                    out_deg,
                )
            })
            .reduce(
                || (0, 0, 0, 0, 0),
                |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2, a.3.max(b.3), a.4.max(b.4)),
            );

        let avg_out_degree = if num_nodes > 0 {
            index.edge_count() as f64 / num_nodes as f64
        } else {
            0.0
        };

        Self {
            total_nodes: num_nodes,
            total_edges: index.edge_count(),
            sink_nodes,
            self_loops,
            isolated_nodes,
            max_in_degree,
            max_out_degree,
            avg_out_degree,
        }
    }
}
