//! # PageRank Core
//!
//! Fixed-iteration PageRank scoring for directed graphs.
//!
//! Callers hand over a graph as `(node, outlinks)` pairs and get back a
//! [`RankMap`] covering exactly the graph's nodes. The computation always
//! runs the configured number of passes; there is no convergence cut-off.
//!
//! ## Features
//!
//! - **Graph Index**: out-degree and predecessor tables built once from the input
//! - **Iteration Engine**: synchronous power iteration, optionally parallel via Rayon
//! - **Input readers**: edge-list text and JSON adjacency
//! - **Python bindings**: behind the `python` feature
//!
//! ## Usage
//!
//! ```
//! use pagerank_core::compute_ranks;
//!
//! let graph = vec![("p1", vec!["p2"]), ("p2", vec!["p1"])];
//! let ranks = compute_ranks(graph, 0.85, 100).unwrap();
//! assert!((ranks.get(&"p1").unwrap() - 0.5).abs() < 1e-12);
//! ```

use std::fmt::Debug;
use std::hash::Hash;

pub mod config;
pub mod engine;
pub mod error;
pub mod graph_index;
pub mod input;
pub mod ranks;
pub mod stats;

#[cfg(feature = "python")]
mod python;

pub use config::{PageRankConfig, SinkPolicy, DEFAULT_DAMPING_FACTOR, DEFAULT_ITERATIONS};
pub use engine::{IterationDelta, PageRank};
pub use error::{InputError, InvalidGraphError, InvalidParameterError, RankError};
pub use graph_index::GraphIndex;
pub use input::{Format, ParsedGraph};
pub use ranks::RankMap;
pub use stats::GraphStats;

/// Compute PageRank scores for a directed graph.
///
/// # Arguments
///
/// * `graph` - `(node, outlinks)` pairs; every outlink target must also be a node
/// * `damping_factor` - Probability of following a link, in (0, 1) (usually 0.85)
/// * `iterations` - Exact number of passes (usually 100)
///
/// # Errors
///
/// [`RankError::InvalidParameter`] for a damping factor outside (0, 1) or zero
/// iterations, [`RankError::InvalidGraph`] for an empty graph or a dangling
/// outlink. Nothing is computed when validation fails.
pub fn compute_ranks<N, I>(
    graph: I,
    damping_factor: f64,
    iterations: usize,
) -> Result<RankMap<N>, RankError>
where
    N: Eq + Hash + Clone + Debug + Sync,
    I: IntoIterator<Item = (N, Vec<N>)>,
{
    let config = PageRankConfig::default()
        .with_damping_factor(damping_factor)
        .with_iterations(iterations);
    rank_with_config(graph, &config)
}

/// Compute PageRank scores with full control over the configuration.
pub fn rank_with_config<N, I>(graph: I, config: &PageRankConfig) -> Result<RankMap<N>, RankError>
where
    N: Eq + Hash + Clone + Debug + Sync,
    I: IntoIterator<Item = (N, Vec<N>)>,
{
    config.validate()?;
    let index = GraphIndex::from_adjacency(graph)?;

    let mut engine = PageRank::new(&index, config)?;
    engine.run();
    let scores = engine.into_scores();

    Ok(index.into_rank_map(scores))
}
