//! Error types for ranking and for the input wrappers.
//!
//! Every ranking failure is an input-validation failure detected before the
//! first iteration, so no partial rank mapping is ever produced.

use thiserror::Error;

/// The graph handed to the ranker violates a structural invariant.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidGraphError {
    #[error("graph has no nodes")]
    Empty,

    /// An outlink target that is not itself a key of the graph.
    #[error("node {from} links to {target}, which is not a node of the graph")]
    DanglingReference { from: String, target: String },
}

/// A ranking parameter is outside its domain.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidParameterError {
    #[error("damping factor must lie strictly between 0 and 1, got {0}")]
    DampingFactor(f64),

    #[error("iteration count must be positive, got {0}")]
    IterationCount(usize),
}

/// Any failure of a ranking computation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RankError {
    #[error("invalid graph: {0}")]
    InvalidGraph(#[from] InvalidGraphError),

    #[error("invalid parameter: {0}")]
    InvalidParameter(#[from] InvalidParameterError),
}

/// Failures while reading a graph from text or JSON.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("line {line}: {reason}")]
    MalformedLine { line: usize, reason: String },
}
