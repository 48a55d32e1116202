//! Python bindings.
//!
//! ```python
//! from pagerank_core._rust_core import compute_ranks, top_ranked, graph_stats
//!
//! ranks = compute_ranks([("p1", ["p2"]), ("p2", ["p1"])], damping=0.85)
//! ```

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use crate::error::RankError;
use crate::graph_index::GraphIndex;
use crate::stats::GraphStats;

type Adjacency = Vec<(String, Vec<String>)>;

fn to_py_err(err: RankError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Compute PageRank scores for a directed graph.
///
/// Releases the GIL during computation.
///
/// # Arguments
///
/// * `graph` - List of (node, [outlinks]) pairs
/// * `damping` - Damping factor (default: 0.85)
/// * `iterations` - Number of passes (default: 100)
///
/// # Returns
///
/// Dictionary mapping node name to PageRank score.
#[pyfunction]
#[pyo3(signature = (graph, damping=0.85, iterations=100))]
fn compute_ranks(
    py: Python<'_>,
    graph: Adjacency,
    damping: f64,
    iterations: usize,
) -> PyResult<Py<PyDict>> {
    let ranks = py
        .allow_threads(|| crate::compute_ranks(graph, damping, iterations))
        .map_err(to_py_err)?;

    let dict = PyDict::new_bound(py);
    for (node, score) in ranks {
        dict.set_item(node, score)?;
    }

    Ok(dict.into())
}

/// Get the highest-ranked nodes.
///
/// # Returns
///
/// List of (node, score) tuples, highest score first.
#[pyfunction]
#[pyo3(signature = (graph, top_n=10, damping=0.85, iterations=100))]
fn top_ranked(
    py: Python<'_>,
    graph: Adjacency,
    top_n: usize,
    damping: f64,
    iterations: usize,
) -> PyResult<Py<PyList>> {
    let top = py
        .allow_threads(|| {
            let ranks = crate::compute_ranks(graph, damping, iterations)?;
            Ok::<_, RankError>(
                ranks
                    .top_n(top_n)
                    .into_iter()
                    .map(|(node, score)| (node.clone(), score))
                    .collect::<Vec<_>>(),
            )
        })
        .map_err(to_py_err)?;

    let list = PyList::new_bound(py, top.iter().map(|(node, score)| (node.as_str(), *score)));

    Ok(list.into())
}

/// Degree statistics of a graph.
#[pyfunction]
fn graph_stats(py: Python<'_>, graph: Adjacency) -> PyResult<Py<PyDict>> {
    let stats = py
        .allow_threads(|| GraphIndex::from_adjacency(graph).map(|index| GraphStats::from_index(&index)))
        .map_err(|err| to_py_err(err.into()))?;

    let dict = PyDict::new_bound(py);
    dict.set_item("total_nodes", stats.total_nodes)?;
    dict.set_item("total_edges", stats.total_edges)?;
    dict.set_item("sink_nodes", stats.sink_nodes)?;
    dict.set_item("self_loops", stats.self_loops)?;
    dict.set_item("isolated_nodes", stats.isolated_nodes)?;
    dict.set_item("max_in_degree", stats.max_in_degree)?;
    dict.set_item("max_out_degree", stats.max_out_degree)?;
    dict.set_item("avg_out_degree", stats.avg_out_degree)?;

    Ok(dict.into())
}

/// Python module definition.
#[pymodule]
fn _rust_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(compute_ranks, m)?)?;
    m.add_function(wrap_pyfunction!(top_ranked, m)?)?;
    m.add_function(wrap_pyfunction!(graph_stats, m)?)?;

    // Version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
