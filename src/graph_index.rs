//! Dense, read-only index over an adjacency graph.
//!
//! Nodes are numbered `0..V` in first-appearance order. Outlinks and
//! predecessors are both stored in Compressed Sparse Row form, built once
//! from the input and never mutated afterwards.

use std::fmt::Debug;
use std::hash::{BuildHasherDefault, Hash};

use hashbrown::HashMap;
use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use rustc_hash::FxHasher;
use tracing::{debug, warn};

use crate::error::InvalidGraphError;
use crate::ranks::RankMap;

pub(crate) type FxBuildHasher = BuildHasherDefault<FxHasher>;

/// Out-degree and predecessor tables for a validated graph.
#[derive(Debug, Clone)]
pub struct GraphIndex<N> {
    nodes: Vec<N>,
    node_to_index: HashMap<N, usize, FxBuildHasher>,
    /// Offsets into `out_targets`, length `V + 1`
    out_offsets: Vec<usize>,
    out_targets: Vec<usize>,
    /// Offsets into `in_sources`, length `V + 1`
    in_offsets: Vec<usize>,
    in_sources: Vec<usize>,
}

impl<N> GraphIndex<N>
where
    N: Eq + Hash + Clone + Debug,
{
    /// Validate and index a graph given as `(node, outlinks)` pairs.
    ///
    /// A repeated key replaces the outlinks of its earlier occurrence but
    /// keeps the earlier position. Every outlink target must itself be a key.
    ///
    /// # Errors
    ///
    /// * [`InvalidGraphError::Empty`] if there are no nodes
    /// * [`InvalidGraphError::DanglingReference`] for the first target that is not a key
    pub fn from_adjacency<I>(graph: I) -> Result<Self, InvalidGraphError>
    where
        I: IntoIterator<Item = (N, Vec<N>)>,
    {
        let mut nodes: Vec<N> = Vec::new();
        let mut outlinks: Vec<Vec<N>> = Vec::new();
        let mut node_to_index: HashMap<N, usize, FxBuildHasher> = HashMap::default();

        for (node, links) in graph {
            match node_to_index.get(&node) {
                Some(&idx) => {
                    warn!(node = ?node, "duplicate graph key, keeping the later outlinks");
                    outlinks[idx] = links;
                }
                None => {
                    node_to_index.insert(node.clone(), nodes.len());
                    nodes.push(node);
                    outlinks.push(links);
                }
            }
        }

        let num_nodes = nodes.len();
        if num_nodes == 0 {
            return Err(InvalidGraphError::Empty);
        }

        let total_links: usize = outlinks.iter().map(Vec::len).sum();
        let mut out_offsets = Vec::with_capacity(num_nodes + 1);
        let mut out_targets = Vec::with_capacity(total_links);
        out_offsets.push(0);

        for (src, links) in outlinks.iter().enumerate() {
            for target in links {
                let Some(&tgt) = node_to_index.get(target) else {
                    return Err(InvalidGraphError::DanglingReference {
                        from: format!("{:?}", nodes[src]),
                        target: format!("{:?}", target),
                    });
                };
                out_targets.push(tgt);
            }
            out_offsets.push(out_targets.len());
        }

        let (in_offsets, in_sources) = transpose(num_nodes, &out_offsets, &out_targets);

        debug!(
            nodes = num_nodes,
            edges = out_targets.len(),
            predecessor_links = in_sources.len(),
            "indexed graph"
        );

        Ok(Self {
            nodes,
            node_to_index,
            out_offsets,
            out_targets,
            in_offsets,
            in_sources,
        })
    }

    /// Dense index of a node, if it is part of the graph.
    pub fn index_of(&self, node: &N) -> Option<usize> {
        self.node_to_index.get(node).copied()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.node_to_index.contains_key(node)
    }

    /// Out-degree of a node by identifier.
    pub fn out_degree_of(&self, node: &N) -> Option<usize> {
        self.index_of(node).map(|idx| self.out_degree(idx))
    }

    /// Predecessors of a node by identifier, in graph order.
    pub fn predecessors_of(&self, node: &N) -> Option<impl Iterator<Item = &N> + '_> {
        self.index_of(node)
            .map(|idx| self.predecessors(idx).iter().map(|&p| &self.nodes[p]))
    }

    /// Convert to a petgraph `DiGraph` whose node indices match the dense indices.
    ///
    /// Duplicate outlinks become parallel edges.
    pub fn to_digraph(&self) -> DiGraph<N, ()> {
        let mut graph = DiGraph::with_capacity(self.node_count(), self.edge_count());
        for node in &self.nodes {
            graph.add_node(node.clone());
        }
        self.add_edges(&mut graph);
        graph
    }

    /// Consume the index, pairing every node with its score.
    pub(crate) fn into_rank_map(self, scores: Vec<f64>) -> RankMap<N> {
        RankMap::from_parts(self.nodes, scores, self.node_to_index)
    }
}

impl<N> GraphIndex<N> {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of outlink entries, duplicates included.
    pub fn edge_count(&self) -> usize {
        self.out_targets.len()
    }

    /// All nodes in index order.
    pub fn nodes(&self) -> &[N] {
        &self.nodes
    }

    pub fn node(&self, idx: usize) -> &N {
        &self.nodes[idx]
    }

    pub fn out_degree(&self, idx: usize) -> usize {
        self.out_offsets[idx + 1] - self.out_offsets[idx]
    }

    /// Number of distinct predecessors.
    pub fn in_degree(&self, idx: usize) -> usize {
        self.in_offsets[idx + 1] - self.in_offsets[idx]
    }

    /// Outlink targets in the order they were listed.
    pub fn successors(&self, idx: usize) -> &[usize] {
        &self.out_targets[self.out_offsets[idx]..self.out_offsets[idx + 1]]
    }

    /// Distinct nodes linking to `idx`, in graph order.
    pub fn predecessors(&self, idx: usize) -> &[usize] {
        &self.in_sources[self.in_offsets[idx]..self.in_offsets[idx + 1]]
    }

    /// Indices of nodes without outlinks.
    pub fn sinks(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.node_count()).filter(move |&idx| self.out_degree(idx) == 0)
    }

    /// True when every node can reach every other node.
    pub fn is_strongly_connected(&self) -> bool {
        let mut topology: DiGraph<(), ()> =
            DiGraph::with_capacity(self.node_count(), self.edge_count());
        for _ in 0..self.node_count() {
            topology.add_node(());
        }
        self.add_edges(&mut topology);
        kosaraju_scc(&topology).len() == 1
    }

    fn add_edges<W>(&self, graph: &mut DiGraph<W, ()>) {
        for src in 0..self.node_count() {
            for &tgt in self.successors(src) {
                graph.add_edge(NodeIndex::new(src), NodeIndex::new(tgt), ());
            }
        }
    }
}

/// Build the predecessor CSR with a counting pass and a fill pass over the outlinks.
///
/// Sources are visited in index order, so each predecessor list comes out
/// sorted. A source is recorded once per target even if it repeats the link.
fn transpose(
    num_nodes: usize,
    out_offsets: &[usize],
    out_targets: &[usize],
) -> (Vec<usize>, Vec<usize>) {
    let mut last_source = vec![usize::MAX; num_nodes];
    let mut in_counts = vec![0usize; num_nodes];

    for src in 0..num_nodes {
        for &tgt in &out_targets[out_offsets[src]..out_offsets[src + 1]] {
            if last_source[tgt] != src {
                last_source[tgt] = src;
                in_counts[tgt] += 1;
            }
        }
    }

    let mut in_offsets = Vec::with_capacity(num_nodes + 1);
    in_offsets.push(0);
    for count in &in_counts {
        let last = in_offsets[in_offsets.len() - 1];
        in_offsets.push(last + count);
    }

    let mut cursor = in_offsets[..num_nodes].to_vec();
    let mut in_sources = vec![0usize; in_offsets[num_nodes]];
    last_source.fill(usize::MAX);

    for src in 0..num_nodes {
        for &tgt in &out_targets[out_offsets[src]..out_offsets[src + 1]] {
            if last_source[tgt] != src {
                last_source[tgt] = src;
                in_sources[cursor[tgt]] = src;
                cursor[tgt] += 1;
            }
        }
    }

    (in_offsets, in_sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(pairs: &[(&'static str, &[&'static str])]) -> Vec<(&'static str, Vec<&'static str>)> {
        pairs.iter().map(|(n, links)| (*n, links.to_vec())).collect()
    }

    #[test]
    fn test_degrees_and_predecessors() {
        let index = GraphIndex::from_adjacency(graph(&[
            ("p1", &["p2"]),
            ("p2", &["p1", "p3"]),
            ("p3", &["p2"]),
        ]))
        .unwrap();

        assert_eq!(index.node_count(), 3);
        assert_eq!(index.edge_count(), 4);
        assert_eq!(index.out_degree_of(&"p2"), Some(2));
        let preds: Vec<_> = index.predecessors_of(&"p2").unwrap().copied().collect();
        assert_eq!(preds, vec!["p1", "p3"]);
        let preds: Vec<_> = index.predecessors_of(&"p3").unwrap().copied().collect();
        assert_eq!(preds, vec!["p2"]);
    }

    #[test]
    fn test_empty_graph_rejected() {
        let err = GraphIndex::<&str>::from_adjacency(Vec::new()).unwrap_err();
        assert_eq!(err, InvalidGraphError::Empty);
    }

    #[test]
    fn test_dangling_reference_rejected() {
        let err = GraphIndex::from_adjacency(graph(&[("p1", &["p2"])])).unwrap_err();
        assert_eq!(
            err,
            InvalidGraphError::DanglingReference {
                from: "\"p1\"".to_string(),
                target: "\"p2\"".to_string(),
            }
        );
    }

    #[test]
    fn test_node_without_predecessors() {
        let index = GraphIndex::from_adjacency(graph(&[("a", &["b"]), ("b", &[])])).unwrap();
        let a = index.index_of(&"a").unwrap();
        assert!(index.predecessors(a).is_empty());
        assert_eq!(index.in_degree(a), 0);
        assert_eq!(index.sinks().collect::<Vec<_>>(), vec![index.index_of(&"b").unwrap()]);
    }

    #[test]
    fn test_duplicate_edges_only_raise_out_degree() {
        let index = GraphIndex::from_adjacency(graph(&[("a", &["b", "b"]), ("b", &["a"])])).unwrap();
        let b = index.index_of(&"b").unwrap();
        assert_eq!(index.out_degree_of(&"a"), Some(2));
        assert_eq!(index.predecessors(b), &[0]);
    }

    #[test]
    fn test_self_loop_is_own_predecessor() {
        let index = GraphIndex::from_adjacency(graph(&[("a", &["a", "b"]), ("b", &[])])).unwrap();
        assert_eq!(index.predecessors(0), &[0]);
        assert_eq!(index.out_degree(0), 2);
    }

    #[test]
    fn test_duplicate_key_last_wins_first_position_kept() {
        let index = GraphIndex::from_adjacency(graph(&[
            ("a", &["b"]),
            ("b", &[]),
            ("a", &[]),
        ]))
        .unwrap();
        assert_eq!(index.node_count(), 2);
        assert_eq!(index.index_of(&"a"), Some(0));
        assert_eq!(index.out_degree_of(&"a"), Some(0));
    }

    #[test]
    fn test_unknown_node_queries() {
        let index = GraphIndex::from_adjacency(graph(&[("a", &[])])).unwrap();
        assert!(!index.contains(&"z"));
        assert_eq!(index.out_degree_of(&"z"), None);
        assert!(index.predecessors_of(&"z").is_none());
    }

    #[test]
    fn test_strong_connectivity() {
        let cycle = GraphIndex::from_adjacency(graph(&[
            ("a", &["b"]),
            ("b", &["c"]),
            ("c", &["a"]),
        ]))
        .unwrap();
        assert!(cycle.is_strongly_connected());

        let chain = GraphIndex::from_adjacency(graph(&[("a", &["b"]), ("b", &[])])).unwrap();
        assert!(!chain.is_strongly_connected());
    }

    #[test]
    fn test_to_digraph_keeps_indices() {
        let index = GraphIndex::from_adjacency(graph(&[("a", &["b", "b"]), ("b", &["a"])])).unwrap();
        let digraph = index.to_digraph();
        assert_eq!(digraph.node_count(), 2);
        assert_eq!(digraph.edge_count(), 3);
        assert_eq!(digraph[NodeIndex::new(1)], "b");
    }
}
