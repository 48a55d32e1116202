//! Graph readers for edge-list text and JSON adjacency.
//!
//! These sit outside the ranking core: they only turn bytes into
//! `(node, outlinks)` pairs. Node names are interned so each distinct name is
//! stored once no matter how many edges mention it.

use std::io::Read;

use hashbrown::HashMap;
use memchr::memchr_iter;
use serde_json::Value;
use string_interner::{DefaultStringInterner, DefaultSymbol};
use tracing::debug;

use crate::config::PageRankConfig;
use crate::error::{InputError, RankError};
use crate::graph_index::FxBuildHasher;
use crate::ranks::RankMap;

/// Supported input encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// `source,target` per line; a lone name declares a node.
    EdgeList,
    /// `{"p1": ["p2"]}` or `[["p1", ["p2"]]]`.
    Json,
}

impl Format {
    /// JSON if the first non-whitespace byte opens an object or array.
    pub fn detect(bytes: &[u8]) -> Self {
        match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
            Some(b'{') | Some(b'[') => Format::Json,
            _ => Format::EdgeList,
        }
    }
}

/// A graph read from text, with interned node names.
#[derive(Debug, Default)]
pub struct ParsedGraph {
    interner: DefaultStringInterner,
    adjacency: Vec<(DefaultSymbol, Vec<DefaultSymbol>)>,
}

impl ParsedGraph {
    /// Read everything from `reader`, detecting the format unless one is given.
    ///
    /// A detected JSON input that fails to parse is retried as an edge list,
    /// since node names may themselves start with `[` or `{`.
    pub fn read<R: Read>(mut reader: R, format: Option<Format>) -> Result<Self, InputError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        match format {
            Some(format) => Self::parse(&bytes, format),
            None => Self::parse_detected(&bytes),
        }
    }

    /// Parse with [`Format::detect`], falling back to the edge-list reader
    /// when the bytes only look like JSON.
    pub fn parse_detected(bytes: &[u8]) -> Result<Self, InputError> {
        match Format::detect(bytes) {
            Format::EdgeList => Self::from_edge_list(bytes),
            Format::Json => Self::from_json(bytes).or_else(|json_err| {
                debug!(error = %json_err, "input is not JSON, reading it as an edge list");
                Self::from_edge_list(bytes).map_err(|_| json_err)
            }),
        }
    }

    pub fn parse(bytes: &[u8], format: Format) -> Result<Self, InputError> {
        match format {
            Format::EdgeList => Self::from_edge_list(bytes),
            Format::Json => Self::from_json(bytes),
        }
    }

    /// Parse an edge list. Every name that appears, as source or target,
    /// becomes a node.
    pub fn from_edge_list(bytes: &[u8]) -> Result<Self, InputError> {
        let mut graph = Self::default();
        let mut positions: HashMap<DefaultSymbol, usize, FxBuildHasher> = HashMap::default();

        let mut start = 0;
        let line_ends = memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len()));
        for (line_no, end) in line_ends.enumerate() {
            let raw = &bytes[start..end];
            start = end + 1;

            let line = std::str::from_utf8(raw)
                .map_err(|_| malformed(line_no, "not valid UTF-8"))?
                .trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.iter().any(|f| f.is_empty()) {
                return Err(malformed(line_no, "empty node name"));
            }
            match fields.as_slice() {
                [node] => {
                    graph.declare(&mut positions, node);
                }
                [source, target] => {
                    let src = graph.declare(&mut positions, source);
                    let tgt = graph.declare(&mut positions, target);
                    let tgt_sym = graph.adjacency[tgt].0;
                    graph.adjacency[src].1.push(tgt_sym);
                }
                _ => {
                    return Err(malformed(
                        line_no,
                        &format!("expected `source,target`, found {} fields", fields.len()),
                    ))
                }
            }
        }

        Ok(graph)
    }

    /// Parse a JSON adjacency object or array of `[node, [targets]]` pairs.
    ///
    /// Targets are not added as nodes; the ranker rejects dangling ones.
    pub fn from_json(bytes: &[u8]) -> Result<Self, InputError> {
        let pairs: Vec<(String, Vec<String>)> = match serde_json::from_slice::<Value>(bytes)? {
            Value::Object(map) => map
                .into_iter()
                .map(|(node, links)| -> Result<_, serde_json::Error> {
                    Ok((node, serde_json::from_value::<Vec<String>>(links)?))
                })
                .collect::<Result<Vec<_>, _>>()?,
            array @ Value::Array(_) => serde_json::from_value(array)?,
            _ => {
                return Err(InputError::Json(<serde_json::Error as serde::de::Error>::custom(
                    "expected a JSON object or array of [node, [targets]] pairs",
                )))
            }
        };

        let mut graph = Self::default();
        for (node, links) in pairs {
            let sym = graph.interner.get_or_intern(node);
            let links = links
                .into_iter()
                .map(|link| graph.interner.get_or_intern(link))
                .collect();
            graph.adjacency.push((sym, links));
        }
        Ok(graph)
    }

    /// Number of `(node, outlinks)` entries.
    pub fn len(&self) -> usize {
        self.adjacency.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adjacency.is_empty()
    }

    pub fn adjacency(&self) -> &[(DefaultSymbol, Vec<DefaultSymbol>)] {
        &self.adjacency
    }

    pub fn resolve(&self, symbol: DefaultSymbol) -> Option<&str> {
        self.interner.resolve(symbol)
    }

    pub fn symbol(&self, name: &str) -> Option<DefaultSymbol> {
        self.interner.get(name)
    }

    /// Adjacency with names resolved, in input order.
    pub fn named_adjacency(&self) -> impl Iterator<Item = (&str, Vec<&str>)> + '_ {
        self.adjacency.iter().map(move |(node, links)| {
            (
                self.name(*node),
                links.iter().map(|&link| self.name(link)).collect(),
            )
        })
    }

    /// Rank the parsed graph, keyed by node name.
    pub fn rank(&self, config: &PageRankConfig) -> Result<RankMap<&str>, RankError> {
        crate::rank_with_config(self.named_adjacency(), config)
    }

    fn name(&self, symbol: DefaultSymbol) -> &str {
        // every stored symbol came from this interner
        self.interner.resolve(symbol).unwrap_or_default()
    }

    fn declare(
        &mut self,
        positions: &mut HashMap<DefaultSymbol, usize, FxBuildHasher>,
        name: &str,
    ) -> usize {
        let sym = self.interner.get_or_intern(name);
        *positions.entry(sym).or_insert_with(|| {
            self.adjacency.push((sym, Vec::new()));
            self.adjacency.len() - 1
        })
    }
}

fn malformed(line_no: usize, reason: &str) -> InputError {
    InputError::MalformedLine {
        line: line_no + 1,
        reason: reason.to_string(),
    }
}
