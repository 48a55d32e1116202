//! pagerank: rank the nodes of a graph file from the command line.
//!
//! Reads an edge list (`source,target` per line) or a JSON adjacency object
//! and prints `node<TAB>score` lines, highest score first.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{info, Level};

use pagerank_core::{
    Format, GraphIndex, GraphStats, PageRankConfig, ParsedGraph, SinkPolicy,
    DEFAULT_DAMPING_FACTOR, DEFAULT_ITERATIONS,
};

#[derive(Parser)]
#[command(name = "pagerank", version, about = "Rank the nodes of a directed graph")]
struct Cli {
    /// Graph file, or `-` for stdin
    input: PathBuf,

    /// Input format; `auto` tries JSON when the input starts with `{` or `[`, then the edge list
    #[arg(long, value_enum, default_value = "auto")]
    format: InputFormat,

    /// Damping factor, strictly between 0 and 1
    #[arg(short, long, default_value_t = DEFAULT_DAMPING_FACTOR)]
    damping: f64,

    /// Number of iterations
    #[arg(short = 'n', long, default_value_t = DEFAULT_ITERATIONS)]
    iterations: usize,

    /// What happens to rank held by nodes without outlinks
    #[arg(long, value_enum, default_value = "leak")]
    sink_policy: SinkPolicyArg,

    /// Compute each pass on a single thread
    #[arg(long)]
    sequential: bool,

    /// Only print the highest-ranked N nodes
    #[arg(long)]
    top: Option<usize>,

    /// Print a JSON object instead of tab-separated lines
    #[arg(long)]
    json: bool,

    /// Log degree statistics before ranking
    #[arg(long)]
    stats: bool,

    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum InputFormat {
    Auto,
    Edges,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkPolicyArg {
    Leak,
    Redistribute,
}

impl From<SinkPolicyArg> for SinkPolicy {
    fn from(arg: SinkPolicyArg) -> Self {
        match arg {
            SinkPolicyArg::Leak => SinkPolicy::Leak,
            SinkPolicyArg::Redistribute => SinkPolicy::Redistribute,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match (cli.quiet, cli.verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, 2) => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    let format = match cli.format {
        InputFormat::Auto => None,
        InputFormat::Edges => Some(Format::EdgeList),
        InputFormat::Json => Some(Format::Json),
    };

    let graph = if cli.input.as_os_str() == "-" {
        ParsedGraph::read(io::stdin().lock(), format).context("failed to read graph from stdin")?
    } else {
        let file = File::open(&cli.input)
            .with_context(|| format!("failed to open {}", cli.input.display()))?;
        ParsedGraph::read(file, format)
            .with_context(|| format!("failed to parse {}", cli.input.display()))?
    };
    info!(entries = graph.len(), "graph loaded");

    if cli.stats {
        let index = GraphIndex::from_adjacency(graph.named_adjacency())?;
        let stats = GraphStats::from_index(&index);
        info!(
            nodes = stats.total_nodes,
            edges = stats.total_edges,
            sinks = stats.sink_nodes,
            self_loops = stats.self_loops,
            isolated = stats.isolated_nodes,
            max_in_degree = stats.max_in_degree,
            max_out_degree = stats.max_out_degree,
            avg_out_degree = stats.avg_out_degree,
            "graph statistics"
        );
    }

    let config = PageRankConfig::default()
        .with_damping_factor(cli.damping)
        .with_iterations(cli.iterations)
        .with_sink_policy(cli.sink_policy.into())
        .with_parallel(!cli.sequential);
    let ranks = graph.rank(&config)?;
    info!(total_mass = ranks.total_mass(), "ranking complete");

    let top = ranks.top_n(cli.top.unwrap_or(ranks.len()));

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if cli.json {
        let object: serde_json::Map<String, serde_json::Value> = top
            .iter()
            .map(|(node, score)| (node.to_string(), serde_json::Value::from(*score)))
            .collect();
        serde_json::to_writer_pretty(&mut out, &object)?;
        writeln!(out)?;
    } else {
        for (node, score) in &top {
            writeln!(out, "{node}\t{score}")?;
        }
    }
    out.flush()?;

    Ok(())
}
