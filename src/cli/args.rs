//! Command line argument parsing for the Microsearch CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::search::request::DEFAULT_LIMIT;

/// Queries run by `bench` when none are given.
pub const DEFAULT_BENCH_QUERIES: &[&str] = &[
    "expert",
    "question",
    "tax",
    "audit",
    "tax audit",
    "accounting",
    "enron",
];

/// Microsearch - a minimal embeddable full-text search engine
#[derive(Parser, Debug, Clone)]
#[command(name = "microsearch")]
#[command(about = "Index files and search them with n-gram matching")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct MicrosearchArgs {
    /// Verbosity level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Engine configuration file (JSON)
    #[arg(short, long, global = true, value_name = "CONFIG_FILE")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl MicrosearchArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1,
                n => n + 1,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Index files, one document per file
    Index(IndexArgs),

    /// Search an index
    Search(SearchArgs),

    /// Show index statistics
    Stats(StatsArgs),

    /// Index a corpus from scratch and time a set of queries
    Bench(BenchArgs),
}

/// Arguments for indexing files
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Files or directories to index. Directories are walked recursively.
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Field name the file content is stored under
    #[arg(long, default_value = "text")]
    pub field: String,
}

/// Arguments for searching
#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,

    /// Query string
    #[arg(value_name = "QUERY")]
    pub query: String,

    /// Maximum number of results to return
    #[arg(short, long, default_value_t = DEFAULT_LIMIT)]
    pub limit: usize,

    /// Offset for pagination
    #[arg(short, long, default_value_t = 0)]
    pub offset: usize,

    /// Include stored documents in the output
    #[arg(long)]
    pub documents: bool,
}

/// Arguments for index statistics
#[derive(Parser, Debug, Clone)]
pub struct StatsArgs {
    /// Path to the index directory
    #[arg(value_name = "INDEX_PATH")]
    pub index_path: PathBuf,
}

/// Arguments for the benchmark
#[derive(Parser, Debug, Clone)]
pub struct BenchArgs {
    /// Directory holding the corpus, one document per file
    #[arg(value_name = "CORPUS_DIR")]
    pub corpus_dir: PathBuf,

    /// Index directory; wiped before the run
    #[arg(long, default_value = "/tmp/microsearch_bench")]
    pub index_dir: PathBuf,

    /// Maximum number of files to index
    #[arg(long, default_value_t = 1200)]
    pub max_docs: usize,

    /// Queries to time (repeatable)
    #[arg(long = "query", value_name = "QUERY")]
    pub queries: Vec<String>,
}

impl BenchArgs {
    /// The queries to run, falling back to [`DEFAULT_BENCH_QUERIES`].
    pub fn effective_queries(&self) -> Vec<String> {
        if self.queries.is_empty() {
            DEFAULT_BENCH_QUERIES.iter().map(|q| q.to_string()).collect()
        } else {
            self.queries.clone()
        }
    }
}

/// Output formats supported by the CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}
