//! Output formatting for CLI commands.

use serde::{Deserialize, Serialize};

use crate::cli::args::{MicrosearchArgs, OutputFormat};
use crate::engine::IndexStats;
use crate::error::Result;
use crate::search::request::SearchHit;

/// Result structure for an indexing run.
#[derive(Debug, Serialize, Deserialize)]
pub struct IndexingSummary {
    pub documents_indexed: usize,
    pub total_terms: u64,
    pub duration_ms: u64,
    pub docs_per_second: f64,
}

/// Result structure for search operations.
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchOutput {
    pub query: String,
    pub total_hits: usize,
    pub duration_ms: f64,
    pub hits: Vec<SearchHit>,
}

/// Timing of one benchmark query.
#[derive(Debug, Serialize, Deserialize)]
pub struct QueryTiming {
    pub query: String,
    pub total_hits: usize,
    pub duration_ms: f64,
}

/// Benchmark results.
#[derive(Debug, Serialize, Deserialize)]
pub struct BenchmarkResults {
    pub documents: usize,
    pub index_total_ms: f64,
    pub index_avg_ms: f64,
    pub queries: Vec<QueryTiming>,
    pub search_total_ms: f64,
    pub search_avg_ms: f64,
}

/// Plain-text rendering of a command result.
pub trait HumanOutput {
    fn render_human(&self) -> String;
}

impl HumanOutput for IndexingSummary {
    fn render_human(&self) -> String {
        format!(
            "Indexed {} documents ({} terms) in {} ms ({:.1} docs/s)",
            self.documents_indexed, self.total_terms, self.duration_ms, self.docs_per_second
        )
    }
}

impl HumanOutput for SearchOutput {
    fn render_human(&self) -> String {
        let mut out = format!(
            "Found {} results for {:?} in {:.3} ms\n",
            self.total_hits, self.query, self.duration_ms
        );
        for (rank, hit) in self.hits.iter().enumerate() {
            out.push_str(&format!("{:>4}. {:.6}  {}\n", rank + 1, hit.score, hit.doc_id));
            if let Some(document) = &hit.document {
                for (name, value) in document.fields() {
                    out.push_str(&format!("        {name}: {}\n", preview(value, 80)));
                }
            }
        }
        out
    }
}

impl HumanOutput for IndexStats {
    fn render_human(&self) -> String {
        format!(
            "Documents: {}\nShards:    {}\nTerms:     {}\nVersion:   {}",
            self.total_documents, self.total_shards, self.total_terms, self.version
        )
    }
}

impl HumanOutput for BenchmarkResults {
    fn render_human(&self) -> String {
        let mut out = format!(
            "Indexed {} docs in {:.3} ms (avg {:.3} ms/doc)\n",
            self.documents, self.index_total_ms, self.index_avg_ms
        );
        for timing in &self.queries {
            out.push_str(&format!(
                "Query {:?}: {} results in {:.3} ms\n",
                timing.query, timing.total_hits, timing.duration_ms
            ));
        }
        out.push_str(&format!(
            "Searched {} queries in {:.3} ms (avg {:.3} ms/query)",
            self.queries.len(),
            self.search_total_ms,
            self.search_avg_ms
        ));
        out
    }
}

/// Single-line prefix of `text`, at most `max_chars` characters.
fn preview(text: &str, max_chars: usize) -> String {
    let flat: String = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= max_chars {
        flat
    } else {
        let mut cut: String = flat.chars().take(max_chars).collect();
        cut.push_str("...");
        cut
    }
}

/// Render a result in the requested format.
pub fn render_result<T: Serialize + HumanOutput>(result: &T, args: &MicrosearchArgs) -> Result<String> {
    Ok(match args.output_format {
        OutputFormat::Human => result.render_human(),
        OutputFormat::Json if args.pretty => serde_json::to_string_pretty(result)?,
        OutputFormat::Json => serde_json::to_string(result)?,
    })
}

/// Print a result in the requested format.
pub fn output_result<T: Serialize + HumanOutput>(result: &T, args: &MicrosearchArgs) -> Result<()> {
    println!("{}", render_result(result, args)?);
    Ok(())
}
