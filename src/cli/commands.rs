//! Command implementations for the Microsearch CLI.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use log::{debug, info, warn};

use crate::cli::args::*;
use crate::cli::output::*;
use crate::document::Document;
use crate::engine::config::EngineConfig;
use crate::engine::{MANIFEST_FILE, Microsearch};
use crate::error::{MicrosearchError, Result};
use crate::search::request::SearchRequest;

/// Execute a CLI command.
pub fn execute_command(args: MicrosearchArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };

    match &args.command {
        Command::Index(index_args) => index_paths(index_args, config, &args),
        Command::Search(search_args) => search_index(search_args, config, &args),
        Command::Stats(stats_args) => show_stats(stats_args, config, &args),
        Command::Bench(bench_args) => run_benchmark(bench_args, config, &args),
    }
}

/// A file to index and the id it is indexed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    pub doc_id: String,
    pub path: PathBuf,
}

/// Document id for `path` relative to `root`, with separators replaced by
/// dots (`allen-p/inbox/1.` becomes `allen-p.inbox.1.`).
pub fn doc_id_for(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join(".")
}

/// Collect the files under `path`, sorted, with their document ids.
///
/// A file argument is indexed under its own name; a directory is walked
/// recursively and its files are named relative to it. Symlinked files are
/// followed, symlinked directories are skipped.
pub fn collect_files(path: &Path) -> Result<Vec<CorpusFile>> {
    let mut files = Vec::new();

    if path.is_file() {
        let root = path.parent().unwrap_or(Path::new(""));
        files.push(CorpusFile {
            doc_id: doc_id_for(root, path),
            path: path.to_path_buf(),
        });
        return Ok(files);
    }

    if !path.is_dir() {
        return Err(MicrosearchError::validation(format!(
            "No such file or directory: {}",
            path.display()
        )));
    }

    let mut pending = vec![path.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let entry_path = entry.path();
            if file_type.is_dir() {
                pending.push(entry_path);
            } else if file_type.is_file() || (file_type.is_symlink() && entry_path.is_file()) {
                files.push(CorpusFile {
                    doc_id: doc_id_for(path, &entry_path),
                    path: entry_path,
                });
            } else {
                debug!("skipping {}", entry_path.display());
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Collect the files of every path argument, rejecting two files that would
/// get the same document id.
pub fn collect_corpus(paths: &[PathBuf]) -> Result<Vec<CorpusFile>> {
    let mut seen: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut files = Vec::new();

    for path in paths {
        for file in collect_files(path)? {
            if let Some(first) = seen.get(&file.doc_id) {
                return Err(MicrosearchError::validation(format!(
                    "{} and {} both map to document id {:?}",
                    first.display(),
                    file.path.display(),
                    file.doc_id
                )));
            }
            seen.insert(file.doc_id.clone(), file.path.clone());
            files.push(file);
        }
    }

    Ok(files)
}

/// Read a corpus file as one document with a single field.
fn load_document(file: &CorpusFile, field: &str) -> Result<Document> {
    let bytes = fs::read(&file.path)?;
    Ok(Document::builder()
        .add_text(field, String::from_utf8_lossy(&bytes))
        .build())
}

/// Index files into an index.
fn index_paths(args: &IndexArgs, config: EngineConfig, cli_args: &MicrosearchArgs) -> Result<()> {
    let engine = Microsearch::open_with_config(&args.index_path, config)?;

    let files = collect_corpus(&args.paths)?;
    info!(
        "indexing {} files into {}",
        files.len(),
        args.index_path.display()
    );

    let start_time = Instant::now();
    let mut total_terms = 0;
    for file in &files {
        let document = load_document(file, &args.field)?;
        let report = engine.index(&file.doc_id, &document)?;
        total_terms += report.total_terms;
        debug!("indexed {} as {}", file.path.display(), file.doc_id);
    }
    let duration = start_time.elapsed();

    output_result(
        &IndexingSummary {
            documents_indexed: files.len(),
            total_terms,
            duration_ms: duration.as_millis() as u64,
            docs_per_second: if duration.as_secs_f64() > 0.0 {
                files.len() as f64 / duration.as_secs_f64()
            } else {
                0.0
            },
        },
        cli_args,
    )
}

/// Search the index.
fn search_index(args: &SearchArgs, config: EngineConfig, cli_args: &MicrosearchArgs) -> Result<()> {
    let engine = open_existing(&args.index_path, config)?;

    let request = SearchRequest::new(args.query.clone())
        .with_offset(args.offset)
        .with_limit(args.limit)
        .with_documents(args.documents);

    let start_time = Instant::now();
    let results = engine.search_with(&request)?;
    let duration = start_time.elapsed();

    output_result(
        &SearchOutput {
            query: args.query.clone(),
            total_hits: results.total_hits,
            duration_ms: duration.as_secs_f64() * 1000.0,
            hits: results.hits,
        },
        cli_args,
    )
}

/// Show index statistics.
fn show_stats(args: &StatsArgs, config: EngineConfig, cli_args: &MicrosearchArgs) -> Result<()> {
    let engine = open_existing(&args.index_path, config)?;
    output_result(&engine.stats()?, cli_args)
}

/// Open an index that must already exist.
fn open_existing(path: &Path, config: EngineConfig) -> Result<Microsearch> {
    if !path.join(MANIFEST_FILE).is_file() {
        return Err(MicrosearchError::validation(format!(
            "No index found at {}",
            path.display()
        )));
    }
    Microsearch::open_with_config(path, config)
}

/// Remove a previous benchmark index, refusing to touch directories that do
/// not look like an index.
fn reset_index_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        return Ok(());
    }

    let is_empty = fs::read_dir(path)?.next().is_none();
    if !is_empty && !path.join(MANIFEST_FILE).is_file() {
        return Err(MicrosearchError::validation(format!(
            "Refusing to wipe {}: not a microsearch index",
            path.display()
        )));
    }

    warn!("removing existing index at {}", path.display());
    fs::remove_dir_all(path)?;
    Ok(())
}

/// Index up to `max_docs` corpus files from scratch, then time the queries.
pub fn benchmark(args: &BenchArgs, config: EngineConfig) -> Result<BenchmarkResults> {
    reset_index_dir(&args.index_dir)?;
    let engine = Microsearch::open_with_config(&args.index_dir, config)?;

    let mut files = collect_files(&args.corpus_dir)?;
    files.truncate(args.max_docs);
    info!("benchmark: indexing {} documents", files.len());

    let mut index_total_ms = 0.0;
    for file in &files {
        let document = load_document(file, "text")?;
        let start_time = Instant::now();
        engine.index(&file.doc_id, &document)?;
        index_total_ms += start_time.elapsed().as_secs_f64() * 1000.0;
    }

    let mut queries = Vec::new();
    for query in args.effective_queries() {
        let start_time = Instant::now();
        let hits = engine.search(&query)?;
        let duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;
        info!("benchmark: {query:?} found {} results", hits.len());
        queries.push(QueryTiming {
            query,
            total_hits: hits.len(),
            duration_ms,
        });
    }
    let search_total_ms: f64 = queries.iter().map(|q| q.duration_ms).sum();

    Ok(BenchmarkResults {
        documents: files.len(),
        index_total_ms,
        index_avg_ms: average(index_total_ms, files.len()),
        search_avg_ms: average(search_total_ms, queries.len()),
        search_total_ms,
        queries,
    })
}

fn average(total: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { total / count as f64 }
}

/// Run the benchmark and print its results.
fn run_benchmark(args: &BenchArgs, config: EngineConfig, cli_args: &MicrosearchArgs) -> Result<()> {
    let results = benchmark(args, config)?;
    output_result(&results, cli_args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_corpus(root: &Path) {
        fs::create_dir_all(root.join("allen-p").join("inbox")).unwrap();
        fs::write(
            root.join("allen-p").join("inbox").join("1."),
            "Peter, I need those TPS reports on my desk",
        )
        .unwrap();
        fs::write(
            root.join("allen-p").join("inbox").join("2."),
            "My red stapler is missing",
        )
        .unwrap();
    }

    #[test]
    fn test_doc_id_for() {
        let root = Path::new("/data/maildir");
        assert_eq!(
            doc_id_for(root, Path::new("/data/maildir/allen-p/inbox/1.")),
            "allen-p.inbox.1."
        );
    }

    #[test]
    fn test_collect_files() {
        let temp_dir = TempDir::new().unwrap();
        write_corpus(temp_dir.path());

        let files = collect_files(temp_dir.path()).unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["allen-p.inbox.1.", "allen-p.inbox.2."]);

        let single = collect_files(&temp_dir.path().join("allen-p/inbox/2.")).unwrap();
        assert_eq!(single[0].doc_id, "2.");

        assert!(collect_files(&temp_dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_collect_corpus_rejects_id_collisions() {
        let first = TempDir::new().unwrap();
        let second = TempDir::new().unwrap();
        write_corpus(first.path());
        write_corpus(second.path());

        let err = collect_corpus(&[first.path().to_path_buf(), second.path().to_path_buf()])
            .unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("allen-p.inbox.1."));

        let files = collect_corpus(&[
            first.path().join("allen-p/inbox/1."),
            second.path().join("allen-p/inbox"),
        ]);
        assert!(files.unwrap_err().is_validation());

        assert_eq!(collect_corpus(&[first.path().to_path_buf()]).unwrap().len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_skips_directory_links() {
        let temp_dir = TempDir::new().unwrap();
        write_corpus(temp_dir.path());
        // A link back to the root would loop forever if followed.
        std::os::unix::fs::symlink(temp_dir.path(), temp_dir.path().join("allen-p/loop")).unwrap();
        std::os::unix::fs::symlink(
            temp_dir.path().join("allen-p/inbox/1."),
            temp_dir.path().join("linked."),
        )
        .unwrap();

        let files = collect_files(temp_dir.path()).unwrap();
        let ids: Vec<&str> = files.iter().map(|f| f.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["allen-p.inbox.1.", "allen-p.inbox.2.", "linked."]);
    }

    #[test]
    fn test_benchmark_run() {
        let corpus = TempDir::new().unwrap();
        write_corpus(corpus.path());
        let index = TempDir::new().unwrap();

        let args = BenchArgs {
            corpus_dir: corpus.path().to_path_buf(),
            index_dir: index.path().join("bench"),
            max_docs: 1,
            queries: vec!["peter".to_string(), "stapler".to_string()],
        };

        let results = benchmark(&args, EngineConfig::default()).unwrap();
        assert_eq!(results.documents, 1);
        assert_eq!(results.queries.len(), 2);
        assert_eq!(results.queries[0].total_hits, 1);
        assert_eq!(results.queries[1].total_hits, 0);

        // A second run starts from an empty index again.
        let results = benchmark(&args, EngineConfig::default()).unwrap();
        assert_eq!(results.queries[0].total_hits, 1);
    }

    #[test]
    fn test_benchmark_refuses_foreign_directory() {
        let corpus = TempDir::new().unwrap();
        write_corpus(corpus.path());
        let other = TempDir::new().unwrap();
        fs::write(other.path().join("important.txt"), "keep me").unwrap();

        let args = BenchArgs {
            corpus_dir: corpus.path().to_path_buf(),
            index_dir: other.path().to_path_buf(),
            max_docs: 10,
            queries: Vec::new(),
        };

        assert!(benchmark(&args, EngineConfig::default()).unwrap_err().is_validation());
        assert!(other.path().join("important.txt").exists());
    }
}
