//! On-disk layout, reopening and failure behaviour of the file-backed index.

use std::fs;
use std::sync::Arc;

use microsearch::engine::MANIFEST_FILE;
use microsearch::index::doc_stats::DOC_STATS_FILE;
use microsearch::index::PartitionStrategy;
use microsearch::prelude::*;
use microsearch::storage::{FileStorage, StorageConfig};
use tempfile::TempDir;

#[test]
fn test_index_survives_reopen() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();

    {
        let engine = Microsearch::open(temp_dir.path())?;
        engine.index_fields("email_1", [("text", "Peter, I need those TPS reports")])?;
    }

    let engine = Microsearch::open(temp_dir.path())?;
    let hits = engine.search("peter")?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].doc_id, "email_1");

    let stats = engine.stats()?;
    assert_eq!(stats.total_documents, 1);
    assert_eq!(stats.version, microsearch::VERSION);
    Ok(())
}

#[test]
fn test_directory_layout() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;
    engine.index_fields("a", [("text", "red pen 42")])?;

    let mut names: Vec<String> = fs::read_dir(temp_dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    assert!(names.contains(&MANIFEST_FILE.to_string()));
    assert!(names.contains(&DOC_STATS_FILE.to_string()));
    assert!(names.contains(&"shard-r.json".to_string()));
    assert!(names.contains(&"shard-p.json".to_string()));
    // "42" has a non-alphabetic leading character
    assert!(names.contains(&"shard-_.json".to_string()));
    assert!(names.iter().any(|n| n.starts_with("docs-")));
    assert!(!names.iter().any(|n| n.ends_with(".tmp")));

    // Shards are human-readable JSON.
    let shard: serde_json::Value =
        serde_json::from_slice(&fs::read(temp_dir.path().join("shard-r.json")).unwrap()).unwrap();
    assert_eq!(shard["red"][0]["doc_id"], "a");
    assert_eq!(shard["red"][0]["frequency"], 1);
    Ok(())
}

#[test]
fn test_corrupt_shard_fails_fast() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;
    engine.index_fields("a", [("text", "red pen")])?;

    fs::write(temp_dir.path().join("shard-r.json"), "{\"red\": [").unwrap();

    let err = engine.search("red").unwrap_err();
    assert!(err.is_storage());

    // A query that touches only an intact shard still works.
    assert_eq!(engine.search("pen")?.len(), 1);

    // A query spanning the broken shard fails as a whole.
    assert!(engine.search("red pen").is_err());
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_unreadable_shard_is_not_empty() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;
    engine.index_fields("a", [("text", "red pen")])?;

    let shard = temp_dir.path().join("shard-r.json");
    fs::remove_file(&shard).unwrap();
    std::os::unix::fs::symlink(temp_dir.path().join("missing-target"), &shard).unwrap();

    assert!(engine.search("red").unwrap_err().is_storage());

    // Writing to the shard does not paper over it either.
    assert!(engine.index_fields("b", [("text", "red")]).is_err());
    assert!(fs::symlink_metadata(&shard).unwrap().file_type().is_symlink());
    Ok(())
}

#[test]
fn test_corrupt_stats_fails_query() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;
    engine.index_fields("a", [("text", "red pen")])?;

    fs::write(temp_dir.path().join(DOC_STATS_FILE), "not json").unwrap();

    assert!(engine.search("red").unwrap_err().is_storage());
    Ok(())
}

#[test]
fn test_reopen_with_other_settings_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    Microsearch::open(temp_dir.path())?;

    let err = Microsearch::open_with_config(
        temp_dir.path(),
        EngineConfig::default().with_min_gram(2),
    )
    .unwrap_err();
    assert!(err.is_validation());
    Ok(())
}

#[test]
fn test_reopen_with_other_bucket_count_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let four = EngineConfig::default().with_partition(PartitionStrategy::Hash { buckets: 4 });
    {
        let engine = Microsearch::open_with_config(temp_dir.path(), four.clone())?;
        engine.index_fields("a", [("text", "tps red pen")])?;
    }

    let eight = EngineConfig::default().with_partition(PartitionStrategy::Hash { buckets: 8 });
    assert!(Microsearch::open_with_config(temp_dir.path(), eight).unwrap_err().is_validation());

    let engine = Microsearch::open_with_config(temp_dir.path(), four)?;
    assert_eq!(engine.search("pen")?.len(), 1);
    Ok(())
}

#[test]
fn test_hash_partitioned_index() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let config = EngineConfig::default().with_partition(PartitionStrategy::Hash { buckets: 4 });
    let engine = Microsearch::open_with_config(temp_dir.path(), config.clone())?;

    engine.index_fields("email_2", [("text", "My red stapler is missing")])?;
    assert!(engine.stats()?.total_shards <= 4);
    assert_eq!(engine.search("stapler")?[0].doc_id, "email_2");

    // Reopening with the same strategy reads the same shards.
    drop(engine);
    let engine = Microsearch::open_with_config(temp_dir.path(), config)?;
    assert_eq!(engine.search("missing")?[0].doc_id, "email_2");
    Ok(())
}

#[test]
fn test_synced_writes() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let storage_config = StorageConfig {
        sync_writes: true,
        ..Default::default()
    };
    let storage = FileStorage::new(temp_dir.path(), storage_config.clone())?;
    let engine = Microsearch::with_storage(
        Arc::new(storage),
        EngineConfig::default().with_storage(storage_config),
    )?;

    engine.index_fields("a", [("text", "durable write")])?;
    assert_eq!(engine.search("durable")?.len(), 1);
    Ok(())
}
