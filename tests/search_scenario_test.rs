//! End-to-end indexing and search scenarios against an on-disk index.

use microsearch::prelude::*;
use tempfile::TempDir;

fn ids(hits: &[SearchHit]) -> Vec<&str> {
    hits.iter().map(|h| h.doc_id.as_str()).collect()
}

fn office_engine(temp_dir: &TempDir) -> Result<Microsearch> {
    let engine = Microsearch::open(temp_dir.path())?;
    engine.index_fields(
        "email_1",
        [("text", "Peter, I need those TPS reports on my desk")],
    )?;
    engine.index_fields("email_2", [("text", "My red stapler is missing")])?;
    Ok(engine)
}

#[test]
fn test_peter_matches_only_first_email() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = office_engine(&temp_dir)?;

    let hits = engine.search("Peter")?;
    assert_eq!(ids(&hits), vec!["email_1"]);
    Ok(())
}

#[test]
fn test_partial_word_matches_through_ngrams() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = office_engine(&temp_dir)?;

    let hits = engine.search("report")?;
    assert_eq!(hits[0].doc_id, "email_1");
    assert!(hits[0].score > 0.0);
    assert!(!ids(&hits).contains(&"email_2"));
    Ok(())
}

#[test]
fn test_unknown_and_empty_queries() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = office_engine(&temp_dir)?;

    assert!(engine.search("zzz")?.is_empty());
    assert!(engine.search("")?.is_empty());
    Ok(())
}

#[test]
fn test_every_substring_in_gram_range_is_found() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = office_engine(&temp_dir)?;

    let word: Vec<char> = "stapler".chars().collect();
    for len in 3..=5 {
        for start in 0..=word.len() - len {
            let needle: String = word[start..start + len].iter().collect();
            let hits = engine.search(&needle)?;
            assert!(
                ids(&hits).contains(&"email_2"),
                "{needle:?} did not find email_2"
            );
        }
    }
    Ok(())
}

#[test]
fn test_search_is_deterministic() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;
    for (id, text) in [
        ("c", "the desk"),
        ("a", "the desk"),
        ("b", "desk"),
        ("d", "a desk by the window"),
    ] {
        engine.index_fields(id, [("text", text)])?;
    }

    let first = engine.search("desk")?;
    let second = engine.search("desk")?;
    assert_eq!(first, second);

    // "b" is all desk; "a" and "c" tie and order by id.
    assert_eq!(ids(&first), vec!["b", "a", "c", "d"]);
    Ok(())
}

#[test]
fn test_classic_office_corpus() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;

    engine.index_fields("email_1", [("text", "Peter,\n\nI'm going to need those TPS reports on my desk first thing tomorrow! And clean up your desk!\n\nLumbergh")])?;
    engine.index_fields("email_2", [("text", "Everyone,\n\nM-m-m-m-my red stapler has gone missing. H-h-has a-an-anyone seen it?\n\nMilton")])?;
    engine.index_fields("email_3", [("text", "Peter,\n\nYeah, I'm going to need you to come in on Saturday. Don't forget those reports.\n\nLumbergh")])?;
    engine.index_fields("email_4", [("text", "How do you feel about becoming Management?\n\nThe Bobs")])?;

    let mut peter = ids(&engine.search("Peter")?)
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    peter.sort();
    assert_eq!(peter, vec!["email_1", "email_3"]);

    let hits = engine.search("tps report")?;
    let found = ids(&hits);
    assert!(found.contains(&"email_1"));
    assert!(found.contains(&"email_3"));
    assert!(!found.contains(&"email_2"));
    assert!(!found.contains(&"email_4"));

    let results = engine.search_with(
        &SearchRequest::new("stapler")
            .with_limit(1)
            .with_documents(true),
    )?;
    assert_eq!(results.total_hits, 1);
    let document = results.hits[0].document.as_ref().unwrap();
    assert!(document.get_field("text").unwrap().contains("red stapler"));
    Ok(())
}

#[test]
fn test_reindex_keeps_old_postings() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;

    engine.index_fields("memo", [("text", "red stapler")])?;
    engine.index_fields("memo", [("text", "blue pen")])?;

    assert_eq!(ids(&engine.search("stapler")?), vec!["memo"]);
    assert_eq!(ids(&engine.search("blue")?), vec!["memo"]);

    // The stored document is the latest one.
    let document = engine.get_document("memo")?.unwrap();
    assert_eq!(document.get_field("text"), Some("blue pen"));
    Ok(())
}

#[test]
fn test_empty_document_id_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new().unwrap();
    let engine = Microsearch::open(temp_dir.path())?;

    let err = engine.index_fields("", [("text", "anything")]).unwrap_err();
    assert!(err.is_validation());
    assert!(engine.search("anything")?.is_empty());
    Ok(())
}
