//! Integration tests for snapshot persistence.

#![allow(clippy::expect_used, clippy::panic, clippy::unwrap_used)]

use corpus_engine::{Corpus, CorpusError, Vectorizable};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::cell::Cell;
use tempfile::tempdir;

fn raw() -> Value {
    json!({
        "Gen": {
            "Gen.1": {
                "Gen.1.1": [
                    {"text": "In", "lemma": "H9002 H7225", "morph": "HR HNcfsa"},
                    {"text": "the beginning", "lemma": "H7225"}
                ],
                "Gen.1.2": [{"text": "And the earth", "lemma": "H9003 H776"}]
            }
        }
    })
}

#[test]
fn save_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kjv.json");

    let original = Corpus::from_raw("BibleKJV", &raw()).unwrap();
    original.save_snapshot(&path).unwrap();
    let reloaded = Corpus::from_snapshot_file(&path).unwrap();

    assert_eq!(reloaded.summary(), original.summary());
    assert_eq!(reloaded.text(), original.text());
    assert_eq!(
        reloaded.root().child_identificators(),
        original.root().child_identificators()
    );
    let verse = reloaded.resolve("Gen.1.1").unwrap();
    assert_eq!(verse.nested_morphs(), original.resolve("Gen.1.1").unwrap().nested_morphs());
    assert_eq!(*reloaded.token_counts(), *original.token_counts());
}

#[test]
fn load_or_build_builds_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kjv.json");
    let builds = Cell::new(0);
    let loader = || {
        builds.set(builds.get() + 1);
        Ok(raw())
    };

    let built = Corpus::load_or_build(&path, "BibleKJV", loader).unwrap();
    assert!(path.exists());
    assert_eq!(builds.get(), 1);

    let loaded = Corpus::load_or_build(&path, "BibleKJV", || {
        builds.set(builds.get() + 1);
        Ok(raw())
    })
    .unwrap();
    assert_eq!(builds.get(), 1, "existing snapshot must be reused");
    assert_eq!(loaded.summary(), built.summary());
}

#[test]
fn load_or_build_propagates_loader_errors() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kjv.json");
    let err = Corpus::load_or_build(&path, "BibleKJV", || {
        Err(CorpusError::SnapshotError("raw source unavailable".to_string()))
    })
    .unwrap_err();
    assert!(matches!(err, CorpusError::SnapshotError(_)));
    assert!(!path.exists());
}

#[test]
fn corrupt_snapshot_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("kjv.json");
    std::fs::write(&path, "{\"identificator\": 3}").unwrap();
    let err = Corpus::load_or_build(&path, "BibleKJV", || Ok(raw())).unwrap_err();
    assert!(matches!(err, CorpusError::JsonError(_)));
}
