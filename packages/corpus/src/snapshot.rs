//! Persisted snapshots of a built corpus
//!
//! A snapshot is the tree serialized as nested JSON with stable field names, so
//! a corpus can be reloaded without re-running the markup extractor:
//!
//! ```json
//! {"identificator": "BibleKJV", "books": [
//!   {"identificator": "Gen", "chapters": [
//!     {"identificator": "Gen.1", "verses": [
//!       {"identificator": "Gen.1.1", "words": [
//!         {"identificator": "In", "lemmas": ["H9002"], "morphs": ["HR"]}
//!       ]}
//!     ]}
//!   ]}
//! ]}
//! ```
//!
//! Loading runs the same validation as any other construction. The memo
//! registry is never persisted; a reloaded corpus starts with an empty cache.

use crate::config::{DEFAULT_CORPUS_IDENTIFICATOR, MAX_SNAPSHOT_SIZE};
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::leaf::{LeafRef, LeafUnit};
use crate::node::{Book, Chapter, CollectionNode, Vectorizable, Verse};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Name of the field holding a container's children in a snapshot.
pub trait SnapshotField {
    const CHILDREN_FIELD: &'static str;
}

impl SnapshotField for LeafRef {
    const CHILDREN_FIELD: &'static str = "words";
}

impl SnapshotField for Verse {
    const CHILDREN_FIELD: &'static str = "verses";
}

impl SnapshotField for Chapter {
    const CHILDREN_FIELD: &'static str = "chapters";
}

impl SnapshotField for Book {
    const CHILDREN_FIELD: &'static str = "books";
}

impl<C> Serialize for CollectionNode<C>
where
    C: Vectorizable + SnapshotField + Serialize,
{
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("CollectionNode", 2)?;
        state.serialize_field("identificator", self.identificator())?;
        state.serialize_field(C::CHILDREN_FIELD, self.children())?;
        state.end()
    }
}

impl Serialize for Corpus {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.root().serialize(serializer)
    }
}

#[derive(Deserialize)]
struct CorpusSnapshot {
    #[serde(default = "default_identificator")]
    identificator: String,
    #[serde(default)]
    books: Vec<BookSnapshot>,
}

#[derive(Deserialize)]
struct BookSnapshot {
    identificator: String,
    #[serde(default)]
    chapters: Vec<ChapterSnapshot>,
}

#[derive(Deserialize)]
struct ChapterSnapshot {
    identificator: String,
    #[serde(default)]
    verses: Vec<VerseSnapshot>,
}

#[derive(Deserialize)]
struct VerseSnapshot {
    identificator: String,
    #[serde(default)]
    words: Vec<LeafUnit>,
}

fn default_identificator() -> String {
    DEFAULT_CORPUS_IDENTIFICATOR.to_string()
}

impl BookSnapshot {
    fn into_node(self) -> Book {
        let chapters = self.chapters.into_iter().map(ChapterSnapshot::into_node).collect();
        Book::new(self.identificator, chapters)
    }
}

impl ChapterSnapshot {
    fn into_node(self) -> Chapter {
        let verses = self.verses.into_iter().map(VerseSnapshot::into_node).collect();
        Chapter::new(self.identificator, verses)
    }
}

impl VerseSnapshot {
    fn into_node(self) -> Verse {
        let words = self.words.into_iter().map(LeafRef::new).collect();
        Verse::new(self.identificator, words)
    }
}

impl Corpus {
    /// Serialize the tree to a snapshot string.
    pub fn to_snapshot_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rebuild a corpus from a snapshot string.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::SnapshotError` if the input exceeds
    /// [`MAX_SNAPSHOT_SIZE`], `CorpusError::JsonError` if it does not parse, and
    /// any construction error the tree itself triggers.
    pub fn from_snapshot_str(snapshot: &str) -> Result<Self> {
        if snapshot.len() > MAX_SNAPSHOT_SIZE {
            return Err(oversized(snapshot.len()));
        }
        let parsed: CorpusSnapshot = serde_json::from_str(snapshot)?;
        let books = parsed.books.into_iter().map(BookSnapshot::into_node).collect();
        Self::new(parsed.identificator, books)
    }

    /// Write the snapshot to `path`, replacing any existing file.
    pub fn save_snapshot<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path_ref = path.as_ref();
        let content = self.to_snapshot_string()?;
        fs::write(path_ref, &content)?;
        tracing::debug!(
            path = %path_ref.display(),
            bytes = content.len(),
            corpus = %self.identificator(),
            "Snapshot saved"
        );
        Ok(())
    }

    /// Load a snapshot file written by [`Corpus::save_snapshot`].
    ///
    /// The file size is checked before anything is read.
    pub fn from_snapshot_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        tracing::debug!(path = %path_ref.display(), "Loading corpus snapshot");

        let metadata = fs::metadata(path_ref)
            .map_err(|_| CorpusError::SnapshotError("Failed to access snapshot file".to_string()))?;
        let file_size = usize::try_from(metadata.len()).unwrap_or(usize::MAX);
        if file_size > MAX_SNAPSHOT_SIZE {
            return Err(oversized(file_size));
        }

        let content = fs::read_to_string(path_ref)
            .map_err(|_| CorpusError::SnapshotError("Failed to read snapshot file".to_string()))?;
        let corpus = Self::from_snapshot_str(&content)?;

        tracing::debug!(
            corpus = %corpus.identificator(),
            books = corpus.books().len(),
            bytes = file_size,
            "Snapshot loaded"
        );
        Ok(corpus)
    }

    /// Load the snapshot at `path` if it exists, otherwise build from raw input
    /// and persist the result there.
    ///
    /// `raw` is only called when no snapshot exists. A snapshot that exists but
    /// cannot be loaded is an error; it is not silently rebuilt.
    pub fn load_or_build<P, F>(path: P, identificator: impl Into<String>, raw: F) -> Result<Self>
    where
        P: AsRef<Path>,
        F: FnOnce() -> Result<Value>,
    {
        let path_ref = path.as_ref();
        if path_ref.exists() {
            return Self::from_snapshot_file(path_ref);
        }

        tracing::debug!(path = %path_ref.display(), "No snapshot, building from raw structure");
        let corpus = Self::from_raw(identificator, &raw()?)?;
        corpus.save_snapshot(path_ref)?;
        Ok(corpus)
    }
}

fn oversized(size: usize) -> CorpusError {
    tracing::warn!(
        size = size,
        max = MAX_SNAPSHOT_SIZE,
        "Snapshot exceeds size limit"
    );
    CorpusError::SnapshotError(format!(
        "Snapshot exceeds maximum size limit ({} bytes)",
        MAX_SNAPSHOT_SIZE
    ))
}
