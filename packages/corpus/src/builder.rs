//! Bulk construction from the raw nested structure
//!
//! The raw structure is a JSON object produced by the markup extractor:
//!
//! ```json
//! {
//!   "Gen": {
//!     "Gen.1": {
//!       "Gen.1.1": [
//!         {"text": "In", "lemma": "H9002 H7225", "morph": "HR HNcfsa"},
//!         {"text": "beginning", "lemma": "H7225"}
//!       ]
//!     }
//!   }
//! }
//! ```
//!
//! Lemma and morph attributes are split on whitespace. Children keep the order
//! of the raw object at every level, since verse text is rebuilt from it. A
//! level with the wrong JSON shape aborts the whole build.

use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::leaf::{LeafRef, LeafUnit};
use crate::node::{Book, Chapter, Verse};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One tagged word as handed over by the markup extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLeaf {
    /// Surface text
    pub text: String,
    /// Space-separated lemmas
    #[serde(default)]
    pub lemma: Option<String>,
    /// Space-separated morphological tags
    #[serde(default)]
    pub morph: Option<String>,
}

impl RawLeaf {
    pub fn into_leaf(self) -> LeafUnit {
        LeafUnit::from_attributes(self.text, self.lemma.as_deref(), self.morph.as_deref())
    }
}

impl Corpus {
    /// Build and validate a corpus from the raw nested structure.
    ///
    /// # Errors
    ///
    /// - `CorpusError::HeterogeneousChildren` if a level is not the expected
    ///   object or array.
    /// - `CorpusError::InvalidLeaf` if a word entry cannot be read.
    /// - `CorpusError::CacheKeyCollision` if identificators repeat.
    pub fn from_raw(identificator: impl Into<String>, raw: &Value) -> Result<Self> {
        let identificator = identificator.into();
        let books = expect_object(&identificator, raw, "object of books")?
            .iter()
            .map(|(book_id, chapters)| build_book(book_id, chapters))
            .collect::<Result<Vec<_>>>()?;
        Self::new(identificator, books)
    }

    /// Parse a raw JSON string and build from it.
    pub fn from_raw_str(identificator: impl Into<String>, raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_raw(identificator, &value)
    }
}

fn build_book(identificator: &str, raw: &Value) -> Result<Book> {
    let chapters = expect_object(identificator, raw, "object of chapters")?
        .iter()
        .map(|(chapter_id, verses)| build_chapter(chapter_id, verses))
        .collect::<Result<Vec<_>>>()?;
    Ok(Book::new(identificator, chapters))
}

fn build_chapter(identificator: &str, raw: &Value) -> Result<Chapter> {
    let verses = expect_object(identificator, raw, "object of verses")?
        .iter()
        .map(|(verse_id, words)| build_verse(verse_id, words))
        .collect::<Result<Vec<_>>>()?;
    Ok(Chapter::new(identificator, verses))
}

fn build_verse(identificator: &str, raw: &Value) -> Result<Verse> {
    let entries = raw
        .as_array()
        .ok_or_else(|| heterogeneous(identificator, "array of words", raw))?;

    let mut words = Vec::with_capacity(entries.len());
    for (position, entry) in entries.iter().enumerate() {
        if is_blank(entry) {
            continue;
        }
        let leaf = RawLeaf::deserialize(entry).map_err(|e| CorpusError::InvalidLeaf {
            container: identificator.to_string(),
            reason: format!("entry {}: {}", position, e),
        })?;
        words.push(LeafRef::new(leaf.into_leaf()));
    }

    if words.len() < entries.len() {
        tracing::trace!(
            verse = %identificator,
            skipped = entries.len() - words.len(),
            "Skipped empty word entries"
        );
    }
    Ok(Verse::new(identificator, words))
}

fn expect_object<'v>(
    identificator: &str,
    raw: &'v Value,
    expected: &str,
) -> Result<&'v Map<String, Value>> {
    raw.as_object()
        .ok_or_else(|| heterogeneous(identificator, expected, raw))
}

fn heterogeneous(identificator: &str, expected: &str, found: &Value) -> CorpusError {
    CorpusError::HeterogeneousChildren {
        identificator: identificator.to_string(),
        expected: expected.to_string(),
        found: kind(found).to_string(),
    }
}

fn is_blank(entry: &Value) -> bool {
    match entry {
        Value::Null => true,
        Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
