//! World struct for Cucumber BDD tests
//!
//! Contains the test state that persists across steps in a scenario.

use corpus_engine::{Corpus, CorpusError, NodeRef};
use cucumber::World;
use serde_json::{json, Map, Value};
use std::fmt;

/// One word row from a Gherkin table.
#[derive(Debug, Clone)]
pub struct WordRow {
    pub verse: String,
    pub text: String,
    pub lemma: String,
}

/// Test world that holds state across steps in a Cucumber scenario.
#[derive(World)]
#[world(init = Self::new)]
pub struct CorpusWorld {
    /// Words collected from the Given table
    pub rows: Vec<WordRow>,
    /// Corpus built from the rows (if construction succeeded)
    pub corpus: Option<Corpus>,
    /// Identificator of the last resolved node
    pub resolved: Option<String>,
    /// Last error (construction or resolution)
    pub error: Option<CorpusError>,
}

impl fmt::Debug for CorpusWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CorpusWorld")
            .field("rows", &self.rows)
            .field("resolved", &self.resolved)
            .field("error", &self.error.as_ref().map(|e| e.to_string()))
            .field(
                "corpus",
                &self.corpus.as_ref().map(|c| format!("<{:?}>", c.summary())),
            )
            .finish()
    }
}

impl Default for CorpusWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusWorld {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            corpus: None,
            resolved: None,
            error: None,
        }
    }

    /// Build the corpus from the collected rows, keeping the error on failure.
    ///
    /// Book and chapter identificators are the first one and two segments of
    /// each verse identificator.
    pub fn build(&mut self, identificator: &str) {
        let raw = raw_structure(&self.rows);
        match Corpus::from_raw(identificator, &raw) {
            Ok(corpus) => {
                self.corpus = Some(corpus);
                self.error = None;
            }
            Err(e) => {
                self.corpus = None;
                self.error = Some(e);
            }
        }
    }

    pub fn corpus(&self) -> &Corpus {
        self.corpus.as_ref().unwrap_or_else(|| {
            panic!("Corpus was not built: {:?}", self.error.as_ref().map(|e| e.to_string()))
        })
    }

    /// Node addressed by a one to three segment reference.
    pub fn node(&self, reference: &str) -> NodeRef<'_> {
        self.corpus()
            .select(reference)
            .unwrap_or_else(|e| panic!("Could not select '{}': {}", reference, e))
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| e.to_string())
    }
}

fn raw_structure(rows: &[WordRow]) -> Value {
    let mut books = Map::new();
    for row in rows {
        let segments: Vec<&str> = row.verse.split('.').collect();
        let book_id = segments[0].to_string();
        let chapter_id = segments[..2.min(segments.len())].join(".");

        let chapters = books
            .entry(book_id)
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .expect("book is an object");
        let verses = chapters
            .entry(chapter_id)
            .or_insert_with(|| json!({}))
            .as_object_mut()
            .expect("chapter is an object");
        let words = verses
            .entry(row.verse.clone())
            .or_insert_with(|| json!([]))
            .as_array_mut()
            .expect("verse is an array");
        words.push(json!({"text": row.text, "lemma": row.lemma}));
    }
    Value::Object(books)
}
