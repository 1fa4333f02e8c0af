//! Corpus root: the tree plus its memoization registry
//!
//! A [`Corpus`] is built once, validated, and read-only afterwards. It owns the
//! [`MemoRegistry`] that caches every container aggregation in the tree, so the
//! cache lives exactly as long as the tree and never leaks into another one.
//!
//! # Validation
//!
//! Construction fails fast, returning no partial tree, when two containers
//! anywhere in the tree share an identificator: they would share memo entries
//! and silently corrupt each other's statistics. Identificators the resolver
//! cannot reach (not `parent.segment`) are allowed but logged.
//!
//! # Example
//!
//! ```ignore
//! use corpus_engine::{Corpus, Vectorizable};
//!
//! let corpus = Corpus::from_raw_str("BibleKJV", raw_json)?;
//! let verse = corpus.resolve("Gen.1.1")?;
//! let tf = verse.term_frequency(corpus.memo());
//! ```

use crate::config::SEGMENT_SEPARATOR;
use crate::error::{CorpusError, Result};
use crate::memo::MemoRegistry;
use crate::node::{Book, CollectionNode, Vectorizable};
use crate::types::{LemmaSet, OccurrenceIndex, TokenCounts};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Node counts per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CorpusSummary {
    pub books: usize,
    pub chapters: usize,
    pub verses: usize,
    pub words: usize,
}

/// A validated hierarchy with its own memoization registry.
#[derive(Debug)]
pub struct Corpus {
    root: CollectionNode<Book>,
    memo: MemoRegistry,
}

impl Corpus {
    /// Validate `books` and wrap them under a root named `identificator`.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::CacheKeyCollision` if any two containers (root
    /// included) share an identificator.
    pub fn new(identificator: impl Into<String>, books: Vec<Book>) -> Result<Self> {
        let root = CollectionNode::new(identificator, books);
        validate_identificators(&root)?;

        let corpus = Self {
            root,
            memo: MemoRegistry::new(),
        };
        let summary = corpus.summary();
        tracing::debug!(
            corpus = %corpus.identificator(),
            books = summary.books,
            chapters = summary.chapters,
            verses = summary.verses,
            words = summary.words,
            "Corpus built"
        );
        Ok(corpus)
    }

    pub fn identificator(&self) -> &str {
        self.root.identificator()
    }

    /// The root container.
    pub fn root(&self) -> &CollectionNode<Book> {
        &self.root
    }

    /// Registry caching this tree's aggregations.
    pub fn memo(&self) -> &MemoRegistry {
        &self.memo
    }

    pub fn books(&self) -> &[Book] {
        self.root.children()
    }

    /// Book with exactly this identificator.
    pub fn book(&self, identificator: &str) -> Option<&Book> {
        self.root.child(identificator)
    }

    pub fn summary(&self) -> CorpusSummary {
        let mut summary = CorpusSummary {
            books: self.root.len(),
            ..CorpusSummary::default()
        };
        for book in self.root.children() {
            summary.chapters += book.len();
            for chapter in book.children() {
                summary.verses += chapter.len();
                summary.words += chapter.children().iter().map(|v| v.len()).sum::<usize>();
            }
        }
        summary
    }

    /// Lemma counts of the whole corpus.
    pub fn token_counts(&self) -> Arc<TokenCounts> {
        self.root.token_counts(&self.memo)
    }

    /// Distinct lemmas of the whole corpus.
    pub fn unique_lemmas(&self) -> Arc<LemmaSet> {
        self.root.unique_lemmas(&self.memo)
    }

    /// Lemma -> leaf units over the whole corpus.
    pub fn lemma_occurrence_index(&self) -> Arc<OccurrenceIndex> {
        self.root.lemma_occurrence_index(&self.memo)
    }

    /// Term frequency over the whole corpus.
    pub fn term_frequency(&self) -> HashMap<String, f64> {
        self.root.term_frequency(&self.memo)
    }

    /// Number of books containing each term.
    pub fn document_frequency<I, S>(&self, terms: I) -> TokenCounts
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.root.document_frequency(terms, &self.memo)
    }

    /// Inverse document frequency with books as documents.
    pub fn inverse_document_frequency<I, S>(&self, terms: I) -> HashMap<String, f64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.root.inverse_document_frequency(terms, &self.memo)
    }

    /// Full text of the corpus.
    pub fn text(&self) -> String {
        self.root.text()
    }
}

/// Reject shared container identificators, warn about unreachable ones.
fn validate_identificators(root: &CollectionNode<Book>) -> Result<()> {
    let mut seen: HashSet<&str> = HashSet::new();

    claim(&mut seen, root.identificator())?;
    for book in root.children() {
        claim(&mut seen, book.identificator())?;
        if book.identificator().contains(SEGMENT_SEPARATOR) {
            warn_unaddressable(book.identificator(), "");
        }
        for chapter in book.children() {
            claim(&mut seen, chapter.identificator())?;
            if !extends(book.identificator(), chapter.identificator()) {
                warn_unaddressable(chapter.identificator(), book.identificator());
            }
            for verse in chapter.children() {
                claim(&mut seen, verse.identificator())?;
                if !extends(chapter.identificator(), verse.identificator()) {
                    warn_unaddressable(verse.identificator(), chapter.identificator());
                }
            }
        }
    }
    Ok(())
}

fn claim<'a>(seen: &mut HashSet<&'a str>, identificator: &'a str) -> Result<()> {
    if !seen.insert(identificator) {
        tracing::warn!(identificator = %identificator, "Duplicate container identificator");
        return Err(CorpusError::CacheKeyCollision(identificator.to_string()));
    }
    Ok(())
}

/// Check that `child` is `parent` plus exactly one non-empty segment.
fn extends(parent: &str, child: &str) -> bool {
    child
        .strip_prefix(parent)
        .and_then(|rest| rest.strip_prefix(SEGMENT_SEPARATOR))
        .is_some_and(|segment| !segment.is_empty() && !segment.contains(SEGMENT_SEPARATOR))
}

fn warn_unaddressable(identificator: &str, parent: &str) {
    tracing::warn!(
        identificator = %identificator,
        parent = %parent,
        "Identificator is not reachable by dotted reference"
    );
}
