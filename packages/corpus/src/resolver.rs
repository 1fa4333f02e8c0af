//! Reference resolution against a built corpus
//!
//! Resolution walks down from the root one level per reference segment. At each
//! step the prefix key is the reference up to that segment, and it must be the
//! exact identificator of one of the current node's children. There is no
//! partial or case-insensitive matching.
//!
//! Two entry points:
//!
//! - [`Corpus::resolve`] is strict. The reference must have exactly
//!   [`ADDRESSABLE_DEPTH`] segments and the result is always a verse.
//! - [`Corpus::select`] accepts any prefix (`Gen`, `Gen.1`, `Gen.1.1`) and returns
//!   a [`NodeRef`] tagged with the level it stopped at.
//!
//! Words are not addressable: a segment beyond the verse level is looked up like
//! any other and misses, so an over-long reference fails with
//! `CorpusError::ResolutionMiss` instead of returning the verse.

use crate::config::ADDRESSABLE_DEPTH;
use crate::corpus::Corpus;
use crate::error::{CorpusError, Result};
use crate::memo::MemoRegistry;
use crate::node::{Book, Chapter, CollectionNode, NestedSequence, Vectorizable, Verse};
use crate::reference::Reference;
use crate::types::{LemmaSet, Level, OccurrenceIndex, TokenCounts};
use std::collections::HashMap;
use std::sync::Arc;

/// Borrowed view of an interior node at any level.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Corpus(&'a CollectionNode<Book>),
    Book(&'a Book),
    Chapter(&'a Chapter),
    Verse(&'a Verse),
}

macro_rules! dispatch {
    ($node:expr, $inner:ident => $body:expr) => {
        match $node {
            NodeRef::Corpus($inner) => $body,
            NodeRef::Book($inner) => $body,
            NodeRef::Chapter($inner) => $body,
            NodeRef::Verse($inner) => $body,
        }
    };
}

impl<'a> NodeRef<'a> {
    pub fn identificator(&self) -> &'a str {
        dispatch!(*self, node => node.identificator())
    }

    pub fn level(&self) -> Level {
        match self {
            NodeRef::Corpus(_) => Level::Corpus,
            NodeRef::Book(_) => Level::Book,
            NodeRef::Chapter(_) => Level::Chapter,
            NodeRef::Verse(_) => Level::Verse,
        }
    }

    /// Child container whose identificator is exactly `prefix`.
    ///
    /// Verses hold words, which are not addressable, so this is always `None`
    /// for a verse.
    pub fn child(&self, prefix: &str) -> Option<NodeRef<'a>> {
        match *self {
            NodeRef::Corpus(root) => root.child(prefix).map(NodeRef::Book),
            NodeRef::Book(book) => book.child(prefix).map(NodeRef::Chapter),
            NodeRef::Chapter(chapter) => chapter.child(prefix).map(NodeRef::Verse),
            NodeRef::Verse(_) => None,
        }
    }

    pub fn child_identificators(&self) -> Vec<&'a str> {
        dispatch!(*self, node => node.child_identificators())
    }

    pub fn as_book(&self) -> Option<&'a Book> {
        match *self {
            NodeRef::Book(book) => Some(book),
            _ => None,
        }
    }

    pub fn as_chapter(&self) -> Option<&'a Chapter> {
        match *self {
            NodeRef::Chapter(chapter) => Some(chapter),
            _ => None,
        }
    }

    pub fn as_verse(&self) -> Option<&'a Verse> {
        match *self {
            NodeRef::Verse(verse) => Some(verse),
            _ => None,
        }
    }

    pub fn text(&self) -> String {
        dispatch!(*self, node => node.text())
    }

    pub fn lemmas(&self) -> Vec<&'a str> {
        dispatch!(*self, node => node.lemmas().collect())
    }

    pub fn morphs(&self) -> Vec<&'a str> {
        dispatch!(*self, node => node.morphs().collect())
    }

    pub fn nested_lemmas(&self) -> NestedSequence<'a> {
        dispatch!(*self, node => node.nested_lemmas())
    }

    pub fn nested_morphs(&self) -> NestedSequence<'a> {
        dispatch!(*self, node => node.nested_morphs())
    }

    pub fn token_counts(&self, memo: &MemoRegistry) -> Arc<TokenCounts> {
        dispatch!(*self, node => node.token_counts(memo))
    }

    pub fn unique_lemmas(&self, memo: &MemoRegistry) -> Arc<LemmaSet> {
        dispatch!(*self, node => node.unique_lemmas(memo))
    }

    pub fn lemma_occurrence_index(&self, memo: &MemoRegistry) -> Arc<OccurrenceIndex> {
        dispatch!(*self, node => node.lemma_occurrence_index(memo))
    }

    pub fn term_frequency(&self, memo: &MemoRegistry) -> HashMap<String, f64> {
        dispatch!(*self, node => node.term_frequency(memo))
    }

    /// Number of immediate children containing each query term.
    pub fn document_frequency<I, S>(&self, terms: I, memo: &MemoRegistry) -> TokenCounts
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dispatch!(*self, node => node.document_frequency(terms, memo))
    }

    pub fn inverse_document_frequency<I, S>(
        &self,
        terms: I,
        memo: &MemoRegistry,
    ) -> HashMap<String, f64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        dispatch!(*self, node => node.inverse_document_frequency(terms, memo))
    }
}

impl Corpus {
    /// Resolve a full `book.chapter.verse` reference to its verse.
    ///
    /// # Errors
    ///
    /// - `CorpusError::MalformedReference` if the reference is not well formed or
    ///   has fewer than [`ADDRESSABLE_DEPTH`] segments.
    /// - `CorpusError::ResolutionMiss` if a prefix key matches no child, including
    ///   any segment past the verse level.
    pub fn resolve(&self, reference: &str) -> Result<&Verse> {
        let parsed = Reference::parse(reference)?;
        if parsed.depth() < ADDRESSABLE_DEPTH {
            return Err(CorpusError::MalformedReference {
                reference: reference.to_string(),
                reason: format!(
                    "expected {} segments, found {}",
                    ADDRESSABLE_DEPTH,
                    parsed.depth()
                ),
            });
        }

        match self.descend(&parsed)? {
            NodeRef::Verse(verse) => Ok(verse),
            other => Err(CorpusError::MalformedReference {
                reference: reference.to_string(),
                reason: format!("resolved to a {}, not a verse", other.level()),
            }),
        }
    }

    /// Resolve a reference of one to three segments to the node it names.
    ///
    /// # Errors
    ///
    /// Same as [`Corpus::resolve`], except that shorter references are allowed.
    pub fn select(&self, reference: &str) -> Result<NodeRef<'_>> {
        let parsed = Reference::parse(reference)?;
        self.descend(&parsed)
    }

    /// Descend from the root, one prefix key per segment.
    pub fn select_reference(&self, reference: &Reference) -> Result<NodeRef<'_>> {
        self.descend(reference)
    }

    fn descend(&self, reference: &Reference) -> Result<NodeRef<'_>> {
        let mut node = NodeRef::Corpus(self.root());
        for (depth, prefix) in reference.prefix_keys().into_iter().enumerate() {
            node = match node.child(&prefix) {
                Some(child) => child,
                None => {
                    tracing::debug!(
                        reference = %reference,
                        prefix = %prefix,
                        depth = depth,
                        parent = %node.identificator(),
                        "Reference not resolved"
                    );
                    return Err(CorpusError::ResolutionMiss {
                        reference: reference.to_string(),
                        prefix,
                        depth,
                    });
                }
            };
        }
        Ok(node)
    }
}
