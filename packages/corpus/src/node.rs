//! Generic container nodes and the shared statistics interface
//!
//! Every level of the hierarchy implements [`Vectorizable`]. Leaves answer from
//! their own data; a [`CollectionNode`] answers by folding its children's answers
//! through the memoized combinators on [`MemoRegistry`]. The three concrete
//! container levels are type aliases over the one generic node, so the
//! aggregation code exists once:
//!
//! ```text
//! Corpus (root) -> Book -> Chapter -> Verse -> LeafRef
//! ```
//!
//! # Caching
//!
//! `token_counts`, `unique_lemmas` and `lemma_occurrence_index` are cached under
//! the node's identificator. Term frequency is derived from the cached counts and
//! not stored. Document frequencies depend on the query terms and are not stored
//! either, though they read the children's cached lemma sets.

use crate::leaf::LeafRef;
use crate::memo::MemoRegistry;
use crate::types::{ChildKey, LemmaSet, Level, OccurrenceIndex, TokenCounts};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

/// Nested lemma or morph lists whose depth mirrors the hierarchy depth.
///
/// A verse yields `[[lemmas of word 1], [lemmas of word 2], ...]`, a chapter one
/// level more, and so on. Serializes as plain nested JSON arrays.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NestedSequence<'a> {
    Leaf(&'a [String]),
    Branch(Vec<NestedSequence<'a>>),
}

impl<'a> NestedSequence<'a> {
    /// Nesting depth: 1 for a leaf list, one more per branch level.
    pub fn depth(&self) -> usize {
        match self {
            NestedSequence::Leaf(_) => 1,
            NestedSequence::Branch(children) => {
                1 + children.iter().map(|c| c.depth()).max().unwrap_or(0)
            }
        }
    }

    /// All strings in order, without nesting.
    pub fn flatten(&self) -> Vec<&'a str> {
        match self {
            NestedSequence::Leaf(items) => items.iter().map(String::as_str).collect(),
            NestedSequence::Branch(children) => {
                children.iter().flat_map(|c| c.flatten()).collect()
            }
        }
    }
}

/// Statistics interface shared by leaves and containers.
///
/// The `memo` argument is the registry of the tree the node belongs to; leaves
/// ignore it.
pub trait Vectorizable {
    /// Level of this node type in the hierarchy.
    const LEVEL: Level;

    /// Key identifying this node among its siblings.
    fn identificator(&self) -> &str;

    /// All lemmas below this node, flattened, in child order.
    fn lemmas(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// All morphological tags below this node, flattened, in child order.
    fn morphs(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Lemmas nested to the depth of this node.
    fn nested_lemmas(&self) -> NestedSequence<'_>;

    /// Morphs nested to the depth of this node.
    fn nested_morphs(&self) -> NestedSequence<'_>;

    /// Surface text, leaf texts joined by single spaces.
    fn text(&self) -> String;

    /// Lemma -> occurrence count.
    fn token_counts(&self, memo: &MemoRegistry) -> Arc<TokenCounts>;

    /// Distinct lemmas.
    fn unique_lemmas(&self, memo: &MemoRegistry) -> Arc<LemmaSet>;

    /// Lemma -> leaf units carrying it.
    fn lemma_occurrence_index(&self, memo: &MemoRegistry) -> Arc<OccurrenceIndex>;

    /// Each lemma's share of all lemma occurrences under this node.
    ///
    /// Empty when the node has no tokens.
    fn term_frequency(&self, memo: &MemoRegistry) -> HashMap<String, f64> {
        let counts = self.token_counts(memo);
        let total: usize = counts.values().sum();
        if total == 0 {
            return HashMap::new();
        }
        counts
            .iter()
            .map(|(lemma, &count)| (lemma.clone(), count as f64 / total as f64))
            .collect()
    }
}

/// Container node over a uniform child type.
#[derive(Debug, Clone)]
pub struct CollectionNode<C> {
    identificator: String,
    key: ChildKey,
    children: Vec<C>,
    /// identificator -> position of the first child carrying it, left empty
    /// over leaves since words are not addressable
    index: HashMap<String, usize>,
}

/// Innermost container: a verse of words.
pub type Verse = CollectionNode<LeafRef>;

/// A chapter of verses.
pub type Chapter = CollectionNode<Verse>;

/// A book of chapters.
pub type Book = CollectionNode<Chapter>;

impl<C: Vectorizable> CollectionNode<C> {
    /// Create a container. Children keep the given order.
    pub fn new(identificator: impl Into<String>, children: Vec<C>) -> Self {
        let identificator = identificator.into();
        let key = ChildKey::from_identificator(&identificator);
        let mut index = HashMap::new();
        if C::LEVEL != Level::Word {
            index.reserve(children.len());
            for (position, child) in children.iter().enumerate() {
                index
                    .entry(child.identificator().to_string())
                    .or_insert(position);
            }
        }
        Self {
            identificator,
            key,
            children,
            index,
        }
    }

    pub fn identificator(&self) -> &str {
        &self.identificator
    }

    /// Key inferred from the identificator suffix.
    pub fn key(&self) -> &ChildKey {
        &self.key
    }

    pub fn children(&self) -> &[C] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Child with exactly this identificator (case-sensitive).
    ///
    /// Words are found by a linear scan, interior children through the index.
    pub fn child(&self, identificator: &str) -> Option<&C> {
        if C::LEVEL == Level::Word {
            return self
                .children
                .iter()
                .find(|child| child.identificator() == identificator);
        }
        self.index
            .get(identificator)
            .and_then(|&position| self.children.get(position))
    }

    /// Child whose identificator suffix yields `key`.
    pub fn child_by_key(&self, key: &ChildKey) -> Option<&C> {
        self.children
            .iter()
            .find(|child| ChildKey::from_identificator(child.identificator()) == *key)
    }

    /// Identificators of the immediate children, in order.
    pub fn child_identificators(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.identificator()).collect()
    }

    /// For each query term, the number of immediate children containing it.
    ///
    /// Terms found in no child are absent from the result.
    pub fn document_frequency<I, S>(&self, terms: I, memo: &MemoRegistry) -> TokenCounts
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let terms: LemmaSet = terms.into_iter().map(|t| t.as_ref().to_string()).collect();
        let mut frequencies = TokenCounts::new();
        for child in &self.children {
            let lemmas = child.unique_lemmas(memo);
            for term in terms.iter().filter(|term| lemmas.contains(*term)) {
                *frequencies.entry(term.clone()).or_insert(0) += 1;
            }
        }
        frequencies
    }

    /// `ln(children / document_frequency)` for each query term found in a child.
    ///
    /// Terms found in no child are omitted, so the division is always defined,
    /// and every value is `>= 0` because a term cannot occur in more children
    /// than exist.
    pub fn inverse_document_frequency<I, S>(
        &self,
        terms: I,
        memo: &MemoRegistry,
    ) -> HashMap<String, f64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = self.children.len() as f64;
        self.document_frequency(terms, memo)
            .into_iter()
            .map(|(term, frequency)| (term, (documents / frequency as f64).ln()))
            .collect()
    }
}

impl<C: Vectorizable> Vectorizable for CollectionNode<C> {
    const LEVEL: Level = C::LEVEL.parent();

    fn identificator(&self) -> &str {
        &self.identificator
    }

    fn lemmas(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.children.iter().flat_map(|c| c.lemmas()))
    }

    fn morphs(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.children.iter().flat_map(|c| c.morphs()))
    }

    fn nested_lemmas(&self) -> NestedSequence<'_> {
        NestedSequence::Branch(self.children.iter().map(|c| c.nested_lemmas()).collect())
    }

    fn nested_morphs(&self) -> NestedSequence<'_> {
        NestedSequence::Branch(self.children.iter().map(|c| c.nested_morphs()).collect())
    }

    fn text(&self) -> String {
        self.children
            .iter()
            .map(|c| c.text())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn token_counts(&self, memo: &MemoRegistry) -> Arc<TokenCounts> {
        memo.add_counts(
            &self.identificator,
            self.children.iter().map(|c| c.token_counts(memo)),
        )
    }

    fn unique_lemmas(&self, memo: &MemoRegistry) -> Arc<LemmaSet> {
        memo.merge_sets(
            &self.identificator,
            self.children.iter().map(|c| c.unique_lemmas(memo)),
        )
    }

    fn lemma_occurrence_index(&self, memo: &MemoRegistry) -> Arc<OccurrenceIndex> {
        memo.combine_mappings(
            &self.identificator,
            self.children.iter().map(|c| c.lemma_occurrence_index(memo)),
        )
    }
}
