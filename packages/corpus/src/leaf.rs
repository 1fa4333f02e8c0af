//! Leaf units: single tagged words
//!
//! A [`LeafUnit`] is the smallest vectorizable entity. It owns its lemma and
//! morph sequences and computes its statistics directly; nothing at this level
//! is memoized.
//!
//! Leaves are shared through [`LeafRef`], which compares by identity rather than
//! by content. Two occurrences of "the" in different verses are different units,
//! and occurrence indexes must keep them apart.

use crate::aggregate::count_elements;
use crate::memo::MemoRegistry;
use crate::node::{NestedSequence, Vectorizable};
use crate::types::{Level, LemmaSet, OccurrenceIndex, TokenCounts};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::Arc;

/// A tagged word: surface text plus lemma and morphological tag lists.
///
/// A leaf may carry more than one lemma (compound forms), so its counts are
/// per lemma occurrence rather than a single 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeafUnit {
    /// Surface text of the token
    identificator: String,
    /// Lemmas in source order
    #[serde(default)]
    lemmas: Vec<String>,
    /// Morphological tags in source order
    #[serde(default)]
    morphs: Vec<String>,
}

impl LeafUnit {
    /// Create a leaf from already split lemma and morph lists.
    pub fn new(identificator: impl Into<String>, lemmas: Vec<String>, morphs: Vec<String>) -> Self {
        Self {
            identificator: identificator.into(),
            lemmas,
            morphs,
        }
    }

    /// Create a leaf from whitespace-separated attribute strings.
    ///
    /// `None` or blank attributes produce empty sequences.
    pub fn from_attributes(
        identificator: impl Into<String>,
        lemma: Option<&str>,
        morph: Option<&str>,
    ) -> Self {
        Self::new(identificator, split_attribute(lemma), split_attribute(morph))
    }

    /// Surface text of the token.
    pub fn identificator(&self) -> &str {
        &self.identificator
    }

    pub fn lemmas(&self) -> &[String] {
        &self.lemmas
    }

    pub fn morphs(&self) -> &[String] {
        &self.morphs
    }

    /// Lemma -> occurrences within this unit.
    pub fn token_counts(&self) -> TokenCounts {
        count_elements(self.lemmas.iter().map(String::as_str))
    }

    /// Distinct lemmas of this unit.
    pub fn unique_lemmas(&self) -> LemmaSet {
        self.lemmas.iter().cloned().collect()
    }
}

/// Split a space-separated attribute value into its parts.
fn split_attribute(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| v.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Shared handle to a leaf unit with identity semantics.
///
/// Equality and hashing use the allocation address, so cloning a `LeafRef`
/// yields an equal handle while two separately built leaves with the same
/// content stay distinct.
#[derive(Clone)]
pub struct LeafRef(Arc<LeafUnit>);

impl LeafRef {
    pub fn new(leaf: LeafUnit) -> Self {
        Self(Arc::new(leaf))
    }

    /// Check whether two handles point at the same unit.
    pub fn ptr_eq(&self, other: &LeafRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for LeafRef {
    type Target = LeafUnit;

    fn deref(&self) -> &LeafUnit {
        &self.0
    }
}

impl From<LeafUnit> for LeafRef {
    fn from(leaf: LeafUnit) -> Self {
        Self::new(leaf)
    }
}

impl PartialEq for LeafRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for LeafRef {}

impl Hash for LeafRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(Arc::as_ptr(&self.0), state);
    }
}

impl fmt::Debug for LeafRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LeafRef").field(&self.0.identificator).finish()
    }
}

impl Serialize for LeafRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Vectorizable for LeafRef {
    const LEVEL: Level = Level::Word;

    fn identificator(&self) -> &str {
        &self.0.identificator
    }

    fn lemmas(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.0.lemmas.iter().map(String::as_str))
    }

    fn morphs(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.0.morphs.iter().map(String::as_str))
    }

    fn nested_lemmas(&self) -> NestedSequence<'_> {
        NestedSequence::Leaf(&self.0.lemmas)
    }

    fn nested_morphs(&self) -> NestedSequence<'_> {
        NestedSequence::Leaf(&self.0.morphs)
    }

    fn text(&self) -> String {
        self.0.identificator.clone()
    }

    fn token_counts(&self, _memo: &MemoRegistry) -> Arc<TokenCounts> {
        Arc::new(self.0.token_counts())
    }

    fn unique_lemmas(&self, _memo: &MemoRegistry) -> Arc<LemmaSet> {
        Arc::new(self.0.unique_lemmas())
    }

    fn lemma_occurrence_index(&self, _memo: &MemoRegistry) -> Arc<OccurrenceIndex> {
        let index = self
            .0
            .lemmas
            .iter()
            .map(|lemma| (lemma.clone(), HashSet::from([self.clone()])))
            .collect();
        Arc::new(index)
    }
}
