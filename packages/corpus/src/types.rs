//! Core types shared by the aggregation engine

use crate::config::SEGMENT_SEPARATOR;
use crate::leaf::LeafRef;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Lemma -> number of occurrences
pub type TokenCounts = HashMap<String, usize>;

/// Set of distinct lemma strings
pub type LemmaSet = HashSet<String>;

/// Lemma -> the leaf units that carry it
pub type OccurrenceIndex = HashMap<String, HashSet<LeafRef>>;

/// The memoized aggregation operations.
///
/// Each operation has its own slot table in the registry, so the same
/// identificator can be cached once per operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Aggregation {
    /// Count-merge of lemma counts
    TokenCounts,
    /// Set-union of distinct lemmas
    UniqueLemmas,
    /// Mapping-merge of lemma -> leaf sets
    OccurrenceIndex,
}

impl Aggregation {
    /// All operations, in registry order.
    pub const ALL: [Aggregation; 3] = [
        Aggregation::TokenCounts,
        Aggregation::UniqueLemmas,
        Aggregation::OccurrenceIndex,
    ];

    /// Stable name used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregation::TokenCounts => "token_counts",
            Aggregation::UniqueLemmas => "unique_lemmas",
            Aggregation::OccurrenceIndex => "lemma_occurrence_index",
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lookup key of an interior node among its siblings.
///
/// Inferred from the last segment of the node's identificator: `Gen.1.10`
/// yields `Number(10)`, `Gen` yields `Name("Gen")`. Keys compare numbers before
/// names and numerically among themselves, but children are never reordered by
/// them; containers keep their input order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildKey {
    Number(u64),
    Name(String),
}

impl ChildKey {
    /// Infer the key from a full identificator.
    pub fn from_identificator(identificator: &str) -> Self {
        let suffix = identificator
            .rsplit(SEGMENT_SEPARATOR)
            .next()
            .unwrap_or(identificator);
        match suffix.parse::<u64>() {
            Ok(n) => ChildKey::Number(n),
            Err(_) => ChildKey::Name(suffix.to_string()),
        }
    }
}

impl fmt::Display for ChildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildKey::Number(n) => write!(f, "{}", n),
            ChildKey::Name(s) => f.write_str(s),
        }
    }
}

impl From<u64> for ChildKey {
    fn from(n: u64) -> Self {
        ChildKey::Number(n)
    }
}

impl From<&str> for ChildKey {
    fn from(s: &str) -> Self {
        match s.parse::<u64>() {
            Ok(n) => ChildKey::Number(n),
            Err(_) => ChildKey::Name(s.to_string()),
        }
    }
}

/// Hierarchy level of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    Corpus,
    Book,
    Chapter,
    Verse,
    Word,
}

impl Level {
    /// Distance from the root (root = 0, word = 4).
    pub fn depth(&self) -> usize {
        match self {
            Level::Corpus => 0,
            Level::Book => 1,
            Level::Chapter => 2,
            Level::Verse => 3,
            Level::Word => 4,
        }
    }

    /// Level directly above this one; the root is its own parent.
    pub const fn parent(self) -> Level {
        match self {
            Level::Word => Level::Verse,
            Level::Verse => Level::Chapter,
            Level::Chapter => Level::Book,
            Level::Book | Level::Corpus => Level::Corpus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Corpus => "corpus",
            Level::Book => "book",
            Level::Chapter => "chapter",
            Level::Verse => "verse",
            Level::Word => "word",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
