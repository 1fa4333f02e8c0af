//! Dotted reference parsing
//!
//! A reference addresses a node by its dotted identificator, e.g. `Gen.1.1`.
//! Each segment, joined with every segment to its left, reconstructs the
//! identificator expected at that depth:
//!
//! | depth | prefix key | node      |
//! |-------|------------|-----------|
//! | 0     | `Gen`      | book      |
//! | 1     | `Gen.1`    | chapter   |
//! | 2     | `Gen.1.1`  | verse     |
//!
//! # Examples
//!
//! ```
//! use corpus_engine::reference::Reference;
//!
//! let reference = Reference::parse("Gen.1.1").unwrap();
//! assert_eq!(reference.depth(), 3);
//! assert_eq!(reference.prefix_keys(), vec!["Gen", "Gen.1", "Gen.1.1"]);
//!
//! let built = Reference::from_segments(["Gen", "1", "1"]).unwrap();
//! assert_eq!(built, reference);
//! ```

use crate::config::{MAX_REFERENCE_LENGTH, SEGMENT_SEPARATOR};
use crate::error::{CorpusError, Result};
use std::fmt;

/// Parsed dotted reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    /// Original reference string
    reference: String,
    /// Segments in order, none empty
    segments: Vec<String>,
}

impl Reference {
    /// Parse a reference string into segments.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::MalformedReference` if the reference is empty,
    /// longer than [`MAX_REFERENCE_LENGTH`], or contains an empty segment
    /// (`Gen..1`, `.Gen`, `Gen.`).
    pub fn parse(reference: &str) -> Result<Self> {
        if reference.is_empty() {
            return Err(malformed(reference, "reference cannot be empty"));
        }
        if reference.len() > MAX_REFERENCE_LENGTH {
            return Err(malformed(
                reference,
                &format!("longer than {} bytes", MAX_REFERENCE_LENGTH),
            ));
        }

        let segments: Vec<String> = reference
            .split(SEGMENT_SEPARATOR)
            .map(str::to_string)
            .collect();
        if let Some(position) = segments.iter().position(String::is_empty) {
            return Err(malformed(
                reference,
                &format!("segment {} is empty", position),
            ));
        }

        Ok(Self {
            reference: reference.to_string(),
            segments,
        })
    }

    /// Build a reference from individual segments.
    ///
    /// # Errors
    ///
    /// Returns `CorpusError::MalformedReference` if there are no segments, a
    /// segment is empty, or a segment contains the separator itself.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let segments: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().to_string())
            .collect();
        let joined = segments.join(&SEGMENT_SEPARATOR.to_string());

        if let Some(segment) = segments.iter().find(|s| s.contains(SEGMENT_SEPARATOR)) {
            return Err(malformed(
                &joined,
                &format!("segment '{}' contains '{}'", segment, SEGMENT_SEPARATOR),
            ));
        }
        Self::parse(&joined)
    }

    /// Get the original reference string
    pub fn as_str(&self) -> &str {
        &self.reference
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Prefix key for depth index `index`: the segments up to and including it.
    ///
    /// With `L` segments this is the window `s[L - L ..= index]` anchored at the
    /// start, growing by one segment per step. Returns `None` past the last
    /// segment.
    pub fn prefix_key(&self, index: usize) -> Option<String> {
        if index >= self.segments.len() {
            return None;
        }
        Some(self.segments[..=index].join(&SEGMENT_SEPARATOR.to_string()))
    }

    /// All prefix keys in descent order.
    pub fn prefix_keys(&self) -> Vec<String> {
        (0..self.segments.len())
            .filter_map(|index| self.prefix_key(index))
            .collect()
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.reference)
    }
}

impl std::str::FromStr for Reference {
    type Err = CorpusError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn malformed(reference: &str, reason: &str) -> CorpusError {
    CorpusError::MalformedReference {
        reference: reference.to_string(),
        reason: reason.to_string(),
    }
}
