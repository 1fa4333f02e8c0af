//! Corpus Engine
//!
//! Lexical statistics over a tagged text corpus modelled as a fixed-depth
//! hierarchy (corpus, book, chapter, verse, word). This library provides:
//! - Bulk construction from the raw nested structure and persisted snapshots
//! - Per-node token counts, vocabulary sets, tf / idf and lemma occurrence indexes,
//!   memoized per tree
//! - Resolution of dotted references such as `Gen.1.1` to nodes
//!
//! # Example
//!
//! ```ignore
//! use corpus_engine::{Corpus, Vectorizable};
//!
//! let corpus = Corpus::load_or_build("kjv.snapshot.json", "BibleKJV", || {
//!     Ok(serde_json::from_str(&std::fs::read_to_string("kjv.raw.json")?)?)
//! })?;
//!
//! let chapter = corpus.select("Gen.1")?;
//! let idf = chapter.inverse_document_frequency(["H430"], corpus.memo());
//!
//! let verse = corpus.resolve("Gen.1.1")?;
//! let tf = verse.term_frequency(corpus.memo());
//! ```

pub mod aggregate;
pub mod builder;
pub mod config;
pub mod corpus;
pub mod error;
pub mod leaf;
pub mod memo;
pub mod node;
pub mod reference;
pub mod resolver;
pub mod snapshot;
pub mod types;

// Re-export commonly used items
pub use aggregate::{count_merge, mapping_merge, set_union};
pub use builder::RawLeaf;
pub use corpus::{Corpus, CorpusSummary};
pub use error::{CorpusError, Result};
pub use leaf::{LeafRef, LeafUnit};
pub use memo::{Memo, MemoRegistry, MemoStats, OperationStats};
pub use node::{Book, Chapter, CollectionNode, NestedSequence, Vectorizable, Verse};
pub use reference::Reference;
pub use resolver::NodeRef;
pub use snapshot::SnapshotField;
pub use types::{Aggregation, ChildKey, LemmaSet, Level, OccurrenceIndex, TokenCounts};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
