//! Configuration constants for the corpus engine
//!
//! Centralized values used throughout the engine for:
//! - Reference syntax (segment separator, addressable depth)
//! - Resource limits on snapshots and references
//!
//! These are compile-time constants. Changing the separator or depth changes
//! which identificators the resolver can reach, so a tree built with one setting
//! must be queried with the same setting.

/// Separator between segments of a dotted reference (e.g. `Gen.1.1`).
pub const SEGMENT_SEPARATOR: char = '.';

/// Number of reference segments needed to address the innermost container.
///
/// The hierarchy is root -> book -> chapter -> verse -> word. The root is implicit
/// and words are not addressable, so a full reference has three segments.
pub const ADDRESSABLE_DEPTH: usize = 3;

/// Maximum length of a reference string in bytes.
///
/// Real references are short (`1Chr.29.30`); anything longer is rejected before
/// it is split.
pub const MAX_REFERENCE_LENGTH: usize = 256;

/// Maximum snapshot size in bytes (256 MB).
///
/// A fully tagged Bible serializes to roughly 40-60 MB of JSON.
pub const MAX_SNAPSHOT_SIZE: usize = 256 * 1024 * 1024;

/// Identificator given to the root when the caller does not supply one.
pub const DEFAULT_CORPUS_IDENTIFICATOR: &str = "BibleKJV";
