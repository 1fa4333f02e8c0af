//! Then step definitions
//!
//! Steps that verify statistics and resolution outcomes.

use corpus_engine::{Aggregation, CorpusError, LemmaSet};
use cucumber::then;

use crate::world::CorpusWorld;

const TOLERANCE: f64 = 1e-9;

// =============================================================================
// Construction
// =============================================================================

#[then(expr = "construction fails with a cache key collision on {string}")]
fn assert_collision(world: &mut CorpusWorld, identificator: String) {
    match &world.error {
        Some(CorpusError::CacheKeyCollision(id)) => assert_eq!(*id, identificator),
        other => panic!("Expected a cache key collision, got {:?}", other),
    }
    assert!(world.corpus.is_none(), "No partial corpus may be returned");
}

#[then(expr = "the children of {string} are {string}")]
fn assert_children(world: &mut CorpusWorld, reference: String, expected: String) {
    let node = world.node(&reference);
    let expected: Vec<&str> = expected.split_whitespace().collect();
    assert_eq!(node.child_identificators(), expected);
}

#[then(expr = "the text at {string} is {string}")]
fn assert_text(world: &mut CorpusWorld, reference: String, expected: String) {
    assert_eq!(world.node(&reference).text(), expected);
}

// =============================================================================
// Counts and frequencies
// =============================================================================

#[then(expr = "the token count of {string} at {string} is {int}")]
fn assert_token_count(world: &mut CorpusWorld, lemma: String, reference: String, expected: usize) {
    let counts = world.node(&reference).token_counts(world.corpus().memo());
    assert_eq!(
        counts.get(&lemma).copied().unwrap_or(0),
        expected,
        "token counts at {}: {:?}",
        reference,
        counts
    );
}

#[then(expr = "the token counts at {string} have {int} lemmas")]
fn assert_token_count_size(world: &mut CorpusWorld, reference: String, expected: usize) {
    let counts = world.node(&reference).token_counts(world.corpus().memo());
    assert_eq!(counts.len(), expected, "token counts: {:?}", counts);
}

#[then(expr = "the term frequency of {string} at {string} is {float}")]
fn assert_term_frequency(world: &mut CorpusWorld, lemma: String, reference: String, expected: f64) {
    let tf = world.node(&reference).term_frequency(world.corpus().memo());
    let actual = tf.get(&lemma).copied().unwrap_or(0.0);
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "Expected tf({}) = {}, got {}",
        lemma,
        expected,
        actual
    );
}

#[then(expr = "the term frequencies at {string} sum to one")]
fn assert_tf_normalized(world: &mut CorpusWorld, reference: String) {
    let total: f64 = world
        .node(&reference)
        .term_frequency(world.corpus().memo())
        .values()
        .sum();
    assert!((total - 1.0).abs() < TOLERANCE, "tf sums to {}", total);
}

#[then(expr = "the inverse document frequency of {string} at {string} is {float}")]
fn assert_idf(world: &mut CorpusWorld, lemma: String, reference: String, expected: f64) {
    let idf = world
        .node(&reference)
        .inverse_document_frequency([lemma.as_str()], world.corpus().memo());
    let actual = idf
        .get(&lemma)
        .copied()
        .unwrap_or_else(|| panic!("No idf for {}: {:?}", lemma, idf));
    assert!(
        (actual - expected).abs() < TOLERANCE,
        "Expected idf({}) = {}, got {}",
        lemma,
        expected,
        actual
    );
}

#[then(expr = "{string} has no inverse document frequency at {string}")]
fn assert_no_idf(world: &mut CorpusWorld, lemma: String, reference: String) {
    let idf = world
        .node(&reference)
        .inverse_document_frequency([lemma.as_str()], world.corpus().memo());
    assert!(!idf.contains_key(&lemma), "Unexpected idf: {:?}", idf);
}

// =============================================================================
// Vocabulary and occurrence index
// =============================================================================

#[then(expr = "the unique lemmas at {string} are {string}")]
fn assert_unique_lemmas(world: &mut CorpusWorld, reference: String, expected: String) {
    let lemmas = world.node(&reference).unique_lemmas(world.corpus().memo());
    let expected: LemmaSet = expected.split_whitespace().map(str::to_string).collect();
    assert_eq!(*lemmas, expected);
}

#[then(expr = "the occurrence index of {string} at {string} holds {int} distinct words")]
fn assert_occurrence_index(
    world: &mut CorpusWorld,
    lemma: String,
    reference: String,
    expected: usize,
) {
    let index = world
        .node(&reference)
        .lemma_occurrence_index(world.corpus().memo());
    let units = index
        .get(&lemma)
        .unwrap_or_else(|| panic!("{} missing from occurrence index", lemma));
    assert_eq!(units.len(), expected);
}

#[then(expr = "the token counts at {string} were computed once")]
fn assert_computed_once(world: &mut CorpusWorld, reference: String) {
    let memo = world.corpus().memo();
    assert!(memo.contains(Aggregation::TokenCounts, &reference));
    let stats = memo.stats().get(Aggregation::TokenCounts);
    let before = stats.computations;

    let _ = world.node(&reference).token_counts(memo);
    let after = memo.stats().get(Aggregation::TokenCounts);
    assert_eq!(after.computations, before, "a cached node must not be recomputed");
    assert!(after.hits > stats.hits);
}

// =============================================================================
// Resolution
// =============================================================================

#[then(expr = "the resolved node is {string}")]
fn assert_resolved(world: &mut CorpusWorld, identificator: String) {
    assert_eq!(
        world.resolved.as_deref(),
        Some(identificator.as_str()),
        "error: {:?}",
        world.error_message()
    );
}

#[then("resolution fails with a resolution miss")]
fn assert_resolution_miss(world: &mut CorpusWorld) {
    assert!(world.resolved.is_none());
    assert!(
        matches!(world.error, Some(CorpusError::ResolutionMiss { .. })),
        "Expected a resolution miss, got {:?}",
        world.error_message()
    );
}

#[then("resolution fails with a malformed reference")]
fn assert_malformed(world: &mut CorpusWorld) {
    assert!(world.resolved.is_none());
    assert!(
        matches!(world.error, Some(CorpusError::MalformedReference { .. })),
        "Expected a malformed reference, got {:?}",
        world.error_message()
    );
}
