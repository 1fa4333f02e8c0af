//! When step definitions
//!
//! Steps that query the corpus.

use cucumber::when;

use crate::world::CorpusWorld;

// =============================================================================
// Resolution
// =============================================================================

#[when(expr = "I resolve {string}")]
fn resolve_reference(world: &mut CorpusWorld, reference: String) {
    let outcome = world
        .corpus()
        .resolve(&reference)
        .map(|verse| verse.identificator().to_string());
    match outcome {
        Ok(identificator) => {
            world.resolved = Some(identificator);
            world.error = None;
        }
        Err(e) => {
            world.resolved = None;
            world.error = Some(e);
        }
    }
}

// =============================================================================
// Aggregation
// =============================================================================

#[when(expr = "I request the token counts at {string} {int} times")]
fn request_token_counts(world: &mut CorpusWorld, reference: String, times: usize) {
    let corpus = world.corpus();
    let node = world.node(&reference);
    for _ in 0..times {
        let _ = node.token_counts(corpus.memo());
    }
}
