//! Combination primitives for partial statistics
//!
//! Three folds shared by every container level:
//! - [`count_merge`]: sums lemma counts
//! - [`set_union`]: unions lemma sets
//! - [`mapping_merge`]: unions the leaf sets of matching lemmas
//!
//! All three are associative and commutative with the empty collection as
//! identity, so the result never depends on child order. The memoized wrappers
//! live on [`crate::memo::MemoRegistry`].

use crate::types::{LemmaSet, OccurrenceIndex, TokenCounts};
use std::borrow::Borrow;

/// Count the occurrences of each element.
pub fn count_elements<'a, I>(elements: I) -> TokenCounts
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts = TokenCounts::new();
    for element in elements {
        *counts.entry(element.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Sum corresponding counts across all inputs.
pub fn count_merge<I, C>(counts: I) -> TokenCounts
where
    I: IntoIterator<Item = C>,
    C: Borrow<TokenCounts>,
{
    counts
        .into_iter()
        .fold(TokenCounts::new(), |mut acc, partial| {
            let partial: &TokenCounts = partial.borrow();
            for (lemma, count) in partial {
                *acc.entry(lemma.clone()).or_insert(0) += count;
            }
            acc
        })
}

/// Union all input sets.
pub fn set_union<I, S>(sets: I) -> LemmaSet
where
    I: IntoIterator<Item = S>,
    S: Borrow<LemmaSet>,
{
    sets.into_iter().fold(LemmaSet::new(), |mut acc, partial| {
        let partial: &LemmaSet = partial.borrow();
        acc.extend(partial.iter().cloned());
        acc
    })
}

/// Merge lemma -> leaf-set mappings, unioning the sets of shared lemmas.
///
/// The leaf handles are cloned, not the leaves, so the merged sets point at
/// the same units as the inputs.
pub fn mapping_merge<I, M>(mappings: I) -> OccurrenceIndex
where
    I: IntoIterator<Item = M>,
    M: Borrow<OccurrenceIndex>,
{
    mappings
        .into_iter()
        .fold(OccurrenceIndex::new(), |mut acc, partial| {
            let partial: &OccurrenceIndex = partial.borrow();
            for (lemma, units) in partial {
                acc.entry(lemma.clone())
                    .or_default()
                    .extend(units.iter().cloned());
            }
            acc
        })
}
