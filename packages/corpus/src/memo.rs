//! Memoization registry for container statistics
//!
//! Every container aggregation is cached under `(operation, identificator)`.
//! The contract is compute-once-per-key: the first call for a key folds the
//! children and stores the result, every later call returns the stored value
//! without touching the inputs again, even if they would now fold differently.
//! This holds because trees are immutable after construction and identificators
//! are unique per tree (checked when the tree is built).
//!
//! # Concurrency
//!
//! Each key owns a `OnceLock` slot. The slot table lock is held only to find or
//! create the slot, never while folding, so nested computations for child keys
//! do not contend with it, and concurrent first calls on one key compute once.
//!
//! A fold that asks for its own key again (a container and a descendant sharing
//! an identificator, possible when a tree is assembled without
//! [`crate::corpus::Corpus`] validation) would wait on its own slot forever.
//! The memo tracks which thread is filling each slot and answers such a nested
//! request with an uncached fold and a warning instead.
//!
//! # Scope
//!
//! A registry belongs to one tree (see [`crate::corpus::Corpus`]). There is no
//! process-wide cache, so two trees that reuse identificators never share
//! results.

use crate::aggregate::{count_merge, mapping_merge, set_union};
use crate::types::{Aggregation, LemmaSet, OccurrenceIndex, TokenCounts};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use std::thread::{self, ThreadId};

type Slot<V> = Arc<OnceLock<Arc<V>>>;

/// key -> thread currently running the fold for it
type InFlight = Mutex<HashMap<String, ThreadId>>;

/// Marks a key as being filled by the current thread until dropped.
struct FillGuard<'a> {
    in_flight: &'a InFlight,
    key: &'a str,
}

impl<'a> FillGuard<'a> {
    fn enter(in_flight: &'a InFlight, key: &'a str) -> Self {
        lock_in_flight(in_flight).insert(key.to_string(), thread::current().id());
        Self { in_flight, key }
    }
}

impl Drop for FillGuard<'_> {
    fn drop(&mut self) {
        lock_in_flight(self.in_flight).remove(self.key);
    }
}

fn lock_in_flight(in_flight: &InFlight) -> MutexGuard<'_, HashMap<String, ThreadId>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Compute-once cache for one aggregation operation.
#[derive(Debug)]
pub struct Memo<V> {
    operation: Aggregation,
    slots: Mutex<HashMap<String, Slot<V>>>,
    in_flight: InFlight,
    computations: AtomicUsize,
    hits: AtomicUsize,
}

impl<V> Memo<V> {
    pub fn new(operation: Aggregation) -> Self {
        Self {
            operation,
            slots: Mutex::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
            computations: AtomicUsize::new(0),
            hits: AtomicUsize::new(0),
        }
    }

    /// The operation this memo caches.
    pub fn operation(&self) -> Aggregation {
        self.operation
    }

    // A panic inside a fold cannot leave the table half-written: slots are
    // inserted whole, and a panicking `get_or_init` leaves its slot empty.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Slot<V>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self, key: &str) -> Slot<V> {
        let mut slots = self.lock();
        if let Some(slot) = slots.get(key) {
            return Arc::clone(slot);
        }
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// Return the cached value for `key`, computing it first if absent.
    ///
    /// `compute` runs at most once per key for the lifetime of the entry. A
    /// call made from inside the fold for the same key gets a fresh, uncached
    /// result instead of waiting on itself.
    pub fn get_or_compute<F>(&self, key: &str, compute: F) -> Arc<V>
    where
        F: FnOnce() -> V,
    {
        let slot = self.slot(key);
        if slot.get().is_none() && self.filled_by_current_thread(key) {
            tracing::warn!(
                operation = %self.operation,
                key = %key,
                "re-entrant memo request, identificator repeats inside its own subtree"
            );
            self.computations.fetch_add(1, Ordering::Relaxed);
            return Arc::new(compute());
        }

        let mut computed = false;
        let value = slot.get_or_init(|| {
            computed = true;
            let _guard = FillGuard::enter(&self.in_flight, key);
            Arc::new(compute())
        });

        if computed {
            self.computations.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(operation = %self.operation, key = %key, "memo computed");
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(operation = %self.operation, key = %key, "memo hit");
        }

        Arc::clone(value)
    }

    fn filled_by_current_thread(&self, key: &str) -> bool {
        lock_in_flight(&self.in_flight)
            .get(key)
            .is_some_and(|owner| *owner == thread::current().id())
    }

    /// Cached value for `key`, if it has been computed.
    pub fn get(&self, key: &str) -> Option<Arc<V>> {
        self.lock().get(key).and_then(|slot| slot.get().cloned())
    }

    /// Check whether `key` holds a computed value.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Drop the entry for `key`. Returns whether an entry existed.
    pub fn invalidate(&self, key: &str) -> bool {
        let removed = self.lock().remove(key).is_some();
        if removed {
            tracing::debug!(operation = %self.operation, key = %key, "memo entry invalidated");
        }
        removed
    }

    /// Drop all entries. Counters are kept.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of computed entries.
    pub fn len(&self) -> usize {
        self.lock().values().filter(|slot| slot.get().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times a value was computed.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }

    /// Number of times a cached value was returned.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }
}

/// Counters for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperationStats {
    pub entries: usize,
    pub computations: usize,
    pub hits: usize,
}

/// Snapshot of registry counters, per operation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MemoStats {
    pub token_counts: OperationStats,
    pub unique_lemmas: OperationStats,
    pub occurrence_index: OperationStats,
}

impl MemoStats {
    pub fn get(&self, operation: Aggregation) -> OperationStats {
        match operation {
            Aggregation::TokenCounts => self.token_counts,
            Aggregation::UniqueLemmas => self.unique_lemmas,
            Aggregation::OccurrenceIndex => self.occurrence_index,
        }
    }

    pub fn total_entries(&self) -> usize {
        self.token_counts.entries + self.unique_lemmas.entries + self.occurrence_index.entries
    }

    pub fn total_computations(&self) -> usize {
        self.token_counts.computations
            + self.unique_lemmas.computations
            + self.occurrence_index.computations
    }
}

/// Per-tree cache of container aggregations.
#[derive(Debug)]
pub struct MemoRegistry {
    token_counts: Memo<TokenCounts>,
    unique_lemmas: Memo<LemmaSet>,
    occurrence_index: Memo<OccurrenceIndex>,
}

impl Default for MemoRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            token_counts: Memo::new(Aggregation::TokenCounts),
            unique_lemmas: Memo::new(Aggregation::UniqueLemmas),
            occurrence_index: Memo::new(Aggregation::OccurrenceIndex),
        }
    }

    /// Count-merge `counts` under `key`, or return the cached merge.
    ///
    /// `counts` is only consumed on a miss, so passing a lazy iterator over
    /// children skips their traversal entirely on a hit.
    pub fn add_counts<I, C>(&self, key: &str, counts: I) -> Arc<TokenCounts>
    where
        I: IntoIterator<Item = C>,
        C: Borrow<TokenCounts>,
    {
        self.token_counts
            .get_or_compute(key, || count_merge(counts))
    }

    /// Set-union `sets` under `key`, or return the cached union.
    pub fn merge_sets<I, S>(&self, key: &str, sets: I) -> Arc<LemmaSet>
    where
        I: IntoIterator<Item = S>,
        S: Borrow<LemmaSet>,
    {
        self.unique_lemmas.get_or_compute(key, || set_union(sets))
    }

    /// Mapping-merge `mappings` under `key`, or return the cached merge.
    pub fn combine_mappings<I, M>(&self, key: &str, mappings: I) -> Arc<OccurrenceIndex>
    where
        I: IntoIterator<Item = M>,
        M: Borrow<OccurrenceIndex>,
    {
        self.occurrence_index
            .get_or_compute(key, || mapping_merge(mappings))
    }

    pub fn token_counts(&self) -> &Memo<TokenCounts> {
        &self.token_counts
    }

    pub fn unique_lemmas(&self) -> &Memo<LemmaSet> {
        &self.unique_lemmas
    }

    pub fn occurrence_index(&self) -> &Memo<OccurrenceIndex> {
        &self.occurrence_index
    }

    /// Check whether `(operation, key)` holds a computed value.
    pub fn contains(&self, operation: Aggregation, key: &str) -> bool {
        match operation {
            Aggregation::TokenCounts => self.token_counts.contains(key),
            Aggregation::UniqueLemmas => self.unique_lemmas.contains(key),
            Aggregation::OccurrenceIndex => self.occurrence_index.contains(key),
        }
    }

    /// Drop the entry for `(operation, key)`.
    ///
    /// Ancestors cached from the old value keep it; invalidate them too if the
    /// subtree under `key` was replaced.
    pub fn invalidate(&self, operation: Aggregation, key: &str) -> bool {
        match operation {
            Aggregation::TokenCounts => self.token_counts.invalidate(key),
            Aggregation::UniqueLemmas => self.unique_lemmas.invalidate(key),
            Aggregation::OccurrenceIndex => self.occurrence_index.invalidate(key),
        }
    }

    /// Drop every entry of every operation.
    pub fn clear(&self) {
        self.token_counts.clear();
        self.unique_lemmas.clear();
        self.occurrence_index.clear();
        tracing::debug!("memo registry cleared");
    }

    pub fn stats(&self) -> MemoStats {
        fn of<V>(memo: &Memo<V>) -> OperationStats {
            OperationStats {
                entries: memo.len(),
                computations: memo.computations(),
                hits: memo.hits(),
            }
        }
        MemoStats {
            token_counts: of(&self.token_counts),
            unique_lemmas: of(&self.unique_lemmas),
            occurrence_index: of(&self.occurrence_index),
        }
    }
}
