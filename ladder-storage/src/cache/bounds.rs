//! Bounds cache keyed by partition.
//!
//! Holds the min/max position aggregate per observed partition. Entries are
//! computed read-through from a [`RecordStore`] and removed by explicit
//! invalidation; there is no expiry.

use crate::cache::revision::Revision;
use crate::RecordStore;
use ladder_core::{
    Bounds, LadderResult, NewSortRecord, PartitionKey, PartitionScope, Position, ReorderConfig,
    StorageError,
};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A cached bounds aggregate and the revision it was computed at.
///
/// `bounds` is `None` when the partition held no records at compute time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachedBounds {
    pub bounds: Option<Bounds>,
    pub revision: Revision,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<PartitionKey, CachedBounds>,
    sequence: u64,
}

/// Caller-owned cache of partition bounds.
///
/// The cache is not ambient state: the owner decides its lifetime
/// (per-request, per-transaction, or long-lived) and passes it into the
/// operations that consult it. Recomputes run under the write lock, so an
/// invalidation issued after a store mutation cannot be outrun by a stale
/// recompute that started earlier.
#[derive(Debug, Default)]
pub struct BoundsCache {
    state: RwLock<CacheState>,
}

impl BoundsCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds for a partition, computed through the store on first access.
    ///
    /// Returns `None` for a partition with no records. The empty result is
    /// cached like any other so repeated probes of an empty partition stay
    /// cheap.
    pub fn get_bounds<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        scope: &PartitionScope,
    ) -> LadderResult<Option<Bounds>> {
        let key = scope.key();

        {
            let state = self.read_guard()?;
            if let Some(entry) = state.entries.get(&key) {
                return Ok(entry.bounds);
            }
        }

        let mut state = self.write_guard()?;
        // Another thread may have filled the entry between the two locks.
        if let Some(entry) = state.entries.get(&key) {
            return Ok(entry.bounds);
        }

        let bounds = store.record_bounds(scope)?;
        state.sequence += 1;
        let revision = Revision::new(state.sequence);
        state.entries.insert(key, CachedBounds { bounds, revision });
        Ok(bounds)
    }

    /// The cached entry for a key, without computing anything.
    pub fn cached(&self, key: &PartitionKey) -> LadderResult<Option<CachedBounds>> {
        Ok(self.read_guard()?.entries.get(key).copied())
    }

    /// The revision of the cached entry for a key, without computing
    /// anything. `None` when nothing is cached under the key.
    pub fn revision_of(&self, key: &PartitionKey) -> LadderResult<Option<Revision>> {
        Ok(self
            .read_guard()?
            .entries
            .get(key)
            .map(|entry| entry.revision))
    }

    /// Whether a previously observed revision still describes the cache's
    /// entry for `key`. `false` once the entry has been invalidated or
    /// recomputed after the observation.
    pub fn is_current(&self, key: &PartitionKey, seen: &Revision) -> LadderResult<bool> {
        Ok(match self.revision_of(key)? {
            Some(current) => seen.is_at_least(&current),
            None => false,
        })
    }

    /// Resolve the position a new record will be persisted at, assigning
    /// one when the payload has none: partition `max + 1`, or the
    /// configured baseline for an empty partition. The payload's position
    /// field is set to the resolved value.
    pub fn assign_position<S: RecordStore + ?Sized>(
        &self,
        store: &S,
        scope: &PartitionScope,
        new: &mut NewSortRecord,
        config: &ReorderConfig,
    ) -> LadderResult<Position> {
        if let Some(position) = new.position {
            return Ok(position);
        }

        let assigned = match self.get_bounds(store, scope)? {
            Some(bounds) => bounds.max.saturating_add(1),
            None => config.baseline_position,
        };
        new.position = Some(assigned);
        Ok(assigned)
    }

    /// Drop the entry for a partition. Returns whether one was cached.
    /// Call after any position change, creation, or deletion in the
    /// partition.
    pub fn invalidate(&self, key: &PartitionKey) -> LadderResult<bool> {
        let mut state = self.write_guard()?;
        state.sequence += 1;
        Ok(state.entries.remove(key).is_some())
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) -> LadderResult<()> {
        let mut state = self.write_guard()?;
        state.sequence += 1;
        state.entries.clear();
        Ok(())
    }

    /// Number of partitions currently cached.
    pub fn len(&self) -> LadderResult<usize> {
        Ok(self.read_guard()?.entries.len())
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> LadderResult<bool> {
        Ok(self.read_guard()?.entries.is_empty())
    }

    fn read_guard(&self) -> LadderResult<RwLockReadGuard<'_, CacheState>> {
        self.state
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write_guard(&self) -> LadderResult<RwLockWriteGuard<'_, CacheState>> {
        self.state
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStore, PositionUpdate};
    use ladder_core::SortRecord;

    fn record_at(collection: &str, position: Position) -> SortRecord {
        NewSortRecord::new(collection).into_record(position)
    }

    #[test]
    fn test_miss_computes_and_populates() {
        let store = MemoryStore::new();
        store.record_insert(&record_at("article", 2)).unwrap();
        store.record_insert(&record_at("article", 7)).unwrap();

        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        assert!(cache.is_empty().unwrap());

        let bounds = cache.get_bounds(&store, &scope).unwrap();
        assert_eq!(bounds, Some(Bounds::new(2, 7)));
        assert_eq!(cache.len().unwrap(), 1);

        let entry = cache.cached(&scope.key()).unwrap().unwrap();
        assert_eq!(entry.bounds, Some(Bounds::new(2, 7)));
        assert_eq!(entry.revision.sequence, 1);
    }

    #[test]
    fn test_hit_returns_cached_value_without_recompute() {
        let store = MemoryStore::new();
        let record = record_at("article", 2);
        store.record_insert(&record).unwrap();

        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        cache.get_bounds(&store, &scope).unwrap();

        // Mutate the store behind the cache's back. The cached aggregate
        // must win until someone invalidates.
        store
            .record_update(record.record_id, PositionUpdate::set(40))
            .unwrap();
        let stale = cache.get_bounds(&store, &scope).unwrap();
        assert_eq!(stale, Some(Bounds::new(2, 2)));
    }

    #[test]
    fn test_invalidate_forces_recompute_and_advances_revision() {
        let store = MemoryStore::new();
        let record = record_at("article", 2);
        store.record_insert(&record).unwrap();

        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        cache.get_bounds(&store, &scope).unwrap();
        let first = cache.cached(&scope.key()).unwrap().unwrap();

        store
            .record_update(record.record_id, PositionUpdate::set(40))
            .unwrap();
        assert!(cache.invalidate(&scope.key()).unwrap());

        let fresh = cache.get_bounds(&store, &scope).unwrap();
        assert_eq!(fresh, Some(Bounds::new(40, 40)));
        let second = cache.cached(&scope.key()).unwrap().unwrap();
        assert!(second.revision.is_newer_than(&first.revision));
    }

    #[test]
    fn test_invalidate_unknown_key_reports_absence() {
        let cache = BoundsCache::new();
        let key = PartitionScope::new("article").key();
        assert!(!cache.invalidate(&key).unwrap());
    }

    #[test]
    fn test_revision_of_follows_entry_lifecycle() {
        let store = MemoryStore::new();
        store.record_insert(&record_at("article", 2)).unwrap();

        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        let key = scope.key();

        assert_eq!(cache.revision_of(&key).unwrap(), None);
        cache.get_bounds(&store, &scope).unwrap();
        assert!(cache.revision_of(&key).unwrap().is_some());

        cache.invalidate(&key).unwrap();
        assert_eq!(cache.revision_of(&key).unwrap(), None);
    }

    #[test]
    fn test_is_current_detects_invalidation_and_recompute() {
        let store = MemoryStore::new();
        store.record_insert(&record_at("article", 2)).unwrap();

        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        let key = scope.key();

        cache.get_bounds(&store, &scope).unwrap();
        let seen = cache.revision_of(&key).unwrap().unwrap();
        assert!(cache.is_current(&key, &seen).unwrap());

        cache.invalidate(&key).unwrap();
        assert!(!cache.is_current(&key, &seen).unwrap());

        cache.get_bounds(&store, &scope).unwrap();
        let recomputed = cache.revision_of(&key).unwrap().unwrap();
        assert!(recomputed.is_newer_than(&seen));
        assert!(!cache.is_current(&key, &seen).unwrap());
        assert!(cache.is_current(&key, &recomputed).unwrap());
    }

    #[test]
    fn test_invalidate_all_clears_every_partition() {
        let store = MemoryStore::new();
        store.record_insert(&record_at("article", 1)).unwrap();
        store.record_insert(&record_at("comment", 3)).unwrap();

        let cache = BoundsCache::new();
        cache
            .get_bounds(&store, &PartitionScope::new("article"))
            .unwrap();
        cache
            .get_bounds(&store, &PartitionScope::new("comment"))
            .unwrap();
        assert_eq!(cache.len().unwrap(), 2);

        cache.invalidate_all().unwrap();
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_empty_partition_is_cached_as_none() {
        let store = MemoryStore::new();
        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");

        assert_eq!(cache.get_bounds(&store, &scope).unwrap(), None);
        let entry = cache.cached(&scope.key()).unwrap().unwrap();
        assert_eq!(entry.bounds, None);
    }

    #[test]
    fn test_assign_position_respects_explicit_position() {
        let store = MemoryStore::new();
        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        let config = ReorderConfig::default();

        let mut new = NewSortRecord::new("article").with_position(5);
        let resolved = cache
            .assign_position(&store, &scope, &mut new, &config)
            .unwrap();
        assert_eq!(resolved, 5);
        assert_eq!(new.position, Some(5));
        // No bounds lookup happens for an explicit position.
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_assign_position_appends_after_max() {
        let store = MemoryStore::new();
        store.record_insert(&record_at("article", 7)).unwrap();

        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        let config = ReorderConfig::default();

        let mut new = NewSortRecord::new("article");
        let resolved = cache
            .assign_position(&store, &scope, &mut new, &config)
            .unwrap();
        assert_eq!(resolved, 8);
        assert_eq!(new.position, Some(8));
    }

    #[test]
    fn test_assign_position_baseline_for_empty_partition() {
        let store = MemoryStore::new();
        let cache = BoundsCache::new();
        let scope = PartitionScope::new("article");
        let config = ReorderConfig::default().with_baseline_position(100);

        let mut new = NewSortRecord::new("article");
        let resolved = cache
            .assign_position(&store, &scope, &mut new, &config)
            .unwrap();
        assert_eq!(resolved, 100);
    }

    #[test]
    fn test_distinct_scopes_do_not_collide() {
        use ladder_core::ScopeExpr;
        use serde_json::json;

        let store = MemoryStore::new();
        let five = NewSortRecord::new("article")
            .with_attribute("post_id", json!(5))
            .into_record(1);
        let six = NewSortRecord::new("article")
            .with_attribute("post_id", json!(6))
            .into_record(9);
        store.record_insert(&five).unwrap();
        store.record_insert(&six).unwrap();

        let cache = BoundsCache::new();
        let scope_five =
            PartitionScope::with_predicate("article", ScopeExpr::eq("post_id", json!(5)));
        let scope_six =
            PartitionScope::with_predicate("article", ScopeExpr::eq("post_id", json!(6)));

        assert_eq!(
            cache.get_bounds(&store, &scope_five).unwrap(),
            Some(Bounds::single(1))
        );
        assert_eq!(
            cache.get_bounds(&store, &scope_six).unwrap(),
            Some(Bounds::single(9))
        );
        assert_eq!(cache.len().unwrap(), 2);
    }
}
