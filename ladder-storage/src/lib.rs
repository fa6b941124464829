//! LADDER Storage - Record Store Trait and In-Memory Implementation
//!
//! Defines the storage abstraction the reorder engine drives. Real
//! persistence (SQL, document stores) lives outside this workspace;
//! `MemoryStore` supplies the reference semantics and the test substrate.

pub mod cache;

pub use cache::{BoundsCache, CachedBounds, Revision};

use chrono::Utc;
use ladder_core::{
    Bounds, Direction, LadderResult, PartitionScope, Position, RecordId, SortRecord, StorageError,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ============================================================================
// UPDATE TYPES
// ============================================================================

/// Partial update payload for records.
///
/// Only fields present in the payload are written, so a position change
/// never touches other attributes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PositionUpdate {
    /// New position
    pub position: Option<Position>,
}

impl PositionUpdate {
    /// Payload setting the position field.
    pub fn set(position: Position) -> Self {
        Self {
            position: Some(position),
        }
    }
}

// ============================================================================
// RECORD STORE TRAIT
// ============================================================================

/// Storage trait for position-ordered records.
///
/// Implementations provide point lookup, partition-scoped ordered queries,
/// partial updates, and an atomic two-record position exchange. All
/// partition arguments are structural scopes; implementations apply the
/// scope's predicate themselves.
pub trait RecordStore: Send + Sync {
    /// Insert a new record.
    fn record_insert(&self, record: &SortRecord) -> LadderResult<()>;

    /// Get a record by id.
    fn record_get(&self, id: RecordId) -> LadderResult<Option<SortRecord>>;

    /// Apply a partial update to a record.
    fn record_update(&self, id: RecordId, update: PositionUpdate) -> LadderResult<()>;

    /// Delete a record. Returns whether it existed.
    fn record_delete(&self, id: RecordId) -> LadderResult<bool>;

    /// List a partition's records, ordered by position then id.
    fn record_list(&self, scope: &PartitionScope) -> LadderResult<Vec<SortRecord>>;

    /// Find the record a move from `position` in `direction` would swap
    /// with: the nearest strictly-smaller position for `Up`, the nearest
    /// strictly-greater for `Down`. Among candidates sharing the winning
    /// position value, the lowest id wins.
    fn record_neighbor(
        &self,
        scope: &PartitionScope,
        position: Position,
        direction: Direction,
    ) -> LadderResult<Option<SortRecord>>;

    /// Min/max position aggregate over a partition. `None` when the
    /// partition holds no records.
    fn record_bounds(&self, scope: &PartitionScope) -> LadderResult<Option<Bounds>>;

    /// Exchange two records' position values as one atomic batch: either
    /// both rows are written or neither is. SQL-backed implementations
    /// must wrap the two updates in a transaction.
    fn record_swap_positions(&self, a: RecordId, b: RecordId) -> LadderResult<()>;
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// In-memory record store over a shared hash map.
///
/// Cloning shares the underlying map. The swap runs inside a single write
/// critical section, which is what makes it the reference for the atomic
/// exchange contract.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<RwLock<HashMap<RecordId, SortRecord>>>,
}

impl MemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored records.
    pub fn clear(&self) -> LadderResult<()> {
        self.write_guard()?.clear();
        Ok(())
    }

    /// Total number of stored records across all partitions.
    pub fn record_count(&self) -> LadderResult<usize> {
        Ok(self.read_guard()?.len())
    }

    fn read_guard(&self) -> LadderResult<RwLockReadGuard<'_, HashMap<RecordId, SortRecord>>> {
        self.records
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write_guard(&self) -> LadderResult<RwLockWriteGuard<'_, HashMap<RecordId, SortRecord>>> {
        self.records
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn in_partition(record: &SortRecord, scope: &PartitionScope) -> bool {
        record.collection == scope.collection && scope.admits(&record.attributes)
    }
}

impl RecordStore for MemoryStore {
    fn record_insert(&self, record: &SortRecord) -> LadderResult<()> {
        let mut records = self.write_guard()?;
        if records.contains_key(&record.record_id) {
            return Err(StorageError::DuplicateId {
                id: record.record_id,
            }
            .into());
        }
        records.insert(record.record_id, record.clone());
        Ok(())
    }

    fn record_get(&self, id: RecordId) -> LadderResult<Option<SortRecord>> {
        let records = self.read_guard()?;
        Ok(records.get(&id).cloned())
    }

    fn record_update(&self, id: RecordId, update: PositionUpdate) -> LadderResult<()> {
        let mut records = self.write_guard()?;
        let record = records
            .get_mut(&id)
            .ok_or(StorageError::NotFound { id })?;

        if let Some(position) = update.position {
            record.position = position;
            record.updated_at = Utc::now();
        }

        Ok(())
    }

    fn record_delete(&self, id: RecordId) -> LadderResult<bool> {
        let mut records = self.write_guard()?;
        Ok(records.remove(&id).is_some())
    }

    fn record_list(&self, scope: &PartitionScope) -> LadderResult<Vec<SortRecord>> {
        let records = self.read_guard()?;
        let mut matched: Vec<SortRecord> = records
            .values()
            .filter(|r| Self::in_partition(r, scope))
            .cloned()
            .collect();
        matched.sort_by_key(|r| (r.position, r.record_id));
        Ok(matched)
    }

    fn record_neighbor(
        &self,
        scope: &PartitionScope,
        position: Position,
        direction: Direction,
    ) -> LadderResult<Option<SortRecord>> {
        let records = self.read_guard()?;
        let mut best: Option<&SortRecord> = None;

        for candidate in records.values().filter(|r| Self::in_partition(r, scope)) {
            let eligible = match direction {
                Direction::Up => candidate.position < position,
                Direction::Down => candidate.position > position,
            };
            if !eligible {
                continue;
            }

            best = match best {
                None => Some(candidate),
                Some(current) => {
                    let closer = match direction {
                        Direction::Up => candidate.position > current.position,
                        Direction::Down => candidate.position < current.position,
                    };
                    let tie = candidate.position == current.position
                        && candidate.record_id < current.record_id;
                    if closer || tie {
                        Some(candidate)
                    } else {
                        Some(current)
                    }
                }
            };
        }

        Ok(best.cloned())
    }

    fn record_bounds(&self, scope: &PartitionScope) -> LadderResult<Option<Bounds>> {
        let records = self.read_guard()?;
        let bounds = records
            .values()
            .filter(|r| Self::in_partition(r, scope))
            .fold(None, |acc: Option<Bounds>, r| match acc {
                None => Some(Bounds::single(r.position)),
                Some(b) => Some(b.including(r.position)),
            });
        Ok(bounds)
    }

    fn record_swap_positions(&self, a: RecordId, b: RecordId) -> LadderResult<()> {
        let mut records = self.write_guard()?;

        // Resolve both positions before writing anything, so a missing
        // record cannot leave a half-applied exchange.
        let position_a = records
            .get(&a)
            .map(|r| r.position)
            .ok_or(StorageError::NotFound { id: a })?;
        let position_b = records
            .get(&b)
            .map(|r| r.position)
            .ok_or(StorageError::NotFound { id: b })?;

        let now = Utc::now();
        if let Some(record) = records.get_mut(&a) {
            record.position = position_b;
            record.updated_at = now;
        }
        if let Some(record) = records.get_mut(&b) {
            record.position = position_a;
            record.updated_at = now;
        }

        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ladder_core::{LadderError, NewSortRecord, ScopeExpr};
    use serde_json::json;
    use uuid::Uuid;

    fn record_at(collection: &str, position: Position) -> SortRecord {
        NewSortRecord::new(collection).into_record(position)
    }

    fn record_with_id(collection: &str, position: Position, id: u128) -> SortRecord {
        let mut record = record_at(collection, position);
        record.record_id = Uuid::from_u128(id);
        record
    }

    fn scoped_record(collection: &str, position: Position, post_id: i64) -> SortRecord {
        NewSortRecord::new(collection)
            .with_attribute("post_id", json!(post_id))
            .into_record(position)
    }

    #[test]
    fn test_insert_and_get() {
        let store = MemoryStore::new();
        let record = record_at("article", 1);
        store.record_insert(&record).unwrap();

        let fetched = store.record_get(record.record_id).unwrap().unwrap();
        assert_eq!(fetched, record);
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_insert_duplicate_fails() {
        let store = MemoryStore::new();
        let record = record_at("article", 1);
        store.record_insert(&record).unwrap();

        let err = store.record_insert(&record).unwrap_err();
        assert!(matches!(
            err,
            LadderError::Storage(StorageError::DuplicateId { .. })
        ));
        assert_eq!(store.record_count().unwrap(), 1);
    }

    #[test]
    fn test_update_sets_position_and_bumps_updated_at() {
        let store = MemoryStore::new();
        let record = record_at("article", 1);
        store.record_insert(&record).unwrap();

        store
            .record_update(record.record_id, PositionUpdate::set(9))
            .unwrap();
        let fetched = store.record_get(record.record_id).unwrap().unwrap();
        assert_eq!(fetched.position, 9);
        assert!(fetched.updated_at >= record.updated_at);
        assert_eq!(fetched.attributes, record.attributes);
    }

    #[test]
    fn test_update_empty_payload_changes_nothing() {
        let store = MemoryStore::new();
        let record = record_at("article", 4);
        store.record_insert(&record).unwrap();

        store
            .record_update(record.record_id, PositionUpdate::default())
            .unwrap();
        let fetched = store.record_get(record.record_id).unwrap().unwrap();
        assert_eq!(fetched, record);
    }

    #[test]
    fn test_update_missing_record_fails() {
        let store = MemoryStore::new();
        let err = store
            .record_update(Uuid::nil(), PositionUpdate::set(1))
            .unwrap_err();
        assert!(matches!(
            err,
            LadderError::Storage(StorageError::NotFound { .. })
        ));
    }

    #[test]
    fn test_delete_returns_existence() {
        let store = MemoryStore::new();
        let record = record_at("article", 1);
        store.record_insert(&record).unwrap();

        assert!(store.record_delete(record.record_id).unwrap());
        assert!(!store.record_delete(record.record_id).unwrap());
        assert_eq!(store.record_count().unwrap(), 0);
    }

    #[test]
    fn test_list_orders_by_position_then_id() {
        let store = MemoryStore::new();
        let first = record_with_id("article", 2, 1);
        let second = record_with_id("article", 2, 2);
        let third = record_with_id("article", 5, 3);
        for r in [&third, &second, &first] {
            store.record_insert(r).unwrap();
        }

        let scope = PartitionScope::new("article");
        let listed = store.record_list(&scope).unwrap();
        let ids: Vec<RecordId> = listed.iter().map(|r| r.record_id).collect();
        assert_eq!(
            ids,
            vec![first.record_id, second.record_id, third.record_id]
        );
    }

    #[test]
    fn test_list_respects_collection_and_predicate() {
        let store = MemoryStore::new();
        store.record_insert(&scoped_record("article", 1, 5)).unwrap();
        store.record_insert(&scoped_record("article", 2, 6)).unwrap();
        store.record_insert(&scoped_record("comment", 3, 5)).unwrap();

        let scope = PartitionScope::with_predicate("article", ScopeExpr::eq("post_id", json!(5)));
        let listed = store.record_list(&scope).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].attribute("post_id"), Some(&json!(5)));
    }

    #[test]
    fn test_neighbor_up_picks_nearest_smaller() {
        let store = MemoryStore::new();
        let low = record_at("article", 1);
        let mid = record_at("article", 5);
        let high = record_at("article", 9);
        for r in [&low, &mid, &high] {
            store.record_insert(r).unwrap();
        }

        let scope = PartitionScope::new("article");
        let neighbor = store.record_neighbor(&scope, 9, Direction::Up).unwrap();
        assert_eq!(neighbor.map(|r| r.record_id), Some(mid.record_id));
    }

    #[test]
    fn test_neighbor_down_picks_nearest_greater() {
        let store = MemoryStore::new();
        let low = record_at("article", 1);
        let mid = record_at("article", 5);
        let high = record_at("article", 9);
        for r in [&low, &mid, &high] {
            store.record_insert(r).unwrap();
        }

        let scope = PartitionScope::new("article");
        let neighbor = store.record_neighbor(&scope, 1, Direction::Down).unwrap();
        assert_eq!(neighbor.map(|r| r.record_id), Some(mid.record_id));
    }

    #[test]
    fn test_neighbor_none_at_extremes() {
        let store = MemoryStore::new();
        store.record_insert(&record_at("article", 1)).unwrap();
        store.record_insert(&record_at("article", 2)).unwrap();

        let scope = PartitionScope::new("article");
        assert!(store
            .record_neighbor(&scope, 1, Direction::Up)
            .unwrap()
            .is_none());
        assert!(store
            .record_neighbor(&scope, 2, Direction::Down)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_neighbor_tiebreak_lowest_id_wins() {
        let store = MemoryStore::new();
        let twin_a = record_with_id("article", 3, 1);
        let twin_b = record_with_id("article", 3, 2);
        store.record_insert(&twin_b).unwrap();
        store.record_insert(&twin_a).unwrap();

        let scope = PartitionScope::new("article");
        let up = store.record_neighbor(&scope, 7, Direction::Up).unwrap();
        assert_eq!(up.map(|r| r.record_id), Some(twin_a.record_id));

        let down = store.record_neighbor(&scope, 1, Direction::Down).unwrap();
        assert_eq!(down.map(|r| r.record_id), Some(twin_a.record_id));
    }

    #[test]
    fn test_neighbor_ignores_other_partitions() {
        let store = MemoryStore::new();
        store.record_insert(&scoped_record("article", 2, 5)).unwrap();
        store.record_insert(&scoped_record("article", 4, 6)).unwrap();
        store.record_insert(&scoped_record("article", 6, 5)).unwrap();

        let scope = PartitionScope::with_predicate("article", ScopeExpr::eq("post_id", json!(5)));
        let neighbor = store.record_neighbor(&scope, 6, Direction::Up).unwrap();
        assert_eq!(neighbor.map(|r| r.position), Some(2));
    }

    #[test]
    fn test_bounds_aggregate() {
        let store = MemoryStore::new();
        let scope = PartitionScope::new("article");
        assert_eq!(store.record_bounds(&scope).unwrap(), None);

        store.record_insert(&record_at("article", 4)).unwrap();
        assert_eq!(
            store.record_bounds(&scope).unwrap(),
            Some(Bounds::single(4))
        );

        store.record_insert(&record_at("article", 9)).unwrap();
        store.record_insert(&record_at("article", 2)).unwrap();
        assert_eq!(
            store.record_bounds(&scope).unwrap(),
            Some(Bounds::new(2, 9))
        );
    }

    #[test]
    fn test_swap_exchanges_positions() {
        let store = MemoryStore::new();
        let a = record_at("article", 3);
        let b = record_at("article", 8);
        store.record_insert(&a).unwrap();
        store.record_insert(&b).unwrap();

        store.record_swap_positions(a.record_id, b.record_id).unwrap();

        let a_after = store.record_get(a.record_id).unwrap().unwrap();
        let b_after = store.record_get(b.record_id).unwrap().unwrap();
        assert_eq!(a_after.position, 8);
        assert_eq!(b_after.position, 3);
        assert!(a_after.updated_at >= a.updated_at);
        assert!(b_after.updated_at >= b.updated_at);
    }

    #[test]
    fn test_swap_missing_record_leaves_state_unchanged() {
        let store = MemoryStore::new();
        let a = record_at("article", 3);
        store.record_insert(&a).unwrap();

        let err = store
            .record_swap_positions(a.record_id, Uuid::nil())
            .unwrap_err();
        assert!(matches!(
            err,
            LadderError::Storage(StorageError::NotFound { .. })
        ));

        let a_after = store.record_get(a.record_id).unwrap().unwrap();
        assert_eq!(a_after, a);
    }
}
