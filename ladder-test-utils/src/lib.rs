//! LADDER Test Utilities
//!
//! Centralized test infrastructure for the LADDER workspace:
//! - Proptest generators for ids, directions, and position sets
//! - Fixtures for seeding in-memory partitions

// Re-export the in-memory store from its source crate
pub use ladder_storage::{BoundsCache, CachedBounds, MemoryStore, PositionUpdate, RecordStore};

// Re-export core types for convenience
pub use ladder_core::{
    new_record_id, Bounds, Direction, LadderError, LadderResult, NewSortRecord, PartitionKey,
    PartitionScope, Position, RecordId, ReorderConfig, ScopeExpr, SortRecord, Timestamp,
};

use chrono::Utc;
use uuid::Uuid;

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for LADDER types.

    use super::*;
    use proptest::prelude::*;

    /// Generate a random UUID.
    pub fn arb_uuid() -> impl Strategy<Value = Uuid> {
        any::<[u8; 16]>().prop_map(Uuid::from_bytes)
    }

    /// Generate a random RecordId.
    pub fn arb_record_id() -> impl Strategy<Value = RecordId> {
        arb_uuid()
    }

    /// Generate a Direction variant.
    pub fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Up), Just(Direction::Down)]
    }

    /// Generate a position in the range fixtures seed with.
    pub fn arb_position() -> impl Strategy<Value = Position> {
        -1_000i64..1_000
    }

    /// Generate a Timestamp (DateTime<Utc>) within 2020-2030.
    pub fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
        (1577836800i64..1893456000i64)
            .prop_map(|secs| chrono::DateTime::from_timestamp(secs, 0).unwrap_or_else(Utc::now))
    }

    /// Generate between `min_len` and `max_len` pairwise-distinct positions
    /// in arbitrary order. Distinctness matters to callers asserting which
    /// record a swap picked, so duplicates are never produced.
    pub fn distinct_positions(
        min_len: usize,
        max_len: usize,
    ) -> impl Strategy<Value = Vec<Position>> {
        proptest::collection::btree_set(arb_position(), min_len..=max_len)
            .prop_map(|set| set.into_iter().collect::<Vec<Position>>())
            .prop_shuffle()
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built fixtures for seeding stores in tests.

    use super::*;
    use serde_json::json;
    use std::sync::Arc;

    /// Create a shared empty in-memory store.
    pub fn memory_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    /// Insert one record per position into `collection`. The returned
    /// records parallel the `positions` slice index for index.
    pub fn seed_partition(
        store: &MemoryStore,
        collection: &str,
        positions: &[Position],
    ) -> Vec<SortRecord> {
        positions
            .iter()
            .map(|&position| {
                let record = NewSortRecord::new(collection).into_record(position);
                store
                    .record_insert(&record)
                    .expect("seeding a fresh record should not collide");
                record
            })
            .collect()
    }

    /// Like [`seed_partition`], with every record carrying a `post_id`
    /// attribute so scope predicates can split the collection.
    pub fn seed_scoped_partition(
        store: &MemoryStore,
        collection: &str,
        post_id: i64,
        positions: &[Position],
    ) -> Vec<SortRecord> {
        positions
            .iter()
            .map(|&position| {
                let record = NewSortRecord::new(collection)
                    .with_attribute("post_id", json!(post_id))
                    .into_record(position);
                store
                    .record_insert(&record)
                    .expect("seeding a fresh record should not collide");
                record
            })
            .collect()
    }
}

pub use fixtures::{memory_store, seed_partition, seed_scoped_partition};
pub use generators::distinct_positions;

// ============================================================================
// TESTS
// ============================================================================
