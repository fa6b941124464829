//! Reorder engine
//!
//! `can_move` and `move_record` over a record store, plus the lifecycle
//! hooks that keep a caller-owned bounds cache coherent. The engine never
//! renumbers a partition: the only mutation it performs is the two-record
//! position exchange.

use ladder_core::{
    Direction, LadderResult, NewSortRecord, PartitionScope, ReorderConfig, ScopeExpr, SortRecord,
};
use ladder_storage::{BoundsCache, PositionUpdate, RecordStore};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// SCOPE POLICY
// ============================================================================

/// How the engine resolves the predicate restricting a record's partition:
/// one fixed predicate for every record, or one computed from the record's
/// attributes.
pub enum ScopePolicy {
    /// The same predicate (or none) for every record
    Fixed(Option<ScopeExpr>),
    /// A predicate derived from a record's attribute map
    Computed(Arc<dyn Fn(&serde_json::Map<String, Value>) -> Option<ScopeExpr> + Send + Sync>),
}

impl ScopePolicy {
    /// Whole collections form one partition each.
    pub fn unscoped() -> Self {
        ScopePolicy::Fixed(None)
    }

    /// A fixed predicate for every record.
    pub fn fixed(predicate: ScopeExpr) -> Self {
        ScopePolicy::Fixed(Some(predicate))
    }

    /// A predicate computed per record.
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&serde_json::Map<String, Value>) -> Option<ScopeExpr> + Send + Sync + 'static,
    {
        ScopePolicy::Computed(Arc::new(f))
    }

    fn resolve(&self, attributes: &serde_json::Map<String, Value>) -> Option<ScopeExpr> {
        match self {
            ScopePolicy::Fixed(predicate) => predicate.clone(),
            ScopePolicy::Computed(f) => f(attributes),
        }
    }
}

impl Default for ScopePolicy {
    fn default() -> Self {
        Self::unscoped()
    }
}

impl Clone for ScopePolicy {
    fn clone(&self) -> Self {
        match self {
            ScopePolicy::Fixed(predicate) => ScopePolicy::Fixed(predicate.clone()),
            ScopePolicy::Computed(f) => ScopePolicy::Computed(Arc::clone(f)),
        }
    }
}

impl fmt::Debug for ScopePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScopePolicy::Fixed(predicate) => f.debug_tuple("Fixed").field(predicate).finish(),
            ScopePolicy::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

// ============================================================================
// REORDER ENGINE
// ============================================================================

/// Swap-based reordering over a record store.
///
/// The engine holds the store handle, the scope policy, and the config; the
/// bounds cache is owned by the caller and passed into each operation, so
/// its lifetime (per-request, per-transaction, long-lived) stays the
/// caller's decision.
#[derive(Debug, Clone)]
pub struct ReorderEngine<S: RecordStore> {
    store: Arc<S>,
    scope: ScopePolicy,
    config: ReorderConfig,
}

impl<S: RecordStore> ReorderEngine<S> {
    /// Create an engine over a store with default scope and config.
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            scope: ScopePolicy::default(),
            config: ReorderConfig::default(),
        }
    }

    /// Set the scope policy.
    pub fn with_scope(mut self, scope: ScopePolicy) -> Self {
        self.scope = scope;
        self
    }

    /// Set the config.
    pub fn with_config(mut self, config: ReorderConfig) -> Self {
        self.config = config;
        self
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The engine's config.
    pub fn config(&self) -> &ReorderConfig {
        &self.config
    }

    /// The partition a persisted record orders within.
    pub fn partition_of(&self, record: &SortRecord) -> PartitionScope {
        self.partition_for(&record.collection, &record.attributes)
    }

    fn partition_for(
        &self,
        collection: &str,
        attributes: &serde_json::Map<String, Value>,
    ) -> PartitionScope {
        PartitionScope {
            collection: collection.to_string(),
            predicate: self.scope.resolve(attributes),
        }
    }

    /// Whether the record can move in `direction`: `false` exactly when its
    /// position sits at the corresponding partition extreme. Read-only
    /// apart from cache population.
    pub fn can_move(
        &self,
        cache: &BoundsCache,
        record: &SortRecord,
        direction: Direction,
    ) -> LadderResult<bool> {
        let scope = self.partition_of(record);
        match cache.get_bounds(self.store(), &scope)? {
            Some(bounds) => Ok(!bounds.at_extreme(record.position, direction)),
            // A partition the store cannot see has nowhere to move to.
            None => Ok(false),
        }
    }

    /// Swap the record with its neighbor in `direction`. Returns `false`
    /// when no neighbor exists (the record is already at the extreme).
    ///
    /// The decision rests on the live neighbor query alone, never on
    /// cached bounds, so calling without a prior `can_move` is safe. The
    /// record's position field is trusted as current.
    pub fn move_record(
        &self,
        cache: &BoundsCache,
        record: &SortRecord,
        direction: Direction,
    ) -> LadderResult<bool> {
        let scope = self.partition_of(record);
        let neighbor = self
            .store
            .record_neighbor(&scope, record.position, direction)?;

        let Some(neighbor) = neighbor else {
            return Ok(false);
        };

        self.store
            .record_swap_positions(record.record_id, neighbor.record_id)?;
        cache.invalidate(&scope.key())?;
        Ok(true)
    }

    /// Persist a new record, assigning a position when the payload has
    /// none: partition `max + 1`, or the configured baseline for an empty
    /// partition.
    pub fn create_record(
        &self,
        cache: &BoundsCache,
        mut new: NewSortRecord,
    ) -> LadderResult<SortRecord> {
        let scope = self.partition_for(&new.collection, &new.attributes);
        let position = cache.assign_position(self.store(), &scope, &mut new, &self.config)?;
        let record = new.into_record(position);
        self.store.record_insert(&record)?;
        cache.invalidate(&scope.key())?;
        Ok(record)
    }

    /// Hook for position updates applied outside the engine. Invalidates
    /// the record's partition entry when the update carries a position
    /// change; a payload without one touches nothing.
    pub fn before_update(
        &self,
        cache: &BoundsCache,
        record: &SortRecord,
        update: &PositionUpdate,
    ) -> LadderResult<()> {
        if update.position.is_some() {
            let scope = self.partition_of(record);
            cache.invalidate(&scope.key())?;
        }
        Ok(())
    }

    /// Hook for deletions. Invalidates the record's partition entry; the
    /// remaining records keep their positions, gap included.
    pub fn on_delete(&self, cache: &BoundsCache, record: &SortRecord) -> LadderResult<()> {
        let scope = self.partition_of(record);
        cache.invalidate(&scope.key())?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
