//! Record types
//!
//! `SortRecord` is the persisted shape: every stored record has a position.
//! `NewSortRecord` is the insert payload: its position stays unset until the
//! on-create hook resolves one.

use crate::identity::{new_record_id, Position, RecordId, Timestamp};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A record in a partitioned, position-ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SortRecord {
    pub record_id: RecordId,
    /// Owning collection name
    pub collection: String,
    /// Named attributes that scope predicates evaluate against
    pub attributes: serde_json::Map<String, Value>,
    /// Sort position within the record's partition
    pub position: Position,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SortRecord {
    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Insert payload for a record that has not been persisted yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSortRecord {
    pub record_id: RecordId,
    pub collection: String,
    pub attributes: serde_json::Map<String, Value>,
    /// Explicit position, or `None` to have one assigned at insert time
    pub position: Option<Position>,
}

impl NewSortRecord {
    /// Create an insert payload with a fresh id and no position.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            record_id: new_record_id(),
            collection: collection.into(),
            attributes: serde_json::Map::new(),
            position: None,
        }
    }

    /// Set an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Set an explicit position, bypassing creation-time assignment.
    pub fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }

    /// Finalize into a persisted record at the resolved position.
    pub fn into_record(self, position: Position) -> SortRecord {
        let now = Utc::now();
        SortRecord {
            record_id: self.record_id,
            collection: self.collection,
            attributes: self.attributes,
            position,
            created_at: now,
            updated_at: now,
        }
    }
}
