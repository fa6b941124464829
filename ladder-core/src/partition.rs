//! Partition identity and cached bounds
//!
//! A partition is addressed two ways: structurally as a `PartitionScope`
//! (collection name plus optional predicate, the form queries consume) and
//! opaquely as a `PartitionKey` (a content hash, the form caches key on).
//! The key is derived from the scope, never stored on records.

use crate::direction::Direction;
use crate::identity::Position;
use crate::scope::ScopeExpr;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Structural identity of a partition: which records order among themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionScope {
    /// Owning collection name
    pub collection: String,
    /// Optional predicate restricting the collection to one partition
    pub predicate: Option<ScopeExpr>,
}

impl PartitionScope {
    /// Scope covering a whole collection.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            predicate: None,
        }
    }

    /// Scope covering the records of a collection matching a predicate.
    pub fn with_predicate(collection: impl Into<String>, predicate: ScopeExpr) -> Self {
        Self {
            collection: collection.into(),
            predicate: Some(predicate),
        }
    }

    /// Derive the cache key for this scope.
    pub fn key(&self) -> PartitionKey {
        PartitionKey::derive(&self.collection, self.predicate.as_ref())
    }

    /// Whether a record with these attributes belongs to this partition.
    /// Collection membership is checked by the caller; this covers the
    /// predicate only.
    pub fn admits(&self, attrs: &serde_json::Map<String, serde_json::Value>) -> bool {
        match &self.predicate {
            Some(expr) => expr.matches(attrs),
            None => true,
        }
    }
}

/// Opaque partition identity: SHA-256 over the collection name and the
/// canonical predicate text. Distinct predicate text yields distinct keys.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PartitionKey([u8; 32]);

impl PartitionKey {
    /// Derive the key for a collection and optional predicate.
    ///
    /// Without a predicate the key depends on the collection alone, so
    /// every unscoped use of a collection shares one cache entry.
    pub fn derive(collection: &str, predicate: Option<&ScopeExpr>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(collection.as_bytes());
        if let Some(expr) = predicate {
            hasher.update(b"::");
            hasher.update(expr.canonical_text().as_bytes());
        }
        let digest = hasher.finalize();
        let mut key = [0u8; 32];
        key.copy_from_slice(&digest);
        Self(key)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex form, 64 characters.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for PartitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartitionKey({})", self.to_hex())
    }
}

/// Minimum and maximum position in a partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Position,
    pub max: Position,
}

impl Bounds {
    pub fn new(min: Position, max: Position) -> Self {
        Self { min, max }
    }

    /// Bounds of a partition holding a single position.
    pub fn single(position: Position) -> Self {
        Self {
            min: position,
            max: position,
        }
    }

    /// Bounds widened to include another position. Used when folding an
    /// aggregate over a partition's records.
    pub fn including(self, position: Position) -> Self {
        Self {
            min: self.min.min(position),
            max: self.max.max(position),
        }
    }

    /// Whether a position sits at the extreme a move in `direction` would
    /// leave: the minimum for `Up`, the maximum for `Down`.
    pub fn at_extreme(&self, position: Position, direction: Direction) -> bool {
        match direction {
            Direction::Up => position == self.min,
            Direction::Down => position == self.max,
        }
    }
}
