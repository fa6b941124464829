//! LADDER Core - Data Types
//!
//! Core types for swap-based manual reordering of records: identity aliases,
//! the move direction, scope predicates, partition identity, record shapes,
//! the error taxonomy, and configuration. This crate is pure data; storage
//! and the reorder engine build on it.

pub mod config;
pub mod direction;
pub mod error;
pub mod identity;
pub mod partition;
pub mod record;
pub mod scope;

pub use config::ReorderConfig;
pub use direction::{Direction, DirectionParseError};
pub use error::{ConfigError, LadderError, LadderResult, ReorderError, StorageError};
pub use identity::{new_record_id, Position, RecordId, Timestamp};
pub use partition::{Bounds, PartitionKey, PartitionScope};
pub use record::{NewSortRecord, SortRecord};
pub use scope::{ScopeExpr, ScopeOperator};
