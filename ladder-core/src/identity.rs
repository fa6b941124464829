//! Identity types for LADDER records

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Record identifier using UUIDv7 for timestamp-sortable IDs.
/// UUIDv7 embeds a Unix timestamp, so insertion order and primary-key order
/// agree, which keeps the duplicate-position tiebreak stable.
pub type RecordId = Uuid;

/// Timestamp type using UTC timezone.
pub type Timestamp = DateTime<Utc>;

/// Sort position within a partition. Ordered, not necessarily contiguous.
pub type Position = i64;

/// Generate a new UUIDv7 RecordId (timestamp-sortable).
pub fn new_record_id() -> RecordId {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_id_is_v7() {
        let id = new_record_id();
        assert_eq!(id.get_version_num(), 7);
    }

    #[test]
    fn test_record_ids_are_unique() {
        let first = new_record_id();
        let second = new_record_id();
        assert_ne!(first, second);
    }
}
