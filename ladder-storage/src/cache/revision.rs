//! Revision stamps for cache entries.
//!
//! The cache advances a single sequence counter on every recompute and
//! every invalidation, and stamps each entry with the counter value it
//! was computed at. A caller that kept the stamp from an earlier read
//! can ask later whether that read has been superseded.

use chrono::{DateTime, Utc};

/// The stamp a cache entry was computed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Revision {
    /// Value of the cache's sequence counter at compute time.
    pub sequence: u64,
    /// Wall-clock time of the computation.
    pub observed_at: DateTime<Utc>,
}

impl Revision {
    /// Stamp an entry computed at `sequence`, observed now.
    pub fn new(sequence: u64) -> Self {
        Self {
            sequence,
            observed_at: Utc::now(),
        }
    }

    /// Whether this revision reflects a later computation than `other`.
    pub fn is_newer_than(&self, other: &Revision) -> bool {
        self.sequence > other.sequence
    }

    /// Whether this revision is as fresh as `other`. An observation at
    /// least as fresh as the cache's current entry has not been
    /// superseded by a recompute.
    pub fn is_at_least(&self, other: &Revision) -> bool {
        self.sequence >= other.sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_requires_strictly_larger_sequence() {
        let earlier = Revision::new(3);
        let later = Revision::new(4);
        assert!(later.is_newer_than(&earlier));
        assert!(!earlier.is_newer_than(&later));
        assert!(!later.is_newer_than(&Revision::new(4)));
    }

    #[test]
    fn test_at_least_admits_equal_sequences() {
        let rev = Revision::new(7);
        assert!(rev.is_at_least(&rev));
        assert!(rev.is_at_least(&Revision::new(6)));
        assert!(!rev.is_at_least(&Revision::new(8)));
    }
}
