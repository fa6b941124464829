//! Bounds caching with explicit invalidation.
//!
//! The min/max aggregate per partition is cheap to compute but consulted on
//! every legality check, so it is cached. Traditional ambient caches hide
//! their staleness; this module makes it explicit instead: the cache is an
//! object the caller owns and passes into operations, every entry carries
//! the [`Revision`] it was computed at, and staleness ends only through the
//! invalidation calls wired into the mutation paths.
//!
//! # Example
//!
//! ```ignore
//! let cache = BoundsCache::new();
//! let bounds = cache.get_bounds(&store, &scope)?;      // computes once
//! let seen = cache.revision_of(&scope.key())?;         // stamp the read
//! cache.invalidate(&scope.key())?;                     // after a mutation
//! cache.is_current(&scope.key(), &seen.unwrap())?;     // now false
//! let fresh = cache.get_bounds(&store, &scope)?;       // recomputes
//! ```

pub mod bounds;
pub mod revision;

pub use bounds::{BoundsCache, CachedBounds};
pub use revision::Revision;
