//! Caching layer
//!
//! A single-slot cache for whole-tree walk results plus a Moka TTL cache for
//! per-file metadata.

pub mod listing;
pub mod metadata;

pub use listing::{ListingCache, ListingCacheState};
pub use metadata::{MetaCacheStats, MetadataCache};
