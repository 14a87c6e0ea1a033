//! Generic request caching layer.
//!
//! This module provides an API-agnostic caching mechanism that:
//! - Addresses results by a normalized query key
//! - Expires entries after a per-query TTL, evicting them lazily
//! - Evicts groups of entries by tag
//! - Coalesces concurrent requests for the same key into one network call

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{CacheStorage, MemoryStorage, NoopStorage};
pub use traits::{CacheResult, CacheSource, Cacheable, FetchPolicy, QueryKey};
