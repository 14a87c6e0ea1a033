//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for entities with a stable identity.
///
/// The cache key is what list merging de-duplicates on.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Unique identifier for this entity (e.g., item id)
  fn cache_key(&self) -> String;
}

/// A normalized description of a query, used to address cache entries.
pub trait QueryKey: Send + Sync {
  /// Stable, fixed-length key derived from the normalized query arguments.
  fn cache_hash(&self) -> String;

  /// Human readable description for logging.
  fn description(&self) -> String;

  /// Tags this query's result provides, for invalidation.
  fn tags(&self) -> Vec<String>;
}

/// How a fetch should treat existing cache entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
  /// Serve a fresh cache entry if there is one
  #[default]
  CacheFirst,
  /// Always go to the network (explicit refetch)
  NetworkOnly,
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Data from cache, still within its TTL
  Cache,
}
