//! Cache layer that orchestrates caching logic with network fetching.

use chrono::Duration;
use color_eyre::{eyre::eyre, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheResult, FetchPolicy, QueryKey};
use crate::error::ApiError;

/// A network request that any number of callers can await.
type SharedFetch = Shared<BoxFuture<'static, Result<Value, ApiError>>>;

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the application and the network client. Fresh
/// entries are served without touching the network, and concurrent requests
/// for the same key share a single network call.
pub struct CacheLayer<S: CacheStorage + ?Sized> {
  storage: Arc<S>,
  in_flight: Arc<Mutex<HashMap<String, SharedFetch>>>,
}

impl<S: CacheStorage + ?Sized + 'static> CacheLayer<S> {
  /// Create a new cache layer over a shared storage backend.
  pub fn new(storage: Arc<S>) -> Self {
    Self {
      storage,
      in_flight: Arc::new(Mutex::new(HashMap::new())),
    }
  }

  /// Fetch a query result.
  ///
  /// 1. With `CacheFirst`, a fresh cache entry is returned immediately
  /// 2. Otherwise join the in-flight request for this key, or start one
  /// 3. Successful results are stored with the key's tags and `ttl`
  ///
  /// Failures are returned as-is and never cached.
  pub async fn fetch<K, T, F, Fut>(
    &self,
    key: &K,
    ttl: Duration,
    policy: FetchPolicy,
    fetcher: F,
  ) -> Result<CacheResult<T>>
  where
    K: QueryKey,
    T: Serialize + DeserializeOwned + Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, ApiError>> + Send + 'static,
  {
    let hash = key.cache_hash();

    if policy == FetchPolicy::CacheFirst {
      match self.storage.get(&hash) {
        Ok(Some(entry)) => match serde_json::from_value::<T>(entry.data) {
          Ok(data) => {
            debug!(query = %key.description(), "cache hit");
            return Ok(CacheResult::from_cache(data, entry.cached_at));
          }
          Err(e) => warn!(query = %key.description(), error = %e, "discarding unreadable cache entry"),
        },
        Ok(None) => debug!(query = %key.description(), "cache miss"),
        Err(e) => warn!(query = %key.description(), error = %e, "cache read failed"),
      }
    }

    let request = self.join_or_start(&hash, key, ttl, fetcher)?;
    let value = request.await?;
    let data = serde_json::from_value(value)
      .map_err(|e| eyre!("Failed to read {}: {}", key.description(), e))?;

    Ok(CacheResult::from_network(data))
  }

  /// Evict every entry providing `tag`.
  pub fn invalidate(&self, tag: &str) -> Result<usize> {
    let evicted = self.storage.invalidate(tag)?;
    debug!(tag, evicted, "invalidated cache tag");
    Ok(evicted)
  }

  /// Access the underlying storage.
  pub fn storage(&self) -> &S {
    &self.storage
  }

  fn join_or_start<K, T, F, Fut>(
    &self,
    hash: &str,
    key: &K,
    ttl: Duration,
    fetcher: F,
  ) -> Result<SharedFetch>
  where
    K: QueryKey,
    T: Serialize + Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = std::result::Result<T, ApiError>> + Send + 'static,
  {
    let mut in_flight = self
      .in_flight
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    if let Some(existing) = in_flight.get(hash) {
      debug!(query = %key.description(), "joining in-flight request");
      return Ok(existing.clone());
    }

    let storage = Arc::clone(&self.storage);
    let registry = Arc::clone(&self.in_flight);
    let entry_key = hash.to_string();
    let description = key.description();
    let tags = key.tags();
    let request = fetcher();

    let shared = async move {
      let result = match request.await {
        Ok(data) => serde_json::to_value(&data).map_err(ApiError::from),
        Err(e) => Err(e),
      };

      match &result {
        Ok(value) => {
          if let Err(e) = storage.set(&entry_key, value.clone(), ttl, &tags) {
            warn!(query = %description, error = %e, "failed to store result");
          }
        }
        Err(e) => debug!(query = %description, error = %e, "request failed"),
      }

      if let Ok(mut registry) = registry.lock() {
        registry.remove(&entry_key);
      }

      result
    }
    .boxed()
    .shared();

    in_flight.insert(hash.to_string(), shared.clone());
    Ok(shared)
  }
}

impl<S: CacheStorage + ?Sized> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      in_flight: Arc::clone(&self.in_flight),
    }
  }
}
