//! Cached catalog client that wraps CatalogClient with transparent caching.

use chrono::Duration;
use color_eyre::Result;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheLayer, CacheStorage, FetchPolicy};
use crate::config::Config;
use crate::paging::Page;

use super::cache::CatalogQueryKey;
use super::client::CatalogClient;
use super::types::{DetailRecord, ListItem};

/// Catalog client with transparent caching support.
///
/// This wraps the underlying CatalogClient and provides the same API, but
/// serves fresh results from the shared cache and coalesces identical
/// requests.
#[derive(Clone)]
pub struct CachedCatalogClient {
  inner: CatalogClient,
  cache: CacheLayer<dyn CacheStorage>,
  list_ttl: Duration,
  detail_ttl: Duration,
}

impl CachedCatalogClient {
  /// Create a new cached client over the process-wide cache storage.
  pub fn new(config: &Config, storage: Arc<dyn CacheStorage>) -> Result<Self> {
    let inner = CatalogClient::new(&config.api)?;
    let cache = CacheLayer::new(storage);

    Ok(Self {
      inner,
      cache,
      list_ttl: config.list_ttl(),
      detail_ttl: config.detail_ttl(),
    })
  }

  pub fn base_url(&self) -> &str {
    self.inner.base_url()
  }

  pub fn collection(&self) -> &str {
    self.inner.collection()
  }

  /// Get one page of the collection with caching.
  pub async fn query_collection(
    &self,
    limit: usize,
    offset: usize,
    policy: FetchPolicy,
  ) -> Result<Page<ListItem>> {
    let query_key = CatalogQueryKey::Collection { limit, offset };

    let result = self
      .cache
      .fetch(&query_key, self.list_ttl, policy, || {
        let inner = self.inner.clone();
        async move { inner.get_page(limit, offset).await }
      })
      .await?;

    debug!(limit, offset, source = ?result.source, cached_at = ?result.cached_at, "collection page ready");
    Ok(result.data)
  }

  /// Get a single item by id with caching. `None` means the API returned no record.
  pub async fn query_detail(&self, id: u32, policy: FetchPolicy) -> Result<Option<DetailRecord>> {
    let query_key = CatalogQueryKey::Detail { id };

    let result = self
      .cache
      .fetch(&query_key, self.detail_ttl, policy, || {
        let inner = self.inner.clone();
        async move { inner.get_detail(id).await }
      })
      .await?;

    debug!(id, source = ?result.source, cached_at = ?result.cached_at, "item detail ready");
    Ok(result.data)
  }

  /// Evict every cached result providing `tag`.
  pub fn invalidate(&self, tag: &str) -> Result<usize> {
    self.cache.invalidate(tag)
  }

  /// Drop every cached result.
  pub fn clear_cache(&self) -> Result<()> {
    self.cache.storage().clear()
  }
}
