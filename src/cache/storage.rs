//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Duration, Utc};
use color_eyre::{eyre::eyre, Result};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// A single cached query result.
#[derive(Debug, Clone)]
pub struct CachedEntry {
  /// The cached value, serialized
  pub data: Value,
  /// When the value was cached
  pub cached_at: DateTime<Utc>,
  /// When the value stops being served
  pub expires_at: DateTime<Utc>,
  /// Tags provided by the query that produced this value
  pub tags: BTreeSet<String>,
}

impl CachedEntry {
  pub fn new(data: Value, ttl: Duration, tags: &[String]) -> Self {
    let cached_at = Utc::now();
    Self {
      data,
      cached_at,
      // Saturate to "never expires" rather than overflow
      expires_at: cached_at
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC),
      tags: tags.iter().cloned().collect(),
    }
  }

  pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
    now >= self.expires_at
  }
}

/// Trait for cache storage backends.
pub trait CacheStorage: Send + Sync {
  /// Get an entry if present and not expired. Expired entries are evicted.
  fn get(&self, key: &str) -> Result<Option<CachedEntry>>;

  /// Store or replace an entry.
  fn set(&self, key: &str, data: Value, ttl: Duration, tags: &[String]) -> Result<()>;

  /// Evict every entry providing `tag`. Returns the number evicted.
  fn invalidate(&self, tag: &str) -> Result<usize>;

  /// Evict everything.
  fn clear(&self) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _key: &str) -> Result<Option<CachedEntry>> {
    Ok(None) // Always miss
  }

  fn set(&self, _key: &str, _data: Value, _ttl: Duration, _tags: &[String]) -> Result<()> {
    Ok(()) // Discard
  }

  fn invalidate(&self, _tag: &str) -> Result<usize> {
    Ok(0)
  }

  fn clear(&self) -> Result<()> {
    Ok(())
  }
}

/// Session-scoped storage. Nothing outlives the process.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CachedEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Number of live and not-yet-evicted entries.
  pub fn len(&self) -> Result<usize> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.len())
  }
}

impl CacheStorage for MemoryStorage {
  fn get(&self, key: &str) -> Result<Option<CachedEntry>> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    match entries.get(key) {
      Some(entry) if entry.is_expired_at(Utc::now()) => {
        entries.remove(key);
        Ok(None)
      }
      Some(entry) => Ok(Some(entry.clone())),
      None => Ok(None),
    }
  }

  fn set(&self, key: &str, data: Value, ttl: Duration, tags: &[String]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    entries.insert(key.to_string(), CachedEntry::new(data, ttl, tags));
    Ok(())
  }

  fn invalidate(&self, tag: &str) -> Result<usize> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    let before = entries.len();
    entries.retain(|_, entry| !entry.tags.contains(tag));
    Ok(before - entries.len())
  }

  fn clear(&self) -> Result<()> {
    self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?
      .clear();
    Ok(())
  }
}
