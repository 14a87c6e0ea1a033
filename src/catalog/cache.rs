//! Caching implementations for catalog types.

use sha2::{Digest, Sha256};

use crate::cache::{Cacheable, QueryKey};

use super::types::{DetailRecord, ListItem};

/// Tag provided by every collection page.
pub const COLLECTION_TAG: &str = "collection";

/// Tag provided by every item detail, for coarse invalidation.
pub const PARTIAL_ITEM_TAG: &str = "item:partial";

// ============================================================================
// Cacheable implementations
// ============================================================================

impl Cacheable for ListItem {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }
}

impl Cacheable for DetailRecord {
  fn cache_key(&self) -> String {
    self.id.to_string()
  }
}

// ============================================================================
// Query key types
// ============================================================================

/// Query key types for catalog API calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogQueryKey {
  /// One page of the collection
  Collection { limit: usize, offset: usize },
  /// A single item by id
  Detail { id: u32 },
}

impl CatalogQueryKey {
  /// Normalized argument signature
  fn signature(&self) -> String {
    match self {
      Self::Collection { limit, offset } => {
        format!("collection(limit:{},offset:{})", limit, offset)
      }
      Self::Detail { id } => format!("detail(id:{})", id),
    }
  }
}

impl QueryKey for CatalogQueryKey {
  fn cache_hash(&self) -> String {
    // SHA256 hash for stable, fixed-length keys
    let mut hasher = Sha256::new();
    hasher.update(self.signature().as_bytes());
    let result = hasher.finalize();
    hex::encode(result)
  }

  fn description(&self) -> String {
    match self {
      Self::Collection { limit, offset } => {
        format!("{} items from offset {}", limit, offset)
      }
      Self::Detail { id } => format!("item {}", id),
    }
  }

  fn tags(&self) -> Vec<String> {
    match self {
      Self::Collection { limit, offset } => vec![
        COLLECTION_TAG.to_string(),
        format!("{}:{}-{}", COLLECTION_TAG, limit, offset),
      ],
      Self::Detail { id } => vec![
        format!("item:{}", id),
        PARTIAL_ITEM_TAG.to_string(),
      ],
    }
  }
}
