//! Error types for catalog API requests.

use thiserror::Error;

/// Failure of a single API request.
///
/// Cloneable so every waiter on a coalesced request observes the same outcome.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
  #[error("Network error: {0}")]
  Network(String),

  #[error("Request to {url} failed with status {status}")]
  Status { status: u16, url: String },

  #[error("Failed to decode response: {0}")]
  Decode(String),
}

impl From<reqwest::Error> for ApiError {
  fn from(e: reqwest::Error) -> Self {
    if e.is_decode() {
      ApiError::Decode(e.to_string())
    } else {
      ApiError::Network(e.to_string())
    }
  }
}

impl From<serde_json::Error> for ApiError {
  fn from(e: serde_json::Error) -> Self {
    ApiError::Decode(e.to_string())
  }
}
