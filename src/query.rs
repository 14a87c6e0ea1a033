//! Async query abstraction for data fetching.
//!
//! Inspired by TanStack Query, this module provides a `Query<T>` type that
//! encapsulates async data fetching, loading states, and error handling.
//!
//! # Example
//!
//! ```ignore
//! let client = catalog_client.clone();
//! let mut query = Query::new(move |policy| {
//!     let client = client.clone();
//!     async move { client.query_detail(25, policy).await.map_err(|e| e.to_string()) }
//! });
//!
//! // Start fetching
//! query.fetch();
//!
//! // In event loop tick
//! if query.poll() {
//!     // State changed, trigger re-render
//! }
//!
//! // In render
//! match query.status() {
//!     QueryStatus::Pending => render_spinner(),
//!     QueryStatus::Success => render_data(query.data()),
//!     QueryStatus::Error(e) => render_error(e),
//!     QueryStatus::Uninitialized => {}
//! }
//! ```

use std::future::Future;
use std::pin::Pin;
use tokio::sync::mpsc;

use crate::cache::FetchPolicy;

/// Outcome of the most recent fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryStatus {
  /// Query has not been started (or is skipped)
  Uninitialized,
  /// A fetch is in flight
  Pending,
  /// The last fetch completed successfully
  Success,
  /// The last fetch failed
  Error(String),
}

/// A boxed future that returns a Result<T, String>
type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send>>;

/// A factory function that creates futures for fetching data
type FetcherFn<T> = Box<dyn Fn(FetchPolicy) -> BoxFuture<T> + Send + Sync>;

/// Async query for data fetching with state management.
///
/// Query<T> encapsulates:
/// - The fetching logic (via a closure)
/// - The last successfully fetched value, kept across refetches
/// - Async result handling via channels
pub struct Query<T> {
  status: QueryStatus,
  data: Option<T>,
  fetcher: FetcherFn<T>,
  receiver: Option<mpsc::UnboundedReceiver<Result<T, String>>>,
  skip: bool,
}

impl<T: Send + 'static> Query<T> {
  /// Create a new query with the given fetcher function.
  ///
  /// The fetcher receives the cache policy to use: `CacheFirst` for `fetch()`
  /// and `NetworkOnly` for `refetch()`.
  pub fn new<F, Fut>(fetcher: F) -> Self
  where
    F: Fn(FetchPolicy) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, String>> + Send + 'static,
  {
    Self {
      status: QueryStatus::Uninitialized,
      data: None,
      fetcher: Box::new(move |policy| Box::pin(fetcher(policy))),
      receiver: None,
      skip: false,
    }
  }

  /// Never issue a request while `skip` is set.
  pub fn with_skip(mut self, skip: bool) -> Self {
    self.skip = skip;
    self
  }

  /// Get the status of the most recent fetch.
  pub fn status(&self) -> &QueryStatus {
    &self.status
  }

  /// Last successfully fetched value, if any.
  pub fn data(&self) -> Option<&T> {
    self.data.as_ref()
  }

  /// A fetch is in flight and there is no data yet.
  pub fn is_loading(&self) -> bool {
    self.is_fetching() && self.data.is_none()
  }

  /// Any fetch is in flight, including a background refetch.
  pub fn is_fetching(&self) -> bool {
    self.receiver.is_some()
  }

  /// Check if the last fetch failed.
  pub fn is_error(&self) -> bool {
    matches!(self.status, QueryStatus::Error(_))
  }

  /// Nothing has been requested yet.
  pub fn is_uninitialized(&self) -> bool {
    matches!(self.status, QueryStatus::Uninitialized)
  }

  /// Get the error message if the last fetch failed.
  pub fn error(&self) -> Option<&str> {
    match &self.status {
      QueryStatus::Error(e) => Some(e),
      _ => None,
    }
  }

  /// Start fetching data if not already fetching.
  ///
  /// This is a no-op if a fetch is in flight or the query is skipped.
  pub fn fetch(&mut self) {
    if self.skip || self.is_fetching() {
      return;
    }
    self.start_fetch(FetchPolicy::CacheFirst);
  }

  /// Force a network fetch, even if already fetching or data exists.
  ///
  /// A superseded in-flight result is discarded when it arrives.
  pub fn refetch(&mut self) {
    if self.skip {
      return;
    }
    // Drop the pending receiver so a late result has nowhere to go
    self.receiver = None;
    self.start_fetch(FetchPolicy::NetworkOnly);
  }

  /// Poll for results from a pending fetch.
  ///
  /// Returns `true` if the state changed (data arrived or error occurred).
  /// Call this in your event loop tick handler.
  pub fn poll(&mut self) -> bool {
    let receiver = match &mut self.receiver {
      Some(rx) => rx,
      None => return false,
    };

    // Try to receive without blocking
    match receiver.try_recv() {
      Ok(Ok(data)) => {
        self.status = QueryStatus::Success;
        self.data = Some(data);
        self.receiver = None;
        true
      }
      Ok(Err(error)) => {
        self.status = QueryStatus::Error(error);
        self.receiver = None;
        true
      }
      Err(mpsc::error::TryRecvError::Empty) => false,
      Err(mpsc::error::TryRecvError::Disconnected) => {
        // Sender dropped without sending - treat as error
        self.status = QueryStatus::Error("Query was cancelled".to_string());
        self.receiver = None;
        true
      }
    }
  }

  /// Internal: start the fetch operation
  fn start_fetch(&mut self, policy: FetchPolicy) {
    let (tx, rx) = mpsc::unbounded_channel();
    self.receiver = Some(rx);
    self.status = QueryStatus::Pending;

    let future = (self.fetcher)(policy);
    tokio::spawn(async move {
      let result = future.await;
      // Ignore send errors - receiver may have been dropped
      let _ = tx.send(result);
    });
  }
}

// Query is not Clone because the fetcher is boxed and receiver is owned.

impl<T: std::fmt::Debug> std::fmt::Debug for Query<T> {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Query")
      .field("status", &self.status)
      .field("data", &self.data)
      .field("fetching", &self.receiver.is_some())
      .field("skip", &self.skip)
      .finish_non_exhaustive()
  }
}
