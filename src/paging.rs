//! Incremental ("load more") pagination on top of `Query`.
//!
//! `InfiniteQuery` requests one page at a time and folds every page that
//! arrives into a single de-duplicated list, so a view only ever deals with
//! "the items so far" and a `load_more()` call.

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cache::{Cacheable, FetchPolicy};
use crate::query::Query;

/// Fetches `limit` items starting at `offset`.
type PageFetcher<T> =
  Arc<dyn Fn(usize, usize, FetchPolicy) -> BoxFuture<'static, Result<Page<T>, String>> + Send + Sync>;

/// One page as delivered by the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
  pub items: Vec<T>,
  /// Entries the endpoint returned, including any dropped while mapping.
  /// End of collection is judged on this, not on `items.len()`.
  pub fetched: usize,
}

impl<T> Page<T> {
  pub fn new(items: Vec<T>, fetched: usize) -> Self {
    Self { items, fetched }
  }
}

impl<T> From<Vec<T>> for Page<T> {
  fn from(items: Vec<T>) -> Self {
    let fetched = items.len();
    Self { items, fetched }
  }
}

/// Ordered list of items with no repeated cache key.
#[derive(Debug, Clone)]
pub struct PageAccumulator<T> {
  items: Vec<T>,
  seen: HashSet<String>,
}

impl<T> Default for PageAccumulator<T> {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      seen: HashSet::new(),
    }
  }
}

impl<T: Cacheable> PageAccumulator<T> {
  pub fn new() -> Self {
    Self::default()
  }

  /// Append every item of `page` not already present. Items already present
  /// keep their original position. Returns the number appended.
  pub fn merge(&mut self, page: &[T]) -> usize {
    let before = self.items.len();
    for item in page {
      if self.seen.insert(item.cache_key()) {
        self.items.push(item.clone());
      }
    }
    self.items.len() - before
  }

  pub fn items(&self) -> &[T] {
    &self.items
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn clear(&mut self) {
    self.items.clear();
    self.seen.clear();
  }
}

/// Paginated query that accumulates pages into one list.
pub struct InfiniteQuery<T> {
  page_size: usize,
  page_index: usize,
  accumulated: PageAccumulator<T>,
  /// Raw length of the most recently arrived page
  last_page_len: Option<usize>,
  fetch_page: PageFetcher<T>,
  query: Query<Page<T>>,
}

impl<T: Cacheable> InfiniteQuery<T> {
  /// Create the query and start fetching the first page.
  pub fn new<F, Fut>(page_size: usize, fetcher: F) -> Self
  where
    F: Fn(usize, usize, FetchPolicy) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Page<T>, String>> + Send + 'static,
  {
    let fetch_page: PageFetcher<T> =
      Arc::new(move |limit, offset, policy| fetcher(limit, offset, policy).boxed());
    let query = Self::page_query(&fetch_page, page_size, 0);

    let mut this = Self {
      page_size,
      page_index: 0,
      accumulated: PageAccumulator::new(),
      last_page_len: None,
      fetch_page,
      query,
    };
    this.query.fetch();
    this
  }

  fn page_query(fetch_page: &PageFetcher<T>, limit: usize, offset: usize) -> Query<Page<T>> {
    let fetch_page = Arc::clone(fetch_page);
    Query::new(move |policy| fetch_page(limit, offset, policy))
  }

  /// Replace the current page query with one for `page_index` and start it.
  /// The replaced query's receiver is dropped, so its late result is ignored.
  fn issue_current_page(&mut self) {
    let offset = self.current_offset();
    debug!(page = self.page_index, offset, "requesting page");
    self.query = Self::page_query(&self.fetch_page, self.page_size, offset);
    self.query.fetch();
  }

  /// Drive the current page query. Returns `true` if the state changed.
  pub fn poll(&mut self) -> bool {
    if !self.query.poll() {
      return false;
    }
    if let Some(page) = self.query.data().cloned() {
      self.on_page_arrival(&page);
    }
    true
  }

  /// Merge a delivered page. Re-delivery of a page already merged changes
  /// nothing.
  pub fn on_page_arrival(&mut self, page: &Page<T>) {
    let added = self.accumulated.merge(&page.items);
    self.last_page_len = Some(page.fetched);
    debug!(
      page = self.page_index,
      fetched = page.fetched,
      received = page.items.len(),
      added,
      total = self.accumulated.len(),
      "page merged"
    );
  }

  /// Request the next page.
  ///
  /// No-op (returns `false`) while a fetch is in flight or once the
  /// collection is exhausted. After a failed page the same page is retried.
  pub fn load_more(&mut self) -> bool {
    if self.is_fetching() || !self.has_more() {
      return false;
    }
    if !self.is_error() {
      self.page_index += 1;
    }
    self.issue_current_page();
    true
  }

  /// Start over from the first page with an empty list.
  ///
  /// The first page still honors cache freshness.
  pub fn refetch(&mut self) {
    info!(page_size = self.page_size, "restarting pagination");
    self.accumulated.clear();
    self.page_index = 0;
    self.last_page_len = None;
    self.issue_current_page();
  }

  /// Accumulated items in fetch order.
  pub fn items(&self) -> &[T] {
    self.accumulated.items()
  }

  /// The most recently arrived page, if any.
  pub fn current_page(&self) -> Option<&[T]> {
    self.query.data().map(|page| page.items.as_slice())
  }

  pub fn page_index(&self) -> usize {
    self.page_index
  }

  /// Offset the current page query targets.
  pub fn current_offset(&self) -> usize {
    self.page_index * self.page_size
  }

  pub fn is_fetching(&self) -> bool {
    self.query.is_fetching()
  }

  /// Initial load: fetching with nothing to show yet.
  pub fn is_loading(&self) -> bool {
    self.is_fetching() && self.accumulated.is_empty()
  }

  /// Fetching another page below already loaded items.
  pub fn is_loading_more(&self) -> bool {
    self.is_fetching() && !self.accumulated.is_empty()
  }

  /// The endpoint's last page was full, so there may be more.
  pub fn has_more(&self) -> bool {
    self.last_page_len == Some(self.page_size)
  }

  pub fn is_error(&self) -> bool {
    self.query.is_error()
  }

  pub fn error(&self) -> Option<&str> {
    self.query.error()
  }

  pub fn total_loaded(&self) -> usize {
    self.accumulated.len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::types::ListItem;
  use proptest::prelude::*;
  use std::sync::atomic::{AtomicUsize, Ordering};
  use std::sync::Mutex;
  use std::time::Duration;

  fn item(id: u32, name: &str) -> ListItem {
    ListItem {
      id,
      name: name.to_string(),
      source_url: format!("https://pokeapi.co/api/v2/pokemon/{}/", id),
    }
  }

  fn items(ids: std::ops::Range<u32>) -> Vec<ListItem> {
    ids.map(|id| item(id, &format!("item-{}", id))).collect()
  }

  /// Serves a collection of `total` items, recording every (limit, offset) requested.
  fn collection(
    total: u32,
    requests: Arc<Mutex<Vec<(usize, usize)>>>,
  ) -> impl Fn(usize, usize, FetchPolicy) -> BoxFuture<'static, Result<Page<ListItem>, String>>
       + Send
       + Sync
       + 'static {
    move |limit, offset, _| {
      requests.lock().unwrap().push((limit, offset));
      let start = (offset as u32 + 1).min(total + 1);
      let end = (offset as u32 + limit as u32 + 1).min(total + 1);
      async move { Ok(Page::from(items(start..end))) }.boxed()
    }
  }

  async fn settle(query: &mut InfiniteQuery<ListItem>) {
    for _ in 0..200 {
      query.poll();
      if !query.is_fetching() {
        return;
      }
      tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("query did not settle");
  }

  #[tokio::test]
  async fn test_short_first_page_has_no_more() {
    let mut query = InfiniteQuery::new(20, |_, _, _| async {
      Ok(Page::from(vec![
        item(1, "bulbasaur"),
        item(2, "ivysaur"),
        item(3, "venusaur"),
      ]))
    });

    assert!(query.is_loading());
    assert!(!query.is_loading_more());
    settle(&mut query).await;

    assert_eq!(query.total_loaded(), 3);
    assert!(!query.has_more());
    assert!(!query.is_loading());
    assert_eq!(query.items()[0].name, "bulbasaur");
  }

  #[tokio::test]
  async fn test_full_page_has_more_and_load_more_advances_offset() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut query = InfiniteQuery::new(20, collection(45, requests.clone()));
    settle(&mut query).await;

    assert!(query.has_more());
    assert_eq!(query.current_page().map(|p| p.len()), Some(20));

    assert!(query.load_more());
    assert_eq!(query.current_offset(), 20);
    assert!(query.is_loading_more());
    settle(&mut query).await;

    assert!(query.load_more());
    settle(&mut query).await;

    assert_eq!(query.total_loaded(), 45);
    assert!(!query.has_more());
    assert!(!query.load_more());
    assert_eq!(*requests.lock().unwrap(), vec![(20, 0), (20, 20), (20, 40)]);
  }

  #[tokio::test]
  async fn test_load_more_while_fetching_is_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let mut query = InfiniteQuery::new(2, move |_, offset, _| {
      calls_clone.fetch_add(1, Ordering::SeqCst);
      async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(Page::from(items(offset as u32 + 1..offset as u32 + 3)))
      }
    });
    settle(&mut query).await;
    assert!(query.load_more());
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    // Page 1 is in flight
    assert!(query.is_fetching());
    assert!(!query.load_more());
    assert!(!query.load_more());
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert_eq!(query.page_index(), 1);
  }

  #[tokio::test]
  async fn test_load_more_when_exhausted_is_noop() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let mut query = InfiniteQuery::new(20, move |_, _, _| {
      calls_clone.fetch_add(1, Ordering::SeqCst);
      async { Ok(Page::from(items(1..3))) }
    });
    settle(&mut query).await;

    assert!(!query.has_more());
    assert!(!query.load_more());
    assert_eq!(query.page_index(), 0);
    assert_eq!(query.total_loaded(), 2);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_redelivered_page_is_idempotent() {
    let mut query = InfiniteQuery::new(3, |_, _, _| async { Ok(Page::from(items(1..4))) });
    settle(&mut query).await;
    let before: Vec<u32> = query.items().iter().map(|i| i.id).collect();

    let page = Page::from(items(1..4));
    query.on_page_arrival(&page);
    query.on_page_arrival(&page);

    let after: Vec<u32> = query.items().iter().map(|i| i.id).collect();
    assert_eq!(before, after);
    assert!(query.has_more());
  }

  #[tokio::test]
  async fn test_overlapping_pages_keep_first_position() {
    let mut query = InfiniteQuery::new(3, |_, _, _| async { Ok(Page::from(items(1..4))) });
    settle(&mut query).await;

    query.on_page_arrival(&Page::from(vec![
      item(3, "item-3"),
      item(4, "item-4"),
      item(1, "item-1"),
    ]));

    let ids: Vec<u32> = query.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert!(query.has_more());
  }

  #[tokio::test]
  async fn test_refetch_resets_to_first_page() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut query = InfiniteQuery::new(10, collection(100, requests.clone()));
    settle(&mut query).await;
    query.load_more();
    settle(&mut query).await;
    assert_eq!(query.total_loaded(), 20);

    query.refetch();
    assert!(query.items().is_empty());
    assert_eq!(query.page_index(), 0);
    assert_eq!(query.current_offset(), 0);
    assert!(!query.has_more());
    assert!(query.is_loading());

    settle(&mut query).await;
    assert_eq!(query.total_loaded(), 10);
    assert_eq!(requests.lock().unwrap().last(), Some(&(10, 0)));
  }

  #[tokio::test]
  async fn test_slow_page_after_refetch_is_discarded() {
    let mut query = InfiniteQuery::new(2, |_, offset, _| async move {
      if offset > 0 {
        tokio::time::sleep(Duration::from_millis(80)).await;
      }
      Ok(Page::from(items(offset as u32 + 1..offset as u32 + 3)))
    });
    settle(&mut query).await;

    // Page 1 is slow; restart before it lands
    assert!(query.load_more());
    query.refetch();
    settle(&mut query).await;

    tokio::time::sleep(Duration::from_millis(120)).await;
    query.poll();

    let ids: Vec<u32> = query.items().iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(query.page_index(), 0);
  }

  #[tokio::test]
  async fn test_error_propagates() {
    let mut query: InfiniteQuery<ListItem> =
      InfiniteQuery::new(20, |_, _, _| async { Err("Request failed".to_string()) });
    settle(&mut query).await;

    assert!(query.is_error());
    assert_eq!(query.error(), Some("Request failed"));
    assert!(!query.has_more());
    assert!(!query.load_more());
  }

  #[tokio::test]
  async fn test_load_more_after_failed_page_retries_same_offset() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let requests_clone = requests.clone();
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let mut query = InfiniteQuery::new(2, move |limit, offset, _| {
      requests_clone.lock().unwrap().push((limit, offset));
      let n = calls_clone.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 1 {
          Err("timeout".to_string())
        } else {
          Ok(Page::from(items(offset as u32 + 1..offset as u32 + 3)))
        }
      }
    });
    settle(&mut query).await;
    query.load_more();
    settle(&mut query).await;
    assert!(query.is_error());
    assert_eq!(query.total_loaded(), 2);

    assert!(query.load_more());
    settle(&mut query).await;

    assert!(!query.is_error());
    assert_eq!(query.total_loaded(), 4);
    assert_eq!(*requests.lock().unwrap(), vec![(2, 0), (2, 2), (2, 2)]);
  }

  #[tokio::test]
  async fn test_refetch_after_error_recovers() {
    let calls = Arc::new(AtomicUsize::new(0));
    let calls_clone = calls.clone();
    let mut query = InfiniteQuery::new(20, move |_, _, _| {
      let n = calls_clone.fetch_add(1, Ordering::SeqCst);
      async move {
        if n == 0 {
          Err("offline".to_string())
        } else {
          Ok(Page::from(items(1..4)))
        }
      }
    });
    settle(&mut query).await;
    assert!(query.is_error());

    query.refetch();
    settle(&mut query).await;
    assert!(!query.is_error());
    assert_eq!(query.total_loaded(), 3);
  }

  #[tokio::test]
  async fn test_dropped_entries_do_not_end_pagination() {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let requests_clone = requests.clone();
    let mut query = InfiniteQuery::new(20, move |limit, offset, _| {
      requests_clone.lock().unwrap().push((limit, offset));
      let start = offset as u32 + 1;
      // One entry of the first page could not be mapped
      let page = if offset == 0 {
        Page::new(items(start..start + 19), 20)
      } else {
        Page::from(items(start..start + 5))
      };
      async move { Ok(page) }
    });
    settle(&mut query).await;

    assert_eq!(query.total_loaded(), 19);
    assert!(query.has_more());
    assert!(query.load_more());
    settle(&mut query).await;

    assert_eq!(query.total_loaded(), 24);
    assert!(!query.has_more());
    assert_eq!(*requests.lock().unwrap(), vec![(20, 0), (20, 20)]);
  }

  proptest! {
    #[test]
    fn prop_merge_never_duplicates(pages in prop::collection::vec(prop::collection::vec(1u32..60, 0..25), 0..12)) {
      let mut acc = PageAccumulator::new();
      let mut expected: Vec<u32> = Vec::new();

      for page in &pages {
        let page: Vec<ListItem> = page.iter().map(|id| item(*id, "x")).collect();
        acc.merge(&page);
        // Re-delivery never changes anything
        let snapshot = acc.items().to_vec();
        acc.merge(&page);
        prop_assert_eq!(acc.items(), snapshot.as_slice());

        for it in &page {
          if !expected.contains(&it.id) {
            expected.push(it.id);
          }
        }
      }

      let ids: Vec<u32> = acc.items().iter().map(|i| i.id).collect();
      let unique: HashSet<u32> = ids.iter().copied().collect();
      prop_assert_eq!(unique.len(), ids.len());
      prop_assert_eq!(ids, expected);
    }
  }
}
