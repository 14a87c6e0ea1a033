use crate::catalog::api_types::{ApiDetail, ApiListResponse, ApiNamedResource};
use crate::catalog::types::{DetailRecord, ListItem};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::paging::Page;
use color_eyre::{eyre::eyre, Result};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

/// Catalog API client wrapper
#[derive(Clone)]
pub struct CatalogClient {
  http: Client,
  base_url: String,
  collection: String,
}

impl CatalogClient {
  pub fn new(config: &ApiConfig) -> Result<Self> {
    let http = Client::builder()
      .user_agent(concat!("dex9s/", env!("CARGO_PKG_VERSION")))
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self {
      http,
      base_url: config.base_url.trim_end_matches('/').to_string(),
      collection: config.collection.trim_matches('/').to_string(),
    })
  }

  pub fn base_url(&self) -> &str {
    &self.base_url
  }

  pub fn collection(&self) -> &str {
    &self.collection
  }

  fn collection_url(&self) -> String {
    format!("{}/{}", self.base_url, self.collection)
  }

  /// Get one page of the collection. `fetched` counts every entry returned,
  /// including ones skipped for lacking a numeric id.
  pub async fn get_page(&self, limit: usize, offset: usize) -> Result<Page<ListItem>, ApiError> {
    let url = self.collection_url();
    let response = self
      .http
      .get(&url)
      .query(&[("limit", limit), ("offset", offset)])
      .send()
      .await?;

    let page: ApiListResponse = read_json(response).await?;
    debug!(
      limit,
      offset,
      received = page.results.len(),
      total = ?page.count,
      last_page = page.next.is_none(),
      "fetched collection page"
    );

    let fetched = page.results.len();
    let items = page
      .results
      .into_iter()
      .filter_map(|entry| {
        let url = entry.url.clone();
        let item = ApiNamedResource::into_list_item(entry);
        if item.is_none() {
          warn!(url = %url, "skipping entry without a numeric id");
        }
        item
      })
      .collect();

    Ok(Page::new(items, fetched))
  }

  /// Get a single item by id. A `null` body means the item does not exist.
  pub async fn get_detail(&self, id: u32) -> Result<Option<DetailRecord>, ApiError> {
    let url = format!("{}/{}", self.collection_url(), id);
    let response = self.http.get(&url).send().await?;

    let detail: Option<ApiDetail> = read_json(response).await?;
    debug!(id, found = detail.is_some(), "fetched item detail");

    Ok(detail.map(DetailRecord::from))
  }
}

/// Reject non-2xx responses, then decode the body.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
  let status = response.status();
  if !status.is_success() {
    return Err(ApiError::Status {
      status: status.as_u16(),
      url: response.url().to_string(),
    });
  }

  let bytes = response.bytes().await?;
  Ok(serde_json::from_slice(&bytes)?)
}
