mod app;
mod cache;
mod catalog;
mod commands;
mod config;
mod error;
mod event;
mod logging;
mod paging;
mod query;
mod route;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStorage, MemoryStorage, NoopStorage};
use crate::catalog::cached_client::CachedCatalogClient;
use crate::config::PageSize;

#[derive(Parser, Debug)]
#[command(name = "dex9s")]
#[command(about = "A terminal browser for paginated creature catalogs, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./dex9s.yaml, then $XDG_CONFIG_HOME/dex9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Route to open at startup, e.g. /pokemon/25
  #[arg(short, long)]
  open: Option<String>,

  /// Items fetched per page
  #[arg(long)]
  page_size: Option<usize>,

  /// API base URL (overrides DEX9S_API_BASE and the config file)
  #[arg(long)]
  api_base: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration, then let command-line flags win
  let mut config = config::Config::load(args.config.as_deref())?;
  if let Some(api_base) = args.api_base {
    config.api.base_url = api_base;
  }
  if let Some(page_size) = args.page_size {
    config.page_size = PageSize(page_size);
  }
  config.validate()?;

  // Keep the guard alive so buffered log lines are flushed on exit
  let _log_guard = logging::init(&config.log)?;
  info!(
    base_url = %config.api.base_url,
    collection = %config.api.collection,
    page_size = config.page_size.0,
    cache = config.cache.enabled,
    "starting dex9s"
  );

  // One cache for the whole process, shared by every query
  let storage: Arc<dyn CacheStorage> = if config.cache.enabled {
    Arc::new(MemoryStorage::new())
  } else {
    Arc::new(NoopStorage)
  };
  let client = CachedCatalogClient::new(&config, storage)?;

  let mut app = app::App::new(client, config.page_size.0);
  if let Some(route) = args.open.as_deref() {
    app.open(route);
  }
  app.run().await?;

  info!("exiting");
  Ok(())
}
