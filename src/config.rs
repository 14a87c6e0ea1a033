use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use url::Url;

/// Built-in API root, used when neither the environment nor the config file set one.
pub const DEFAULT_API_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Environment variable overriding the API base URL.
pub const API_BASE_ENV: &str = "DEX9S_API_BASE";

/// Longest accepted cache TTL (one year).
pub const MAX_TTL_SECS: u64 = 365 * 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub api: ApiConfig,
  pub page_size: PageSize,
  pub cache: CacheConfig,
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
  pub base_url: String,
  /// Path segment of the collection endpoint (e.g., "pokemon")
  pub collection: String,
  pub timeout_secs: u64,
}

impl Default for ApiConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_API_BASE_URL.to_string(),
      collection: "pokemon".to_string(),
      timeout_secs: 30,
    }
  }
}

/// Number of items requested per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct PageSize(pub usize);

impl Default for PageSize {
  fn default() -> Self {
    PageSize(20)
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  /// Disable to send every query to the network
  pub enabled: bool,
  /// Collection pages change rarely
  pub list_ttl_secs: u64,
  /// Item details change even more rarely
  pub detail_ttl_secs: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: true,
      list_ttl_secs: 15 * 60,
      detail_ttl_secs: 30 * 60,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Default filter directive when DEX9S_LOG is unset
  pub level: String,
  /// Log directory (default: $XDG_DATA_HOME/dex9s/logs)
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./dex9s.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/dex9s/config.yaml
  ///
  /// Everything has a default, so a missing file is not an error unless it
  /// was asked for explicitly.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Config::default(),
    };

    Ok(config.with_env_overrides())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("dex9s.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("dex9s").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    let config: Config = serde_yaml::from_str(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))?;

    Ok(config)
  }

  /// Apply the DEX9S_API_BASE override, if set and non-empty.
  fn with_env_overrides(mut self) -> Self {
    if let Some(base) = Self::api_base_from_env() {
      self.api.base_url = base;
    }
    self
  }

  fn api_base_from_env() -> Option<String> {
    std::env::var(API_BASE_ENV)
      .ok()
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty())
  }

  /// Check values that serde can't.
  pub fn validate(&self) -> Result<()> {
    if self.page_size.0 == 0 {
      return Err(eyre!("page_size must be greater than zero"));
    }

    let url = Url::parse(&self.api.base_url)
      .map_err(|e| eyre!("Invalid API base URL '{}': {}", self.api.base_url, e))?;
    if !matches!(url.scheme(), "http" | "https") {
      return Err(eyre!(
        "API base URL must use http or https: {}",
        self.api.base_url
      ));
    }

    if self.api.collection.trim_matches('/').is_empty() {
      return Err(eyre!("api.collection must not be empty"));
    }

    for (name, secs) in [
      ("cache.list_ttl_secs", self.cache.list_ttl_secs),
      ("cache.detail_ttl_secs", self.cache.detail_ttl_secs),
    ] {
      if secs > MAX_TTL_SECS {
        return Err(eyre!(
          "{} must be at most {} seconds, got {}",
          name,
          MAX_TTL_SECS,
          secs
        ));
      }
    }

    Ok(())
  }

  pub fn list_ttl(&self) -> chrono::Duration {
    ttl_from_secs(self.cache.list_ttl_secs)
  }

  pub fn detail_ttl(&self) -> chrono::Duration {
    ttl_from_secs(self.cache.detail_ttl_secs)
  }
}

/// Out-of-range values clamp to the largest representable duration.
fn ttl_from_secs(secs: u64) -> chrono::Duration {
  i64::try_from(secs)
    .ok()
    .and_then(chrono::Duration::try_seconds)
    .unwrap_or(chrono::Duration::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_config(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, DEFAULT_API_BASE_URL);
    assert_eq!(config.api.collection, "pokemon");
    assert_eq!(config.page_size, PageSize(20));
    assert_eq!(config.list_ttl(), chrono::Duration::minutes(15));
    assert_eq!(config.detail_ttl(), chrono::Duration::minutes(30));
    assert!(config.cache.enabled);
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_load_partial_file_keeps_defaults() {
    let file = write_config("page_size: 50\ncache:\n  list_ttl_secs: 60\n");

    let config = Config::load_from_path(file.path()).unwrap();

    assert_eq!(config.page_size, PageSize(50));
    assert_eq!(config.cache.list_ttl_secs, 60);
    assert_eq!(config.cache.detail_ttl_secs, 30 * 60);
    assert_eq!(config.api.collection, "pokemon");
  }

  #[test]
  fn test_load_full_file() {
    let file = write_config(
      r#"
api:
  base_url: http://localhost:8080/api
  collection: creatures
  timeout_secs: 5
page_size: 10
cache:
  enabled: false
log:
  level: debug
  dir: /tmp/dex9s-logs
"#,
    );

    let config = Config::load_from_path(file.path()).unwrap();

    assert_eq!(config.api.base_url, "http://localhost:8080/api");
    assert_eq!(config.api.collection, "creatures");
    assert_eq!(config.api.timeout_secs, 5);
    assert_eq!(config.page_size, PageSize(10));
    assert!(!config.cache.enabled);
    assert_eq!(config.log.level, "debug");
    assert_eq!(config.log.dir, Some(PathBuf::from("/tmp/dex9s-logs")));
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    let err = Config::load(Some(Path::new("/definitely/not/here.yaml"))).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
  }

  #[test]
  fn test_malformed_file_is_error() {
    let file = write_config("page_size: [not, a, number]\n");
    assert!(Config::load_from_path(file.path()).is_err());
  }

  #[test]
  fn test_validate_rejects_zero_page_size() {
    let config = Config {
      page_size: PageSize(0),
      ..Config::default()
    };
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_bad_base_url() {
    let mut config = Config::default();
    config.api.base_url = "not a url".to_string();
    assert!(config.validate().is_err());

    config.api.base_url = "ftp://example.com".to_string();
    assert!(config.validate().is_err());
  }

  #[test]
  fn test_validate_rejects_huge_ttl() {
    let file = write_config("cache:\n  list_ttl_secs: 10000000000000\n");
    let config = Config::load_from_path(file.path()).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("cache.list_ttl_secs"));

    let mut config = Config::default();
    config.cache.detail_ttl_secs = MAX_TTL_SECS + 1;
    assert!(config.validate().is_err());

    config.cache.detail_ttl_secs = MAX_TTL_SECS;
    assert!(config.validate().is_ok());
  }

  #[test]
  fn test_ttl_conversion_saturates() {
    let mut config = Config::default();
    config.cache.list_ttl_secs = u64::MAX;
    assert_eq!(config.list_ttl(), chrono::Duration::MAX);
  }
}
