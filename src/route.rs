//! Route parsing for the `--open` flag and the `show` command.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
  #[error("invalid identifier: {0:?}")]
  InvalidIdentifier(String),
}

/// Parse a route parameter as a strictly positive item id.
///
/// Only ASCII digits are accepted, so signs, whitespace inside the value and
/// anything that overflows `u32` are rejected along with `0`.
pub fn parse_item_id(param: &str) -> Result<u32, RouteError> {
  let trimmed = param.trim();
  if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
    return Err(RouteError::InvalidIdentifier(param.to_string()));
  }
  match trimmed.parse::<u32>() {
    Ok(id) if id > 0 => Ok(id),
    _ => Err(RouteError::InvalidIdentifier(param.to_string())),
  }
}

/// A navigable location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
  /// The paginated collection list
  Collection,
  /// Detail for the raw (not yet validated) parameter
  Detail(String),
}

impl Route {
  /// Map a path onto a route.
  ///
  /// `/` and the empty path are the collection, as is `/{collection}`.
  /// `/{collection}/{param}` and a bare `{param}` are detail routes; the
  /// parameter is validated by the detail view. Anything else falls back to
  /// the collection.
  pub fn parse(path: &str) -> Self {
    let segments: Vec<&str> = path
      .trim()
      .split('/')
      .filter(|s| !s.is_empty())
      .collect();

    match segments.as_slice() {
      [] => Route::Collection,
      [single] if path.trim().starts_with('/') => {
        // `/{param}` with a numeric param still opens the detail
        if parse_item_id(single).is_ok() {
          Route::Detail(single.to_string())
        } else {
          Route::Collection
        }
      }
      [single] => Route::Detail(single.to_string()),
      [_collection, param] => Route::Detail(param.to_string()),
      _ => Route::Collection,
    }
  }

  /// Validated item id for a detail route.
  pub fn item_id(&self) -> Option<Result<u32, RouteError>> {
    match self {
      Route::Collection => None,
      Route::Detail(param) => Some(parse_item_id(param)),
    }
  }
}
