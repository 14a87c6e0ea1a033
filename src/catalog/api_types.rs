//! Serde-deserializable types matching the catalog API responses.
//!
//! These types are separate from domain types to allow clean deserialization
//! while keeping domain types focused on application needs.

use serde::Deserialize;
use url::Url;

use super::types::{Ability, DetailRecord, ListItem, Sprites, Stat};

// ============================================================================
// Common nested field types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiNamedResource {
  pub name: String,
  pub url: String,
}

// ============================================================================
// Collection endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiListResponse {
  #[serde(default)]
  pub count: Option<u64>,
  #[serde(default)]
  pub next: Option<String>,
  #[serde(default)]
  pub results: Vec<ApiNamedResource>,
}

// ============================================================================
// Single item endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiTypeSlot {
  pub slot: u32,
  #[serde(rename = "type")]
  pub kind: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiAbilitySlot {
  #[serde(default)]
  pub is_hidden: bool,
  #[serde(default)]
  pub slot: u32,
  pub ability: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiStat {
  pub base_stat: u32,
  #[serde(default)]
  pub effort: u32,
  pub stat: ApiNamedResource,
}

#[derive(Debug, Deserialize)]
pub struct ApiArtwork {
  pub front_default: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiOtherSprites {
  #[serde(rename = "official-artwork")]
  pub official_artwork: Option<ApiArtwork>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiSprites {
  pub front_default: Option<String>,
  pub back_default: Option<String>,
  pub front_shiny: Option<String>,
  pub back_shiny: Option<String>,
  pub other: Option<ApiOtherSprites>,
}

#[derive(Debug, Deserialize)]
pub struct ApiDetail {
  pub id: u32,
  pub name: String,
  #[serde(default)]
  pub height: u32,
  #[serde(default)]
  pub weight: u32,
  pub base_experience: Option<u32>,
  #[serde(default)]
  pub types: Vec<ApiTypeSlot>,
  #[serde(default)]
  pub abilities: Vec<ApiAbilitySlot>,
  #[serde(default)]
  pub stats: Vec<ApiStat>,
  #[serde(default)]
  pub sprites: ApiSprites,
}

// ============================================================================
// Conversions to domain types
// ============================================================================

impl ApiNamedResource {
  /// Convert to a list item, deriving the id from the resource URL.
  /// Returns None if the URL carries no positive numeric id.
  pub fn into_list_item(self) -> Option<ListItem> {
    let id = extract_id(&self.url)?;
    Some(ListItem {
      id,
      name: self.name,
      source_url: self.url,
    })
  }
}

impl From<ApiDetail> for DetailRecord {
  fn from(detail: ApiDetail) -> Self {
    let mut types = detail.types;
    types.sort_by_key(|t| t.slot);

    let official_artwork = detail
      .sprites
      .other
      .and_then(|o| o.official_artwork)
      .and_then(|a| a.front_default);

    DetailRecord {
      id: detail.id,
      name: detail.name,
      height: detail.height,
      weight: detail.weight,
      base_experience: detail.base_experience,
      types: types.into_iter().map(|t| t.kind.name).collect(),
      abilities: detail
        .abilities
        .into_iter()
        .map(|a| Ability {
          name: a.ability.name,
          hidden: a.is_hidden,
          slot: a.slot,
        })
        .collect(),
      stats: detail
        .stats
        .into_iter()
        .map(|s| Stat {
          name: s.stat.name,
          base_stat: s.base_stat,
          effort: s.effort,
        })
        .collect(),
      sprites: Sprites {
        front_default: detail.sprites.front_default,
        back_default: detail.sprites.back_default,
        front_shiny: detail.sprites.front_shiny,
        back_shiny: detail.sprites.back_shiny,
        official_artwork,
      },
    }
  }
}

// ============================================================================
// Helpers
// ============================================================================

/// Extract the trailing numeric path segment of a resource URL
/// ("https://host/api/v2/pokemon/25/" -> 25)
pub fn extract_id(url: &str) -> Option<u32> {
  let url = Url::parse(url).ok()?;
  let last = url.path_segments()?.rev().find(|s| !s.is_empty())?;
  if !last.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  last.parse::<u32>().ok().filter(|id| *id > 0)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_extract_id() {
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/1/"), Some(1));
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/25"), Some(25));
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/10001/"), Some(10001));
  }

  #[test]
  fn test_extract_id_rejects_non_numeric() {
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/"), None);
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/abc/"), None);
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/0/"), None);
    assert_eq!(extract_id("https://pokeapi.co/api/v2/pokemon/+5/"), None);
    assert_eq!(extract_id("not a url"), None);
  }

  #[test]
  fn test_list_response_into_items() {
    let body = r#"{
      "count": 1302,
      "next": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
      "previous": null,
      "results": [
        {"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"},
        {"name": "broken", "url": "https://pokeapi.co/api/v2/pokemon/x/"}
      ]
    }"#;

    let response: ApiListResponse = serde_json::from_str(body).unwrap();
    assert_eq!(response.count, Some(1302));

    let items: Vec<ListItem> = response
      .results
      .into_iter()
      .filter_map(ApiNamedResource::into_list_item)
      .collect();
    assert_eq!(
      items,
      vec![ListItem {
        id: 1,
        name: "bulbasaur".to_string(),
        source_url: "https://pokeapi.co/api/v2/pokemon/1/".to_string(),
      }]
    );
  }

  #[test]
  fn test_detail_conversion() {
    let body = r#"{
      "id": 1,
      "name": "bulbasaur",
      "height": 7,
      "weight": 69,
      "base_experience": 64,
      "types": [
        {"slot": 2, "type": {"name": "poison", "url": "https://pokeapi.co/api/v2/type/4/"}},
        {"slot": 1, "type": {"name": "grass", "url": "https://pokeapi.co/api/v2/type/12/"}}
      ],
      "abilities": [
        {"is_hidden": false, "slot": 1, "ability": {"name": "overgrow", "url": "https://pokeapi.co/api/v2/ability/65/"}},
        {"is_hidden": true, "slot": 3, "ability": {"name": "chlorophyll", "url": "https://pokeapi.co/api/v2/ability/34/"}}
      ],
      "stats": [
        {"base_stat": 45, "effort": 0, "stat": {"name": "hp", "url": "https://pokeapi.co/api/v2/stat/1/"}},
        {"base_stat": 65, "effort": 1, "stat": {"name": "special-attack", "url": "https://pokeapi.co/api/v2/stat/4/"}}
      ],
      "sprites": {
        "front_default": "front.png",
        "back_default": "back.png",
        "front_shiny": null,
        "back_shiny": null,
        "other": {"official-artwork": {"front_default": "art.png", "front_shiny": null}}
      },
      "moves": []
    }"#;

    let detail: ApiDetail = serde_json::from_str(body).unwrap();
    let record = DetailRecord::from(detail);

    assert_eq!(record.types, vec!["grass", "poison"]);
    assert_eq!(record.abilities.len(), 2);
    assert!(record.abilities[1].hidden);
    assert_eq!(record.stats[1].name, "special-attack");
    assert_eq!(record.stats[1].effort, 1);
    assert_eq!(record.sprites.official_artwork.as_deref(), Some("art.png"));
    assert_eq!(record.sprites.back_default.as_deref(), Some("back.png"));
  }
}
