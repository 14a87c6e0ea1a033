use serde::{Deserialize, Serialize};

/// Entry of a collection page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
  pub id: u32,
  pub name: String,
  pub source_url: String,
}

/// Full item details
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetailRecord {
  pub id: u32,
  pub name: String,
  /// Decimetres
  pub height: u32,
  /// Hectograms
  pub weight: u32,
  pub base_experience: Option<u32>,
  /// Type names ordered by slot
  pub types: Vec<String>,
  pub abilities: Vec<Ability>,
  pub stats: Vec<Stat>,
  pub sprites: Sprites,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
  pub name: String,
  pub hidden: bool,
  pub slot: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
  pub name: String,
  pub base_stat: u32,
  pub effort: u32,
}

/// Image references
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
  pub front_default: Option<String>,
  pub back_default: Option<String>,
  pub front_shiny: Option<String>,
  pub back_shiny: Option<String>,
  pub official_artwork: Option<String>,
}

impl DetailRecord {
  /// Sum of all base stats
  pub fn total_stats(&self) -> u32 {
    self.stats.iter().map(|s| s.base_stat).sum()
  }

  /// Official artwork if available, otherwise the default front sprite
  pub fn primary_image(&self) -> Option<&str> {
    self
      .sprites
      .official_artwork
      .as_deref()
      .or(self.sprites.front_default.as_deref())
  }
}

impl Sprites {
  /// Labelled sprite URLs that are present, in display order
  pub fn gallery(&self) -> Vec<(&'static str, &str)> {
    [
      ("Front Default", &self.front_default),
      ("Back Default", &self.back_default),
      ("Front Shiny", &self.front_shiny),
      ("Back Shiny", &self.back_shiny),
    ]
    .into_iter()
    .filter_map(|(label, src)| src.as_deref().map(|s| (label, s)))
    .collect()
  }
}
