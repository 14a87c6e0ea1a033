use ratatui::prelude::Color;

/// Truncate a string to a maximum length, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Color for a base stat value, greener as it gets higher
pub fn stat_color(value: u32) -> Color {
  match value {
    100.. => Color::Rgb(0x4c, 0xaf, 0x50),
    80..=99 => Color::Rgb(0x8b, 0xc3, 0x4a),
    60..=79 => Color::Rgb(0xff, 0xeb, 0x3b),
    40..=59 => Color::Rgb(0xff, 0x98, 0x00),
    _ => Color::Rgb(0xf4, 0x43, 0x36),
  }
}

/// Badge color for an elemental type tag
pub fn type_color(kind: &str) -> Color {
  let rgb = match kind.to_ascii_lowercase().as_str() {
    "normal" => 0xA8A878,
    "fire" => 0xF08030,
    "water" => 0x6890F0,
    "electric" => 0xF8D030,
    "grass" => 0x78C850,
    "ice" => 0x98D8D8,
    "fighting" => 0xC03028,
    "poison" => 0xA040A0,
    "ground" => 0xE0C068,
    "flying" => 0xA890F0,
    "psychic" => 0xF85888,
    "bug" => 0xA8B820,
    "rock" => 0xB8A038,
    "ghost" => 0x705898,
    "dragon" => 0x7038F8,
    "dark" => 0x705848,
    "steel" => 0xB8B8D0,
    "fairy" => 0xEE99AC,
    _ => 0x68A090,
  };
  Color::from_u32(rgb)
}
