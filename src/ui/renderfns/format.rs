/// Uppercase the first character
pub fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Zero-padded catalog number, e.g. `#001`
pub fn display_id(id: u32) -> String {
  format!("#{:03}", id)
}

/// Ability name for display: capitalized, first `-` becomes a space
pub fn ability_label(name: &str) -> String {
  capitalize(&name.replacen('-', " ", 1))
}

/// Short label for a base stat
pub fn stat_label(name: &str) -> String {
  match name {
    "hp" => "HP".to_string(),
    "attack" => "Attack".to_string(),
    "defense" => "Defense".to_string(),
    "special-attack" => "Sp. Atk".to_string(),
    "special-defense" => "Sp. Def".to_string(),
    "speed" => "Speed".to_string(),
    other => capitalize(other),
  }
}

/// Tenths to a one-decimal string (decimetres to metres, hectograms to kg)
pub fn format_measure(tenths: u32, unit: &str) -> String {
  format!("{:.1} {}", tenths as f64 / 10.0, unit)
}

/// Width of a stat bar in percent of the available space
pub fn stat_bar_percent(value: u32) -> u16 {
  (value / 2).min(100) as u16
}
