pub mod footer;
pub mod format;
pub mod header;
pub mod utils;

pub use footer::draw_footer;
pub use format::{
  ability_label, capitalize, display_id, format_measure, stat_bar_percent, stat_label,
};
pub use header::draw_header;
pub use utils::{stat_color, truncate, type_color};
