use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::route::Route;

/// Key hint rendered in the header as `<key> label`
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  /// Sort order in the header, ascending
  pub priority: u8,
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Navigation requested by a view
pub enum ViewAction {
  None,
  Push(Box<dyn View>),
  /// Go back; popping the root quits
  Pop,
}

/// A screen on the App's view stack.
///
/// Only the top view receives keys and ticks. Views own their queries and
/// poll them from `tick()`, so fresh data is in place before the next draw.
pub trait View {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction;

  fn render(&mut self, frame: &mut Frame, area: Rect);

  /// Label for this view in the footer breadcrumb
  fn breadcrumb_label(&self) -> String;

  fn tick(&mut self) {}

  /// Force this view's data to be fetched from the network again
  fn refresh(&mut self) {}

  /// Where the App should send the user instead of showing this view
  fn redirect(&self) -> Option<Route> {
    None
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
