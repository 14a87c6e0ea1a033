use super::input::{InputResult, TextInput};
use super::KeyResult;
use crate::commands::{self, Command};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph};

/// Suggestions shown at once
const MAX_SUGGESTIONS: usize = 8;

/// Events emitted by command input that parent needs to handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandEvent {
  /// Resolved command line, e.g. `show 25`
  Submitted(String),
  Cancelled,
}

/// The `:` command line with autocomplete and history
#[derive(Debug, Clone, Default)]
pub struct CommandInput {
  input: TextInput,
  active: bool,
  selected_suggestion: usize,
}

impl CommandInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_active(&self) -> bool {
    self.active
  }

  pub fn value(&self) -> &str {
    self.input.value()
  }

  pub fn activate(&mut self) {
    self.active = true;
    self.reset();
  }

  fn reset(&mut self) {
    self.input.clear();
    self.selected_suggestion = 0;
  }

  /// Commands matching the first word typed so far
  pub fn suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(self.input.value())
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }

  fn cycle_suggestion(&mut self, forward: bool) {
    let count = self.suggestions().len();
    if count == 0 {
      return;
    }
    self.selected_suggestion = if forward {
      (self.selected_suggestion + 1) % count
    } else {
      (self.selected_suggestion + count - 1) % count
    };
  }

  /// Handle a key event. Inactive, only `:` is consumed (to activate).
  pub fn handle_key(&mut self, key: KeyEvent) -> KeyResult<CommandEvent> {
    if !self.active {
      if key.code == KeyCode::Char(':') {
        self.activate();
        return KeyResult::Handled;
      }
      return KeyResult::NotHandled;
    }

    match key.code {
      KeyCode::Tab | KeyCode::Down => {
        self.cycle_suggestion(true);
        return KeyResult::Handled;
      }
      KeyCode::BackTab | KeyCode::Up => {
        self.cycle_suggestion(false);
        return KeyResult::Handled;
      }
      _ => {}
    }

    match self.input.handle_key(key) {
      InputResult::Consumed => {
        self.selected_suggestion = 0;
        KeyResult::Handled
      }
      InputResult::Submitted(_) => {
        let line = self.resolve_command();
        self.input.remember(&line);
        self.active = false;
        self.reset();
        KeyResult::Event(CommandEvent::Submitted(line))
      }
      InputResult::Cancelled => {
        self.active = false;
        self.reset();
        KeyResult::Event(CommandEvent::Cancelled)
      }
      // Swallow everything else while the overlay is open
      InputResult::NotHandled => KeyResult::Handled,
    }
  }

  /// The selected suggestion's name followed by the typed arguments
  fn resolve_command(&self) -> String {
    let value = self.input.value().trim();
    let args = value
      .split_once(char::is_whitespace)
      .map(|(_, rest)| rest.trim())
      .unwrap_or("");

    let name = match self.suggestions().get(self.selected_suggestion) {
      Some(cmd) => cmd.name.to_string(),
      None => value.split_whitespace().next().unwrap_or("").to_lowercase(),
    };

    if args.is_empty() {
      name
    } else {
      format!("{} {}", name, args)
    }
  }

  /// Draw the command box and suggestion list over the top-left of `area`
  pub fn render_overlay(&self, frame: &mut Frame, area: Rect) {
    if !self.active {
      return;
    }

    let suggestions = self.suggestions();
    let shown = suggestions.len().min(MAX_SUGGESTIONS) as u16;

    let width = (area.width * 60 / 100)
      .clamp(30, 70)
      .min(area.width.saturating_sub(2));
    let height = (3 + shown).min(area.height.saturating_sub(2));
    let overlay = Rect::new(area.x + 1, area.y + 1, width, height);

    frame.render_widget(Clear, overlay);
    let block = Block::default()
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Yellow))
      .title(" Command ");
    let inner = block.inner(overlay);
    frame.render_widget(block, overlay);
    if inner.height == 0 {
      return;
    }

    let [input_area, list_area] =
      Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(inner);

    let (before, after) = self.input.value().split_at(self.input.cursor_position());
    let prompt = Line::from(vec![
      Span::styled(":", Style::default().fg(Color::Yellow)),
      Span::raw(before),
      Span::styled("_", Style::default().fg(Color::Yellow)),
      Span::raw(after),
    ]);
    frame.render_widget(Paragraph::new(prompt), input_area);

    if suggestions.is_empty() || list_area.height == 0 {
      return;
    }

    let rows: Vec<ListItem> = suggestions
      .iter()
      .take(MAX_SUGGESTIONS)
      .map(|cmd| {
        let usage = if cmd.takes_arg {
          format!("{} <arg>", cmd.name)
        } else {
          cmd.name.to_string()
        };
        ListItem::new(Line::from(vec![
          Span::styled(format!("{:<18}", usage), Style::default().fg(Color::Cyan)),
          Span::styled(cmd.description, Style::default().fg(Color::DarkGray)),
        ]))
      })
      .collect();

    let list =
      List::new(rows).highlight_style(Style::default().bg(Color::DarkGray).fg(Color::White));
    let mut state = ListState::default().with_selected(Some(self.selected_suggestion));
    frame.render_stateful_widget(list, list_area, &mut state);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crossterm::event::KeyModifiers;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::from(code)
  }

  fn type_str(input: &mut CommandInput, s: &str) {
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
  }

  #[test]
  fn test_colon_activates() {
    let mut input = CommandInput::new();
    assert_eq!(input.handle_key(key(KeyCode::Char('j'))), KeyResult::NotHandled);
    assert_eq!(input.handle_key(key(KeyCode::Char(':'))), KeyResult::Handled);
    assert!(input.is_active());
  }

  #[test]
  fn test_submit_resolves_prefix_and_keeps_argument() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "sh 25");

    let result = input.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(CommandEvent::Submitted("show 25".to_string()))
    );
    assert!(!input.is_active());
    assert_eq!(input.value(), "");
  }

  #[test]
  fn test_tab_cycles_suggestions() {
    let mut input = CommandInput::new();
    input.activate();
    input.handle_key(key(KeyCode::Tab));
    assert_eq!(input.selected_suggestion(), 1);
    input.handle_key(key(KeyCode::BackTab));
    input.handle_key(key(KeyCode::BackTab));
    assert_eq!(input.selected_suggestion(), commands::COMMANDS.len() - 1);

    let result = input.handle_key(key(KeyCode::Enter));
    assert_eq!(
      result,
      KeyResult::Event(CommandEvent::Submitted("quit".to_string()))
    );
  }

  #[test]
  fn test_escape_cancels() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "quit");
    assert_eq!(
      input.handle_key(key(KeyCode::Esc)),
      KeyResult::Event(CommandEvent::Cancelled)
    );
    assert!(!input.is_active());
  }

  #[test]
  fn test_history_survives_reactivation() {
    let mut input = CommandInput::new();
    input.activate();
    type_str(&mut input, "show 7");
    input.handle_key(key(KeyCode::Enter));

    input.activate();
    input.handle_key(KeyEvent::new(KeyCode::Char('p'), KeyModifiers::CONTROL));
    assert_eq!(input.value(), "show 7");
  }
}
