use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Result of handling a key event in an input component
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputResult {
  /// Key was handled, continue input mode
  Consumed,
  /// Enter pressed, here's the submitted value
  Submitted(String),
  /// Escape pressed, input cancelled
  Cancelled,
  /// Key not handled, pass to next handler
  NotHandled,
}

/// Most submitted lines kept for recall
const HISTORY_LIMIT: usize = 50;

/// Single-line editor with readline-style bindings and submit history.
///
/// The cursor is a byte offset that always sits on a char boundary.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
  buffer: String,
  cursor: usize,
  history: Vec<String>,
  /// Position while browsing history; `None` means editing a fresh line
  recall: Option<usize>,
}

impl TextInput {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn value(&self) -> &str {
    &self.buffer
  }

  pub fn is_empty(&self) -> bool {
    self.buffer.is_empty()
  }

  pub fn cursor_position(&self) -> usize {
    self.cursor
  }

  /// Clear the line. History is kept.
  pub fn clear(&mut self) {
    self.buffer.clear();
    self.cursor = 0;
    self.recall = None;
  }

  /// Replace the line and put the cursor at its end
  pub fn set_value(&mut self, value: &str) {
    self.buffer = value.to_string();
    self.cursor = self.buffer.len();
  }

  /// Remember a submitted line. Blank lines and immediate repeats are skipped.
  pub fn remember(&mut self, line: &str) {
    let line = line.trim();
    if line.is_empty() || self.history.last().map(String::as_str) == Some(line) {
      return;
    }
    if self.history.len() == HISTORY_LIMIT {
      self.history.remove(0);
    }
    self.history.push(line.to_string());
  }

  /// Handle a key event, returning the result
  pub fn handle_key(&mut self, key: KeyEvent) -> InputResult {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => return InputResult::Cancelled,
      KeyCode::Enter => return InputResult::Submitted(self.buffer.clone()),
      KeyCode::Backspace => self.delete_before_cursor(),
      KeyCode::Delete => self.delete_at_cursor(),
      KeyCode::Left => self.cursor -= self.prev_char_len(),
      KeyCode::Right => self.cursor += self.next_char_len(),
      KeyCode::Home => self.cursor = 0,
      KeyCode::End => self.cursor = self.buffer.len(),
      KeyCode::Char('a') if ctrl => self.cursor = 0,
      KeyCode::Char('e') if ctrl => self.cursor = self.buffer.len(),
      KeyCode::Char('u') if ctrl => self.kill_to_start(),
      KeyCode::Char('w') if ctrl => self.kill_word(),
      KeyCode::Char('p') if ctrl => self.recall_older(),
      KeyCode::Char('n') if ctrl => self.recall_newer(),
      KeyCode::Char(_) if ctrl => return InputResult::NotHandled,
      KeyCode::Char(c) => {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
      }
      _ => return InputResult::NotHandled,
    }
    InputResult::Consumed
  }

  fn prev_char_len(&self) -> usize {
    self.buffer[..self.cursor]
      .chars()
      .next_back()
      .map_or(0, char::len_utf8)
  }

  fn next_char_len(&self) -> usize {
    self.buffer[self.cursor..]
      .chars()
      .next()
      .map_or(0, char::len_utf8)
  }

  fn delete_before_cursor(&mut self) {
    if self.cursor > 0 {
      self.cursor -= self.prev_char_len();
      self.buffer.remove(self.cursor);
    }
  }

  fn delete_at_cursor(&mut self) {
    if self.cursor < self.buffer.len() {
      self.buffer.remove(self.cursor);
    }
  }

  fn kill_to_start(&mut self) {
    self.buffer.replace_range(..self.cursor, "");
    self.cursor = 0;
  }

  fn kill_word(&mut self) {
    let start = self.buffer[..self.cursor]
      .trim_end()
      .rfind(' ')
      .map_or(0, |i| i + 1);
    self.buffer.replace_range(start..self.cursor, "");
    self.cursor = start;
  }

  fn recall_older(&mut self) {
    if self.history.is_empty() {
      return;
    }
    let idx = match self.recall {
      Some(0) => 0,
      Some(i) => i - 1,
      None => self.history.len() - 1,
    };
    self.recall = Some(idx);
    let line = self.history[idx].clone();
    self.set_value(&line);
  }

  fn recall_newer(&mut self) {
    match self.recall {
      Some(i) if i + 1 < self.history.len() => {
        self.recall = Some(i + 1);
        let line = self.history[i + 1].clone();
        self.set_value(&line);
      }
      Some(_) => {
        self.recall = None;
        self.set_value("");
      }
      None => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl(c: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
  }

  fn typed(s: &str) -> TextInput {
    let mut input = TextInput::new();
    for c in s.chars() {
      input.handle_key(key(KeyCode::Char(c)));
    }
    input
  }

  #[test]
  fn test_typing_and_submit() {
    let mut input = typed("show 25");
    assert_eq!(
      input.handle_key(key(KeyCode::Enter)),
      InputResult::Submitted("show 25".to_string())
    );
    assert_eq!(input.handle_key(key(KeyCode::Esc)), InputResult::Cancelled);
  }

  #[test]
  fn test_insert_in_middle() {
    let mut input = typed("shw");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Char('o')));
    assert_eq!(input.value(), "show");
  }

  #[test]
  fn test_backspace_and_delete() {
    let mut input = typed("lisst");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "list");

    input.handle_key(key(KeyCode::Home));
    input.handle_key(key(KeyCode::Delete));
    assert_eq!(input.value(), "ist");
  }

  #[test]
  fn test_kill_bindings() {
    let mut input = typed("show /pokemon/25");
    input.handle_key(ctrl('w'));
    assert_eq!(input.value(), "show ");

    let mut input = typed("invalidate collection");
    for _ in 0.."collection".len() {
      input.handle_key(key(KeyCode::Left));
    }
    input.handle_key(ctrl('u'));
    assert_eq!(input.value(), "collection");
    assert_eq!(input.cursor_position(), 0);
  }

  #[test]
  fn test_multibyte_editing() {
    let mut input = typed("flabébé");
    input.handle_key(key(KeyCode::Left));
    input.handle_key(key(KeyCode::Backspace));
    assert_eq!(input.value(), "flabéé");
    assert_eq!(input.cursor_position(), "flabé".len());
  }

  #[test]
  fn test_history_recall() {
    let mut input = TextInput::new();
    input.remember("show 1");
    input.remember("show 1");
    input.remember("  ");
    input.remember("list");

    input.handle_key(ctrl('p'));
    assert_eq!(input.value(), "list");
    input.handle_key(ctrl('p'));
    assert_eq!(input.value(), "show 1");
    // Oldest entry stays put
    input.handle_key(ctrl('p'));
    assert_eq!(input.value(), "show 1");

    input.handle_key(ctrl('n'));
    assert_eq!(input.value(), "list");
    input.handle_key(ctrl('n'));
    assert_eq!(input.value(), "");
  }

  #[test]
  fn test_unbound_control_keys_pass_through() {
    let mut input = typed("x");
    assert_eq!(input.handle_key(ctrl('c')), InputResult::NotHandled);
    assert_eq!(input.value(), "x");
  }
}
