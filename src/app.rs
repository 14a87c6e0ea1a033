use crate::catalog::cached_client::CachedCatalogClient;
use crate::commands::{self, Invocation};
use crate::event::{Event, EventHandler};
use crate::route::Route;
use crate::ui;
use crate::ui::components::{CommandEvent, CommandInput, KeyResult};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::{CatalogListView, ItemDetailView};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::time::Duration;
use tracing::{info, warn};

/// How often views poll their queries
const TICK_RATE: Duration = Duration::from_millis(100);

/// Main application state
pub struct App {
  /// Navigation stack - the collection list is always at index 0
  view_stack: Vec<Box<dyn View>>,

  /// `:` command line
  command_input: CommandInput,

  client: CachedCatalogClient,

  page_size: usize,

  /// Outcome of the last command or redirect, shown in the footer
  status_message: Option<String>,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(client: CachedCatalogClient, page_size: usize) -> Self {
    let root: Box<dyn View> = Box::new(CatalogListView::new(client.clone(), page_size));
    Self {
      view_stack: vec![root],
      command_input: CommandInput::new(),
      client,
      page_size,
      status_message: None,
      should_quit: false,
    }
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = self.event_loop(&mut terminal).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
  }

  async fn event_loop<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
    let mut events = EventHandler::new(TICK_RATE);

    while !self.should_quit() {
      terminal.draw(|frame| ui::draw(frame, self))?;

      match events.next().await {
        Some(event) => self.handle_event(event),
        None => break,
      }
    }

    Ok(())
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => self.tick(),
      Event::Resize => {}
    }
  }

  /// Poll the active view's queries, then follow any redirect it asks for
  fn tick(&mut self) {
    if let Some(view) = self.view_stack.last_mut() {
      view.tick();
    }
    self.apply_redirect();
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.command_input.handle_key(key) {
      KeyResult::Handled => return,
      KeyResult::Event(CommandEvent::Submitted(line)) => {
        self.execute_command(&line);
        return;
      }
      KeyResult::Event(CommandEvent::Cancelled) => return,
      KeyResult::NotHandled => {}
    }

    let action = match self.view_stack.last_mut() {
      Some(view) => view.handle_key(key),
      None => ViewAction::None,
    };
    match action {
      ViewAction::None => {}
      ViewAction::Push(view) => self.push_view(view),
      ViewAction::Pop => self.pop_view(),
    }
  }

  fn push_view(&mut self, view: Box<dyn View>) {
    self.status_message = None;
    self.view_stack.push(view);
    self.apply_redirect();
  }

  fn pop_view(&mut self) {
    if self.view_stack.len() > 1 {
      self.view_stack.pop();
      self.status_message = None;
    } else {
      self.should_quit = true;
    }
  }

  /// Replace the top view with the route it redirects to, if any
  fn apply_redirect(&mut self) {
    let route = match self.view_stack.last().and_then(|v| v.redirect()) {
      Some(route) => route,
      None => return,
    };
    if self.view_stack.len() == 1 {
      return;
    }

    if let Some(view) = self.view_stack.pop() {
      let label = view.breadcrumb_label();
      info!(from = %label, ?route, "redirecting");
      self.status_message = Some(format!("'{}' is not a valid id", label));
    }
    if route == Route::Collection {
      self.view_stack.truncate(1);
    }
  }

  /// Navigate to a path, e.g. `/`, `/pokemon/25` or `25`.
  pub fn open(&mut self, path: &str) {
    info!(path, "opening route");
    match Route::parse(path) {
      Route::Collection => self.view_stack.truncate(1),
      Route::Detail(param) => {
        let view = ItemDetailView::new(param, self.client.clone());
        self.push_view(Box::new(view));
      }
    }
  }

  fn execute_command(&mut self, line: &str) {
    let invocation = match commands::parse(line) {
      Some(invocation) => invocation,
      None => {
        self.status_message = Some(format!("Unknown command: {}", line));
        return;
      }
    };

    match invocation {
      Invocation::List => {
        self.view_stack.clear();
        self.view_stack.push(Box::new(CatalogListView::new(
          self.client.clone(),
          self.page_size,
        )));
        self.status_message = None;
      }
      Invocation::Show(path) => self.open(&path),
      Invocation::Refresh => {
        if let Some(view) = self.view_stack.last_mut() {
          view.refresh();
        }
        self.status_message = Some("Refreshing".to_string());
      }
      Invocation::Invalidate(tag) => {
        let result = match &tag {
          Some(tag) => self
            .client
            .invalidate(tag)
            .map(|n| format!("Invalidated {} cached result(s) tagged '{}'", n, tag)),
          None => self
            .client
            .clear_cache()
            .map(|_| "Cache cleared".to_string()),
        };
        self.status_message = Some(match result {
          Ok(message) => message,
          Err(e) => {
            warn!("Cache invalidation failed: {}", e);
            format!("Cache invalidation failed: {}", e)
          }
        });
      }
      Invocation::Quit => self.should_quit = true,
    }
  }

  // Accessors for UI rendering

  pub fn current_view_mut(&mut self) -> Option<&mut Box<dyn View>> {
    self.view_stack.last_mut()
  }

  pub fn current_shortcuts(&self) -> Vec<ShortcutInfo> {
    self
      .view_stack
      .last()
      .map(|v| v.shortcuts())
      .unwrap_or_default()
  }

  pub fn command_input(&self) -> &CommandInput {
    &self.command_input
  }

  pub fn base_url(&self) -> &str {
    self.client.base_url()
  }

  pub fn collection(&self) -> &str {
    self.client.collection()
  }

  pub fn status_message(&self) -> Option<&str> {
    self.status_message.as_deref()
  }

  pub fn view_breadcrumb(&self) -> Vec<String> {
    self
      .view_stack
      .iter()
      .map(|v| v.breadcrumb_label())
      .collect()
  }

  pub fn should_quit(&self) -> bool {
    self.should_quit
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::MemoryStorage;
  use crate::config::{ApiConfig, Config};
  use std::sync::Arc;

  async fn app_for(server: &mockito::ServerGuard) -> App {
    let config = Config {
      api: ApiConfig {
        base_url: server.url(),
        collection: "pokemon".to_string(),
        timeout_secs: 5,
      },
      ..Config::default()
    };
    let client = CachedCatalogClient::new(&config, Arc::new(MemoryStorage::new())).unwrap();
    App::new(client, 20)
  }

  fn press(app: &mut App, code: KeyCode) {
    app.handle_key(KeyEvent::from(code));
  }

  fn type_command(app: &mut App, line: &str) {
    press(app, KeyCode::Char(':'));
    for c in line.chars() {
      press(app, KeyCode::Char(c));
    }
    press(app, KeyCode::Enter);
  }

  #[tokio::test]
  async fn test_invalid_routes_redirect_to_collection() {
    let server = mockito::Server::new_async().await;
    let mut app = app_for(&server).await;

    for path in ["/pokemon/abc", "/item/0", "/item/-1"] {
      app.open(path);
      assert_eq!(app.view_breadcrumb(), vec!["Pokemon"], "{}", path);
      assert!(app.status_message().is_some());
    }
  }

  #[tokio::test]
  async fn test_valid_route_pushes_detail() {
    let server = mockito::Server::new_async().await;
    let mut app = app_for(&server).await;

    app.open("/pokemon/25");
    assert_eq!(app.view_breadcrumb(), vec!["Pokemon", "#025"]);
    assert_eq!(app.status_message(), None);

    press(&mut app, KeyCode::Esc);
    assert_eq!(app.view_breadcrumb(), vec!["Pokemon"]);
    assert!(!app.should_quit());

    press(&mut app, KeyCode::Char('q'));
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_show_command_routes_through_resolver() {
    let server = mockito::Server::new_async().await;
    let mut app = app_for(&server).await;

    type_command(&mut app, "show 7");
    assert_eq!(app.view_breadcrumb(), vec!["Pokemon", "#007"]);

    type_command(&mut app, "show abc");
    assert_eq!(app.view_breadcrumb(), vec!["Pokemon"]);

    type_command(&mut app, "list");
    assert_eq!(app.view_breadcrumb(), vec!["Pokemon"]);
  }

  #[tokio::test]
  async fn test_commands_report_status() {
    let server = mockito::Server::new_async().await;
    let mut app = app_for(&server).await;

    type_command(&mut app, "invalidate collection");
    assert_eq!(
      app.status_message(),
      Some("Invalidated 0 cached result(s) tagged 'collection'")
    );

    type_command(&mut app, "invalidate");
    assert_eq!(app.status_message(), Some("Cache cleared"));

    type_command(&mut app, "frobnicate");
    assert_eq!(app.status_message(), Some("Unknown command: frobnicate"));

    type_command(&mut app, "quit");
    assert!(app.should_quit());
  }

  #[tokio::test]
  async fn test_ctrl_c_quits_from_anywhere() {
    let server = mockito::Server::new_async().await;
    let mut app = app_for(&server).await;

    press(&mut app, KeyCode::Char(':'));
    app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert!(app.should_quit());
  }
}
