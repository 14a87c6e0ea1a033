use crate::catalog::cache::COLLECTION_TAG;
use crate::catalog::cached_client::CachedCatalogClient;
use crate::catalog::types::ListItem;
use crate::paging::InfiniteQuery;
use crate::ui::ensure_valid_selection;
use crate::ui::renderfns::{capitalize, display_id, truncate};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crate::ui::views::ItemDetailView;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem as ListRow, ListState, Paragraph};
use tracing::{info, warn};

/// Infinite-scroll list of the collection
pub struct CatalogListView {
  client: CachedCatalogClient,
  title: String,
  query: InfiniteQuery<ListItem>,
  list_state: ListState,
}

impl CatalogListView {
  pub fn new(client: CachedCatalogClient, page_size: usize) -> Self {
    let title = capitalize(client.collection());
    let fetch_client = client.clone();
    let query = InfiniteQuery::new(page_size, move |limit, offset, policy| {
      let client = fetch_client.clone();
      async move {
        client
          .query_collection(limit, offset, policy)
          .await
          .map_err(|e| e.to_string())
      }
    });

    Self {
      client,
      title,
      query,
      list_state: ListState::default(),
    }
  }

  fn items(&self) -> &[ListItem] {
    self.query.items()
  }

  fn select_next(&mut self) {
    let len = self.items().len();
    if len == 0 {
      return;
    }
    let next = self.list_state.selected().map_or(0, |i| (i + 1).min(len - 1));
    self.list_state.select(Some(next));

    // Reaching the last row pulls in the next page
    if next == len - 1 && self.query.load_more() {
      info!(offset = self.query.current_offset(), "scrolled to end, loading more");
    }
  }

  fn select_previous(&mut self) {
    let prev = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
    self.list_state.select(Some(prev));
  }

  fn render_list(&mut self, frame: &mut Frame, area: Rect) {
    let len = self.items().len();
    ensure_valid_selection(&mut self.list_state, len);

    let title = if self.query.is_loading() {
      format!(" {} (loading...) ", self.title)
    } else if self.query.is_error() && len == 0 {
      format!(" {} (error) ", self.title)
    } else {
      format!(" {} ({}) ", self.title, len)
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    if len == 0 {
      let content = if self.query.is_loading() {
        format!("Loading {}...", self.client.collection())
      } else if let Some(error) = self.query.error() {
        format!("Failed to load list: {}\n\nPress 'r' to retry.", error)
      } else {
        "No items found. Press 'r' to retry.".to_string()
      };
      let style = if self.query.is_error() {
        Style::default().fg(Color::Red)
      } else {
        Style::default().fg(Color::DarkGray)
      };
      let paragraph = Paragraph::new(content).block(block).style(style);
      frame.render_widget(paragraph, area);
      return;
    }

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
      .direction(Direction::Vertical)
      .constraints([
        Constraint::Min(1),    // Rows
        Constraint::Length(1), // Pagination status
      ])
      .split(inner);

    let rows: Vec<ListRow> = self
      .items()
      .iter()
      .map(|item| {
        let line = Line::from(vec![
          Span::styled(
            format!("{:<6}", display_id(item.id)),
            Style::default().fg(Color::Cyan),
          ),
          Span::raw(" "),
          Span::raw(truncate(&capitalize(&item.name), 40)),
        ]);
        ListRow::new(line)
      })
      .collect();

    let list = List::new(rows)
      .highlight_style(
        Style::default()
          .bg(Color::DarkGray)
          .add_modifier(Modifier::BOLD),
      )
      .highlight_symbol("> ");

    frame.render_stateful_widget(list, chunks[0], &mut self.list_state);

    let (status, color) = if self.query.is_loading_more() {
      (
        format!("Loading page {}...", self.query.page_index() + 1),
        Color::Yellow,
      )
    } else if self.query.is_error() {
      (
        "Failed to load more. Press 'm' to retry.".to_string(),
        Color::Red,
      )
    } else if self.query.has_more() {
      (
        "Scroll to the bottom or press 'm' to load more".to_string(),
        Color::DarkGray,
      )
    } else {
      (
        format!("You've seen all {} {}", len, self.client.collection()),
        Color::DarkGray,
      )
    };
    let paragraph = Paragraph::new(status)
      .alignment(Alignment::Center)
      .style(Style::default().fg(color));
    frame.render_widget(paragraph, chunks[1]);
  }
}

impl View for CatalogListView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('j') | KeyCode::Down => self.select_next(),
      KeyCode::Char('k') | KeyCode::Up => self.select_previous(),
      KeyCode::Char('m') => {
        self.query.load_more();
      }
      KeyCode::Char('r') => {
        self.list_state.select(None);
        self.query.refetch();
      }
      KeyCode::Enter => {
        if let Some(idx) = self.list_state.selected() {
          if let Some(item) = self.items().get(idx) {
            return ViewAction::Push(Box::new(ItemDetailView::new(
              item.id.to_string(),
              self.client.clone(),
            )));
          }
        }
      }
      KeyCode::Char('q') | KeyCode::Esc => return ViewAction::Pop,
      _ => {}
    }
    ViewAction::None
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_list(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    self.title.clone()
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn refresh(&mut self) {
    if let Err(e) = self.client.invalidate(COLLECTION_TAG) {
      warn!("Failed to invalidate collection pages: {}", e);
    }
    self.list_state.select(None);
    self.query.refetch();
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("m", "more").with_priority(20),
      ShortcutInfo::new("r", "reload").with_priority(25),
      ShortcutInfo::new("q", "quit").with_priority(30),
    ]
  }
}
