use crate::catalog::cached_client::CachedCatalogClient;
use crate::catalog::types::DetailRecord;
use crate::query::{Query, QueryStatus};
use crate::route::{parse_item_id, Route};
use crate::ui::renderfns::{
  ability_label, capitalize, display_id, format_measure, stat_bar_percent, stat_color,
  stat_label, type_color,
};
use crate::ui::view::{ShortcutInfo, View, ViewAction};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use tracing::{info, warn};

#[derive(Debug, PartialEq)]
enum Body<'a> {
  InvalidId,
  Loading,
  Record(&'a DetailRecord),
  NotFound,
  Failed(&'a str),
}

/// View for a single item, addressed by a raw route parameter
pub struct ItemDetailView {
  param: String,
  id: Option<u32>,
  query: Query<Option<DetailRecord>>,
  scroll: u16,
}

impl ItemDetailView {
  /// An invalid parameter never issues a request; the view asks to be
  /// redirected to the collection instead.
  pub fn new(param: String, client: CachedCatalogClient) -> Self {
    let id = match parse_item_id(&param) {
      Ok(id) => Some(id),
      Err(e) => {
        warn!("Not opening detail view: {}", e);
        None
      }
    };

    let mut query = Query::new(move |policy| {
      let client = client.clone();
      async move {
        match id {
          Some(id) => client
            .query_detail(id, policy)
            .await
            .map_err(|e| e.to_string()),
          None => Ok(None),
        }
      }
    })
    .with_skip(id.is_none());

    if let Some(id) = id {
      info!(id, "opening item detail");
    }
    query.fetch();

    Self {
      param,
      id,
      query,
      scroll: 0,
    }
  }

  fn record(&self) -> Option<&DetailRecord> {
    self.query.data().and_then(|r| r.as_ref())
  }

  fn render_detail(&self, frame: &mut Frame, area: Rect) {
    let label = self.breadcrumb_label();
    let title = match self.query.status() {
      QueryStatus::Pending => format!(" {} (loading...) ", label),
      QueryStatus::Error(_) => format!(" {} (error) ", label),
      _ => format!(" {} ", label),
    };

    let block = Block::default()
      .title(title)
      .title_alignment(Alignment::Center)
      .borders(Borders::ALL)
      .border_style(Style::default().fg(Color::Blue));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let (text, color) = match self.body() {
      Body::Record(record) => return self.render_record(frame, inner, record),
      Body::InvalidId => (
        format!("'{}' is not a valid id.", self.param),
        Color::DarkGray,
      ),
      Body::Loading => ("Loading details...".to_string(), Color::DarkGray),
      Body::NotFound => (
        format!("Not found: nothing exists at {}.\n\nPress 'r' to retry.", label),
        Color::Yellow,
      ),
      Body::Failed(error) => (
        format!("Failed to load details: {}\n\nPress 'r' to retry.", error),
        Color::Red,
      ),
    };
    let paragraph = Paragraph::new(text)
      .wrap(Wrap { trim: true })
      .style(Style::default().fg(color));
    frame.render_widget(paragraph, inner);
  }

  /// What the content area shows. A failed refetch wins over an earlier
  /// "not found", but a previously loaded record stays on screen.
  fn body(&self) -> Body<'_> {
    if self.id.is_none() {
      return Body::InvalidId;
    }
    if self.query.is_loading() {
      return Body::Loading;
    }
    match (self.query.data(), self.query.error()) {
      (Some(Some(record)), _) => Body::Record(record),
      (_, Some(error)) => Body::Failed(error),
      (Some(None), None) => Body::NotFound,
      (None, None) => Body::Loading,
    }
  }

  fn render_record(&self, frame: &mut Frame, area: Rect, record: &DetailRecord) {
    let columns = Layout::default()
      .direction(Direction::Horizontal)
      .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
      .split(area);

    let info = Paragraph::new(info_lines(record))
      .wrap(Wrap { trim: false })
      .scroll((self.scroll, 0));
    frame.render_widget(info, columns[0]);

    let stats_block = Block::default()
      .title(" Base stats ")
      .borders(Borders::LEFT)
      .border_style(Style::default().fg(Color::DarkGray));
    let stats_area = stats_block.inner(columns[1]);
    frame.render_widget(stats_block, columns[1]);

    // Label, value, then whatever width is left for the bar
    let bar_width = stats_area.width.saturating_sub(16) as usize;
    let mut lines: Vec<Line> = record
      .stats
      .iter()
      .map(|stat| {
        let filled = bar_width * stat_bar_percent(stat.base_stat) as usize / 100;
        Line::from(vec![
          Span::styled(
            format!(" {:<8}", stat_label(&stat.name)),
            Style::default().fg(Color::DarkGray),
          ),
          Span::styled(
            format!("{:>4} ", stat.base_stat),
            Style::default().bold(),
          ),
          Span::styled("█".repeat(filled), Style::default().fg(stat_color(stat.base_stat))),
        ])
      })
      .collect();
    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
      Span::styled(format!(" {:<8}", "Total"), Style::default().fg(Color::DarkGray)),
      Span::styled(format!("{:>4}", record.total_stats()), Style::default().bold()),
    ]));

    frame.render_widget(Paragraph::new(lines), stats_area);
  }
}

fn info_lines(record: &DetailRecord) -> Vec<Line<'static>> {
  let heading = Style::default().fg(Color::Cyan).bold();
  let dim = Style::default().fg(Color::DarkGray);

  let mut lines = vec![Line::from(vec![
    Span::styled(capitalize(&record.name), Style::default().bold()),
    Span::raw("  "),
    Span::styled(display_id(record.id), dim),
  ])];

  let mut types = Vec::new();
  for kind in &record.types {
    types.push(Span::styled(
      format!(" {} ", capitalize(kind)),
      Style::default().fg(Color::Black).bg(type_color(kind)),
    ));
    types.push(Span::raw(" "));
  }
  lines.push(Line::from(types));
  lines.push(Line::raw(""));

  lines.push(Line::styled("Physical characteristics", heading));
  lines.push(Line::from(vec![
    Span::styled("  Height: ", dim),
    Span::raw(format_measure(record.height, "m")),
  ]));
  lines.push(Line::from(vec![
    Span::styled("  Weight: ", dim),
    Span::raw(format_measure(record.weight, "kg")),
  ]));
  lines.push(Line::from(vec![
    Span::styled("  Base experience: ", dim),
    Span::raw(
      record
        .base_experience
        .map(|xp| xp.to_string())
        .unwrap_or_else(|| "unknown".to_string()),
    ),
  ]));
  lines.push(Line::raw(""));

  lines.push(Line::styled("Abilities", heading));
  for ability in &record.abilities {
    let mut spans = vec![Span::raw(format!("  {}", ability_label(&ability.name)))];
    if ability.hidden {
      spans.push(Span::raw(" "));
      spans.push(Span::styled(
        " Hidden ",
        Style::default().fg(Color::Black).bg(Color::Magenta),
      ));
    }
    lines.push(Line::from(spans));
  }
  lines.push(Line::raw(""));

  lines.push(Line::styled("Images", heading));
  match record.primary_image() {
    Some(url) => lines.push(Line::from(vec![
      Span::styled("  Artwork: ", dim),
      Span::raw(url.to_string()),
    ])),
    None => lines.push(Line::styled("  No image available", dim)),
  }
  for (label, url) in record.sprites.gallery() {
    lines.push(Line::from(vec![
      Span::styled(format!("  {}: ", label), dim),
      Span::raw(url.to_string()),
    ]));
  }

  lines
}

impl View for ItemDetailView {
  fn handle_key(&mut self, key: KeyEvent) -> ViewAction {
    match key.code {
      KeyCode::Char('r') => {
        self.query.refetch();
        ViewAction::None
      }
      KeyCode::Char('j') | KeyCode::Down => {
        self.scroll = self.scroll.saturating_add(1);
        ViewAction::None
      }
      KeyCode::Char('k') | KeyCode::Up => {
        self.scroll = self.scroll.saturating_sub(1);
        ViewAction::None
      }
      KeyCode::Char('q') | KeyCode::Esc => ViewAction::Pop,
      _ => ViewAction::None,
    }
  }

  fn render(&mut self, frame: &mut Frame, area: Rect) {
    self.render_detail(frame, area);
  }

  fn breadcrumb_label(&self) -> String {
    match (self.record(), self.id) {
      (Some(record), _) => format!("{} {}", capitalize(&record.name), display_id(record.id)),
      (None, Some(id)) => display_id(id),
      (None, None) => self.param.clone(),
    }
  }

  fn tick(&mut self) {
    self.query.poll();
  }

  fn refresh(&mut self) {
    self.query.refetch();
  }

  fn redirect(&self) -> Option<Route> {
    match self.id {
      Some(_) => None,
      None => Some(Route::Collection),
    }
  }

  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![
      ShortcutInfo::new(":", "command").with_priority(10),
      ShortcutInfo::new("r", "refresh").with_priority(20),
      ShortcutInfo::new("q", "back").with_priority(30),
    ]
  }
}
