use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// One-line footer: `Pokemon > Pikachu #025` plus the latest status message
pub fn draw_footer(frame: &mut Frame, area: Rect, breadcrumb: &[String], status: Option<&str>) {
  let last = breadcrumb.len().saturating_sub(1);
  let separator = Span::styled(" > ", Style::default().fg(Color::DarkGray));

  let mut spans = vec![Span::raw(" ")];
  for (i, label) in breadcrumb.iter().enumerate() {
    if i > 0 {
      spans.push(separator.clone());
    }
    let style = if i == last {
      Style::default().fg(Color::Cyan).bold()
    } else {
      Style::default().fg(Color::Gray)
    };
    spans.push(Span::styled(label.as_str(), style));
  }

  if let Some(status) = status {
    spans.push(Span::styled("  │  ", Style::default().fg(Color::DarkGray)));
    spans.push(Span::styled(status, Style::default().fg(Color::Yellow)));
  }

  frame.render_widget(
    Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black)),
    area,
  );
}
