use crate::sync::{LogEntry, LogLevel};
use crate::ui::renderfns::level_color;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem};

/// Draw the most recent operation log entries, newest at the bottom
pub fn draw_log_panel(frame: &mut Frame, area: Rect, entries: &[LogEntry]) {
  let block = Block::default()
    .title(" Log ")
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::DarkGray));

  let visible = area.height.saturating_sub(2) as usize;
  let start = entries.len().saturating_sub(visible);

  let items: Vec<ListItem> = entries[start..]
    .iter()
    .map(|entry| {
      let marker = match entry.level {
        LogLevel::Info => "·",
        LogLevel::Success => "✓",
        LogLevel::Failure => "✗",
      };
      let mut style = Style::default().fg(level_color(entry.level));
      if entry.is_failure() {
        style = style.add_modifier(Modifier::BOLD);
      }
      let line = Line::from(vec![
        Span::styled(
          entry.at.with_timezone(&chrono::Local).format("%H:%M:%S ").to_string(),
          Style::default().fg(Color::DarkGray),
        ),
        Span::styled(
          format!("{} {}", marker, entry.message),
          style,
        ),
      ]);
      ListItem::new(line)
    })
    .collect();

  frame.render_widget(List::new(items).block(block), area);
}
