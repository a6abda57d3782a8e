use crate::notes::Note;
use crate::ui::renderfns::truncate;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

pub fn draw_note_list(frame: &mut Frame, area: Rect, notes: &[Note], selected: usize, loading: bool) {
  let title = if loading {
    " Notes (loading...) ".to_string()
  } else {
    format!(" Notes ({}) ", notes.len())
  };

  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(Color::Blue));

  if notes.is_empty() && !loading {
    let paragraph = Paragraph::new("No notes yet. Press 'a' to write one.")
      .block(block)
      .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(paragraph, area);
    return;
  }

  let width = area.width.saturating_sub(12) as usize;
  let items: Vec<ListItem> = notes
    .iter()
    .map(|note| {
      let line = Line::from(vec![
        Span::styled(format!("{:>6}", note.id), Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::raw(truncate(&note.note, width.max(8))),
      ]);
      ListItem::new(line)
    })
    .collect();

  let list = List::new(items)
    .block(block)
    .highlight_style(
      Style::default()
        .bg(Color::DarkGray)
        .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("> ");

  let mut state = ListState::default();
  state.select(Some(selected));

  frame.render_stateful_widget(list, area, &mut state);
}
