pub mod components;
mod renderfns;
mod views;

use crate::app::{App, Mode};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
  let chunks = Layout::default()
    .direction(Direction::Vertical)
    .constraints([
      Constraint::Length(1), // Header
      Constraint::Min(3),    // Notes
      Constraint::Length(8), // Operation log
      Constraint::Length(3), // Note input
      Constraint::Length(1), // Status bar
    ])
    .split(frame.area());

  renderfns::draw_header(
    frame,
    chunks[0],
    app.server_url(),
    app.connectivity(),
    app.session(),
  );

  views::draw_note_list(
    frame,
    chunks[1],
    app.notes(),
    app.selected(),
    app.is_loading(),
  );

  components::draw_log_panel(frame, chunks[2], app.log());

  draw_note_input(frame, chunks[3], app);
  draw_status_bar(frame, chunks[4], app);

  if *app.mode() == Mode::Command {
    let suggestions = app.autocomplete_suggestions();
    components::draw_command_overlay(
      frame,
      chunks[1],
      app.command_input(),
      &suggestions,
      app.selected_suggestion(),
    );
  }
}

fn draw_note_input(frame: &mut Frame, area: Rect, app: &App) {
  let (title, active) = match app.mode() {
    Mode::Compose => (" New note ".to_string(), true),
    Mode::Edit(id) => (format!(" Edit note {} ", id), true),
    _ => (" Note ".to_string(), false),
  };

  let border = if active { Color::Yellow } else { Color::DarkGray };
  let block = Block::default()
    .title(title)
    .borders(Borders::ALL)
    .border_style(Style::default().fg(border));

  let paragraph = Paragraph::new(app.input().value()).block(block);
  frame.render_widget(paragraph, area);

  if active {
    let offset = u16::try_from(app.input().cursor_position()).unwrap_or(u16::MAX);
    let x = area.x.saturating_add(1).saturating_add(offset);
    frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
  }
}

fn draw_status_bar(frame: &mut Frame, area: Rect, app: &App) {
  let (content, style) = match app.mode() {
    Mode::Normal => {
      let hint = " a:add  e:edit  d:delete  r:reload  o:online/offline  :command  q:quit";
      (hint.to_string(), Style::default().fg(Color::DarkGray))
    }
    Mode::Command => {
      let cmd = format!(":{}", app.command_input());
      (cmd, Style::default().fg(Color::Yellow))
    }
    Mode::Compose | Mode::Edit(_) => {
      let hint = if app.input().is_empty() {
        " Type the note text  Esc:cancel"
      } else {
        " Enter:save  Esc:cancel"
      };
      (hint.to_string(), Style::default().fg(Color::Cyan))
    }
  };

  let paragraph = Paragraph::new(content).style(style);
  frame.render_widget(paragraph, area);
}
