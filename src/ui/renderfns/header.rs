use crate::session::Session;
use crate::sync::Connectivity;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Draw the header bar with server, connectivity and session
pub fn draw_header(
  frame: &mut Frame,
  area: Rect,
  server_url: &str,
  connectivity: Connectivity,
  session: &Session,
) {
  let domain = extract_domain(server_url);

  let status_style = match connectivity {
    Connectivity::Online => Style::default().fg(Color::Green).bold(),
    Connectivity::Offline => Style::default().fg(Color::Red).bold(),
  };

  let header = Line::from(vec![
    Span::styled(" notesync ", Style::default().fg(Color::Cyan).bold()),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", domain), Style::default().fg(Color::White)),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(format!(" {} ", connectivity.label()), status_style),
    Span::styled("│", Style::default().fg(Color::DarkGray)),
    Span::styled(
      format!(" session {} ", session_label(session)),
      Style::default().fg(Color::DarkGray),
    ),
  ]);

  let paragraph = Paragraph::new(header).style(Style::default().bg(Color::Black));

  frame.render_widget(paragraph, area);
}

fn session_label(session: &Session) -> &str {
  if !session.is_open() {
    return "-";
  }
  session.identifier().unwrap_or("open")
}

/// Extract domain from a server URL
fn extract_domain(url: &str) -> &str {
  url
    .strip_prefix("https://")
    .or_else(|| url.strip_prefix("http://"))
    .unwrap_or(url)
    .split('/')
    .next()
    .unwrap_or(url)
}
