use crate::sync::LogLevel;
use ratatui::prelude::Color;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max_len: usize) -> String {
  if s.chars().count() <= max_len {
    s.to_string()
  } else {
    let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
    format!("{}...", kept)
  }
}

/// Get the display color for an operation log level
pub fn level_color(level: LogLevel) -> Color {
  match level {
    LogLevel::Info => Color::White,
    LogLevel::Success => Color::Green,
    LogLevel::Failure => Color::Red,
  }
}
