//! Tracing setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file under the
//! data directory. One-shot commands log to stderr.

use std::path::Path;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
  Quiet,
  #[default]
  Normal,
  Verbose,
  Trace,
}

impl Verbosity {
  /// Map `-q` and a repeated `-v` flag count. Quiet wins.
  pub fn from_flags(quiet: bool, count: u8) -> Self {
    if quiet {
      return Self::Quiet;
    }
    match count {
      0 => Self::Normal,
      1 => Self::Verbose,
      _ => Self::Trace,
    }
  }

  pub fn level(&self) -> Level {
    match self {
      Self::Quiet => Level::ERROR,
      Self::Normal => Level::INFO,
      Self::Verbose => Level::DEBUG,
      Self::Trace => Level::TRACE,
    }
  }
}

fn env_filter(verbosity: Verbosity) -> EnvFilter {
  // RUST_LOG wins over the flag
  EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(format!("notesync={}", verbosity.level())))
}

/// Log to `<dir>/notesync.log`. Keep the guard alive until exit or buffered
/// lines are lost.
pub fn init_file_logging(dir: &Path, verbosity: Verbosity) -> std::io::Result<WorkerGuard> {
  std::fs::create_dir_all(dir)?;
  let appender = tracing_appender::rolling::never(dir, "notesync.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let _ = tracing_subscriber::registry()
    .with(env_filter(verbosity))
    .with(fmt::layer().with_writer(writer).with_ansi(false))
    .try_init();

  Ok(guard)
}

/// Log to stderr
pub fn init_stderr_logging(verbosity: Verbosity) {
  let _ = tracing_subscriber::registry()
    .with(env_filter(verbosity))
    .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
    .try_init();
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_verbosity_from_flags() {
    assert_eq!(Verbosity::from_flags(false, 0), Verbosity::Normal);
    assert_eq!(Verbosity::from_flags(false, 1), Verbosity::Verbose);
    assert_eq!(Verbosity::from_flags(false, 4), Verbosity::Trace);
    assert_eq!(Verbosity::from_flags(true, 0), Verbosity::Quiet);
    assert_eq!(Verbosity::from_flags(true, 2), Verbosity::Quiet);
  }

  #[test]
  fn test_verbosity_to_level() {
    assert_eq!(Verbosity::Quiet.level(), Level::ERROR);
    assert_eq!(Verbosity::Normal.level(), Level::INFO);
    assert_eq!(Verbosity::Verbose.level(), Level::DEBUG);
    assert_eq!(Verbosity::Trace.level(), Level::TRACE);
  }

  #[test]
  fn test_init_stderr_logging_twice_does_not_panic() {
    init_stderr_logging(Verbosity::Quiet);
    init_stderr_logging(Verbosity::Normal);
  }
}
