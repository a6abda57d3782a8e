mod app;
mod assets;
mod cli;
mod commands;
mod config;
mod db;
mod event;
mod logging;
mod notes;
mod session;
mod store;
mod sync;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

use db::Database;
use logging::Verbosity;

#[derive(Parser, Debug)]
#[command(name = "notesync")]
#[command(about = "An offline-capable terminal client for a remote notes service")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/notesync/config.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Start offline: nothing is sent to the server
  #[arg(long, global = true)]
  offline: bool,

  /// Keep the local store in memory instead of on disk
  #[arg(long, global = true)]
  ephemeral: bool,

  /// More logging (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count, global = true)]
  verbose: u8,

  /// Log errors only
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  quiet: bool,

  #[command(subcommand)]
  command: Option<cli::Command>,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let verbosity = Verbosity::from_flags(args.quiet, args.verbose);

  // Load configuration
  let config = config::Config::load(args.config.as_deref())?;

  // Override connectivity if specified on command line
  let config = if args.offline {
    config::Config {
      offline: true,
      ..config
    }
  } else {
    config
  };

  let db = if args.ephemeral {
    Database::open_in_memory()?
  } else {
    Database::open(&config.database_path()?)?
  };
  let db = Arc::new(db);

  match args.command {
    Some(command) => {
      logging::init_stderr_logging(verbosity);
      cli::run(command, &config, db).await
    }
    None => {
      let _guard = logging::init_file_logging(&db::data_dir()?, verbosity)?;
      let mut app = app::App::new(&config, db)?;
      app.run().await
    }
  }
}
