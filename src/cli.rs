//! Non-interactive commands.

use clap::Subcommand;
use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use std::sync::Arc;

use crate::assets::{AssetCache, AssetStore, FetchSource, HttpFetcher};
use crate::config::Config;
use crate::db::Database;
use crate::notes::client::parse_base_url;
use crate::notes::{Note, NoteError, NotesClient};
use crate::store::SqliteStore;
use crate::sync::{Connectivity, LoadSource, LogEntry, LogLevel, NoteSync, NoteView};

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Print all notes
  List,
  /// Create a note
  Add {
    /// Note text
    text: Vec<String>,
  },
  /// Replace the text of a note
  Edit {
    id: i64,
    /// New text
    text: Vec<String>,
  },
  /// Delete notes
  Rm {
    #[arg(required = true)]
    ids: Vec<i64>,
  },
  /// Manage the asset cache
  Assets {
    #[command(subcommand)]
    action: AssetsAction,
  },
}

#[derive(Subcommand, Debug)]
pub enum AssetsAction {
  /// Fetch the manifest into the current generation
  Install,
  /// Delete every generation except the current one
  Activate,
  /// Print an asset, cache first
  Get { url: String },
  /// Show cached generations
  Status,
}

/// Prints sync effects to stdout
struct ConsoleView;

impl ConsoleView {
  fn print_note(note: &Note) {
    println!("{:>6}  {}", note.id, note.note);
  }
}

impl NoteView for ConsoleView {
  fn note_added(&self, note: &Note) {
    Self::print_note(note);
  }

  fn note_updated(&self, note: &Note) {
    Self::print_note(note);
  }

  fn note_removed(&self, _id: i64) {}

  fn notes_loaded(&self, notes: &[Note]) {
    for note in notes {
      Self::print_note(note);
    }
  }

  fn log(&self, entry: LogEntry) {
    match entry.level {
      LogLevel::Failure => eprintln!("✗ {}", entry.message),
      LogLevel::Success => eprintln!("✓ {}", entry.message),
      LogLevel::Info => eprintln!("· {}", entry.message),
    }
  }
}

fn join_text(words: &[String]) -> Result<String> {
  let text = words.join(" ");
  if text.trim().is_empty() {
    return Err(eyre!("Note text must not be empty"));
  }
  Ok(text)
}

/// Run one command to completion.
pub async fn run(command: Command, config: &Config, db: Arc<Database>) -> Result<()> {
  let connectivity = config.initial_connectivity();

  match command {
    Command::Assets { action } => return run_assets(action, config, db).await,
    Command::List => {
      let sync = note_sync(config, db)?;
      let loaded = sync.load(connectivity, &ConsoleView).await;
      if loaded.source != LoadSource::Remote {
        eprintln!("(showing {} saved notes)", loaded.notes.len());
      }
    }
    Command::Add { text } => {
      let sync = note_sync(config, db)?;
      sync
        .create(connectivity, &join_text(&text)?, &ConsoleView)
        .await
        .map_err(surface)?;
    }
    Command::Edit { id, text } => {
      let sync = note_sync(config, db)?;
      let note = Note::new(id, join_text(&text)?);
      sync
        .update(connectivity, &note, &ConsoleView)
        .await
        .map_err(surface)?;
    }
    Command::Rm { ids } => {
      let sync = note_sync(config, db)?;
      let confirmed = sync
        .delete(connectivity, &ids, &ConsoleView)
        .await
        .map_err(surface)?;
      if !confirmed {
        return Err(eyre!("Removed locally, but the server did not confirm"));
      }
    }
  }

  Ok(())
}

/// The failure is already printed; keep the exit error short.
fn surface(err: NoteError) -> color_eyre::Report {
  if err.is_offline() {
    eyre!("Offline: nothing was changed")
  } else {
    eyre!(err)
  }
}

fn note_sync(config: &Config, db: Arc<Database>) -> Result<NoteSync<NotesClient, SqliteStore>> {
  let client = NotesClient::new(config)?;
  Ok(NoteSync::new(
    client,
    SqliteStore::new(db),
    config.storage.notes_key.clone(),
  ))
}

async fn run_assets(action: AssetsAction, config: &Config, db: Arc<Database>) -> Result<()> {
  let store = AssetStore::new(db);
  let cache = AssetCache::new(
    HttpFetcher::default(),
    store.clone(),
    config.assets.version.clone(),
    parse_base_url(config.asset_base_url())?,
    config.assets.manifest.clone(),
  );

  match action {
    AssetsAction::Install => {
      if config.initial_connectivity() == Connectivity::Offline {
        return Err(eyre!("Cannot install assets while offline"));
      }
      let count = cache.install().await?;
      println!("Cached {} assets into {}", count, cache.version());
    }
    AssetsAction::Activate => {
      let deleted = cache.activate()?;
      if deleted.is_empty() {
        println!("No stale generations");
      }
      for name in deleted {
        println!("Deleted {}", name);
      }
    }
    AssetsAction::Get { url } => {
      let served = cache
        .fetch(&url)
        .await
        .ok_or_else(|| eyre!("Could not load {}", url))?;
      let source = match served.source {
        FetchSource::Cache => "cache",
        FetchSource::Network => "network",
      };
      eprintln!(
        "{} {} ({}, {} bytes)",
        served.response.status,
        served.response.url,
        source,
        served.response.body.len()
      );
      std::io::stdout().write_all(&served.response.body)?;
    }
    AssetsAction::Status => {
      let state = cache.refresh_state()?;
      println!("current: {} ({:?})", cache.version(), state);
      for name in store.region_names()? {
        let marker = if name == cache.version() { "*" } else { " " };
        println!("{} {} ({} entries)", marker, name, store.count(&name)?);
      }
    }
  }

  Ok(())
}
