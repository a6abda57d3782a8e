use crate::assets::{AssetCache, AssetStore, HttpFetcher};
use crate::commands::{self, Command};
use crate::config::Config;
use crate::db::Database;
use crate::event::{Event, EventHandler, EventSender, NoteEvent};
use crate::notes::client::parse_base_url;
use crate::notes::{Note, NotesClient};
use crate::session::Session;
use crate::store::SqliteStore;
use crate::sync::{Connectivity, LogEntry, NoteSync, NoteView};
use crate::ui;
use crate::ui::components::{InputResult, TextInput};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
  disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;

/// Operation log lines kept in memory
const MAX_LOG_ENTRIES: usize = 200;

/// Input mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
  Normal,
  Command,
  /// Writing a new note
  Compose,
  /// Editing the note with this id
  Edit(i64),
}

/// Main application state
pub struct App {
  /// Notes in display order
  notes: Vec<Note>,
  selected: usize,
  loading: bool,

  /// Visible operation log, oldest first
  log: Vec<LogEntry>,

  /// Current input mode
  mode: Mode,

  /// Note text being composed or edited
  input: TextInput,

  /// Command input buffer (after pressing :)
  command_input: String,

  /// Selected autocomplete suggestion index
  selected_suggestion: usize,

  connectivity: Connectivity,
  session: Session,

  sync: NoteSync<NotesClient, SqliteStore>,
  assets: AssetCache<HttpFetcher>,

  /// Event sender for async tasks
  events: EventSender,

  /// Whether to quit
  should_quit: bool,
}

impl App {
  pub fn new(config: &Config, db: Arc<Database>) -> Result<Self> {
    let client = NotesClient::new(config)?;
    let store = SqliteStore::new(Arc::clone(&db));
    let sync = NoteSync::new(client, store, config.storage.notes_key.clone());

    let assets = AssetCache::new(
      HttpFetcher::default(),
      AssetStore::new(db),
      config.assets.version.clone(),
      parse_base_url(config.asset_base_url())?,
      config.assets.manifest.clone(),
    );

    // Replaced by the handler's sender in `run`
    let (tx, _rx) = mpsc::unbounded_channel();

    Ok(Self {
      notes: Vec::new(),
      selected: 0,
      loading: true,
      log: Vec::new(),
      mode: Mode::Normal,
      input: TextInput::new(),
      command_input: String::new(),
      selected_suggestion: 0,
      connectivity: config.initial_connectivity(),
      session: Session::default(),
      sync,
      assets,
      events: EventSender::new(tx),
      should_quit: false,
    })
  }

  pub async fn run(&mut self) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut events = EventHandler::new(Duration::from_millis(250));
    self.events = events.sender();

    self.open_session();
    self.load_notes();
    self.refresh_assets();

    // Main loop
    while !self.should_quit {
      terminal.draw(|frame| ui::draw(frame, self))?;

      if let Some(event) = events.next().await {
        self.handle_event(event);
      }
    }

    self.session.close();

    // Cleanup terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    Ok(())
  }

  fn open_session(&self) {
    let sync = self.sync.clone();
    let events = self.events.clone();
    let connectivity = self.connectivity;

    tokio::spawn(async move {
      let session = Session::open(sync.client(), connectivity, &events).await;
      events.send(NoteEvent::SessionOpened(session));
    });
  }

  fn load_notes(&mut self) {
    self.loading = true;
    let sync = self.sync.clone();
    let events = self.events.clone();
    let connectivity = self.connectivity;

    tokio::spawn(async move {
      sync.load(connectivity, &events).await;
    });
  }

  /// Install the current asset generation and purge older ones.
  fn refresh_assets(&self) {
    if !self.connectivity.is_online() {
      return;
    }
    let assets = self.assets.clone();
    let events = self.events.clone();

    tokio::spawn(async move {
      match assets.install().await {
        Ok(count) => {
          if count > 0 {
            events.log(LogEntry::success(format!(
              "Cached {} assets ({})",
              count,
              assets.version()
            )));
          }
          match assets.activate() {
            Ok(deleted) if !deleted.is_empty() => {
              events.log(LogEntry::info(format!(
                "Removed old asset caches: {}",
                deleted.join(", ")
              )));
            }
            Ok(_) => {}
            Err(e) => events.log(LogEntry::failure(format!("Asset cleanup failed: {}", e))),
          }
        }
        Err(e) => events.log(LogEntry::failure(format!("Asset caching failed: {}", e))),
      }
    });
  }

  fn create_note(&self, content: String) {
    let sync = self.sync.clone();
    let events = self.events.clone();
    let connectivity = self.connectivity;

    tokio::spawn(async move {
      // Failures are already in the operation log
      let _ = sync.create(connectivity, &content, &events).await;
    });
  }

  fn update_note(&self, note: Note) {
    let sync = self.sync.clone();
    let events = self.events.clone();
    let connectivity = self.connectivity;

    tokio::spawn(async move {
      let _ = sync.update(connectivity, &note, &events).await;
    });
  }

  fn delete_selected(&self) {
    let Some(note) = self.notes.get(self.selected) else {
      return;
    };
    let ids = vec![note.id];
    let sync = self.sync.clone();
    let events = self.events.clone();
    let connectivity = self.connectivity;

    tokio::spawn(async move {
      let _ = sync.delete(connectivity, &ids, &events).await;
    });
  }

  fn set_connectivity(&mut self, next: Connectivity) {
    if next == self.connectivity {
      return;
    }
    self.connectivity = next;
    self.sync.connectivity_changed(next, &self.events);
  }

  fn handle_event(&mut self, event: Event) {
    match event {
      Event::Key(key) => self.handle_key(key),
      Event::Tick => {} // UI refresh happens automatically
      Event::Note(note_event) => self.handle_note_event(note_event),
    }
  }

  fn handle_key(&mut self, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
      self.should_quit = true;
      return;
    }

    match self.mode {
      Mode::Normal => self.handle_normal_mode_key(key),
      Mode::Command => self.handle_command_mode_key(key),
      Mode::Compose | Mode::Edit(_) => self.handle_input_mode_key(key),
    }
  }

  fn handle_normal_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Char('q') => self.should_quit = true,

      // Navigation
      KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
      KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),

      // Note actions
      KeyCode::Char('a') => {
        self.input = TextInput::new();
        self.mode = Mode::Compose;
      }
      KeyCode::Char('e') | KeyCode::Enter => {
        if let Some(note) = self.notes.get(self.selected) {
          self.input = TextInput::with_value(&note.note);
          self.mode = Mode::Edit(note.id);
        }
      }
      KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
      KeyCode::Char('r') => self.load_notes(),
      KeyCode::Char('o') => self.set_connectivity(self.connectivity.toggled()),

      // Mode switches
      KeyCode::Char(':') => {
        self.mode = Mode::Command;
        self.command_input.clear();
      }

      _ => {}
    }
  }

  fn handle_input_mode_key(&mut self, key: KeyEvent) {
    match self.input.handle_key(key) {
      InputResult::Submitted(text) => {
        let text = text.trim().to_string();
        if !text.is_empty() {
          match self.mode {
            Mode::Compose => self.create_note(text),
            Mode::Edit(id) => self.update_note(Note::new(id, text)),
            _ => {}
          }
        }
        self.input.clear();
        self.mode = Mode::Normal;
      }
      InputResult::Cancelled => {
        self.input.clear();
        self.mode = Mode::Normal;
      }
      InputResult::Consumed | InputResult::NotHandled => {}
    }
  }

  fn handle_command_mode_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc => {
        self.mode = Mode::Normal;
        self.command_input.clear();
        self.selected_suggestion = 0;
      }
      KeyCode::Enter => {
        self.execute_command();
        if self.mode == Mode::Command {
          self.mode = Mode::Normal;
        }
        self.selected_suggestion = 0;
      }
      KeyCode::Tab | KeyCode::Down => {
        // Navigate autocomplete suggestions
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = (self.selected_suggestion + 1) % suggestions.len();
        }
      }
      KeyCode::BackTab | KeyCode::Up => {
        let suggestions = commands::get_suggestions(&self.command_input);
        if !suggestions.is_empty() {
          self.selected_suggestion = if self.selected_suggestion == 0 {
            suggestions.len() - 1
          } else {
            self.selected_suggestion - 1
          };
        }
      }
      KeyCode::Backspace => {
        self.command_input.pop();
        self.selected_suggestion = 0; // Reset selection on input change
      }
      KeyCode::Char(c) => {
        self.command_input.push(c);
        self.selected_suggestion = 0;
      }
      _ => {}
    }
  }

  fn execute_command(&mut self) {
    // Either the selected suggestion or the raw input
    let suggestions = commands::get_suggestions(&self.command_input);
    let cmd = if !suggestions.is_empty() && self.selected_suggestion < suggestions.len() {
      suggestions[self.selected_suggestion].name.to_string()
    } else {
      self.command_input.trim().to_lowercase()
    };

    match cmd.as_str() {
      "reload" => self.load_notes(),
      "online" => self.set_connectivity(Connectivity::Online),
      "offline" => self.set_connectivity(Connectivity::Offline),
      "assets" => self.refresh_assets(),
      "clear" => self.log.clear(),
      "quit" => self.should_quit = true,
      other => {
        info!(command = other, "unknown command");
        self.push_log(LogEntry::failure(format!("Unknown command: {}", other)));
      }
    }
    self.command_input.clear();
  }

  fn handle_note_event(&mut self, event: NoteEvent) {
    match event {
      NoteEvent::Added(note) => {
        self.notes.push(note);
      }
      NoteEvent::Updated(note) => {
        for existing in self.notes.iter_mut().filter(|n| n.id == note.id) {
          existing.note = note.note.clone();
        }
      }
      NoteEvent::Removed(id) => {
        self.notes.retain(|n| n.id != id);
        self.clamp_selection();
      }
      NoteEvent::Loaded(notes) => {
        self.notes = notes;
        self.loading = false;
        self.clamp_selection();
      }
      NoteEvent::Log(entry) => self.push_log(entry),
      NoteEvent::SessionOpened(session) => self.session = session,
    }
  }

  fn push_log(&mut self, entry: LogEntry) {
    self.log.push(entry);
    if self.log.len() > MAX_LOG_ENTRIES {
      let excess = self.log.len() - MAX_LOG_ENTRIES;
      self.log.drain(..excess);
    }
  }

  fn clamp_selection(&mut self) {
    if self.selected >= self.notes.len() {
      self.selected = self.notes.len().saturating_sub(1);
    }
  }

  fn move_selection(&mut self, delta: i32) {
    let len = self.notes.len();
    if len > 0 {
      self.selected = (self.selected as i32 + delta).rem_euclid(len as i32) as usize;
    }
  }

  // Accessors for UI rendering
  pub fn notes(&self) -> &[Note] {
    &self.notes
  }

  pub fn selected(&self) -> usize {
    self.selected
  }

  pub fn is_loading(&self) -> bool {
    self.loading
  }

  pub fn log(&self) -> &[LogEntry] {
    &self.log
  }

  pub fn mode(&self) -> &Mode {
    &self.mode
  }

  pub fn input(&self) -> &TextInput {
    &self.input
  }

  pub fn command_input(&self) -> &str {
    &self.command_input
  }

  pub fn connectivity(&self) -> Connectivity {
    self.connectivity
  }

  pub fn session(&self) -> &Session {
    &self.session
  }

  pub fn server_url(&self) -> &str {
    self.sync.client().base_url().as_str()
  }

  pub fn autocomplete_suggestions(&self) -> Vec<&'static Command> {
    commands::get_suggestions(&self.command_input)
  }

  pub fn selected_suggestion(&self) -> usize {
    self.selected_suggestion
  }
}
