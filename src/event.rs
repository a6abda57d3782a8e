use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::notes::Note;
use crate::session::Session;
use crate::sync::{LogEntry, NoteView};

/// Application events
#[derive(Debug)]
pub enum Event {
  /// Terminal key press
  Key(KeyEvent),
  /// Periodic tick for UI refresh
  Tick,
  /// Result of a background note operation
  Note(NoteEvent),
}

/// Visible effects reported by background tasks
#[derive(Debug)]
pub enum NoteEvent {
  Added(Note),
  Updated(Note),
  Removed(i64),
  Loaded(Vec<Note>),
  Log(LogEntry),
  SessionOpened(Session),
}

/// Forwards sync effects to the UI loop
#[derive(Debug, Clone)]
pub struct EventSender {
  tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
  pub fn new(tx: mpsc::UnboundedSender<Event>) -> Self {
    Self { tx }
  }

  pub fn send(&self, event: NoteEvent) {
    // The receiver only goes away on shutdown
    let _ = self.tx.send(Event::Note(event));
  }
}

impl NoteView for EventSender {
  fn note_added(&self, note: &Note) {
    self.send(NoteEvent::Added(note.clone()));
  }

  fn note_updated(&self, note: &Note) {
    self.send(NoteEvent::Updated(note.clone()));
  }

  fn note_removed(&self, id: i64) {
    self.send(NoteEvent::Removed(id));
  }

  fn notes_loaded(&self, notes: &[Note]) {
    self.send(NoteEvent::Loaded(notes.to_vec()));
  }

  fn log(&self, entry: LogEntry) {
    self.send(NoteEvent::Log(entry));
  }
}

/// Event handler that produces events from terminal input and a tick timer
pub struct EventHandler {
  tx: mpsc::UnboundedSender<Event>,
  rx: mpsc::UnboundedReceiver<Event>,
}

impl EventHandler {
  /// Create a new event handler with the given tick rate
  pub fn new(tick_rate: Duration) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    // Terminal polling blocks, keep it off the async workers
    tokio::task::spawn_blocking(move || loop {
      if event::poll(tick_rate).unwrap_or(false) {
        if let Ok(CrosstermEvent::Key(key)) = event::read() {
          if input_tx.send(Event::Key(key)).is_err() {
            break;
          }
        }
      } else if input_tx.send(Event::Tick).is_err() {
        break;
      }
    });

    Self { tx, rx }
  }

  /// Sender for background tasks
  pub fn sender(&self) -> EventSender {
    EventSender::new(self.tx.clone())
  }

  /// Receive the next event
  pub async fn next(&mut self) -> Option<Event> {
    self.rx.recv().await
  }
}
