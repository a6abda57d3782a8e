//! Sync policy between the notes service and the local store.

use std::sync::Arc;
use tracing::{info, warn};

use crate::notes::error::Result;
use crate::notes::{Note, NoteError, NoteService};
use crate::store::LocalStore;

use super::view::{LogEntry, NoteView};
use super::Connectivity;

/// Where the notes returned by [`NoteSync::load`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
  /// Fresh from the service; the local store now mirrors it
  Remote,
  /// The service could not be reached, served the local snapshot
  LocalFallback,
  /// Offline, served the local snapshot
  Local,
}

/// Result of a load, including the source of the data.
#[derive(Debug, Clone)]
pub struct Loaded {
  pub notes: Vec<Note>,
  pub source: LoadSource,
}

/// Routes note operations to the service or the local store.
///
/// Read-modify-write of the stored collection is not atomic: two operations
/// running at the same time can lose one of the writes.
pub struct NoteSync<C: NoteService, S: LocalStore> {
  client: Arc<C>,
  store: Arc<S>,
  key: String,
}

impl<C: NoteService, S: LocalStore> NoteSync<C, S> {
  pub fn new(client: C, store: S, key: impl Into<String>) -> Self {
    Self::from_shared(Arc::new(client), Arc::new(store), key)
  }

  pub fn from_shared(client: Arc<C>, store: Arc<S>, key: impl Into<String>) -> Self {
    Self {
      client,
      store,
      key: key.into(),
    }
  }

  pub fn client(&self) -> &C {
    &self.client
  }

  /// Current local snapshot
  pub fn snapshot(&self) -> Vec<Note> {
    self.store.get(&self.key)
  }

  fn save(&self, notes: &[Note]) -> Result<()> {
    self
      .store
      .set(&self.key, notes)
      .map_err(|e| NoteError::Store(e.to_string()))
  }

  /// Log a failed operation and hand the error back.
  fn fail<T>(&self, view: &dyn NoteView, action: &str, err: NoteError) -> Result<T> {
    warn!(action, error = %err, "note operation failed");
    view.log(LogEntry::failure(format!(
      "Failed to {}: {}",
      action,
      err.user_message()
    )));
    Err(err)
  }

  /// Create a note on the service and append it locally.
  ///
  /// Offline, nothing is attempted and no local-only note is made.
  pub async fn create(
    &self,
    connectivity: Connectivity,
    content: &str,
    view: &dyn NoteView,
  ) -> Result<Note> {
    if !connectivity.is_online() {
      return self.fail(view, "create note", NoteError::Offline);
    }

    let note = match self.client.create(content).await {
      Ok(note) => note,
      Err(e) => return self.fail(view, "create note", e),
    };

    let mut notes = self.snapshot();
    notes.push(note.clone());
    if let Err(e) = self.save(&notes) {
      return self.fail(view, "create note", e);
    }

    info!(id = note.id, "note created");
    view.note_added(&note);
    view.log(LogEntry::success(format!("Created note {}", note.id)));
    Ok(note)
  }

  /// Update a note on the service. The local copy changes only once the
  /// service confirms.
  pub async fn update(
    &self,
    connectivity: Connectivity,
    note: &Note,
    view: &dyn NoteView,
  ) -> Result<()> {
    if !connectivity.is_online() {
      return self.fail(view, "update note", NoteError::Offline);
    }

    match self.client.update(note).await {
      Ok(true) => {}
      Ok(false) => {
        let err = NoteError::Remote(format!("update of note {} was rejected", note.id));
        return self.fail(view, "update note", err);
      }
      Err(e) => return self.fail(view, "update note", e),
    }

    let mut notes = self.snapshot();
    for existing in notes.iter_mut().filter(|n| n.id == note.id) {
      existing.note = note.note.clone();
    }
    if let Err(e) = self.save(&notes) {
      return self.fail(view, "update note", e);
    }

    info!(id = note.id, "note updated");
    view.note_updated(note);
    view.log(LogEntry::success(format!("Updated note {}", note.id)));
    Ok(())
  }

  /// Delete notes. Online, the ids leave the local store whether or not the
  /// service confirms the delete. Returns the service's confirmation.
  pub async fn delete(
    &self,
    connectivity: Connectivity,
    ids: &[i64],
    view: &dyn NoteView,
  ) -> Result<bool> {
    if !connectivity.is_online() {
      return self.fail(view, "delete notes", NoteError::Offline);
    }

    let confirmed = match self.client.delete(ids).await {
      Ok(true) => true,
      Ok(false) => {
        warn!(?ids, "service did not confirm delete");
        view.log(LogEntry::failure(format!(
          "Server did not confirm deleting {}",
          format_ids(ids)
        )));
        false
      }
      Err(e) => {
        warn!(?ids, error = %e, "delete request failed");
        view.log(LogEntry::failure(format!(
          "Failed to delete notes: {}",
          e.user_message()
        )));
        false
      }
    };

    let mut notes = self.snapshot();
    notes.retain(|n| !ids.contains(&n.id));
    if let Err(e) = self.save(&notes) {
      return self.fail(view, "delete notes", e);
    }

    for id in ids {
      view.note_removed(*id);
    }
    if confirmed {
      view.log(LogEntry::success(format!("Deleted {}", format_ids(ids))));
    }
    Ok(confirmed)
  }

  /// Load all notes and render them once.
  ///
  /// Online, the service's set replaces the local snapshot entirely. If the
  /// request fails the existing snapshot is used untouched.
  pub async fn load(&self, connectivity: Connectivity, view: &dyn NoteView) -> Loaded {
    let loaded = if connectivity.is_online() {
      match self.client.list_all().await {
        Ok(notes) => {
          if let Err(e) = self.save(&notes) {
            warn!(error = %e, "could not mirror notes locally");
            view.log(LogEntry::failure(format!(
              "Loaded notes but {}",
              e.user_message().to_lowercase()
            )));
          }
          Loaded {
            notes,
            source: LoadSource::Remote,
          }
        }
        Err(e) => {
          warn!(error = %e, "falling back to local notes");
          view.log(LogEntry::failure(format!(
            "Failed to load notes: {} Showing saved notes.",
            e.user_message()
          )));
          Loaded {
            notes: self.snapshot(),
            source: LoadSource::LocalFallback,
          }
        }
      }
    } else {
      Loaded {
        notes: self.snapshot(),
        source: LoadSource::Local,
      }
    };

    view.notes_loaded(&loaded.notes);
    view.log(LogEntry::info(format!(
      "Loaded {} notes ({})",
      loaded.notes.len(),
      match loaded.source {
        LoadSource::Remote => "server",
        LoadSource::LocalFallback | LoadSource::Local => "saved",
      }
    )));
    loaded
  }

  /// Record a connectivity transition. Nothing is reconciled.
  pub fn connectivity_changed(&self, now: Connectivity, view: &dyn NoteView) {
    info!(status = now.label(), "connectivity changed");
    view.log(LogEntry::info(format!("You are now {}", now.label())));
  }
}

impl<C: NoteService, S: LocalStore> Clone for NoteSync<C, S> {
  fn clone(&self) -> Self {
    Self {
      client: Arc::clone(&self.client),
      store: Arc::clone(&self.store),
      key: self.key.clone(),
    }
  }
}

fn format_ids(ids: &[i64]) -> String {
  let list = ids
    .iter()
    .map(|id| id.to_string())
    .collect::<Vec<_>>()
    .join(", ");
  if ids.len() == 1 {
    format!("note {}", list)
  } else {
    format!("notes {}", list)
  }
}

#[cfg(test)]
pub(crate) mod testing {
  //! Scripted service and recording view shared by tests.

  use super::*;
  use async_trait::async_trait;
  use std::sync::Mutex;

  use crate::sync::LogLevel;

  #[derive(Default)]
  pub struct FakeState {
    pub notes: Vec<Note>,
    pub next_id: i64,
    pub fail_create: bool,
    pub fail_list: bool,
    pub update_result: Option<bool>,
    pub delete_result: Option<bool>,
    pub fail_delete: bool,
    pub calls: usize,
  }

  #[derive(Default)]
  pub struct FakeService {
    pub state: Mutex<FakeState>,
  }

  impl FakeService {
    pub fn with_notes(notes: Vec<Note>) -> Self {
      let next_id = notes.iter().map(|n| n.id).max().unwrap_or(0) + 1;
      Self {
        state: Mutex::new(FakeState {
          notes,
          next_id,
          update_result: Some(true),
          delete_result: Some(true),
          ..Default::default()
        }),
      }
    }

    pub fn calls(&self) -> usize {
      self.state.lock().unwrap().calls
    }

    pub fn notes(&self) -> Vec<Note> {
      self.state.lock().unwrap().notes.clone()
    }
  }

  fn unreachable_error() -> NoteError {
    NoteError::Remote("connection refused".to_string())
  }

  #[async_trait]
  impl NoteService for FakeService {
    async fn list_all(&self) -> Result<Vec<Note>> {
      let mut state = self.state.lock().unwrap();
      state.calls += 1;
      if state.fail_list {
        return Err(unreachable_error());
      }
      Ok(state.notes.clone())
    }

    async fn create(&self, content: &str) -> Result<Note> {
      let mut state = self.state.lock().unwrap();
      state.calls += 1;
      if state.fail_create {
        return Err(NoteError::Remote("create response carried no note".to_string()));
      }
      let note = Note::new(state.next_id.max(1), content);
      state.next_id = note.id + 1;
      state.notes.push(note.clone());
      Ok(note)
    }

    async fn update(&self, note: &Note) -> Result<bool> {
      let mut state = self.state.lock().unwrap();
      state.calls += 1;
      let accepted = state.update_result.unwrap_or(true);
      if accepted {
        for existing in state.notes.iter_mut().filter(|n| n.id == note.id) {
          existing.note = note.note.clone();
        }
      }
      Ok(accepted)
    }

    async fn delete(&self, ids: &[i64]) -> Result<bool> {
      let mut state = self.state.lock().unwrap();
      state.calls += 1;
      if state.fail_delete {
        return Err(unreachable_error());
      }
      let accepted = state.delete_result.unwrap_or(true);
      if accepted {
        state.notes.retain(|n| !ids.contains(&n.id));
      }
      Ok(accepted)
    }

    async fn identifier(&self) -> Result<String> {
      let mut state = self.state.lock().unwrap();
      state.calls += 1;
      if state.fail_list {
        return Err(unreachable_error());
      }
      Ok("session-abc".to_string())
    }
  }

  #[derive(Debug, Clone, PartialEq, Eq)]
  pub enum Effect {
    Added(Note),
    Updated(Note),
    Removed(i64),
    Loaded(Vec<Note>),
    Log(LogLevel),
  }

  #[derive(Default)]
  pub struct RecordingView {
    pub effects: Mutex<Vec<Effect>>,
  }

  impl RecordingView {
    pub fn effects(&self) -> Vec<Effect> {
      self.effects.lock().unwrap().clone()
    }

    /// Effects other than log lines
    pub fn ui_effects(&self) -> Vec<Effect> {
      self
        .effects()
        .into_iter()
        .filter(|e| !matches!(e, Effect::Log(_)))
        .collect()
    }

    pub fn has_failure(&self) -> bool {
      self.effects().contains(&Effect::Log(LogLevel::Failure))
    }
  }

  impl NoteView for RecordingView {
    fn note_added(&self, note: &Note) {
      self.effects.lock().unwrap().push(Effect::Added(note.clone()));
    }

    fn note_updated(&self, note: &Note) {
      self
        .effects
        .lock()
        .unwrap()
        .push(Effect::Updated(note.clone()));
    }

    fn note_removed(&self, id: i64) {
      self.effects.lock().unwrap().push(Effect::Removed(id));
    }

    fn notes_loaded(&self, notes: &[Note]) {
      self
        .effects
        .lock()
        .unwrap()
        .push(Effect::Loaded(notes.to_vec()));
    }

    fn log(&self, entry: LogEntry) {
      self.effects.lock().unwrap().push(Effect::Log(entry.level));
    }
  }
}

#[cfg(test)]
mod tests {
  use super::testing::{Effect, FakeService, RecordingView};
  use super::*;
  use crate::store::MemoryStore;

  const KEY: &str = "notes";

  fn sync_with(remote: Vec<Note>, local: Vec<Note>) -> NoteSync<FakeService, MemoryStore> {
    let store = MemoryStore::new();
    store.set(KEY, &local).unwrap();
    NoteSync::new(FakeService::with_notes(remote), store, KEY)
  }

  #[tokio::test]
  async fn test_creates_then_load_matches_remote() {
    let sync = sync_with(vec![], vec![]);
    let view = RecordingView::default();

    for text in ["one", "two", "three"] {
      sync.create(Connectivity::Online, text, &view).await.unwrap();
    }
    let loaded = sync.load(Connectivity::Online, &view).await;

    assert_eq!(loaded.source, LoadSource::Remote);
    assert_eq!(sync.snapshot(), sync.client().notes());
    assert_eq!(sync.snapshot().len(), 3);
  }

  #[tokio::test]
  async fn test_create_appends_and_renders() {
    let sync = sync_with(vec![Note::new(1, "a")], vec![Note::new(1, "a")]);
    let view = RecordingView::default();

    let note = sync.create(Connectivity::Online, "b", &view).await.unwrap();

    assert_eq!(note, Note::new(2, "b"));
    assert_eq!(sync.snapshot(), vec![Note::new(1, "a"), Note::new(2, "b")]);
    assert_eq!(view.ui_effects(), vec![Effect::Added(Note::new(2, "b"))]);
  }

  #[tokio::test]
  async fn test_create_offline_fails_without_touching_anything() {
    let local = vec![Note::new(1, "a")];
    let sync = sync_with(vec![], local.clone());
    let view = RecordingView::default();

    let err = sync
      .create(Connectivity::Offline, "b", &view)
      .await
      .unwrap_err();

    assert!(err.is_offline());
    assert_eq!(sync.snapshot(), local);
    assert_eq!(sync.client().calls(), 0);
    assert!(view.ui_effects().is_empty());
    assert!(view.has_failure());
  }

  #[tokio::test]
  async fn test_create_remote_failure_leaves_store_unchanged() {
    let local = vec![Note::new(1, "a")];
    let sync = sync_with(vec![], local.clone());
    sync.client().state.lock().unwrap().fail_create = true;
    let view = RecordingView::default();

    let err = sync
      .create(Connectivity::Online, "b", &view)
      .await
      .unwrap_err();

    assert!(matches!(err, NoteError::Remote(_)));
    assert_eq!(sync.snapshot(), local);
    assert!(view.has_failure());
  }

  #[tokio::test]
  async fn test_update_replaces_only_matching_note() {
    let local = vec![Note::new(1, "a"), Note::new(2, "b"), Note::new(3, "c")];
    let sync = sync_with(local.clone(), local);
    let view = RecordingView::default();

    let edited = Note::new(2, "B!");
    sync
      .update(Connectivity::Online, &edited, &view)
      .await
      .unwrap();

    assert_eq!(
      sync.snapshot(),
      vec![Note::new(1, "a"), Note::new(2, "B!"), Note::new(3, "c")]
    );
    assert_eq!(view.ui_effects(), vec![Effect::Updated(edited)]);
  }

  #[tokio::test]
  async fn test_update_rejected_by_service_keeps_local() {
    let local = vec![Note::new(1, "a")];
    let sync = sync_with(local.clone(), local.clone());
    sync.client().state.lock().unwrap().update_result = Some(false);
    let view = RecordingView::default();

    let err = sync
      .update(Connectivity::Online, &Note::new(1, "changed"), &view)
      .await
      .unwrap_err();

    assert!(matches!(err, NoteError::Remote(_)));
    assert_eq!(sync.snapshot(), local);
    assert!(view.ui_effects().is_empty());
  }

  #[tokio::test]
  async fn test_update_offline_fails() {
    let local = vec![Note::new(1, "a")];
    let sync = sync_with(local.clone(), local.clone());
    let view = RecordingView::default();

    let err = sync
      .update(Connectivity::Offline, &Note::new(1, "changed"), &view)
      .await
      .unwrap_err();

    assert!(err.is_offline());
    assert_eq!(sync.snapshot(), local);
    assert_eq!(sync.client().calls(), 0);
  }

  #[tokio::test]
  async fn test_delete_removes_locally_when_confirmed() {
    let local = vec![Note::new(1, "a"), Note::new(2, "b"), Note::new(3, "c")];
    let sync = sync_with(local.clone(), local);
    let view = RecordingView::default();

    let confirmed = sync
      .delete(Connectivity::Online, &[1, 3], &view)
      .await
      .unwrap();

    assert!(confirmed);
    assert_eq!(sync.snapshot(), vec![Note::new(2, "b")]);
    assert_eq!(
      view.ui_effects(),
      vec![Effect::Removed(1), Effect::Removed(3)]
    );
  }

  #[tokio::test]
  async fn test_delete_removes_locally_even_when_rejected() {
    let local = vec![Note::new(1, "a"), Note::new(2, "b"), Note::new(3, "c")];
    let sync = sync_with(local.clone(), local);
    sync.client().state.lock().unwrap().delete_result = Some(false);
    let view = RecordingView::default();

    let confirmed = sync
      .delete(Connectivity::Online, &[1, 3], &view)
      .await
      .unwrap();

    assert!(!confirmed);
    assert_eq!(sync.snapshot(), vec![Note::new(2, "b")]);
    assert!(view.has_failure());
  }

  #[tokio::test]
  async fn test_delete_removes_locally_even_when_request_fails() {
    let local = vec![Note::new(1, "a"), Note::new(2, "b"), Note::new(3, "c")];
    let sync = sync_with(local.clone(), local);
    sync.client().state.lock().unwrap().fail_delete = true;
    let view = RecordingView::default();

    let confirmed = sync
      .delete(Connectivity::Online, &[1, 3], &view)
      .await
      .unwrap();

    assert!(!confirmed);
    assert_eq!(sync.snapshot(), vec![Note::new(2, "b")]);
  }

  #[tokio::test]
  async fn test_delete_offline_fails() {
    let local = vec![Note::new(1, "a")];
    let sync = sync_with(local.clone(), local.clone());
    let view = RecordingView::default();

    let err = sync
      .delete(Connectivity::Offline, &[1], &view)
      .await
      .unwrap_err();

    assert!(err.is_offline());
    assert_eq!(sync.snapshot(), local);
    assert_eq!(sync.client().calls(), 0);
  }

  #[tokio::test]
  async fn test_load_online_replaces_snapshot() {
    let remote = vec![Note::new(10, "x"), Note::new(11, "y")];
    let sync = sync_with(remote.clone(), vec![Note::new(1, "unrelated")]);
    let view = RecordingView::default();

    let loaded = sync.load(Connectivity::Online, &view).await;

    assert_eq!(loaded.source, LoadSource::Remote);
    assert_eq!(loaded.notes, remote);
    assert_eq!(sync.snapshot(), remote);
    assert_eq!(view.ui_effects(), vec![Effect::Loaded(remote)]);
  }

  #[tokio::test]
  async fn test_load_online_failure_uses_prior_snapshot() {
    let local = vec![Note::new(1, "a"), Note::new(2, "b")];
    let sync = sync_with(vec![Note::new(9, "z")], local.clone());
    sync.client().state.lock().unwrap().fail_list = true;
    let view = RecordingView::default();

    let loaded = sync.load(Connectivity::Online, &view).await;

    assert_eq!(loaded.source, LoadSource::LocalFallback);
    assert_eq!(loaded.notes, local);
    assert_eq!(sync.snapshot(), local);
    assert_eq!(view.ui_effects(), vec![Effect::Loaded(local)]);
    assert!(view.has_failure());
  }

  #[tokio::test]
  async fn test_load_offline_uses_snapshot_without_request() {
    let local = vec![Note::new(1, "a")];
    let sync = sync_with(vec![Note::new(9, "z")], local.clone());
    let view = RecordingView::default();

    let loaded = sync.load(Connectivity::Offline, &view).await;

    assert_eq!(loaded.source, LoadSource::Local);
    assert_eq!(loaded.notes, local);
    assert_eq!(sync.client().calls(), 0);
  }

  #[test]
  fn test_format_ids() {
    assert_eq!(format_ids(&[4]), "note 4");
    assert_eq!(format_ids(&[1, 3]), "notes 1, 3");
  }
}
