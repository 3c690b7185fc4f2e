//! Application state store.
//!
//! One explicitly constructed `AppStore` per mounted overlay. Setters are the
//! only way to change state; three of them also write through to durable
//! storage. Losing storage mid-session drops the store to in-memory operation
//! for the rest of the session.

mod state;

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use crate::{
    models::{CommentVariation, Quiz, UserNote, VideoSummary},
    page::{PageChrome, VideoId},
    storage::{DurableStorage, API_KEY, FOCUS_MODE_KEY, NOTES_KEY},
};

pub use state::{AppState, StateChange, Tab};

pub const FOCUS_MODE_CLASS: &str = "youtube-focus-mode";

const CHANGE_CAPACITY: usize = 64;

const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_warn};

pub type SharedStore = Arc<Mutex<AppStore>>;

pub struct AppStore {
    state: AppState,
    /// `None` once storage has failed; never retried.
    storage: Option<Arc<dyn DurableStorage>>,
    chrome: Option<Arc<dyn PageChrome>>,
    changes: broadcast::Sender<StateChange>,
    /// Generation requests in flight; `is_loading` mirrors `> 0`.
    pending_requests: usize,
}

impl AppStore {
    /// Build a store, restoring the api key, focus mode and notes.
    pub fn new(storage: Arc<dyn DurableStorage>, chrome: Option<Arc<dyn PageChrome>>) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CAPACITY);
        let mut store = Self {
            state: AppState::default(),
            storage: Some(storage),
            chrome,
            changes,
            pending_requests: 0,
        };
        store.restore();
        store
    }

    pub fn into_shared(self) -> SharedStore {
        Arc::new(Mutex::new(self))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    pub fn is_persistent(&self) -> bool {
        self.storage.is_some()
    }

    pub fn has_api_key(&self) -> bool {
        self.state.api_key.is_some()
    }

    pub fn notes_for_video(&self, video_id: &VideoId) -> Vec<&UserNote> {
        self.state
            .user_notes
            .iter()
            .filter(|note| &note.video_id == video_id)
            .collect()
    }

    /// Returns false, without broadcasting, when `video_id` is already current.
    /// Both navigation paths may report the same video.
    pub fn set_current_video_id(&mut self, video_id: Option<VideoId>) -> bool {
        if self.state.current_video_id == video_id {
            return false;
        }
        log_debug!("current video -> {video_id:?}");
        self.state.current_video_id = video_id.clone();
        self.emit(StateChange::CurrentVideo(video_id));
        true
    }

    pub fn set_video_summary(&mut self, summary: Option<VideoSummary>) {
        self.state.video_summary = summary;
        self.emit(StateChange::Summary);
    }

    pub fn set_quiz(&mut self, quiz: Option<Quiz>) {
        self.state.quiz = quiz;
        self.emit(StateChange::Quiz);
    }

    pub fn set_user_notes(&mut self, notes: Vec<UserNote>) {
        self.state.user_notes = notes;
        self.persist_notes();
        self.emit(StateChange::Notes);
    }

    pub fn add_user_note(&mut self, note: UserNote) {
        self.state.user_notes.push(note);
        self.persist_notes();
        self.emit(StateChange::Notes);
    }

    /// Create a note for the video being summarised (or, failing that, the
    /// current video). Blank text or no video yields `None`.
    pub fn take_note(
        &mut self,
        label: impl Into<String>,
        seconds: u64,
        text: &str,
    ) -> Option<UserNote> {
        if text.trim().is_empty() {
            return None;
        }
        let video_id = self
            .state
            .video_summary
            .as_ref()
            .map(|summary| summary.video_id.clone())
            .or_else(|| self.state.current_video_id.clone())?;

        let note = UserNote::with_label(video_id, label, seconds, text);
        self.add_user_note(note.clone());
        Some(note)
    }

    /// Returns whether a note with `note_id` existed.
    pub fn remove_user_note(&mut self, note_id: &str) -> bool {
        let before = self.state.user_notes.len();
        self.state.user_notes.retain(|note| note.id != note_id);
        let removed = self.state.user_notes.len() != before;
        self.persist_notes();
        self.emit(StateChange::Notes);
        removed
    }

    pub fn set_comment_variations(&mut self, comments: Vec<CommentVariation>) {
        self.state.comment_variations = comments;
        self.emit(StateChange::Comments);
    }

    pub fn set_is_loading(&mut self, loading: bool) {
        self.state.is_loading = loading;
        self.emit(StateChange::Loading(loading));
    }

    /// Mark one more request in flight.
    pub fn begin_loading(&mut self) {
        self.pending_requests += 1;
        if !self.state.is_loading {
            self.set_is_loading(true);
        }
    }

    /// Mark a request finished. The flag drops only when none remain.
    pub fn end_loading(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
        if self.pending_requests == 0 && self.state.is_loading {
            self.set_is_loading(false);
        }
    }

    pub fn set_is_focus_mode(&mut self, enabled: bool) {
        self.state.is_focus_mode = enabled;
        self.apply_focus_class(enabled);
        self.write(FOCUS_MODE_KEY, Some(if enabled { "true" } else { "false" }));
        self.emit(StateChange::FocusMode(enabled));
    }

    pub fn set_current_tab(&mut self, tab: Tab) {
        self.state.current_tab = tab;
        self.emit(StateChange::Tab(tab));
    }

    /// Blank keys clear the stored key.
    pub fn set_api_key(&mut self, key: Option<String>) {
        let key = key
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self.write(API_KEY, key.as_deref());
        self.state.api_key = key;
        self.emit(StateChange::ApiKey);
    }

    /// Forget everything about the current video, including notes.
    pub fn clear_data(&mut self) {
        self.state.video_summary = None;
        self.state.quiz = None;
        self.state.user_notes.clear();
        self.state.comment_variations.clear();
        self.state.current_video_id = None;
        self.persist_notes();
        self.emit(StateChange::Cleared);
    }

    /// Back to defaults on unmount. Storage is left as is so the next mount
    /// restores it.
    pub fn reset(&mut self) {
        self.state = AppState::default();
        self.pending_requests = 0;
        self.apply_focus_class(false);
        self.emit(StateChange::Reset);
    }

    fn restore(&mut self) {
        if let Some(key) = self.read(API_KEY).filter(|k| !k.trim().is_empty()) {
            self.state.api_key = Some(key);
        }

        self.state.is_focus_mode = self.read(FOCUS_MODE_KEY).as_deref() == Some("true");
        if self.state.is_focus_mode {
            self.apply_focus_class(true);
        }

        if let Some(raw) = self.read(NOTES_KEY) {
            match serde_json::from_str::<Vec<UserNote>>(&raw) {
                Ok(notes) => self.state.user_notes = notes,
                Err(err) => log_warn!("discarding unreadable notes snapshot: {err}"),
            }
        }
    }

    fn read(&mut self, key: &str) -> Option<String> {
        let storage = self.storage.as_ref()?;
        match storage.get(key) {
            Ok(value) => value,
            Err(err) => {
                self.degrade(key, err);
                None
            }
        }
    }

    fn write(&mut self, key: &str, value: Option<&str>) {
        let Some(storage) = self.storage.as_ref() else {
            return;
        };
        let result = match value {
            Some(value) => storage.set(key, value),
            None => storage.remove(key),
        };
        if let Err(err) = result {
            self.degrade(key, err);
        }
    }

    fn persist_notes(&mut self) {
        match serde_json::to_string(&self.state.user_notes) {
            Ok(snapshot) => self.write(NOTES_KEY, Some(&snapshot)),
            Err(err) => log_warn!("failed to serialize notes snapshot: {err}"),
        }
    }

    fn degrade(&mut self, key: &str, err: anyhow::Error) {
        log_warn!("durable storage failed on '{key}' ({err:#}); continuing in memory only");
        self.storage = None;
    }

    fn apply_focus_class(&self, enabled: bool) {
        if let Some(chrome) = self.chrome.as_ref() {
            chrome.set_class(FOCUS_MODE_CLASS, enabled);
        }
    }

    fn emit(&self, change: StateChange) {
        // Nobody listening is normal before views mount.
        let _ = self.changes.send(change);
    }
}
