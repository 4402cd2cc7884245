//! View boundary between the controller and a front-end.
//!
//! The controller tells a [`ChatView`] what changed; the view decides how
//! to show it (DOM nodes, terminal widgets, or nothing at all).

use chrono::{DateTime, Utc};
use proto::{Message, SessionId, StoreError};

use crate::carousel::Carousel;
use crate::registry::ChatRegistry;
use crate::store::KeyValueStore;

/// One row of the session list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarEntry {
    /// Lookup key for selection.
    pub id: SessionId,
    /// Session title.
    pub title: String,
    /// Creation time of the session.
    pub created_at: DateTime<Utc>,
    /// Whether this is the active session.
    pub active: bool,
}

/// Builds sidebar rows in registry (insertion) order.
pub fn sidebar_entries<S: KeyValueStore>(registry: &ChatRegistry<S>) -> Vec<SidebarEntry> {
    let active = registry.active_id();
    registry
        .sessions()
        .iter()
        .map(|s| SidebarEntry {
            id: s.id.clone(),
            title: s.title.clone(),
            created_at: s.created_at,
            active: Some(&s.id) == active,
        })
        .collect()
}

/// Rendering surface driven by the controller.
pub trait ChatView {
    /// Appends one message to the log and scrolls to it.
    fn append(&mut self, message: &Message);

    /// Replaces the whole log with `messages`.
    fn redraw(&mut self, messages: &[Message]);

    /// Shows or removes the transient typing placeholder.
    fn set_typing(&mut self, visible: bool);

    /// Enables or disables the submit control.
    fn set_input_enabled(&mut self, _enabled: bool) {}

    /// Replaces the session list.
    fn render_sidebar(&mut self, entries: &[SidebarEntry]);

    /// Updates the carousel highlight and button state.
    fn render_carousel(&mut self, carousel: &Carousel);

    /// Reports that the latest state could not be written.
    fn on_save_failed(&mut self, _error: &StoreError) {}
}

/// Headless view that keeps what a screen would currently show.
///
/// Used by the terminal front-end as its render model and by the one-shot
/// command, which has no screen at all.
#[derive(Debug, Clone)]
pub struct TranscriptView {
    /// Messages currently in the log.
    pub log: Vec<Message>,
    /// Whether the typing placeholder is shown.
    pub typing: bool,
    /// Whether input is accepted.
    pub input_enabled: bool,
    /// Current session list.
    pub sidebar: Vec<SidebarEntry>,
    /// Selected carousel index.
    pub carousel_index: usize,
    /// Number of log redraws since creation.
    pub redraws: usize,
    /// Last reported save failure.
    pub save_failure: Option<String>,
}

impl Default for TranscriptView {
    fn default() -> Self {
        Self {
            log: Vec::new(),
            typing: false,
            input_enabled: true,
            sidebar: Vec::new(),
            carousel_index: 0,
            redraws: 0,
            save_failure: None,
        }
    }
}

impl TranscriptView {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Last bot message in the log.
    pub fn last_bot_text(&self) -> Option<&str> {
        self.log
            .iter()
            .rev()
            .find(|m| !m.is_user())
            .map(|m| m.text.as_str())
    }
}

impl ChatView for TranscriptView {
    fn append(&mut self, message: &Message) {
        self.log.push(message.clone());
    }

    fn redraw(&mut self, messages: &[Message]) {
        self.log = messages.to_vec();
        self.typing = false;
        self.redraws += 1;
    }

    fn set_typing(&mut self, visible: bool) {
        self.typing = visible;
    }

    fn set_input_enabled(&mut self, enabled: bool) {
        self.input_enabled = enabled;
    }

    fn render_sidebar(&mut self, entries: &[SidebarEntry]) {
        self.sidebar = entries.to_vec();
    }

    fn render_carousel(&mut self, carousel: &Carousel) {
        self.carousel_index = carousel.index();
    }

    fn on_save_failed(&mut self, error: &StoreError) {
        self.save_failure = Some(error.to_string());
    }
}
