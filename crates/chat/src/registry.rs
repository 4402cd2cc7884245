//! Chat session registry: sessions in insertion order plus the active pointer.
//!
//! Every mutation writes the complete state through the [`PersistentStore`]
//! immediately. A failed write keeps the in-memory change; the error is
//! logged and held until the caller collects it with
//! [`ChatRegistry::take_save_error`].

use proto::{Message, SessionId, StoreError};
use tracing::{debug, info, warn};

use crate::session::ChatSession;
use crate::store::{ACTIVE_KEY, KeyValueStore, PersistentStore, SESSIONS_KEY};

/// Owns every chat session and which one is active.
#[derive(Debug)]
pub struct ChatRegistry<S> {
    store: PersistentStore<S>,
    sessions: Vec<ChatSession>,
    active: Option<SessionId>,
    save_error: Option<StoreError>,
}

impl<S: KeyValueStore> ChatRegistry<S> {
    /// Loads registry state from `backend`.
    ///
    /// Absent or corrupt session data yields an empty registry. A stored
    /// active id that does not match a loaded session is dropped.
    pub fn load(backend: S) -> Self {
        let store = PersistentStore::new(backend);
        let sessions: Vec<ChatSession> = store.load_json(SESSIONS_KEY).unwrap_or_default();
        let active = store
            .load_string(ACTIVE_KEY)
            .map(SessionId::from)
            .filter(|id| {
                let known = sessions.iter().any(|s| &s.id == id);
                if !known {
                    warn!(session = %id, "Stored active session not found, ignoring");
                }
                known
            });
        info!(
            sessions = sessions.len(),
            active = ?active.as_ref().map(SessionId::as_str),
            "Chat registry loaded"
        );
        Self {
            store,
            sessions,
            active,
            save_error: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────

    /// All sessions in insertion order.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    /// Looks up a session by id.
    pub fn get(&self, id: &SessionId) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| &s.id == id)
    }

    /// Id of the active session, if any.
    pub fn active_id(&self) -> Option<&SessionId> {
        self.active.as_ref()
    }

    /// The active session, if any.
    pub fn active(&self) -> Option<&ChatSession> {
        self.active.as_ref().and_then(|id| self.get(id))
    }

    /// Number of stored sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` when no session exists.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    // ── Mutations ────────────────────────────────────────────

    /// Creates a session titled after `first_message` and seeded with the
    /// welcome message. Does not change the active pointer.
    pub fn create_session(&mut self, first_message: &str) -> SessionId {
        let session = ChatSession::start(first_message);
        let id = session.id.clone();
        debug!(session = %id, title = %session.title, "Session created");
        self.sessions.push(session);
        self.persist();
        id
    }

    /// Appends `message` to session `id`.
    ///
    /// Returns `false` and writes nothing when the id is unknown.
    pub fn append_message(&mut self, id: &SessionId, message: Message) -> bool {
        let Some(session) = self.sessions.iter_mut().find(|s| &s.id == id) else {
            warn!(session = %id, "Append to unknown session ignored");
            return false;
        };
        session.messages.push(message);
        self.persist();
        true
    }

    /// Makes `id` the active session.
    ///
    /// An unknown id clears the active pointer so the next submission
    /// starts a new session. Returns whether `id` was found.
    pub fn set_active(&mut self, id: &SessionId) -> bool {
        let known = self.get(id).is_some();
        if known {
            self.active = Some(id.clone());
        } else {
            warn!(session = %id, "Activating unknown session, clearing active pointer");
            self.active = None;
        }
        self.persist();
        known
    }

    /// Clears the active pointer (new-session button).
    pub fn clear_active(&mut self) {
        self.active = None;
        self.persist();
    }

    /// Takes the most recent write failure, if any.
    pub fn take_save_error(&mut self) -> Option<StoreError> {
        self.save_error.take()
    }

    /// Borrows the underlying backend.
    pub fn backend(&self) -> &S {
        self.store.backend()
    }

    /// Consumes the registry, returning its backend.
    pub fn into_backend(self) -> S {
        self.store.into_backend()
    }

    fn persist(&mut self) {
        if let Err(e) = self.write_all() {
            warn!(error = %e, "Failed to persist chat registry");
            self.save_error = Some(e);
        }
    }

    fn write_all(&mut self) -> Result<(), StoreError> {
        self.store.save_json(SESSIONS_KEY, &self.sessions)?;
        match &self.active {
            Some(id) => self.store.save_string(ACTIVE_KEY, id.as_str()),
            None => self.store.remove(ACTIVE_KEY),
        }
    }
}
