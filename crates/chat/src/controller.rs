//! Chat controller: the single place where chat state changes.
//!
//! Front-ends translate input events into [`Action`] values and feed them
//! to [`ChatController::update`]. The only side effect the controller
//! cannot perform itself is the relay round trip; it hands that back as
//! [`Command::SendToRelay`] and expects the result as
//! [`Action::RelayCompleted`].

use proto::{Message, RelayError, RelayRequest, SessionId};
use tracing::{debug, info, warn};

use crate::carousel::Carousel;
use crate::client::RelayClient;
use crate::registry::ChatRegistry;
use crate::session::welcome_message;
use crate::store::KeyValueStore;
use crate::view::{ChatView, sidebar_entries};

/// Bot text shown when the relay round trip fails.
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting to the AI right now.";

// ─── Action ──────────────────────────────────────────────────────────────────

/// Every state change the chat core understands.
#[derive(Debug, Clone)]
pub enum Action {
    /// The user submitted text from the input.
    Submit(String),
    /// A session was picked from the list.
    SelectSession(SessionId),
    /// The "new chat" control was used.
    NewSession,
    /// Carousel next button.
    CarouselNext,
    /// Carousel previous button.
    CarouselPrevious,
    /// A carousel card was clicked.
    CarouselSelect(usize),
    /// The relay request returned.
    RelayCompleted(Result<String, RelayError>),
}

// ─── Command ─────────────────────────────────────────────────────────────────

/// Side effect requested by [`ChatController::update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Nothing to do.
    None,
    /// Post this request to the relay, then dispatch
    /// [`Action::RelayCompleted`] with the outcome.
    SendToRelay(RelayRequest),
}

/// Owns chat state and drives a [`ChatView`].
pub struct ChatController<S, V> {
    registry: ChatRegistry<S>,
    carousel: Carousel,
    view: V,
    pending: Option<SessionId>,
}

impl<S: KeyValueStore, V: ChatView> ChatController<S, V> {
    /// Assembles a controller. Call [`render_all`](Self::render_all) for
    /// the first draw.
    pub fn new(registry: ChatRegistry<S>, carousel: Carousel, view: V) -> Self {
        Self {
            registry,
            carousel,
            view,
            pending: None,
        }
    }

    /// Draws the log, session list and carousel from current state.
    pub fn render_all(&mut self) {
        self.redraw_log();
        self.refresh_sidebar();
        self.view.render_carousel(&self.carousel);
        self.view.set_input_enabled(self.pending.is_none());
    }

    /// Applies one action and returns the side effect it needs.
    pub fn update(&mut self, action: Action) -> Command {
        let command = match action {
            Action::Submit(text) => self.on_submit(&text),
            Action::RelayCompleted(result) => {
                self.on_relay_completed(result);
                Command::None
            }
            Action::SelectSession(id) => {
                self.on_select_session(id);
                Command::None
            }
            Action::NewSession => {
                self.registry.clear_active();
                self.view.redraw(&[welcome_message()]);
                self.refresh_sidebar();
                Command::None
            }
            Action::CarouselNext => {
                let moved = self.carousel.next();
                self.after_carousel_move(moved)
            }
            Action::CarouselPrevious => {
                let moved = self.carousel.previous();
                self.after_carousel_move(moved)
            }
            Action::CarouselSelect(index) => {
                let moved = self.carousel.select_index(index);
                self.after_carousel_move(moved)
            }
        };
        if let Some(err) = self.registry.take_save_error() {
            self.view.on_save_failed(&err);
        }
        command
    }

    /// Runs a full submit round trip against `relay`.
    ///
    /// Relay failures end up as the fallback bot message, never as an
    /// error. Returns `false` when the submission was ignored.
    pub async fn submit<R>(&mut self, text: &str, relay: &R) -> bool
    where
        R: RelayClient + ?Sized,
    {
        let Command::SendToRelay(request) = self.update(Action::Submit(text.to_string())) else {
            return false;
        };
        let result = relay.send(&request).await;
        self.update(Action::RelayCompleted(result));
        true
    }

    // ── Accessors ────────────────────────────────────────────

    /// Session registry.
    pub fn registry(&self) -> &ChatRegistry<S> {
        &self.registry
    }

    /// Game carousel.
    pub fn carousel(&self) -> &Carousel {
        &self.carousel
    }

    /// The driven view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view (for front-end-only state).
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// Whether a relay request is in flight.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    // ── Handlers ─────────────────────────────────────────────

    fn on_submit(&mut self, text: &str) -> Command {
        let text = text.trim();
        if text.is_empty() {
            return Command::None;
        }
        if self.pending.is_some() {
            debug!("Submit ignored while a reply is pending");
            return Command::None;
        }

        let id = match self.registry.active_id() {
            Some(id) => id.clone(),
            None => {
                let id = self.registry.create_session(text);
                self.registry.set_active(&id);
                self.redraw_log();
                self.refresh_sidebar();
                id
            }
        };

        let message = Message::user(text);
        self.view.append(&message);
        self.registry.append_message(&id, message);

        self.pending = Some(id);
        self.view.set_typing(true);
        self.view.set_input_enabled(false);

        let context = self.carousel.context().as_str().to_string();
        info!(context = %context, "Sending message to relay");
        Command::SendToRelay(RelayRequest::new(text, context))
    }

    fn on_relay_completed(&mut self, result: Result<String, RelayError>) {
        let Some(id) = self.pending.take() else {
            warn!("Relay reply arrived with no pending request, dropped");
            return;
        };
        let text = match result {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Relay request failed, showing fallback");
                FALLBACK_REPLY.to_string()
            }
        };

        let message = Message::bot(text);
        let displayed = self.registry.active_id() == Some(&id);
        if displayed {
            self.view.set_typing(false);
            self.view.append(&message);
        } else {
            debug!(session = %id, "Reply stored for a session that is not displayed");
        }
        self.registry.append_message(&id, message);
        self.view.set_input_enabled(true);
    }

    fn on_select_session(&mut self, id: SessionId) {
        if self.registry.active_id() == Some(&id) {
            return;
        }
        self.registry.set_active(&id);
        self.redraw_log();
        self.refresh_sidebar();
    }

    fn after_carousel_move(&mut self, moved: bool) -> Command {
        if moved {
            self.view.render_carousel(&self.carousel);
        }
        Command::None
    }

    fn redraw_log(&mut self) {
        match self.registry.active() {
            Some(session) => self.view.redraw(&session.messages),
            None => self.view.redraw(&[welcome_message()]),
        }
        let typing = self.pending.is_some() && self.pending.as_ref() == self.registry.active_id();
        if typing {
            self.view.set_typing(true);
        }
    }

    fn refresh_sidebar(&mut self) {
        let entries = sidebar_entries(&self.registry);
        self.view.render_sidebar(&entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carousel::GameCard;
    use crate::session::WELCOME_MESSAGE;
    use crate::store::MemoryStore;
    use crate::view::TranscriptView;
    use proto::Role;

    fn controller() -> ChatController<MemoryStore, TranscriptView> {
        let carousel = Carousel::new(vec![GameCard::new("Elden Ring"), GameCard::new("Celeste")]);
        let mut c = ChatController::new(
            ChatRegistry::load(MemoryStore::new()),
            carousel,
            TranscriptView::new(),
        );
        c.render_all();
        c
    }

    #[test]
    fn first_submit_creates_and_activates_session() {
        let mut c = controller();
        let cmd = c.update(Action::Submit("  How do I parry?  ".into()));

        assert_eq!(
            cmd,
            Command::SendToRelay(RelayRequest::new("How do I parry?", "Elden Ring"))
        );
        let active = c.registry().active().expect("active session");
        assert_eq!(active.title, "How do I parry?");
        assert_eq!(active.messages.len(), 2);
        assert_eq!(active.messages[0].text, WELCOME_MESSAGE);
        assert_eq!(active.messages[1], Message::user("How do I parry?"));
        assert!(c.view().typing);
        assert!(!c.view().input_enabled);
        assert_eq!(c.view().sidebar.len(), 1);
    }

    #[test]
    fn blank_submit_is_ignored() {
        let mut c = controller();
        assert_eq!(c.update(Action::Submit("   ".into())), Command::None);
        assert!(c.registry().is_empty());
        assert!(!c.is_pending());
    }

    #[test]
    fn submit_while_pending_is_ignored() {
        let mut c = controller();
        c.update(Action::Submit("one".into()));
        assert_eq!(c.update(Action::Submit("two".into())), Command::None);
        assert_eq!(c.registry().active().unwrap().messages.len(), 2);
    }

    #[test]
    fn reply_clears_typing_and_reenables_input() {
        let mut c = controller();
        c.update(Action::Submit("q".into()));
        c.update(Action::RelayCompleted(Ok("answer".into())));

        assert!(!c.is_pending());
        assert!(!c.view().typing);
        assert!(c.view().input_enabled);
        let last = c.registry().active().unwrap().last_message().unwrap();
        assert_eq!(last, &Message::bot("answer"));
        assert_eq!(c.view().log.last(), Some(&Message::bot("answer")));
    }

    #[test]
    fn relay_error_becomes_fallback_message() {
        let mut c = controller();
        c.update(Action::Submit("q".into()));
        c.update(Action::RelayCompleted(Err(RelayError::Status {
            status: 500,
            message: "boom".into(),
        })));

        let last = c.registry().active().unwrap().last_message().unwrap();
        assert_eq!(last.role, Role::Bot);
        assert_eq!(last.text, FALLBACK_REPLY);
    }

    #[test]
    fn reply_goes_to_originating_session_after_new_session() {
        let mut c = controller();
        c.update(Action::Submit("first".into()));
        let origin = c.registry().active_id().cloned().unwrap();
        c.update(Action::NewSession);
        c.update(Action::RelayCompleted(Ok("late".into())));

        assert!(c.registry().active().is_none());
        assert_eq!(c.view().log, vec![welcome_message()]);
        let session = c.registry().get(&origin).unwrap();
        assert_eq!(session.last_message(), Some(&Message::bot("late")));
    }

    #[test]
    fn reselecting_pending_session_shows_typing_again() {
        let mut c = controller();
        c.update(Action::Submit("first".into()));
        let origin = c.registry().active_id().cloned().unwrap();
        c.update(Action::NewSession);
        assert!(!c.view().typing);

        c.update(Action::SelectSession(origin));
        assert!(c.view().typing);
        assert_eq!(c.view().log.len(), 2);
    }

    #[test]
    fn selecting_active_session_does_not_redraw() {
        let mut c = controller();
        c.update(Action::Submit("q".into()));
        c.update(Action::RelayCompleted(Ok("a".into())));
        let id = c.registry().active_id().cloned().unwrap();
        let redraws = c.view().redraws;

        c.update(Action::SelectSession(id));
        assert_eq!(c.view().redraws, redraws);
    }

    #[test]
    fn carousel_actions_change_request_context() {
        let mut c = controller();
        c.update(Action::CarouselNext);
        assert_eq!(c.view().carousel_index, 1);
        c.update(Action::CarouselNext);
        assert_eq!(c.carousel().index(), 1);

        let cmd = c.update(Action::Submit("dash?".into()));
        assert_eq!(cmd, Command::SendToRelay(RelayRequest::new("dash?", "Celeste")));

        c.update(Action::CarouselSelect(0));
        assert_eq!(c.carousel().context().as_str(), "Elden Ring");
    }

    #[test]
    fn save_failure_reaches_view() {
        let carousel = Carousel::new(vec![GameCard::new("Elden Ring")]);
        let mut c = ChatController::new(
            ChatRegistry::load(MemoryStore::with_quota(4)),
            carousel,
            TranscriptView::new(),
        );
        c.update(Action::Submit("does not fit".into()));
        assert!(c.view().save_failure.is_some());
        assert!(c.registry().active().is_some());
    }
}
