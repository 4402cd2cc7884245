//! A single persisted conversation thread.

use chrono::{DateTime, Utc};
use proto::{Message, SessionId};
use serde::{Deserialize, Serialize};

/// Bot text seeded as the first message of every new session.
pub const WELCOME_MESSAGE: &str =
    "Hello! Pick a game from the carousel and ask me anything about it.";

/// Maximum number of characters kept from the first user message as title.
pub const TITLE_MAX_CHARS: usize = 30;

/// One conversation: a title and its ordered messages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique session id.
    pub id: SessionId,
    /// Title derived from the first user message.
    pub title: String,
    /// Messages in append order; index 0 is the welcome message.
    pub messages: Vec<Message>,
    /// Creation time, shown as relative time in session lists.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ChatSession {
    /// Starts a session for `first_message`: fresh id, derived title, and
    /// the welcome message as the only entry.
    ///
    /// The user message itself is not appended here.
    pub fn start(first_message: &str) -> Self {
        Self {
            id: SessionId::new(),
            title: derive_title(first_message),
            messages: vec![welcome_message()],
            created_at: Utc::now(),
        }
    }

    /// Returns the last message, if any.
    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }
}

/// The fixed welcome bot message.
pub fn welcome_message() -> Message {
    Message::bot(WELCOME_MESSAGE)
}

/// First [`TITLE_MAX_CHARS`] characters of the trimmed text.
pub fn derive_title(text: &str) -> String {
    text.trim().chars().take(TITLE_MAX_CHARS).collect()
}
