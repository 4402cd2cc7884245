use serde::{Deserialize, Serialize};

/// Primary HTTP path served by the relay.
pub const RELAY_PATH: &str = "/api/chat";

/// Serverless-function path older pages still POST to; kept as an alias.
pub const LEGACY_RELAY_PATH: &str = "/.netlify/functions/getAiResponse";

/// Context string used when no game card is selected.
pub const GENERAL_GAME_CONTEXT: &str = "general video games";

/// Request body sent by a chat client to the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayRequest {
    /// The user's question, already trimmed.
    pub message: String,
    /// Name of the selected game (or [`GENERAL_GAME_CONTEXT`]).
    #[serde(default)]
    pub context: String,
}

impl RelayRequest {
    /// Creates a request for a message scoped to a game context.
    pub fn new(message: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: context.into(),
        }
    }

    /// Returns the context, substituting the general sentinel when blank.
    pub fn effective_context(&self) -> &str {
        let trimmed = self.context.trim();
        if trimmed.is_empty() {
            GENERAL_GAME_CONTEXT
        } else {
            trimmed
        }
    }
}

/// Successful relay response body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayReply {
    /// Assistant text, possibly containing lightweight markup.
    pub response: String,
}

impl RelayReply {
    /// Wraps assistant text in a reply body.
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

/// Error body returned by the relay alongside a non-2xx status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayFailure {
    /// Human-readable reason.
    pub error: String,
}

impl RelayFailure {
    /// Creates an error body.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
