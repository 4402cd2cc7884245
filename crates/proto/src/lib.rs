//! Shared protocol types for the chat core, the relay, and the front-ends.
//!
//! This crate defines serializable message/session identity types, the
//! relay wire bodies, and strongly-typed error enums shared across the
//! workspace.

pub mod error;
pub mod message;
pub mod relay;

/// Re-export of all protocol error types.
pub use error::*;
/// Re-export of conversation/message identity types.
pub use message::{Message, Role, SessionId};
/// Re-export of relay request/response bodies and well-known constants.
pub use relay::{
    GENERAL_GAME_CONTEXT, LEGACY_RELAY_PATH, RELAY_PATH, RelayFailure, RelayReply, RelayRequest,
};
