//! Core of the game assistant chat widget.
//!
//! Sessions, persistence, the game carousel, message rendering and the
//! controller that ties them together. Front-ends (terminal and browser)
//! implement [`ChatView`] and a [`KeyValueStore`] backend; everything else
//! lives here.

pub mod carousel;
pub mod client;
pub mod controller;
pub mod markup;
pub mod registry;
pub mod render;
pub mod session;
pub mod store;
pub mod view;

pub use carousel::{Carousel, GameCard, GameContext};
#[cfg(not(target_arch = "wasm32"))]
pub use client::HttpRelayClient;
pub use client::{RelayClient, parse_reply};
pub use controller::{Action, ChatController, Command, FALLBACK_REPLY};
pub use registry::ChatRegistry;
pub use render::{RenderedMessage, Renderer};
pub use session::{ChatSession, TITLE_MAX_CHARS, WELCOME_MESSAGE};
pub use store::{ACTIVE_KEY, FileStore, KeyValueStore, MemoryStore, PersistentStore, SESSIONS_KEY};
pub use view::{ChatView, SidebarEntry, TranscriptView, sidebar_entries};
