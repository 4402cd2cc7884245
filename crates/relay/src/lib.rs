//! AI relay for the game assistant.
//!
//! Accepts `{message, context}` from chat clients, wraps the question in a
//! game-expert prompt, and forwards it to a generative-language provider.
//! The provider key never leaves the server.

pub mod gemini;
pub mod llm;
pub mod prompt;
pub mod server;

pub use gemini::{DEFAULT_MODEL, GEMINI_BASE_URL, GeminiProvider};
pub use llm::LlmProvider;
pub use prompt::build_prompt;
pub use server::{PROVIDER_FAILURE, RATE_LIMITED, RelayServer};
