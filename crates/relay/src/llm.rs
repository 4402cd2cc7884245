//! Generative-language provider abstraction.

use async_trait::async_trait;
use proto::LlmError;

/// Turns a prompt into generated text.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generates a completion for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
