//! Gemini `generateContent` provider implementation.

use async_trait::async_trait;
use proto::LlmError;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::llm::LlmProvider;

/// Default public endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// ── Request types ──────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

// ── Response types ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

// ── Provider ───────────────────────────────────────────────────────────────────

/// Google Gemini provider.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiProvider {
    /// Creates a provider targeting the public Gemini endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, GEMINI_BASE_URL)
    }

    /// Creates a provider targeting a custom base URL (useful for proxies/tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "Sending request to Gemini");
        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        let status = response.status();
        debug!(status = %status.as_u16(), "Gemini response received");
        if status.as_u16() == 429 {
            return Err(LlmError::RateLimit);
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Api(e.to_string()))?;

        if !status.is_success() {
            let preview: String = text.chars().take(500).collect();
            return Err(LlmError::Api(format!("HTTP {status}: {preview}")));
        }

        extract_text(&text)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Concatenates the text parts of the first candidate.
fn extract_text(body: &str) -> Result<String, LlmError> {
    let parsed: GenerateResponse = serde_json::from_str(body).map_err(|e| {
        LlmError::InvalidResponse(format!(
            "Deserialization error: {e}; body: {}",
            body.chars().take(200).collect::<String>()
        ))
    })?;

    let text: String = parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyResponse);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_includes_model_and_strips_trailing_slash() {
        let provider = GeminiProvider::with_base_url("k", "gemini-2.5-flash", "http://localhost:9/");
        assert_eq!(
            provider.endpoint(),
            "http://localhost:9/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(provider.model(), "gemini-2.5-flash");
    }

    #[test]
    fn request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: "hi" }],
            }],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"contents": [{"role": "user", "parts": [{"text": "hi"}]}]})
        );
    }

    #[test]
    fn extract_text_joins_parts_of_first_candidate() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Roll "},{"text":"left."}]}},
                      {"content":{"parts":[{"text":"ignored"}]}}]}"#;
        assert_eq!(extract_text(body).unwrap(), "Roll left.");
    }

    #[test]
    fn extract_text_without_candidates_is_empty_response() {
        assert!(matches!(
            extract_text(r#"{"candidates":[]}"#),
            Err(LlmError::EmptyResponse)
        ));
        assert!(matches!(
            extract_text(r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn extract_text_rejects_invalid_json() {
        assert!(matches!(
            extract_text("<html>"),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[derive(Clone, Default)]
    struct Captured(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn request_log_counts_prompt_characters() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        // Nothing listens here; the log line is written before the request.
        let provider = GeminiProvider::with_base_url("k", DEFAULT_MODEL, "http://127.0.0.1:9");
        let _ = provider.generate("Ко-op boss?").await;

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(logs.contains("prompt_chars=11"), "{logs}");
    }
}
