//! Relay client: sends `{message, context}` and returns the reply text.

use async_trait::async_trait;
use proto::{RelayError, RelayFailure, RelayReply, RelayRequest};

/// Anything that can forward a question to the relay endpoint.
///
/// Browser clients are not `Send`, so the bound is relaxed on wasm.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait RelayClient {
    /// Sends one request and returns the reply text.
    async fn send(&self, request: &RelayRequest) -> Result<String, RelayError>;
}

/// Interprets a relay HTTP response.
///
/// Shared by every transport so status and body handling stays identical.
pub fn parse_reply(status: u16, body: &str) -> Result<String, RelayError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_str::<RelayFailure>(body)
            .map(|f| f.error)
            .unwrap_or_else(|_| body.chars().take(200).collect());
        return Err(RelayError::Status { status, message });
    }
    serde_json::from_str::<RelayReply>(body)
        .map(|r| r.response)
        .map_err(|e| {
            RelayError::InvalidResponse(format!(
                "{e}; body: {}",
                body.chars().take(200).collect::<String>()
            ))
        })
}

#[cfg(not(target_arch = "wasm32"))]
pub use http::HttpRelayClient;

#[cfg(not(target_arch = "wasm32"))]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use proto::{RelayError, RelayRequest};
    use tracing::debug;

    use super::{RelayClient, parse_reply};

    /// Relay client over HTTP using reqwest.
    #[derive(Debug, Clone)]
    pub struct HttpRelayClient {
        client: reqwest::Client,
        url: String,
    }

    impl HttpRelayClient {
        /// Creates a client posting to `url` with the given request timeout.
        pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .map_err(|e| RelayError::Transport(e.to_string()))?;
            Ok(Self {
                client,
                url: url.into(),
            })
        }

        /// Endpoint this client posts to.
        pub fn url(&self) -> &str {
            &self.url
        }

        /// Posts `request` and returns the reply text.
        pub async fn post(&self, request: &RelayRequest) -> Result<String, RelayError> {
            debug!(url = %self.url, context = %request.effective_context(), "Sending relay request");
            let response = self
                .client
                .post(&self.url)
                .json(request)
                .send()
                .await
                .map_err(|e| RelayError::Transport(e.to_string()))?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|e| RelayError::Transport(e.to_string()))?;
            debug!(status, "Relay response received");
            parse_reply(status, &body)
        }
    }

    #[async_trait]
    impl RelayClient for HttpRelayClient {
        async fn send(&self, request: &RelayRequest) -> Result<String, RelayError> {
            self.post(request).await
        }
    }
}
