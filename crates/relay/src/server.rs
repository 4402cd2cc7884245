//! Relay HTTP server: axum router forwarding chat questions to an LLM.
//!
//! Keeps the provider API key on the server. Browser and terminal clients
//! post `{message, context}` and receive `{response}` or `{error}`.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use proto::{
    LEGACY_RELAY_PATH, LlmError, RELAY_PATH, RelayFailure, RelayReply, RelayRequest, ServerError,
};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};

use crate::llm::LlmProvider;
use crate::prompt::build_prompt;

/// Error text returned when the provider fails.
pub const PROVIDER_FAILURE: &str = "Failed to get response from AI.";

/// Error text returned when the provider throttles.
pub const RATE_LIMITED: &str = "The AI is busy right now, please try again shortly.";

struct RelayState {
    provider: Arc<dyn LlmProvider>,
}

/// HTTP relay between chat clients and an [`LlmProvider`].
pub struct RelayServer {
    port: u16,
    cors_origins: String,
    static_dir: String,
    provider: Arc<dyn LlmProvider>,
}

impl RelayServer {
    /// Creates a relay on `port` answering with `provider`. CORS allows
    /// any origin until [`with_cors_origins`](Self::with_cors_origins) says
    /// otherwise.
    pub fn new(port: u16, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            port,
            cors_origins: "*".to_string(),
            static_dir: String::new(),
            provider,
        }
    }

    /// Sets allowed origins: `*` or a comma-separated list.
    pub fn with_cors_origins(mut self, origins: impl Into<String>) -> Self {
        self.cors_origins = origins.into();
        self
    }

    /// Serves files from `dir` for paths no route matches.
    pub fn with_static_dir(mut self, dir: impl Into<String>) -> Self {
        self.static_dir = dir.into();
        self
    }

    /// Configured listen port.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Builds the CORS layer from the configured origins string.
    fn build_cors(&self) -> CorsLayer {
        if self.cors_origins.trim() == "*" {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = self
                .cors_origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    }

    /// Builds the full router, including CORS and the static fallback.
    pub fn router(&self) -> Router {
        let state = Arc::new(RelayState {
            provider: self.provider.clone(),
        });

        let app = Router::new()
            .route(RELAY_PATH, post(chat_handler))
            .route(LEGACY_RELAY_PATH, post(chat_handler))
            .route("/health", get(health_handler))
            .with_state(state)
            .layer(self.build_cors());

        if self.static_dir.is_empty() {
            return app;
        }
        let expanded = expand_tilde(&self.static_dir);
        if std::path::Path::new(&expanded).exists() {
            info!(path = %expanded, "Serving static files");
            app.fallback_service(tower_http::services::ServeDir::new(expanded))
        } else {
            debug!(path = %expanded, "Static dir does not exist, skipping");
            app
        }
    }

    /// Binds the configured port and serves until Ctrl-C.
    pub async fn run(self) -> Result<(), ServerError> {
        let addr = format!("0.0.0.0:{}", self.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| ServerError::Bind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;
        self.serve(listener, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
    }

    /// Serves on an already bound listener until `shutdown` resolves.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        let local = listener
            .local_addr()
            .map_err(|e| ServerError::Serve(e.to_string()))?;
        info!(addr = %local, model = %self.provider.model(), "Relay listening");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))?;

        info!("Relay stopped");
        Ok(())
    }
}

// ─── Axum handlers ─────────────────────────────────────────

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "ok"
}

/// Answers one chat question.
async fn chat_handler(
    State(state): State<Arc<RelayState>>,
    body: Result<Json<RelayRequest>, JsonRejection>,
) -> Response {
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "Rejected malformed relay request");
            return failure(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let message = request.message.trim();
    if message.is_empty() {
        return failure(StatusCode::BAD_REQUEST, "Message must not be empty.");
    }

    let game = request.effective_context();
    debug!(game = %game, chars = message.len(), "Relaying question");
    let prompt = build_prompt(game, message);

    match state.provider.generate(&prompt).await {
        Ok(text) => (StatusCode::OK, Json(RelayReply::new(text))).into_response(),
        Err(LlmError::RateLimit) => {
            warn!("Provider rate limit hit");
            failure(StatusCode::TOO_MANY_REQUESTS, RATE_LIMITED)
        }
        Err(e) => {
            error!(error = %e, "Error in AI provider");
            failure(StatusCode::INTERNAL_SERVER_ERROR, PROVIDER_FAILURE)
        }
    }
}

fn failure(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(RelayFailure::new(message))).into_response()
}

// ─── Helpers ───────────────────────────────────────────────

/// Expands `~` at the start of a path to `$HOME`.
fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix('~') {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{home}{rest}")
    } else {
        path.to_string()
    }
}

// ─── Tests ─────────────────────────────────────────────────
