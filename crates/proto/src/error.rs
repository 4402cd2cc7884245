use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required field was not provided.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// A field has an invalid value and reason.
    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    /// Filesystem read error.
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parse error.
    #[error("TOML parse error: {0}")]
    Toml(String),
}

/// Key-value store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store cannot be reached (no window, storage disabled, ...).
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    /// The host refused the write because its quota is exhausted.
    #[error("Storage quota exceeded while writing '{key}'")]
    QuotaExceeded { key: String },

    /// Filesystem error from a file-backed store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Value could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Errors talking to the relay endpoint
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RelayError {
    /// Network-level failure (DNS, connect, timeout, aborted fetch).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Relay answered with a non-2xx status.
    #[error("Relay responded with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Relay answered 2xx but the body was not a valid reply.
    #[error("Invalid relay response: {0}")]
    InvalidResponse(String),
}

/// LLM provider errors
#[derive(Debug, Error)]
pub enum LlmError {
    /// Remote API failure.
    #[error("{0}")]
    Api(String),

    /// Provider throttled the request.
    #[error("Rate limit exceeded")]
    RateLimit,

    /// Provider response schema/content was invalid.
    #[error("Invalid response from LLM: {0}")]
    InvalidResponse(String),

    /// Provider returned no candidate text.
    #[error("LLM returned an empty response")]
    EmptyResponse,
}

/// Relay server lifecycle errors
#[derive(Debug, Error)]
pub enum ServerError {
    /// The listen address could not be bound.
    #[error("Failed to bind {addr}: {reason}")]
    Bind { addr: String, reason: String },

    /// The server stopped with an error.
    #[error("Server failed: {0}")]
    Serve(String),
}

/// Internal proto errors
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Invalid role string value.
    #[error("Invalid role: {0}")]
    InvalidRole(String),
}
