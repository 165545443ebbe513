//! Error types for kbflow-ollama.

use thiserror::Error;

/// Result type alias for kbflow-ollama operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the kbflow-ollama library.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Reqwest(#[from] reqwest::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("Ollama API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the server.
        message: String,
    },

    /// Configuration errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}

impl From<Error> for kbflow_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Reqwest(e) => {
                if e.is_timeout() {
                    kbflow_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    kbflow_core::Error::network_error()
                        .with_message("Connection to Ollama failed")
                        .with_source(e)
                } else {
                    kbflow_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            Error::Serde(e) => kbflow_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            Error::Api { status, message } => {
                let error = match status {
                    401 | 403 => kbflow_core::Error::authentication(),
                    404 => kbflow_core::Error::not_found(),
                    429 => kbflow_core::Error::rate_limited(),
                    500.. => kbflow_core::Error::service_unavailable(),
                    _ => kbflow_core::Error::external_error(),
                };
                error.with_message(format!("Ollama returned {status}: {message}"))
            }
            Error::Config(message) => kbflow_core::Error::configuration().with_message(message),
        }
    }
}
