//! Vector store error types.

use thiserror::Error;

/// Result type for vector store operations.
pub type VectorResult<T> = Result<T, VectorError>;

/// Vector store errors.
#[derive(Debug, Error)]
pub enum VectorError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The server answered with a non-success status.
    #[error("Chroma API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message reported by the server.
        message: String,
    },

    /// The server answered with an unexpected payload.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Embedding the query or the documents failed.
    #[error("embedding failed: {0}")]
    Embedding(#[source] kbflow_core::Error),
}

impl VectorError {
    /// Creates an invalid config error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Creates an invalid response error.
    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }
}

impl From<VectorError> for kbflow_core::Error {
    fn from(err: VectorError) -> Self {
        match err {
            VectorError::Http(e) => {
                if e.is_timeout() {
                    kbflow_core::Error::timeout()
                        .with_message(e.to_string())
                        .with_source(e)
                } else if e.is_connect() {
                    kbflow_core::Error::network_error()
                        .with_message("Connection to Chroma failed")
                        .with_source(e)
                } else {
                    kbflow_core::Error::network_error()
                        .with_message(e.to_string())
                        .with_source(e)
                }
            }
            VectorError::Serialization(e) => kbflow_core::Error::serialization()
                .with_message(e.to_string())
                .with_source(e),
            VectorError::Api { status, message } => {
                let error = match status {
                    401 | 403 => kbflow_core::Error::authentication(),
                    404 => kbflow_core::Error::not_found(),
                    429 => kbflow_core::Error::rate_limited(),
                    500.. => kbflow_core::Error::service_unavailable(),
                    _ => kbflow_core::Error::external_error(),
                };
                error.with_message(format!("Chroma returned {status}: {message}"))
            }
            VectorError::InvalidResponse(message) => {
                kbflow_core::Error::external_error().with_message(message)
            }
            VectorError::InvalidConfig(message) => {
                kbflow_core::Error::configuration().with_message(message)
            }
            VectorError::Embedding(e) => e,
        }
    }
}

#[cfg(test)]
mod tests {
    use kbflow_core::ErrorKind;

    use super::*;

    #[test]
    fn embedding_error_passes_through() {
        let error: kbflow_core::Error = VectorError::Embedding(kbflow_core::Error::timeout()).into();
        assert_eq!(error.kind(), ErrorKind::Timeout);
    }

    #[test]
    fn api_error_keeps_status_in_message() {
        let error: kbflow_core::Error = VectorError::Api {
            status: 500,
            message: "index corrupted".into(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::ServiceUnavailable);
        assert!(error.to_string().contains("index corrupted"));
    }
}
