//! Collaborator error type.
//!
//! Retrieval, generation and embedding backends report failures as an
//! [`Error`] tagged with an [`ErrorKind`]. The runtime only inspects the kind,
//! so backends are free to attach whatever message and source they have.

use strum::{AsRefStr, Display, IntoStaticStr};
use thiserror::Error;

/// Boxed source error that can cross task boundaries.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Result alias for collaborator calls.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// What went wrong, independent of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The request was rejected as malformed.
    InvalidInput,
    /// The backend could not be reached.
    NetworkError,
    /// Credentials were missing or refused.
    Authentication,
    /// The backend asked the caller to slow down.
    RateLimited,
    /// The backend is up but cannot serve right now.
    ServiceUnavailable,
    /// The backend answered with an error of its own.
    ExternalError,
    /// The client is misconfigured.
    Configuration,
    /// The addressed resource does not exist.
    NotFound,
    /// The call did not finish in time.
    Timeout,
    /// A payload could not be encoded or decoded.
    Serialization,
}

impl ErrorKind {
    /// Returns true if repeating the same call may succeed.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            Self::NetworkError | Self::RateLimited | Self::ServiceUnavailable | Self::Timeout
        )
    }
}

/// A collaborator failure.
#[derive(Debug, Error)]
#[error("{kind}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
pub struct Error {
    /// Failure category.
    pub kind: ErrorKind,
    /// Human-readable detail.
    pub message: Option<String>,
    /// Underlying error.
    #[source]
    pub source: Option<BoxedError>,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

impl Error {
    /// Creates an error of the given kind without detail.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
            source: None,
        }
    }

    /// Attaches a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attaches the underlying error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn invalid_input() -> Self {
        Self::new(ErrorKind::InvalidInput)
    }

    pub fn network_error() -> Self {
        Self::new(ErrorKind::NetworkError)
    }

    pub fn authentication() -> Self {
        Self::new(ErrorKind::Authentication)
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorKind::RateLimited)
    }

    pub fn service_unavailable() -> Self {
        Self::new(ErrorKind::ServiceUnavailable)
    }

    pub fn external_error() -> Self {
        Self::new(ErrorKind::ExternalError)
    }

    pub fn configuration() -> Self {
        Self::new(ErrorKind::Configuration)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout)
    }

    pub fn serialization() -> Self {
        Self::new(ErrorKind::Serialization)
    }

    /// Returns the failure category.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the failure category as a snake_case string.
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns true if repeating the same call may succeed.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization()
            .with_message(err.to_string())
            .with_source(err)
    }
}
