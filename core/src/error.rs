use std::fmt;
use thiserror::Error;

/// The error type for azstore operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required argument is empty
    ParameterInvalid,

    /// Configuration error (missing fields, invalid values)
    ConfigInvalid,

    /// Credentials exist but are invalid/malformed
    CredentialInvalid,

    /// Request cannot be built (invalid uri, header, etc.)
    RequestInvalid,

    /// Request cannot be canonicalized for signing (malformed query, etc.)
    CanonicalizationFailed,

    /// Entity cannot be turned into a valid JSON body
    SerializationFailed,

    /// Error response body is not in the expected format
    DeserializationFailed,

    /// Response status is outside the set the operation allows
    UnexpectedStatus,

    /// Service returned a well-formed error response
    ServiceError,

    /// Service returned a failure status without a response body
    ResponseWithoutBody,

    /// Unexpected errors (network, I/O, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the source error as the given concrete type.
    ///
    /// Returns `None` if there is no source or the source is of another type.
    pub fn downcast_source_ref<E>(&self) -> Option<&E>
    where
        E: fmt::Display + fmt::Debug + Send + Sync + 'static,
    {
        self.source.as_ref()?.downcast_ref::<E>()
    }

    /// Check if this error was returned by the service itself
    pub fn is_service_error(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::ServiceError | ErrorKind::ResponseWithoutBody
        )
    }
}

// Convenience constructors
impl Error {
    /// Create a parameter invalid error for an empty argument
    pub fn parameter_invalid(name: &str) -> Self {
        Self::new(
            ErrorKind::ParameterInvalid,
            format!("storage: parameter is empty: {name}"),
        )
    }

    /// Create a config invalid error
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ConfigInvalid, message)
    }

    /// Create a credential invalid error
    pub fn credential_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialInvalid, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a canonicalization failed error
    pub fn canonicalization_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CanonicalizationFailed, message)
    }

    /// Create a serialization failed error
    pub fn serialization_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SerializationFailed, message)
    }

    /// Create a deserialization failed error
    pub fn deserialization_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DeserializationFailed, message)
    }

    /// Create an unexpected status error
    pub fn unexpected_status(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnexpectedStatus, message)
    }

    /// Create a service error
    pub fn service_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceError, message)
    }

    /// Create a response without body error
    pub fn response_without_body(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ResponseWithoutBody, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::ParameterInvalid => write!(f, "invalid parameter"),
            ErrorKind::ConfigInvalid => write!(f, "invalid configuration"),
            ErrorKind::CredentialInvalid => write!(f, "invalid credentials"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::CanonicalizationFailed => write!(f, "canonicalization failed"),
            ErrorKind::SerializationFailed => write!(f, "serialization failed"),
            ErrorKind::DeserializationFailed => write!(f, "deserialization failed"),
            ErrorKind::UnexpectedStatus => write!(f, "unexpected status code"),
            ErrorKind::ServiceError => write!(f, "service error"),
            ErrorKind::ResponseWithoutBody => write!(f, "service response without body"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::fmt::Error> for Error {
    fn from(err: std::fmt::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderValue> for Error {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::InvalidHeaderName> for Error {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::header::ToStrError> for Error {
    fn from(err: http::header::ToStrError) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
