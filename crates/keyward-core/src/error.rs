//! Error types for Keyward

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause attached to server-side failures
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Error, Debug)]
pub enum Error {
    // Input Errors
    #[error("{0} not provided")]
    MissingRequired(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Access Errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    // Lookup Errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ambiguous result: {0}")]
    Ambiguous(String),

    // Directory Errors
    #[error("Server error: {message}")]
    ServerError {
        message: String,
        #[source]
        source: Option<Cause>,
    },
}

impl Error {
    pub fn server_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Error::ServerError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Error::MissingRequired(_) => "MissingRequired",
            Error::InvalidInput(_) | Error::InvalidConfig(_) => "InvalidInput",
            Error::Unauthorized(_) | Error::PermissionDenied(_) => "Unauthorized",
            Error::NotFound(_) => "NotFound",
            Error::Ambiguous(_) => "Ambiguous",
            Error::ServerError { .. } => "ServerError",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Error::MissingRequired(_) | Error::InvalidInput(_) => 422,

            Error::Unauthorized(_) => 401,

            Error::PermissionDenied(_) => 403,

            Error::NotFound(_) => 404,

            Error::Ambiguous(_) => 409,

            Error::InvalidConfig(_) | Error::ServerError { .. } => 500,
        }
    }

    /// Whether this error is an authentication or authorization refusal
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Unauthorized(_) | Error::PermissionDenied(_))
    }
}
