//! Error types for `synapse-documents`.

use thiserror::Error;

/// A non-success response reported by the users resource.
///
/// Produced by the HTTP collaborator and passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("api error {http_code}: {message}")]
pub struct ApiError {
  pub http_code:  u16,
  /// Platform-specific error code from the response body, if any.
  pub error_code: Option<String>,
  pub message:    String,
}

/// Raised by a [`User`](crate::user::User) whose credentials are invalid or
/// expired.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("authentication failed: {0}")]
pub struct AuthError(pub String);

#[derive(Debug, Error)]
pub enum Error {
  /// A draft document failed validation; raised before any I/O.
  #[error("validation failed: {0}")]
  Validation(String),

  /// A call-time argument was rejected; raised before any I/O.
  #[error("invalid argument: {0}")]
  Argument(String),

  #[error(transparent)]
  Api(#[from] ApiError),

  #[error(transparent)]
  Auth(#[from] AuthError),

  #[error("settings error: {0}")]
  Settings(#[from] config::ConfigError),
}

impl Error {
  pub(crate) fn validation(message: impl Into<String>) -> Self {
    Self::Validation(message.into())
  }

  pub(crate) fn argument(message: impl Into<String>) -> Self {
    Self::Argument(message.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
