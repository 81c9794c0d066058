//! Error types for the session layer.

use eventra_protocol::{FieldErrors, ProtocolError};
use eventra_transport::TransportError;

/// Errors that can occur while authenticating or while keeping a session
/// alive.
///
/// `Clone` because one refresh outcome is shared by every request that
/// was waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Login or registration was rejected by the server (401/403, or a
    /// 400 without per-field details).
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// The server rejected the payload field by field (HTTP 400).
    #[error("validation failed: {message}")]
    ValidationFailure { message: String, fields: FieldErrors },

    /// A refresh was needed but no refresh token is stored.
    /// Fails before any network I/O.
    #[error("no refresh token stored")]
    RefreshTokenMissing,

    /// The server refused the refresh token, the refresh timed out, or the
    /// session ended while the refresh was in flight.
    #[error("token refresh rejected: {0}")]
    RefreshRejected(String),

    /// The request never got a response. Never triggers a refresh.
    #[error("network failure: {0}")]
    NetworkFailure(#[from] TransportError),

    /// A 401 that the refresh machinery could not recover from, e.g. the
    /// replayed request was rejected again.
    #[error("request unauthorized")]
    Unauthorized,

    /// An auth flow got a non-2xx status that isn't about credentials.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// A body could not be encoded or a response could not be decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The token store could not persist a change.
    #[error("token storage failed: {0}")]
    Storage(String),
}

impl SessionError {
    /// `true` for errors after which the session is gone and the user has
    /// to log in again.
    pub fn ends_session(&self) -> bool {
        matches!(
            self,
            Self::RefreshTokenMissing | Self::RefreshRejected(_) | Self::Unauthorized
        )
    }
}
