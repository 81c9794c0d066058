//! Unified error type for the Eventra client.

use eventra_protocol::{FieldErrors, ProtocolError, ServerError};
use eventra_session::SessionError;
use eventra_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// When using the `eventra` crate, you deal with this single error type
/// instead of importing errors from each sub-crate. The `#[from]`
/// variants let `?` convert sub-crate errors automatically.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EventraError {
    /// The request never got a response.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A body could not be encoded or decoded.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Authentication failed or the session ended.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The server rejected the payload field by field (HTTP 400).
    #[error("{message}: {fields}")]
    Validation { message: String, fields: FieldErrors },

    /// The resource does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Any other non-2xx answer.
    #[error("api error {status}: {message}")]
    Api { status: u16, message: String },

    /// The client could not be configured.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl EventraError {
    /// Classifies a normalized non-2xx answer from a feature endpoint.
    pub fn from_server(err: ServerError) -> Self {
        match err.status {
            _ if err.is_validation() => Self::Validation {
                message: err.message,
                fields: err.fields,
            },
            404 => Self::NotFound(err.message),
            status => Self::Api {
                status,
                message: err.message,
            },
        }
    }

    /// `true` when the user has to log in again.
    pub fn is_session_ended(&self) -> bool {
        matches!(self, Self::Session(e) if e.ends_session())
    }
}
