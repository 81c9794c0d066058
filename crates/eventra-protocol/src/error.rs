//! Error types for the protocol layer.

/// Errors that can occur in the protocol layer.
///
/// The serde error is rendered to a string at the boundary so the error
/// stays `Clone` and can travel inside a shared refresh outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[error("encode failed: {0}")]
    Encode(String),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: the backend changed a field name, returned HTML from
    /// a proxy error page, or sent an empty body where JSON was expected.
    #[error("decode failed: {0}")]
    Decode(String),
}
