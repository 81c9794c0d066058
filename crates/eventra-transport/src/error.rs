/// Errors that can occur in the transport layer.
///
/// Payloads are plain strings so the error is `Clone`: a single failure
/// may be handed to every request waiting on the same outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be built (bad URL, bad header, bad MIME type).
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// No connection could be established to the server.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The server did not answer within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The request failed after the connection was established.
    #[error("request failed: {0}")]
    Request(String),

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}
