//! Codec trait and the JSON implementation used for request and response
//! bodies.
//!
//! The session and client layers never call `serde_json` directly; they go
//! through a [`Codec`] so the body format lives in one place.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes Rust types to body bytes and decodes body bytes back.
///
/// `Send + Sync + 'static` because one codec is shared by every request
/// the client makes.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses JSON (via `serde_json`), the only body format the
/// Eventra backend speaks.
///
/// ## Example
///
/// ```rust
/// use eventra_protocol::{Codec, JsonCodec, RefreshRequest, RefreshResponse};
///
/// let codec = JsonCodec;
/// let bytes = codec
///     .encode(&RefreshRequest { refresh: "R1".into() })
///     .unwrap();
/// assert_eq!(bytes, br#"{"refresh":"R1"}"#);
///
/// let reply: RefreshResponse = codec.decode(br#"{"access":"A2"}"#).unwrap();
/// assert_eq!(reply.access, "A2");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(|e| ProtocolError::Encode(e.to_string()))
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(|e| ProtocolError::Decode(e.to_string()))
    }
}
