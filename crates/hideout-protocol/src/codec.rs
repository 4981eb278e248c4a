//! Codec trait and implementations for turning notices into bytes.
//!
//! The room core produces typed [`Notice`](crate::Notice) values. Whoever owns
//! the connection picks a [`Codec`] and encodes them before handing bytes to
//! the transport. Swapping JSON for a binary format only touches this seam.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
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

/// A [`Codec`] backed by `serde_json`. Human-readable, which makes it the
/// default while a game is being tuned.
///
/// ```rust
/// use hideout_protocol::{Codec, JsonCodec, Notice};
///
/// let codec = JsonCodec;
/// let bytes = codec.encode(&Notice::sound("Eat")).unwrap();
/// let back: Notice = codec.decode(&bytes).unwrap();
/// assert_eq!(back, Notice::sound("Eat"));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
