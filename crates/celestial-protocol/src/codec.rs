//! Wire codecs.
//!
//! The engine and session layers never see bytes. A connection picks a
//! [`Codec`] and moves [`ClientMessage`]s in and [`ServerMessage`]s out
//! with it; clients use the same codec in the other direction.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ClientMessage, ProtocolError, ServerMessage};

/// Turns protocol values into bytes and back.
///
/// Implementors provide the generic pair; the message helpers pin the
/// direction so a server can't decode its own replies by mistake.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Server side: reads what a client sent.
    fn decode_request(&self, data: &[u8]) -> Result<ClientMessage, ProtocolError> {
        self.decode(data)
    }

    /// Server side: writes the answer.
    fn encode_reply(&self, reply: &ServerMessage) -> Result<Vec<u8>, ProtocolError> {
        self.encode(reply)
    }

    /// Client side: writes a request.
    fn encode_request(&self, msg: &ClientMessage) -> Result<Vec<u8>, ProtocolError> {
        self.encode(msg)
    }

    /// Client side: reads the server's answer.
    fn decode_reply(&self, data: &[u8]) -> Result<ServerMessage, ProtocolError> {
        self.decode(data)
    }
}

/// JSON over `serde_json`, behind the default `json` feature.
///
/// ```rust
/// use celestial_protocol::{Action, ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg = ClientMessage::Act { action: Action::Pass, version: Some(3) };
///
/// let bytes = codec.encode_request(&msg).unwrap();
/// assert_eq!(codec.decode_request(&bytes).unwrap(), msg);
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
