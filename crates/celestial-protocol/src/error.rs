//! Error types for the protocol layer.
//!
//! Each crate in Celestial defines its own error enum. A `ProtocolError`
//! always means a message could not be turned into bytes or back; it
//! never describes a game rule.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed.
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, or a
    /// message of the wrong shape.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message decoded but makes no sense at this point of the
    /// conversation, such as an action sent before joining.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
