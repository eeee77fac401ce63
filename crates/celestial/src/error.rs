//! Unified error type for Celestial.

use celestial_engine::EngineError;
use celestial_protocol::ProtocolError;
use celestial_session::SessionError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant lets `?` convert sub-crate
/// errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum CelestialError {
    /// Encode, decode, or an out-of-order message.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rule rejection or a broken engine contract.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// The session is gone, or a pending match was cancelled.
    #[error(transparent)]
    Session(#[from] SessionError),
}
