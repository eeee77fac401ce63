//! # Celestial
//!
//! Authoritative server engine for Celestial, a two-player card game
//! where both players queue cards into a shared story and the story
//! resolves at the end of each round.
//!
//! The server owns every match. Clients only submit actions stamped with
//! the version they saw and poll for newer player-scoped views.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use celestial::prelude::*;
//!
//! # async fn run() {
//! celestial::init_tracing();
//!
//! let matchmaker = Arc::new(Matchmaker::default());
//! let mut player = PlayerConnection::new(Arc::clone(&matchmaker));
//!
//! // Waits until a second player joins the same slot.
//! let reply = player
//!     .handle_message(ClientMessage::Join {
//!         slot: MatchSlot::new("table-1"),
//!         deck: vec![CardId(4); 12],
//!     })
//!     .await;
//! # let _ = reply;
//! # }
//! ```

mod error;
pub mod handler;

pub use error::CelestialError;
pub use handler::PlayerConnection;

pub use celestial_engine as engine;
pub use celestial_protocol as protocol;
pub use celestial_session as session;

/// Installs a `tracing` fmt subscriber filtered by `RUST_LOG`, defaulting
/// to `info`. Calling it again is a no-op.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

pub mod prelude {
    pub use crate::handler::{PlayerConnection, handle_message};
    pub use crate::{CelestialError, init_tracing};

    pub use celestial_engine::{Card, CardRef, Catalog, EngineError, Rejection, Rules, TurnController};
    pub use celestial_protocol::{
        Action, CardId, CardInfo, ClientMessage, ClientView, Codec, JsonCodec, MatchSlot, Phase,
        PollReply, ProtocolError, Seat, ServerMessage,
    };
    pub use celestial_session::{
        Matchmaker, Seating, SessionConfig, SessionError, SessionHandle, SessionState,
    };
}
