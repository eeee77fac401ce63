//! Wire protocol for Celestial.
//!
//! This crate defines the data that crosses the boundary between the
//! game engine and a client:
//!
//! - **Types** ([`Seat`], [`CardInfo`], [`Action`], [`Status`]): the
//!   identities and requests a game is built from.
//! - **Views** ([`ClientView`], [`PollReply`]): what one player may see.
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): the request /
//!   response vocabulary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how messages become
//!   bytes.
//! - **Errors** ([`ProtocolError`]).
//!
//! The protocol layer knows nothing about rules. It only describes
//! shapes, so the engine can depend on it without pulling in transport.

mod codec;
mod error;
mod message;
mod types;
mod view;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{ClientMessage, ServerMessage};
pub use types::{Action, CardId, CardInfo, MatchSlot, Quality, Seat, SessionId, Status};
pub use view::{
    ActView, Animation, ClientView, HandCard, OpponentView, Phase, PollReply, Provenance,
    RecapLine, RecapView, RoundOutcome, Tally, Zone,
};
