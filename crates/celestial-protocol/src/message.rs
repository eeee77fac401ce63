//! Request and response messages between a client and the game server.
//!
//! The vocabulary is deliberately small. A client joins a match slot
//! with its deck, then alternates between polling for a newer version
//! and submitting actions stamped with the version it last saw.

use serde::{Deserialize, Serialize};

use crate::{Action, CardId, ClientView, MatchSlot, Seat};

/// Client → server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Enter the match slot with a decoded deck list.
    Join { slot: MatchSlot, deck: Vec<CardId> },

    /// Submit an action. `version` is the version the client acted on;
    /// `None` skips the staleness check.
    Act {
        action: Action,
        #[serde(default)]
        version: Option<u64>,
    },

    /// Ask for a newer view than `last_seen`.
    Poll { last_seen: u64 },

    /// Concede the game.
    Forfeit,
}

/// Server → client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The match started and the client sits in `seat`.
    Seated { seat: Seat },

    /// The submitted action was applied.
    Accepted,

    /// The submitted action was refused; nothing changed.
    Rejected { reason: String },

    /// Nothing changed since the polled version.
    NoChange,

    /// A fresh view of the game.
    Update { view: Box<ClientView> },

    /// The request could not be served at all.
    Error { message: String },
}
