//! Game engine for Celestial.
//!
//! Two players build a shared queue of cards (the story) during a round,
//! then the story resolves in order and the higher score takes the round.
//! This crate is the whole rules layer and is fully synchronous: it never
//! spawns, never blocks, and never installs a log subscriber.
//!
//! # Key types
//!
//! - [`TurnController`]: validates and applies player actions
//! - [`GameState`]: zones, mana, statuses, scores, and named operations
//! - [`Card`]: hook points for card behavior, see [`Catalog`]
//! - [`Story`]: the act queue and its resolution
//! - [`Recap`]: the log of the last takedown
//! - [`Rules`]: the numeric rules of a match
//! - [`project`]: the player-scoped [`ClientView`](celestial_protocol::ClientView)

mod card;
mod catalog;
mod controller;
mod error;
mod recap;
mod rules;
mod seat;
mod state;
mod status;
mod story;
mod view;

pub use card::{Card, CardRef, Vanilla, award_points, format_points, pending_points};
pub use catalog::{Catalog, birth, child};
pub use controller::TurnController;
pub use error::{EngineError, Rejection, Result};
pub use recap::{Recap, RecapEntry};
pub use rules::Rules;
pub use seat::PerSeat;
pub use state::{GameState, PlayerState};
pub use status::StatusLedger;
pub use story::{Act, COUNTERED, Story};
pub use view::project;

/// Constructors for every reference card.
pub mod cards {
    pub use crate::catalog::{
        ashes, awakening, birth_card, bounty, clear_view, conquer, dash, dawn, dove,
        enlightenment, fatigue, firebug, from_ashes, fruit, goliath, gust, hold_tight, hollow,
        hungry_ghost, hurricane, hush, impulse, kindling, nascence, nectar, nest, night_vision,
        oak, open_sky, patience, pet, pet_card, roost, seen, sickness, sprout, timid, truth,
        vulture,
    };
}
