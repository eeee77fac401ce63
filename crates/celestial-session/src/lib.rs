//! Session layer for Celestial.
//!
//! Wraps each match in a tokio task that owns its
//! [`TurnController`](celestial_engine::TurnController) and serves
//! commands one at a time, and pairs players into matches.
//!
//! # Key types
//!
//! - [`Matchmaker`]: pairs two players sharing a [`MatchSlot`](celestial_protocol::MatchSlot)
//! - [`SessionHandle`]: cloneable handle to a running session
//! - [`GameSession`]: one match plus its [`SessionState`]
//! - [`SessionConfig`]: channel size, rules, and seed for new sessions

mod config;
mod error;
mod matchmaker;
mod session;

pub use config::{SessionConfig, SessionState};
pub use error::SessionError;
pub use matchmaker::{Matchmaker, Seating};
pub use session::{GameSession, SessionHandle, SessionInfo, spawn_session};
