//! Matchmaker: pairs two players who share a match slot.
//!
//! The first player to join a slot parks its deck and waits on a oneshot
//! receiver. The second player removes the entry, builds the session,
//! spawns its actor, and hands both players their [`Seating`]. Nobody
//! polls.

use std::collections::HashMap;

use celestial_engine::{CardRef, Catalog, EngineError};
use celestial_protocol::{CardId, MatchSlot, Seat};
use tokio::sync::{Mutex, oneshot};

use crate::session::{GameSession, spawn_session};
use crate::{SessionConfig, SessionError, SessionHandle};

/// Where a player ended up once its match started.
#[derive(Debug, Clone)]
pub struct Seating {
    pub seat: Seat,
    pub session: SessionHandle,
}

/// A player waiting for an opponent.
struct PendingMatch {
    deck: Vec<CardRef>,
    seat_tx: oneshot::Sender<Seating>,
}

/// The registry of pending matches, keyed by slot.
pub struct Matchmaker {
    catalog: Catalog,
    config: SessionConfig,
    pending: Mutex<HashMap<MatchSlot, PendingMatch>>,
}

impl Matchmaker {
    pub fn new(catalog: Catalog, config: SessionConfig) -> Self {
        Self {
            catalog,
            config,
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Joins `slot` with a deck list and waits until the match starts.
    ///
    /// The first arrival sits in [`Seat::First`], the second in
    /// [`Seat::Second`]. If the first arrival has given up by the time
    /// the second comes in, the newcomer takes over the slot and waits
    /// in turn.
    ///
    /// # Errors
    /// - `Engine(UnknownCard)` if the deck names an unknown card.
    /// - `Engine(DeckTooSmall)` if the deck is below the rules' minimum.
    ///   The error names the seat the deck would have taken, and the slot
    ///   is left as it was.
    /// - `MatchCancelled` if the slot is cancelled while waiting.
    pub async fn join(&self, slot: MatchSlot, deck: &[CardId]) -> Result<Seating, SessionError> {
        let deck = self.catalog.deck(deck)?;

        let waiting = {
            let mut pending = self.pending.lock().await;

            let min = self.config.rules.min_deck_size;
            if deck.len() < min {
                let seat = match pending.get(&slot) {
                    Some(first) if !first.seat_tx.is_closed() => Seat::Second,
                    _ => Seat::First,
                };
                tracing::debug!(%slot, size = deck.len(), min, "deck refused");
                return Err(EngineError::DeckTooSmall {
                    seat,
                    size: deck.len(),
                    min,
                }
                .into());
            }

            if let Some(first) = pending.remove(&slot) {
                if let Some(seating) = self.pair(&slot, first, deck.clone())? {
                    return Ok(seating);
                }
                tracing::debug!(%slot, "waiting player left, taking over slot");
            }

            let (seat_tx, seat_rx) = oneshot::channel();
            pending.insert(slot.clone(), PendingMatch { deck, seat_tx });
            tracing::debug!(%slot, "waiting for opponent");
            seat_rx
        };

        waiting
            .await
            .map_err(|_| SessionError::MatchCancelled(slot))
    }

    /// Drops the pending entry for `slot`. The waiting player's `join`
    /// returns `MatchCancelled`. Returns `false` if nobody was waiting.
    pub async fn cancel(&self, slot: &MatchSlot) -> bool {
        let removed = self.pending.lock().await.remove(slot).is_some();
        if removed {
            tracing::info!(%slot, "pending match cancelled");
        }
        removed
    }

    pub async fn is_pending(&self, slot: &MatchSlot) -> bool {
        self.pending.lock().await.contains_key(slot)
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Starts the match between the parked player and `deck`. Returns
    /// `None` if the parked player is gone.
    fn pair(
        &self,
        slot: &MatchSlot,
        first: PendingMatch,
        deck: Vec<CardRef>,
    ) -> Result<Option<Seating>, SessionError> {
        if first.seat_tx.is_closed() {
            return Ok(None);
        }

        let session = GameSession::new(
            [first.deck, deck],
            self.config.rules.clone(),
            self.config.seed,
        )?;
        let handle = spawn_session(session, self.config.channel_size);
        let session_id = handle.session_id();

        let seating = Seating {
            seat: Seat::First,
            session: handle.clone(),
        };
        if first.seat_tx.send(seating).is_err() {
            // Dropping the last handle stops the actor.
            return Ok(None);
        }

        tracing::info!(%session_id, %slot, "match created");
        Ok(Some(Seating {
            seat: Seat::Second,
            session: handle,
        }))
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new(Catalog::standard(), SessionConfig::default())
    }
}

impl std::fmt::Debug for Matchmaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matchmaker")
            .field("cards", &self.catalog.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
