//! Per-player message handling.
//!
//! A transport owns one [`PlayerConnection`] per client. The flow is:
//!   1. `Join` → wait in the matchmaker → `Seated`
//!   2. Loop: `Poll` / `Act` against the seated session
//!   3. `Forfeit`, or drop the connection to concede an unfinished game

use std::sync::Arc;

use celestial_engine::Rejection;
use celestial_protocol::{ClientMessage, Codec, PollReply, ProtocolError, ServerMessage};
use celestial_session::{Matchmaker, Seating};

use crate::CelestialError;

/// Maps one client message to its reply.
///
/// `seating` is `None` until a `Join` succeeds. Failures that are not
/// rule rejections become [`ServerMessage::Error`].
pub async fn handle_message(
    matchmaker: &Matchmaker,
    seating: &mut Option<Seating>,
    msg: ClientMessage,
) -> ServerMessage {
    match dispatch(matchmaker, seating, msg).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::debug!(error = %e, "request failed");
            ServerMessage::Error {
                message: e.to_string(),
            }
        }
    }
}

async fn dispatch(
    matchmaker: &Matchmaker,
    seating: &mut Option<Seating>,
    msg: ClientMessage,
) -> Result<ServerMessage, CelestialError> {
    let reply = match (msg, seating.clone()) {
        (ClientMessage::Join { slot, deck }, None) => {
            let seated = matchmaker.join(slot, &deck).await?;
            let seat = seated.seat;
            *seating = Some(seated);
            ServerMessage::Seated { seat }
        }
        (ClientMessage::Join { .. }, Some(_)) => {
            return Err(ProtocolError::InvalidMessage("already seated".into()).into());
        }
        (_, None) => {
            return Err(ProtocolError::InvalidMessage("join a match first".into()).into());
        }
        (ClientMessage::Act { action, version }, Some(Seating { seat, session })) => {
            match session.submit(seat, action, version).await {
                Ok(()) => ServerMessage::Accepted,
                Err(e) => match e.rejection() {
                    Some(rejection) => ServerMessage::Rejected {
                        reason: rejection.to_string(),
                    },
                    None => return Err(e.into()),
                },
            }
        }
        (ClientMessage::Poll { last_seen }, Some(Seating { seat, session })) => {
            match session.poll(seat, last_seen).await? {
                PollReply::NoChange => ServerMessage::NoChange,
                PollReply::Update(view) => ServerMessage::Update { view },
            }
        }
        (ClientMessage::Forfeit, Some(Seating { seat, session })) => {
            if session.forfeit(seat).await? {
                ServerMessage::Accepted
            } else {
                ServerMessage::Rejected {
                    reason: Rejection::GameOver.to_string(),
                }
            }
        }
    };
    Ok(reply)
}

// ---------------------------------------------------------------------------
// PlayerConnection
// ---------------------------------------------------------------------------

/// One client's side of the server: the matchmaker it joins through and
/// the seat it holds once paired.
///
/// Dropping a seated connection forfeits the game if it is still running.
pub struct PlayerConnection {
    matchmaker: Arc<Matchmaker>,
    seating: Option<Seating>,
}

impl PlayerConnection {
    pub fn new(matchmaker: Arc<Matchmaker>) -> Self {
        Self {
            matchmaker,
            seating: None,
        }
    }

    pub fn seating(&self) -> Option<&Seating> {
        self.seating.as_ref()
    }

    pub async fn handle_message(&mut self, msg: ClientMessage) -> ServerMessage {
        handle_message(&self.matchmaker, &mut self.seating, msg).await
    }

    /// Decodes a request, handles it, and encodes the reply.
    ///
    /// Undecodable input is answered with [`ServerMessage::Error`] rather
    /// than failing the connection.
    ///
    /// # Errors
    /// Returns `CelestialError::Protocol` only if the reply can't be
    /// encoded.
    pub async fn handle_bytes<C: Codec>(
        &mut self,
        codec: &C,
        data: &[u8],
    ) -> Result<Vec<u8>, CelestialError> {
        let reply = match codec.decode_request(data) {
            Ok(msg) => self.handle_message(msg).await,
            Err(e) => {
                tracing::debug!(error = %e, "failed to decode client message");
                ServerMessage::Error {
                    message: e.to_string(),
                }
            }
        };
        Ok(codec.encode_reply(&reply)?)
    }

    /// Leaves the match, conceding it if still running. Returns `true`
    /// if this ended the game.
    pub async fn leave(mut self) -> Result<bool, CelestialError> {
        match self.seating.take() {
            Some(Seating { seat, session }) => Ok(session.forfeit(seat).await?),
            None => Ok(false),
        }
    }
}

impl Drop for PlayerConnection {
    fn drop(&mut self) {
        let Some(Seating { seat, session }) = self.seating.take() else {
            return;
        };
        // Drop is synchronous, so the forfeit is fire-and-forget.
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                if let Ok(true) = session.forfeit(seat).await {
                    tracing::info!(session_id = %session.session_id(), %seat, "player left, game forfeited");
                }
            });
        }
    }
}
