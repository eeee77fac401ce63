//! Session actor: one tokio task per match, owning the game.
//!
//! Each session runs as an independent task that owns its
//! [`TurnController`] exclusively. Both players talk to it through a
//! cloneable [`SessionHandle`]; commands are applied one at a time, so a
//! takedown can never interleave with another player's input.

use std::sync::atomic::{AtomicU64, Ordering};

use celestial_engine::{CardRef, EngineError, Rules, TurnController};
use celestial_protocol::{Action, ClientView, Phase, PollReply, Seat, SessionId};
use tokio::sync::{mpsc, oneshot};

use crate::{SessionError, SessionState};

/// Counter for generating unique session IDs.
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

// ---------------------------------------------------------------------------
// GameSession
// ---------------------------------------------------------------------------

/// A match and its lifecycle, without any task around it.
#[derive(Debug)]
pub struct GameSession {
    id: SessionId,
    state: SessionState,
    controller: TurnController,
}

impl GameSession {
    /// Deals both decks and runs the first upkeep. The session starts
    /// `InProgress` with both players owing a mulligan.
    pub fn new(
        decks: [Vec<CardRef>; 2],
        rules: Rules,
        seed: Option<u64>,
    ) -> Result<Self, SessionError> {
        let id = SessionId(NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed));
        let controller = TurnController::new(decks, rules, seed)?;
        let mut session = Self {
            id,
            state: SessionState::AwaitingOpponent,
            controller,
        };
        session.advance(SessionState::InProgress);
        Ok(session)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn controller(&self) -> &TurnController {
        &self.controller
    }

    /// Applies an action. Rejections come back as
    /// [`EngineError::Rejected`]; anything else is logged as a bug.
    pub fn apply(
        &mut self,
        seat: Seat,
        action: Action,
        version: Option<u64>,
    ) -> Result<(), EngineError> {
        let result = self.controller.apply_action(seat, action, version);
        if let Err(e) = &result {
            if !e.is_rejection() {
                tracing::error!(session_id = %self.id, %seat, error = %e, "engine invariant broken");
            }
        }
        self.sync();
        result
    }

    pub fn forfeit(&mut self, seat: Seat) -> bool {
        let ended = self.controller.forfeit(seat);
        self.sync();
        ended
    }

    pub fn poll(&self, seat: Seat, last_seen: u64) -> PollReply {
        self.controller.poll(seat, last_seen)
    }

    pub fn view(&self, seat: Seat, since: u64) -> ClientView {
        self.controller.project_view(seat, since)
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            session_id: self.id,
            state: self.state,
            version: self.controller.version(),
            phase: self.controller.phase(),
            round: self.controller.state().round(),
            winner: self.controller.winner(),
        }
    }

    fn sync(&mut self) {
        if self.controller.winner().is_some() && self.state.is_active() {
            self.advance(SessionState::Finished);
        }
    }

    fn advance(&mut self, target: SessionState) {
        if !self.state.can_transition_to(target) {
            tracing::warn!(session_id = %self.id, from = %self.state, to = %target, "invalid session transition");
            return;
        }
        tracing::debug!(session_id = %self.id, from = %self.state, to = %target, "session transition");
        self.state = target;
    }

    fn close(&mut self) {
        self.state = SessionState::Closed;
    }
}

// ---------------------------------------------------------------------------
// Commands and info
// ---------------------------------------------------------------------------

/// Commands sent to a session actor through its channel.
pub(crate) enum SessionCommand {
    Apply {
        seat: Seat,
        action: Action,
        version: Option<u64>,
        reply: oneshot::Sender<Result<(), EngineError>>,
    },
    Poll {
        seat: Seat,
        last_seen: u64,
        reply: oneshot::Sender<PollReply>,
    },
    View {
        seat: Seat,
        since: u64,
        reply: oneshot::Sender<ClientView>,
    },
    Forfeit {
        seat: Seat,
        reply: oneshot::Sender<bool>,
    },
    Info {
        reply: oneshot::Sender<SessionInfo>,
    },
    Shutdown,
}

impl std::fmt::Debug for SessionCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Apply { .. } => "Apply",
            Self::Poll { .. } => "Poll",
            Self::View { .. } => "View",
            Self::Forfeit { .. } => "Forfeit",
            Self::Info { .. } => "Info",
            Self::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

/// Snapshot of a session's public state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub session_id: SessionId,
    pub state: SessionState,
    pub version: u64,
    pub phase: Phase,
    pub round: u32,
    pub winner: Option<Seat>,
}

// ---------------------------------------------------------------------------
// SessionHandle
// ---------------------------------------------------------------------------

/// A cheap, cloneable handle for talking to a session actor.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    session_id: SessionId,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Submits an action and reports whether it was accepted.
    ///
    /// `Ok(false)` means the engine rejected it and nothing changed.
    /// `Err` means the session is gone or the engine broke.
    pub async fn apply(
        &self,
        seat: Seat,
        action: Action,
        version: Option<u64>,
    ) -> Result<bool, SessionError> {
        match self.submit(seat, action, version).await {
            Ok(()) => Ok(true),
            Err(e) if e.rejection().is_some() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Like [`SessionHandle::apply`], but a rejection comes back as an
    /// error carrying its reason.
    pub async fn submit(
        &self,
        seat: Seat,
        action: Action,
        version: Option<u64>,
    ) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Apply {
            seat,
            action,
            version,
            reply: reply_tx,
        })
        .await?;
        let result = reply_rx.await.map_err(|_| self.unavailable())?;
        Ok(result?)
    }

    pub async fn poll(&self, seat: Seat, last_seen: u64) -> Result<PollReply, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Poll {
            seat,
            last_seen,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn view(&self, seat: Seat, since: u64) -> Result<ClientView, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::View {
            seat,
            since,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Concedes for `seat`. Returns `false` if the game was already over.
    pub async fn forfeit(&self, seat: Seat) -> Result<bool, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Forfeit {
            seat,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Info { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    /// Stops the actor. Commands already queued are still served.
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        self.send(SessionCommand::Shutdown).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> SessionError {
        SessionError::Unavailable(self.session_id)
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct SessionActor {
    session: GameSession,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    async fn run(mut self) {
        let session_id = self.session.id();
        tracing::info!(%session_id, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Apply {
                    seat,
                    action,
                    version,
                    reply,
                } => {
                    let result = self.session.apply(seat, action, version);
                    let _ = reply.send(result);
                }
                SessionCommand::Poll {
                    seat,
                    last_seen,
                    reply,
                } => {
                    let _ = reply.send(self.session.poll(seat, last_seen));
                }
                SessionCommand::View { seat, since, reply } => {
                    let _ = reply.send(self.session.view(seat, since));
                }
                SessionCommand::Forfeit { seat, reply } => {
                    let _ = reply.send(self.session.forfeit(seat));
                }
                SessionCommand::Info { reply } => {
                    let _ = reply.send(self.session.info());
                }
                SessionCommand::Shutdown => {
                    tracing::info!(%session_id, "session shutting down");
                    break;
                }
            }
        }

        self.session.close();
        tracing::info!(%session_id, state = %self.session.state(), "session actor stopped");
    }
}

/// Spawns the actor for `session` and returns its handle.
///
/// The actor stops on [`SessionHandle::shutdown`] or when every handle
/// has been dropped.
pub fn spawn_session(session: GameSession, channel_size: usize) -> SessionHandle {
    let (sender, receiver) = mpsc::channel(channel_size);
    let session_id = session.id();
    let actor = SessionActor { session, receiver };
    tokio::spawn(actor.run());
    SessionHandle { session_id, sender }
}
