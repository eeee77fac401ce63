//! Two scripted bots play one match of Celestial over the JSON wire
//! format.
//!
//! ```text
//! RUST_LOG=celestial_engine=debug DUEL_SEED=7 cargo run -p celestial-duel
//! ```

use std::sync::Arc;

use celestial::prelude::*;

/// Attempts per bot before it concedes a match that won't end.
const MAX_ACTIONS: usize = 2_000;

const MORNING_DECK: &[u32] = &[4, 4, 3, 3, 6, 6, 41, 11, 25, 25, 28, 31, 34, 87, 903];
const EVENING_DECK: &[u32] = &[2, 2, 8, 50, 60, 61, 48, 33, 901, 902, 905, 905, 906, 907, 39];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    celestial::init_tracing();

    let seed = std::env::var("DUEL_SEED").ok().and_then(|s| s.parse().ok());
    let config = SessionConfig {
        seed,
        ..SessionConfig::default()
    };
    let matchmaker = Arc::new(Matchmaker::new(Catalog::standard(), config));

    let morning = tokio::spawn(bot("morning", Arc::clone(&matchmaker), MORNING_DECK));
    let evening = tokio::spawn(bot("evening", Arc::clone(&matchmaker), EVENING_DECK));
    let (morning, evening) = tokio::join!(morning, evening);

    let (morning, evening) = (morning??, evening??);
    tracing::info!(
        morning_seat = %morning.seat,
        winner = ?morning.winner,
        morning_actions = morning.actions,
        evening_actions = evening.actions,
        "duel finished"
    );
    Ok(())
}

struct Outcome {
    seat: Seat,
    winner: Option<Seat>,
    actions: usize,
}

async fn bot(
    name: &'static str,
    matchmaker: Arc<Matchmaker>,
    deck: &'static [u32],
) -> Result<Outcome, CelestialError> {
    let codec = JsonCodec;
    let mut conn = PlayerConnection::new(matchmaker);

    let join = ClientMessage::Join {
        slot: MatchSlot::new("duel"),
        deck: deck.iter().copied().map(CardId).collect(),
    };
    let seat = match send(&mut conn, &codec, &join).await? {
        ServerMessage::Seated { seat } => seat,
        other => {
            return Err(ProtocolError::InvalidMessage(format!("{name}: expected a seat, got {other:?}")).into());
        }
    };
    tracing::info!(bot = name, %seat, "seated");

    let mut last_seen = 0;
    let mut actions = 0;
    loop {
        let view = match send(&mut conn, &codec, &ClientMessage::Poll { last_seen }).await? {
            ServerMessage::Update { view } => view,
            ServerMessage::NoChange => {
                tokio::task::yield_now().await;
                continue;
            }
            other => {
                return Err(ProtocolError::InvalidMessage(format!("{name}: poll answered {other:?}")).into());
            }
        };
        last_seen = view.version;

        if view.winner.is_some() {
            return Ok(Outcome {
                seat,
                winner: view.winner,
                actions,
            });
        }
        if actions >= MAX_ACTIONS {
            tracing::warn!(bot = name, "no winner in sight, conceding");
            send(&mut conn, &codec, &ClientMessage::Forfeit).await?;
            continue;
        }

        let Some(action) = choose(&view) else {
            continue;
        };
        let msg = ClientMessage::Act {
            action: action.clone(),
            version: Some(view.version),
        };
        actions += 1;
        match send(&mut conn, &codec, &msg).await? {
            ServerMessage::Accepted => {
                tracing::debug!(bot = name, %action, "acted");
            }
            ServerMessage::Rejected { reason } => {
                tracing::debug!(bot = name, %action, %reason, "refused, retrying");
                last_seen = 0;
            }
            other => {
                return Err(ProtocolError::InvalidMessage(format!("{name}: act answered {other:?}")).into());
            }
        }
    }
}

/// Keeps every opening card, plays the most expensive playable card, and
/// passes otherwise.
fn choose(view: &ClientView) -> Option<Action> {
    match view.phase {
        Phase::Mulligan if !view.mulligan_complete => Some(Action::Mulligan {
            mask: vec![false; view.hand.len()],
        }),
        Phase::AwaitingInput(_) if view.has_priority => {
            let best = view
                .hand
                .iter()
                .enumerate()
                .filter(|(_, c)| c.playable)
                .max_by_key(|(_, c)| c.cost)
                .map(|(index, _)| index);
            Some(match best {
                Some(index) => Action::Play { index },
                None => Action::Pass,
            })
        }
        _ => None,
    }
}

async fn send(
    conn: &mut PlayerConnection,
    codec: &JsonCodec,
    msg: &ClientMessage,
) -> Result<ServerMessage, CelestialError> {
    let bytes = codec.encode_request(msg)?;
    let reply = conn.handle_bytes(codec, &bytes).await?;
    Ok(codec.decode_reply(&reply)?)
}
