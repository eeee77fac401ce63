//! The recap of the last takedown.

use celestial_protocol::{CardInfo, ClientView, RecapLine, RecapView, RoundOutcome, Seat};

use crate::PerSeat;

/// One resolved act.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecapEntry {
    pub card: CardInfo,
    pub owner: Seat,
    pub result: String,
}

/// Append-only log of a story run, plus per-player snapshots.
///
/// Reset at the start of every takedown and kept until the next one so
/// clients can replay the round at their own pace.
#[derive(Debug, Clone, Default)]
pub struct Recap {
    entries: Vec<RecapEntry>,
    snapshots: Vec<PerSeat<ClientView>>,
    scores: PerSeat<i32>,
    wins: PerSeat<u32>,
    outcome: Option<PerSeat<RoundOutcome>>,
}

impl Recap {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn entries(&self) -> &[RecapEntry] {
        &self.entries
    }

    pub fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    /// Round totals, set once the story has drained.
    pub fn scores(&self) -> &PerSeat<i32> {
        &self.scores
    }

    pub fn wins(&self) -> &PerSeat<u32> {
        &self.wins
    }

    pub fn outcome(&self, seat: Seat) -> Option<RoundOutcome> {
        self.outcome.as_ref().map(|o| o[seat])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.snapshots.is_empty()
    }

    pub(crate) fn push_entry(&mut self, card: CardInfo, owner: Seat, result: String) {
        self.entries.push(RecapEntry {
            card,
            owner,
            result,
        });
    }

    pub(crate) fn push_snapshot(&mut self, snapshot: PerSeat<ClientView>) {
        self.snapshots.push(snapshot);
    }

    /// Seals the round: stores totals, the outcome signal, and the final
    /// snapshot with that signal attached.
    pub(crate) fn finish(
        &mut self,
        scores: PerSeat<i32>,
        wins: PerSeat<u32>,
        mut last: PerSeat<ClientView>,
    ) {
        let outcome = PerSeat::from_fn(|seat| outcome_for(&scores, seat));
        for (seat, view) in last.iter_mut() {
            view.outcome = Some(outcome[seat]);
        }
        self.snapshots.push(last);
        self.scores = scores;
        self.wins = wins;
        self.outcome = Some(outcome);
    }

    /// The recap from `viewer`'s side of the table.
    pub fn view_for(&self, viewer: Seat) -> RecapView {
        RecapView {
            lines: self
                .entries
                .iter()
                .map(|e| RecapLine {
                    card: e.card.clone(),
                    mine: e.owner == viewer,
                    result: e.result.clone(),
                })
                .collect(),
            scores: self.scores.relative_to(viewer),
            wins: self.wins.relative_to(viewer),
            snapshots: self.snapshots.iter().map(|s| s[viewer].clone()).collect(),
            outcome: self.outcome(viewer),
        }
    }
}

fn outcome_for(scores: &PerSeat<i32>, seat: Seat) -> RoundOutcome {
    let mine = scores[seat];
    let theirs = scores[seat.other()];
    if mine > theirs {
        RoundOutcome::Win
    } else if mine < theirs {
        RoundOutcome::Lose
    } else {
        RoundOutcome::Tie
    }
}
