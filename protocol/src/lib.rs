//! Payloads handed from the game core to the reporting collaborator.
//!
//! These types are plain data: the core builds them at round and game
//! boundaries and a [`ReportSink`] takes ownership. Nothing in here talks to
//! the network.

use serde::{Deserialize, Serialize};

/// Slot number used for the end-of-game payload, one past the last round.
pub const GAME_REPORT_SLOT: u32 = 8;

/// One step taken during a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// 1-based step counter within the round.
    pub step: u32,
    /// Destination `(row, col)`.
    pub position: (u8, u8),
    /// Survival probability of the destination when it was entered.
    pub probability: f64,
    /// Points earned by this step, zero for revisits and home.
    pub score: u32,
    /// Uniform draw in `[0, 1)` compared against `probability`.
    pub draw: f64,
}

/// A finished round as kept in the game's archive.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArchivedRound {
    pub round_number: u32,
    pub moves: Vec<MoveRecord>,
    pub final_score: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDimensions {
    pub rows: u8,
    pub cols: u8,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub round_number: u32,
    pub final_score: u32,
    pub moves: Vec<MoveRecord>,
    pub board: BoardDimensions,
    pub level_id: String,
    pub success: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameReport {
    pub total_score: u32,
    pub rounds: Vec<ArchivedRound>,
    pub level_id: String,
    pub completed: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportPayload {
    Round(RoundReport),
    Game(GameReport),
}

impl ReportPayload {
    /// Round number the payload is filed under; the game summary uses
    /// [`GAME_REPORT_SLOT`].
    pub fn slot(&self) -> u32 {
        match self {
            Self::Round(report) => report.round_number,
            Self::Game(_) => GAME_REPORT_SLOT,
        }
    }

    pub fn level_id(&self) -> &str {
        match self {
            Self::Round(report) => &report.level_id,
            Self::Game(report) => &report.level_id,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Receives payloads from the core.
///
/// Submission is fire-and-forget: implementations own delivery, retry and
/// buffering, and must never push a failure back into the game.
pub trait ReportSink {
    fn submit(&mut self, payload: ReportPayload);
}

/// Sink that drops everything, for games played without reporting.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct NullSink;

impl ReportSink for NullSink {
    fn submit(&mut self, _payload: ReportPayload) {}
}

/// Sink that keeps every payload in memory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemorySink {
    pub payloads: Vec<ReportPayload>,
}

impl ReportSink for MemorySink {
    fn submit(&mut self, payload: ReportPayload) {
        self.payloads.push(payload);
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn submit(&mut self, payload: ReportPayload) {
        (**self).submit(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_report(round_number: u32) -> RoundReport {
        RoundReport {
            round_number,
            final_score: 5,
            moves: vec![MoveRecord {
                step: 1,
                position: (6, 7),
                probability: 0.9,
                score: 1,
                draw: 0.25,
            }],
            board: BoardDimensions { rows: 13, cols: 13 },
            level_id: "deuce".into(),
            success: true,
        }
    }

    #[test]
    fn payload_is_tagged_by_kind() {
        let json = ReportPayload::Round(round_report(3)).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["kind"], "round");
        assert_eq!(value["round_number"], 3);
        assert_eq!(value["board"]["rows"], 13);
    }

    #[test]
    fn game_payload_uses_reserved_slot() {
        let payload = ReportPayload::Game(GameReport {
            total_score: 12,
            rounds: Vec::new(),
            level_id: "trey".into(),
            completed: true,
        });

        assert_eq!(payload.slot(), GAME_REPORT_SLOT);
        assert_eq!(payload.level_id(), "trey");
        assert_eq!(ReportPayload::Round(round_report(4)).slot(), 4);
    }

    #[test]
    fn memory_sink_keeps_submission_order() {
        let mut memory = MemorySink::default();
        memory.submit(ReportPayload::Round(round_report(1)));
        memory.submit(ReportPayload::Round(round_report(2)));
        let slots: Vec<_> = memory.payloads.iter().map(ReportPayload::slot).collect();
        assert_eq!(slots, vec![1, 2]);
    }
}
