use serde::{Deserialize, Serialize};

use crate::*;

/// What the status bar shows about a session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub level_id: String,
    pub size: Coord2,
    pub round: Round,
    pub total_rounds: Round,
    pub state: SessionState,
    pub steps: u32,
    pub round_score: Score,
    pub cumulative_score: Score,
    pub final_score: Option<Score>,
    pub position: Coord2,
    pub last_outcome: Option<MoveOutcome>,
}

impl SessionSummary {
    pub fn from_session(session: &GameSession) -> Self {
        Self {
            level_id: session.level_id().to_owned(),
            size: session.board().size(),
            round: session.round(),
            total_rounds: TOTAL_ROUNDS,
            state: session.state(),
            steps: session.moves().len() as u32,
            round_score: session.round_score(),
            cumulative_score: session.cumulative_score(),
            final_score: session.final_score(),
            position: session.position(),
            last_outcome: session.last_outcome(),
        }
    }

    pub fn rounds_left(&self) -> Round {
        if self.state.is_game_over() {
            0
        } else {
            self.total_rounds.saturating_sub(self.round)
        }
    }
}

impl GameSession {
    pub fn summary(&self) -> SessionSummary {
        SessionSummary::from_session(self)
    }
}
