use serde::{Deserialize, Serialize};

use crate::protocol::MoveRecord;
use crate::*;

/// Outcome of a move that was carried out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// Survived the trial, the round goes on.
    Survived,
    /// Walked back home after at least one step, the round score is banked.
    ReturnedHome,
    /// Lost the trial, the round score is forfeited.
    Failed,
}

impl MoveOutcome {
    pub const fn ends_round(self) -> bool {
        match self {
            Self::Survived => false,
            Self::ReturnedHome => true,
            Self::Failed => true,
        }
    }

    pub const fn is_success(self) -> bool {
        matches!(self, Self::ReturnedHome)
    }
}

/// Why a move was ignored. None of these change any state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// Target is not exactly one orthogonal step away.
    IllegalMove,
    RoundAlreadyOver,
    OutOfBounds,
}

/// Round-level facts the resolver needs besides the board.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RoundContext {
    pub round: Round,
    /// Moves already made this round.
    pub steps_taken: u32,
    pub is_over: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MoveResolution {
    pub board: Board,
    pub score_delta: Score,
    pub outcome: MoveOutcome,
    pub record: MoveRecord,
}

impl MoveResolution {
    pub const fn round_ended(&self) -> bool {
        self.outcome.ends_round()
    }
}

/// A single orthogonal step, no diagonals and no standing still.
pub const fn is_legal_move(from: Coord2, to: Coord2) -> bool {
    let row_diff = from.0.abs_diff(to.0);
    let col_diff = from.1.abs_diff(to.1);
    matches!((row_diff, col_diff), (1, 0) | (0, 1))
}

/// Points for entering `to`: its distance from home, one less if it was
/// entered in any earlier round, nothing for home itself.
pub fn calculate_move_score(to: Coord2, is_home: bool, history: &History) -> Score {
    if is_home {
        return 0;
    }

    let distance = manhattan(to, center(history.size()));
    let mut score = Score::from(distance);
    if history.was_ever_opened(to) {
        score = score.saturating_sub(1);
    }
    score
}

/// Carries out a move from `from` to `to` on a copy of `board`.
///
/// `draw` supplies the uniform value for the survival trial, it is only
/// called once the move has been accepted.
pub fn resolve_move(
    board: &Board,
    from: Coord2,
    to: Coord2,
    history: &History,
    context: RoundContext,
    draw: impl FnOnce() -> f64,
) -> core::result::Result<MoveResolution, Rejection> {
    if !board.contains(from) || !board.contains(to) {
        return Err(Rejection::OutOfBounds);
    }
    if !is_legal_move(from, to) {
        log::debug!("Illegal move from {:?} to {:?}", from, to);
        return Err(Rejection::IllegalMove);
    }
    if context.is_over {
        log::debug!("Round {} is over, move to {:?} ignored", context.round, to);
        return Err(Rejection::RoundAlreadyOver);
    }

    let mut next = board.clone();
    next[from].player_here = false;

    let target = &mut next[to];
    target.player_here = true;
    let reopened = target.opened;
    target.opened = true;
    target.round_opened = Some(context.round);

    // revisits within the same round still face the trial, they just pay nothing
    let score_delta = if reopened {
        0
    } else {
        calculate_move_score(to, target.is_home, history)
    };

    let probability = target.probability;
    let draw = draw();
    let outcome = if target.is_home {
        if context.steps_taken > 0 {
            target.highlight = Highlight::Success;
            MoveOutcome::ReturnedHome
        } else {
            MoveOutcome::Survived
        }
    } else if draw > probability {
        target.highlight = Highlight::Failure;
        MoveOutcome::Failed
    } else {
        MoveOutcome::Survived
    };

    log::debug!(
        "Round {} step {}: {:?} -> {:?}, p={:.4} draw={:.4} score={} {:?}",
        context.round,
        context.steps_taken + 1,
        from,
        to,
        probability,
        draw,
        score_delta,
        outcome
    );

    Ok(MoveResolution {
        board: next,
        score_delta,
        outcome,
        record: MoveRecord {
            step: context.steps_taken + 1,
            position: to,
            probability,
            score: score_delta,
            draw,
        },
    })
}
