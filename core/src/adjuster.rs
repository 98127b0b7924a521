use core::iter;

use hashbrown::HashSet;
use ndarray::Array2;

use crate::*;

/// Number of distinct past rounds that credit each cell with an extra flip.
///
/// A cell is credited by round `r` when it, or one of its orthogonal
/// neighbors, was entered during `r`. The home cell never collects credits.
pub fn flip_credits(board: &Board, history: &History) -> Result<Array2<usize>> {
    if board.size() != history.size() {
        return Err(GameError::InvalidBoardShape);
    }

    let mut credited: Array2<HashSet<usize>> = Array2::default(board.size().to_nd_index());
    for round_index in 0..history.round_count() {
        for coords in board.iter_coords() {
            if !history.record(coords).opened_history[round_index] {
                continue;
            }

            for target in iter::once(coords).chain(board.iter_neighbors(coords)) {
                if board.is_home(target) {
                    continue;
                }
                credited[target.to_nd_index()].insert(round_index);
            }
        }
    }

    Ok(credited.map(|rounds| rounds.len()))
}

/// Survival probability of a cell after `credits` rounds of escalation.
///
/// Credits add flips on top of the cell's base flip count, and the cell's
/// chance is divided by the growth `P(base + credits) / P(base)` those flips
/// would otherwise have bought. Without credits the probability is unchanged
/// apart from clamping.
///
/// The growth is applied as a divisor on purpose: multiplying by it would
/// make visited cells easier, and escalation must only ever make them harder.
pub fn escalated_probability(original: f64, base_flips: u32, credits: u32, coins: u8) -> f64 {
    let base = coin_flip_probability(base_flips, coins);
    let total = coin_flip_probability(base_flips + credits, coins);

    let mut escalated = original;
    if base > 0.0 && base < 1.0 && total > 0.0 {
        escalated = original * (base / total);
    }
    escalated.clamp(MIN_PROBABILITY, 1.0)
}

/// Returns a copy of `board` whose non-home probabilities reflect the visits
/// recorded in `history`. The input board is left untouched.
pub fn update_probabilities_from_past_visits(
    board: &Board,
    history: &History,
    coins: u8,
) -> Result<Board> {
    let credits = flip_credits(board, history)?;
    let max_steps = board.max_steps();
    let mut updated = board.clone();

    for coords in board.iter_coords() {
        if board.is_home(coords) {
            continue;
        }

        let base_flips = max_steps.saturating_sub(board.distance_from_home(coords)).max(1);
        let cell_credits = credits[coords.to_nd_index()] as u32;
        let original = board[coords].probability;
        let escalated = escalated_probability(original, base_flips.into(), cell_credits, coins);

        if cell_credits > 0 {
            log::trace!(
                "Cell {:?} credited {} rounds, probability {:.4} -> {:.4}",
                coords,
                cell_credits,
                original,
                escalated
            );
        }
        updated.cells_mut()[coords.to_nd_index()].probability = escalated;
    }

    Ok(updated)
}
