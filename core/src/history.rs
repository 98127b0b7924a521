use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Everything one board position looked like at the end of each past round.
///
/// The vectors are parallel, index `n` holds the state at the end of the
/// `n`-th recorded round.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PastCellRecord {
    pub opened_history: Vec<bool>,
    pub round_history: Vec<Option<Round>>,
    pub probability_history: Vec<f64>,
    pub place_history: Vec<bool>,
    pub highlight_history: Vec<Highlight>,
    pub is_home: bool,
}

impl PastCellRecord {
    fn new(is_home: bool) -> Self {
        Self {
            is_home,
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.opened_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opened_history.is_empty()
    }

    /// All parallel vectors have the same length.
    pub fn is_consistent(&self) -> bool {
        let len = self.len();
        self.round_history.len() == len
            && self.probability_history.len() == len
            && self.place_history.len() == len
            && self.highlight_history.len() == len
    }

    pub fn was_ever_opened(&self) -> bool {
        self.opened_history.iter().any(|&opened| opened)
    }

    fn push(&mut self, cell: &Cell) {
        self.opened_history.push(cell.opened);
        self.round_history.push(cell.round_opened);
        self.probability_history.push(cell.probability);
        self.place_history.push(cell.player_here);
        self.highlight_history.push(cell.highlight);
    }
}

/// Marker for a past round in which a cell was entered.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub round: Round,
    pub highlight: Highlight,
    pub player_ended_here: bool,
}

/// Append-only log of end-of-round board snapshots.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct History {
    cells: Array2<PastCellRecord>,
    rounds: Vec<Round>,
}

impl History {
    /// Empty history for a board of `size`, home at its center.
    pub fn init_empty(size: Coord2) -> Self {
        let home = center(size);
        let cells = Array2::from_shape_fn(size.to_nd_index(), |(row, col)| {
            PastCellRecord::new((row as Coord, col as Coord) == home)
        });
        Self {
            cells,
            rounds: Vec::new(),
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    /// Number of snapshots recorded so far.
    pub fn round_count(&self) -> usize {
        self.rounds.len()
    }

    /// Round numbers of the recorded snapshots, oldest first.
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn record(&self, coords: Coord2) -> &PastCellRecord {
        &self.cells[coords.to_nd_index()]
    }

    pub fn was_ever_opened(&self, coords: Coord2) -> bool {
        self.record(coords).was_ever_opened()
    }

    /// Pushes the state of every cell of `board` as the snapshot of `round`.
    pub fn append_round_snapshot(&mut self, board: &Board, round: Round) -> Result<()> {
        if board.size() != self.size() {
            return Err(GameError::InvalidBoardShape);
        }

        for (record, cell) in self.cells.iter_mut().zip(board.cells().iter()) {
            record.push(cell);
        }
        self.rounds.push(round);

        debug_assert!(self.is_consistent());
        log::debug!(
            "Recorded snapshot of round {}, {} snapshots total",
            round,
            self.rounds.len()
        );
        Ok(())
    }

    /// Every record holds exactly one entry per recorded round.
    pub fn is_consistent(&self) -> bool {
        let rounds = self.rounds.len();
        self.cells
            .iter()
            .all(|record| record.is_consistent() && record.len() == rounds)
    }

    /// Past rounds in which the cell at `coords` was entered, oldest first.
    pub fn rings(&self, coords: Coord2) -> impl Iterator<Item = Ring> + '_ {
        let record = self.record(coords);
        self.rounds
            .iter()
            .enumerate()
            .filter(|&(index, _)| record.opened_history[index])
            .map(|(index, &round)| Ring {
                round,
                highlight: record.highlight_history[index],
                player_ended_here: record.place_history[index],
            })
    }
}
