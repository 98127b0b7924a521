use serde::{Deserialize, Serialize};

use crate::Round;

/// Marker left on the cell where a round ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Highlight {
    None,
    Success,
    Failure,
}

impl Default for Highlight {
    fn default() -> Self {
        Self::None
    }
}

/// State of one board position during the round being played.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Entered at least once this round.
    pub opened: bool,
    /// Round in which the cell was last entered.
    pub round_opened: Option<Round>,
    pub probability: f64,
    pub is_home: bool,
    pub player_here: bool,
    pub highlight: Highlight,
}

impl Cell {
    pub const fn new(probability: f64) -> Self {
        Self {
            opened: false,
            round_opened: None,
            probability,
            is_home: false,
            player_here: false,
            highlight: Highlight::None,
        }
    }

    pub const fn home() -> Self {
        Self {
            opened: false,
            round_opened: None,
            probability: 1.0,
            is_home: true,
            player_here: true,
            highlight: Highlight::None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::new(0.5)
    }
}
