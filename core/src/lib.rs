use core::ops::{Index, IndexMut};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use adjuster::*;
pub use cell::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use history::*;
pub use levels::*;
pub use moves::*;
pub use summary::*;
pub use types::*;

pub use gotham_protocol as protocol;

mod adjuster;
mod cell;
mod engine;
mod error;
mod generator;
mod history;
mod levels;
mod moves;
mod summary;
mod types;

/// Rounds played before the game is scored.
pub const TOTAL_ROUNDS: Round = 7;

/// Lowest survival probability any non-home cell can have.
pub const MIN_PROBABILITY: f64 = 0.1;

/// Coin counts above this make every cell sit on the probability floor.
pub const MAX_COINS: u8 = 32;

/// Board shape and difficulty of one level.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawLevelConfig")]
pub struct LevelConfig {
    pub rows: Coord,
    pub cols: Coord,
    pub coins: u8,
}

#[derive(Deserialize)]
struct RawLevelConfig {
    rows: Coord,
    cols: Coord,
    #[serde(alias = "num_coins")]
    coins: u8,
}

impl TryFrom<RawLevelConfig> for LevelConfig {
    type Error = GameError;

    fn try_from(raw: RawLevelConfig) -> Result<Self> {
        Self::new(raw.rows, raw.cols, raw.coins)
    }
}

impl LevelConfig {
    pub const fn new_unchecked(rows: Coord, cols: Coord, coins: u8) -> Self {
        Self { rows, cols, coins }
    }

    pub fn new(rows: Coord, cols: Coord, coins: u8) -> Result<Self> {
        let config = Self::new_unchecked(rows, cols, coins);
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.rows == 0 || self.cols == 0 {
            return Err(ConfigIssue::ZeroDimension.into());
        }
        if self.rows % 2 == 0 || self.cols % 2 == 0 {
            return Err(ConfigIssue::EvenDimension.into());
        }
        if self.coins == 0 {
            return Err(ConfigIssue::NoCoins.into());
        }
        if self.coins > MAX_COINS {
            return Err(ConfigIssue::TooLarge.into());
        }
        Ok(())
    }

    pub const fn size(&self) -> Coord2 {
        (self.rows, self.cols)
    }

    pub const fn home(&self) -> Coord2 {
        center(self.size())
    }

    /// Largest Manhattan distance from home, reached in the corners.
    pub const fn max_steps(&self) -> u16 {
        let (row, col) = self.home();
        row as u16 + col as u16
    }
}

/// Geometric center of a board of `size`.
pub const fn center((rows, cols): Coord2) -> Coord2 {
    (rows / 2, cols / 2)
}

/// Grid of current-round cells with the home cell at its center.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    home: Coord2,
}

impl Board {
    /// Wraps a grid whose center cell is the home cell.
    pub(crate) fn from_cells(cells: Array2<Cell>) -> Result<Self> {
        let dim = cells.dim();
        let rows: Coord = dim.0.try_into().map_err(|_| GameError::InvalidBoardShape)?;
        let cols: Coord = dim.1.try_into().map_err(|_| GameError::InvalidBoardShape)?;
        let home = center((rows, cols));
        if !cells[home.to_nd_index()].is_home {
            return Err(GameError::InvalidBoardShape);
        }
        Ok(Self { cells, home })
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn rows(&self) -> Coord {
        self.size().0
    }

    pub fn cols(&self) -> Coord {
        self.size().1
    }

    pub fn home(&self) -> Coord2 {
        self.home
    }

    pub fn max_steps(&self) -> u16 {
        self.home.0 as u16 + self.home.1 as u16
    }

    pub fn distance_from_home(&self, coords: Coord2) -> u16 {
        manhattan(coords, self.home)
    }

    pub fn contains(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self[coords]
    }

    pub fn is_home(&self, coords: Coord2) -> bool {
        coords == self.home
    }

    /// Where the player marker currently is, if anywhere.
    pub fn player_position(&self) -> Option<Coord2> {
        self.iter_coords().find(|&coords| self[coords].player_here)
    }

    /// All positions in row-major order.
    pub fn iter_coords(&self) -> impl Iterator<Item = Coord2> + use<> {
        let (rows, cols) = self.size();
        (0..rows).flat_map(move |row| (0..cols).map(move |col| (row, col)))
    }

    pub fn iter_neighbors(&self, coords: Coord2) -> NeighborIter {
        self.cells.iter_neighbors(coords)
    }

    pub fn cells(&self) -> &Array2<Cell> {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut Array2<Cell> {
        &mut self.cells
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, (row, col): Coord2) -> &Self::Output {
        &self.cells[(row as usize, col as usize)]
    }
}

impl IndexMut<Coord2> for Board {
    fn index_mut(&mut self, (row, col): Coord2) -> &mut Self::Output {
        &mut self.cells[(row as usize, col as usize)]
    }
}
