use super::*;

/// Generation strategy that gives every cell the chance of winning a run of
/// coin tosses, with more tosses the closer the cell is to home.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct CoinFlipGenerator;

impl BoardGenerator for CoinFlipGenerator {
    fn generate(self, config: LevelConfig) -> Result<Board> {
        config.validate()?;

        let home = config.home();
        let max_steps = config.max_steps();
        let mut cells: Array2<Cell> = Array2::default(config.size().to_nd_index());

        for ((row, col), cell) in cells.indexed_iter_mut() {
            let coords = (row as Coord, col as Coord);
            if coords == home {
                *cell = Cell::home();
                continue;
            }

            // corners get a single flip, home's neighbors get max_steps
            let flips = max_steps - manhattan(coords, home) + 1;
            let probability = coin_flip_probability(flips.into(), config.coins);
            *cell = Cell::new(probability.max(MIN_PROBABILITY));
        }

        log::debug!(
            "Generated {}x{} board with {} coins, home at {:?}",
            config.rows,
            config.cols,
            config.coins,
            home
        );
        Board::from_cells(cells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(rows: Coord, cols: Coord, coins: u8) -> Board {
        init_game(rows, cols, coins).unwrap()
    }

    #[test]
    fn single_home_at_center() {
        for (rows, cols) in [(1, 1), (3, 5), (11, 11), (13, 13), (21, 21), (15, 9)] {
            let board = board(rows, cols, 2);
            let homes: Vec<_> = board
                .iter_coords()
                .filter(|&coords| board[coords].is_home)
                .collect();

            assert_eq!(homes, vec![(rows / 2, cols / 2)]);
            let home = board.cell_at(homes[0]);
            assert_eq!(home.probability, 1.0);
            assert!(home.player_here);
            assert_eq!(board.player_position(), Some(homes[0]));
        }
    }

    #[test]
    fn closer_cells_are_safer() {
        let board = board(13, 13, 2);
        let home = board.home();

        for a in board.iter_coords().filter(|&c| c != home) {
            for b in board.iter_coords().filter(|&c| c != home) {
                if board.distance_from_home(a) < board.distance_from_home(b) {
                    assert!(board[a].probability >= board[b].probability);
                }
            }
        }
    }

    #[test]
    fn probabilities_follow_flip_count() {
        let board = board(13, 13, 2);

        // neighbor of home: max_steps = 12, distance 1 -> 12 flips
        let expected = coin_flip_probability(12, 2);
        assert!((board[(6, 7)].probability - expected).abs() < 1e-12);

        // corner: a single flip with two coins is a 25% chance
        assert!((board[(0, 0)].probability - 0.25).abs() < 1e-12);
    }

    #[test]
    fn probabilities_are_floored() {
        let board = board(21, 21, 4);

        for coords in board.iter_coords() {
            let p = board[coords].probability;
            assert!(p >= MIN_PROBABILITY);
            assert!(p <= 1.0);
        }
        // a single flip of four coins is 1/16, below the floor
        assert_eq!(board[(0, 0)].probability, MIN_PROBABILITY);
    }

    #[test]
    fn fresh_board_has_nothing_opened() {
        let board = board(11, 11, 3);

        assert!(board.cells().iter().all(|cell| !cell.opened));
        assert!(board.cells().iter().all(|cell| cell.highlight == Highlight::None));
    }
}
