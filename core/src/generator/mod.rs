use crate::*;
pub use coin_flip::*;

mod coin_flip;

pub trait BoardGenerator {
    fn generate(self, config: LevelConfig) -> Result<Board>;
}

/// Chance that at least one of `flips` throws of `coins` fair coins comes up
/// all heads: `1 - (1 - 0.5^coins)^flips`.
pub fn coin_flip_probability(flips: u32, coins: u8) -> f64 {
    let failure_per_trial = 1.0 - 0.5_f64.powi(coins.into());
    let flips = i32::try_from(flips).unwrap_or(i32::MAX);
    1.0 - failure_per_trial.powi(flips)
}

/// Builds the opening board of a level.
pub fn init_game(rows: Coord, cols: Coord, coins: u8) -> Result<Board> {
    CoinFlipGenerator.generate(LevelConfig::new(rows, cols, coins)?)
}
