use thiserror::Error;

/// Why a level configuration was refused.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ConfigIssue {
    #[error("board dimensions must be positive")]
    ZeroDimension,
    #[error("board dimensions must be odd so a center cell exists")]
    EvenDimension,
    #[error("at least one coin is required")]
    NoCoins,
    #[error("coin count is too large to produce a usable probability")]
    TooLarge,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] ConfigIssue),
    #[error("Unknown level")]
    UnknownLevel,
    #[error("Board shape does not match history shape")]
    InvalidBoardShape,
}

pub type Result<T> = core::result::Result<T, GameError>;
