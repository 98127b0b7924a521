use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::*;

pub const DEFAULT_LEVEL: &str = "deuce";

/// Named difficulty presets, read-only once a game is running.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelTable {
    pub default: String,
    pub levels: BTreeMap<String, LevelConfig>,
}

impl LevelTable {
    /// The built-in presets: more coins and a larger board per step up.
    pub fn standard() -> Self {
        let levels = [
            ("deuce", LevelConfig::new_unchecked(13, 13, 2)),
            ("trey", LevelConfig::new_unchecked(17, 17, 3)),
            ("quad", LevelConfig::new_unchecked(21, 21, 4)),
        ]
        .into_iter()
        .map(|(id, config)| (id.to_owned(), config))
        .collect();

        Self {
            default: DEFAULT_LEVEL.to_owned(),
            levels,
        }
    }

    pub fn validate(&self) -> Result<()> {
        for config in self.levels.values() {
            config.validate()?;
        }
        self.get(&self.default).map(|_| ())
    }

    pub fn get(&self, id: &str) -> Result<LevelConfig> {
        self.levels.get(id).copied().ok_or(GameError::UnknownLevel)
    }

    pub fn default_level(&self) -> Result<(&str, LevelConfig)> {
        Ok((self.default.as_str(), self.get(&self.default)?))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.levels.keys().map(String::as_str)
    }
}

impl Default for LevelTable {
    fn default() -> Self {
        Self::standard()
    }
}
