use crate::errors::{AppError, AppResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed set of activities every team plays through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    #[value(name = "tech_check")]
    TechCheck,
    #[value(name = "game1_heights")]
    Game1Heights,
    #[value(name = "game2_perimeter")]
    Game2Perimeter,
    #[value(name = "game3_memory")]
    Game3Memory,
    #[value(name = "game4_clinical")]
    Game4Clinical,
    #[value(name = "feedback")]
    Feedback,
}

impl GameKind {
    /// Presentation order. Not enforced by the engine.
    pub const ALL: [GameKind; 6] = [
        GameKind::TechCheck,
        GameKind::Game1Heights,
        GameKind::Game2Perimeter,
        GameKind::Game3Memory,
        GameKind::Game4Clinical,
        GameKind::Feedback,
    ];

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            GameKind::TechCheck => "tech_check",
            GameKind::Game1Heights => "game1_heights",
            GameKind::Game2Perimeter => "game2_perimeter",
            GameKind::Game3Memory => "game3_memory",
            GameKind::Game4Clinical => "game4_clinical",
            GameKind::Feedback => "feedback",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        GameKind::ALL.into_iter().find(|k| k.to_db_str() == s)
    }

    pub fn parse(s: &str) -> AppResult<Self> {
        Self::from_db_str(&s.trim().to_lowercase())
            .ok_or_else(|| AppError::InvalidGameKind(s.to_string()))
    }

    pub fn label(&self) -> &'static str {
        match self {
            GameKind::TechCheck => "Tech Check",
            GameKind::Game1Heights => "Game 1: Heights",
            GameKind::Game2Perimeter => "Game 2: Perimeter",
            GameKind::Game3Memory => "Game 3: Memory",
            GameKind::Game4Clinical => "Game 4: Clinical Trial",
            GameKind::Feedback => "Feedback",
        }
    }
}

impl fmt::Display for GameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
