use serde::Serialize;
use std::fmt;

/// Progress of one team on one game. Moves forward only, except through an
/// administrator reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl GameStatus {
    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "not_started",
            GameStatus::InProgress => "in_progress",
            GameStatus::Completed => "completed",
        }
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "not_started" => Some(GameStatus::NotStarted),
            "in_progress" => Some(GameStatus::InProgress),
            "completed" => Some(GameStatus::Completed),
            _ => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, GameStatus::Completed)
    }

    pub fn icon(&self) -> &'static str {
        match self {
            GameStatus::NotStarted => "⏳",
            GameStatus::InProgress => "▶️",
            GameStatus::Completed => "✅",
        }
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
