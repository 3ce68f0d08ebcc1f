use super::{game_kind::GameKind, game_status::GameStatus};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub team_id: i64,
    pub kind: GameKind,              // ⇔ game_records.game_kind
    pub status: GameStatus,          // ⇔ game_records.status
    pub payload: Option<String>,     // ⇔ game_records.payload (JSON text)
    pub score: Option<f64>,          // ⇔ game_records.score (only when completed)
    pub started_at: Option<String>,  // ⇔ game_records.started_at
    pub completed_at: Option<String>, // ⇔ game_records.completed_at
}

impl GameRecord {
    pub fn score_str(&self) -> String {
        match self.score {
            Some(s) if s.fract() == 0.0 => format!("{s:.0}"),
            Some(s) => format!("{s:.2}"),
            None => "--".to_string(),
        }
    }
}
