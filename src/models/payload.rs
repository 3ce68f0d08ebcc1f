//! Answer shapes submitted by teams, one per game kind.
//!
//! Clients send plain JSON objects; the game kind chosen on the command line
//! (or by the calling UI) decides which shape the object must have. Unknown
//! fields are rejected so a payload meant for one game can never be scored as
//! another.

use super::game_kind::GameKind;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TechCheckPayload {
    pub parent_name: String,
    pub child_name: String,
}

/// Heights in cm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HeightsPayload {
    pub parent_height: f64,
    pub child_height: f64,
}

/// Perimeter estimates in metres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerimeterPayload {
    pub parent_estimate: f64,
    pub child_estimate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryAnswer {
    pub round: u32,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryPayload {
    pub answers: Vec<MemoryAnswer>,
}

/// Pain scores (0 = none, 10 = worst) before and after treatment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClinicalPayload {
    pub parent_before: i64,
    pub parent_after: i64,
    pub child_before: i64,
    pub child_after: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedbackPayload {
    pub overall_rating: i64,
    pub favorite_game: String,
    #[serde(default)]
    pub comments: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum GamePayload {
    TechCheck(TechCheckPayload),
    Heights(HeightsPayload),
    Perimeter(PerimeterPayload),
    Memory(MemoryPayload),
    Clinical(ClinicalPayload),
    Feedback(FeedbackPayload),
}

impl GamePayload {
    /// Decode a raw JSON answer as the shape required by `kind`.
    ///
    /// Returns a human-readable reason on failure; the caller maps it to
    /// `AppError::InvalidPayload`.
    pub fn parse(kind: GameKind, raw: &str) -> Result<Self, String> {
        let parsed = match kind {
            GameKind::TechCheck => serde_json::from_str(raw).map(GamePayload::TechCheck),
            GameKind::Game1Heights => serde_json::from_str(raw).map(GamePayload::Heights),
            GameKind::Game2Perimeter => serde_json::from_str(raw).map(GamePayload::Perimeter),
            GameKind::Game3Memory => serde_json::from_str(raw).map(GamePayload::Memory),
            GameKind::Game4Clinical => serde_json::from_str(raw).map(GamePayload::Clinical),
            GameKind::Feedback => serde_json::from_str(raw).map(GamePayload::Feedback),
        };
        parsed.map_err(|e| format!("malformed JSON: {e}"))
    }

    pub fn kind(&self) -> GameKind {
        match self {
            GamePayload::TechCheck(_) => GameKind::TechCheck,
            GamePayload::Heights(_) => GameKind::Game1Heights,
            GamePayload::Perimeter(_) => GameKind::Game2Perimeter,
            GamePayload::Memory(_) => GameKind::Game3Memory,
            GamePayload::Clinical(_) => GameKind::Game4Clinical,
            GamePayload::Feedback(_) => GameKind::Feedback,
        }
    }

    /// Canonical JSON stored in `game_records.payload`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
