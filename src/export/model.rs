// src/export/model.rs

use crate::core::scoring::perimeter_delta;
use crate::models::payload::PerimeterPayload;
use crate::models::{GameKind, GameRecord, GameStatus, Team, Treatment};
use serde::Serialize;

/// One flat row per team and game kind.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct ResultExport {
    pub session_id: String,
    pub team_id: i64,
    pub team_name: String,
    pub indication: String,
    pub parent_name: String,
    pub child_name: String,
    pub game_kind: String,
    pub status: String,
    pub score: Option<f64>,
    pub started_at: Option<String>,
    pub completed_at: Option<String>,
    pub payload: Option<String>,
    /// Signed estimate minus ground truth, perimeter rows only.
    pub parent_delta: Option<f64>,
    pub child_delta: Option<f64>,
    pub mean_abs_delta: Option<f64>,
    /// Blind trial arms, clinical trial rows only.
    pub parent_treatment: Option<String>,
    pub child_treatment: Option<String>,
}

impl ResultExport {
    /// A missing record exports as not_started with empty fields.
    pub fn from_parts(team: &Team, kind: GameKind, record: Option<&GameRecord>) -> Self {
        let status = record.map(|r| r.status).unwrap_or(GameStatus::NotStarted);

        let deltas = record
            .filter(|_| kind == GameKind::Game2Perimeter)
            .and_then(|r| r.payload.as_deref())
            .and_then(|raw| serde_json::from_str::<PerimeterPayload>(raw).ok())
            .map(|p| (perimeter_delta(p.parent_estimate), perimeter_delta(p.child_estimate)));

        let arm = |t: Option<Treatment>| {
            t.filter(|_| kind == GameKind::Game4Clinical)
                .map(|t| t.to_db_str().to_string())
        };

        Self {
            session_id: team.session_id.clone(),
            team_id: team.id,
            team_name: team.name.clone(),
            indication: team.indication.clone(),
            parent_name: team.parent_name.clone(),
            child_name: team.child_name.clone(),
            game_kind: kind.to_db_str().to_string(),
            status: status.to_db_str().to_string(),
            score: record.and_then(|r| r.score),
            started_at: record.and_then(|r| r.started_at.clone()),
            completed_at: record.and_then(|r| r.completed_at.clone()),
            payload: record.and_then(|r| r.payload.clone()),
            parent_delta: deltas.map(|d| round2(d.0)),
            child_delta: deltas.map(|d| round2(d.1)),
            mean_abs_delta: deltas.map(|d| round2((d.0.abs() + d.1.abs()) / 2.0)),
            parent_treatment: arm(team.parent_treatment),
            child_treatment: arm(team.child_treatment),
        }
    }
}

/// Header for CSV / XLSX
pub(crate) fn get_headers() -> Vec<&'static str> {
    vec![
        "session_id",
        "team_id",
        "team_name",
        "indication",
        "parent_name",
        "child_name",
        "game_kind",
        "status",
        "score",
        "started_at",
        "completed_at",
        "payload",
        "parent_delta",
        "child_delta",
        "mean_abs_delta",
        "parent_treatment",
        "child_treatment",
    ]
}

pub(crate) fn result_to_row(r: &ResultExport) -> Vec<String> {
    vec![
        r.session_id.clone(),
        r.team_id.to_string(),
        r.team_name.clone(),
        r.indication.clone(),
        r.parent_name.clone(),
        r.child_name.clone(),
        r.game_kind.clone(),
        r.status.clone(),
        opt_num(r.score),
        r.started_at.clone().unwrap_or_default(),
        r.completed_at.clone().unwrap_or_default(),
        r.payload.clone().unwrap_or_default(),
        opt_num(r.parent_delta),
        opt_num(r.child_delta),
        opt_num(r.mean_abs_delta),
        r.parent_treatment.clone().unwrap_or_default(),
        r.child_treatment.clone().unwrap_or_default(),
    ]
}

fn opt_num(v: Option<f64>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
