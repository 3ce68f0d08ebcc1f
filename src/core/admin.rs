use crate::core::progress::ProgressLogic;
use crate::core::scoring::ScoringEngine;
use crate::core::session::{ClearReport, SessionLogic};
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{load_active_sessions, load_completed_records, load_records, load_teams, update_score};
use crate::errors::{AppError, AppResult};
use crate::export::ResultExport;
use crate::models::{GameKind, GamePayload, GameRecord, GameStatus, Session, Team};
use chrono::Local;

/// Proof that the caller presented the shared administrator secret.
///
/// Only obtainable through [`AdminAuth::check`]; every administrative
/// mutation takes one.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth {
    _private: (),
}

impl AdminAuth {
    pub fn check(expected: &str, given: &str) -> AppResult<Self> {
        if expected.is_empty() || expected != given {
            return Err(AppError::Unauthorized);
        }
        Ok(Self { _private: () })
    }
}

/// Per game kind participation counts for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct GameOverview {
    pub kind: GameKind,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub mean_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RescoreReport {
    pub checked: usize,
    pub updated: usize,
    pub unreadable: usize,
}

/// Result of the store integrity check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActiveSessionCheck {
    Ok(String),
    NoneActive,
    SeveralActive(Vec<String>),
}

/// Administrator read path and the mutations that bypass team-facing
/// preconditions.
pub struct AdminLogic;

impl AdminLogic {
    // ---------------------------
    // Read path
    // ---------------------------

    pub fn list_teams(pool: &DbPool, session_id: &str) -> AppResult<Vec<Team>> {
        SessionLogic::get(pool, session_id)?;
        Ok(load_teams(&pool.conn, session_id)?)
    }

    pub fn list_game_records(pool: &DbPool, team_id: i64) -> AppResult<Vec<GameRecord>> {
        crate::core::team::TeamLogic::get(pool, team_id)?;
        Ok(load_records(&pool.conn, team_id)?)
    }

    /// Every team × every game kind of a session, completed or not.
    ///
    /// Rows without a stored record (never created) are still emitted as
    /// not_started, so the export always has six rows per team.
    pub fn export_results(pool: &DbPool, session_id: &str) -> AppResult<Vec<ResultExport>> {
        let teams = Self::list_teams(pool, session_id)?;
        let mut rows = Vec::with_capacity(teams.len() * GameKind::ALL.len());

        for team in &teams {
            let records = load_records(&pool.conn, team.id)?;
            for kind in GameKind::ALL {
                let record = records.iter().find(|r| r.kind == kind);
                rows.push(ResultExport::from_parts(team, kind, record));
            }
        }

        Ok(rows)
    }

    pub fn session_overview(pool: &DbPool, session_id: &str) -> AppResult<Vec<GameOverview>> {
        let teams = Self::list_teams(pool, session_id)?;

        let mut overview: Vec<GameOverview> = GameKind::ALL
            .into_iter()
            .map(|kind| GameOverview {
                kind,
                not_started: 0,
                in_progress: 0,
                completed: 0,
                mean_score: None,
            })
            .collect();
        let mut sums = [0.0f64; GameKind::ALL.len()];

        for team in &teams {
            let records = load_records(&pool.conn, team.id)?;
            for (idx, kind) in GameKind::ALL.into_iter().enumerate() {
                let status = records
                    .iter()
                    .find(|r| r.kind == kind)
                    .map(|r| (r.status, r.score));
                let entry = &mut overview[idx];
                match status {
                    Some((GameStatus::Completed, score)) => {
                        entry.completed += 1;
                        sums[idx] += score.unwrap_or(0.0);
                    }
                    Some((GameStatus::InProgress, _)) => entry.in_progress += 1,
                    _ => entry.not_started += 1,
                }
            }
        }

        for (idx, entry) in overview.iter_mut().enumerate() {
            if entry.completed > 0 {
                entry.mean_score = Some(sums[idx] / entry.completed as f64);
            }
        }

        Ok(overview)
    }

    /// Count the rows flagged active. Anything but exactly one is reported.
    pub fn check_active_session(pool: &DbPool) -> AppResult<ActiveSessionCheck> {
        let active = load_active_sessions(&pool.conn)?;
        Ok(match active.len() {
            0 => ActiveSessionCheck::NoneActive,
            1 => ActiveSessionCheck::Ok(active[0].id.clone()),
            _ => ActiveSessionCheck::SeveralActive(active.into_iter().map(|s| s.id).collect()),
        })
    }

    // ---------------------------
    // Mutations
    // ---------------------------

    pub fn switch_active_session(pool: &mut DbPool, _auth: &AdminAuth, target_id: &str) -> AppResult<Session> {
        SessionLogic::switch_active(pool, target_id)
    }

    pub fn clear_session_data(pool: &mut DbPool, _auth: &AdminAuth, session_id: &str) -> AppResult<ClearReport> {
        SessionLogic::clear_data(pool, session_id)
    }

    pub fn reset_game(pool: &mut DbPool, _auth: &AdminAuth, team_id: i64, kind: GameKind) -> AppResult<GameRecord> {
        ProgressLogic::admin_reset(pool, team_id, kind)
    }

    /// Recompute stored scores of completed records from their stored
    /// payloads, e.g. after the memory answer key changed.
    pub fn rescore(pool: &mut DbPool, _auth: &AdminAuth, session_id: &str, kind: GameKind) -> AppResult<RescoreReport> {
        let tx = pool.immediate()?;
        SessionLogic::get_in(&tx, session_id)?;

        let mut report = RescoreReport::default();
        let now = Local::now().to_rfc3339();

        for record in load_completed_records(&tx, session_id, kind)? {
            report.checked += 1;

            let rescored = record
                .payload
                .as_deref()
                .ok_or_else(|| "missing payload".to_string())
                .and_then(|raw| GamePayload::parse(kind, raw))
                .and_then(|p| ScoringEngine::score(&p));

            match rescored {
                Ok(score) if Some(score) != record.score => {
                    update_score(&tx, record.team_id, kind, score, &now)?;
                    report.updated += 1;
                }
                Ok(_) => {}
                Err(_) => report.unreadable += 1,
            }
        }

        ttlog(
            &tx,
            "rescore",
            &format!("{session_id}/{kind}"),
            &format!(
                "Checked {}, updated {}, unreadable {}",
                report.checked, report.updated, report.unreadable
            ),
        )?;
        tx.commit()?;

        Ok(report)
    }
}
