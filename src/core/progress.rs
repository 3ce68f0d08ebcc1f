use crate::core::scoring::ScoringEngine;
use crate::core::team::TeamLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{
    ensure_record, find_record, find_team, load_records, mark_completed, mark_started,
    reset_record, update_team_members,
};
use crate::errors::{AppError, AppResult};
use crate::models::{GameKind, GamePayload, GameRecord, GameStatus, TeamRef};
use chrono::Local;
use rusqlite::Connection;

/// Per-team game state machine:
/// not_started → in_progress → completed, and back to not_started only
/// through `admin_reset`.
///
/// Games are independently addressable; nothing here looks at the status of
/// other games of the same team.
pub struct ProgressLogic;

fn load_record(conn: &Connection, team_id: i64, kind: GameKind) -> AppResult<GameRecord> {
    find_record(conn, team_id, kind)?
        .ok_or_else(|| AppError::not_found("game record", format!("{team_id}/{kind}")))
}

impl ProgressLogic {
    /// Enter a game. Re-entering an in-progress or completed game returns the
    /// record untouched.
    pub fn start(pool: &mut DbPool, team_id: i64, kind: GameKind) -> AppResult<GameRecord> {
        let tx = pool.immediate()?;
        TeamLogic::resolve_in(&tx, &TeamRef::Id(team_id))?;

        ensure_record(&tx, team_id, kind)?;
        let now = Local::now().to_rfc3339();
        if mark_started(&tx, team_id, kind, &now)? == 1 {
            ttlog(&tx, "start", &format!("{team_id}/{kind}"), "Game started")?;
        }

        let record = load_record(&tx, team_id, kind)?;
        tx.commit()?;
        Ok(record)
    }

    /// Submit answers for an in-progress game.
    ///
    /// Scoring happens before anything is written: an invalid payload leaves
    /// the record in_progress so the team can correct and resubmit.
    /// A completed tech check also stores the member names on the team.
    pub fn submit(pool: &mut DbPool, team_id: i64, kind: GameKind, raw_payload: &str) -> AppResult<GameRecord> {
        let tx = pool.immediate()?;
        TeamLogic::resolve_in(&tx, &TeamRef::Id(team_id))?;

        let current = load_record(&tx, team_id, kind)?;
        if current.status != GameStatus::InProgress {
            return Err(AppError::InvalidTransition {
                kind: kind.to_string(),
                from: current.status.to_string(),
                action: "submit",
            });
        }

        let (payload, score) = ScoringEngine::evaluate(kind, raw_payload)?;
        let stored = payload.to_json()?;
        let now = Local::now().to_rfc3339();

        if mark_completed(&tx, team_id, kind, &stored, score, &now)? != 1 {
            return Err(AppError::InvalidTransition {
                kind: kind.to_string(),
                from: current.status.to_string(),
                action: "submit",
            });
        }

        if let GamePayload::TechCheck(names) = &payload {
            update_team_members(
                &tx,
                team_id,
                names.parent_name.trim(),
                names.child_name.trim(),
            )?;
        }

        ttlog(
            &tx,
            "submit",
            &format!("{team_id}/{kind}"),
            &format!("Completed with score {score}"),
        )?;

        let record = load_record(&tx, team_id, kind)?;
        tx.commit()?;
        Ok(record)
    }

    /// Force a record back to not_started, whatever its status, clearing
    /// payload, score and timestamps. Administrator only; no session check.
    pub fn admin_reset(pool: &mut DbPool, team_id: i64, kind: GameKind) -> AppResult<GameRecord> {
        let tx = pool.immediate()?;

        find_team(&tx, team_id)?.ok_or_else(|| AppError::not_found("team", team_id))?;
        let before = find_record(&tx, team_id, kind)?;

        ensure_record(&tx, team_id, kind)?;
        reset_record(&tx, team_id, kind)?;

        let from = before.map(|r| r.status).unwrap_or(GameStatus::NotStarted);
        ttlog(
            &tx,
            "reset",
            &format!("{team_id}/{kind}"),
            &format!("Reset from {from}"),
        )?;

        let record = load_record(&tx, team_id, kind)?;
        tx.commit()?;
        Ok(record)
    }

    /// Current record of one game for a team of the active session.
    pub fn get(pool: &DbPool, team_id: i64, kind: GameKind) -> AppResult<GameRecord> {
        TeamLogic::resolve_in(&pool.conn, &TeamRef::Id(team_id))?;
        load_record(&pool.conn, team_id, kind)
    }

    /// Completion checklist for a team of the active session, in
    /// presentation order. Missing records count as not started.
    pub fn progress(pool: &DbPool, team: &TeamRef) -> AppResult<Vec<(GameKind, GameStatus)>> {
        let team = TeamLogic::resolve_in(&pool.conn, team)?;
        let records = load_records(&pool.conn, team.id)?;

        Ok(GameKind::ALL
            .into_iter()
            .map(|kind| {
                let status = records
                    .iter()
                    .find(|r| r.kind == kind)
                    .map(|r| r.status)
                    .unwrap_or(GameStatus::NotStarted);
                (kind, status)
            })
            .collect())
    }
}
