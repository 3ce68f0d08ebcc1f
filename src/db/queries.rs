//! Row-level access to sessions, teams, registration tokens and game records.
//!
//! Every function takes a plain `&Connection`, so it can run either on a bare
//! connection (reads) or inside the immediate transaction of the calling
//! operation (a `Transaction` derefs to `Connection`).

use crate::errors::AppError;
use crate::models::{GameKind, GameRecord, GameStatus, Session, Team, Treatment};
use rusqlite::{Connection, OptionalExtension, Result, Row, params};

fn conversion_error(col: usize, err: AppError) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(col, rusqlite::types::Type::Text, Box::new(err))
}

// ---------------------------
// Sessions
// ---------------------------

pub fn map_session(row: &Row) -> Result<Session> {
    Ok(Session {
        id: row.get("id")?,
        name: row.get("name")?,
        label: row.get("label")?,
        is_active: row.get::<_, i32>("is_active")? == 1,
        created_at: row.get("created_at")?,
    })
}

pub fn load_sessions(conn: &Connection) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare("SELECT * FROM sessions ORDER BY created_at ASC, id ASC")?;
    let rows = stmt.query_map([], map_session)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn find_session(conn: &Connection, id: &str) -> Result<Option<Session>> {
    conn.query_row("SELECT * FROM sessions WHERE id = ?1", [id], map_session)
        .optional()
}

pub fn find_session_by_name(conn: &Connection, name: &str) -> Result<Option<Session>> {
    conn.query_row("SELECT * FROM sessions WHERE name = ?1", [name], map_session)
        .optional()
}

pub fn load_active_sessions(conn: &Connection) -> Result<Vec<Session>> {
    let mut stmt = conn.prepare("SELECT * FROM sessions WHERE is_active = 1")?;
    let rows = stmt.query_map([], map_session)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

pub fn insert_session(conn: &Connection, s: &Session) -> Result<()> {
    conn.execute(
        "INSERT INTO sessions (id, name, label, is_active, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            s.id,
            s.name,
            s.label,
            if s.is_active { 1 } else { 0 },
            s.created_at
        ],
    )?;
    Ok(())
}

/// Clear the flag everywhere except `keep_id`. Returns rows changed.
pub fn deactivate_sessions_except(conn: &Connection, keep_id: &str) -> Result<usize> {
    conn.execute(
        "UPDATE sessions SET is_active = 0 WHERE is_active = 1 AND id <> ?1",
        [keep_id],
    )
}

pub fn activate_session(conn: &Connection, id: &str) -> Result<usize> {
    conn.execute("UPDATE sessions SET is_active = 1 WHERE id = ?1", [id])
}

// ---------------------------
// Teams
// ---------------------------

fn treatment_column(row: &Row, col: &str) -> Result<Option<Treatment>> {
    let raw: Option<String> = row.get(col)?;
    Ok(raw.as_deref().and_then(Treatment::from_db_str))
}

pub fn map_team(row: &Row) -> Result<Team> {
    Ok(Team {
        id: row.get("id")?,
        session_id: row.get("session_id")?,
        name: row.get("name")?,
        indication: row.get("indication")?,
        parent_name: row.get("parent_name")?,
        child_name: row.get("child_name")?,
        registration_token: row.get("registration_token")?,
        registered_at: row.get("registered_at")?,
        parent_treatment: treatment_column(row, "parent_treatment")?,
        child_treatment: treatment_column(row, "child_treatment")?,
    })
}

pub fn find_team(conn: &Connection, id: i64) -> Result<Option<Team>> {
    conn.query_row("SELECT * FROM teams WHERE id = ?1", [id], map_team)
        .optional()
}

pub fn find_team_in_session(conn: &Connection, session_id: &str, name: &str) -> Result<Option<Team>> {
    conn.query_row(
        "SELECT * FROM teams WHERE session_id = ?1 AND name = ?2",
        params![session_id, name],
        map_team,
    )
    .optional()
}

/// Most recent team with this name in any session.
pub fn find_team_by_name_any_session(conn: &Connection, name: &str) -> Result<Option<Team>> {
    conn.query_row(
        "SELECT * FROM teams WHERE name = ?1 ORDER BY id DESC LIMIT 1",
        [name],
        map_team,
    )
    .optional()
}

pub fn load_teams(conn: &Connection, session_id: &str) -> Result<Vec<Team>> {
    let mut stmt = conn.prepare("SELECT * FROM teams WHERE session_id = ?1 ORDER BY name ASC")?;
    let rows = stmt.query_map([session_id], map_team)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Insert a team and return its new id.
pub fn insert_team(conn: &Connection, t: &Team) -> Result<i64> {
    conn.execute(
        "INSERT INTO teams (session_id, name, indication, parent_name, child_name,
                            registration_token, registered_at,
                            parent_treatment, child_treatment)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            t.session_id,
            t.name,
            t.indication,
            t.parent_name,
            t.child_name,
            t.registration_token,
            t.registered_at,
            t.parent_treatment.map(|x| x.to_db_str()),
            t.child_treatment.map(|x| x.to_db_str()),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Teams of a session per parent arm: (placebo, molecule).
pub fn count_parent_arms(conn: &Connection, session_id: &str) -> Result<(usize, usize)> {
    conn.query_row(
        "SELECT COALESCE(SUM(parent_treatment = 'placebo'), 0),
                COALESCE(SUM(parent_treatment = 'molecule'), 0)
         FROM teams WHERE session_id = ?1",
        [session_id],
        |row| Ok((row.get::<_, i64>(0)? as usize, row.get::<_, i64>(1)? as usize)),
    )
}

/// Member names captured by the tech check.
pub fn update_team_members(conn: &Connection, team_id: i64, parent_name: &str, child_name: &str) -> Result<usize> {
    conn.execute(
        "UPDATE teams SET parent_name = ?2, child_name = ?3 WHERE id = ?1",
        params![team_id, parent_name, child_name],
    )
}

/// Delete every team of a session together with its game records.
/// Returns (teams, records) removed.
pub fn delete_session_teams(conn: &Connection, session_id: &str) -> Result<(usize, usize)> {
    let records = conn.execute(
        "DELETE FROM game_records
         WHERE team_id IN (SELECT id FROM teams WHERE session_id = ?1)",
        [session_id],
    )?;
    // consumed tokens become usable again for the next workshop run
    conn.execute(
        "UPDATE registration_tokens SET team_id = NULL WHERE session_id = ?1",
        [session_id],
    )?;
    let teams = conn.execute("DELETE FROM teams WHERE session_id = ?1", [session_id])?;
    Ok((teams, records))
}

// ---------------------------
// Registration tokens
// ---------------------------

#[derive(Debug, Clone)]
pub struct TokenRow {
    pub token: String,
    pub session_id: String,
    pub team_name: String,
    pub indication: String,
    pub team_id: Option<i64>,
}

fn map_token(row: &Row) -> Result<TokenRow> {
    Ok(TokenRow {
        token: row.get("token")?,
        session_id: row.get("session_id")?,
        team_name: row.get("team_name")?,
        indication: row.get("indication")?,
        team_id: row.get("team_id")?,
    })
}

pub fn find_token(conn: &Connection, token: &str) -> Result<Option<TokenRow>> {
    conn.query_row(
        "SELECT * FROM registration_tokens WHERE token = ?1",
        [token],
        map_token,
    )
    .optional()
}

pub fn find_token_for_team(conn: &Connection, session_id: &str, team_name: &str) -> Result<Option<TokenRow>> {
    conn.query_row(
        "SELECT * FROM registration_tokens WHERE session_id = ?1 AND team_name = ?2",
        params![session_id, team_name],
        map_token,
    )
    .optional()
}

pub fn insert_token(conn: &Connection, t: &TokenRow, created_at: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO registration_tokens (token, session_id, team_name, indication, team_id, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![t.token, t.session_id, t.team_name, t.indication, t.team_id, created_at],
    )?;
    Ok(())
}

/// Mark a token as consumed, only if nobody consumed it first.
pub fn consume_token(conn: &Connection, token: &str, team_id: i64) -> Result<usize> {
    conn.execute(
        "UPDATE registration_tokens SET team_id = ?1 WHERE token = ?2 AND team_id IS NULL",
        params![team_id, token],
    )
}

// ---------------------------
// Game records
// ---------------------------

pub fn map_record(row: &Row) -> Result<GameRecord> {
    let kind_str: String = row.get("game_kind")?;
    let kind = GameKind::from_db_str(&kind_str)
        .ok_or_else(|| conversion_error(1, AppError::InvalidGameKind(kind_str.clone())))?;

    let status_str: String = row.get("status")?;
    let status = GameStatus::from_db_str(&status_str).ok_or_else(|| {
        conversion_error(
            2,
            AppError::Migration(format!("Invalid game status in database: {status_str}")),
        )
    })?;

    Ok(GameRecord {
        team_id: row.get("team_id")?,
        kind,
        status,
        payload: row.get("payload")?,
        score: row.get("score")?,
        started_at: row.get("started_at")?,
        completed_at: row.get("completed_at")?,
    })
}

/// Create the not_started row if missing; never duplicates.
pub fn ensure_record(conn: &Connection, team_id: i64, kind: GameKind) -> Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT OR IGNORE INTO game_records (team_id, game_kind, status)
         VALUES (?1, ?2, 'not_started')",
    )?;
    stmt.execute(params![team_id, kind.to_db_str()])?;
    Ok(())
}

pub fn find_record(conn: &Connection, team_id: i64, kind: GameKind) -> Result<Option<GameRecord>> {
    conn.query_row(
        "SELECT * FROM game_records WHERE team_id = ?1 AND game_kind = ?2",
        params![team_id, kind.to_db_str()],
        map_record,
    )
    .optional()
}

/// Records of one team, in presentation order.
pub fn load_records(conn: &Connection, team_id: i64) -> Result<Vec<GameRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM game_records WHERE team_id = ?1")?;
    let rows = stmt.query_map([team_id], map_record)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    out.sort_by_key(|r| GameKind::ALL.iter().position(|k| *k == r.kind));
    Ok(out)
}

/// Completed records of one kind across a session (rescoring input).
pub fn load_completed_records(conn: &Connection, session_id: &str, kind: GameKind) -> Result<Vec<GameRecord>> {
    let mut stmt = conn.prepare(
        "SELECT r.* FROM game_records r
         JOIN teams t ON t.id = r.team_id
         WHERE t.session_id = ?1 AND r.game_kind = ?2 AND r.status = 'completed'
         ORDER BY r.team_id ASC",
    )?;
    let rows = stmt.query_map(params![session_id, kind.to_db_str()], map_record)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// not_started → in_progress. Zero rows changed means the status moved on.
pub fn mark_started(conn: &Connection, team_id: i64, kind: GameKind, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE game_records
         SET status = 'in_progress', started_at = ?3
         WHERE team_id = ?1 AND game_kind = ?2 AND status = 'not_started'",
        params![team_id, kind.to_db_str(), now],
    )
}

/// in_progress → completed, storing payload and score in the same row write.
pub fn mark_completed(
    conn: &Connection,
    team_id: i64,
    kind: GameKind,
    payload: &str,
    score: f64,
    now: &str,
) -> Result<usize> {
    conn.execute(
        "UPDATE game_records
         SET status = 'completed', payload = ?3, score = ?4, completed_at = ?5
         WHERE team_id = ?1 AND game_kind = ?2 AND status = 'in_progress'",
        params![team_id, kind.to_db_str(), payload, score, now],
    )
}

/// Any status → not_started, wiping everything the team submitted.
pub fn reset_record(conn: &Connection, team_id: i64, kind: GameKind) -> Result<usize> {
    conn.execute(
        "UPDATE game_records
         SET status = 'not_started', payload = NULL, score = NULL,
             started_at = NULL, completed_at = NULL, rescored_at = NULL
         WHERE team_id = ?1 AND game_kind = ?2",
        params![team_id, kind.to_db_str()],
    )
}

pub fn update_score(conn: &Connection, team_id: i64, kind: GameKind, score: f64, now: &str) -> Result<usize> {
    conn.execute(
        "UPDATE game_records SET score = ?3, rescored_at = ?4
         WHERE team_id = ?1 AND game_kind = ?2 AND status = 'completed'",
        params![team_id, kind.to_db_str(), score, now],
    )
}
