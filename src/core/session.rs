use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{
    activate_session, deactivate_sessions_except, delete_session_teams, find_session,
    find_session_by_name, insert_session, load_active_sessions, load_sessions,
};
use crate::errors::{AppError, AppResult};
use crate::models::Session;
use crate::models::session::{DEFAULT_ACTIVE, DEFAULT_SESSIONS};
use chrono::Local;
use rusqlite::Connection;

/// Result of clearing a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearReport {
    pub teams: usize,
    pub records: usize,
}

/// Session lifecycle and the global active-session switch.
pub struct SessionLogic;

impl SessionLogic {
    /// Insert a new, inactive session. Fails if the name is already taken.
    pub fn create(pool: &mut DbPool, name: &str, label: &str) -> AppResult<Session> {
        // "morning" and "morning_session" name the same session
        let name = name.trim().to_lowercase();
        let name = name.strip_suffix("_session").unwrap_or(&name).to_string();
        if name.is_empty() {
            return Err(AppError::InvalidName("session name must not be empty".into()));
        }

        let tx = pool.immediate()?;
        let session = Self::create_in(&tx, &name, label)?;
        ttlog(&tx, "session_create", &session.id, &format!("Created session '{}'", session.label))?;
        tx.commit()?;

        Ok(session)
    }

    fn create_in(conn: &Connection, name: &str, label: &str) -> AppResult<Session> {
        let id = Session::id_for(name);
        if find_session_by_name(conn, name)?.is_some() || find_session(conn, &id)?.is_some() {
            return Err(AppError::AlreadyExists {
                entity: "session",
                key: name.to_string(),
            });
        }

        let session = Session {
            id,
            name: name.to_string(),
            label: if label.trim().is_empty() {
                name.to_string()
            } else {
                label.trim().to_string()
            },
            is_active: false,
            created_at: Local::now().to_rfc3339(),
        };
        insert_session(conn, &session)?;
        Ok(session)
    }

    /// Create the default sessions, skipping the ones already present, and
    /// activate the test session when nothing is active yet.
    ///
    /// Safe to re-run. Returns the sessions created by this call.
    pub fn bootstrap(pool: &mut DbPool) -> AppResult<Vec<Session>> {
        let tx = pool.immediate()?;
        let mut created = Vec::new();

        for (name, label) in DEFAULT_SESSIONS {
            if find_session_by_name(&tx, name)?.is_some() {
                continue;
            }
            created.push(Self::create_in(&tx, name, label)?);
        }

        if load_active_sessions(&tx)?.is_empty() {
            activate_session(&tx, DEFAULT_ACTIVE)?;
            ttlog(&tx, "session_switch", DEFAULT_ACTIVE, "Activated default session")?;
        }

        if !created.is_empty() {
            let names: Vec<&str> = created.iter().map(|s| s.id.as_str()).collect();
            ttlog(&tx, "init", "sessions", &format!("Created {}", names.join(", ")))?;
        }

        tx.commit()?;
        Ok(created)
    }

    pub fn list(pool: &DbPool) -> AppResult<Vec<Session>> {
        Ok(load_sessions(&pool.conn)?)
    }

    pub fn get(pool: &DbPool, id: &str) -> AppResult<Session> {
        Self::get_in(&pool.conn, id)
    }

    pub(crate) fn get_in(conn: &Connection, id: &str) -> AppResult<Session> {
        find_session(conn, id)?.ok_or_else(|| AppError::not_found("session", id))
    }

    /// The one session marked active.
    ///
    /// Zero or several active rows are an integrity breach and are reported,
    /// never resolved by picking one.
    pub fn active(pool: &DbPool) -> AppResult<Session> {
        Self::active_in(&pool.conn)
    }

    pub(crate) fn active_in(conn: &Connection) -> AppResult<Session> {
        let mut active = load_active_sessions(conn)?;
        if active.len() != 1 {
            return Err(AppError::NoActiveSession(active.len()));
        }
        Ok(active.remove(0))
    }

    /// Make `target_id` the only active session.
    ///
    /// Both flag updates happen in one immediate transaction: readers see
    /// either the old or the new active session, never zero or two.
    pub fn switch_active(pool: &mut DbPool, target_id: &str) -> AppResult<Session> {
        let tx = pool.immediate()?;

        let mut target = Self::get_in(&tx, target_id)?;
        let previous = load_active_sessions(&tx)?;

        deactivate_sessions_except(&tx, target_id)?;
        activate_session(&tx, target_id)?;

        let from: Vec<&str> = previous.iter().map(|s| s.id.as_str()).collect();
        ttlog(
            &tx,
            "session_switch",
            target_id,
            &format!(
                "Active session switched from [{}] to {}",
                from.join(", "),
                target_id
            ),
        )?;
        tx.commit()?;

        target.is_active = true;
        Ok(target)
    }

    /// Delete every team and game record of a session. The session row and
    /// its active flag stay as they are, so the live session can be wiped
    /// between workshop runs.
    pub fn clear_data(pool: &mut DbPool, session_id: &str) -> AppResult<ClearReport> {
        let tx = pool.immediate()?;

        Self::get_in(&tx, session_id)?;
        let (teams, records) = delete_session_teams(&tx, session_id)?;

        ttlog(
            &tx,
            "session_clear",
            session_id,
            &format!("Removed {teams} teams and {records} game records"),
        )?;
        tx.commit()?;

        Ok(ClearReport { teams, records })
    }
}
