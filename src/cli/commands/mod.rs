pub mod config;
pub mod db;
pub mod export;
pub mod game;
pub mod init;
pub mod log;
pub mod provision;
pub mod seed;
pub mod session;
pub mod team;

use crate::config::Config;
use crate::core::admin::AdminAuth;
use crate::core::roster::{RosterEntry, load_roster};
use crate::core::session::SessionLogic;
use crate::db::initialize::init_db;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use std::path::Path;

/// Open the configured database with the schema brought up to date.
pub(crate) fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

pub(crate) fn admin(cfg: &Config, secret: &Option<String>) -> AppResult<AdminAuth> {
    AdminAuth::check(&cfg.admin_secret, secret.as_deref().unwrap_or(""))
}

/// Explicit session id, or the active one.
pub(crate) fn session_or_active(pool: &DbPool, session: &Option<String>) -> AppResult<String> {
    match session {
        Some(id) => Ok(SessionLogic::get(pool, id)?.id),
        None => Ok(SessionLogic::active(pool)?.id),
    }
}

/// Roster from the command line, falling back to the configured file.
pub(crate) fn roster(cfg: &Config, path: &Option<String>) -> AppResult<Vec<RosterEntry>> {
    match path.as_ref().or(cfg.roster_file.as_ref()) {
        Some(p) => load_roster(Path::new(p)),
        None => Err(AppError::Config(
            "no roster file given (use --roster or set roster_file)".into(),
        )),
    }
}
