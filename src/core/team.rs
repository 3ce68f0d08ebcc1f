use crate::core::scoring::validate_member_name;
use crate::core::session::SessionLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{
    consume_token, count_parent_arms, ensure_record, find_team, find_team_by_name_any_session,
    find_team_in_session, find_token, insert_team,
};
use crate::errors::{AppError, AppResult};
use crate::models::{GameKind, Session, Team, TeamRef, Treatment};
use chrono::Local;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rusqlite::Connection;

/// Deployment policy for team entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationPolicy {
    /// Only QR tokens may register teams.
    pub require_token: bool,
}

/// Optional member details captured on the registration form.
#[derive(Debug, Clone, Default)]
pub struct Members {
    pub parent_name: String,
    pub child_name: String,
}

impl Members {
    pub fn new(parent_name: Option<&str>, child_name: Option<&str>) -> AppResult<Self> {
        let check = |n: Option<&str>| -> AppResult<String> {
            match n.map(str::trim).filter(|s| !s.is_empty()) {
                Some(name) => {
                    validate_member_name(name).map_err(AppError::InvalidName)?;
                    Ok(name.to_string())
                }
                None => Ok(String::new()),
            }
        };

        Ok(Self {
            parent_name: check(parent_name)?,
            child_name: check(child_name)?,
        })
    }
}

const TEAM_NAME_MIN_LENGTH: usize = 2;

/// Seed for the clinical trial arm draw.
const TREATMENT_SEED: u64 = 1887;

/// Team registration and the per-request active-session check.
pub struct TeamLogic;

impl TeamLogic {
    /// Register a team by name into the active session.
    ///
    /// Team and its six game records are written in one transaction.
    pub fn register_by_name(
        pool: &mut DbPool,
        policy: RegistrationPolicy,
        name: &str,
        members: &Members,
    ) -> AppResult<Team> {
        if policy.require_token {
            return Err(AppError::RegistrationClosed);
        }

        let name = validate_team_name(name)?;

        let tx = pool.immediate()?;
        let session = SessionLogic::active_in(&tx)?;

        if find_team_in_session(&tx, &session.id, &name)?.is_some() {
            return Err(AppError::DuplicateName {
                session: session.id,
                name,
            });
        }

        let team = create_team(&tx, &session, &name, "", members, None)?;
        ttlog(
            &tx,
            "register",
            &session.id,
            &format!("Team '{}' registered by name (id {})", team.name, team.id),
        )?;
        tx.commit()?;

        Ok(team)
    }

    /// Register (or re-enter) through a pre-provisioned QR token.
    ///
    /// The first call creates the team; every later call with the same token
    /// returns that same team. The token row is read and consumed inside one
    /// immediate transaction, so two simultaneous first uses cannot both
    /// create a team: the second waits for the lock and then sees the first
    /// one's team.
    pub fn register_by_token(pool: &mut DbPool, token: &str, members: &Members) -> AppResult<Team> {
        let token = token.trim();
        let tx = pool.immediate()?;

        let row = find_token(&tx, token)?.ok_or_else(|| AppError::TokenNotFound(token.to_string()))?;

        if let Some(team_id) = row.team_id {
            let team = find_team(&tx, team_id)?.ok_or_else(|| AppError::not_found("team", team_id))?;
            // read-only path, nothing to commit
            return Ok(team);
        }

        let active = SessionLogic::active_in(&tx)?;
        if active.id != row.session_id {
            return Err(AppError::StaleSession {
                team: row.team_name,
                team_session: row.session_id,
                active_session: active.id,
            });
        }

        if find_team_in_session(&tx, &active.id, &row.team_name)?.is_some() {
            return Err(AppError::DuplicateName {
                session: active.id,
                name: row.team_name,
            });
        }

        let team = create_team(&tx, &active, &row.team_name, &row.indication, members, Some(token))?;
        if consume_token(&tx, token, team.id)? != 1 {
            // unreachable under the write lock; abort rather than double-consume
            return Err(AppError::not_found("unconsumed token", token));
        }

        ttlog(
            &tx,
            "register",
            &active.id,
            &format!("Team '{}' registered by token (id {})", team.name, team.id),
        )?;
        tx.commit()?;

        Ok(team)
    }

    /// Look a team up and check it belongs to the session active right now.
    ///
    /// Every team-facing call goes through here, which is how clients notice
    /// an administrator switch: a team of the previous session gets
    /// `StaleSession` and has to register again.
    pub fn resolve(pool: &DbPool, team: &TeamRef) -> AppResult<Team> {
        Self::resolve_in(&pool.conn, team)
    }

    pub(crate) fn resolve_in(conn: &Connection, team: &TeamRef) -> AppResult<Team> {
        let active = SessionLogic::active_in(conn)?;

        let found = match team {
            TeamRef::Id(id) => find_team(conn, *id)?,
            TeamRef::Name(name) => match find_team_in_session(conn, &active.id, name)? {
                Some(t) => Some(t),
                None => find_team_by_name_any_session(conn, name)?,
            },
        };

        let found = found.ok_or_else(|| AppError::not_found("team", team))?;
        if found.session_id != active.id {
            return Err(AppError::StaleSession {
                team: found.name,
                team_session: found.session_id,
                active_session: active.id,
            });
        }
        Ok(found)
    }

    /// Plain lookup without the session check (admin read path).
    pub fn get(pool: &DbPool, team_id: i64) -> AppResult<Team> {
        find_team(&pool.conn, team_id)?.ok_or_else(|| AppError::not_found("team", team_id))
    }
}

fn validate_team_name(name: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.chars().count() < TEAM_NAME_MIN_LENGTH {
        return Err(AppError::InvalidName(format!(
            "team name '{name}' must have at least {TEAM_NAME_MIN_LENGTH} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Insert the team row plus one not_started record per game kind.
fn create_team(
    conn: &Connection,
    session: &Session,
    name: &str,
    indication: &str,
    members: &Members,
    token: Option<&str>,
) -> AppResult<Team> {
    let parent_treatment = draw_parent_treatment(conn, &session.id)?;

    let mut team = Team {
        id: 0,
        session_id: session.id.clone(),
        name: name.to_string(),
        indication: indication.to_string(),
        parent_name: members.parent_name.clone(),
        child_name: members.child_name.clone(),
        registration_token: token.map(str::to_string),
        registered_at: Local::now().to_rfc3339(),
        parent_treatment: Some(parent_treatment),
        child_treatment: Some(parent_treatment.other()),
    };

    team.id = insert_team(conn, &team)?;
    for kind in GameKind::ALL {
        ensure_record(conn, team.id, kind)?;
    }
    Ok(team)
}

/// Parent arm for the next team of a session.
///
/// Arms stay balanced: the smaller one is picked, a tie is broken by a draw
/// seeded with the number of teams already registered, so the same
/// registration order always gives the same assignment.
fn draw_parent_treatment(conn: &Connection, session_id: &str) -> AppResult<Treatment> {
    let (placebo, molecule) = count_parent_arms(conn, session_id)?;

    Ok(match placebo.cmp(&molecule) {
        std::cmp::Ordering::Less => Treatment::Placebo,
        std::cmp::Ordering::Greater => Treatment::Molecule,
        std::cmp::Ordering::Equal => {
            let mut rng = StdRng::seed_from_u64(TREATMENT_SEED + (placebo + molecule) as u64);
            if rng.random_bool(0.5) {
                Treatment::Placebo
            } else {
                Treatment::Molecule
            }
        }
    })
}
