use crate::ui::messages::success;
use rusqlite::{Connection, OptionalExtension, Result, Transaction, TransactionBehavior};

/// Ensure that the `log` table exists. It also records applied migrations.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check whether a table exists.
fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Check whether a table has a given column.
fn table_has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn migration_applied(conn: &Connection, version: &str) -> Result<bool> {
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    Ok(chk.query_row([version], |_| Ok(())).optional()?.is_some())
}

fn mark_applied(conn: &Connection, version: &str, message: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO log (date, operation, target, message)
         VALUES (datetime('now'), 'migration_applied', ?1, ?2)",
        [version, message],
    )?;
    Ok(())
}

/// Sessions, teams and per-team game records.
///
/// The partial unique index allows at most one row with `is_active = 1`;
/// the "exactly one" half of the invariant is kept by the switch transaction.
fn create_core_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL UNIQUE,
            label       TEXT NOT NULL DEFAULT '',
            is_active   INTEGER NOT NULL DEFAULT 0 CHECK(is_active IN (0,1)),
            created_at  TEXT NOT NULL
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_sessions_single_active
            ON sessions(is_active) WHERE is_active = 1;

        CREATE TABLE IF NOT EXISTS teams (
            id                  INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id          TEXT NOT NULL REFERENCES sessions(id),
            name                TEXT NOT NULL,
            indication          TEXT NOT NULL DEFAULT '',
            parent_name         TEXT NOT NULL DEFAULT '',
            child_name          TEXT NOT NULL DEFAULT '',
            registration_token  TEXT UNIQUE,
            registered_at       TEXT NOT NULL,
            UNIQUE(session_id, name)
        );

        CREATE TABLE IF NOT EXISTS game_records (
            team_id       INTEGER NOT NULL REFERENCES teams(id) ON DELETE CASCADE,
            game_kind     TEXT NOT NULL CHECK(game_kind IN
                            ('tech_check','game1_heights','game2_perimeter',
                             'game3_memory','game4_clinical','feedback')),
            status        TEXT NOT NULL DEFAULT 'not_started'
                            CHECK(status IN ('not_started','in_progress','completed')),
            payload       TEXT,
            score         REAL,
            started_at    TEXT,
            completed_at  TEXT,
            PRIMARY KEY (team_id, game_kind)
        );

        CREATE INDEX IF NOT EXISTS idx_teams_session ON teams(session_id);
        "#,
    )?;
    Ok(())
}

/// QR provisioning: one token per (session, team name), consumed once.
fn migrate_add_registration_tokens(conn: &Connection) -> Result<()> {
    let version = "20251002_0001_registration_tokens";
    if migration_applied(conn, version)? && table_exists(conn, "registration_tokens")? {
        return Ok(());
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS registration_tokens (
            token       TEXT PRIMARY KEY,
            session_id  TEXT NOT NULL REFERENCES sessions(id),
            team_name   TEXT NOT NULL,
            indication  TEXT NOT NULL DEFAULT '',
            team_id     INTEGER REFERENCES teams(id) ON DELETE SET NULL,
            created_at  TEXT NOT NULL,
            UNIQUE(session_id, team_name)
        );
        "#,
    )?;

    if !migration_applied(conn, version)? {
        mark_applied(conn, version, "Added registration_tokens table")?;
        success(format!("Migration applied: {version} → registration_tokens"));
    }
    Ok(())
}

/// When a completed record was last rescored after an answer-key change.
fn migrate_add_rescored_at(conn: &Connection) -> Result<()> {
    let version = "20251010_0002_game_records_rescored_at";
    if table_has_column(conn, "game_records", "rescored_at")? {
        return Ok(());
    }

    conn.execute(
        "ALTER TABLE game_records ADD COLUMN rescored_at TEXT;",
        [],
    )?;

    if !migration_applied(conn, version)? {
        mark_applied(conn, version, "Added rescored_at to game_records")?;
    }

    success(format!(
        "Migration applied: {version} → added 'rescored_at' to game_records"
    ));
    Ok(())
}

/// Blind clinical trial arms per member, assigned at team creation.
fn migrate_add_team_treatments(conn: &Connection) -> Result<()> {
    let version = "20251015_0003_team_treatments";
    let mut added = false;

    for column in ["parent_treatment", "child_treatment"] {
        if !table_has_column(conn, "teams", column)? {
            conn.execute(
                &format!(
                    "ALTER TABLE teams ADD COLUMN {column} TEXT
                     CHECK({column} IN ('placebo','molecule'))"
                ),
                [],
            )?;
            added = true;
        }
    }

    if added {
        if !migration_applied(conn, version)? {
            mark_applied(conn, version, "Added parent_treatment/child_treatment to teams")?;
        }
        success(format!(
            "Migration applied: {version} → added treatment arms to teams"
        ));
    }
    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Called from db::init_db(). Everything runs under one immediate
/// transaction, so a second process opening the same new file waits and
/// then finds the schema already in place.
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    apply_migrations(&tx)?;
    tx.commit()
}

fn apply_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table
    ensure_log_table(conn)?;

    // 2) Core schema (idempotent)
    let fresh = !table_exists(conn, "sessions")?;
    create_core_tables(conn)?;
    if fresh {
        success("Created sessions, teams and game_records tables.");
    }

    // 3) Incremental migrations
    migrate_add_registration_tokens(conn)?;
    migrate_add_rescored_at(conn)?;
    migrate_add_team_treatments(conn)?;

    Ok(())
}
