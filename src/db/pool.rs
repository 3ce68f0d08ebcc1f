//! SQLite connection wrapper (one per request / CLI invocation).
//!
//! Every client opens its own `DbPool` against the same database file; SQLite
//! is the single point of truth and the only shared mutable resource.

use rusqlite::{Connection, Result, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;

/// How long a writer waits for the lock held by another connection.
const BUSY_TIMEOUT: Duration = Duration::from_secs(10);

pub struct DbPool {
    pub conn: Connection,
}

impl DbPool {
    pub fn new(path: &str) -> Result<Self> {
        let conn = Connection::open(Path::new(path))?;
        Self::configure(&conn, true)?;
        Ok(Self { conn })
    }

    /// Private, non-shared database (unit-style tests, dry runs).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::configure(&conn, false)?;
        Ok(Self { conn })
    }

    fn configure(conn: &Connection, wal: bool) -> Result<()> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        if wal {
            // readers keep working while a writer holds the lock
            let _mode: String = conn.query_row("PRAGMA journal_mode=WAL;", [], |row| row.get(0))?;
        }
        Ok(())
    }

    /// Start a write transaction that takes the database write lock up front.
    ///
    /// Read-check-write sequences run inside it are serialized against every
    /// other writer, and nothing is visible to readers before `commit()`.
    /// Dropping the transaction without committing rolls everything back.
    pub fn immediate(&mut self) -> Result<Transaction<'_>> {
        self.conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
    }
}
