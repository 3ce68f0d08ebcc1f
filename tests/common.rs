#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;
use zukunftstag::core::session::SessionLogic;
use zukunftstag::db::initialize::init_db;
use zukunftstag::db::pool::DbPool;

/// Default administrator secret when no config file is present.
pub const SECRET: &str = "admin123";

pub fn zkt() -> Command {
    let mut cmd = cargo_bin_cmd!("zukunftstag");
    cmd.env("NO_COLOR", "1");
    cmd
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_zukunftstag.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    for suffix in ["", "-wal", "-shm"] {
        fs::remove_file(format!("{db_path}{suffix}")).ok();
    }
    db_path
}

/// Create a temporary output file path inside tempdir and ensure it's removed
pub fn temp_out(name: &str, ext: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_out.{}", name, ext));
    let p = path.to_string_lossy().to_string();
    fs::remove_file(&p).ok();
    p
}

/// Write a roster file into tempdir and return its path
pub fn temp_roster(name: &str, content: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_roster.txt", name));
    fs::write(&path, content).expect("write roster");
    path.to_string_lossy().to_string()
}

/// `init` through the CLI: schema plus default sessions, test_session active
pub fn init_cli_db(db_path: &str) {
    zkt()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Library-level pool on a fresh file, migrated and bootstrapped
pub fn fresh_pool(name: &str) -> (DbPool, String) {
    let db_path = setup_test_db(name);
    let mut pool = DbPool::new(&db_path).expect("open db");
    init_db(&pool.conn).expect("init db");
    SessionLogic::bootstrap(&mut pool).expect("bootstrap");
    (pool, db_path)
}

/// In-memory pool, migrated and bootstrapped
pub fn memory_pool() -> DbPool {
    let mut pool = DbPool::in_memory().expect("open db");
    init_db(&pool.conn).expect("init db");
    SessionLogic::bootstrap(&mut pool).expect("bootstrap");
    pool
}
