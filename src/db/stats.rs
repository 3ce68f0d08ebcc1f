use crate::db::pool::DbPool;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use rusqlite::OptionalExtension;
use std::fs;

pub fn print_db_info(pool: &DbPool, db_path: &str) -> rusqlite::Result<()> {
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_mb = (file_size as f64) / (1024.0 * 1024.0);

    println!("{}• File:{} {}{}{}", CYAN, RESET, YELLOW, db_path, RESET);
    println!("{}• Size:{} {:.2} MB", CYAN, RESET, file_mb);

    //
    // 2) ACTIVE SESSION
    //
    let active: Option<String> = pool
        .conn
        .query_row(
            "SELECT id FROM sessions WHERE is_active = 1 ORDER BY id LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()?;
    println!(
        "{}• Active session:{} {}",
        CYAN,
        RESET,
        active.unwrap_or_else(|| format!("{GREY}--{RESET}"))
    );

    //
    // 3) ROW COUNTS
    //
    for (label, table) in [
        ("Sessions", "sessions"),
        ("Teams", "teams"),
        ("Game records", "game_records"),
        ("Registration tokens", "registration_tokens"),
        ("Log entries", "log"),
    ] {
        let count: i64 = pool
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))?;
        println!("{}• {}:{} {}{}{}", CYAN, label, RESET, GREEN, count, RESET);
    }

    //
    // 4) COMPLETION
    //
    let (done, total): (i64, i64) = pool.conn.query_row(
        "SELECT COALESCE(SUM(status = 'completed'), 0), COUNT(*) FROM game_records",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    if total > 0 {
        println!(
            "{}• Completed games:{} {}/{} ({:.1}%)",
            CYAN,
            RESET,
            done,
            total,
            done as f64 * 100.0 / total as f64
        );
    }

    println!();
    Ok(())
}
