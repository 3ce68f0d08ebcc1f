use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::session::SessionLogic;
use crate::db::initialize::init_db;
use crate::db::log;
use crate::db::pool::DbPool;
use crate::errors::AppResult;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file
///  - the SQLite database with all pending migrations
///  - the default sessions, with the test session active
pub fn handle(cli: &Cli) -> AppResult<()> {
    //
    // 1️⃣ CONFIGURATION
    //
    let cfg = Config::init_all(cli.db.as_deref(), cli.test)?;
    let db_path = cfg.database.clone();

    println!("⚙️  Initializing Zukunftstag…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Database   : {}", &db_path);

    //
    // 2️⃣ OPEN DB
    //
    let mut pool = DbPool::new(&db_path)?;

    //
    // 3️⃣ SCHEMA (tables + migrations)
    //
    init_db(&pool.conn)?;

    //
    // 4️⃣ DEFAULT SESSIONS
    //
    let created = SessionLogic::bootstrap(&mut pool)?;
    for s in &created {
        println!("➕ Session {} ({})", s.id, s.label);
    }

    let active = SessionLogic::active(&pool)?;
    println!("✅ Database initialized at {}", &db_path);
    println!("🎯 Active session: {}", active.id);

    //
    // 5️⃣ INTERNAL LOG (non blocking)
    //
    if let Err(e) = log::ttlog(
        &pool.conn,
        "init",
        "database",
        &format!("Database initialized at {}", &db_path),
    ) {
        eprintln!("⚠️ Failed to write internal log: {}", e);
    }

    println!("🎉 Zukunftstag initialization completed!");
    Ok(())
}
