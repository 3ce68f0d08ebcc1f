use crate::cli::commands::{admin, open_pool, session_or_active};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        session,
        force,
        secret,
    } = cmd
    {
        admin(cfg, secret)?;
        let pool = open_pool(cfg)?;
        let session_id = session_or_active(&pool, session)?;
        ExportLogic::export(&pool, *format, file, &session_id, *force)?;
    }
    Ok(())
}
