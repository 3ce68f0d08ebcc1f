use crate::cli::commands::{admin, open_pool, roster, session_or_active};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::provision::ProvisionLogic;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Provision {
        session,
        roster: roster_path,
        json,
        secret,
    } = cmd
    {
        admin(cfg, secret)?;
        let entries = roster(cfg, roster_path)?;
        if entries.is_empty() {
            warning("Roster is empty, nothing to provision.");
            return Ok(());
        }

        let mut pool = open_pool(cfg)?;
        let session_id = session_or_active(&pool, session)?;
        let tokens = ProvisionLogic::provision(&mut pool, &session_id, &entries, &cfg.base_url)?;

        if *json {
            println!("{}", serde_json::to_string_pretty(&tokens)?);
            return Ok(());
        }

        let mut table = Table::new(vec![
            Column::new("TEAM", 24),
            Column::new("INDICATION", 20),
            Column::new("USED", 4),
            Column::new("URL", 60),
        ]);
        for t in &tokens {
            table.add_row(vec![
                t.team_name.clone(),
                t.indication.clone(),
                (if t.consumed { "yes" } else { "no" }).to_string(),
                t.url.clone(),
            ]);
        }
        print!("{}", table.render());
        success(format!("{} tokens for session '{session_id}'", tokens.len()));
    }

    Ok(())
}
