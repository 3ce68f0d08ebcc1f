use crate::cli::commands::{admin, open_pool};
use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::roster::load_roster;
use crate::core::seed::SeedLogic;
use crate::core::team::RegistrationPolicy;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use std::path::Path;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Seed {
        teams,
        seed,
        roster,
        secret,
    } = cmd
    {
        admin(cfg, secret)?;

        // a missing roster is fine here, the seeder invents names
        let entries = match roster.as_ref().or(cfg.roster_file.as_ref()) {
            Some(p) => load_roster(Path::new(p))?,
            None => Vec::new(),
        };

        let mut pool = open_pool(cfg)?;
        let policy = RegistrationPolicy {
            require_token: cfg.require_token,
        };
        let report = SeedLogic::run(&mut pool, policy, &entries, *teams, *seed)?;

        success(format!(
            "Seeded {} teams with {} submissions",
            report.teams, report.submissions
        ));
        if report.skipped > 0 {
            warning(format!("{} team names were already taken", report.skipped));
        }
    }

    Ok(())
}
