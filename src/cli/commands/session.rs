use crate::cli::commands::{admin, open_pool, session_or_active};
use crate::cli::parser::{Commands, SessionCmd};
use crate::config::Config;
use crate::core::admin::AdminLogic;
use crate::core::session::SessionLogic;
use crate::errors::AppResult;
use crate::ui::messages::{header, success};
use crate::utils::colors::{GREEN, GREY, RESET};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Session { action } = cmd else {
        return Ok(());
    };

    let mut pool = open_pool(cfg)?;

    match action {
        SessionCmd::List => {
            let mut table = Table::new(vec![
                Column::new("", 2),
                Column::new("ID", 22),
                Column::new("LABEL", 34),
                Column::new("CREATED", 25),
            ]);
            for s in SessionLogic::list(&pool)? {
                table.add_row(vec![
                    if s.is_active { "*".into() } else { " ".into() },
                    s.id,
                    s.label,
                    s.created_at,
                ]);
            }
            print!("{}", table.render());
        }

        SessionCmd::Active => {
            let s = SessionLogic::active(&pool)?;
            println!("{GREEN}{}{RESET} {GREY}({}){RESET}", s.id, s.label);
        }

        SessionCmd::Create {
            name,
            label,
            secret,
        } => {
            admin(cfg, secret)?;
            let s = SessionLogic::create(&mut pool, name, label.as_deref().unwrap_or(""))?;
            success(format!("Session '{}' created (inactive)", s.id));
        }

        SessionCmd::Switch { id, secret } => {
            let auth = admin(cfg, secret)?;
            let s = AdminLogic::switch_active_session(&mut pool, &auth, id)?;
            success(format!("Active session is now '{}'", s.id));
        }

        SessionCmd::Clear { id, secret } => {
            let auth = admin(cfg, secret)?;
            let report = AdminLogic::clear_session_data(&mut pool, &auth, id)?;
            success(format!(
                "Session '{id}' cleared: {} teams, {} game records removed",
                report.teams, report.records
            ));
        }

        SessionCmd::Overview { session } => {
            let session_id = session_or_active(&pool, session)?;
            let teams = AdminLogic::list_teams(&pool, &session_id)?;
            header(format!("{session_id}: {} teams", teams.len()));

            let mut table = Table::new(vec![
                Column::new("GAME", 24),
                Column::new("NOT STARTED", 12),
                Column::new("IN PROGRESS", 12),
                Column::new("COMPLETED", 10),
                Column::new("MEAN SCORE", 10),
            ]);
            for g in AdminLogic::session_overview(&pool, &session_id)? {
                table.add_row(vec![
                    g.kind.label().to_string(),
                    g.not_started.to_string(),
                    g.in_progress.to_string(),
                    g.completed.to_string(),
                    g.mean_score
                        .map(|m| format!("{m:.2}"))
                        .unwrap_or_else(|| "--".into()),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}
