use crate::cli::commands::{admin, open_pool, session_or_active};
use crate::cli::parser::{Commands, GameCmd};
use crate::config::Config;
use crate::core::admin::AdminLogic;
use crate::core::progress::ProgressLogic;
use crate::core::team::TeamLogic;
use crate::errors::AppResult;
use crate::models::{GameRecord, TeamRef};
use crate::ui::messages::{info, success, warning};
use crate::utils::colors::{GREY, RESET};
use std::fs;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Game { action } = cmd else {
        return Ok(());
    };

    let mut pool = open_pool(cfg)?;

    match action {
        GameCmd::Start { team, kind } => {
            let team = TeamLogic::resolve(&pool, &TeamRef::parse(team))?;
            let record = ProgressLogic::start(&mut pool, team.id, *kind)?;
            info(format!("{}: {} is {}", team.name, kind.label(), record.status));
        }

        GameCmd::Submit {
            team,
            kind,
            payload,
            payload_file,
        } => {
            let raw = match (payload, payload_file) {
                (Some(p), _) => p.clone(),
                (None, Some(path)) => fs::read_to_string(path)?,
                (None, None) => String::new(),
            };

            let team = TeamLogic::resolve(&pool, &TeamRef::parse(team))?;
            let record = ProgressLogic::submit(&mut pool, team.id, *kind, &raw)?;
            success(format!(
                "{}: {} completed, score {}",
                team.name,
                kind.label(),
                record.score_str()
            ));
        }

        GameCmd::Show { team, kind } => {
            let team = TeamLogic::resolve(&pool, &TeamRef::parse(team))?;
            let records = match kind {
                Some(k) => vec![ProgressLogic::get(&pool, team.id, *k)?],
                None => AdminLogic::list_game_records(&pool, team.id)?,
            };
            for r in &records {
                print_record(r);
            }
        }

        GameCmd::Reset {
            team_id,
            kind,
            secret,
        } => {
            let auth = admin(cfg, secret)?;
            let record = AdminLogic::reset_game(&mut pool, &auth, *team_id, *kind)?;
            success(format!("Team {team_id}: {} reset to {}", kind.label(), record.status));
        }

        GameCmd::Rescore {
            kind,
            session,
            secret,
        } => {
            let auth = admin(cfg, secret)?;
            let session_id = session_or_active(&pool, session)?;
            let report = AdminLogic::rescore(&mut pool, &auth, &session_id, *kind)?;
            success(format!(
                "{}: {} checked, {} updated",
                kind.label(),
                report.checked,
                report.updated
            ));
            if report.unreadable > 0 {
                warning(format!("{} stored payloads could not be scored", report.unreadable));
            }
        }
    }

    Ok(())
}

fn print_record(r: &GameRecord) {
    println!(
        "{} {:<24} {:<12} score {:>6}  {GREY}{}{RESET}",
        r.status.icon(),
        r.kind.label(),
        r.status.to_string(),
        r.score_str(),
        r.payload.as_deref().unwrap_or("")
    );
}
