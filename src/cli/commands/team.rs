use crate::cli::commands::{open_pool, session_or_active};
use crate::cli::parser::{Commands, TeamCmd};
use crate::config::Config;
use crate::core::admin::AdminLogic;
use crate::core::progress::ProgressLogic;
use crate::core::team::{Members, RegistrationPolicy, TeamLogic};
use crate::errors::{AppError, AppResult};
use crate::models::{Team, TeamRef};
use crate::ui::messages::{header, success};
use crate::utils::table::{Column, Table};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    let Commands::Team { action } = cmd else {
        return Ok(());
    };

    let mut pool = open_pool(cfg)?;

    match action {
        TeamCmd::Register {
            name,
            token,
            parent,
            child,
        } => {
            let members = Members::new(parent.as_deref(), child.as_deref())?;
            let team = match (token, name) {
                (Some(token), _) => TeamLogic::register_by_token(&mut pool, token, &members)?,
                (None, Some(name)) => {
                    let policy = RegistrationPolicy {
                        require_token: cfg.require_token,
                    };
                    TeamLogic::register_by_name(&mut pool, policy, name, &members)?
                }
                (None, None) => {
                    return Err(AppError::InvalidName("a team name or --token is required".into()));
                }
            };
            success(format!(
                "Team '{}' registered in {} (id {})",
                team.name, team.session_id, team.id
            ));
        }

        TeamCmd::Resolve { team } => {
            let team = TeamLogic::resolve(&pool, &TeamRef::parse(team))?;
            print_team(&team);
        }

        TeamCmd::Status { team } => {
            let team_ref = TeamRef::parse(team);
            let team = TeamLogic::resolve(&pool, &team_ref)?;
            header(format!("{} (id {})", team.name, team.id));

            let progress = ProgressLogic::progress(&pool, &team_ref)?;
            for (kind, status) in &progress {
                println!("{} {:<24} {}", status.icon(), kind.label(), status);
            }
            let done = progress.iter().filter(|(_, s)| s.is_completed()).count();
            println!("\n{done}/{} games completed", progress.len());
        }

        TeamCmd::List { session } => {
            let session_id = session_or_active(&pool, session)?;
            let mut table = Table::new(vec![
                Column::new("ID", 5),
                Column::new("NAME", 24),
                Column::new("INDICATION", 20),
                Column::new("PARENT", 12),
                Column::new("CHILD", 12),
                Column::new("TOKEN", 5),
            ]);
            for t in AdminLogic::list_teams(&pool, &session_id)? {
                table.add_row(vec![
                    t.id.to_string(),
                    t.name,
                    t.indication,
                    t.parent_name,
                    t.child_name,
                    (if t.registration_token.is_some() { "yes" } else { "no" }).to_string(),
                ]);
            }
            print!("{}", table.render());
        }
    }

    Ok(())
}

fn print_team(team: &Team) {
    println!("id:          {}", team.id);
    println!("name:        {}", team.name);
    println!("session:     {}", team.session_id);
    if !team.indication.is_empty() {
        println!("indication:  {}", team.indication);
    }
    if !team.parent_name.is_empty() || !team.child_name.is_empty() {
        println!("members:     {} & {}", team.parent_name, team.child_name);
    }
    println!("registered:  {}", team.registered_at);
}
