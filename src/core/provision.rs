use crate::core::roster::RosterEntry;
use crate::core::session::SessionLogic;
use crate::db::log::ttlog;
use crate::db::pool::DbPool;
use crate::db::queries::{TokenRow, find_token_for_team, insert_token};
use crate::errors::AppResult;
use chrono::Local;
use serde::Serialize;
use uuid::Uuid;

/// One QR code worth of data: the team and the URL its table card encodes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ProvisionedToken {
    pub session_id: String,
    pub team_name: String,
    pub indication: String,
    pub token: String,
    pub url: String,
    pub consumed: bool,
}

pub struct ProvisionLogic;

impl ProvisionLogic {
    /// Create one registration token per roster team, bound to `session_id`.
    ///
    /// Teams that already have a token for this session keep it, so printed
    /// QR cards stay valid when provisioning is re-run.
    pub fn provision(
        pool: &mut DbPool,
        session_id: &str,
        roster: &[RosterEntry],
        base_url: &str,
    ) -> AppResult<Vec<ProvisionedToken>> {
        let tx = pool.immediate()?;
        SessionLogic::get_in(&tx, session_id)?;

        let now = Local::now().to_rfc3339();
        let mut out = Vec::with_capacity(roster.len());
        let mut created = 0usize;

        for entry in roster {
            let row = match find_token_for_team(&tx, session_id, &entry.name)? {
                Some(existing) => existing,
                None => {
                    let row = TokenRow {
                        token: Uuid::new_v4().simple().to_string(),
                        session_id: session_id.to_string(),
                        team_name: entry.name.clone(),
                        indication: entry.indication.clone(),
                        team_id: None,
                    };
                    insert_token(&tx, &row, &now)?;
                    created += 1;
                    row
                }
            };

            out.push(ProvisionedToken {
                url: token_url(base_url, &row.token),
                session_id: row.session_id,
                team_name: row.team_name,
                indication: row.indication,
                token: row.token,
                consumed: row.team_id.is_some(),
            });
        }

        ttlog(
            &tx,
            "provision",
            session_id,
            &format!("{created} new tokens, {} total", out.len()),
        )?;
        tx.commit()?;

        Ok(out)
    }
}

/// Landing URL carried by the QR code. Tokens are hex, no escaping needed.
pub fn token_url(base_url: &str, token: &str) -> String {
    let base = base_url.trim().trim_end_matches(['?', '&']);
    let sep = if base.contains('?') { '&' } else { '?' };
    format!("{base}{sep}token={token}")
}
