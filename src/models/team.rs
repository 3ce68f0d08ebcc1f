use super::treatment::Treatment;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Team {
    pub id: i64,
    pub session_id: String,
    pub name: String,
    pub indication: String,
    pub parent_name: String,
    pub child_name: String,
    pub registration_token: Option<String>,
    pub registered_at: String,
    /// Clinical trial arms; `None` for teams stored before arms existed.
    pub parent_treatment: Option<Treatment>,
    pub child_treatment: Option<Treatment>,
}

/// How a client refers to its team: the numeric id handed out at
/// registration, or the team name within the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamRef {
    Id(i64),
    Name(String),
}

impl TeamRef {
    /// Numeric input is an id, anything else a name.
    pub fn parse(s: &str) -> Self {
        match s.trim().parse::<i64>() {
            Ok(id) => TeamRef::Id(id),
            Err(_) => TeamRef::Name(s.trim().to_string()),
        }
    }
}

impl fmt::Display for TeamRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamRef::Id(id) => write!(f, "#{id}"),
            TeamRef::Name(name) => f.write_str(name),
        }
    }
}
