use serde::Serialize;
use std::fmt;

/// Blind arm of the clinical trial game. Assigned per member when the team
/// is created and never shown to the team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Treatment {
    Placebo,
    Molecule,
}

impl Treatment {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            Treatment::Placebo => "placebo",
            Treatment::Molecule => "molecule",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "placebo" => Some(Treatment::Placebo),
            "molecule" => Some(Treatment::Molecule),
            _ => None,
        }
    }

    /// Parent and child of one team always sit in different arms.
    pub fn other(&self) -> Self {
        match self {
            Treatment::Placebo => Treatment::Molecule,
            Treatment::Molecule => Treatment::Placebo,
        }
    }
}

impl fmt::Display for Treatment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_db_str())
    }
}
