//! Team roster file: one `Team name:Indication` per line.

use crate::errors::AppResult;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub indication: String,
}

/// Parse roster text. Blank lines are skipped, duplicate names keep the
/// first occurrence, a line without `:` has no indication.
pub fn parse_roster(text: &str) -> Vec<RosterEntry> {
    let mut out: Vec<RosterEntry> = Vec::new();

    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (name, indication) = match line.split_once(':') {
            Some((n, i)) => (n.trim(), i.trim()),
            None => (line, ""),
        };
        if name.is_empty() || out.iter().any(|e| e.name == name) {
            continue;
        }
        out.push(RosterEntry {
            name: name.to_string(),
            indication: indication.to_string(),
        });
    }

    out
}

pub fn load_roster(path: &Path) -> AppResult<Vec<RosterEntry>> {
    let text = fs::read_to_string(path)?;
    Ok(parse_roster(&text))
}
