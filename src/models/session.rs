use serde::Serialize;

/// A workshop run (morning, afternoon, test, ...). Exactly one is active.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Session {
    pub id: String,         // ⇔ sessions.id ("morning_session")
    pub name: String,       // ⇔ sessions.name ("morning")
    pub label: String,      // ⇔ sessions.label
    pub is_active: bool,    // ⇔ sessions.is_active (0/1, at most one row = 1)
    pub created_at: String, // ⇔ sessions.created_at (ISO8601)
}

/// Sessions created by `init`: (name, label).
pub const DEFAULT_SESSIONS: [(&str, &str); 3] = [
    ("morning", "Morning Session (09:00 - 11:30)"),
    ("afternoon", "Afternoon Session (13:30 - 16:00)"),
    ("test", "Test Session (Development)"),
];

/// Session activated by bootstrap when nothing is active yet.
pub const DEFAULT_ACTIVE: &str = "test_session";

impl Session {
    /// Stable key derived from the session name.
    pub fn id_for(name: &str) -> String {
        format!("{}_session", name.trim().to_lowercase())
    }
}
