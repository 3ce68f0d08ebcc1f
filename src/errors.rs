//! Unified application error type.
//! Every layer (db, core, cli, export) returns AppError so callers can match
//! on the engine taxonomy and decide the user-facing message themselves.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO / serialization
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---------------------------
    // Database-related
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Database migration error: {0}")]
    Migration(String),

    // ---------------------------
    // Lookup / uniqueness
    // ---------------------------
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    #[error("Team name '{name}' is already taken in session '{session}'")]
    DuplicateName { session: String, name: String },

    #[error("Registration token not found: {0}")]
    TokenNotFound(String),

    #[error("Registration by name is closed: a registration token is required")]
    RegistrationClosed,

    // ---------------------------
    // State machine / scoring
    // ---------------------------
    #[error("Cannot {action} {kind}: game is {from}")]
    InvalidTransition {
        kind: String,
        from: String,
        action: &'static str,
    },

    #[error("Invalid payload for {kind}: {reason}")]
    InvalidPayload { kind: String, reason: String },

    #[error("Unknown game kind: {0}")]
    InvalidGameKind(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    // ---------------------------
    // Active session
    // ---------------------------
    #[error("Team '{team}' belongs to session '{team_session}', but '{active_session}' is active")]
    StaleSession {
        team: String,
        team_session: String,
        active_session: String,
    },

    #[error("No active session (found {0} sessions marked active)")]
    NoActiveSession(usize),

    // ---------------------------
    // Admin
    // ---------------------------
    #[error("Administrator secret rejected")]
    Unauthorized,

    #[error("Seeding refused: {0}")]
    SeedRefused(String),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),
}

impl AppError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        AppError::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Integrity errors the administrator must see even when a team-facing
    /// call triggered them.
    pub fn is_integrity_breach(&self) -> bool {
        matches!(self, AppError::NoActiveSession(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;
