use crate::export::ExportFormat;
use crate::models::GameKind;
use clap::{Parser, Subcommand};

/// Command-line interface for the Zukunftstag workshop engine
/// Sessions, team registration, game progress and results on SQLite
#[derive(Parser)]
#[command(
    name = "zukunftstag",
    version = env!("CARGO_PKG_VERSION"),
    about = "Workshop engine: sessions, teams, games and scores stored in SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database, the configuration and the default sessions
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity and the active session")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal log table
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Workshop sessions and the active-session switch
    Session {
        #[command(subcommand)]
        action: SessionCmd,
    },

    /// Team registration and lookup
    Team {
        #[command(subcommand)]
        action: TeamCmd,
    },

    /// Game progress and submissions
    Game {
        #[command(subcommand)]
        action: GameCmd,
    },

    /// Create QR registration tokens for every roster team
    Provision {
        #[arg(long, help = "Target session id (default: active session)")]
        session: Option<String>,

        #[arg(long, help = "Roster file (default: roster_file from config)")]
        roster: Option<String>,

        #[arg(long, help = "Print tokens as JSON")]
        json: bool,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },

    /// Fill the test session with synthetic teams and answers
    Seed {
        #[arg(long, default_value_t = 10, help = "Number of teams to create")]
        teams: usize,

        #[arg(long, default_value_t = crate::core::seed::DEFAULT_SEED, help = "Random seed")]
        seed: u64,

        #[arg(long, help = "Roster file to take team names from")]
        roster: Option<String>,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },

    /// Export every team × game row of a session
    Export {
        #[arg(long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,

        #[arg(long, help = "Absolute path of the output file")]
        file: String,

        #[arg(long, help = "Session id (default: active session)")]
        session: Option<String>,

        #[arg(long, help = "Overwrite an existing file without asking")]
        force: bool,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum SessionCmd {
    /// List all sessions
    List,

    /// Show the active session
    Active,

    /// Create a new, inactive session
    Create {
        name: String,

        #[arg(long, help = "Display label")]
        label: Option<String>,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },

    /// Make a session the only active one
    Switch {
        id: String,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },

    /// Delete all teams and game records of a session
    Clear {
        id: String,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },

    /// Participation per game for a session
    Overview {
        #[arg(long, help = "Session id (default: active session)")]
        session: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TeamCmd {
    /// Register a team by name or through a QR token
    Register {
        #[arg(required_unless_present = "token", conflicts_with = "token")]
        name: Option<String>,

        #[arg(long, help = "Registration token from the QR code")]
        token: Option<String>,

        #[arg(long, help = "Parent's first name")]
        parent: Option<String>,

        #[arg(long, help = "Child's first name")]
        child: Option<String>,
    },

    /// Look a team up by id or name within the active session
    Resolve { team: String },

    /// Completion checklist of a team
    Status { team: String },

    /// List the teams of a session
    List {
        #[arg(long, help = "Session id (default: active session)")]
        session: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum GameCmd {
    /// Enter a game
    Start {
        team: String,
        #[arg(value_enum)]
        kind: GameKind,
    },

    /// Submit answers (JSON object) for a game in progress
    Submit {
        team: String,
        #[arg(value_enum)]
        kind: GameKind,

        #[arg(long, conflicts_with = "payload_file", required_unless_present = "payload_file")]
        payload: Option<String>,

        #[arg(long = "payload-file")]
        payload_file: Option<String>,
    },

    /// Show the game records of a team
    Show {
        team: String,
        #[arg(value_enum)]
        kind: Option<GameKind>,
    },

    /// Force a game back to not_started
    Reset {
        team_id: i64,
        #[arg(value_enum)]
        kind: GameKind,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },

    /// Recompute stored scores of a game kind
    Rescore {
        #[arg(value_enum)]
        kind: GameKind,

        #[arg(long, help = "Session id (default: active session)")]
        session: Option<String>,

        #[arg(long, help = "Administrator secret")]
        secret: Option<String>,
    },
}
