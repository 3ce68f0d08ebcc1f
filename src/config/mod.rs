use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const APP_DIR: &str = ".zukunftstag";
pub const CONFIG_FILE: &str = "zukunftstag.conf";
pub const DATABASE_FILE: &str = "zukunftstag.sqlite";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub database: String,
    /// Close name registration; teams can only enter through QR tokens.
    pub require_token: bool,
    /// Shared secret for administrative commands.
    pub admin_secret: String,
    /// Prefix of the registration links printed on QR codes.
    pub base_url: String,
    /// Roster of `Team:Indication` lines, used by provision and seed.
    pub roster_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: Self::database_file().to_string_lossy().to_string(),
            require_token: false,
            admin_secret: "admin123".to_string(),
            base_url: "http://localhost:8501".to_string(),
            roster_file: None,
        }
    }
}

impl Config {
    /// `~/.zukunftstag`, or the current directory when no home is known.
    pub fn config_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(APP_DIR)
    }

    pub fn config_file() -> PathBuf {
        Self::config_dir().join(CONFIG_FILE)
    }

    pub fn database_file() -> PathBuf {
        Self::config_dir().join(DATABASE_FILE)
    }

    /// Load the configuration file, or defaults when there is none.
    pub fn load() -> AppResult<Self> {
        Self::load_from(&Self::config_file())
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        let cfg: Config = serde_yaml::from_str(&content)?;
        Ok(cfg)
    }

    /// Resolve a database name against the config dir: absolute paths are
    /// kept, bare names land next to the config file.
    pub fn resolve_db_path(name: &str) -> PathBuf {
        let p = Path::new(name);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            Self::config_dir().join(p)
        }
    }

    /// Create the config directory, write the config file (unless testing)
    /// and return the configuration pointing at the chosen database.
    pub fn init_all(custom_db: Option<&str>, is_test: bool) -> AppResult<Self> {
        let db_path = match custom_db {
            Some(name) => Self::resolve_db_path(name),
            None => Self::database_file(),
        };

        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let existing = Self::load().unwrap_or_default();
        let config = Config {
            database: db_path.to_string_lossy().to_string(),
            ..existing
        };

        if !is_test {
            fs::create_dir_all(Self::config_dir())?;
            let yaml = serde_yaml::to_string(&config)?;
            let mut file = fs::File::create(Self::config_file())?;
            file.write_all(yaml.as_bytes())?;
            println!("✅ Config file: {:?}", Self::config_file());
        }

        println!("✅ Database:    {:?}", db_path);

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: Config = serde_yaml::from_str("require_token: true\n").unwrap();
        assert!(cfg.require_token);
        assert_eq!(cfg.admin_secret, "admin123");
        assert!(cfg.roster_file.is_none());
    }

    #[test]
    fn absolute_db_path_is_kept() {
        let abs = std::env::temp_dir().join("zkt.sqlite");
        assert_eq!(Config::resolve_db_path(abs.to_str().unwrap()), abs);
    }
}
