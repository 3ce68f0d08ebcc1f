use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::info;
use std::fs;
use std::process::Command;

pub struct ConfigLogic;

impl ConfigLogic {
    pub fn print(path: &str) -> AppResult<()> {
        let content = fs::read_to_string(path).map_err(|_| AppError::ConfigLoad)?;
        println!("{}", content);
        Ok(())
    }

    /// Effective values, with the secret masked.
    pub fn print_effective(cfg: &Config) -> AppResult<()> {
        let mut shown = cfg.clone();
        shown.admin_secret = "*".repeat(shown.admin_secret.chars().count().min(8));
        info("No configuration file, showing defaults:");
        print!("{}", serde_yaml::to_string(&shown)?);
        Ok(())
    }

    pub fn edit(path: &str, editor: &Option<String>) -> AppResult<()> {
        let ed = editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "nano".into());

        let status = Command::new(&ed)
            .arg(path)
            .status()
            .map_err(|e| AppError::Config(format!("cannot launch '{ed}': {e}")))?;

        if !status.success() {
            return Err(AppError::Config(format!("'{ed}' exited with {status}")));
        }
        Ok(())
    }
}
