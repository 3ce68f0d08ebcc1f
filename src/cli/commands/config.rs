use crate::cli::parser::Commands;
use crate::config::Config;
use crate::core::config::ConfigLogic;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        edit_config,
        editor,
    } = cmd
    {
        let path = Config::config_file();
        let path_str = path.to_string_lossy();

        // ---- PRINT CONFIG ----
        if *print_config {
            if path.exists() {
                println!("📄 Current configuration ({}):\n", path.display());
                ConfigLogic::print(&path_str)?;
            } else {
                ConfigLogic::print_effective(cfg)?;
            }
        }

        // ---- EDIT CONFIG ----
        if *edit_config {
            ConfigLogic::edit(&path_str, editor)?;
            success(format!("Configuration file edited: {}", path.display()));
        }
    }

    Ok(())
}
