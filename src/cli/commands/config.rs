//! Config command - show or locate configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::StagehandResult;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> StagehandResult<()> {
    match args.action {
        ConfigAction::Path => {
            println!("{}", manager.config_path().display());
        }
        ConfigAction::Show => {
            let rendered = toml::to_string_pretty(config)?;
            print!("{rendered}");
        }
    }
    Ok(())
}
