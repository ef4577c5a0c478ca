//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;
use std::path::PathBuf;

/// Run the config command. `config_override` is the `--config` path, if given.
pub fn run_config(action: &ConfigAction, settings: Settings, config_override: Option<&str>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            println!("{}", config_path(config_override).display());
        }
    }

    Ok(())
}

/// The file settings were read from: the override, else the default location.
fn config_path(config_override: Option<&str>) -> PathBuf {
    match config_override {
        Some(path) => PathBuf::from(path),
        None => Settings::default_config_path(),
    }
}
