pub mod config_cmd;
pub mod invoke;
pub mod serve;
pub mod tools;

use persona_config::AppConfig;
use std::path::Path;

/// Load config from `path` if given, else from the default location.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let config = match path {
        Some(path) => AppConfig::load_with_env(path),
        None => AppConfig::load(),
    }
    .map_err(|e| format!("Failed to load config: {e}"))?;
    Ok(config)
}
