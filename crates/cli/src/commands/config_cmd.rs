//! `persona-relay config`: show the effective configuration.

use persona_config::AppConfig;
use std::path::Path;

pub fn run(config_path: Option<&Path>, path_only: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path_only {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| AppConfig::config_dir().join("config.toml"));
        println!("{}", path.display());
        return Ok(());
    }

    let config = super::load_config(config_path)?;
    println!("{}", config.redacted_toml());

    if let Err(e) = config.azure_openai.require() {
        if config.generation.backend == persona_config::GenerationBackend::Azure {
            println!("# warning: {e}");
        }
    }
    Ok(())
}
