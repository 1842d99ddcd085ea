//! `persona-relay tools`: list the registered tools.

use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let state = persona_gateway::build_state(&config).await?;

    for def in state.registry.definitions() {
        println!("{:<18} {}", def.name, def.description);
    }
    Ok(())
}
