//! `persona-relay invoke`: one tool invocation from the command line.

use persona_gateway::GatewayState;
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Parse a `key=text` seed argument. Splits at the first `=`.
pub fn parse_seed(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, text)) if !key.trim().is_empty() => Ok((key.to_string(), text.to_string())),
        _ => Err(format!("expected key=text, got '{arg}'")),
    }
}

pub async fn run(
    config_path: Option<&Path>,
    tool: &str,
    payload: &str,
    seeds: Vec<(String, String)>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let state = persona_gateway::build_state(&config).await?;

    // Ctrl-C aborts the outbound generation call.
    let cancel = CancellationToken::new();
    let guard = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            guard.cancel();
        }
    });

    let output = invoke(&state, tool, payload, &seeds, &cancel).await?;
    println!("{output}");
    Ok(())
}

/// Store the extra seeds, dispatch once, and render the output as pretty JSON.
async fn invoke(
    state: &GatewayState,
    tool: &str,
    payload: &str,
    seeds: &[(String, String)],
    cancel: &CancellationToken,
) -> persona_core::Result<String> {
    for (key, text) in seeds {
        state.store.upsert(key, text).await?;
    }
    if !seeds.is_empty() {
        info!(entries = seeds.len(), "Seeded context from command line");
    }

    let result = state.registry.invoke_raw(tool, payload, cancel).await?;
    Ok(serde_json::to_string_pretty(&result.output)?)
}
