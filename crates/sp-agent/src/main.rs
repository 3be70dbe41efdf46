//! StackPilot agent binary — conversational deployment sessions over a
//! language-model intent router, an instance catalog, and a simulated
//! provisioning backend.

use std::path::Path;
use std::sync::Arc;

use sp_agent::config::AgentConfig;
use sp_agent::console::{Terminal, UserIo};
use sp_agent::dispatcher::Agent;
use sp_agent::provision::SimulatedEc2;
use sp_agent::logging;
use sp_inference::IntentClassifier;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "stackpilot.toml".to_string());
    let config = AgentConfig::load_or_default(Path::new(&config_path))?;

    let _log_guard = logging::init(&config.log.dir)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %config_path,
        "sp-agent starting"
    );

    // ── Instance catalog ────────────────────────────────────────
    let pool = sp_catalog::connect(
        Path::new(&config.catalog.database_path),
        config.catalog.max_connections,
    )
    .await?;
    let rows = sp_catalog::load_catalog(&pool, Path::new(&config.catalog.csv_path)).await?;
    tracing::info!(rows, "instance catalog ready");

    // ── Session wiring ──────────────────────────────────────────
    let ui: Arc<dyn UserIo> = Arc::new(Terminal::new());
    let backend = SimulatedEc2::new(ui.clone());
    let classifier = IntentClassifier::new(config.llm.clone());
    tracing::info!(
        endpoint = %config.llm.endpoint_url,
        run_reflection = config.run_reflection,
        "classifier ready"
    );

    let mut agent = Agent::new(ui, backend, classifier, pool, config.run_reflection);
    agent.run().await;

    tracing::info!("sp-agent stopped");
    Ok(())
}
