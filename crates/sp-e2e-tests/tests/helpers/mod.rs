//! Shared helpers for end-to-end scenarios: a scripted language-model
//! endpoint and a fully wired agent session over the real instance catalog.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sp_agent::config::AgentConfig;
use sp_agent::console::ScriptedConsole;
use sp_agent::dispatcher::Agent;
use sp_agent::provision::SimulatedEc2;
use sp_inference::{IntentClassifier, LlmConfig};

/// Start a mock endpoint that replays `completions` in order, one per
/// request, then answers 404.
pub async fn scripted_endpoint(completions: &[&str]) -> MockServer {
    let server = MockServer::start().await;
    for completion in completions {
        Mock::given(method("POST"))
            .and(path("/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "generated_text": completion }])),
            )
            .up_to_n_times(1)
            .mount(&server)
            .await;
    }
    server
}

/// A wired-up session: scripted console, simulated backend, real catalog.
pub struct TestSession {
    pub console: Arc<ScriptedConsole>,
    pub agent: Agent<SimulatedEc2>,
    _dir: tempfile::TempDir,
}

/// Build a session against `server`, feeding `inputs` as the user's lines.
/// The catalog is the workspace's real dataset.
pub async fn session(server: &MockServer, inputs: &[&str], run_reflection: bool) -> TestSession {
    let dir = tempfile::tempdir().unwrap();
    let pool = sp_catalog::connect(&dir.path().join("catalog.db"), 2)
        .await
        .unwrap();
    let csv = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/instance_catalog.csv");
    sp_catalog::load_catalog(&pool, &csv).await.unwrap();

    let console = Arc::new(ScriptedConsole::new(inputs.iter().copied()));
    let backend =
        SimulatedEc2::new(console.clone()).with_stream_window(Duration::ZERO, Duration::ZERO);

    let llm = LlmConfig {
        endpoint_url: format!("{}/generate", server.uri()),
        timeout_secs: 2,
        ..AgentConfig::default().llm
    };
    let classifier = IntentClassifier::new(llm);

    TestSession {
        console: console.clone(),
        agent: Agent::new(console, backend, classifier, pool, run_reflection),
        _dir: dir,
    }
}
