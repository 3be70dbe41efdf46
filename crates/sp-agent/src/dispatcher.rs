//! Dialogue controller and intent dispatcher.
//!
//! Owns the session state (configs, autoscaling flag, transcript) and runs
//! the turn loop: read an utterance, classify it, optionally reflect, then
//! route the intent to its state transition. Intents are independent — there
//! is no sequencing gate; confirm deploys whatever configuration currently
//! exists. Backend and catalog failures are contained here and relayed to
//! the user; only endpoint transport failures abort the session, and the
//! single top-level failure message comes from [`Agent::run`].

use std::sync::Arc;

use sqlx::SqlitePool;

use sp_catalog::{BestInstance, find_best_instance};
use sp_inference::IntentClassifier;
use sp_protocol::{ClassifiedIntent, InstanceConfig, IntentArgs, Literal, ScalingConfig, Transcript};

use crate::console::UserIo;
use crate::provision::ProvisioningBackend;

/// One conversational deployment session.
pub struct Agent<B> {
    ui: Arc<dyn UserIo>,
    backend: B,
    classifier: IntentClassifier,
    catalog: SqlitePool,
    run_reflection: bool,

    instance_config: InstanceConfig,
    scaling_config: ScalingConfig,
    autoscaling_enabled: bool,
    transcript: Transcript,
}

impl<B: ProvisioningBackend> Agent<B> {
    pub fn new(
        ui: Arc<dyn UserIo>,
        backend: B,
        classifier: IntentClassifier,
        catalog: SqlitePool,
        run_reflection: bool,
    ) -> Self {
        let mut scaling_config = ScalingConfig::default();
        scaling_config.vpc_zone_identifier = backend.subnet_id().to_string();

        Self {
            ui,
            backend,
            classifier,
            catalog,
            run_reflection,
            instance_config: InstanceConfig::default(),
            scaling_config,
            autoscaling_enabled: false,
            transcript: Transcript::new(),
        }
    }

    pub fn instance_config(&self) -> &InstanceConfig {
        &self.instance_config
    }

    pub fn scaling_config(&self) -> &ScalingConfig {
        &self.scaling_config
    }

    pub fn autoscaling_enabled(&self) -> bool {
        self.autoscaling_enabled
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Run the session to completion. Any error escaping a turn ends the
    /// session with a single failure message — no partial-turn recovery.
    pub async fn run(&mut self) {
        if let Err(err) = self.run_session().await {
            tracing::error!(error = %err, "session aborted");
            self.ui.log_to_user(&format!("Error: {err}"));
        }
    }

    async fn run_session(&mut self) -> anyhow::Result<()> {
        // Intro turn: ask for sizing requirements up front, then drop into
        // the open dialogue flow.
        let Some(first) = self
            .ui
            .prompt("Enter instance requirements - amount of RAM and CPU cores: ")
            .await?
        else {
            return Ok(());
        };
        self.process_turn(&first).await?;

        loop {
            let Some(utterance) = self.ui.prompt("User: ").await? else {
                return Ok(());
            };
            self.process_turn(&utterance).await?;
        }
    }

    /// One full turn: append, classify, append the classification, reflect
    /// if enabled (replacing the classification), dispatch.
    async fn process_turn(&mut self, utterance: &str) -> anyhow::Result<()> {
        self.transcript.push_user(utterance);

        let mut intent = self.classifier.classify(utterance, &self.transcript).await?;
        tracing::debug!(
            classification = %serde_json::to_string(&intent).unwrap_or_default(),
            "turn classified"
        );
        self.transcript.push_agent(intent.to_string());

        if self.run_reflection {
            let reflected = self.classifier.reflect(utterance, &self.transcript).await?;
            if reflected != intent {
                tracing::info!(first = %intent, second = %reflected, "reflection overrode classification");
            }
            intent = reflected;
        }

        self.dispatch(&intent).await;
        Ok(())
    }

    /// Route a classified intent to its state transition. Infallible by
    /// contract: backend and catalog failures are relayed to the user here.
    pub async fn dispatch(&mut self, intent: &ClassifiedIntent) {
        tracing::info!(call = %intent, "dispatching intent");

        match intent.name.as_str() {
            "select_instance_type" => self.handle_select_instance_type(intent).await,
            "confirm_deployment" => self.handle_confirm_deployment().await,
            "enable_autoscaling" => {
                self.autoscaling_enabled = true;
                self.display_deployment_config();
            }
            "show_deployment_config" => self.display_deployment_config(),
            "modify_instance_config" => {
                let ui = self.ui.clone();
                self.instance_config
                    .apply_partial_update(&intent.args, &mut |msg| ui.log_to_user(msg));
                self.display_deployment_config();
            }
            "modify_scaling_config" => {
                let ui = self.ui.clone();
                self.scaling_config
                    .apply_partial_update(&intent.args, &mut |msg| ui.log_to_user(msg));
                self.display_deployment_config();
            }
            _ => {
                // Covers out_of_scope and anything the model invented.
                self.ui
                    .log_to_user("Sorry, I didn't understand that. Please try again.");
            }
        }
    }

    async fn handle_select_instance_type(&mut self, intent: &ClassifiedIntent) {
        let cpu = intent.args.get("cpu").and_then(Literal::as_i64);
        let ram = intent.args.get("ram").and_then(Literal::as_f64);

        let outcome = find_best_instance(&self.catalog, cpu, ram).await;
        match outcome {
            Ok(BestInstance::Found(offer)) => {
                let mut update = IntentArgs::new();
                update.insert(
                    "InstanceType".to_string(),
                    Literal::Str(offer.api_name.clone()),
                );
                let ui = self.ui.clone();
                self.instance_config
                    .apply_partial_update(&update, &mut |msg| ui.log_to_user(msg));
                self.display_deployment_config();
            }
            // A miss goes back to the user verbatim so they can restate the
            // requirements; nothing changes.
            Ok(BestInstance::NoMatch { message }) => self.ui.log_to_user(&message),
            Err(err) => {
                tracing::warn!(error = %err, "instance lookup failed");
                self.ui.log_to_user(&format!("Instance lookup failed: {err}"));
            }
        }
    }

    async fn handle_confirm_deployment(&mut self) {
        if let Err(err) = self
            .backend
            .deploy(
                &self.instance_config,
                &self.scaling_config,
                self.autoscaling_enabled,
            )
            .await
        {
            tracing::warn!(error = %err, "deployment failed");
            self.ui
                .log_to_user(&format!("An error occurred during deployment: {err}"));
        }
    }

    fn display_deployment_config(&self) {
        self.ui
            .display_config("Instance", &self.instance_config.to_display_map());
        if self.autoscaling_enabled {
            self.ui
                .display_config("AutoScaling", &self.scaling_config.to_display_map());
        }
        self.ui.log_to_user("\nHow does this look?");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    use crate::console::ScriptedConsole;
    use crate::provision::SimulatedEc2;
    use sp_inference::LlmConfig;

    const FIXTURE: &str = "\
api_name,vcpus,memory_gb,on_demand_usd
t3.micro,2,1.0,0.0104
t3.medium,2,4.0,0.0416
m6i.large,2,8.0,0.096
c5.xlarge,4,8.0,0.17
";

    async fn seeded_pool(dir: &tempfile::TempDir) -> SqlitePool {
        let pool = sp_catalog::connect(&dir.path().join("catalog.db"), 2)
            .await
            .unwrap();
        let csv = dir.path().join("catalog.csv");
        let mut file = std::fs::File::create(&csv).unwrap();
        file.write_all(FIXTURE.as_bytes()).unwrap();
        sp_catalog::load_catalog(&pool, &csv).await.unwrap();
        pool
    }

    async fn agent_for(dir: &tempfile::TempDir) -> (Arc<ScriptedConsole>, Agent<SimulatedEc2>) {
        let console = Arc::new(ScriptedConsole::default());
        let backend = SimulatedEc2::new(console.clone())
            .with_stream_window(Duration::ZERO, Duration::ZERO);
        let classifier = IntentClassifier::new(LlmConfig::default());
        let pool = seeded_pool(dir).await;
        let agent = Agent::new(console.clone(), backend, classifier, pool, false);
        (console, agent)
    }

    fn intent(name: &str, args: &[(&str, Literal)]) -> ClassifiedIntent {
        ClassifiedIntent::new(
            name,
            args.iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[tokio::test]
    async fn select_instance_type_updates_config_and_redisplays() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        agent
            .dispatch(&intent(
                "select_instance_type",
                &[("cpu", Literal::Int(2)), ("ram", Literal::Float(4.0))],
            ))
            .await;

        assert_eq!(agent.instance_config().instance_type.as_deref(), Some("t3.medium"));
        let text = console.output_text();
        assert!(text.contains("Recommended optimized Instance config:"));
        assert!(text.contains("InstanceType: t3.medium"));
        assert!(text.contains("How does this look?"));
    }

    #[tokio::test]
    async fn lookup_miss_is_relayed_verbatim_without_config_change() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        agent
            .dispatch(&intent("select_instance_type", &[("cpu", Literal::Int(512))]))
            .await;

        assert!(agent.instance_config().instance_type.is_none());
        let text = console.output_text();
        assert!(text.contains("No instance found with CPU >= 512"));
        assert!(!text.contains("Recommended optimized"));
    }

    #[tokio::test]
    async fn omitted_lookup_constraints_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let (_console, mut agent) = agent_for(&dir).await;

        // Only CPU named: RAM floor defaults to 8 GB.
        agent
            .dispatch(&intent("select_instance_type", &[("cpu", Literal::Int(2))]))
            .await;

        assert_eq!(agent.instance_config().instance_type.as_deref(), Some("m6i.large"));
    }

    #[tokio::test]
    async fn enable_autoscaling_shows_both_configs() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;
        assert!(!agent.autoscaling_enabled());

        agent.dispatch(&intent("enable_autoscaling", &[])).await;

        assert!(agent.autoscaling_enabled());
        let text = console.output_text();
        assert!(text.contains("Recommended optimized Instance config:"));
        assert!(text.contains("Recommended optimized AutoScaling config:"));
        assert!(text.contains("VPCZoneIdentifier: subnet-"));
    }

    #[tokio::test]
    async fn scaling_config_is_pinned_to_backend_subnet() {
        let dir = tempfile::tempdir().unwrap();
        let (_console, agent) = agent_for(&dir).await;
        assert!(agent.scaling_config().vpc_zone_identifier.starts_with("subnet-"));
    }

    #[tokio::test]
    async fn modify_instance_config_surfaces_rejections_to_user() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        agent
            .dispatch(&intent(
                "modify_instance_config",
                &[("MinCount", Literal::Int(5))],
            ))
            .await;

        // Violates MinCount <= MaxCount against the default MaxCount=1:
        // rejected, config untouched, config still re-displayed after.
        assert_eq!(agent.instance_config().min_count, 1);
        let text = console.output_text();
        assert!(text.contains("MinCount (5) must not exceed MaxCount (1)"));
        assert!(text.contains("Recommended optimized Instance config:"));
    }

    #[tokio::test]
    async fn modify_scaling_config_commits_jointly_valid_updates() {
        let dir = tempfile::tempdir().unwrap();
        let (_console, mut agent) = agent_for(&dir).await;

        agent
            .dispatch(&intent(
                "modify_scaling_config",
                &[
                    ("MaxSize", Literal::Int(10)),
                    ("DesiredCapacity", Literal::Int(5)),
                ],
            ))
            .await;

        assert_eq!(agent.scaling_config().max_size, 10);
        assert_eq!(agent.scaling_config().desired_capacity, 5);
    }

    #[tokio::test]
    async fn unknown_field_warns_but_commits_the_rest() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        agent
            .dispatch(&intent(
                "modify_instance_config",
                &[
                    ("Flavor", Literal::Str("big".into())),
                    ("MaxCount", Literal::Int(4)),
                ],
            ))
            .await;

        assert_eq!(agent.instance_config().max_count, 4);
        assert!(console.output_text().contains("no field named 'Flavor'"));
    }

    #[tokio::test]
    async fn unrecognized_intent_gets_fixed_reply() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        agent.dispatch(&ClassifiedIntent::out_of_scope()).await;
        agent.dispatch(&intent("made_up_by_the_model", &[])).await;

        let replies: Vec<_> = console
            .output()
            .into_iter()
            .filter(|line| line.contains("Sorry, I didn't understand that."))
            .collect();
        assert_eq!(replies.len(), 2);
    }

    #[tokio::test]
    async fn confirm_deploys_current_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        agent
            .dispatch(&intent(
                "select_instance_type",
                &[("cpu", Literal::Int(2)), ("ram", Literal::Float(4.0))],
            ))
            .await;
        agent.dispatch(&intent("confirm_deployment", &[])).await;

        let text = console.output_text();
        assert!(text.contains("Deploying instances directly..."));
        assert!(text.contains("Deployment completed successfully"));
    }

    #[tokio::test]
    async fn backend_failure_is_relayed_and_session_survives() {
        let dir = tempfile::tempdir().unwrap();
        let (console, mut agent) = agent_for(&dir).await;

        // Autoscaling with no instance type selected: the launch template
        // cannot be created and the failure is relayed as text.
        agent.dispatch(&intent("enable_autoscaling", &[])).await;
        agent.dispatch(&intent("confirm_deployment", &[])).await;

        let text = console.output_text();
        assert!(text.contains("An error occurred during deployment:"));

        // The session is still usable afterwards.
        agent.dispatch(&intent("show_deployment_config", &[])).await;
        assert!(console.output_text().contains("How does this look?"));
    }
}
