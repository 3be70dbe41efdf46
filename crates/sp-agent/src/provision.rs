//! Provisioning backend — the deploy/verify/stream-logs seam.
//!
//! The dialogue controller only ever talks to [`ProvisioningBackend`];
//! failures are caught at that call site and relayed to the user, never
//! fatal to the session. [`SimulatedEc2`] is the shipped implementation: an
//! in-memory stand-in that mimics instance and autoscaling-group creation
//! and reports progress through the user sink exactly like a real backend
//! would.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use sp_protocol::{InstanceConfig, ScalingConfig};

use crate::console::UserIo;

/// Errors from the provisioning backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to create launch template: {0}")]
    LaunchTemplate(String),

    #[error("instance {0} not found")]
    UnknownInstance(String),
}

/// Convenience alias for backend results.
pub type BackendResult<T> = Result<T, BackendError>;

/// Executes deployments and reports instance state and logs.
#[async_trait]
pub trait ProvisioningBackend: Send + Sync {
    /// Subnet the session's scaling group is pinned to.
    fn subnet_id(&self) -> &str;

    /// Deploy the given configuration. Progress goes to the user sink; the
    /// configurations are read, never consumed.
    async fn deploy(
        &self,
        instance: &InstanceConfig,
        scaling: &ScalingConfig,
        autoscaling_enabled: bool,
    ) -> BackendResult<()>;

    /// Current state string for a deployed instance.
    async fn verify_instance(&self, instance_id: &str) -> BackendResult<String>;

    /// Write periodic console-output lines for an instance to the user sink.
    async fn stream_logs(
        &self,
        instance_id: &str,
        interval: Duration,
        duration: Duration,
    ) -> BackendResult<()>;
}

#[derive(Default)]
struct SimState {
    /// Launch template name → template id.
    templates: HashMap<String, String>,
    /// Autoscaling group name → launched instance ids.
    groups: HashMap<String, Vec<String>>,
    /// Every instance ever launched, any path.
    instances: Vec<String>,
}

/// In-memory EC2/autoscaling stand-in.
pub struct SimulatedEc2 {
    sink: Arc<dyn UserIo>,
    vpc_id: String,
    subnet_id: String,
    state: Mutex<SimState>,
    stream_interval: Duration,
    stream_duration: Duration,
}

impl SimulatedEc2 {
    pub fn new(sink: Arc<dyn UserIo>) -> Self {
        Self {
            sink,
            vpc_id: format!("vpc-{}", short_hex()),
            subnet_id: format!("subnet-{}", short_hex()),
            state: Mutex::new(SimState::default()),
            stream_interval: Duration::from_secs(5),
            stream_duration: Duration::from_secs(30),
        }
    }

    /// Override the post-deploy log-streaming window (tests use zero).
    pub fn with_stream_window(mut self, interval: Duration, duration: Duration) -> Self {
        self.stream_interval = interval;
        self.stream_duration = duration;
        self
    }

    pub fn vpc_id(&self) -> &str {
        &self.vpc_id
    }

    /// Instance ids launched so far, in launch order.
    pub fn deployed_instance_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().instances.clone()
    }

    fn create_launch_template(
        &self,
        instance: &InstanceConfig,
        template_name: &str,
    ) -> BackendResult<String> {
        let Some(instance_type) = &instance.instance_type else {
            return Err(BackendError::LaunchTemplate(
                "no instance type selected".to_string(),
            ));
        };

        let template_id = format!("lt-{}", long_hex());
        tracing::info!(
            template = template_name,
            id = %template_id,
            instance_type,
            image_id = %instance.image_id,
            "launch template created"
        );
        self.state
            .lock()
            .unwrap()
            .templates
            .insert(template_name.to_string(), template_id.clone());
        Ok(template_id)
    }

    fn launch_instances(&self, count: i64) -> Vec<String> {
        let ids: Vec<String> = (0..count).map(|_| format!("i-{}", long_hex())).collect();
        self.state
            .lock()
            .unwrap()
            .instances
            .extend(ids.iter().cloned());
        ids
    }

    fn console_output(&self, instance_id: &str) -> String {
        format!("instance {instance_id} booted, cloud-init complete, services nominal")
    }

    fn knows_instance(&self, instance_id: &str) -> bool {
        self.state
            .lock()
            .unwrap()
            .instances
            .iter()
            .any(|id| id == instance_id)
    }
}

#[async_trait]
impl ProvisioningBackend for SimulatedEc2 {
    fn subnet_id(&self) -> &str {
        &self.subnet_id
    }

    async fn deploy(
        &self,
        instance: &InstanceConfig,
        scaling: &ScalingConfig,
        autoscaling_enabled: bool,
    ) -> BackendResult<()> {
        self.sink.log_to_user("");

        let instance_ids = if autoscaling_enabled {
            let template_id =
                self.create_launch_template(instance, &scaling.launch_template_name)?;
            self.sink
                .log_to_user(&format!("Launch Template created with ID: {template_id}"));

            self.sink.log_to_user("Creating Auto Scaling Group...");
            let group_name = format!("ASG-{}", scaling.launch_template_name);
            let ids = self.launch_instances(scaling.desired_capacity);
            self.state
                .lock()
                .unwrap()
                .groups
                .insert(group_name.clone(), ids.clone());
            self.sink.log_to_user(&format!(
                "Auto Scaling Group '{group_name}' created successfully."
            ));

            if ids.is_empty() {
                self.sink
                    .log_to_user("No instances have been launched yet by the Auto Scaling Group.");
                return Ok(());
            }
            self.sink.log_to_user(&format!(
                "Auto Scaling Group has launched {} instances. Instance IDs: {}",
                ids.len(),
                ids.join(", ")
            ));
            ids
        } else {
            self.sink.log_to_user("Deploying instances directly...");
            let ids = self.launch_instances(instance.max_count);
            self.sink.log_to_user(&format!(
                "Deployed {} instances. Instance IDs: {}",
                ids.len(),
                ids.join(", ")
            ));
            ids
        };

        self.sink.log_to_user("Deployment completed successfully");
        tracing::info!(count = instance_ids.len(), autoscaling_enabled, "deployment finished");

        // Per requirements, stream console logs after deployment; one
        // instance keeps the output readable.
        self.stream_logs(&instance_ids[0], self.stream_interval, self.stream_duration)
            .await
    }

    async fn verify_instance(&self, instance_id: &str) -> BackendResult<String> {
        if self.knows_instance(instance_id) {
            Ok("running".to_string())
        } else {
            Err(BackendError::UnknownInstance(instance_id.to_string()))
        }
    }

    async fn stream_logs(
        &self,
        instance_id: &str,
        interval: Duration,
        duration: Duration,
    ) -> BackendResult<()> {
        if !self.knows_instance(instance_id) {
            return Err(BackendError::UnknownInstance(instance_id.to_string()));
        }

        let ticks = if interval.is_zero() {
            1
        } else {
            (duration.as_millis() / interval.as_millis()).max(1)
        };

        for tick in 0..ticks {
            let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            self.sink.log_to_user(&format!(
                "{now} - {instance_id} Console Output: {}",
                self.console_output(instance_id)
            ));
            if tick + 1 < ticks {
                tokio::time::sleep(interval).await;
            }
        }
        Ok(())
    }
}

fn short_hex() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

fn long_hex() -> String {
    Uuid::new_v4().simple().to_string()[..17].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;

    fn backend_with_console() -> (Arc<ScriptedConsole>, SimulatedEc2) {
        let console = Arc::new(ScriptedConsole::default());
        let backend = SimulatedEc2::new(console.clone())
            .with_stream_window(Duration::ZERO, Duration::ZERO);
        (console, backend)
    }

    fn typed_instance_config() -> InstanceConfig {
        InstanceConfig {
            instance_type: Some("t3.medium".to_string()),
            ..InstanceConfig::default()
        }
    }

    #[tokio::test]
    async fn direct_deploy_launches_max_count_instances() {
        let (console, backend) = backend_with_console();
        let mut instance = typed_instance_config();
        instance.min_count = 2;
        instance.max_count = 3;

        backend
            .deploy(&instance, &ScalingConfig::default(), false)
            .await
            .unwrap();

        assert_eq!(backend.deployed_instance_ids().len(), 3);
        let text = console.output_text();
        assert!(text.contains("Deploying instances directly..."));
        assert!(text.contains("Deployed 3 instances. Instance IDs: i-"));
        assert!(text.contains("Deployment completed successfully"));
        assert!(text.contains("Console Output:"));
    }

    #[tokio::test]
    async fn autoscaling_deploy_creates_template_and_group() {
        let (console, backend) = backend_with_console();
        let mut scaling = ScalingConfig::default();
        scaling.max_size = 4;
        scaling.desired_capacity = 2;

        backend
            .deploy(&typed_instance_config(), &scaling, true)
            .await
            .unwrap();

        assert_eq!(backend.deployed_instance_ids().len(), 2);
        let text = console.output_text();
        assert!(text.contains("Launch Template created with ID: lt-"));
        assert!(text.contains("Auto Scaling Group 'ASG-stackpilot' created successfully."));
        assert!(text.contains("Auto Scaling Group has launched 2 instances."));
    }

    #[tokio::test]
    async fn autoscaling_deploy_without_instance_type_fails() {
        let (_console, backend) = backend_with_console();

        let err = backend
            .deploy(&InstanceConfig::default(), &ScalingConfig::default(), true)
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::LaunchTemplate(_)));
        assert!(backend.deployed_instance_ids().is_empty());
    }

    #[tokio::test]
    async fn zero_desired_capacity_reports_no_instances() {
        let (console, backend) = backend_with_console();
        let mut scaling = ScalingConfig::default();
        scaling.min_size = 0;
        scaling.desired_capacity = 0;

        backend
            .deploy(&typed_instance_config(), &scaling, true)
            .await
            .unwrap();

        assert!(console
            .output_text()
            .contains("No instances have been launched yet by the Auto Scaling Group."));
    }

    #[tokio::test]
    async fn verify_reports_running_for_known_instances() {
        let (_console, backend) = backend_with_console();
        backend
            .deploy(&typed_instance_config(), &ScalingConfig::default(), false)
            .await
            .unwrap();

        let id = backend.deployed_instance_ids()[0].clone();
        assert_eq!(backend.verify_instance(&id).await.unwrap(), "running");

        let err = backend.verify_instance("i-00000000000000000").await.unwrap_err();
        assert!(matches!(err, BackendError::UnknownInstance(_)));
    }

    #[tokio::test]
    async fn stream_logs_rejects_unknown_instance() {
        let (_console, backend) = backend_with_console();
        let err = backend
            .stream_logs("i-deadbeef", Duration::ZERO, Duration::ZERO)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::UnknownInstance(_)));
    }

    #[tokio::test]
    async fn stream_logs_ticks_through_the_window() {
        let (console, backend) = backend_with_console();
        backend
            .deploy(&typed_instance_config(), &ScalingConfig::default(), false)
            .await
            .unwrap();
        let id = backend.deployed_instance_ids()[0].clone();
        let before = console.output().len();

        backend
            .stream_logs(&id, Duration::from_millis(1), Duration::from_millis(3))
            .await
            .unwrap();

        let streamed = console.output().len() - before;
        assert_eq!(streamed, 3);
    }

    #[test]
    fn subnet_and_vpc_ids_look_real() {
        let console = Arc::new(ScriptedConsole::default());
        let backend = SimulatedEc2::new(console);
        assert!(backend.subnet_id().starts_with("subnet-"));
        assert!(backend.vpc_id().starts_with("vpc-"));
    }
}
