//! Deployment configurations — instance and scaling-group.
//!
//! Both kinds follow the same contract: a closed field set fixed at compile
//! time, a complete value for every field at all times, and atomic partial
//! updates. `apply_partial_update` folds a classifier argument map into a
//! candidate copy, reports unknown or mistyped fields through the rejection
//! callback without aborting the rest, then validates the whole candidate
//! before committing — on a validation failure the previous state survives
//! untouched.
//!
//! Field names in update maps and display output are the provisioning wire
//! names (`MinCount`, `DesiredCapacity`, …) since those are what the intent
//! catalog teaches the model.

use serde::Serialize;
use thiserror::Error;

use crate::intent::{IntentArgs, Literal};

/// Validation failures for deployment configurations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("MinCount ({min}) must not exceed MaxCount ({max})")]
    InstanceCountOrdering { min: i64, max: i64 },

    #[error("{field} must be at least 1, got {value}")]
    CountTooSmall { field: &'static str, value: i64 },

    #[error("MinSize ({min}) must not exceed MaxSize ({max})")]
    GroupSizeOrdering { min: i64, max: i64 },

    #[error("DesiredCapacity ({desired}) must lie between MinSize ({min}) and MaxSize ({max})")]
    DesiredCapacityOutOfRange { desired: i64, min: i64, max: i64 },

    #[error("{field} must not be negative, got {value}")]
    NegativeSize { field: &'static str, value: i64 },

    #[error("AvailabilityZones must name at least one zone")]
    NoAvailabilityZones,
}

/// Callback invoked once per rejected field or failed validation, with a
/// user-presentable message.
pub type RejectionSink<'a> = &'a mut dyn FnMut(&str);

fn reject_type(on_rejection: RejectionSink<'_>, field: &str, expected: &str, got: &Literal) {
    on_rejection(&format!(
        "{field} expects {expected}, got {} ({got})",
        got.type_name()
    ));
}

fn reject_unknown(on_rejection: RejectionSink<'_>, kind: &str, field: &str) {
    on_rejection(&format!(
        "{kind} configuration has no field named '{field}'. Please select a valid parameter to modify."
    ));
}

// ── Instance configuration ──────────────────────────────────────

/// Configuration for directly-launched instances, and the source of the
/// launch template when autoscaling is enabled.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstanceConfig {
    /// Selected instance type. Starts unset; excluded from display until the
    /// lookup (or the user) picks one.
    pub instance_type: Option<String>,
    pub image_id: String,
    pub min_count: i64,
    pub max_count: i64,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            instance_type: None,
            image_id: "ami-0984f4b9e98be44bf".to_string(),
            min_count: 1,
            max_count: 1,
        }
    }
}

impl InstanceConfig {
    /// Construct with explicit counts, failing fast on an invalid state.
    pub fn new(
        instance_type: Option<String>,
        image_id: impl Into<String>,
        min_count: i64,
        max_count: i64,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            instance_type,
            image_id: image_id.into(),
            min_count,
            max_count,
        };
        config.validate()?;
        Ok(config)
    }

    /// Cross-field invariants. Holds for every reachable instance by
    /// construction; re-checked on each prospective update.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("MinCount", self.min_count), ("MaxCount", self.max_count)] {
            if value < 1 {
                return Err(ConfigError::CountTooSmall { field, value });
            }
        }
        if self.min_count > self.max_count {
            return Err(ConfigError::InstanceCountOrdering {
                min: self.min_count,
                max: self.max_count,
            });
        }
        Ok(())
    }

    /// Display mapping: every set field in declaration order, unset fields
    /// excluded.
    pub fn to_display_map(&self) -> Vec<(&'static str, String)> {
        let mut fields = Vec::with_capacity(4);
        if let Some(instance_type) = &self.instance_type {
            fields.push(("InstanceType", instance_type.clone()));
        }
        fields.push(("ImageId", self.image_id.clone()));
        fields.push(("MinCount", self.min_count.to_string()));
        fields.push(("MaxCount", self.max_count.to_string()));
        fields
    }

    /// Fold a partial update into this configuration, all-or-nothing.
    pub fn apply_partial_update(&mut self, updates: &IntentArgs, on_rejection: RejectionSink<'_>) {
        let mut candidate = self.clone();

        for (key, value) in updates {
            if value.is_unset() {
                continue;
            }
            match key.as_str() {
                "InstanceType" => match value.as_str() {
                    Some(s) => candidate.instance_type = Some(s.to_string()),
                    None => reject_type(on_rejection, "InstanceType", "a string", value),
                },
                "ImageId" => match value.as_str() {
                    Some(s) => candidate.image_id = s.to_string(),
                    None => reject_type(on_rejection, "ImageId", "a string", value),
                },
                "MinCount" => match value.as_i64() {
                    Some(n) => candidate.min_count = n,
                    None => reject_type(on_rejection, "MinCount", "an integer", value),
                },
                "MaxCount" => match value.as_i64() {
                    Some(n) => candidate.max_count = n,
                    None => reject_type(on_rejection, "MaxCount", "an integer", value),
                },
                other => reject_unknown(on_rejection, "instance", other),
            }
        }

        match candidate.validate() {
            Ok(()) => *self = candidate,
            Err(err) => on_rejection(&err.to_string()),
        }
    }
}

// ── Scaling-group configuration ─────────────────────────────────

/// Configuration for the autoscaling group, used only when autoscaling is
/// enabled for the session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalingConfig {
    pub min_size: i64,
    pub max_size: i64,
    pub desired_capacity: i64,
    pub launch_template_name: String,
    pub vpc_zone_identifier: String,
    pub availability_zones: Vec<String>,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_size: 1,
            max_size: 1,
            desired_capacity: 1,
            launch_template_name: "stackpilot".to_string(),
            vpc_zone_identifier: "subnet-placeholder".to_string(),
            availability_zones: vec!["us-east-1a".to_string()],
        }
    }
}

impl ScalingConfig {
    /// Construct with explicit sizes (other fields defaulted), failing fast
    /// on an invalid state.
    pub fn new(min_size: i64, max_size: i64, desired_capacity: i64) -> Result<Self, ConfigError> {
        let config = Self {
            min_size,
            max_size,
            desired_capacity,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("MinSize", self.min_size),
            ("MaxSize", self.max_size),
            ("DesiredCapacity", self.desired_capacity),
        ] {
            if value < 0 {
                return Err(ConfigError::NegativeSize { field, value });
            }
        }
        if self.min_size > self.max_size {
            return Err(ConfigError::GroupSizeOrdering {
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.desired_capacity < self.min_size || self.desired_capacity > self.max_size {
            return Err(ConfigError::DesiredCapacityOutOfRange {
                desired: self.desired_capacity,
                min: self.min_size,
                max: self.max_size,
            });
        }
        if self.availability_zones.is_empty() {
            return Err(ConfigError::NoAvailabilityZones);
        }
        Ok(())
    }

    pub fn to_display_map(&self) -> Vec<(&'static str, String)> {
        vec![
            ("MinSize", self.min_size.to_string()),
            ("MaxSize", self.max_size.to_string()),
            ("DesiredCapacity", self.desired_capacity.to_string()),
            ("LaunchTemplateName", self.launch_template_name.clone()),
            ("VPCZoneIdentifier", self.vpc_zone_identifier.clone()),
            ("AvailabilityZones", self.availability_zones.join(", ")),
        ]
    }

    /// Fold a partial update into this configuration, all-or-nothing.
    pub fn apply_partial_update(&mut self, updates: &IntentArgs, on_rejection: RejectionSink<'_>) {
        let mut candidate = self.clone();

        for (key, value) in updates {
            if value.is_unset() {
                continue;
            }
            match key.as_str() {
                "MinSize" => match value.as_i64() {
                    Some(n) => candidate.min_size = n,
                    None => reject_type(on_rejection, "MinSize", "an integer", value),
                },
                "MaxSize" => match value.as_i64() {
                    Some(n) => candidate.max_size = n,
                    None => reject_type(on_rejection, "MaxSize", "an integer", value),
                },
                "DesiredCapacity" => match value.as_i64() {
                    Some(n) => candidate.desired_capacity = n,
                    None => reject_type(on_rejection, "DesiredCapacity", "an integer", value),
                },
                "LaunchTemplateName" => match value.as_str() {
                    Some(s) => candidate.launch_template_name = s.to_string(),
                    None => reject_type(on_rejection, "LaunchTemplateName", "a string", value),
                },
                "VPCZoneIdentifier" => match value.as_str() {
                    Some(s) => candidate.vpc_zone_identifier = s.to_string(),
                    None => reject_type(on_rejection, "VPCZoneIdentifier", "a string", value),
                },
                "AvailabilityZones" => match value.as_string_list() {
                    Some(zones) => candidate.availability_zones = zones,
                    None => {
                        reject_type(on_rejection, "AvailabilityZones", "a list of zones", value);
                    }
                },
                other => reject_unknown(on_rejection, "autoscaling", other),
            }
        }

        match candidate.validate() {
            Ok(()) => *self = candidate,
            Err(err) => on_rejection(&err.to_string()),
        }
    }
}
