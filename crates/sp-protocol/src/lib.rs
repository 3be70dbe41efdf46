//! Shared types for StackPilot (dialogue agent + inference + catalog).
//!
//! This crate is pure data: deployment configurations with their validation
//! rules, the classified-intent value passed from inference to dispatch, and
//! the append-only conversation transcript. No I/O lives here.

pub mod deploy;
pub mod intent;
pub mod transcript;

pub use deploy::{ConfigError, InstanceConfig, ScalingConfig};
pub use intent::{ClassifiedIntent, IntentArgs, Literal, OUT_OF_SCOPE_INTENT};
pub use transcript::{Speaker, Transcript, Turn};
