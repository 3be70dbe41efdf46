//! StackPilot agent — conversational deployment sessions.
//!
//! Wires the intent classifier, instance catalog, and provisioning backend
//! into a turn-by-turn dialogue: one utterance in, one classified intent
//! dispatched, the current deployment configuration echoed back out.

pub mod config;
pub mod console;
pub mod dispatcher;
pub mod logging;
pub mod provision;

pub use config::AgentConfig;
pub use console::{ScriptedConsole, Terminal, UserIo};
pub use dispatcher::Agent;
pub use provision::{BackendError, ProvisioningBackend, SimulatedEc2};
