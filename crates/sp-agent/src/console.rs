//! User I/O boundary.
//!
//! Every piece of agent-visible output funnels through [`UserIo`] so the
//! terminal can be swapped for a scripted double in tests, the same way the
//! provisioning backend hides behind its own trait.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

/// Line-oriented prompt/response exchange plus the structured-config and
/// free-text sinks.
#[async_trait]
pub trait UserIo: Send + Sync {
    /// Show `prompt` and read one line. `None` signals end of input.
    async fn prompt(&self, prompt: &str) -> std::io::Result<Option<String>>;

    /// Write one line of agent output to the user.
    fn log_to_user(&self, text: &str);

    /// Render a configuration as `field: value` lines under a heading.
    fn display_config(&self, kind: &str, fields: &[(&'static str, String)]) {
        self.log_to_user(&format!("\nRecommended optimized {kind} config:"));
        let rendered = fields
            .iter()
            .map(|(field, value)| format!("{field}: {value}"))
            .collect::<Vec<_>>()
            .join("\n");
        self.log_to_user(&rendered);
    }
}

/// Interactive terminal: prompts on stdout, reads lines from stdin.
pub struct Terminal {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl Terminal {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserIo for Terminal {
    async fn prompt(&self, prompt: &str) -> std::io::Result<Option<String>> {
        {
            let mut stdout = std::io::stdout().lock();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }
        let mut lines = self.lines.lock().await;
        lines.next_line().await
    }

    fn log_to_user(&self, text: &str) {
        println!("{text}");
    }
}

/// Scripted console for tests: canned user inputs, captured agent output.
#[derive(Default)]
pub struct ScriptedConsole {
    inputs: Mutex<VecDeque<String>>,
    output: Mutex<Vec<String>>,
}

impl ScriptedConsole {
    pub fn new(inputs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            inputs: Mutex::new(inputs.into_iter().map(Into::into).collect()),
            output: Mutex::new(Vec::new()),
        }
    }

    /// Everything the agent wrote, in order.
    pub fn output(&self) -> Vec<String> {
        self.output.lock().unwrap().clone()
    }

    /// Whole captured output as one string, for substring assertions.
    pub fn output_text(&self) -> String {
        self.output().join("\n")
    }
}

#[async_trait]
impl UserIo for ScriptedConsole {
    async fn prompt(&self, _prompt: &str) -> std::io::Result<Option<String>> {
        Ok(self.inputs.lock().unwrap().pop_front())
    }

    fn log_to_user(&self, text: &str) {
        self.output.lock().unwrap().push(text.to_string());
    }
}
