//! HTTP client for the language-model endpoint.
//!
//! The endpoint speaks a text-generation wire format: POST
//! `{"inputs": <prompt>, "parameters": {…}}`, reply `[{"generated_text": …}]`.
//! Completions carry a `Call:` prefix by convention; it is stripped before
//! the reply is handed to the call-expression parser.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sp_protocol::{ClassifiedIntent, Transcript};

use crate::error::{InferenceError, InferenceResult};
use crate::parser::parse_call_expression;
use crate::prompt;

/// Configuration for the language-model endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    /// Text-generation endpoint URL.
    #[serde(default = "default_endpoint_url")]
    pub endpoint_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Generation parameters forwarded verbatim to the endpoint.
    #[serde(default)]
    pub parameters: GenerationParams,
}

fn default_endpoint_url() -> String {
    "http://localhost:8080/generate".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint_url: default_endpoint_url(),
            timeout_secs: default_timeout_secs(),
            parameters: GenerationParams::default(),
        }
    }
}

/// Generation parameters sent with every request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_stop")]
    pub stop: Vec<String>,
    #[serde(default)]
    pub do_sample: bool,
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
    #[serde(default)]
    pub return_full_text: bool,
}

fn default_temperature() -> f64 {
    0.001
}
fn default_stop() -> Vec<String> {
    vec!["<bot_end>".into()]
}
fn default_max_new_tokens() -> u32 {
    2048
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            stop: default_stop(),
            do_sample: false,
            max_new_tokens: default_max_new_tokens(),
            return_full_text: false,
        }
    }
}

/// Request body for the endpoint.
#[derive(Serialize)]
struct CompletionRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

/// One completion in the endpoint's reply array.
#[derive(Deserialize)]
struct Completion {
    generated_text: String,
}

/// Classifies user utterances into intents via the language-model endpoint.
pub struct IntentClassifier {
    client: reqwest::Client,
    config: LlmConfig,
}

impl IntentClassifier {
    pub fn new(config: LlmConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .expect("failed to build reqwest client");
        Self { client, config }
    }

    /// Classify the current utterance against the transcript so far.
    ///
    /// The transcript's final turn is the utterance itself; it is excluded
    /// from the rendered history and sent as the current query instead.
    /// Unparseable completions degrade to the out-of-scope sentinel;
    /// transport failures propagate.
    pub async fn classify(
        &self,
        utterance: &str,
        transcript: &Transcript,
    ) -> InferenceResult<ClassifiedIntent> {
        let rendered = prompt::classification_prompt(&transcript.render_context(), utterance);
        let completion = self.complete(&rendered).await?;
        Ok(self.parse_completion(&completion, "classification"))
    }

    /// Second-pass re-classification over the full transcript, including the
    /// just-appended first classification. The result replaces the first
    /// classification entirely at the call site.
    pub async fn reflect(
        &self,
        utterance: &str,
        transcript: &Transcript,
    ) -> InferenceResult<ClassifiedIntent> {
        let rendered = prompt::reflection_prompt(&transcript.render_full(), utterance);
        let completion = self.complete(&rendered).await?;
        Ok(self.parse_completion(&completion, "reflection"))
    }

    fn parse_completion(&self, completion: &str, pass: &str) -> ClassifiedIntent {
        match parse_call_expression(completion) {
            Some(intent) => {
                tracing::info!(%pass, %intent, "parsed intent");
                intent
            }
            None => {
                tracing::info!(
                    %pass,
                    %completion,
                    "completion was not a single call expression, treating as out of scope"
                );
                ClassifiedIntent::out_of_scope()
            }
        }
    }

    /// One synchronous completion call: no retries, the HTTP client's
    /// timeout is the only deadline.
    async fn complete(&self, rendered_prompt: &str) -> InferenceResult<String> {
        let body = CompletionRequest {
            inputs: rendered_prompt,
            parameters: &self.config.parameters,
        };

        let response = self
            .client
            .post(&self.config.endpoint_url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let completions: Vec<Completion> = response.json().await?;
        let first = completions.into_iter().next().ok_or(InferenceError::EmptyReply)?;

        // The endpoint prefixes calls with a "Call:" marker; drop it.
        Ok(first.generated_text.replace("Call:", "").trim().to_string())
    }
}
