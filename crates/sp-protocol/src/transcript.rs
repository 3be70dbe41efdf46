//! Conversation transcript — append-only turn history.
//!
//! The transcript is the model's context on every classification call.
//! Turns are rendered with the endpoint's speaker-tag convention
//! (`<human> … <human_end>` / `<bot> … <bot_end>`) and are never rewritten.

use std::fmt;

use serde::Serialize;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Agent,
}

/// One turn of the conversation: speaker role plus literal text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Agent,
            text: text.into(),
        }
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.speaker {
            Speaker::User => write!(f, "<human> {} <human_end>", self.text),
            Speaker::Agent => write!(f, "<bot> {} <bot_end>", self.text),
        }
    }
}

/// Append-only ordered sequence of turns.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::user(text));
    }

    pub fn push_agent(&mut self, text: impl Into<String>) {
        self.turns.push(Turn::agent(text));
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Render every turn — reflection context.
    pub fn render_full(&self) -> String {
        Self::render(&self.turns)
    }

    /// Render all but the last turn — classification context, where the
    /// final (current) utterance is sent separately as the current query.
    pub fn render_context(&self) -> String {
        match self.turns.split_last() {
            Some((_, rest)) => Self::render(rest),
            None => String::new(),
        }
    }

    fn render(turns: &[Turn]) -> String {
        turns
            .iter()
            .map(Turn::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
