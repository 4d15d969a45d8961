use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DispatchId(pub Uuid);

impl DispatchId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DispatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DispatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// The interaction types a user can submit from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    Chat,
    DocumentQa,
    GrammarCheck,
    Translation,
}

impl InteractionMode {
    pub const ALL: [InteractionMode; 4] = [
        InteractionMode::Chat,
        InteractionMode::DocumentQa,
        InteractionMode::GrammarCheck,
        InteractionMode::Translation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionMode::Chat => "chat",
            InteractionMode::DocumentQa => "document_qa",
            InteractionMode::GrammarCheck => "grammar_check",
            InteractionMode::Translation => "translation",
        }
    }

    /// Tab label shown by front ends.
    pub fn display_name(&self) -> &'static str {
        match self {
            InteractionMode::Chat => "Ask.Io",
            InteractionMode::DocumentQa => "Summary",
            InteractionMode::GrammarCheck => "Grammar",
            InteractionMode::Translation => "Translation",
        }
    }

    pub fn takes_file(&self) -> bool {
        matches!(self, InteractionMode::DocumentQa)
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown interaction mode '{0}' (expected chat, summary, grammar or translation)")]
pub struct UnknownMode(pub String);

impl FromStr for InteractionMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "chat" | "ask" | "ask.io" => Ok(InteractionMode::Chat),
            "document_qa" | "document" | "doc" | "summary" | "upload" => {
                Ok(InteractionMode::DocumentQa)
            }
            "grammar_check" | "grammar" => Ok(InteractionMode::GrammarCheck),
            "translation" | "translate" => Ok(InteractionMode::Translation),
            _ => Err(UnknownMode(s.to_string())),
        }
    }
}

/// One completed question/answer exchange. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub mode: InteractionMode,
    pub question: String,
    pub answer: String,
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(mode: InteractionMode, question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            mode,
            question: question.into(),
            answer: answer.into(),
            recorded_at: Utc::now(),
        }
    }
}
