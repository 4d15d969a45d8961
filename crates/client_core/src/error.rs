use std::path::PathBuf;

use shared::InteractionMode;
use thiserror::Error;

/// Missing or unusable input, detected before anything reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", empty_query_message(*mode))]
    EmptyQuery { mode: InteractionMode },
    #[error("Please upload a file before analyzing.")]
    MissingFile,
    #[error("Unable to read file '{}': {reason}", path.display())]
    UnreadableFile { path: PathBuf, reason: String },
}

impl ValidationError {
    pub fn mode(&self) -> InteractionMode {
        match self {
            ValidationError::EmptyQuery { mode } => *mode,
            ValidationError::MissingFile | ValidationError::UnreadableFile { .. } => {
                InteractionMode::DocumentQa
            }
        }
    }
}

fn empty_query_message(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Chat => "Please provide a question to chat.",
        InteractionMode::DocumentQa => "Please provide a question to analyze.",
        InteractionMode::GrammarCheck => "Please provide text for grammar checking.",
        InteractionMode::Translation => "Please provide text to translate.",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchErrorKind {
    Transport,
    HttpStatus,
    Timeout,
    MalformedResponse,
}

/// A dispatch that reached (or tried to reach) the backend and failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{mode} dispatch failed ({kind:?}): {message}")]
pub struct DispatchError {
    pub mode: InteractionMode,
    pub kind: DispatchErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl DispatchError {
    pub fn new(mode: InteractionMode, kind: DispatchErrorKind, message: impl Into<String>) -> Self {
        Self {
            mode,
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn http_status(mode: InteractionMode, status: u16, message: impl Into<String>) -> Self {
        Self {
            mode,
            kind: DispatchErrorKind::HttpStatus,
            status: Some(status),
            message: message.into(),
        }
    }

    pub fn timeout(mode: InteractionMode, message: impl Into<String>) -> Self {
        Self::new(mode, DispatchErrorKind::Timeout, message)
    }

    /// Text shown to the user, prefixed per mode.
    pub fn notification(&self) -> String {
        let prefix = match self.mode {
            InteractionMode::Chat => "Error in chat",
            InteractionMode::DocumentQa => "Error processing file",
            InteractionMode::GrammarCheck => "Failed to check grammar",
            InteractionMode::Translation => "Failed to translate",
        };
        format!("{prefix}: {}", self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("a {0} request is already in flight")]
    Busy(InteractionMode),
}

impl SubmitError {
    pub fn mode(&self) -> InteractionMode {
        match self {
            SubmitError::Validation(err) => err.mode(),
            SubmitError::Dispatch(err) => err.mode,
            SubmitError::Busy(mode) => *mode,
        }
    }

    /// User-facing text for this failure.
    pub fn notification(&self) -> String {
        match self {
            SubmitError::Validation(err) => err.to_string(),
            SubmitError::Dispatch(err) => err.notification(),
            SubmitError::Busy(mode) => format!(
                "{} is still waiting for the previous answer; try again when it completes.",
                mode.display_name()
            ),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid backend url '{url}': {reason}")]
    InvalidBackendUrl { url: String, reason: String },
    #[error("request timeout must be greater than zero")]
    ZeroTimeout,
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
