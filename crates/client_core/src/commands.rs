//! Commands queued from presentation layers into the mode controller.

use std::path::PathBuf;

use shared::{HistoryEntry, InteractionMode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModeCommand {
    SetDraft {
        mode: InteractionMode,
        text: String,
    },
    SelectFile {
        path: Option<PathBuf>,
    },
    SelectMode {
        mode: InteractionMode,
    },
    ToggleHistory,
    SubmitChat {
        text: String,
    },
    SubmitDocumentQa {
        file: Option<PathBuf>,
        text: String,
    },
    SubmitGrammarCheck {
        text: String,
    },
    SubmitTranslation {
        text: String,
    },
    /// Submit the active mode's current draft.
    SubmitActive,
}

impl ModeCommand {
    pub fn name(&self) -> &'static str {
        match self {
            ModeCommand::SetDraft { .. } => "set_draft",
            ModeCommand::SelectFile { .. } => "select_file",
            ModeCommand::SelectMode { .. } => "select_mode",
            ModeCommand::ToggleHistory => "toggle_history",
            ModeCommand::SubmitChat { .. } => "submit_chat",
            ModeCommand::SubmitDocumentQa { .. } => "submit_document_qa",
            ModeCommand::SubmitGrammarCheck { .. } => "submit_grammar_check",
            ModeCommand::SubmitTranslation { .. } => "submit_translation",
            ModeCommand::SubmitActive => "submit_active",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Updated,
    HistoryVisibility(bool),
    Completed(HistoryEntry),
}
