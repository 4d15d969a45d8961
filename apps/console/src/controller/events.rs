//! Controller events turned into what the terminal shows.

use client_core::{ControllerEvent, DispatchErrorKind, SubmitError};
use shared::{HistoryEntry, InteractionMode};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Waiting(InteractionMode),
    Answer(HistoryEntry),
    Error(UiError),
}

impl UiEvent {
    pub fn from_controller_event(event: ControllerEvent) -> Self {
        match event {
            ControllerEvent::DispatchStarted { mode, .. } => UiEvent::Waiting(mode),
            ControllerEvent::DispatchCompleted { entry, .. } => UiEvent::Answer(entry),
            ControllerEvent::DispatchFailed { error, .. } => {
                UiEvent::Error(UiError::from_submit_error(&SubmitError::Dispatch(error)))
            }
            ControllerEvent::SubmitRejected(err) => UiEvent::Error(UiError::from_submit_error(&err)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Validation,
    Busy,
    Transport,
    Timeout,
    Backend,
    MalformedResponse,
}

#[derive(Debug, Clone)]
pub struct UiError {
    category: UiErrorCategory,
    mode: InteractionMode,
    message: String,
}

impl UiError {
    pub fn from_submit_error(err: &SubmitError) -> Self {
        let category = match err {
            SubmitError::Validation(_) => UiErrorCategory::Validation,
            SubmitError::Busy(_) => UiErrorCategory::Busy,
            SubmitError::Dispatch(dispatch) => match dispatch.kind {
                DispatchErrorKind::Transport => UiErrorCategory::Transport,
                DispatchErrorKind::Timeout => UiErrorCategory::Timeout,
                DispatchErrorKind::HttpStatus => UiErrorCategory::Backend,
                DispatchErrorKind::MalformedResponse => UiErrorCategory::MalformedResponse,
            },
        };

        Self {
            category,
            mode: err.mode(),
            message: err.notification(),
        }
    }

    /// Nothing reached the network; the user has to change their input.
    pub fn is_local(&self) -> bool {
        matches!(
            self.category,
            UiErrorCategory::Validation | UiErrorCategory::Busy
        )
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[cfg(test)]
mod tests {
    use client_core::{DispatchError, ValidationError};

    use super::*;

    #[test]
    fn backend_failures_keep_mode_prefix() {
        let err = SubmitError::Dispatch(DispatchError::http_status(
            InteractionMode::Chat,
            500,
            "overloaded",
        ));
        let ui = UiError::from_submit_error(&err);
        assert_eq!(ui.category(), UiErrorCategory::Backend);
        assert_eq!(ui.message(), "Error in chat: overloaded");
        assert!(!ui.is_local());
    }

    #[test]
    fn missing_file_is_a_local_document_error() {
        let ui = UiError::from_submit_error(&SubmitError::Validation(ValidationError::MissingFile));
        assert_eq!(ui.category(), UiErrorCategory::Validation);
        assert_eq!(ui.mode(), InteractionMode::DocumentQa);
        assert!(ui.is_local());
    }

    #[test]
    fn timeouts_are_classified_from_dispatch_kind() {
        let event = ControllerEvent::DispatchFailed {
            dispatch_id: shared::DispatchId::new(),
            error: DispatchError::timeout(InteractionMode::Translation, "no response"),
        };
        match UiEvent::from_controller_event(event) {
            UiEvent::Error(ui) => {
                assert_eq!(ui.category(), UiErrorCategory::Timeout);
                assert_eq!(ui.message(), "Failed to translate: no response");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
