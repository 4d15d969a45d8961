//! Mode controller: input validation, dispatch, and outcome reconciliation.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use shared::{DispatchId, HistoryEntry, InteractionMode};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, info_span, warn, Instrument};

use crate::{
    backend::{Backend, DispatchRequest, DocumentUpload, HttpBackend},
    commands::{CommandOutcome, ModeCommand},
    config::ClientSettings,
    error::{ConfigError, DispatchError, DispatchErrorKind, SubmitError, ValidationError},
    session::{Drafts, SessionSnapshot, SessionState},
};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    DispatchStarted {
        dispatch_id: DispatchId,
        mode: InteractionMode,
    },
    DispatchCompleted {
        dispatch_id: DispatchId,
        entry: HistoryEntry,
    },
    DispatchFailed {
        dispatch_id: DispatchId,
        error: DispatchError,
    },
    /// Submit refused locally; nothing was sent.
    SubmitRejected(SubmitError),
}

pub struct ModeController {
    backend: Arc<dyn Backend>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<ControllerEvent>,
}

/// Work handed to the dispatch task once the mode has been claimed.
enum PendingDispatch {
    Ready(DispatchRequest),
    /// The document is read inside the task, at dispatch time.
    Document { path: PathBuf, query: String },
}

impl PendingDispatch {
    fn mode(&self) -> InteractionMode {
        match self {
            PendingDispatch::Ready(request) => request.mode(),
            PendingDispatch::Document { .. } => InteractionMode::DocumentQa,
        }
    }
}

impl ModeController {
    pub fn new(backend: Arc<dyn Backend>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Arc::new(Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::default())),
            events,
        })
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Arc<Self>, ConfigError> {
        let backend = HttpBackend::new(settings)?;
        info!(backend_url = %backend.base_url(), "mode controller ready");
        Ok(Self::new(Arc::new(backend)))
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.state.lock().await.snapshot()
    }

    pub async fn history(&self) -> Vec<HistoryEntry> {
        self.state.lock().await.history.entries().to_vec()
    }

    pub async fn set_draft(&self, mode: InteractionMode, text: impl Into<String>) {
        self.state.lock().await.drafts.set_text(mode, text);
    }

    pub async fn select_file(&self, path: Option<PathBuf>) {
        self.state.lock().await.drafts.document_file = path;
    }

    pub async fn select_mode(&self, mode: InteractionMode) {
        self.state.lock().await.active_mode = mode;
    }

    /// Flips history visibility and returns the new value. The log itself is
    /// never touched.
    pub async fn toggle_history(&self) -> bool {
        let mut state = self.state.lock().await;
        state.show_history = !state.show_history;
        state.show_history
    }

    pub async fn handle(&self, command: ModeCommand) -> Result<CommandOutcome, SubmitError> {
        debug!(command = command.name(), "handling mode command");
        let entry = match command {
            ModeCommand::SetDraft { mode, text } => {
                self.set_draft(mode, text).await;
                return Ok(CommandOutcome::Updated);
            }
            ModeCommand::SelectFile { path } => {
                self.select_file(path).await;
                return Ok(CommandOutcome::Updated);
            }
            ModeCommand::SelectMode { mode } => {
                self.select_mode(mode).await;
                return Ok(CommandOutcome::Updated);
            }
            ModeCommand::ToggleHistory => {
                return Ok(CommandOutcome::HistoryVisibility(self.toggle_history().await));
            }
            ModeCommand::SubmitChat { text } => self.submit_chat(&text).await?,
            ModeCommand::SubmitDocumentQa { file, text } => {
                self.submit_document_qa(file.as_deref(), &text).await?
            }
            ModeCommand::SubmitGrammarCheck { text } => self.submit_grammar_check(&text).await?,
            ModeCommand::SubmitTranslation { text } => self.submit_translation(&text).await?,
            ModeCommand::SubmitActive => self.submit_active().await?,
        };
        Ok(CommandOutcome::Completed(entry))
    }

    pub async fn submit_chat(&self, text: &str) -> Result<HistoryEntry, SubmitError> {
        let query = self.require_text(InteractionMode::Chat, text)?;
        self.begin(InteractionMode::Chat).await?;
        self.execute(PendingDispatch::Ready(DispatchRequest::Chat { query }))
            .await
    }

    /// The missing-file check runs before the empty-question check.
    pub async fn submit_document_qa(
        &self,
        file: Option<&Path>,
        text: &str,
    ) -> Result<HistoryEntry, SubmitError> {
        let Some(path) = file else {
            return Err(self.reject(ValidationError::MissingFile.into()));
        };
        let query = self.require_text(InteractionMode::DocumentQa, text)?;
        self.begin(InteractionMode::DocumentQa).await?;
        self.execute(PendingDispatch::Document {
            path: path.to_path_buf(),
            query,
        })
        .await
    }

    pub async fn submit_grammar_check(&self, text: &str) -> Result<HistoryEntry, SubmitError> {
        let query = self.require_text(InteractionMode::GrammarCheck, text)?;
        self.begin(InteractionMode::GrammarCheck).await?;
        self.execute(PendingDispatch::Ready(DispatchRequest::GrammarCheck { query }))
            .await
    }

    pub async fn submit_translation(&self, text: &str) -> Result<HistoryEntry, SubmitError> {
        let query = self.require_text(InteractionMode::Translation, text)?;
        self.begin(InteractionMode::Translation).await?;
        self.execute(PendingDispatch::Ready(DispatchRequest::Translation { query }))
            .await
    }

    pub async fn submit_active(&self) -> Result<HistoryEntry, SubmitError> {
        let (mode, drafts) = {
            let state = self.state.lock().await;
            (state.active_mode, state.drafts.clone())
        };
        self.submit_draft(mode, drafts).await
    }

    /// Submits the stored draft of `mode`, whichever tab is active.
    pub async fn submit_mode(&self, mode: InteractionMode) -> Result<HistoryEntry, SubmitError> {
        let drafts = self.state.lock().await.drafts.clone();
        self.submit_draft(mode, drafts).await
    }

    async fn submit_draft(
        &self,
        mode: InteractionMode,
        drafts: Drafts,
    ) -> Result<HistoryEntry, SubmitError> {
        match mode {
            InteractionMode::Chat => self.submit_chat(&drafts.chat).await,
            InteractionMode::DocumentQa => {
                self.submit_document_qa(drafts.document_file.as_deref(), &drafts.document_query)
                    .await
            }
            InteractionMode::GrammarCheck => self.submit_grammar_check(&drafts.grammar).await,
            InteractionMode::Translation => self.submit_translation(&drafts.translation).await,
        }
    }

    fn require_text(&self, mode: InteractionMode, text: &str) -> Result<String, SubmitError> {
        if text.trim().is_empty() {
            return Err(self.reject(ValidationError::EmptyQuery { mode }.into()));
        }
        Ok(text.to_string())
    }

    fn reject(&self, err: SubmitError) -> SubmitError {
        reject(&self.events, err)
    }

    async fn begin(&self, mode: InteractionMode) -> Result<(), SubmitError> {
        let started = self.state.lock().await.begin_dispatch(mode);
        if started {
            Ok(())
        } else {
            Err(self.reject(SubmitError::Busy(mode)))
        }
    }

    /// Runs one dispatch. The caller must have claimed the mode with `begin`.
    ///
    /// The work runs on its own task, so dropping the returned future does
    /// not abandon the dispatch: it still completes, records its outcome and
    /// releases the mode.
    async fn execute(&self, pending: PendingDispatch) -> Result<HistoryEntry, SubmitError> {
        let mode = pending.mode();
        let task = tokio::spawn(run_dispatch(
            Arc::clone(&self.backend),
            Arc::clone(&self.state),
            self.events.clone(),
            pending,
        ));

        match task.await {
            Ok(outcome) => outcome,
            Err(err) => {
                self.state.lock().await.finish_dispatch(mode);
                warn!(%mode, "dispatch task ended abnormally: {err}");
                Err(DispatchError::new(
                    mode,
                    DispatchErrorKind::Transport,
                    format!("dispatch task failed: {err}"),
                )
                .into())
            }
        }
    }
}

fn reject(events: &broadcast::Sender<ControllerEvent>, err: SubmitError) -> SubmitError {
    warn!(mode = %err.mode(), "submit rejected: {err}");
    let _ = events.send(ControllerEvent::SubmitRejected(err.clone()));
    err
}

async fn run_dispatch(
    backend: Arc<dyn Backend>,
    state: Arc<Mutex<SessionState>>,
    events: broadcast::Sender<ControllerEvent>,
    pending: PendingDispatch,
) -> Result<HistoryEntry, SubmitError> {
    let request = match pending {
        PendingDispatch::Ready(request) => request,
        PendingDispatch::Document { path, query } => match read_document(&path).await {
            Ok(document) => DispatchRequest::DocumentQa { document, query },
            Err(err) => {
                state
                    .lock()
                    .await
                    .finish_dispatch(InteractionMode::DocumentQa);
                return Err(reject(&events, err.into()));
            }
        },
    };

    let mode = request.mode();
    let question = request.question().to_string();
    let dispatch_id = DispatchId::new();
    let _ = events.send(ControllerEvent::DispatchStarted { dispatch_id, mode });

    let outcome = backend
        .dispatch(request)
        .instrument(info_span!("dispatch", %mode, %dispatch_id))
        .await;

    let mut state = state.lock().await;
    state.finish_dispatch(mode);
    match outcome {
        Ok(answer) => {
            let entry = state.record_success(mode, &question, answer);
            let history_len = state.history.len();
            drop(state);

            info!(%mode, %dispatch_id, history_len, "dispatch completed");
            let _ = events.send(ControllerEvent::DispatchCompleted {
                dispatch_id,
                entry: entry.clone(),
            });
            Ok(entry)
        }
        Err(err) => {
            drop(state);

            warn!(%mode, %dispatch_id, kind = ?err.kind, "dispatch failed: {}", err.message);
            let _ = events.send(ControllerEvent::DispatchFailed {
                dispatch_id,
                error: err.clone(),
            });
            Err(err.into())
        }
    }
}

async fn read_document(path: &Path) -> Result<DocumentUpload, ValidationError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| ValidationError::UnreadableFile {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(DocumentUpload::new(file_name, bytes))
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
