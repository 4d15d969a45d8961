//! Per-session state: drafts, per-mode responses and the shared history log.

use std::{collections::BTreeSet, path::PathBuf};

use serde::Serialize;
use shared::{HistoryEntry, InteractionMode};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Drafts {
    pub chat: String,
    pub document_file: Option<PathBuf>,
    pub document_query: String,
    pub grammar: String,
    pub translation: String,
}

impl Drafts {
    pub fn text(&self, mode: InteractionMode) -> &str {
        match mode {
            InteractionMode::Chat => &self.chat,
            InteractionMode::DocumentQa => &self.document_query,
            InteractionMode::GrammarCheck => &self.grammar,
            InteractionMode::Translation => &self.translation,
        }
    }

    pub fn set_text(&mut self, mode: InteractionMode, text: impl Into<String>) {
        let slot = match mode {
            InteractionMode::Chat => &mut self.chat,
            InteractionMode::DocumentQa => &mut self.document_query,
            InteractionMode::GrammarCheck => &mut self.grammar,
            InteractionMode::Translation => &mut self.translation,
        };
        *slot = text.into();
    }
}

/// Last successful answer per mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ModeResponses {
    pub chat: Option<String>,
    pub document_qa: Option<String>,
    pub grammar_check: Option<String>,
    pub translation: Option<String>,
}

impl ModeResponses {
    pub fn get(&self, mode: InteractionMode) -> Option<&str> {
        match mode {
            InteractionMode::Chat => self.chat.as_deref(),
            InteractionMode::DocumentQa => self.document_qa.as_deref(),
            InteractionMode::GrammarCheck => self.grammar_check.as_deref(),
            InteractionMode::Translation => self.translation.as_deref(),
        }
    }

    fn slot_mut(&mut self, mode: InteractionMode) -> &mut Option<String> {
        match mode {
            InteractionMode::Chat => &mut self.chat,
            InteractionMode::DocumentQa => &mut self.document_qa,
            InteractionMode::GrammarCheck => &mut self.grammar_check,
            InteractionMode::Translation => &mut self.translation,
        }
    }
}

/// Append-only, ordered by completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HistoryLog {
    entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn append(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SessionState {
    pub(crate) active_mode: InteractionMode,
    pub(crate) drafts: Drafts,
    pub(crate) responses: ModeResponses,
    pub(crate) history: HistoryLog,
    pub(crate) show_history: bool,
    pub(crate) in_flight: BTreeSet<InteractionMode>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            active_mode: InteractionMode::Chat,
            drafts: Drafts::default(),
            responses: ModeResponses::default(),
            history: HistoryLog::default(),
            show_history: true,
            in_flight: BTreeSet::new(),
        }
    }
}

impl SessionState {
    /// Marks `mode` as having an outstanding dispatch. Returns `false` when
    /// one is already in flight.
    pub(crate) fn begin_dispatch(&mut self, mode: InteractionMode) -> bool {
        self.in_flight.insert(mode)
    }

    pub(crate) fn finish_dispatch(&mut self, mode: InteractionMode) {
        self.in_flight.remove(&mode);
    }

    /// Applies a successful outcome: response slot and history together.
    pub(crate) fn record_success(
        &mut self,
        mode: InteractionMode,
        question: &str,
        answer: String,
    ) -> HistoryEntry {
        let entry = HistoryEntry::new(mode, question, answer.clone());
        *self.responses.slot_mut(mode) = Some(answer);
        self.history.append(entry.clone());
        if mode == InteractionMode::Chat {
            self.drafts.chat.clear();
        }
        entry
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active_mode: self.active_mode,
            drafts: self.drafts.clone(),
            responses: self.responses.clone(),
            history: self.history.entries().to_vec(),
            show_history: self.show_history,
            in_flight: self.in_flight.iter().copied().collect(),
        }
    }
}

/// Read-only copy handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub active_mode: InteractionMode,
    pub drafts: Drafts,
    pub responses: ModeResponses,
    pub history: Vec<HistoryEntry>,
    pub show_history: bool,
    pub in_flight: Vec<InteractionMode>,
}

impl SessionSnapshot {
    pub fn response(&self, mode: InteractionMode) -> Option<&str> {
        self.responses.get(mode)
    }

    pub fn is_in_flight(&self, mode: InteractionMode) -> bool {
        self.in_flight.contains(&mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_updates_slot_and_log_together() {
        let mut state = SessionState::default();
        state.drafts.set_text(InteractionMode::GrammarCheck, "He go home");

        let entry = state.record_success(
            InteractionMode::GrammarCheck,
            "He go home",
            "He goes home".into(),
        );

        assert_eq!(entry.question, "He go home");
        assert_eq!(state.responses.get(InteractionMode::GrammarCheck), Some("He goes home"));
        assert_eq!(state.history.entries(), &[entry]);
        assert_eq!(state.drafts.grammar, "He go home");
    }

    #[test]
    fn only_chat_draft_is_cleared_on_success() {
        let mut state = SessionState::default();
        state.drafts.set_text(InteractionMode::Chat, "What is 2+2?");
        state.drafts.set_text(InteractionMode::Translation, "Selamat pagi");

        state.record_success(InteractionMode::Chat, "What is 2+2?", "4".into());
        state.record_success(InteractionMode::Translation, "Selamat pagi", "Good morning".into());

        assert!(state.drafts.chat.is_empty());
        assert_eq!(state.drafts.translation, "Selamat pagi");
        assert_eq!(state.history.len(), 2);
    }

    #[test]
    fn begin_dispatch_is_single_flight_per_mode() {
        let mut state = SessionState::default();
        assert!(state.begin_dispatch(InteractionMode::Chat));
        assert!(!state.begin_dispatch(InteractionMode::Chat));
        assert!(state.begin_dispatch(InteractionMode::Translation));

        state.finish_dispatch(InteractionMode::Chat);
        assert!(state.begin_dispatch(InteractionMode::Chat));
    }
}
