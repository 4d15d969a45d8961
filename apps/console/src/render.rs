use std::{fs, path::Path};

use anyhow::Context;
use client_core::SessionSnapshot;
use shared::{HistoryEntry, InteractionMode};

use crate::controller::events::{UiError, UiErrorCategory, UiEvent};

pub fn response_heading(mode: InteractionMode) -> &'static str {
    match mode {
        InteractionMode::Chat | InteractionMode::DocumentQa => "Response",
        InteractionMode::GrammarCheck => "Corrected Text",
        InteractionMode::Translation => "English Translation",
    }
}

pub fn tab_bar(active: InteractionMode) -> String {
    InteractionMode::ALL
        .iter()
        .map(|mode| {
            if *mode == active {
                format!("[{}]", mode.display_name())
            } else {
                mode.display_name().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("  ")
}

pub fn render_history(entries: &[HistoryEntry]) -> String {
    if entries.is_empty() {
        return "No history available".to_string();
    }
    entries
        .iter()
        .map(|entry| format!("Q: {}\nA: {}", entry.question, entry.answer))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The active tab: its draft, selected file, last response and status.
pub fn render_tab(snapshot: &SessionSnapshot) -> String {
    let mode = snapshot.active_mode;
    let mut lines = vec![tab_bar(mode)];

    if mode.takes_file() {
        let file = snapshot
            .drafts
            .document_file
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "(none)".to_string());
        lines.push(format!("File: {file}"));
    }
    lines.push(format!("Draft: {}", snapshot.drafts.text(mode)));
    if snapshot.is_in_flight(mode) {
        lines.push("Waiting for the backend...".to_string());
    }
    if let Some(response) = snapshot.response(mode) {
        lines.push(format!("{}: {response}", response_heading(mode)));
    }
    lines.join("\n")
}

pub fn render_event(event: &UiEvent) -> String {
    match event {
        UiEvent::Waiting(mode) => format!("... {} is thinking", mode.display_name()),
        UiEvent::Answer(entry) => format!(
            "[{}] {}: {}",
            entry.mode.display_name(),
            response_heading(entry.mode),
            entry.answer
        ),
        UiEvent::Error(err) => render_error(err),
    }
}

pub fn render_error(err: &UiError) -> String {
    if err.is_local() {
        return format!("! {}", err.message());
    }
    let hint = match err.category() {
        UiErrorCategory::Transport | UiErrorCategory::Timeout => " (check the backend and retry)",
        _ => "",
    };
    format!("x [{}] {}{hint}", err.mode().display_name(), err.message())
}

pub fn export_history(entries: &[HistoryEntry], path: &Path) -> anyhow::Result<()> {
    let raw = serde_json::to_string_pretty(entries).context("failed to encode history")?;
    fs::write(path, raw)
        .with_context(|| format!("failed to write history to '{}'", path.display()))?;
    Ok(())
}
