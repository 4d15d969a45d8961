//! Interactive loop: one line in, one command out.

use std::{
    io::{self, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::Result;
use client_core::{ControllerEvent, ModeCommand, ModeController, SessionSnapshot};
use shared::InteractionMode;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
    sync::{
        broadcast::{
            self,
            error::{RecvError, TryRecvError},
        },
        oneshot,
    },
    task::{JoinHandle, JoinSet},
};

use crate::{
    controller::{
        events::UiEvent,
        orchestration::{dispatch_mode_command, drain_commands},
    },
    render,
};

const HELP: &str = "\
Type text to submit it from the active tab.
  /tab <chat|summary|grammar|translation>  switch tab
  /file [path]                            select (or clear) the document for Summary
  /send                                   resubmit the active tab's draft
  /show                                   show the active tab
  /history                                show or hide the history
  /export <path>                          write the history as JSON
  /help                                   this text
  /quit                                   leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplAction {
    Update(ModeCommand),
    /// Replace the active draft with this text and submit it.
    SubmitText(String),
    SubmitDraft,
    ToggleHistory,
    Show,
    Export(PathBuf),
    Help,
    Quit,
    Ignore,
}

pub fn parse_line(line: &str) -> Result<ReplAction, String> {
    let line = line.trim_end_matches(|c: char| c == '\r' || c == '\n');
    if line.trim().is_empty() {
        return Ok(ReplAction::Ignore);
    }
    let Some(rest) = line.trim_start().strip_prefix('/') else {
        return Ok(ReplAction::SubmitText(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "tab" => {
            if arg.is_empty() {
                return Err("usage: /tab <chat|summary|grammar|translation>".to_string());
            }
            let mode = arg.parse::<InteractionMode>().map_err(|err| err.to_string())?;
            Ok(ReplAction::Update(ModeCommand::SelectMode { mode }))
        }
        "file" => {
            let path = (!arg.is_empty()).then(|| PathBuf::from(arg));
            Ok(ReplAction::Update(ModeCommand::SelectFile { path }))
        }
        "send" => Ok(ReplAction::SubmitDraft),
        "show" => Ok(ReplAction::Show),
        "history" => Ok(ReplAction::ToggleHistory),
        "export" => {
            if arg.is_empty() {
                return Err("usage: /export <path>".to_string());
            }
            Ok(ReplAction::Export(PathBuf::from(arg)))
        }
        "help" | "?" => Ok(ReplAction::Help),
        "quit" | "exit" => Ok(ReplAction::Quit),
        other => Err(format!("unknown command '/{other}'; try /help")),
    }
}

/// Builds the explicit submit command for `mode` from the current drafts.
pub fn submit_command(mode: InteractionMode, snapshot: &SessionSnapshot) -> ModeCommand {
    let text = snapshot.drafts.text(mode).to_string();
    match mode {
        InteractionMode::Chat => ModeCommand::SubmitChat { text },
        InteractionMode::DocumentQa => ModeCommand::SubmitDocumentQa {
            file: snapshot.drafts.document_file.clone(),
            text,
        },
        InteractionMode::GrammarCheck => ModeCommand::SubmitGrammarCheck { text },
        InteractionMode::Translation => ModeCommand::SubmitTranslation { text },
    }
}

fn print_event(event: ControllerEvent) {
    let event = UiEvent::from_controller_event(event);
    println!("{}", render::render_event(&event));
}

/// Prints controller events until `stop` fires, then flushes whatever is
/// still queued.
fn spawn_event_printer(
    mut events: broadcast::Receiver<ControllerEvent>,
    mut stop: oneshot::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                received = events.recv() => match received {
                    Ok(event) => print_event(event),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "event printer fell behind");
                    }
                    Err(RecvError::Closed) => return,
                },
                _ = &mut stop => break,
            }
        }
        loop {
            match events.try_recv() {
                Ok(event) => print_event(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event printer fell behind");
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    })
}

fn prompt(mode: InteractionMode) {
    print!("askio [{}]> ", mode.display_name());
    let _ = io::stdout().flush();
}

pub async fn run(controller: Arc<ModeController>) -> Result<()> {
    run_with_input(controller, BufReader::new(tokio::io::stdin())).await
}

/// Reads commands from `input` until EOF or `/quit`. Submissions still in
/// flight are awaited, and their events printed, before returning.
pub async fn run_with_input<R>(controller: Arc<ModeController>, input: R) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let (stop_printer, stop) = oneshot::channel();
    let printer = spawn_event_printer(controller.subscribe_events(), stop);
    let mut tasks = JoinSet::new();
    println!("Ask.Io - type /help for commands");
    println!("{}", render::tab_bar(controller.snapshot().await.active_mode));

    let mut lines = input.lines();
    loop {
        while let Some(joined) = tasks.try_join_next() {
            if let Err(err) = joined {
                tracing::warn!("terminal command task failed: {err}");
            }
        }
        prompt(controller.snapshot().await.active_mode);
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let action = match parse_line(&line) {
            Ok(action) => action,
            Err(message) => {
                println!("! {message}");
                continue;
            }
        };

        match action {
            ReplAction::Ignore => {}
            ReplAction::Update(cmd) => {
                controller.handle(cmd).await?;
                println!("{}", render::render_tab(&controller.snapshot().await));
            }
            ReplAction::SubmitText(text) => {
                let mode = controller.snapshot().await.active_mode;
                controller.set_draft(mode, text).await;
                let cmd = submit_command(mode, &controller.snapshot().await);
                dispatch_mode_command(&mut tasks, &controller, cmd);
            }
            ReplAction::SubmitDraft => {
                let snapshot = controller.snapshot().await;
                let cmd = submit_command(snapshot.active_mode, &snapshot);
                dispatch_mode_command(&mut tasks, &controller, cmd);
            }
            ReplAction::ToggleHistory => {
                if controller.toggle_history().await {
                    println!("{}", render::render_history(&controller.history().await));
                } else {
                    println!("(history hidden)");
                }
            }
            ReplAction::Show => {
                let snapshot = controller.snapshot().await;
                println!("{}", render::render_tab(&snapshot));
                if snapshot.show_history {
                    println!("\n{}", render::render_history(&snapshot.history));
                }
            }
            ReplAction::Export(path) => {
                let history = controller.history().await;
                match render::export_history(&history, &path) {
                    Ok(()) => println!("wrote {} entries to {}", history.len(), path.display()),
                    Err(err) => println!("! {err:#}"),
                }
            }
            ReplAction::Help => println!("{HELP}"),
            ReplAction::Quit => break,
        }
    }

    if !tasks.is_empty() {
        println!("waiting for {} pending request(s)...", tasks.len());
    }
    drain_commands(&mut tasks).await;
    let _ = stop_printer.send(());
    printer.await?;
    Ok(())
}
