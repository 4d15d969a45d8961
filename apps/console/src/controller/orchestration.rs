//! Command orchestration from terminal actions to the mode controller.

use std::sync::Arc;

use client_core::{ModeCommand, ModeController};
use tokio::task::JoinSet;

/// Runs `cmd` on its own task so a slow dispatch does not block input.
/// Outcomes reach the user through the controller event stream; `tasks`
/// keeps the work alive until the caller drains it.
pub fn dispatch_mode_command(
    tasks: &mut JoinSet<()>,
    controller: &Arc<ModeController>,
    cmd: ModeCommand,
) {
    let cmd_name = cmd.name();
    let controller = Arc::clone(controller);
    tracing::debug!(command = cmd_name, "queued terminal->controller command");

    tasks.spawn(async move {
        if let Err(err) = controller.handle(cmd).await {
            tracing::debug!(command = cmd_name, "command ended with error: {err}");
        }
    });
}

/// Waits for every queued command to finish.
pub async fn drain_commands(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            tracing::warn!("terminal command task failed: {err}");
        }
    }
}
