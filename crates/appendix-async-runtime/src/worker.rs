use appendix_batch::{BatchOptions, ExecutionHost, InputFile, RunEvent, Session};
use std::path::PathBuf;
use tokio::sync::mpsc;

use crate::{BatchCommand, BatchUpdate};

/// Async worker task that owns a session and processes batch commands
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<BatchCommand>,
    update_tx: mpsc::UnboundedSender<BatchUpdate>,
    host: ExecutionHost,
) {
    let session = Session::new(host);

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &session, &mut command_rx, &update_tx).await;
    }
}

async fn process_command(
    cmd: BatchCommand,
    session: &Session,
    command_rx: &mut mpsc::UnboundedReceiver<BatchCommand>,
    update_tx: &mpsc::UnboundedSender<BatchUpdate>,
) {
    match cmd {
        BatchCommand::Enqueue { paths } => {
            let added = paths.len();
            let total = session.enqueue(paths.into_iter().map(InputFile::from_path));
            let _ = update_tx.send(BatchUpdate::Queued { added, total });
        }
        BatchCommand::ClearQueue => {
            session.clear();
            let _ = update_tx.send(BatchUpdate::Cleared);
        }
        BatchCommand::Run { options } => {
            handle_run(options, session, update_tx).await;

            // Runs requested while this one was in flight are dropped
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let BatchCommand::Run { .. } = next_cmd {
                    log::debug!("Discarding run requested during a run");
                } else {
                    Box::pin(process_command(next_cmd, session, command_rx, update_tx)).await;
                }
            }
        }
        BatchCommand::Save { dir } => {
            let update = match session.save_outputs(&dir).await {
                Ok(paths) => BatchUpdate::Saved { paths },
                Err(e) => error_update(format!("Failed to save outputs: {e}")),
            };
            let _ = update_tx.send(update);
        }
        BatchCommand::Bundle { output_path } => {
            let _ = update_tx.send(handle_bundle(output_path, session).await);
        }
    }
}

async fn handle_run(
    options: BatchOptions,
    session: &Session,
    update_tx: &mpsc::UnboundedSender<BatchUpdate>,
) {
    let mut done = 0;
    let mut total = 0;
    let forward = |event: RunEvent| {
        let update = match event {
            RunEvent::Planned { total_pages, .. } => {
                total = total_pages;
                BatchUpdate::Progress {
                    operation: "Scanning files".to_string(),
                    current: 0,
                    total,
                }
            }
            RunEvent::Rendering { number, .. } => BatchUpdate::Progress {
                operation: format!("Saving batch {number:03}"),
                current: done,
                total,
            },
            RunEvent::Saved { file_name, pages } => BatchUpdate::BatchSaved { file_name, pages },
            RunEvent::Progress(progress) => {
                done = progress.pages_rendered;
                BatchUpdate::Progress {
                    operation: "Rendering".to_string(),
                    current: done,
                    total: progress.total_planned_pages,
                }
            }
        };
        let _ = update_tx.send(update);
    };

    let update = match session.run(&options, forward).await {
        Ok(Some(report)) => BatchUpdate::RunComplete {
            batches: report.artifacts.len(),
            pages: report.pages_rendered,
            issues: report.issues,
        },
        Ok(None) => return,
        Err(failure) => error_update(failure.to_string()),
    };
    let _ = update_tx.send(update);
}

async fn handle_bundle(output_path: PathBuf, session: &Session) -> BatchUpdate {
    let archive = match session.bundle() {
        Ok(archive) => archive,
        Err(e) => return error_update(format!("Failed to bundle outputs: {e}")),
    };
    match tokio::fs::write(&output_path, archive).await {
        Ok(()) => BatchUpdate::Bundled { path: output_path },
        Err(e) => error_update(format!("Failed to write {}: {e}", output_path.display())),
    }
}

fn error_update(message: String) -> BatchUpdate {
    log::error!("{message}");
    BatchUpdate::Error { message }
}
