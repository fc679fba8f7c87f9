//! Run driver
//!
//! The assembler takes an immutable snapshot of queued files through the
//! whole pipeline:
//! 1. Parse names, sort and group ([`crate::group`])
//! 2. Read bytes and pre-count pages ([`io::prepare_groups`])
//! 3. Plan batches under the page budget ([`crate::plan`])
//! 4. Render each batch in order on the [`ExecutionHost`]
//! 5. Collect artifacts, manifest rows and non-fatal issues

mod batch;
mod io;

pub use batch::{RenderedBatch, RenderedUnit, render_batch};
pub use io::{prepare_groups, save_artifact, save_bundle, save_outputs};

use crate::group::{InputFile, sort_into_groups};
use crate::host::ExecutionHost;
use crate::manifest::Manifest;
use crate::options::BatchOptions;
use crate::plan::plan_batches;
use crate::types::*;
use std::sync::Arc;
use thiserror::Error;

/// A finished batch document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    pub number: usize,
    /// `batch_NNN.pdf`
    pub file_name: String,
    pub bytes: Arc<[u8]>,
    pub pages: usize,
    /// Label of the first appendix rendered into it
    pub start_label: String,
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub appendices: usize,
    pub artifacts: Vec<OutputArtifact>,
    pub manifest: Manifest,
    pub issues: Vec<RunIssue>,
    pub total_planned_pages: usize,
    pub pages_rendered: usize,
}

impl RunReport {
    pub fn progress(&self) -> Progress {
        Progress {
            pages_rendered: self.pages_rendered,
            total_planned_pages: self.total_planned_pages,
        }
    }
}

/// A run that stopped on a fatal error.
///
/// `partial` holds whatever was produced before the failure: issues always,
/// and any batches finished before rendering broke.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct RunFailure {
    pub error: BatchError,
    pub partial: RunReport,
}

impl From<RunFailure> for BatchError {
    fn from(failure: RunFailure) -> Self {
        failure.error
    }
}

/// Milestones reported while a run is in flight
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Planned {
        appendices: usize,
        batches: usize,
        total_pages: usize,
    },
    Rendering {
        number: usize,
        start_label: String,
        planned_pages: usize,
    },
    Saved {
        file_name: String,
        pages: usize,
    },
    Progress(Progress),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchAssembler {
    host: ExecutionHost,
}

impl BatchAssembler {
    pub fn new(host: ExecutionHost) -> Self {
        Self { host }
    }

    /// Run the full pipeline over `files`.
    ///
    /// Batches render strictly one after another; `on_event` sees every
    /// milestone in order.
    pub async fn run(
        &self,
        files: &[InputFile],
        options: &BatchOptions,
        mut on_event: impl FnMut(RunEvent),
    ) -> std::result::Result<RunReport, RunFailure> {
        let mut report = RunReport::default();

        if files.is_empty() {
            return Err(RunFailure {
                error: BatchError::Config("Select or drop files first".to_string()),
                partial: report,
            });
        }

        let (groups, issues) = sort_into_groups(files);
        report.issues.extend(issues);
        report.appendices = groups.len();
        log::info!("Found {} appendices", groups.len());

        let (prepared, issues) = prepare_groups(groups).await;
        report.issues.extend(issues);

        let plan = match plan_batches(prepared, options.effective_target_pages()) {
            Ok(plan) => plan,
            Err(error) => {
                log::error!("ERROR: {error}.");
                return Err(RunFailure {
                    error,
                    partial: report,
                });
            }
        };

        report.total_planned_pages = plan.total_pages;
        on_event(RunEvent::Planned {
            appendices: report.appendices,
            batches: plan.batches.len(),
            total_pages: plan.total_pages,
        });
        on_event(RunEvent::Progress(report.progress()));

        for batch in plan.batches {
            let number = batch.number;
            let start_label = batch.start_label.clone();
            log::info!(
                "Rendering batch {number:03} from Appendix {start_label} (~{} pages)",
                batch.pages
            );
            on_event(RunEvent::Rendering {
                number,
                start_label: start_label.clone(),
                planned_pages: batch.pages,
            });

            let mut rendered = match self.host.render(batch, options.header_text.clone()).await {
                Ok(rendered) => rendered,
                Err(error) => {
                    log::error!("FATAL: {error}");
                    return Err(RunFailure {
                        error,
                        partial: report,
                    });
                }
            };

            report.issues.append(&mut rendered.issues);
            report.manifest.record_batch(&rendered);
            report.pages_rendered += rendered.pages;

            let file_name = rendered.file_name();
            log::info!("Saved {file_name} ({} pages)", rendered.pages);
            on_event(RunEvent::Saved {
                file_name: file_name.clone(),
                pages: rendered.pages,
            });

            report.artifacts.push(OutputArtifact {
                number,
                file_name,
                bytes: rendered.bytes.into(),
                pages: rendered.pages,
                start_label,
            });
            on_event(RunEvent::Progress(report.progress()));
        }

        log::info!("Done.");
        Ok(report)
    }
}
