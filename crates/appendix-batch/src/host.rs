//! Where batch rendering runs

use crate::assemble::{RenderedBatch, render_batch};
use crate::plan::BatchSpec;
use crate::types::*;

/// Scheduling policy for rendering one batch.
///
/// Either way the caller awaits the batch before starting the next one, so
/// batches never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionHost {
    /// Render on the calling task
    Inline,
    /// Offload to tokio's blocking thread pool
    #[default]
    Background,
    /// Render inline, but fail every batch from this number on
    #[cfg(test)]
    FailFrom(usize),
}

impl ExecutionHost {
    /// Render `batch`, taking ownership of its source bytes.
    ///
    /// Any hard failure of the rendering unit, including a panicked worker,
    /// surfaces as [`BatchError::Execution`].
    pub async fn render(self, batch: BatchSpec, header_text: String) -> Result<RenderedBatch> {
        let result = match self {
            ExecutionHost::Inline => render_batch(batch, &header_text),
            ExecutionHost::Background => {
                tokio::task::spawn_blocking(move || render_batch(batch, &header_text))
                    .await
                    .map_err(BatchError::from)
                    .and_then(|rendered| rendered)
            }
            #[cfg(test)]
            ExecutionHost::FailFrom(first) if batch.number >= first => Err(BatchError::Execution(
                format!("batch {} failed to render", batch.number),
            )),
            #[cfg(test)]
            ExecutionHost::FailFrom(_) => render_batch(batch, &header_text),
        };
        result.map_err(into_execution)
    }
}

fn into_execution(error: BatchError) -> BatchError {
    match error {
        BatchError::Execution(_) => error,
        other => BatchError::Execution(other.to_string()),
    }
}
