//! Rendering a single planned batch into one output document

use crate::compose::{SourceUnit, header_label};
use crate::constants::batch_file_name;
use crate::name_key::OrderingKey;
use crate::plan::{BatchSpec, SourceJob};
use crate::render::OutputDocument;
use crate::types::*;

/// A source file that contributed pages to a batch
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedUnit {
    pub name: String,
    pub kind: SourceKind,
    pub key: OrderingKey,
    /// Destination pages actually produced
    pub pages: usize,
}

/// Result of rendering one batch
#[derive(Debug, Clone)]
pub struct RenderedBatch {
    pub number: usize,
    pub bytes: Vec<u8>,
    pub pages: usize,
    /// Units in render order; units that produced no pages are left out
    pub units: Vec<RenderedUnit>,
    pub issues: Vec<RunIssue>,
}

impl RenderedBatch {
    pub fn file_name(&self) -> String {
        batch_file_name(self.number)
    }
}

/// Render every job of `batch` sequentially into a fresh document.
///
/// Sources that fail to decode are skipped with a [`RunIssue::Decode`].
/// Only failures of the output document itself are returned as errors.
pub fn render_batch(batch: BatchSpec, header_text: &str) -> Result<RenderedBatch> {
    let mut output = OutputDocument::new();
    let mut units = Vec::with_capacity(batch.jobs.len());
    let mut issues = Vec::new();

    for job in batch.jobs {
        let SourceJob {
            name,
            kind,
            key,
            bytes,
            ..
        } = job;

        let unit = match SourceUnit::decode(kind, bytes) {
            Ok(unit) => unit,
            Err(e) => {
                let issue = RunIssue::Decode {
                    name,
                    reason: e.to_string(),
                };
                log::warn!("WARN: {issue}");
                issues.push(issue);
                continue;
            }
        };

        let label = header_label(&name, header_text);
        let pages = unit.render_into(&mut output, &name, &label, &mut issues)?;
        log::debug!("{name}: {pages} page(s)");

        if pages > 0 {
            units.push(RenderedUnit {
                name,
                kind,
                key,
                pages,
            });
        }
    }

    let pages = output.page_count();
    let bytes = output.finalize()?;

    Ok(RenderedBatch {
        number: batch.number,
        bytes,
        pages,
        units,
        issues,
    })
}
