//! Reading inputs and writing run outputs

use crate::bundle::bundle_entries;
use crate::constants::{BUNDLE_FILE_NAME, MANIFEST_FILE_NAME};
use crate::group::AppendixGroup;
use crate::plan::{PreparedGroup, SourceJob};
use crate::render::probe_page_count;
use crate::types::*;
use std::path::{Path, PathBuf};

use super::{OutputArtifact, RunReport};

/// Read every item's bytes and count its planned pages.
///
/// Documents are probed on the blocking pool; a failed probe keeps the file
/// with zero planned pages. Images always plan one page. Files that cannot be
/// read at all are dropped. Every problem is reported as a
/// [`RunIssue::Probe`].
pub async fn prepare_groups(groups: Vec<AppendixGroup>) -> (Vec<PreparedGroup>, Vec<RunIssue>) {
    let mut prepared = Vec::with_capacity(groups.len());
    let mut issues = Vec::new();

    for group in groups {
        let mut jobs = Vec::with_capacity(group.items.len());
        for item in group.items {
            let bytes = match item.file.read().await {
                Ok(bytes) => bytes,
                Err(e) => {
                    report(&mut issues, item.file.name.clone(), e);
                    continue;
                }
            };

            let planned_pages = if item.kind.is_document() {
                match probe(bytes.clone()).await {
                    Ok(count) => count,
                    Err(e) => {
                        report(&mut issues, item.file.name.clone(), e);
                        0
                    }
                }
            } else {
                1
            };

            jobs.push(SourceJob {
                name: item.file.name,
                kind: item.kind,
                key: item.key,
                bytes,
                planned_pages,
            });
        }

        prepared.push(PreparedGroup {
            appendix_order: group.appendix_order,
            label: group.label,
            jobs,
        });
    }

    (prepared, issues)
}

async fn probe(bytes: Vec<u8>) -> Result<usize> {
    tokio::task::spawn_blocking(move || probe_page_count(&bytes)).await?
}

fn report(issues: &mut Vec<RunIssue>, name: String, error: BatchError) {
    let issue = RunIssue::Probe {
        name,
        reason: error.to_string(),
    };
    log::warn!("WARN: {issue}");
    issues.push(issue);
}

/// Write a single artifact into `dir`
pub async fn save_artifact(artifact: &OutputArtifact, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let path = dir.as_ref().join(&artifact.file_name);
    tokio::fs::write(&path, &artifact.bytes).await?;
    Ok(path)
}

/// Write a run's batches and manifest into `dir`, creating it if needed.
///
/// Returns the written paths, batches first, manifest last.
pub async fn save_outputs(report: &RunReport, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    tokio::fs::create_dir_all(dir).await?;

    let mut written = Vec::with_capacity(report.artifacts.len() + 1);
    for artifact in &report.artifacts {
        written.push(save_artifact(artifact, dir).await?);
    }

    let manifest_path = dir.join(MANIFEST_FILE_NAME);
    tokio::fs::write(&manifest_path, report.manifest.to_csv()?).await?;
    written.push(manifest_path);

    Ok(written)
}

/// Zip a run's batches and manifest into `appendix_batches.zip` inside `dir`
pub async fn save_bundle(report: &RunReport, dir: impl AsRef<Path>) -> Result<PathBuf> {
    let manifest = report.manifest.to_csv()?;
    let mut entries: Vec<(String, &[u8])> = report
        .artifacts
        .iter()
        .map(|a| (a.file_name.clone(), &*a.bytes))
        .collect();
    entries.push((MANIFEST_FILE_NAME.to_string(), manifest.as_slice()));

    let archive = bundle_entries(entries)?;
    let path = dir.as_ref().join(BUNDLE_FILE_NAME);
    tokio::fs::write(&path, archive).await?;
    Ok(path)
}
