//! Session state: the file queue, output history and the run guard

use crate::assemble::{
    BatchAssembler, OutputArtifact, RunEvent, RunFailure, RunReport, save_artifact,
};
use crate::bundle::bundle_entries;
use crate::constants::MANIFEST_FILE_NAME;
use crate::group::InputFile;
use crate::host::ExecutionHost;
use crate::manifest::Manifest;
use crate::options::BatchOptions;
use crate::types::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Files waiting for the next run
#[derive(Debug, Clone, Default)]
pub struct SessionQueue {
    files: Vec<InputFile>,
}

impl SessionQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append files; returns how many were added
    pub fn add(&mut self, files: impl IntoIterator<Item = InputFile>) -> usize {
        let before = self.files.len();
        self.files.extend(files);
        self.files.len() - before
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Immutable copy handed to a run
    pub fn snapshot(&self) -> Vec<InputFile> {
        self.files.clone()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Outputs of one past run
#[derive(Debug, Clone, PartialEq)]
pub struct RunRecord {
    /// 1-based, counted over the session's lifetime
    pub run_number: usize,
    pub artifacts: Vec<OutputArtifact>,
    pub manifest: Manifest,
}

/// A batching session shared between a host surface and its runs.
///
/// All methods take `&self`; a session can sit behind an `Arc` and be driven
/// from several tasks. Only one run is in flight at a time.
#[derive(Debug, Default)]
pub struct Session {
    queue: Mutex<SessionQueue>,
    history: Mutex<Vec<RunRecord>>,
    running: AtomicBool,
    runs_started: AtomicUsize,
    assembler: BatchAssembler,
}

struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Session {
    pub fn new(host: ExecutionHost) -> Self {
        Self {
            assembler: BatchAssembler::new(host),
            ..Default::default()
        }
    }

    /// Queue more files; returns the new queue length
    pub fn enqueue(&self, files: impl IntoIterator<Item = InputFile>) -> usize {
        let mut queue = lock(&self.queue);
        let added = queue.add(files);
        log::info!("Queued {added} file(s). Total: {}", queue.len());
        queue.len()
    }

    /// Empty the queue and forget all outputs
    pub fn clear(&self) {
        lock(&self.queue).clear();
        lock(&self.history).clear();
        log::debug!("session cleared");
    }

    pub fn queued(&self) -> usize {
        lock(&self.queue).len()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn history(&self) -> Vec<RunRecord> {
        lock(&self.history).clone()
    }

    /// Every artifact currently held, oldest run first
    pub fn artifacts(&self) -> Vec<OutputArtifact> {
        lock(&self.history)
            .iter()
            .flat_map(|record| record.artifacts.iter().cloned())
            .collect()
    }

    fn try_begin(&self) -> Option<RunGuard<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard(&self.running))
    }

    /// Run the queued files.
    ///
    /// Returns `Ok(None)` without doing anything when another run is already
    /// in flight. Without `keep_history`, earlier outputs are dropped when
    /// the run starts. Batches finished before a failure stay in history.
    pub async fn run(
        &self,
        options: &BatchOptions,
        on_event: impl FnMut(RunEvent),
    ) -> std::result::Result<Option<RunReport>, RunFailure> {
        let Some(_guard) = self.try_begin() else {
            log::debug!("run already in progress, ignoring");
            return Ok(None);
        };

        if !options.keep_history {
            lock(&self.history).clear();
        }
        let run_number = self.runs_started.fetch_add(1, Ordering::AcqRel) + 1;
        let snapshot = lock(&self.queue).snapshot();

        let result = self.assembler.run(&snapshot, options, on_event).await;
        let produced = match &result {
            Ok(report) => report,
            Err(failure) => &failure.partial,
        };
        if !produced.artifacts.is_empty() {
            lock(&self.history).push(RunRecord {
                run_number,
                artifacts: produced.artifacts.clone(),
                manifest: produced.manifest.clone(),
            });
        }

        result.map(Some)
    }

    /// Zip every artifact in history, plus each run's manifest.
    ///
    /// With more than one run in history, entries are grouped into
    /// `run_NNN/` folders.
    pub fn bundle(&self) -> Result<Vec<u8>> {
        let history = lock(&self.history);
        if history.is_empty() {
            return Err(BatchError::Config("No outputs to bundle".to_string()));
        }

        let foldered = history.len() > 1;
        let folder = |record: &RunRecord| {
            if foldered {
                format!("{}/", run_folder(record.run_number))
            } else {
                String::new()
            }
        };

        let manifests = history
            .iter()
            .map(|record| record.manifest.to_csv())
            .collect::<Result<Vec<_>>>()?;

        let mut entries: Vec<(String, &[u8])> = Vec::new();
        for (record, manifest) in history.iter().zip(&manifests) {
            let prefix = folder(record);
            for artifact in &record.artifacts {
                entries.push((format!("{prefix}{}", artifact.file_name), &*artifact.bytes));
            }
            entries.push((format!("{prefix}{MANIFEST_FILE_NAME}"), manifest.as_slice()));
        }

        bundle_entries(entries)
    }

    /// Write every artifact in history plus each run's manifest under `dir`,
    /// using the same `run_NNN/` layout as [`Session::bundle`].
    pub async fn save_outputs(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let history = self.history();
        if history.is_empty() {
            return Err(BatchError::Config("No outputs to save".to_string()));
        }

        let foldered = history.len() > 1;
        let mut written = Vec::new();
        for record in &history {
            let target = if foldered {
                dir.as_ref().join(run_folder(record.run_number))
            } else {
                dir.as_ref().to_owned()
            };
            tokio::fs::create_dir_all(&target).await?;

            for artifact in &record.artifacts {
                written.push(save_artifact(artifact, &target).await?);
            }
            let manifest_path = target.join(MANIFEST_FILE_NAME);
            tokio::fs::write(&manifest_path, record.manifest.to_csv()?).await?;
            written.push(manifest_path);
        }

        Ok(written)
    }
}

fn run_folder(run_number: usize) -> String {
    format!("run_{run_number:03}")
}
