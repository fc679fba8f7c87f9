use std::path::PathBuf;

mod logger;
mod worker;

pub use logger::{DEFAULT_LOG_CAPACITY, LogEntry, RunLogger};
pub use worker::worker_task;

// Re-export types from the library crate
pub use appendix_batch::{BatchOptions, ExecutionHost, Progress, RunIssue};

/// Commands sent from a front end to the worker
#[derive(Debug)]
pub enum BatchCommand {
    /// Add files to the session queue
    Enqueue { paths: Vec<PathBuf> },
    /// Empty the queue and drop all outputs
    ClearQueue,
    /// Process the queued files. Runs queued behind a run are discarded.
    Run { options: BatchOptions },
    /// Write every output in history into a directory
    Save { dir: PathBuf },
    /// Zip every output in history into one archive
    Bundle { output_path: PathBuf },
}

/// Updates sent from the worker to the front end
#[derive(Debug, Clone)]
pub enum BatchUpdate {
    Queued {
        added: usize,
        total: usize,
    },
    Cleared,
    Progress {
        operation: String,
        current: usize,
        total: usize,
    },
    BatchSaved {
        file_name: String,
        pages: usize,
    },
    RunComplete {
        batches: usize,
        pages: usize,
        issues: Vec<RunIssue>,
    },
    Saved {
        paths: Vec<PathBuf>,
    },
    Bundled {
        path: PathBuf,
    },
    Error {
        message: String,
    },
}
