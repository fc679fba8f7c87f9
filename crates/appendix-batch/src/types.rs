use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("Rendering failed: {0}")]
    Execution(String),
    #[error("No renderable pages (bad PDFs or no images)")]
    NoPages,
}

impl BatchError {
    /// Whether this error aborted the rendering stage of a run (as opposed to
    /// failing before any batch was attempted).
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, BatchError::Execution(_) | BatchError::TaskJoin(_))
    }
}

pub type Result<T> = std::result::Result<T, BatchError>;

/// What kind of source a queued file is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SourceKind {
    /// Multi-page PDF document
    Document,
    /// Single raster image (PNG or JPEG)
    Image,
}

impl SourceKind {
    /// Classify a filename: `.pdf` (any case) is a document, anything else an image
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".pdf") {
            SourceKind::Document
        } else {
            SourceKind::Image
        }
    }

    pub fn is_document(self) -> bool {
        self == SourceKind::Document
    }
}

/// Page orientation of a destination canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Height > width (612×792)
    #[default]
    Portrait,
    /// Width > height (792×612)
    Landscape,
}

/// A non-fatal problem encountered during a run.
///
/// Issues are logged as they happen and collected into the run report; none of
/// them stop the remaining files from being processed.
#[derive(Debug, Clone, PartialEq)]
pub enum RunIssue {
    /// Filename did not match the appendix naming convention
    Parse { name: String },
    /// Page-count probe failed; the file counts as zero planned pages
    Probe { name: String, reason: String },
    /// Source could not be decoded at render time; the whole file was skipped
    Decode { name: String, reason: String },
    /// One page of a document could not be embedded; siblings continue
    Embed {
        name: String,
        page_index: usize,
        reason: String,
    },
}

impl fmt::Display for RunIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunIssue::Parse { name } => write!(f, "skipping (bad name): {name}"),
            RunIssue::Probe { name, reason } => {
                write!(f, "could not count pages in {name}: {reason}")
            }
            RunIssue::Decode { name, reason } => write!(f, "skipping {name}: {reason}"),
            RunIssue::Embed {
                name,
                page_index,
                reason,
            } => write!(f, "skipping page {} of {name}: {reason}", page_index + 1),
        }
    }
}

/// Progress of a run, in destination pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub pages_rendered: usize,
    pub total_planned_pages: usize,
}

impl Progress {
    /// Completion as a percentage in `0.0..=100.0`
    pub fn percent(&self) -> f32 {
        if self.total_planned_pages == 0 {
            return 0.0;
        }
        let pct = self.pages_rendered as f32 / self.total_planned_pages as f32 * 100.0;
        pct.clamp(0.0, 100.0)
    }
}
