//! Ordering queued files and clustering them into appendix groups

use crate::name_key::{OrderingKey, parse_name};
use crate::types::*;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where the bytes of an input file live
#[derive(Debug, Clone, PartialEq)]
pub enum InputSource {
    Path(PathBuf),
    Memory(Arc<[u8]>),
}

/// A file handed to the session by the host
#[derive(Debug, Clone, PartialEq)]
pub struct InputFile {
    /// Display name, including extension
    pub name: String,
    pub source: InputSource,
}

impl InputFile {
    /// Reference a file on disk, named after its final path component
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self {
            name,
            source: InputSource::Path(path.to_owned()),
        }
    }

    /// Wrap bytes already held in memory
    pub fn from_bytes(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        Self {
            name: name.into(),
            source: InputSource::Memory(bytes.into()),
        }
    }

    /// Read the file contents into a fresh, uniquely owned buffer
    pub async fn read(&self) -> Result<Vec<u8>> {
        match &self.source {
            InputSource::Path(path) => Ok(tokio::fs::read(path).await?),
            InputSource::Memory(bytes) => Ok(bytes.to_vec()),
        }
    }
}

/// An input file that passed name parsing
#[derive(Debug, Clone, PartialEq)]
pub struct QueuedItem {
    pub file: InputFile,
    pub key: OrderingKey,
    pub kind: SourceKind,
}

impl QueuedItem {
    /// Key the file by its name. `None` when the name is not an appendix name.
    pub fn new(file: InputFile) -> Option<Self> {
        let key = parse_name(&file.name)?;
        let kind = SourceKind::from_name(&file.name);
        Some(Self { file, key, kind })
    }

    pub fn name(&self) -> &str {
        &self.file.name
    }
}

/// All items sharing one appendix order, in final render order
#[derive(Debug, Clone, PartialEq)]
pub struct AppendixGroup {
    pub appendix_order: u64,
    /// Label of the first item in the group
    pub label: String,
    pub items: Vec<QueuedItem>,
}

/// Compare filenames the way a user-facing file list would: case-insensitive
/// first, lowercase before uppercase when the names differ only in case.
///
/// This is a code-point comparison of the lowercased names, not full Unicode
/// collation. Accented letters sort after `z`, and punctuation keeps its
/// ASCII order. It only breaks ties between files with the same appendix
/// and part, where names are almost always plain ASCII.
pub fn collate_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Appendix order, then part index (missing last), then filename
pub fn compare_items(a: &QueuedItem, b: &QueuedItem) -> Ordering {
    a.key
        .appendix_order
        .cmp(&b.key.appendix_order)
        .then_with(|| match (a.key.part_index, b.key.part_index) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| collate_names(a.name(), b.name()))
}

/// Sort items in place (stable)
pub fn sort_items(items: &mut [QueuedItem]) {
    items.sort_by(compare_items);
}

/// Split sorted items into groups wherever the appendix order changes
pub fn group_sorted(items: Vec<QueuedItem>) -> Vec<AppendixGroup> {
    let mut groups: Vec<AppendixGroup> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some(group) if group.appendix_order == item.key.appendix_order => {
                group.items.push(item);
            }
            _ => groups.push(AppendixGroup {
                appendix_order: item.key.appendix_order,
                label: item.key.appendix_label.clone(),
                items: vec![item],
            }),
        }
    }
    groups
}

/// Parse, sort and group a snapshot of input files.
///
/// Files whose names don't parse are dropped and reported as
/// [`RunIssue::Parse`].
pub fn sort_into_groups(files: &[InputFile]) -> (Vec<AppendixGroup>, Vec<RunIssue>) {
    let mut items = Vec::with_capacity(files.len());
    let mut issues = Vec::new();

    for file in files {
        match QueuedItem::new(file.clone()) {
            Some(item) => items.push(item),
            None => {
                let issue = RunIssue::Parse {
                    name: file.name.clone(),
                };
                log::warn!("WARN: {issue}");
                issues.push(issue);
            }
        }
    }

    sort_items(&mut items);
    (group_sorted(items), issues)
}
