//! Batch planning
//!
//! Greedy sequential bin-packing of appendix groups into output batches.
//! A group is never split: before admitting a group, the batch under
//! construction is sealed if the group would push it past the budget, and
//! then the whole group goes into the (possibly fresh) batch. A single group
//! larger than the budget therefore produces an over-budget batch.

use crate::name_key::OrderingKey;
use crate::types::*;
use std::ops::Range;

/// One source file scheduled for rendering, with its bytes
#[derive(Debug, Clone, PartialEq)]
pub struct SourceJob {
    pub name: String,
    pub kind: SourceKind,
    pub key: OrderingKey,
    /// Encoded file contents, moved into the renderer with the batch
    pub bytes: Vec<u8>,
    /// Page count from the pre-count probe (images: 1, failed probes: 0)
    pub planned_pages: usize,
}

/// An appendix group whose files have been read and counted
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedGroup {
    pub appendix_order: u64,
    pub label: String,
    pub jobs: Vec<SourceJob>,
}

impl PreparedGroup {
    pub fn pages(&self) -> usize {
        self.jobs.iter().map(|job| job.planned_pages).sum()
    }
}

/// A sealed batch: everything that goes into one output document
#[derive(Debug, Clone, PartialEq)]
pub struct BatchSpec {
    /// 1-based batch number, used for the output filename
    pub number: usize,
    /// Label of the first appendix in the batch
    pub start_label: String,
    pub jobs: Vec<SourceJob>,
    /// Planned page total
    pub pages: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchPlan {
    pub batches: Vec<BatchSpec>,
    pub total_pages: usize,
}

/// Group index range and page total of one planned batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRange {
    pub groups: Range<usize>,
    pub pages: usize,
}

/// Partition consecutive groups into batches under `target_pages`.
///
/// `target_pages` is clamped to at least 1. A batch is only sealed once it
/// holds pages, and a trailing batch with no pages is not emitted.
pub fn partition_groups(group_pages: &[usize], target_pages: usize) -> Vec<BatchRange> {
    let target = target_pages.max(1);
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut pages = 0;

    for (index, &group) in group_pages.iter().enumerate() {
        if pages > 0 && pages + group > target {
            ranges.push(BatchRange {
                groups: start..index,
                pages,
            });
            start = index;
            pages = 0;
        }
        pages += group;
    }

    if pages > 0 {
        ranges.push(BatchRange {
            groups: start..group_pages.len(),
            pages,
        });
    }

    ranges
}

/// Plan batches for prepared groups.
///
/// Fails with [`BatchError::NoPages`] when the groups hold no pages at all.
pub fn plan_batches(groups: Vec<PreparedGroup>, target_pages: usize) -> Result<BatchPlan> {
    let group_pages: Vec<usize> = groups.iter().map(PreparedGroup::pages).collect();
    let total_pages: usize = group_pages.iter().sum();
    if total_pages == 0 {
        return Err(BatchError::NoPages);
    }

    let ranges = partition_groups(&group_pages, target_pages);
    let mut groups = groups.into_iter().enumerate().peekable();
    let mut batches = Vec::with_capacity(ranges.len());

    for (i, range) in ranges.into_iter().enumerate() {
        let mut start_label = None;
        let mut jobs = Vec::new();

        while let Some((index, group)) = groups.next_if(|(index, _)| *index < range.groups.end) {
            if index < range.groups.start {
                // Zero-page groups left behind by a seal are never emitted
                continue;
            }
            start_label.get_or_insert(group.label);
            jobs.extend(group.jobs);
        }

        batches.push(BatchSpec {
            number: i + 1,
            start_label: start_label.unwrap_or_default(),
            jobs,
            pages: range.pages,
        });
    }

    let planned: usize = batches.iter().map(|b| b.pages).sum();
    if planned < total_pages {
        log::debug!("{} planned pages fell outside every batch", total_pages - planned);
    }

    Ok(BatchPlan {
        batches,
        total_pages: planned,
    })
}
