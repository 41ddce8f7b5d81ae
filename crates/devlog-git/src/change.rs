// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Change records and the summary derived from them
//!
//! A [`ChangeRecord`] describes one file touched by one commit. Records are
//! created by the extractor and never modified afterwards; the
//! [`RepositorySummary`] is computed once from a slice of them.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::commit::{Commit, short_id};

/// How a file changed within a commit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    /// File did not exist in the parent
    Added,
    /// File content changed in place
    Modified,
    /// File was removed
    Deleted,
    /// File moved to a new path (possibly with edits)
    Renamed,
}

impl ChangeKind {
    /// Lowercase name used in contexts and metadata
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
            ChangeKind::Renamed => "renamed",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the line counts of a record carry information
///
/// `Exact` with zero counts is a real zero-line change (a pure rename, a mode
/// change). `Unavailable` means the lookup failed or the file is binary and the
/// zero counts mean nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStats {
    /// Counts were computed from the diff
    Exact,
    /// Counts could not be computed and are reported as zero
    Unavailable,
}

/// One file touched by one commit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    /// Full SHA of the enclosing commit
    pub commit_id: String,
    /// Commit author name
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Full commit message
    pub message: String,
    /// Repository-relative path (new path for renames, old path for deletions)
    pub file_path: String,
    /// Old path of a renamed file
    pub previous_path: Option<String>,
    /// Kind of change
    pub change_kind: ChangeKind,
    /// Lines added, zero when unknown
    pub lines_added: u64,
    /// Lines deleted, zero when unknown
    pub lines_deleted: u64,
    /// Whether the line counts are meaningful
    pub stats: LineStats,
}

impl ChangeRecord {
    /// Build a record for `commit` with exact line counts
    #[must_use]
    pub fn new(
        commit: &Commit,
        file_path: impl Into<String>,
        change_kind: ChangeKind,
        lines_added: u64,
        lines_deleted: u64,
    ) -> Self {
        Self {
            commit_id: commit.id.clone(),
            author: commit.author.clone(),
            timestamp: commit.timestamp,
            message: commit.message.clone(),
            file_path: file_path.into(),
            previous_path: None,
            change_kind,
            lines_added,
            lines_deleted,
            stats: LineStats::Exact,
        }
    }

    /// Build a record whose line counts could not be determined
    #[must_use]
    pub fn without_stats(
        commit: &Commit,
        file_path: impl Into<String>,
        change_kind: ChangeKind,
    ) -> Self {
        Self {
            stats: LineStats::Unavailable,
            ..Self::new(commit, file_path, change_kind, 0, 0)
        }
    }

    /// Attach the old path of a renamed file
    #[must_use]
    pub fn renamed_from(mut self, previous_path: impl Into<String>) -> Self {
        self.previous_path = Some(previous_path.into());
        self
    }

    /// Abbreviated commit id
    #[must_use]
    pub fn short_commit_id(&self) -> &str {
        short_id(&self.commit_id)
    }

    /// First line of the commit message
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }

    /// Whether the line counts are meaningful
    #[must_use]
    pub fn has_stats(&self) -> bool {
        self.stats == LineStats::Exact
    }
}

/// Number of records per change kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindCounts {
    /// Added files
    pub added: usize,
    /// Modified files
    pub modified: usize,
    /// Deleted files
    pub deleted: usize,
    /// Renamed files
    pub renamed: usize,
}

impl KindCounts {
    fn record(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Added => self.added += 1,
            ChangeKind::Modified => self.modified += 1,
            ChangeKind::Deleted => self.deleted += 1,
            ChangeKind::Renamed => self.renamed += 1,
        }
    }
}

/// Aggregate over a sequence of change records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySummary {
    /// Distinct commits represented in the records
    pub commit_count: usize,
    /// Distinct file paths touched
    pub files_touched: usize,
    /// Sum of lines added
    pub total_additions: u64,
    /// Sum of lines deleted
    pub total_deletions: u64,
    /// Earliest and latest commit timestamps, absent for no records
    pub time_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
    /// Record counts per change kind
    pub kinds: KindCounts,
    /// Records per file path
    file_touches: BTreeMap<String, usize>,
}

impl RepositorySummary {
    /// Compute the summary of `records`
    #[must_use]
    pub fn from_records(records: &[ChangeRecord]) -> Self {
        let mut commits = HashSet::new();
        let mut file_touches: BTreeMap<String, usize> = BTreeMap::new();
        let mut kinds = KindCounts::default();
        let mut total_additions = 0u64;
        let mut total_deletions = 0u64;
        let mut time_range: Option<(DateTime<Utc>, DateTime<Utc>)> = None;

        for record in records {
            commits.insert(record.commit_id.as_str());
            *file_touches.entry(record.file_path.clone()).or_default() += 1;
            kinds.record(record.change_kind);
            total_additions += record.lines_added;
            total_deletions += record.lines_deleted;

            time_range = Some(match time_range {
                None => (record.timestamp, record.timestamp),
                Some((earliest, latest)) => {
                    (earliest.min(record.timestamp), latest.max(record.timestamp))
                }
            });
        }

        Self {
            commit_count: commits.len(),
            files_touched: file_touches.len(),
            total_additions,
            total_deletions,
            time_range,
            kinds,
            file_touches,
        }
    }

    /// Whether the summary covers no records at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commit_count == 0
    }

    /// The `limit` paths touched by the most records, ties ordered by path
    #[must_use]
    pub fn most_touched_files(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut files: Vec<(&str, usize)> = self
            .file_touches
            .iter()
            .map(|(path, count)| (path.as_str(), *count))
            .collect();
        files.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        files.truncate(limit);
        files
    }
}
