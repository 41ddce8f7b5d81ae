// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Change extraction from a git repository
//!
//! [`GitRepo`] is the only type that touches `git2`. The caller opens it and
//! hands it to a [`ChangeExtractor`], which resolves a [`CommitRange`] and
//! emits one [`ChangeRecord`] per file per commit, oldest commit first.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use git2::{BranchType, Delta, DiffFindOptions, DiffOptions, ErrorCode, Oid, Repository, Sort};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::change::{ChangeKind, ChangeRecord};
use crate::commit::Commit;
use crate::error::ExtractionError;

/// Selection of commits to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitRange {
    /// The N most recent commits reachable from HEAD
    Latest(usize),
    /// Every commit reachable from HEAD made at or after the timestamp
    Since(DateTime<Utc>),
    /// Commits reachable from `to` (HEAD when absent) but not from `from`
    Between {
        /// Exclusive lower bound
        from: String,
        /// Inclusive upper bound
        to: Option<String>,
    },
}

impl fmt::Display for CommitRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitRange::Latest(n) => write!(f, "last {n} commits"),
            CommitRange::Since(since) => write!(f, "since {}", since.to_rfc3339()),
            CommitRange::Between { from, to } => {
                write!(f, "{from}..{}", to.as_deref().unwrap_or("HEAD"))
            }
        }
    }
}

/// How merge commits are handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// Emit no records for merge commits
    #[default]
    Skip,
    /// Diff merge commits against their first parent
    FirstParent,
}

impl MergePolicy {
    /// Name accepted by [`FromStr`]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Skip => "skip",
            MergePolicy::FirstParent => "first-parent",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "skip" => Ok(MergePolicy::Skip),
            "first-parent" | "first_parent" => Ok(MergePolicy::FirstParent),
            other => Err(format!(
                "unknown merge policy '{other}' (expected 'skip' or 'first-parent')"
            )),
        }
    }
}

/// Repository-wide statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoStats {
    /// Commits reachable from HEAD
    pub total_commits: usize,
    /// Local branch names
    pub branches: Vec<String>,
    /// Branch HEAD points at, if any
    pub active_branch: Option<String>,
    /// The HEAD commit
    pub last_commit: Option<Commit>,
}

/// A git repository handle
///
/// Opening and dropping the handle is the caller's business; extraction only
/// borrows it and never writes.
pub struct GitRepo {
    repo: Repository,
}

impl GitRepo {
    /// Open a git repository at the given path
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::RepositoryNotFound` if the path is not a git repository.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let repo = Repository::open(path).map_err(|_| ExtractionError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        debug!(path = %path.display(), "opened repository");
        Ok(Self { repo })
    }

    /// Discover and open a git repository containing the given path
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError::RepositoryNotFound` if no repository is found.
    pub fn discover(path: impl AsRef<Path>) -> Result<Self, ExtractionError> {
        let path = path.as_ref();
        let repo = Repository::discover(path).map_err(|_| ExtractionError::RepositoryNotFound {
            path: path.display().to_string(),
        })?;
        Ok(Self { repo })
    }

    /// Get the working directory path (None for bare repos)
    #[must_use]
    pub fn workdir(&self) -> Option<&Path> {
        self.repo.workdir()
    }

    /// Resolve HEAD, or `None` for a repository without commits
    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, ExtractionError> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(err) if matches!(err.code(), ErrorCode::UnbornBranch | ErrorCode::NotFound) => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn resolve_commit(
        &self,
        reference: &str,
        range: &CommitRange,
    ) -> Result<Oid, ExtractionError> {
        self.repo
            .revparse_single(reference)
            .and_then(|obj| obj.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|_| ExtractionError::InvalidReference {
                reference: reference.to_string(),
                range: range.to_string(),
            })
    }

    /// Commits selected by `range`, oldest first
    fn resolve_range(&self, range: &CommitRange) -> Result<Vec<Oid>, ExtractionError> {
        if matches!(range, CommitRange::Latest(0)) {
            return Ok(Vec::new());
        }

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TIME | Sort::TOPOLOGICAL)?;

        match range {
            CommitRange::Between { from, to } => {
                let tip = match to {
                    Some(reference) => self.resolve_commit(reference, range)?,
                    None => match self.head_commit()? {
                        Some(head) => head.id(),
                        None => return Ok(Vec::new()),
                    },
                };
                revwalk.push(tip)?;
                revwalk.hide(self.resolve_commit(from, range)?)?;
            }
            CommitRange::Latest(_) | CommitRange::Since(_) => match self.head_commit()? {
                Some(head) => revwalk.push(head.id())?,
                None => {
                    debug!("repository has no commits");
                    return Ok(Vec::new());
                }
            },
        }

        let limit = match range {
            CommitRange::Latest(n) => *n,
            _ => usize::MAX,
        };

        let mut oids = Vec::new();
        for oid_result in revwalk {
            if oids.len() >= limit {
                break;
            }
            let oid = oid_result?;

            // TIME ordering yields newest first, so the first commit before
            // the cutoff ends the walk.
            if let CommitRange::Since(since) = range {
                let seconds = self.repo.find_commit(oid)?.time().seconds();
                if seconds < since.timestamp() {
                    break;
                }
            }
            oids.push(oid);
        }

        // revwalk yields newest first
        oids.reverse();
        Ok(oids)
    }

    /// Per-file records for one commit diffed against `parent_tree`
    fn diff_records(
        &self,
        commit: &Commit,
        git_commit: &git2::Commit<'_>,
        parent_tree: Option<&git2::Tree<'_>>,
    ) -> Result<Vec<ChangeRecord>, ExtractionError> {
        let tree = git_commit.tree()?;

        let mut opts = DiffOptions::new();
        opts.ignore_whitespace(false);

        let mut diff = self
            .repo
            .diff_tree_to_tree(parent_tree, Some(&tree), Some(&mut opts))?;

        let mut find_opts = DiffFindOptions::new();
        find_opts.renames(true);
        diff.find_similar(Some(&mut find_opts))?;

        let mut records = Vec::new();

        for (idx, delta) in diff.deltas().enumerate() {
            let Some(kind) = change_kind(delta.status()) else {
                continue;
            };

            let new_path = delta.new_file().path().map(|p| p.display().to_string());
            let old_path = delta.old_file().path().map(|p| p.display().to_string());
            let file_path = match kind {
                ChangeKind::Deleted => old_path.clone().or_else(|| new_path.clone()),
                _ => new_path.clone().or_else(|| old_path.clone()),
            }
            .unwrap_or_else(|| "<unknown>".to_string());

            let record = match line_counts(&diff, idx) {
                Some((added, deleted)) => {
                    ChangeRecord::new(commit, file_path, kind, added, deleted)
                }
                None => {
                    warn!(
                        commit = commit.short_id(),
                        path = %file_path,
                        "line statistics unavailable, recording zero counts"
                    );
                    ChangeRecord::without_stats(commit, file_path, kind)
                }
            };

            let record = match (kind, old_path) {
                (ChangeKind::Renamed, Some(previous)) => record.renamed_from(previous),
                _ => record,
            };
            records.push(record);
        }

        Ok(records)
    }

    /// Repository-wide statistics: commit count, branches, HEAD
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError` if the history cannot be read.
    pub fn stats(&self) -> Result<RepoStats, ExtractionError> {
        let mut branches = Vec::new();
        for branch in self.repo.branches(Some(BranchType::Local))? {
            let (branch, _) = branch?;
            if let Some(name) = branch.name()? {
                branches.push(name.to_string());
            }
        }
        branches.sort();

        let Some(head) = self.head_commit()? else {
            return Ok(RepoStats {
                total_commits: 0,
                branches,
                active_branch: None,
                last_commit: None,
            });
        };

        let mut revwalk = self.repo.revwalk()?;
        revwalk.push(head.id())?;
        let total_commits = revwalk.count();

        let active_branch = self
            .repo
            .head()
            .ok()
            .filter(|reference| reference.is_branch())
            .and_then(|reference| reference.shorthand().map(str::to_string));

        Ok(RepoStats {
            total_commits,
            branches,
            active_branch,
            last_commit: Some(Commit::from_git2(&head)),
        })
    }
}

fn change_kind(status: Delta) -> Option<ChangeKind> {
    match status {
        Delta::Added | Delta::Copied | Delta::Untracked => Some(ChangeKind::Added),
        Delta::Deleted => Some(ChangeKind::Deleted),
        Delta::Renamed => Some(ChangeKind::Renamed),
        Delta::Modified | Delta::Typechange | Delta::Unreadable | Delta::Conflicted => {
            Some(ChangeKind::Modified)
        }
        Delta::Unmodified | Delta::Ignored => None,
    }
}

/// Added and deleted line counts for delta `idx`, `None` when unknown
fn line_counts(diff: &git2::Diff<'_>, idx: usize) -> Option<(u64, u64)> {
    let patch = match git2::Patch::from_diff(diff, idx) {
        Ok(Some(patch)) => patch,
        Ok(None) => return None,
        Err(err) => {
            debug!(idx, error = %err, "failed to load patch");
            return None;
        }
    };

    if patch.delta().flags().is_binary() {
        return None;
    }

    let (_, additions, deletions) = patch.line_stats().ok()?;
    Some((additions as u64, deletions as u64))
}

/// Turns a commit range into change records
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeExtractor {
    merge_policy: MergePolicy,
}

impl ChangeExtractor {
    /// Create an extractor with the given merge policy
    #[must_use]
    pub fn new(merge_policy: MergePolicy) -> Self {
        Self { merge_policy }
    }

    /// The merge policy in effect
    #[must_use]
    pub fn merge_policy(&self) -> MergePolicy {
        self.merge_policy
    }

    /// Extract one record per (commit, file) pair in `range`, oldest commit first
    ///
    /// An empty range yields an empty vector. Files whose line statistics
    /// cannot be computed are still reported, with zero counts and
    /// [`LineStats::Unavailable`](crate::LineStats::Unavailable).
    ///
    /// # Errors
    ///
    /// Returns `ExtractionError` if a reference cannot be resolved or the
    /// history cannot be read.
    pub fn extract(
        &self,
        repo: &GitRepo,
        range: &CommitRange,
    ) -> Result<Vec<ChangeRecord>, ExtractionError> {
        let oids = repo.resolve_range(range)?;
        let mut records = Vec::new();
        let mut merges_skipped = 0usize;

        for oid in &oids {
            let git_commit = repo.repo.find_commit(*oid)?;
            let commit = Commit::from_git2(&git_commit);

            let parent_tree = match (git_commit.parent_count(), self.merge_policy) {
                (0, _) => None,
                (1, _) | (_, MergePolicy::FirstParent) => Some(git_commit.parent(0)?.tree()?),
                (_, MergePolicy::Skip) => {
                    debug!(commit = commit.short_id(), "skipping merge commit");
                    merges_skipped += 1;
                    continue;
                }
            };

            records.extend(repo.diff_records(&commit, &git_commit, parent_tree.as_ref())?);
        }

        info!(
            range = %range,
            commits = oids.len(),
            merges_skipped,
            records = records.len(),
            "extracted changes"
        );
        Ok(records)
    }
}
