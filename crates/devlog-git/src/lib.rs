// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! devlog-git: change extraction from git history
//!
//! This library crate walks a repository's commit history with `git2` and
//! turns every (commit, file) pair into a [`ChangeRecord`] for the devlog
//! pipeline.

#![warn(missing_docs)]

//! # Example
//!
//! ```no_run
//! use devlog_git::{ChangeExtractor, CommitRange, GitRepo, RepositorySummary};
//!
//! let repo = GitRepo::open(".").expect("open repo");
//! let records = ChangeExtractor::default()
//!     .extract(&repo, &CommitRange::Latest(10))
//!     .expect("extract changes");
//!
//! let summary = RepositorySummary::from_records(&records);
//! println!("{} commits, {} files", summary.commit_count, summary.files_touched);
//! ```

pub mod change;
pub mod commit;
pub mod error;
pub mod extractor;

pub use change::{ChangeKind, ChangeRecord, KindCounts, LineStats, RepositorySummary};
pub use commit::Commit;
pub use error::ExtractionError;
pub use extractor::{ChangeExtractor, CommitRange, GitRepo, MergePolicy, RepoStats};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::change::{ChangeKind, ChangeRecord, LineStats, RepositorySummary};
    pub use crate::error::ExtractionError;
    pub use crate::extractor::{ChangeExtractor, CommitRange, GitRepo, MergePolicy};
}
