// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for devlog-git

use thiserror::Error;

/// Fatal errors raised while reading repository history
///
/// Missing per-file line statistics are not errors; they degrade a single
/// record to [`LineStats::Unavailable`](crate::LineStats::Unavailable).
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// History could not be read (corrupt object, failed revwalk or diff)
    #[error("failed to read repository history: {0}")]
    Git2(#[from] git2::Error),

    /// The path is not inside a git repository
    #[error("no git repository at {path}")]
    RepositoryNotFound {
        /// The path that was opened
        path: String,
    },

    /// A range bound does not name a commit
    #[error("cannot resolve '{reference}' to a commit while selecting {range}")]
    InvalidReference {
        /// The reference that could not be resolved
        reference: String,
        /// The range the reference was part of
        range: String,
    },
}
