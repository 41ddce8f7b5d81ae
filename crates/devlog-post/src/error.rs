// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Error types for devlog-post

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while storing a post or its index entry
#[derive(Debug, Error)]
pub enum PersistError {
    /// The output directory could not be created
    #[error("Cannot create output directory {path}: {source}")]
    CreateDirectory {
        /// Directory that was being created
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The document could not be written or moved into place
    #[error("Cannot write document {path}: {source}")]
    WriteDocument {
        /// Target path of the document
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Every candidate file name was already taken
    #[error("No free file name for {stem} after {attempts} attempts")]
    NoFreePath {
        /// File stem without collision suffix
        stem: String,
        /// Number of names tried
        attempts: usize,
    },

    /// The index could not be read, locked or appended to
    #[error("Index error at {path}: {source}")]
    Index {
        /// Path of the index file
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// An index entry could not be serialized
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
