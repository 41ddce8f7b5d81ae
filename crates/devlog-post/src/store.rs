// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Atomic, no-clobber document writes
//!
//! The document is written to a temporary file next to its target, synced,
//! and then linked into place under the first free name. An existing file is
//! never replaced; a failed write leaves nothing behind.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use crate::error::PersistError;

/// Names tried before giving up
pub const MAX_NAME_ATTEMPTS: usize = 1000;

/// File name for the `attempt`-th candidate: `stem.md`, `stem-2.md`, ...
#[must_use]
pub fn candidate_name(stem: &str, attempt: usize) -> String {
    if attempt <= 1 {
        format!("{stem}.md")
    } else {
        format!("{stem}-{attempt}.md")
    }
}

/// Write `contents` into `dir` under the first free name derived from `stem`
///
/// # Errors
///
/// Returns `PersistError::WriteDocument` if the temporary file cannot be
/// written or moved, and `PersistError::NoFreePath` if every candidate name
/// is taken.
pub fn write_new(dir: &Path, stem: &str, contents: &str) -> Result<PathBuf, PersistError> {
    let write_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| PersistError::WriteDocument { path, source }
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_error(dir))?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(write_error(tmp.path()))?;

    for attempt in 1..=MAX_NAME_ATTEMPTS {
        let path = dir.join(candidate_name(stem, attempt));
        match tmp.persist_noclobber(&path) {
            Ok(_) => return Ok(path),
            Err(err) if err.error.kind() == io::ErrorKind::AlreadyExists => {
                debug!(path = %path.display(), "name taken, trying next suffix");
                tmp = err.file;
            }
            Err(err) => return Err(write_error(&path)(err.error)),
        }
    }

    Err(PersistError::NoFreePath {
        stem: stem.to_string(),
        attempts: MAX_NAME_ATTEMPTS,
    })
}
