// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! JSONL index of persisted posts
//!
//! One JSON object per line. Appends hold an exclusive `fs2` lock for the
//! whole read-check-write cycle, so concurrent runs never interleave lines.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use devlog_content::ContentSource;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::PersistError;

/// File name of the index inside the output directory
pub const INDEX_FILE: &str = "index.jsonl";

/// One persisted post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Unique id of the run that produced the post
    pub run_id: Uuid,
    /// Generation timestamp of the post
    pub generated_at: DateTime<Utc>,
    /// Post title
    pub title: String,
    /// Number of change records behind the post
    pub record_count: usize,
    /// Whether the content was generated or a fallback
    pub content_source: ContentSource,
    /// Where the document was written
    pub storage_path: PathBuf,
}

/// Handle on an index file
#[derive(Debug, Clone)]
pub struct PostIndex {
    path: PathBuf,
}

impl PostIndex {
    /// Index stored at `path`
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Index inside an output directory
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(INDEX_FILE))
    }

    /// Path of the index file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entry`, creating the index if needed
    ///
    /// An index containing an unreadable line is logged and recreated empty
    /// before the entry is written.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Index` if the file cannot be opened, locked,
    /// read or written.
    pub fn append(&self, entry: &IndexEntry) -> Result<(), PersistError> {
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(|source| self.error(source))?;

        FileExt::lock_exclusive(&file).map_err(|source| self.error(source))?;
        let result = self.append_locked(&mut file, &line);
        let unlocked = FileExt::unlock(&file).map_err(|source| self.error(source));
        result.and(unlocked)
    }

    fn append_locked(&self, file: &mut File, line: &str) -> Result<(), PersistError> {
        let mut raw = Vec::new();
        file.read_to_end(&mut raw).map_err(|source| self.error(source))?;

        if let Err(reason) = check_contents(&raw) {
            warn!(
                path = %self.path.display(),
                %reason,
                "post index is corrupt, recreating it"
            );
            file.set_len(0).map_err(|source| self.error(source))?;
        }

        file.seek(SeekFrom::End(0))
            .and_then(|_| file.write_all(line.as_bytes()))
            .and_then(|()| file.sync_data())
            .map_err(|source| self.error(source))?;

        debug!(path = %self.path.display(), "index entry appended");
        Ok(())
    }

    /// Read every entry, oldest first
    ///
    /// A missing index yields no entries. Unreadable lines are skipped with a
    /// warning.
    ///
    /// # Errors
    ///
    /// Returns `PersistError::Index` if an existing index cannot be read.
    pub fn load(&self) -> Result<Vec<IndexEntry>, PersistError> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => return Err(self.error(source)),
        };

        FileExt::lock_shared(&file).map_err(|source| self.error(source))?;
        let mut raw = Vec::new();
        let read = file.read_to_end(&mut raw).map_err(|source| self.error(source));
        FileExt::unlock(&file).map_err(|source| self.error(source))?;
        read?;

        let text = String::from_utf8_lossy(&raw);
        let mut entries = Vec::new();
        for (number, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<IndexEntry>(line) {
                Ok(entry) => entries.push(entry),
                Err(err) => warn!(line = number + 1, error = %err, "skipping unreadable index line"),
            }
        }
        Ok(entries)
    }

    fn error(&self, source: io::Error) -> PersistError {
        PersistError::Index {
            path: self.path.clone(),
            source,
        }
    }
}

/// Check that every non-blank line is a complete entry
fn check_contents(raw: &[u8]) -> Result<(), String> {
    let text = std::str::from_utf8(raw).map_err(|err| err.to_string())?;
    if !text.is_empty() && !text.ends_with('\n') {
        return Err("last line is incomplete".to_string());
    }
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        serde_json::from_str::<IndexEntry>(line)
            .map_err(|err| format!("line {}: {err}", number + 1))?;
    }
    Ok(())
}
