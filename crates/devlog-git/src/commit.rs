//! Commit provenance shared by every change record of a commit

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Length of the abbreviated commit id used in prose and metadata
pub const SHORT_ID_LEN: usize = 7;

/// Abbreviate a commit id to [`SHORT_ID_LEN`] characters
#[must_use]
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(SHORT_ID_LEN) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// A commit as read from the repository, without its diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Full commit SHA
    pub id: String,
    /// Author name
    pub author: String,
    /// Commit timestamp
    pub timestamp: DateTime<Utc>,
    /// Full commit message, trailing whitespace removed
    pub message: String,
    /// Parent commit SHAs
    pub parents: Vec<String>,
}

impl Commit {
    /// Read provenance from a git2 commit
    ///
    /// Missing author names become `"Unknown"` and a timestamp git2 cannot
    /// represent falls back to the Unix epoch.
    #[must_use]
    pub fn from_git2(git_commit: &git2::Commit<'_>) -> Self {
        let timestamp =
            DateTime::from_timestamp(git_commit.time().seconds(), 0).unwrap_or_default();

        Self {
            id: git_commit.id().to_string(),
            author: git_commit.author().name().unwrap_or("Unknown").to_string(),
            timestamp,
            message: git_commit.message().unwrap_or("").trim_end().to_string(),
            parents: git_commit.parent_ids().map(|id| id.to_string()).collect(),
        }
    }

    /// Abbreviated commit id
    #[must_use]
    pub fn short_id(&self) -> &str {
        short_id(&self.id)
    }

    /// Whether the commit has more than one parent
    #[must_use]
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// First line of the commit message
    #[must_use]
    pub fn subject(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use similar_asserts::assert_eq;

    fn sample_commit() -> Commit {
        Commit {
            id: "1945ab9c752534e733c38ba0109dc3b741f0a6eb".to_string(),
            author: "Test Author".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 17, 2, 33, 6).unwrap(),
            message: "feat(post): render front matter\n\nBody text.".to_string(),
            parents: vec!["c460aeb7fb2d109c17e43de0ce681faec0b7374d".to_string()],
        }
    }

    #[test]
    fn test_short_id() {
        assert_eq!(sample_commit().short_id(), "1945ab9");
        assert_eq!(short_id("abc"), "abc");
        assert_eq!(short_id(""), "");
    }

    #[test]
    fn test_short_id_counts_characters() {
        assert_eq!(short_id("ééééééééé"), "ééééééé");
        assert_eq!(short_id("abcdeféxyz"), "abcdefé");
    }

    #[test]
    fn test_subject_takes_first_line() {
        assert_eq!(sample_commit().subject(), "feat(post): render front matter");

        let mut commit = sample_commit();
        commit.message = String::new();
        assert_eq!(commit.subject(), "");
    }

    #[test]
    fn test_is_merge() {
        let mut commit = sample_commit();
        assert!(!commit.is_merge());

        commit.parents.push("b".repeat(40));
        assert!(commit.is_merge());
    }
}
