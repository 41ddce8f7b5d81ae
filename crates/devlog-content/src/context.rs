// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Structured change context handed to the text-generation service
//!
//! The context lists every record unless there are more than the configured
//! cap; then the first `cap` records are listed and an explicit
//! "N more changes omitted" marker follows, so the omission is never silent.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use devlog_git::{ChangeRecord, RepositorySummary};

/// Number of entries in the "most touched files" section
const TOP_FILES: usize = 5;

/// Rendered context plus how many records it represents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeContext {
    /// The text sent to the service
    pub text: String,
    /// Records listed individually
    pub included: usize,
    /// Records left out because of the cap
    pub omitted: usize,
}

impl ChangeContext {
    /// Render the context for `records` listing at most `max_records` of them
    #[must_use]
    pub fn build(records: &[ChangeRecord], summary: &RepositorySummary, max_records: usize) -> Self {
        let included = records.len().min(max_records);
        let omitted = records.len() - included;
        let mut text = String::new();

        // Writing to a String never fails.
        let _ = write_overview(&mut text, summary);
        let _ = write_commits(&mut text, records);
        let _ = write_changes(&mut text, &records[..included], omitted);

        Self {
            text,
            included,
            omitted,
        }
    }

    /// Whether any record was left out
    #[must_use]
    pub fn is_truncated(&self) -> bool {
        self.omitted > 0
    }
}

/// The marker line appended when records are omitted
#[must_use]
pub fn omission_marker(omitted: usize) -> String {
    format!("... {omitted} more changes omitted")
}

fn write_overview(text: &mut String, summary: &RepositorySummary) -> std::fmt::Result {
    writeln!(text, "## Overview")?;
    writeln!(text, "Commits: {}", summary.commit_count)?;
    writeln!(text, "Files touched: {}", summary.files_touched)?;
    writeln!(
        text,
        "Lines added: {}, lines deleted: {}",
        summary.total_additions, summary.total_deletions
    )?;
    if let Some((earliest, latest)) = summary.time_range {
        writeln!(
            text,
            "Period: {} to {}",
            earliest.format("%Y-%m-%d %H:%M"),
            latest.format("%Y-%m-%d %H:%M")
        )?;
    }
    let kinds = summary.kinds;
    writeln!(
        text,
        "Changes by kind: {} added, {} modified, {} deleted, {} renamed",
        kinds.added, kinds.modified, kinds.deleted, kinds.renamed
    )?;

    let top = summary.most_touched_files(TOP_FILES);
    if !top.is_empty() {
        writeln!(text, "\n## Most touched files")?;
        for (path, count) in top {
            writeln!(text, "- {path} ({count} changes)")?;
        }
    }
    Ok(())
}

fn write_commits(text: &mut String, records: &[ChangeRecord]) -> std::fmt::Result {
    let mut seen = BTreeSet::new();
    let mut first = true;

    for record in records {
        if !seen.insert(record.commit_id.as_str()) {
            continue;
        }
        if first {
            writeln!(text, "\n## Commits")?;
            first = false;
        }
        writeln!(
            text,
            "[{}] {} {}: {}",
            record.short_commit_id(),
            record.timestamp.format("%Y-%m-%d %H:%M"),
            record.author,
            record.subject()
        )?;
        for line in record.message.lines().skip(1).filter(|l| !l.trim().is_empty()) {
            writeln!(text, "    {}", line.trim())?;
        }
    }
    Ok(())
}

fn write_changes(text: &mut String, listed: &[ChangeRecord], omitted: usize) -> std::fmt::Result {
    writeln!(text, "\n## Changes")?;
    for record in listed {
        writeln!(text, "{}", change_line(record))?;
    }
    if omitted > 0 {
        writeln!(text, "{}", omission_marker(omitted))?;
    }
    Ok(())
}

fn change_line(record: &ChangeRecord) -> String {
    let path = match &record.previous_path {
        Some(previous) => format!("{previous} -> {}", record.file_path),
        None => record.file_path.clone(),
    };
    let stats = if record.has_stats() {
        format!("(+{} -{})", record.lines_added, record.lines_deleted)
    } else {
        "(stats unavailable)".to_string()
    };
    format!(
        "- {} {} {} {}",
        record.short_commit_id(),
        record.change_kind,
        path,
        stats
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use devlog_git::{ChangeKind, Commit};
    use similar_asserts::assert_eq;

    fn commit(id: char, message: &str) -> Commit {
        Commit {
            id: id.to_string().repeat(40),
            author: "Test Author".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 17, 12, 0, 0).unwrap(),
            message: message.to_string(),
            parents: vec![],
        }
    }

    fn records(n: usize) -> Vec<ChangeRecord> {
        let c = commit('a', "Add modules\n\nSplit the crate into modules.");
        (0..n)
            .map(|i| ChangeRecord::new(&c, format!("src/mod_{i}.rs"), ChangeKind::Added, 10, 0))
            .collect()
    }

    #[test]
    fn test_every_record_listed_under_cap() {
        let records = records(4);
        let summary = RepositorySummary::from_records(&records);
        let context = ChangeContext::build(&records, &summary, 10);

        assert_eq!(context.included, 4);
        assert_eq!(context.omitted, 0);
        assert!(!context.is_truncated());
        for record in &records {
            assert!(context.text.contains(&record.file_path));
        }
        assert!(!context.text.contains("omitted"));
    }

    #[test]
    fn test_cap_adds_omission_marker() {
        let records = records(7);
        let summary = RepositorySummary::from_records(&records);
        let context = ChangeContext::build(&records, &summary, 5);

        assert_eq!(context.included, 5);
        assert_eq!(context.omitted, 2);
        assert!(context.text.contains("... 2 more changes omitted"));
        assert!(context.text.contains("- aaaaaaa added src/mod_4.rs (+10 -0)"));
        assert!(!context.text.contains("- aaaaaaa added src/mod_5.rs"));
    }

    #[test]
    fn test_commit_messages_listed_once() {
        let records = records(3);
        let summary = RepositorySummary::from_records(&records);
        let context = ChangeContext::build(&records, &summary, 10);

        assert_eq!(context.text.matches("[aaaaaaa]").count(), 1);
        assert!(context.text.contains("Test Author: Add modules"));
        assert!(context.text.contains("    Split the crate into modules."));
    }

    #[test]
    fn test_overview_and_special_lines() {
        let c = commit('b', "Reorganize");
        let records = vec![
            ChangeRecord::new(&c, "docs/guide.md", ChangeKind::Renamed, 0, 0)
                .renamed_from("guide.md"),
            ChangeRecord::without_stats(&c, "logo.png", ChangeKind::Modified),
        ];
        let summary = RepositorySummary::from_records(&records);
        let context = ChangeContext::build(&records, &summary, 10);

        assert!(context.text.contains("Commits: 1"));
        assert!(context.text.contains("Files touched: 2"));
        assert!(context.text.contains("0 added, 1 modified, 0 deleted, 1 renamed"));
        assert!(context.text.contains("Period: 2026-01-17 12:00 to 2026-01-17 12:00"));
        assert!(context.text.contains("- bbbbbbb renamed guide.md -> docs/guide.md (+0 -0)"));
        assert!(context.text.contains("- bbbbbbb modified logo.png (stats unavailable)"));
    }

    #[test]
    fn test_zero_cap_omits_everything() {
        let records = records(3);
        let summary = RepositorySummary::from_records(&records);
        let context = ChangeContext::build(&records, &summary, 0);
        assert_eq!(context.included, 0);
        assert_eq!(context.omitted, 3);
        assert_eq!(omission_marker(3), "... 3 more changes omitted");
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_every_record_accounted_for(count in 0usize..60, cap in 0usize..80) {
                let records = records(count);
                let summary = RepositorySummary::from_records(&records);
                let context = ChangeContext::build(&records, &summary, cap);

                prop_assert_eq!(context.included + context.omitted, count);
                prop_assert_eq!(context.included, count.min(cap));
                prop_assert_eq!(context.text.matches("\n- aaaaaaa added ").count(), context.included);
                prop_assert_eq!(
                    context.text.contains(&omission_marker(context.omitted)),
                    context.is_truncated()
                );
            }
        }
    }
}
