//! Plain-text output of the `stats` and `posts` subcommands

use std::fmt::Write as _;

use devlog_git::RepoStats;
use devlog_post::IndexEntry;

/// Render repository statistics
#[must_use]
pub fn render_stats(stats: &RepoStats) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total commits: {}", stats.total_commits);
    let _ = writeln!(
        out,
        "Active branch: {}",
        stats.active_branch.as_deref().unwrap_or("(detached or unborn)")
    );
    let _ = writeln!(out, "Branches ({}): {}", stats.branches.len(), stats.branches.join(", "));
    match &stats.last_commit {
        Some(commit) => {
            let _ = writeln!(
                out,
                "Last commit: {} {} {}",
                commit.short_id(),
                commit.timestamp.format("%Y-%m-%d %H:%M"),
                commit.subject()
            );
        }
        None => {
            let _ = writeln!(out, "Last commit: none");
        }
    }
    out
}

/// Render index entries newest first, at most `limit` of them
#[must_use]
pub fn render_posts(entries: &[IndexEntry], limit: Option<usize>) -> String {
    if entries.is_empty() {
        return "No posts yet.\n".to_string();
    }

    let mut out = String::new();
    let shown = entries.iter().rev().take(limit.unwrap_or(usize::MAX));
    for (i, entry) in shown.enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, entry.title);
        let _ = writeln!(out, "   file: {}", entry.storage_path.display());
        let _ = writeln!(
            out,
            "   generated: {} ({} changes, {})",
            entry.generated_at.format("%Y-%m-%d %H:%M:%S"),
            entry.record_count,
            entry.content_source
        );
    }
    out
}
