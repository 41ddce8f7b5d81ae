//! Body clean-up applied before a post is rendered
//!
//! Fenced code blocks are left untouched.

use std::sync::LazyLock;

use devlog_git::commit::short_id;
use regex::{Captures, Regex};

static COMMIT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9a-f]{7,40})\)").expect("valid commit id pattern"));

static GITHUB_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?P<lead>^|[^\w/(\[<`])(?P<url>https://github\.com/(?P<owner>[\w-]+)/(?P<repo>[\w.-]*[\w-])(?:/(?P<kind>commit|issues|pull)/(?P<target>[0-9a-f]{7,40}|\d+))?)",
    )
    .expect("valid github url pattern")
});

static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s").expect("valid list item pattern"));

/// Clean up a generated Markdown body
///
/// - a leading level-1 heading is dropped, since the title lives in the
///   front matter;
/// - parenthesized commit ids such as `(3f2a9c1)` are wrapped in backticks;
/// - bare GitHub repository, commit, issue and pull request URLs become
///   Markdown links labelled `owner/repo`, `owner/repo@3f2a9c1` or
///   `owner/repo#42`;
/// - a list directly followed by a paragraph gets a separating blank line.
#[must_use]
pub fn format_body(body: &str) -> String {
    let lines: Vec<&str> = strip_leading_heading(body).lines().collect();
    let mut out = Vec::with_capacity(lines.len());
    let mut in_fence = false;

    for (i, line) in lines.iter().enumerate() {
        if is_fence(line) {
            in_fence = !in_fence;
            out.push((*line).to_string());
            continue;
        }
        if in_fence {
            out.push((*line).to_string());
            continue;
        }

        out.push(wrap_commit_ids(&link_github_urls(line)));

        if LIST_ITEM.is_match(line)
            && let Some(next) = lines.get(i + 1)
            && ends_list(next)
        {
            out.push(String::new());
        }
    }

    out.join("\n")
}

fn strip_leading_heading(body: &str) -> &str {
    let trimmed = body.trim_start_matches(['\n', '\r']);
    let first_line = trimmed.lines().next().unwrap_or_default();
    let is_h1 = first_line
        .strip_prefix('#')
        .is_some_and(|rest| rest.starts_with([' ', '\t']));
    if !is_h1 {
        return trimmed;
    }
    trimmed[first_line.len()..].trim_start_matches(['\n', '\r'])
}

fn is_fence(line: &str) -> bool {
    let line = line.trim_start();
    line.starts_with("```") || line.starts_with("~~~")
}

fn wrap_commit_ids(line: &str) -> String {
    COMMIT_ID
        .replace_all(line, |caps: &Captures<'_>| {
            let id = &caps[1];
            // All-letter words such as "(facade)" are not commit ids.
            if id.bytes().any(|b| b.is_ascii_digit()) {
                format!("(`{id}`)")
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

fn link_github_urls(line: &str) -> String {
    GITHUB_URL
        .replace_all(line, |caps: &Captures<'_>| {
            // A URL continuing past the match (deeper path, query, anchor)
            // is left alone rather than cut in two.
            let end = caps.get(0).map_or(line.len(), |m| m.end());
            let continues = line[end..]
                .chars()
                .next()
                .is_some_and(|c| c.is_alphanumeric() || "/#?=_-".contains(c));
            if continues {
                return caps[0].to_string();
            }

            let repo = format!("{}/{}", &caps["owner"], &caps["repo"]);
            let label = match (caps.name("kind"), caps.name("target")) {
                (Some(kind), Some(target)) if kind.as_str() == "commit" => {
                    format!("{repo}@{}", short_id(target.as_str()))
                }
                (Some(_), Some(target)) => format!("{repo}#{}", target.as_str()),
                _ => repo,
            };
            format!("{}[{label}]({})", &caps["lead"], &caps["url"])
        })
        .into_owned()
}

/// A non-blank line that is neither a list item nor an indented continuation
fn ends_list(next: &str) -> bool {
    !next.trim().is_empty() && !LIST_ITEM.is_match(next) && !next.starts_with([' ', '\t'])
}
