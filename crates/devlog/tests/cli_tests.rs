// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! CLI tests for argument parsing and process exit status
//!
//! Parsing tests go through `Config::try_parse_from`; exit status tests run
//! the built binary against throwaway repositories.


use std::path::Path;
use std::process::{Command, Output};

use clap::Parser;
use devlog::config::{Command as Subcommand, Config};
use devlog_git::MergePolicy;
use fixtures::repo_with_history;
use tempfile::TempDir;
use tracing::Level;

// ============================================================================
// Argument parsing
// ============================================================================

#[test]
fn test_no_arguments_uses_defaults() {
    let config = Config::try_parse_from(["devlog"]).expect("parse should succeed");
    assert!(config.command.is_none());
    assert!(config.commits.is_none());
    assert_eq!(config.log_level(), Level::INFO);
}

#[test]
fn test_commits_flag() {
    let config = Config::try_parse_from(["devlog", "-n", "5"]).expect("parse should succeed");
    assert_eq!(config.commits, Some(5));
}

#[test]
fn test_commits_conflicts_with_days() {
    let result = Config::try_parse_from(["devlog", "--commits", "5", "--days", "2"]);
    assert!(result.is_err(), "--commits and --days are exclusive");
}

#[test]
fn test_to_requires_from() {
    let result = Config::try_parse_from(["devlog", "--to", "HEAD"]);
    assert!(result.is_err(), "--to needs --from");

    let config = Config::try_parse_from(["devlog", "--from", "v1.0", "--to", "v1.1"])
        .expect("parse should succeed");
    assert_eq!(config.from.as_deref(), Some("v1.0"));
    assert_eq!(config.to.as_deref(), Some("v1.1"));
}

#[test]
fn test_merge_policy_values() {
    let config = Config::try_parse_from(["devlog", "--merge-policy", "first-parent"])
        .expect("parse should succeed");
    assert_eq!(config.merge_policy, MergePolicy::FirstParent);

    let result = Config::try_parse_from(["devlog", "--merge-policy", "octopus"]);
    assert!(result.is_err());
}

#[test]
fn test_tags_are_comma_separated_and_repeatable() {
    let config = Config::try_parse_from(["devlog", "--tag", "git,rust", "--tag", "blog"])
        .expect("parse should succeed");
    assert_eq!(config.tags, vec!["git", "rust", "blog"]);
}

#[test]
fn test_verbose_and_quiet() {
    let config = Config::try_parse_from(["devlog", "-v"]).expect("parse should succeed");
    assert_eq!(config.log_level(), Level::DEBUG);

    let config = Config::try_parse_from(["devlog", "--quiet"]).expect("parse should succeed");
    assert_eq!(config.log_level(), Level::WARN);
}

#[test]
fn test_subcommands() {
    let config = Config::try_parse_from(["devlog", "stats"]).expect("parse should succeed");
    assert_eq!(config.command, Some(Subcommand::Stats));

    let config =
        Config::try_parse_from(["devlog", "posts", "--limit", "3"]).expect("parse should succeed");
    assert_eq!(config.command, Some(Subcommand::Posts { limit: Some(3) }));
}

// ============================================================================
// Exit status
// ============================================================================

fn devlog(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_devlog"))
        .args(args)
        .current_dir(cwd)
        .env_remove("OPENAI_API_KEY")
        .env_remove("RUST_LOG")
        .env("OPENAI_BASE_URL", "http://127.0.0.1:9")
        .output()
        .expect("run devlog")
}

#[test]
fn test_run_without_api_key_exits_zero_with_fallback() {
    let repo = repo_with_history(2);
    let out = TempDir::new().expect("output dir");
    let out_arg = out.path().to_string_lossy().to_string();

    let output = devlog(&["-n", "5", "-o", &out_arg, "-q"], repo.path());

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8_lossy(&output.stdout);
    let path = Path::new(stdout.trim());
    assert!(path.exists(), "printed path should exist: {stdout}");
    let written = std::fs::read_to_string(path).expect("read post");
    assert!(written.contains("content_source: \"fallback\""));
}

#[test]
fn test_missing_repository_exits_non_zero() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("out");
    let out_arg = out.to_string_lossy().to_string();

    let output = devlog(&["-r", "missing-repo", "-o", &out_arg], dir.path());

    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn test_plain_directory_is_not_a_repository() {
    let dir = TempDir::new().expect("temp dir");
    let out = dir.path().join("out");
    let out_arg = out.to_string_lossy().to_string();

    let output = devlog(&["-n", "1", "-o", &out_arg], dir.path());

    assert!(!output.status.success());
    assert!(!out.exists());
}

#[test]
fn test_invalid_arguments_exit_non_zero() {
    let dir = TempDir::new().expect("temp dir");
    let output = devlog(&["--commits", "many"], dir.path());
    assert!(!output.status.success());
}

#[test]
fn test_stats_and_posts_subcommands() {
    let repo = repo_with_history(3);
    let out = TempDir::new().expect("output dir");
    let out_arg = out.path().to_string_lossy().to_string();

    let output = devlog(&["stats"], repo.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Total commits: 3"));

    let output = devlog(&["-o", &out_arg, "posts"], repo.path());
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "No posts yet.\n");

    let output = devlog(&["-n", "1", "-o", &out_arg, "-q"], repo.path());
    assert!(output.status.success());

    let output = devlog(&["-o", &out_arg, "posts"], repo.path());
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("1. Development Log\n"));
}
