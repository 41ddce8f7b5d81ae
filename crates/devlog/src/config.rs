//! Configuration for the devlog command line
//!
//! This module provides the command line and environment configuration and
//! converts it into the settings objects the pipeline components take.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use clap::{Parser, Subcommand};
use devlog_content::openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT};
use devlog_content::{CompletionOptions, DEFAULT_MAX_RECORDS, GeneratorConfig, OpenAiConfig};
use devlog_git::{ChangeExtractor, CommitRange, MergePolicy};
use devlog_post::{DEFAULT_NOTICE, DEFAULT_OUTPUT_DIR, DocumentOptions};

/// Days of history covered when no range is given
pub const DEFAULT_DAYS: u32 = 7;

/// Default timeout for one completion call, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default post language
pub const DEFAULT_LANGUAGE: &str = "English";

/// Default title for fallback posts
pub const DEFAULT_FALLBACK_TITLE: &str = "Development Log";

/// devlog - turn git commit history into blog posts
#[derive(Parser, Debug, Clone)]
#[command(name = "devlog")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run (defaults to writing a post)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to the git repository
    #[arg(short, long, env = "DEVLOG_REPO", default_value = ".")]
    pub repo: PathBuf,

    /// Directory receiving posts and the post index
    #[arg(short, long, env = "DEVLOG_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output_dir: PathBuf,

    /// Describe the N most recent commits
    #[arg(short = 'n', long, conflicts_with_all = ["days", "from"])]
    pub commits: Option<usize>,

    /// Describe commits from the last N days (default 7)
    #[arg(short, long, conflicts_with = "from")]
    pub days: Option<u32>,

    /// Describe commits after this reference (exclusive)
    #[arg(long)]
    pub from: Option<String>,

    /// Upper bound for --from (inclusive, defaults to HEAD)
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// How merge commits are handled: skip or first-parent
    #[arg(long, env = "DEVLOG_MERGE_POLICY", default_value_t = MergePolicy::Skip)]
    pub merge_policy: MergePolicy,

    /// Change records listed individually in the generation context
    #[arg(long, env = "DEVLOG_MAX_RECORDS", default_value_t = DEFAULT_MAX_RECORDS)]
    pub max_records_in_context: usize,

    /// Timeout for each generation call, in seconds
    #[arg(long, env = "DEVLOG_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub generation_timeout_seconds: u64,

    /// API key for the text-generation service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Model used for generation
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the OpenAI-compatible service
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Language posts are written in
    #[arg(long, env = "DEVLOG_LANGUAGE", default_value = DEFAULT_LANGUAGE)]
    pub language: String,

    /// Title used when the service cannot write one
    #[arg(long, env = "DEVLOG_FALLBACK_TITLE", default_value = DEFAULT_FALLBACK_TITLE)]
    pub fallback_title: String,

    /// Author written to the front matter
    #[arg(long, env = "DEVLOG_AUTHOR")]
    pub author: Option<String>,

    /// Front-matter tag (repeatable or comma separated)
    #[arg(long = "tag", env = "DEVLOG_TAGS", value_delimiter = ',')]
    pub tags: Vec<String>,

    /// Front-matter category (repeatable or comma separated)
    #[arg(long = "category", env = "DEVLOG_CATEGORIES", value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Enable verbose logging (debug level)
    ///
    /// Logs are written to stderr; stdout only carries command output.
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    ///
    /// Only errors and warnings will be logged.
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show repository statistics
    Stats,

    /// List posts recorded in the index, newest first
    Posts {
        /// Show at most this many posts
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            command: None,
            repo: PathBuf::from("."),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            commits: None,
            days: None,
            from: None,
            to: None,
            merge_policy: MergePolicy::Skip,
            max_records_in_context: DEFAULT_MAX_RECORDS,
            generation_timeout_seconds: DEFAULT_TIMEOUT_SECS,
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            fallback_title: DEFAULT_FALLBACK_TITLE.to_string(),
            author: None,
            tags: Vec::new(),
            categories: Vec::new(),
            verbose: false,
            quiet: false,
        }
    }
}

impl Config {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The repository path doesn't exist
    /// - The output path exists but is not a directory
    /// - The generation timeout is zero
    /// - The fallback title is blank
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.repo.exists() {
            return Err(ConfigError::RepositoryPathNotFound(self.repo.clone()));
        }
        if self.output_dir.exists() && !self.output_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(self.output_dir.clone()));
        }
        if self.generation_timeout_seconds == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.fallback_title.trim().is_empty() {
            return Err(ConfigError::EmptyFallbackTitle);
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }

    /// The commit range selected by the flags, relative to `now`
    ///
    /// A day count reaching past the earliest representable time selects
    /// the whole history.
    #[must_use]
    pub fn commit_range(&self, now: DateTime<Utc>) -> CommitRange {
        if let Some(from) = &self.from {
            return CommitRange::Between {
                from: from.clone(),
                to: self.to.clone(),
            };
        }
        if let Some(n) = self.commits {
            return CommitRange::Latest(n);
        }
        let days = self.days.unwrap_or(DEFAULT_DAYS);
        let since = TimeDelta::try_days(i64::from(days))
            .and_then(|window| now.checked_sub_signed(window))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        CommitRange::Since(since)
    }

    /// Timeout for each generation call
    #[must_use]
    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_seconds)
    }

    /// Extractor honoring the merge policy
    #[must_use]
    pub fn extractor(&self) -> ChangeExtractor {
        ChangeExtractor::new(self.merge_policy)
    }

    /// Settings for the HTTP completion backend
    #[must_use]
    pub fn openai_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    /// Settings for the content generator
    #[must_use]
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            fallback_title: self.fallback_title.clone(),
            max_records_in_context: self.max_records_in_context,
            timeout: self.generation_timeout(),
            language: self.language.clone(),
            title_options: CompletionOptions::title(),
            body_options: CompletionOptions::body(),
            ..GeneratorConfig::default()
        }
    }

    /// Settings for the document assembler
    #[must_use]
    pub fn document_options(&self) -> DocumentOptions {
        let defaults = DocumentOptions::default();
        DocumentOptions {
            output_dir: self.output_dir.clone(),
            author: self.author.clone(),
            categories: if self.categories.is_empty() {
                defaults.categories
            } else {
                self.categories.clone()
            },
            tags: if self.tags.is_empty() {
                defaults.tags
            } else {
                self.tags.clone()
            },
            notice: Some(DEFAULT_NOTICE.to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("Repository path not found: {0}")]
    RepositoryPathNotFound(PathBuf),

    /// Output path exists and is not a directory
    #[error("Output path is not a directory: {0}")]
    OutputNotDirectory(PathBuf),

    /// Generation timeout of zero seconds
    #[error("Generation timeout must be at least one second")]
    ZeroTimeout,

    /// Blank fallback title
    #[error("Fallback title must not be empty")]
    EmptyFallbackTitle,
}
