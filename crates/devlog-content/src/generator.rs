// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Title and body generation with deterministic fallback
//!
//! [`ContentGenerator::generate`] never fails. An empty record set short-circuits
//! to fallback content without touching the service; any service failure,
//! including a timeout, is logged and replaced by fallback content built only
//! from the records.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use devlog_git::{ChangeRecord, RepositorySummary};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::completion::{CompletionOptions, TextCompletion};
use crate::context::ChangeContext;
use crate::error::GenerationError;

/// Default cap on records listed in the context
pub const DEFAULT_MAX_RECORDS: usize = 200;

/// Default timeout for a single completion call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Where a piece of content came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Written by the text-generation service
    Generated,
    /// Local default substituted for service output
    Fallback,
}

impl ContentSource {
    /// Lowercase name used in metadata
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentSource::Generated => "generated",
            ContentSource::Fallback => "fallback",
        }
    }
}

impl fmt::Display for ContentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Title and body of a post
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    /// Post title, never empty
    pub title: String,
    /// Post body in Markdown; empty only for the no-changes fallback
    pub body: String,
    /// Whether the service or a local default produced the content
    pub source: ContentSource,
    /// Records listed individually in the generation context
    pub records_in_context: usize,
    /// Records left out of the context by the cap
    pub omitted_records: usize,
}

impl GeneratedContent {
    /// Whether fallback content was substituted
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source == ContentSource::Fallback
    }
}

/// Generator settings
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    /// Title used whenever fallback content is produced
    pub fallback_title: String,
    /// Opening paragraph of the fallback body after a service failure
    pub fallback_notice: String,
    /// Cap on records listed in the context
    pub max_records_in_context: usize,
    /// Timeout for each completion call
    pub timeout: Duration,
    /// Language the post is written in
    pub language: String,
    /// Options for the title call
    pub title_options: CompletionOptions,
    /// Options for the body call
    pub body_options: CompletionOptions,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            fallback_title: "Development Log".to_string(),
            fallback_notice: "Automatic writing was unavailable for this post, so the \
                              recorded changes are listed as-is."
                .to_string(),
            max_records_in_context: DEFAULT_MAX_RECORDS,
            timeout: DEFAULT_TIMEOUT,
            language: "English".to_string(),
            title_options: CompletionOptions::title(),
            body_options: CompletionOptions::body(),
        }
    }
}

/// Writes post content from change records
pub struct ContentGenerator {
    completer: Arc<dyn TextCompletion>,
    config: GeneratorConfig,
}

impl ContentGenerator {
    /// Create a generator backed by `completer`
    #[must_use]
    pub fn new(completer: Arc<dyn TextCompletion>, config: GeneratorConfig) -> Self {
        Self { completer, config }
    }

    /// The generator settings
    #[must_use]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Produce a title and body for `records`
    ///
    /// Never fails: see the module documentation for the fallback rules.
    pub async fn generate(
        &self,
        records: &[ChangeRecord],
        summary: &RepositorySummary,
    ) -> GeneratedContent {
        if records.is_empty() {
            info!("no changes to describe, using fallback content");
            return GeneratedContent {
                title: self.config.fallback_title.clone(),
                body: String::new(),
                source: ContentSource::Fallback,
                records_in_context: 0,
                omitted_records: 0,
            };
        }

        let context =
            ChangeContext::build(records, summary, self.config.max_records_in_context);
        if context.is_truncated() {
            info!(
                included = context.included,
                omitted = context.omitted,
                "change context capped"
            );
        }

        match self.write(&context).await {
            Ok((title, body)) => {
                info!(%title, "generated post content");
                GeneratedContent {
                    title,
                    body,
                    source: ContentSource::Generated,
                    records_in_context: context.included,
                    omitted_records: context.omitted,
                }
            }
            Err(err) => {
                warn!(error = %err, "content generation failed, using fallback content");
                GeneratedContent {
                    title: self.config.fallback_title.clone(),
                    body: fallback_body(&self.config.fallback_notice, &context),
                    source: ContentSource::Fallback,
                    records_in_context: context.included,
                    omitted_records: context.omitted,
                }
            }
        }
    }

    async fn write(&self, context: &ChangeContext) -> Result<(String, String), GenerationError> {
        let raw_title = self
            .complete(
                &title_prompt(context, &self.config.language),
                self.config.title_options,
            )
            .await?;
        let title = sanitize_title(&raw_title).ok_or(GenerationError::EmptyResponse)?;

        let body = self
            .complete(
                &body_prompt(context, &self.config.language),
                self.config.body_options,
            )
            .await?;
        let body = body.trim();
        if body.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }

        Ok((title, body.to_string()))
    }

    async fn complete(
        &self,
        prompt: &str,
        options: CompletionOptions,
    ) -> Result<String, GenerationError> {
        debug!(prompt_len = prompt.len(), "calling text completion");
        tokio::time::timeout(self.config.timeout, self.completer.complete(prompt, options))
            .await
            .map_err(|_| GenerationError::Timeout(self.config.timeout))?
    }
}

fn title_prompt(context: &ChangeContext, language: &str) -> String {
    format!(
        "Analyze the git changes below and write the title of a technical blog post \
         about them. The title must be concise and clear and read naturally, as if the \
         developer wrote it. Write it in {language}. Reply with the title only, on a \
         single line, without quotes.\n\n{}",
        context.text
    )
}

fn body_prompt(context: &ChangeContext, language: &str) -> String {
    format!(
        "Write a technical blog post based on the git changes below.\n\n{}\n\
         Use this structure:\n\n\
         ## Introduction\n\
         A short paragraph on what was built or fixed.\n\n\
         ## Key changes\n\
         - One bullet per important change, citing the commit id in parentheses.\n\
         - Use code blocks where a concrete code change helps.\n\n\
         ## What I learned\n\
         Difficulties met, how they were solved, and anything new learned.\n\n\
         ## Wrapping up\n\
         A short closing paragraph with next steps.\n\n\
         Write in {language}, in a technical yet friendly tone. Do not repeat the post \
         title as a heading.",
        context.text
    )
}

fn fallback_body(notice: &str, context: &ChangeContext) -> String {
    format!("{notice}\n\n{}", context.text.trim_end())
}

/// Reduce a service reply to a single clean title line
///
/// Takes the first non-empty line and strips heading markers, a `Title:`
/// label and surrounding quotes. Returns `None` if nothing is left.
#[must_use]
pub fn sanitize_title(raw: &str) -> Option<String> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty())?;
    let line = line.trim_start_matches('#').trim();

    let line = match line.get(..6) {
        Some(label) if label.eq_ignore_ascii_case("title:") => line[6..].trim(),
        _ => line,
    };

    let mut title = line;
    for (open, close) in [('"', '"'), ('\'', '\''), ('“', '”'), ('`', '`'), ('*', '*')] {
        while title.len() >= 2 && title.starts_with(open) && title.ends_with(close) {
            title = title[open.len_utf8()..title.len() - close.len_utf8()].trim();
        }
    }

    (!title.is_empty()).then(|| title.to_string())
}
