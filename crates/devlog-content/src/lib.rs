// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! devlog-content: narrative content generation for devlog
//!
//! This library crate turns [`ChangeRecord`](devlog_git::ChangeRecord)s into a
//! post title and body through a [`TextCompletion`] backend, falling back to
//! locally built content whenever the backend is unavailable.

#![warn(missing_docs)]

//! ## Generation
//!
//! The generator renders a [`ChangeContext`] from the records, asks the
//! backend for a title and then for a body, and bounds each call with a
//! timeout:
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use devlog_content::{ContentGenerator, GeneratorConfig, OpenAiClient, OpenAiConfig};
//! use devlog_git::{ChangeExtractor, CommitRange, GitRepo, RepositorySummary};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let repo = GitRepo::open(".")?;
//! let records = ChangeExtractor::default().extract(&repo, &CommitRange::Latest(5))?;
//! let summary = RepositorySummary::from_records(&records);
//!
//! let client = OpenAiClient::new(OpenAiConfig {
//!     api_key: std::env::var("OPENAI_API_KEY").ok(),
//!     ..Default::default()
//! });
//! let generator = ContentGenerator::new(Arc::new(client), GeneratorConfig::default());
//! let content = generator.generate(&records, &summary).await;
//! println!("{} ({})", content.title, content.source);
//! # Ok(())
//! # }
//! ```

pub mod completion;
pub mod context;
pub mod error;
pub mod generator;
pub mod openai;

pub use completion::{CompletionOptions, TextCompletion};
pub use context::{ChangeContext, omission_marker};
pub use error::GenerationError;
pub use generator::{
    ContentGenerator, ContentSource, DEFAULT_MAX_RECORDS, DEFAULT_TIMEOUT, GeneratedContent,
    GeneratorConfig, sanitize_title,
};
pub use openai::{OpenAiClient, OpenAiConfig};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::completion::{CompletionOptions, TextCompletion};
    pub use crate::error::GenerationError;
    pub use crate::generator::{ContentGenerator, ContentSource, GeneratedContent, GeneratorConfig};
}
