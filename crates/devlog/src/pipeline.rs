// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! The extract, generate, assemble and persist pipeline
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use devlog::config::Config;
//! use devlog::pipeline::Pipeline;
//!
//! # async fn run() -> Result<(), devlog::pipeline::PipelineError> {
//! let config = Config::parse();
//! let pipeline = Pipeline::from_config(&config);
//! let range = config.commit_range(chrono::Utc::now());
//! let post = pipeline.run(&config.repo, &range).await?;
//! println!("{}", post.storage_path.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use devlog_content::{ContentGenerator, OpenAiClient};
use devlog_git::{ChangeExtractor, CommitRange, ExtractionError, GitRepo, RepositorySummary};
use devlog_post::{AssembledDocument, DocumentAssembler, PersistError};
use thiserror::Error;
use tracing::info;

use crate::config::Config;

// ============================================================================
// Error Types
// ============================================================================

/// Failures that end a run without a post
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The repository could not be read
    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    /// The post or its index entry could not be written
    #[error("Persisting the post failed: {0}")]
    Persist(#[from] PersistError),
}

// ============================================================================
// Pipeline
// ============================================================================

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct PublishedPost {
    /// The assembled document
    pub document: AssembledDocument,
    /// Where the document was written
    pub storage_path: PathBuf,
}

/// Runs the three stages in order
pub struct Pipeline {
    extractor: ChangeExtractor,
    generator: ContentGenerator,
    assembler: DocumentAssembler,
}

impl Pipeline {
    /// Build a pipeline from its stages
    #[must_use]
    pub fn new(
        extractor: ChangeExtractor,
        generator: ContentGenerator,
        assembler: DocumentAssembler,
    ) -> Self {
        Self {
            extractor,
            generator,
            assembler,
        }
    }

    /// Build a pipeline backed by the HTTP completion service
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let client = OpenAiClient::new(config.openai_config());
        Self::new(
            config.extractor(),
            ContentGenerator::new(Arc::new(client), config.generator_config()),
            DocumentAssembler::new(config.document_options()),
        )
    }

    /// The document assembler
    #[must_use]
    pub fn assembler(&self) -> &DocumentAssembler {
        &self.assembler
    }

    /// Write a post about `range` in the repository at `repo_path`
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Extraction` if the repository cannot be read and
    /// `PipelineError::Persist` if the post cannot be stored. Generation
    /// failures are not errors; they produce fallback content.
    pub async fn run(
        &self,
        repo_path: &Path,
        range: &CommitRange,
    ) -> Result<PublishedPost, PipelineError> {
        self.run_at(repo_path, range, Utc::now()).await
    }

    /// Like [`Pipeline::run`], with the post stamped at `generated_at`
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run`].
    pub async fn run_at(
        &self,
        repo_path: &Path,
        range: &CommitRange,
        generated_at: DateTime<Utc>,
    ) -> Result<PublishedPost, PipelineError> {
        info!(repo = %repo_path.display(), %range, "Starting run");

        // The handle is dropped before generation starts.
        let records = {
            let repo = GitRepo::open(repo_path)?;
            self.extractor.extract(&repo, range)?
        };
        let summary = RepositorySummary::from_records(&records);

        let content = self.generator.generate(&records, &summary).await;
        let document = self
            .assembler
            .assemble_at(content, &records, &summary, generated_at);
        let storage_path = self.assembler.persist(&document)?;

        info!(
            path = %storage_path.display(),
            records = records.len(),
            source = %document.content.source,
            "Run complete"
        );
        Ok(PublishedPost {
            document,
            storage_path,
        })
    }
}
