// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! Document assembly and persistence
//!
//! [`DocumentAssembler::assemble_at`] is a pure function of its inputs, so
//! two assemblies with the same generation time yield identical metadata.
//! [`DocumentAssembler::persist`] writes the rendered document and appends
//! an index entry.

use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use devlog_content::{ContentSource, GeneratedContent};
use devlog_git::{ChangeRecord, RepositorySummary};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::PersistError;
use crate::format::format_body;
use crate::index::{IndexEntry, PostIndex};
use crate::metadata::Metadata;
use crate::slug::slugify;
use crate::store;

/// Default output directory
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Default notice shown above generated bodies
pub const DEFAULT_NOTICE: &str =
    "This post was written automatically from the repository's commit history.";

/// Presentation and storage settings
#[derive(Debug, Clone)]
pub struct DocumentOptions {
    /// Directory receiving documents and the index
    pub output_dir: PathBuf,
    /// Author written to the front matter
    pub author: Option<String>,
    /// Categories written to the front matter
    pub categories: Vec<String>,
    /// Tags written to the front matter
    pub tags: Vec<String>,
    /// Blockquote placed above generated bodies; never shown on fallback content
    pub notice: Option<String>,
}

impl Default for DocumentOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            author: None,
            categories: vec!["devlog".to_string()],
            tags: vec!["git".to_string()],
            notice: Some(DEFAULT_NOTICE.to_string()),
        }
    }
}

/// A post ready to be rendered or stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledDocument {
    /// Front-matter entries
    pub metadata: Metadata,
    /// Title and body as generated
    pub content: GeneratedContent,
    /// When the document was assembled
    pub generated_at: DateTime<Utc>,
    /// Blockquote rendered between the front matter and the body
    pub notice: Option<String>,
}

impl AssembledDocument {
    /// The post title
    #[must_use]
    pub fn title(&self) -> &str {
        &self.content.title
    }

    /// Number of change records behind the post
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.metadata
            .get("record_count")
            .and_then(|value| value.as_integer())
            .map_or(0, |count| count as usize)
    }

    /// File name stem: `<YYYYMMDD-HHMMSS>-<slug>`
    #[must_use]
    pub fn file_stem(&self) -> String {
        format!(
            "{}-{}",
            self.generated_at.format("%Y%m%d-%H%M%S"),
            slugify(self.title())
        )
    }

    /// Render front matter, notice and body as Markdown
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.metadata.to_front_matter();
        out.push('\n');

        if let Some(notice) = &self.notice {
            for line in notice.lines() {
                out.push_str("> ");
                out.push_str(line);
                out.push('\n');
            }
            out.push('\n');
        }

        let body = format_body(&self.content.body);
        if !body.is_empty() {
            out.push_str(&body);
            out.push('\n');
        }
        out
    }
}

/// Builds documents and stores them in the output directory
#[derive(Debug, Clone)]
pub struct DocumentAssembler {
    options: DocumentOptions,
    index: PostIndex,
}

impl DocumentAssembler {
    /// Create an assembler
    #[must_use]
    pub fn new(options: DocumentOptions) -> Self {
        let index = PostIndex::in_dir(&options.output_dir);
        Self { options, index }
    }

    /// The assembler settings
    #[must_use]
    pub fn options(&self) -> &DocumentOptions {
        &self.options
    }

    /// The index persisted posts are recorded in
    #[must_use]
    pub fn index(&self) -> &PostIndex {
        &self.index
    }

    /// Assemble a document stamped with the current time
    #[must_use]
    pub fn assemble(
        &self,
        content: GeneratedContent,
        records: &[ChangeRecord],
        summary: &RepositorySummary,
    ) -> AssembledDocument {
        self.assemble_at(content, records, summary, Utc::now())
    }

    /// Assemble a document stamped with `generated_at`
    #[must_use]
    pub fn assemble_at(
        &self,
        content: GeneratedContent,
        records: &[ChangeRecord],
        summary: &RepositorySummary,
        generated_at: DateTime<Utc>,
    ) -> AssembledDocument {
        let mut metadata = Metadata::new();
        metadata.insert("title", content.title.as_str());
        metadata.insert(
            "date",
            generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        metadata.insert("commit_range", commit_range_label(records));
        metadata.insert("record_count", records.len());
        metadata.insert("commit_count", summary.commit_count);
        metadata.insert("files_touched", summary.files_touched);
        metadata.insert("additions", summary.total_additions);
        metadata.insert("deletions", summary.total_deletions);
        metadata.insert("content_source", content.source.as_str());

        if let Some((start, end)) = summary.time_range {
            metadata.insert("period_start", start.to_rfc3339_opts(SecondsFormat::Secs, true));
            metadata.insert("period_end", end.to_rfc3339_opts(SecondsFormat::Secs, true));
        }
        if content.omitted_records > 0 {
            metadata.insert("omitted_records", content.omitted_records);
        }
        if let Some(author) = &self.options.author {
            metadata.insert("author", author.as_str());
        }
        if !self.options.categories.is_empty() {
            metadata.insert("categories", self.options.categories.clone());
        }
        if !self.options.tags.is_empty() {
            metadata.insert("tags", self.options.tags.clone());
        }

        let notice = match content.source {
            ContentSource::Generated => self.options.notice.clone(),
            ContentSource::Fallback => None,
        };

        AssembledDocument {
            metadata,
            content,
            generated_at,
            notice,
        }
    }

    /// Write `document` under the output directory and record it in the index
    ///
    /// Returns the path the document was written to. If the index entry
    /// cannot be written the new document is removed again, so every post
    /// on disk is recorded in the index.
    ///
    /// # Errors
    ///
    /// Returns `PersistError` if the directory, the document or the index
    /// entry cannot be written.
    pub fn persist(&self, document: &AssembledDocument) -> Result<PathBuf, PersistError> {
        let dir = self.options.output_dir.as_path();
        ensure_dir(dir)?;

        let path = store::write_new(dir, &document.file_stem(), &document.render())?;
        let entry = IndexEntry {
            run_id: Uuid::new_v4(),
            generated_at: document.generated_at,
            title: document.title().to_string(),
            record_count: document.record_count(),
            content_source: document.content.source,
            storage_path: path.clone(),
        };
        if let Err(err) = self.index.append(&entry) {
            if let Err(remove_err) = std::fs::remove_file(&path) {
                warn!(
                    path = %path.display(),
                    error = %remove_err,
                    "failed to remove post after index error"
                );
            }
            return Err(err);
        }

        info!(
            path = %path.display(),
            run_id = %entry.run_id,
            source = %entry.content_source,
            "post persisted"
        );
        Ok(path)
    }
}

fn ensure_dir(dir: &Path) -> Result<(), PersistError> {
    std::fs::create_dir_all(dir).map_err(|source| PersistError::CreateDirectory {
        path: dir.to_path_buf(),
        source,
    })
}

/// Short ids of the oldest and newest commit, inclusive: `abc1234..def5678`
///
/// A single commit is named alone; no records yield `none`.
#[must_use]
pub fn commit_range_label(records: &[ChangeRecord]) -> String {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) if first.commit_id != last.commit_id => {
            format!("{}..{}", first.short_commit_id(), last.short_commit_id())
        }
        (Some(only), _) => only.short_commit_id().to_string(),
        _ => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use devlog_git::{ChangeKind, Commit};
    use similar_asserts::assert_eq;

    fn records() -> Vec<ChangeRecord> {
        let make = |id: char, minute: u32| Commit {
            id: id.to_string().repeat(40),
            author: "Test Author".to_string(),
            timestamp: Utc.with_ymd_and_hms(2026, 1, 17, 9, minute, 0).unwrap(),
            message: "Change".to_string(),
            parents: vec![],
        };
        let (a, b) = (make('a', 0), make('b', 30));
        vec![
            ChangeRecord::new(&a, "src/lib.rs", ChangeKind::Added, 10, 0),
            ChangeRecord::new(&b, "src/lib.rs", ChangeKind::Modified, 3, 2),
        ]
    }

    fn generated(body: &str) -> GeneratedContent {
        GeneratedContent {
            title: "Parser Rewrite".to_string(),
            body: body.to_string(),
            source: ContentSource::Generated,
            records_in_context: 2,
            omitted_records: 0,
        }
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 17, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_metadata_keys() {
        let records = records();
        let summary = RepositorySummary::from_records(&records);
        let assembler = DocumentAssembler::new(DocumentOptions {
            author: Some("Dev".to_string()),
            ..Default::default()
        });
        let doc = assembler.assemble_at(generated("Body"), &records, &summary, at(12));

        assert_eq!(
            doc.metadata.keys().collect::<Vec<_>>(),
            vec![
                "title",
                "date",
                "commit_range",
                "record_count",
                "commit_count",
                "files_touched",
                "additions",
                "deletions",
                "content_source",
                "period_start",
                "period_end",
                "author",
                "categories",
                "tags",
            ]
        );
        assert_eq!(doc.metadata.get("commit_range").and_then(|v| v.as_text()), Some("aaaaaaa..bbbbbbb"));
        assert_eq!(doc.metadata.get("additions").and_then(|v| v.as_integer()), Some(13));
        assert_eq!(doc.record_count(), 2);
    }

    #[test]
    fn test_assemble_is_idempotent_for_fixed_time() {
        let records = records();
        let summary = RepositorySummary::from_records(&records);
        let assembler = DocumentAssembler::new(DocumentOptions::default());

        let first = assembler.assemble_at(generated("Body"), &records, &summary, at(12));
        let second = assembler.assemble_at(generated("Body"), &records, &summary, at(12));
        assert_eq!(first, second);

        let later = assembler.assemble_at(generated("Body"), &records, &summary, at(13));
        let differing: Vec<_> = first
            .metadata
            .iter()
            .zip(later.metadata.iter())
            .filter(|(a, b)| a != b)
            .map(|((key, _), _)| key)
            .collect();
        assert_eq!(differing, vec!["date"]);
    }

    #[test]
    fn test_render_layout() {
        let assembler = DocumentAssembler::new(DocumentOptions {
            notice: Some("Auto-written.".to_string()),
            categories: vec![],
            tags: vec![],
            ..Default::default()
        });
        let doc = assembler.assemble_at(
            generated("# Parser Rewrite\n\nWe rewrote it (1a2b3c4d)."),
            &[],
            &RepositorySummary::default(),
            at(12),
        );

        let rendered = doc.render();
        assert!(rendered.starts_with("---\ntitle: \"Parser Rewrite\"\ndate: \"2026-01-17T12:00:00Z\"\n"));
        assert!(rendered.contains("content_source: \"generated\"\n---\n\n> Auto-written.\n\nWe rewrote it (`1a2b3c4d`).\n"));
        assert!(!rendered.contains("# Parser Rewrite"));
    }

    #[test]
    fn test_fallback_has_no_notice_and_no_empty_body() {
        let assembler = DocumentAssembler::new(DocumentOptions::default());
        let content = GeneratedContent {
            title: "Development Log".to_string(),
            body: String::new(),
            source: ContentSource::Fallback,
            records_in_context: 0,
            omitted_records: 0,
        };
        let doc = assembler.assemble_at(content, &[], &RepositorySummary::default(), at(8));

        assert_eq!(doc.notice, None);
        assert!(!doc.metadata.contains_key("period_start"));
        assert_eq!(doc.metadata.get("commit_range").and_then(|v| v.as_text()), Some("none"));
        assert!(doc.render().ends_with("---\n\n"));
    }

    #[test]
    fn test_omitted_records_in_metadata() {
        let records = records();
        let summary = RepositorySummary::from_records(&records);
        let assembler = DocumentAssembler::new(DocumentOptions::default());
        let content = GeneratedContent {
            omitted_records: 7,
            ..generated("Body")
        };
        let doc = assembler.assemble_at(content, &records, &summary, at(12));
        assert_eq!(doc.metadata.get("omitted_records").and_then(|v| v.as_integer()), Some(7));
    }

    #[test]
    fn test_file_stem() {
        let assembler = DocumentAssembler::new(DocumentOptions::default());
        let doc = assembler.assemble_at(
            generated("Body"),
            &[],
            &RepositorySummary::default(),
            Utc.with_ymd_and_hms(2026, 1, 17, 9, 5, 7).unwrap(),
        );
        assert_eq!(doc.file_stem(), "20260117-090507-parser-rewrite");
    }

    #[test]
    fn test_commit_range_label_single_commit() {
        let records = records();
        assert_eq!(commit_range_label(&records[..1]), "aaaaaaa");
        assert_eq!(commit_range_label(&[]), "none");
    }
}
