// Copyright (c) 2026 - present Nicholas D. Crosbie
// SPDX-License-Identifier: MIT

//! devlog-post: post assembly and storage for devlog
//!
//! This library crate turns generated content and the change records behind
//! it into a Markdown document with front matter, writes it to the output
//! directory without ever overwriting an existing post, and records it in a
//! JSONL index.
//!
//! # Example
//!
//! ```no_run
//! use devlog_content::{ContentSource, GeneratedContent};
//! use devlog_git::RepositorySummary;
//! use devlog_post::{DocumentAssembler, DocumentOptions};
//!
//! let assembler = DocumentAssembler::new(DocumentOptions::default());
//! let content = GeneratedContent {
//!     title: "Development Log".to_string(),
//!     body: String::new(),
//!     source: ContentSource::Fallback,
//!     records_in_context: 0,
//!     omitted_records: 0,
//! };
//! let document = assembler.assemble(content, &[], &RepositorySummary::default());
//! let path = assembler.persist(&document).expect("persist post");
//! println!("wrote {}", path.display());
//! ```

pub mod document;
pub mod error;
pub mod format;
pub mod index;
pub mod metadata;
pub mod slug;
pub mod store;

pub use document::{
    AssembledDocument, DEFAULT_NOTICE, DEFAULT_OUTPUT_DIR, DocumentAssembler, DocumentOptions,
    commit_range_label,
};
pub use error::PersistError;
pub use format::format_body;
pub use index::{INDEX_FILE, IndexEntry, PostIndex};
pub use metadata::{MetaValue, Metadata};
pub use slug::slugify;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::document::{AssembledDocument, DocumentAssembler, DocumentOptions};
    pub use crate::error::PersistError;
    pub use crate::index::{IndexEntry, PostIndex};
}
