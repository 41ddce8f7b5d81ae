//! Integration tests for devlog-post
//!
//! These tests persist assembled documents into temporary output
//! directories and check the files and index left behind.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, TimeZone, Utc};
use devlog_content::{ContentSource, GeneratedContent};
use devlog_git::{ChangeKind, ChangeRecord, Commit, RepositorySummary};
use devlog_post::{DocumentAssembler, DocumentOptions, PersistError, PostIndex, INDEX_FILE};
use similar_asserts::assert_eq;
use tempfile::TempDir;

fn assembler(dir: &TempDir) -> DocumentAssembler {
    DocumentAssembler::new(DocumentOptions {
        output_dir: dir.path().join("posts"),
        ..Default::default()
    })
}

fn content(title: &str) -> GeneratedContent {
    GeneratedContent {
        title: title.to_string(),
        body: "## Introduction\n\nSomething changed (abc1234).".to_string(),
        source: ContentSource::Generated,
        records_in_context: 1,
        omitted_records: 0,
    }
}

fn records() -> Vec<ChangeRecord> {
    let commit = Commit {
        id: "abc1234".repeat(5) + "abcde",
        author: "Test Author".to_string(),
        timestamp: Utc.with_ymd_and_hms(2026, 1, 17, 9, 0, 0).unwrap(),
        message: "Change".to_string(),
        parents: vec![],
    };
    vec![ChangeRecord::new(&commit, "README.md", ChangeKind::Modified, 2, 1)]
}

fn fixed_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 17, 12, 30, 0).unwrap()
}

#[test]
fn test_persist_writes_document_and_index() {
    let dir = TempDir::new().expect("tempdir");
    let assembler = assembler(&dir);
    let records = records();
    let summary = RepositorySummary::from_records(&records);

    let doc = assembler.assemble_at(content("Weekly Notes"), &records, &summary, fixed_time());
    let path = assembler.persist(&doc).expect("persist");

    assert_eq!(path, dir.path().join("posts/20260117-123000-weekly-notes.md"));
    let written = std::fs::read_to_string(&path).expect("read post");
    assert_eq!(written, doc.render());
    assert!(written.contains("Something changed (`abc1234`)."));

    let entries = assembler.index().load().expect("load index");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "Weekly Notes");
    assert_eq!(entries[0].record_count, 1);
    assert_eq!(entries[0].content_source, ContentSource::Generated);
    assert_eq!(entries[0].storage_path, path);
    assert_eq!(entries[0].generated_at, fixed_time());
}

#[test]
fn test_same_stem_gets_distinct_paths() {
    let dir = TempDir::new().expect("tempdir");
    let assembler = assembler(&dir);

    let first = assembler.assemble_at(content("Same Title"), &[], &RepositorySummary::default(), fixed_time());
    let second = assembler.assemble_at(content("Same Title"), &[], &RepositorySummary::default(), fixed_time());

    let first_path = assembler.persist(&first).expect("persist first");
    let second_path = assembler.persist(&second).expect("persist second");

    assert!(first_path != second_path);
    assert!(first_path.ends_with("20260117-123000-same-title.md"));
    assert!(second_path.ends_with("20260117-123000-same-title-2.md"));

    let entries = assembler.index().load().expect("load index");
    let run_ids: Vec<_> = entries.iter().map(|entry| entry.run_id).collect();
    assert_eq!(run_ids.len(), 2);
    assert!(run_ids[0] != run_ids[1]);
}

#[test]
fn test_corrupt_index_recreated_on_persist() {
    let dir = TempDir::new().expect("tempdir");
    let assembler = assembler(&dir);
    std::fs::create_dir_all(dir.path().join("posts")).expect("mkdir");
    std::fs::write(dir.path().join("posts").join(INDEX_FILE), "\u{0}garbage").expect("seed");

    let doc = assembler.assemble_at(content("After Corruption"), &[], &RepositorySummary::default(), fixed_time());
    assembler.persist(&doc).expect("persist");

    let entries = assembler.index().load().expect("load index");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].title, "After Corruption");
}

#[test]
fn test_unwritable_output_is_fatal() {
    let dir = TempDir::new().expect("tempdir");
    let blocker = dir.path().join("posts");
    std::fs::write(&blocker, "not a directory").expect("seed file");

    let assembler = assembler(&dir);
    let doc = assembler.assemble_at(content("Nowhere"), &[], &RepositorySummary::default(), fixed_time());
    let result = assembler.persist(&doc);

    assert!(matches!(result, Err(PersistError::CreateDirectory { .. })));
    assert_eq!(std::fs::read_to_string(&blocker).expect("read"), "not a directory");
}

#[test]
fn test_concurrent_persists_keep_every_entry() {
    let dir = TempDir::new().expect("tempdir");
    let assembler = Arc::new(assembler(&dir));
    let workers = 8;

    let handles: Vec<_> = (0..workers)
        .map(|_| {
            let assembler = Arc::clone(&assembler);
            thread::spawn(move || {
                let doc = assembler.assemble_at(
                    content("Parallel Run"),
                    &[],
                    &RepositorySummary::default(),
                    fixed_time(),
                );
                assembler.persist(&doc).expect("persist")
            })
        })
        .collect();

    let mut paths: Vec<_> = handles
        .into_iter()
        .map(|handle| handle.join().expect("worker"))
        .collect();
    paths.sort();
    paths.dedup();
    assert_eq!(paths.len(), workers);

    let index = PostIndex::in_dir(&dir.path().join("posts"));
    assert_eq!(index.load().expect("load index").len(), workers);
}

#[test]
fn test_index_failure_removes_written_post() {
    let dir = TempDir::new().expect("tempdir");
    let assembler = assembler(&dir);
    let posts = dir.path().join("posts");
    // a directory where the index file belongs makes every append fail
    std::fs::create_dir_all(posts.join(INDEX_FILE)).expect("block index path");

    let doc = assembler.assemble_at(content("Lost Entry"), &records(), &RepositorySummary::default(), fixed_time());
    let result = assembler.persist(&doc);
    assert!(matches!(result, Err(PersistError::Index { .. })));

    let leftovers: Vec<_> = std::fs::read_dir(&posts)
        .expect("read posts dir")
        .filter_map(Result::ok)
        .filter(|entry| entry.path().extension().is_some_and(|ext| ext == "md"))
        .collect();
    assert!(leftovers.is_empty(), "no unindexed post may remain");

    // once the index is writable again a retry takes the original name
    std::fs::remove_dir(posts.join(INDEX_FILE)).expect("unblock index path");
    let path = assembler.persist(&doc).expect("persist retry");
    assert_eq!(path, posts.join("20260117-123000-lost-entry.md"));
    assert_eq!(assembler.index().load().expect("load index").len(), 1);
}
