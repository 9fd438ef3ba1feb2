use silver_core::{
    read_tree, write_tree, CodecError, Document, DocumentError, StoreError, SILVER_FILE_EXTENSION,
};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn document_path(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(format!("{name}.{SILVER_FILE_EXTENSION}"))
}

#[test]
fn save_then_load_restores_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = document_path(&dir, "groceries");

    let mut document = Document::empty();
    document
        .load_text("0|a|text||Groceries\n1|b|todo|{\"done\":false}|Milk\n0|c|text||Work")
        .unwrap();
    document.save_file(&path).unwrap();

    let mut reopened = Document::with_default_bullet();
    reopened.load_file(&path).unwrap();
    assert_eq!(reopened.to_text(), document.to_text());
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "0|a|text||Groceries\n1|b|todo|{\"done\":false}|Milk\n0|c|text||Work"
    );
}

#[test]
fn empty_file_loads_seed_bullet() {
    let dir = tempfile::tempdir().unwrap();
    let path = document_path(&dir, "empty");
    fs::write(&path, "").unwrap();

    let tree = read_tree(&path).unwrap();
    assert_eq!(tree.len(), 1);
    assert!(tree.lookup("hello-0").is_some());
}

#[test]
fn missing_file_is_an_io_error_with_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = document_path(&dir, "missing");

    let err = read_tree(&path).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(err.path(), &path);
}

#[test]
fn invalid_file_is_a_codec_error_and_keeps_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = document_path(&dir, "broken");
    fs::write(&path, "0|a|text||A\n1|b|text|{oops|B\n").unwrap();

    let mut document = Document::with_default_bullet();
    let err = document.load_file(&path).unwrap_err();
    assert!(matches!(
        err,
        DocumentError::Store(StoreError::Codec {
            source: CodecError::MetaParseError { line_number: 2, .. },
            ..
        })
    ));
    assert_eq!(document.to_text(), "0|hello-0|text||Hello!");
}

#[test]
fn save_overwrites_previous_content_and_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = document_path(&dir, "notes");
    fs::write(&path, "0|old|text||Old\n0|older|text||Older").unwrap();

    let tree = silver_core::decode_str("0|new|text||New").unwrap();
    write_tree(&path, &tree).unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "0|new|text||New");
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[test]
fn save_into_missing_directory_fails_without_side_effects() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("notes.silver");

    let document = Document::with_default_bullet();
    let err = document.save_file(&path).unwrap_err();
    assert!(matches!(err, DocumentError::Store(StoreError::Io { .. })));
    assert!(!path.exists());
}
