use std::fs;

use grabber_engine::{ensure_output_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("w").join("1234567");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn committed_write_lands_under_final_name() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let mut pending = writer.begin().unwrap();
    pending.write_chunk(b"hello ").unwrap();
    pending.write_chunk(b"world").unwrap();
    assert_eq!(pending.bytes_written(), 11);
    assert!(!writer.exists("1.png"));

    let path = pending.commit("1.png").unwrap();
    assert_eq!(path.file_name().unwrap(), "1.png");
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello world");
    assert!(writer.exists("1.png"));
}

#[test]
fn commit_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());
    fs::write(temp.path().join("1.png"), "old").unwrap();

    let mut pending = writer.begin().unwrap();
    pending.write_chunk(b"new").unwrap();
    let path = pending.commit("1.png").unwrap();

    assert_eq!(fs::read_to_string(path).unwrap(), "new");
}

#[test]
fn abandoned_write_leaves_nothing_behind() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let mut pending = writer.begin().unwrap();
    pending.write_chunk(b"partial").unwrap();
    drop(pending);

    assert_eq!(fs::read_dir(temp.path()).unwrap().count(), 0);
}

#[test]
fn begin_fails_when_directory_is_missing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("missing"));
    assert!(writer.begin().is_err());
}
