use echo_script::{FileWriter, OpenMode, WriteError};
use std::fs;
use std::io::Cursor;

#[test]
fn write_truncates_existing_content() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "old").unwrap();

    let mut writer = FileWriter::write(&path);
    assert_eq!(writer.mode(), OpenMode::Truncate);
    assert_eq!(writer.info().map(|m| m.len()), Some(3));

    writer.string("hello");
    assert!(writer.err().is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), "hello");
}

#[test]
fn append_keeps_existing_content() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("notes.txt");
    fs::write(&path, "old").unwrap();

    assert!(FileWriter::append(&path).string("hello").err().is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), "oldhello");
}

#[test]
fn lines_are_joined_with_newlines() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("lines.txt");

    FileWriter::write(&path).lines(["a", "b", "c"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc");

    // appending more lines starts right after the last one
    FileWriter::append(&path).string("\n").lines(["d"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a\nb\nc\nd");
}

#[test]
fn bytes_error_depends_on_parent_directory() {
    let tmp = tempfile::tempdir().unwrap();

    let ok = tmp.path().join("blob.bin");
    assert!(FileWriter::write(&ok).bytes(b"\x00\xff").err().is_none());
    assert_eq!(fs::read(&ok).unwrap(), b"\x00\xff");

    let bad = tmp.path().join("missing").join("blob.bin");
    let mut writer = FileWriter::write(&bad);
    writer.bytes(b"\x00\xff");
    assert!(matches!(writer.err(), Some(WriteError::Open { .. })));
    assert!(writer.info().is_none());
}

#[test]
fn read_from_copies_the_whole_stream() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("copy.txt");
    let payload = "line\n".repeat(10_000);

    let mut writer = FileWriter::write(&path);
    writer.read_from(Cursor::new(payload.clone()));
    assert!(writer.err().is_none());
    assert_eq!(fs::read_to_string(&path).unwrap(), payload);
}
