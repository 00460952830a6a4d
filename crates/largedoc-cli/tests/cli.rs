use std::process::Command;

use largedoc::generate::{DEFAULT_OUTPUT_PATH, DEFAULT_REPETITIONS, LOREM_SENTENCE};
use largedoc::parts::WordprocessingDocument;

#[test]
fn test_writes_large_doc_in_working_directory() {
  let dir = tempfile::tempdir().unwrap();

  let output = Command::new(env!("CARGO_BIN_EXE_largedoc"))
    .current_dir(dir.path())
    .output()
    .unwrap();

  assert!(
    output.status.success(),
    "stderr: {}",
    String::from_utf8_lossy(&output.stderr)
  );

  let path = dir.path().join(DEFAULT_OUTPUT_PATH);
  assert!(std::fs::metadata(&path).unwrap().len() > 0);

  let docx = WordprocessingDocument::new_from_file(&path).unwrap();

  let paragraphs = docx.paragraphs();
  assert_eq!(paragraphs.len(), 1);
  assert_eq!(paragraphs[0].text(), LOREM_SENTENCE.repeat(DEFAULT_REPETITIONS));
}

#[test]
fn test_overwrites_existing_output() {
  let dir = tempfile::tempdir().unwrap();

  let path = dir.path().join(DEFAULT_OUTPUT_PATH);
  std::fs::write(&path, b"stale").unwrap();

  let status = Command::new(env!("CARGO_BIN_EXE_largedoc"))
    .current_dir(dir.path())
    .status()
    .unwrap();

  assert!(status.success());
  assert!(WordprocessingDocument::new_from_file(&path).is_ok());
}

#[test]
fn test_fails_when_output_cannot_be_created() {
  let dir = tempfile::tempdir().unwrap();

  std::fs::create_dir(dir.path().join(DEFAULT_OUTPUT_PATH)).unwrap();

  let output = Command::new(env!("CARGO_BIN_EXE_largedoc"))
    .current_dir(dir.path())
    .output()
    .unwrap();

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("failed to write large_doc.docx"));
}
