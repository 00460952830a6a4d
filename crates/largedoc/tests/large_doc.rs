use std::io::Read;

use largedoc::generate::{
  write_large_document, FillerText, GenerateConfig, DEFAULT_REPETITIONS, LOREM_SENTENCE,
};
use largedoc::parts::WordprocessingDocument;

#[test]
fn test_write_large_document() {
  let dir = tempfile::tempdir().unwrap();

  let config = GenerateConfig {
    output_path: dir.path().join("large_doc.docx"),
    ..Default::default()
  };

  let report = write_large_document(&config).unwrap();

  assert_eq!(report.path, config.output_path);
  assert_eq!(report.char_count, 456_000);
  assert!(report.bytes_written > 0);

  let metadata = std::fs::metadata(&config.output_path).unwrap();
  assert_eq!(metadata.len(), report.bytes_written);

  let docx = WordprocessingDocument::new_from_file(&config.output_path).unwrap();

  let paragraphs = docx.paragraphs();
  assert_eq!(paragraphs.len(), 1);

  let text = paragraphs[0].text();
  assert_eq!(text.chars().count(), 456_000);
  assert_eq!(text, LOREM_SENTENCE.repeat(DEFAULT_REPETITIONS));
}

#[test]
fn test_large_document_package_layout() {
  let dir = tempfile::tempdir().unwrap();

  let config = GenerateConfig {
    output_path: dir.path().join("layout.docx"),
    filler: FillerText {
      sentence: LOREM_SENTENCE.to_string(),
      repetitions: 10,
    },
    title: Some("Filler".to_string()),
  };

  write_large_document(&config).unwrap();

  let mut archive = zip::ZipArchive::new(std::fs::File::open(&config.output_path).unwrap()).unwrap();

  for name in ["[Content_Types].xml", "_rels/.rels", "word/document.xml"] {
    assert!(archive.by_name(name).is_ok(), "missing {name}");
  }

  let mut document_xml = String::new();
  archive
    .by_name("word/document.xml")
    .unwrap()
    .read_to_string(&mut document_xml)
    .unwrap();

  assert_eq!(document_xml.matches("<w:p>").count(), 1);
  assert!(document_xml.contains(r#"<w:t xml:space="preserve">Lorem ipsum"#));

  let docx = WordprocessingDocument::new_from_file(&config.output_path).unwrap();
  assert_eq!(
    docx.core_properties().unwrap().title.as_deref(),
    Some("Filler")
  );
  assert_eq!(docx.extended_properties().unwrap().words, Some(80));
}

#[test]
fn test_write_into_missing_directory_fails() {
  let dir = tempfile::tempdir().unwrap();

  let config = GenerateConfig {
    output_path: dir.path().join("no/such/dir/large_doc.docx"),
    ..Default::default()
  };

  assert!(matches!(
    write_large_document(&config),
    Err(largedoc::common::SdkError::StdIoError(_))
  ));
}
