//! The large filler document: one paragraph of a sentence repeated many
//! times, saved as a `.docx`.

use std::path::{Path, PathBuf};

use crate::common::SdkError;
use crate::parts::WordprocessingDocument;

pub const LOREM_SENTENCE: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ";

pub const DEFAULT_REPETITIONS: usize = 8000;

pub const DEFAULT_OUTPUT_PATH: &str = "large_doc.docx";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FillerText {
  pub sentence: String,
  pub repetitions: usize,
}

impl Default for FillerText {
  fn default() -> Self {
    Self {
      sentence: LOREM_SENTENCE.to_string(),
      repetitions: DEFAULT_REPETITIONS,
    }
  }
}

impl FillerText {
  pub fn render(&self) -> String {
    self.sentence.repeat(self.repetitions)
  }

  pub fn char_count(&self) -> usize {
    self.sentence.chars().count() * self.repetitions
  }
}

#[derive(Clone, Debug)]
pub struct GenerateConfig {
  pub output_path: PathBuf,
  pub filler: FillerText,
  pub title: Option<String>,
}

impl Default for GenerateConfig {
  fn default() -> Self {
    Self {
      output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
      filler: FillerText::default(),
      title: None,
    }
  }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerateReport {
  pub path: PathBuf,
  pub char_count: usize,
  pub bytes_written: u64,
}

/// A fresh document holding the filler text as its only paragraph.
pub fn build_document(filler: &FillerText) -> WordprocessingDocument {
  let mut docx = WordprocessingDocument::create();

  docx.add_paragraph(&filler.render());

  docx
}

pub fn write_large_document(config: &GenerateConfig) -> Result<GenerateReport, SdkError> {
  let filler = &config.filler;

  tracing::info!(
    repetitions = filler.repetitions,
    chars = filler.char_count(),
    "building filler document"
  );

  let mut docx = build_document(filler);

  if let Some(title) = &config.title {
    docx.core_properties_mut().title = Some(title.clone());
  }

  docx.save_to_file(&config.output_path)?;

  let bytes_written = file_size(&config.output_path)?;

  tracing::info!(
    path = %config.output_path.display(),
    bytes = bytes_written,
    "saved filler document"
  );

  Ok(GenerateReport {
    path: config.output_path.clone(),
    char_count: filler.char_count(),
    bytes_written,
  })
}

fn file_size(path: &Path) -> Result<u64, SdkError> {
  Ok(std::fs::metadata(path)?.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_default_filler() {
    let filler = FillerText::default();

    let text = filler.render();

    assert_eq!(LOREM_SENTENCE.len(), 57);
    assert_eq!(text.len(), 456_000);
    assert_eq!(filler.char_count(), 456_000);
    assert!(text.starts_with("Lorem ipsum dolor sit amet"));
    assert!(text.ends_with("adipiscing elit. "));
    assert_eq!(text.matches(LOREM_SENTENCE).count(), DEFAULT_REPETITIONS);
  }

  #[test]
  fn test_char_count_is_chars_not_bytes() {
    let filler = FillerText {
      sentence: "naïve ".to_string(),
      repetitions: 3,
    };

    assert_eq!(filler.char_count(), 18);
    assert_eq!(filler.render().chars().count(), 18);
  }

  #[test]
  fn test_zero_repetitions() {
    let filler = FillerText {
      sentence: LOREM_SENTENCE.to_string(),
      repetitions: 0,
    };

    let docx = build_document(&filler);

    assert_eq!(docx.paragraphs().len(), 1);
    assert!(docx.paragraphs()[0].runs().is_empty());
  }

  #[test]
  fn test_build_document_has_one_run() {
    let docx = build_document(&FillerText::default());

    let paragraphs = docx.paragraphs();
    assert_eq!(paragraphs.len(), 1);
    assert_eq!(paragraphs[0].runs().len(), 1);
    assert_eq!(paragraphs[0].runs()[0].content.len(), 1);
    assert_eq!(paragraphs[0].text().len(), 456_000);
  }

  #[test]
  fn test_default_config() {
    let config = GenerateConfig::default();

    assert_eq!(config.output_path, PathBuf::from("large_doc.docx"));
    assert_eq!(config.filler, FillerText::default());
    assert!(config.title.is_none());
  }
}
