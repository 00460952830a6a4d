pub mod wordprocessing_document;

pub use wordprocessing_document::{
  CoreFilePropertiesPart, ExtendedFilePropertiesPart, MainDocumentPart, RawPart,
  StyleDefinitionsPart, WordprocessingDocument,
};
