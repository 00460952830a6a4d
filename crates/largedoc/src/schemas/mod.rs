//! WordprocessingML markup: the main document and its style definitions.

pub mod styles;
pub mod wordprocessing;

pub use styles::{RunProperties, Style, StyleType, Styles};
pub use wordprocessing::{
  Body, BodyChild, Document, Paragraph, ParagraphContent, Run, RunContent, SectionProperties,
};
