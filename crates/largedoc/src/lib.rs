//! Write and read WordprocessingML (`.docx`) packages, and generate the large
//! single-paragraph filler document.
//!
//! ```no_run
//! use largedoc::parts::WordprocessingDocument;
//!
//! let mut docx = WordprocessingDocument::create();
//! docx.add_paragraph("Hello, world. ");
//! docx.save_to_file("hello.docx").unwrap();
//! ```

pub mod common;
pub mod generate;
pub mod opc;
pub mod parts;
pub mod schemas;
