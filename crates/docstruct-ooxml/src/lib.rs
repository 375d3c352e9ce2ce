//! # docstruct-ooxml
//!
//! WordprocessingML structural extraction for docstruct.
//!
//! This crate provides functionality to:
//! - Read DOCX packages and their parts
//! - Resolve theme fonts, style inheritance and list numbering
//! - Walk the body in document order and build paragraph records with
//!   rendered list labels, resolved typography and section geometry
//!
//! ## Example
//!
//! ```no_run
//! use docstruct_core::Diagnostics;
//! use docstruct_ooxml::{extract_path, ExtractOptions};
//!
//! let mut diagnostics = Diagnostics::new();
//! let doc = extract_path("report.docx", &ExtractOptions::default(), &mut diagnostics)?;
//!
//! for paragraph in doc.paragraphs() {
//!     println!("{} {}", paragraph.level_label, paragraph.text);
//! }
//! # Ok::<(), docstruct_ooxml::OoxmlError>(())
//! ```

pub mod archive;
pub mod document;
pub mod error;
pub mod extract;
pub mod numbering;
pub mod paragraph;
pub mod properties;
pub mod section;
pub mod styles;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod text;
pub mod theme;
pub(crate) mod xml;

pub use archive::OoxmlArchive;
pub use document::{RawDocument, RawParagraph, RawRun};
pub use error::{OoxmlError, Result};
pub use extract::{extract, extract_path, ExtractOptions};
pub use numbering::{CounterScope, NumFormat, NumberingDefinitions, NumberingResolver};
pub use paragraph::ParagraphParser;
pub use section::SectionTracker;
pub use styles::{FontSize, StyleDefinition, StyleSheet, StyleType};
pub use theme::ThemeFonts;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
