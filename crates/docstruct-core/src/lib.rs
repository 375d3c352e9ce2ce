//! docstruct-core - structural document model
//!
//! Holds the output side of the docstruct pipeline:
//! - [`Document`] and [`ParagraphRecord`]: the ordered, read-only paragraph table
//! - [`chapter`]: the chapter-start heuristics run when a document is assembled
//! - [`diagnostics`]: recoverable-problem reporting
//! - [`sentence`]: the sentence segmentation boundary and line export
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeMap;
//! use docstruct_core::{ChapterRules, Document, DocumentProperties, ParagraphRecord};
//!
//! let paragraphs = vec![
//!     ParagraphRecord::new(1, 1, "APPENDIX A: SCOPE"),
//!     ParagraphRecord::new(2, 1, "Scope text."),
//! ];
//! let doc = Document::new(
//!     paragraphs,
//!     BTreeMap::new(),
//!     DocumentProperties::default(),
//!     &ChapterRules::default(),
//! );
//!
//! assert!(doc.paragraphs()[0].is_chapter());
//! assert!(!doc.paragraphs()[1].is_chapter());
//! ```

pub mod chapter;
pub mod diagnostics;
pub mod model;
pub mod sentence;

pub use chapter::{ChapterMode, ChapterRules};
pub use diagnostics::{Diagnostic, DiagnosticSink, Diagnostics, NullSink, Severity};
pub use model::{
    Document, DocumentProperties, ParagraphRecord, ParagraphRow, SectionGeometry, NONE_SENTINEL,
};
pub use sentence::{PunctuationSegmenter, SentenceSegmenter};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
