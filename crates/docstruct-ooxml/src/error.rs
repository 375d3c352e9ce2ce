//! Error types for OOXML extraction
//!
//! Every variant aborts the document being processed. Recoverable problems
//! are reported as diagnostics instead and never show up here.

use thiserror::Error;

/// Errors that stop extraction of one document
#[derive(Error, Debug)]
pub enum OoxmlError {
    /// Error reading the ZIP archive
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the package
    #[error("Required file not found: {0}")]
    MissingFile(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// A style inherits from a style that is not defined
    #[error("Style '{style}' is based on unknown style '{based_on}'")]
    UnknownStyleReference {
        /// Style carrying the dangling reference
        style: String,
        /// Missing parent id
        based_on: String,
    },

    /// A style inheritance chain loops back on itself
    #[error("Style inheritance cycle through '{0}'")]
    StyleCycle(String),

    /// A numbering level uses a format that cannot be rendered
    #[error("Unsupported number format: {0}")]
    UnsupportedNumberFormat(String),

    /// No paragraph survived the walk
    #[error("Document contains no paragraphs with text")]
    NoParagraphs,
}

impl OoxmlError {
    /// Whether the error aborts the document being processed
    ///
    /// Always true: no variant is recoverable, and none escapes past the
    /// document that raised it.
    pub fn is_fatal_for_document(&self) -> bool {
        true
    }
}

/// Result type for OOXML operations
pub type Result<T> = std::result::Result<T, OoxmlError>;
