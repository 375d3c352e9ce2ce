//! Extraction diagnostics
//!
//! Recoverable problems found while extracting a document are reported as
//! [`Diagnostic`]s to a caller-supplied [`DiagnosticSink`]. Fatal problems
//! abort the current document and surface as a single diagnostic at the
//! batch level.

use serde::{Deserialize, Serialize};

/// A diagnostic message raised during extraction
///
/// # Example
///
/// ```
/// use docstruct_core::diagnostics::{codes, Diagnostic, Severity};
///
/// let diag = Diagnostic::warning("numbering instance 7 not found")
///     .with_code(codes::NUMBERING_NOT_FOUND)
///     .with_paragraph(12)
///     .with_help("the paragraph keeps its textual label, if any");
///
/// assert_eq!(diag.severity, Severity::Warning);
/// assert_eq!(diag.paragraph_id, Some(12));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Severity level of the diagnostic
    pub severity: Severity,

    /// The diagnostic message
    pub message: String,

    /// Optional diagnostic code (see [`codes`])
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Paragraph the diagnostic is recorded against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paragraph_id: Option<u32>,

    /// Source document, set at the batch level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Additional help text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Severity level of a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message
    Info,

    /// Recoverable problem, output is still produced
    Warning,

    /// Problem that dropped part of the output
    Error,

    /// The document could not be processed
    Fatal,
}

/// Diagnostic codes
pub mod codes {
    /// Numbering instance or level not defined in the numbering part
    pub const NUMBERING_NOT_FOUND: &str = "W001";
    /// Rendered label still contains a `%` placeholder
    pub const UNRESOLVED_PLACEHOLDER: &str = "W002";
    /// Run with no resolvable font name
    pub const MISSING_FONT_NAME: &str = "W003";
    /// Run with no resolvable font size
    pub const MISSING_FONT_SIZE: &str = "W004";
    /// Paragraph references an undefined style
    pub const UNKNOWN_PARAGRAPH_STYLE: &str = "W005";
    /// Run references an undefined character style
    pub const UNKNOWN_RUN_STYLE: &str = "W006";
    /// Paragraph belongs to a section that never recorded geometry
    pub const MISSING_SECTION_GEOMETRY: &str = "W007";
    /// Document properties part could not be read
    pub const INVALID_PROPERTIES: &str = "W008";
    /// Document failed to parse
    pub const DOCUMENT_FAILED: &str = "E001";
    /// Output for a document could not be written
    pub const OUTPUT_FAILED: &str = "E002";
}

impl Diagnostic {
    /// Create a new diagnostic
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            code: None,
            paragraph_id: None,
            file: None,
            help: None,
        }
    }

    /// Create a fatal diagnostic
    pub fn fatal(message: impl Into<String>) -> Self {
        Self::new(Severity::Fatal, message)
    }

    /// Create an error diagnostic
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Create a warning diagnostic
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Create an info diagnostic
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    /// Set the diagnostic code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Record the diagnostic against a paragraph
    pub fn with_paragraph(mut self, paragraph_id: u32) -> Self {
        self.paragraph_id = Some(paragraph_id);
        self
    }

    /// Set the source file
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Set help text
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Check if this is an error-level diagnostic
    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error | Severity::Fatal)
    }

    /// Check if this is a warning-level diagnostic
    pub fn is_warning(&self) -> bool {
        matches!(self.severity, Severity::Warning)
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: severity[code]: message
        write!(f, "{}", self.severity)?;
        if let Some(ref code) = self.code {
            write!(f, "[{}]", code)?;
        }
        write!(f, ": {}", self.message)?;

        if let Some(ref file) = self.file {
            write!(f, "\n  --> {}", file)?;
            if let Some(id) = self.paragraph_id {
                write!(f, " (paragraph {})", id)?;
            }
        } else if let Some(id) = self.paragraph_id {
            write!(f, "\n  --> paragraph {}", id)?;
        }

        if let Some(ref help) = self.help {
            write!(f, "\n  = help: {}", help)?;
        }

        Ok(())
    }
}

/// Receiver for diagnostics raised while a document is processed
pub trait DiagnosticSink {
    /// Record one diagnostic
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

/// A collection of diagnostics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// List of diagnostics
    diagnostics: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create a new empty diagnostics collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Check if there are any errors
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }

    /// Get the number of warnings
    pub fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    /// Diagnostics recorded against one paragraph
    pub fn for_paragraph(&self, paragraph_id: u32) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.paragraph_id == Some(paragraph_id))
    }

    /// Get all diagnostics
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Get the count
    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.into_iter()
    }
}
