//! Document extraction pipeline
//!
//! Runs the resolvers over one package in a single ordered pass:
//! properties, theme, styles and numbering are read up front, then the body
//! paragraphs are walked in document order, sections are attached and the
//! chapter classifier runs as the [`Document`] is assembled.
//!
//! Every call owns its resolver state, so independent packages can be
//! extracted in parallel.

use std::path::Path;

use docstruct_core::diagnostics::codes;
use docstruct_core::{ChapterRules, Diagnostic, DiagnosticSink, Document, DocumentProperties};

use crate::archive::OoxmlArchive;
use crate::document::RawDocument;
use crate::error::{OoxmlError, Result};
use crate::numbering::{CounterScope, NumberingDefinitions, NumberingResolver};
use crate::paragraph::ParagraphParser;
use crate::properties;
use crate::section;
use crate::styles::StyleSheet;
use crate::theme::ThemeFonts;

/// Extraction settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractOptions {
    /// How list counters are keyed
    pub counter_scope: CounterScope,
    /// Label rendered for bullet levels
    pub bullet_marker: String,
    /// Chapter classifier tunables
    pub chapter_rules: ChapterRules,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            counter_scope: CounterScope::Instance,
            bullet_marker: "-".to_string(),
            chapter_rules: ChapterRules::default(),
        }
    }
}

impl ExtractOptions {
    /// Create options with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how list counters are keyed
    pub fn with_counter_scope(mut self, scope: CounterScope) -> Self {
        self.counter_scope = scope;
        self
    }

    /// Set the label rendered for bullet levels
    pub fn with_bullet_marker(mut self, marker: impl Into<String>) -> Self {
        self.bullet_marker = marker.into();
        self
    }

    /// Set the chapter classifier tunables
    pub fn with_chapter_rules(mut self, rules: ChapterRules) -> Self {
        self.chapter_rules = rules;
        self
    }
}

/// Open a package from disk and extract it
pub fn extract_path<P: AsRef<Path>>(
    path: P,
    options: &ExtractOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<Document> {
    log::debug!("Opening {}", path.as_ref().display());
    let archive = OoxmlArchive::open(path)?;
    extract(&archive, options, sink)
}

/// Extract the structural paragraph table of a package
///
/// Recoverable anomalies go to `sink`; anything returned as an error
/// abandons this document.
pub fn extract(
    archive: &OoxmlArchive,
    options: &ExtractOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<Document> {
    let properties = match archive.app_xml().map(properties::parse) {
        Some(Ok(properties)) => properties,
        Some(Err(err)) => {
            log::warn!("Ignoring unreadable document properties: {}", err);
            sink.report(
                Diagnostic::warning(format!("Document properties could not be read: {}", err))
                    .with_code(codes::INVALID_PROPERTIES),
            );
            DocumentProperties::default()
        }
        None => DocumentProperties::default(),
    };
    log::info!(
        "Created by {} {}",
        properties.application.as_deref().unwrap_or("unknown application"),
        properties.app_version.as_deref().unwrap_or("")
    );

    let theme = match archive.theme_xml() {
        Some(xml) => ThemeFonts::parse(xml)?,
        None => {
            log::debug!("No theme part");
            ThemeFonts::default()
        }
    };

    let styles = match archive.styles_xml() {
        Some(xml) => StyleSheet::parse(xml, &theme)?,
        None => {
            log::debug!("No styles part");
            StyleSheet::empty()
        }
    };

    let definitions = match archive.numbering_xml() {
        Some(xml) => NumberingDefinitions::parse(xml)?,
        None => {
            log::debug!("No numbering part");
            NumberingDefinitions::empty()
        }
    };

    let body = RawDocument::parse(archive.document_xml()?)?;

    let numbering = NumberingResolver::new(
        definitions,
        &styles,
        options.counter_scope,
        options.bullet_marker.clone(),
    );
    let mut parser = ParagraphParser::new(&styles, &theme, numbering);

    let mut records = Vec::new();
    for raw in &body.paragraphs {
        if let Some(record) = parser.parse(raw, sink)? {
            records.push(record);
        }
    }

    let sections = parser.finish(body.final_section);
    section::annotate(&mut records, &sections, sink);

    if records.is_empty() {
        return Err(OoxmlError::NoParagraphs);
    }

    let document = Document::new(records, sections, properties, &options.chapter_rules);
    log::info!(
        "Extracted {} of {} paragraphs in {} sections ({} chapter starts, {:?} mode)",
        document.len(),
        body.paragraphs.len(),
        document.sections().len(),
        document.chapter_starts().count(),
        document.chapter_mode()
    );

    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DocxBuilder;
    use docstruct_core::NullSink;

    #[test]
    fn test_options_builder() {
        let options = ExtractOptions::new()
            .with_counter_scope(CounterScope::AbstractDefinition)
            .with_bullet_marker("*");

        assert_eq!(options.counter_scope, CounterScope::AbstractDefinition);
        assert_eq!(options.bullet_marker, "*");
        assert_eq!(options.chapter_rules, ChapterRules::default());
    }

    #[test]
    fn test_extract_minimal_package() {
        let archive = DocxBuilder::new()
            .body(
                r#"<w:p><w:r><w:t>Only paragraph</w:t></w:r></w:p>
                <w:sectPr><w:pgSz w:w="12240" w:h="15840"/></w:sectPr>"#,
            )
            .archive()
            .unwrap();

        let mut sink: Vec<Diagnostic> = Vec::new();
        let doc = extract(&archive, &ExtractOptions::default(), &mut sink).unwrap();

        assert_eq!(doc.len(), 1);
        assert_eq!(doc.paragraphs()[0].text, "Only paragraph");
        assert_eq!(doc.paragraphs()[0].section_num, 1);
        assert_eq!(doc.paragraphs()[0].section.as_ref().unwrap().page_width, Some(8.5));
        // No styles part: neither font nor size resolves
        let reported: Vec<_> = sink.iter().filter_map(|d| d.code.as_deref()).collect();
        assert_eq!(reported, vec![codes::MISSING_FONT_NAME, codes::MISSING_FONT_SIZE]);
    }

    #[test]
    fn test_no_paragraphs_is_fatal() {
        let archive = DocxBuilder::new()
            .body(r#"<w:p/><w:p><w:r><w:t>   </w:t></w:r></w:p>"#)
            .archive()
            .unwrap();

        let err = extract(&archive, &ExtractOptions::default(), &mut NullSink).unwrap_err();
        assert!(matches!(err, OoxmlError::NoParagraphs));
    }

    #[test]
    fn test_extract_path_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.docx");
        let bytes = DocxBuilder::new()
            .body(r#"<w:p><w:r><w:t>On disk</w:t></w:r></w:p>"#)
            .build()
            .unwrap();
        std::fs::write(&path, bytes).unwrap();

        let doc = extract_path(&path, &ExtractOptions::default(), &mut NullSink).unwrap();
        assert_eq!(doc.paragraphs()[0].text, "On disk");

        let missing = extract_path(dir.path().join("missing.docx"), &ExtractOptions::default(), &mut NullSink);
        assert!(matches!(missing, Err(OoxmlError::Io(_))));
    }

    #[test]
    fn test_missing_document_part() {
        let archive = OoxmlArchive::default();
        let err = extract(&archive, &ExtractOptions::default(), &mut NullSink).unwrap_err();
        assert!(matches!(err, OoxmlError::MissingFile(_)));
    }
}
