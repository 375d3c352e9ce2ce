//! Shared test utilities for docstruct-ooxml
//!
//! Fixtures are built in memory as real ZIP packages so the whole pipeline,
//! archive reading included, is exercised by tests.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;
use zip::ZipWriter;

use crate::archive::{OoxmlArchive, APP_PART, DOCUMENT_PART, NUMBERING_PART, STYLES_PART, THEME_PART};
use crate::error::Result;

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>
</Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
</Relationships>"#;

/// Builder for in-memory DOCX packages
///
/// `body`, `styles` and `numbering` take the inner content of their root
/// element; `theme` and `app` take a complete part.
///
/// # Example
/// ```
/// use docstruct_ooxml::test_utils::DocxBuilder;
///
/// let archive = DocxBuilder::new()
///     .body(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#)
///     .archive()
///     .unwrap();
/// assert!(archive.document_xml().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    body: String,
    styles: Option<String>,
    numbering: Option<String>,
    theme: Option<String>,
    app: Option<String>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Content of `w:body`
    pub fn body(mut self, xml: impl Into<String>) -> Self {
        self.body = xml.into();
        self
    }

    /// Content of `w:styles`
    pub fn styles(mut self, xml: impl Into<String>) -> Self {
        self.styles = Some(xml.into());
        self
    }

    /// Content of `w:numbering`
    pub fn numbering(mut self, xml: impl Into<String>) -> Self {
        self.numbering = Some(xml.into());
        self
    }

    /// Complete theme part
    pub fn theme(mut self, xml: impl Into<String>) -> Self {
        self.theme = Some(xml.into());
        self
    }

    /// Complete extended properties part
    pub fn app(mut self, xml: impl Into<String>) -> Self {
        self.app = Some(xml.into());
        self
    }

    /// The parts of the package, in write order
    fn parts(&self) -> Vec<(&'static str, String)> {
        let mut parts = vec![
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            (
                DOCUMENT_PART,
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8"?><w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
                    W_NS, self.body
                ),
            ),
        ];
        if let Some(styles) = &self.styles {
            parts.push((
                STYLES_PART,
                format!(r#"<w:styles xmlns:w="{}">{}</w:styles>"#, W_NS, styles),
            ));
        }
        if let Some(numbering) = &self.numbering {
            parts.push((
                NUMBERING_PART,
                format!(r#"<w:numbering xmlns:w="{}">{}</w:numbering>"#, W_NS, numbering),
            ));
        }
        if let Some(theme) = &self.theme {
            parts.push((THEME_PART, theme.clone()));
        }
        if let Some(app) = &self.app {
            parts.push((APP_PART, app.clone()));
        }
        parts
    }

    /// Write the package as ZIP bytes
    pub fn build(&self) -> Result<Vec<u8>> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (name, content) in self.parts() {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
        Ok(buffer.into_inner())
    }

    /// Write the package and read it back
    pub fn archive(&self) -> Result<OoxmlArchive> {
        OoxmlArchive::from_reader(Cursor::new(self.build()?))
    }
}

/// A single-run paragraph
pub fn paragraph(text: &str) -> String {
    format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", text)
}

/// A single-run paragraph with a paragraph style
pub fn styled_paragraph(style: &str, text: &str) -> String {
    format!(
        "<w:p><w:pPr><w:pStyle w:val=\"{}\"/></w:pPr><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        style, text
    )
}

/// A single-run list paragraph
pub fn list_paragraph(num_id: u32, ilvl: u8, text: &str) -> String {
    format!(
        "<w:p><w:pPr><w:numPr><w:ilvl w:val=\"{}\"/><w:numId w:val=\"{}\"/></w:numPr></w:pPr>\
         <w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>",
        ilvl, num_id, text
    )
}
