//! Document content parsing (word/document.xml)
//!
//! Streams the main document part into [`RawParagraph`]s: paragraph
//! properties, run properties and run text exactly as written, with no
//! style or numbering resolution applied. Paragraph ids are assigned here,
//! in source order, one per `w:p` element.

use quick_xml::escape::escape;
use quick_xml::events::{BytesStart, Event};

use docstruct_core::SectionGeometry;

use crate::error::Result;
use crate::section;
use crate::styles::FontSize;
use crate::xml;

/// Subtrees dropped with all their content
///
/// Drawings, VML pictures and embedded objects carry no body text; the
/// revision elements hold superseded formatting.
const SKIPPED: &[&[u8]] = &[
    b"drawing",
    b"pict",
    b"object",
    b"pPrChange",
    b"rPrChange",
    b"sectPrChange",
];

/// A text run with its direct formatting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRun {
    /// Text with tabs as spaces and breaks as newlines
    pub text: String,
    /// Escaped text with breaks as `<br/>`
    pub html: String,
    pub bold: Option<bool>,
    /// `w:color` value
    pub color: Option<String>,
    /// `w:rFonts/@w:ascii`
    pub font_ascii: Option<String>,
    /// `w:rFonts/@w:asciiTheme`
    pub font_theme: Option<String>,
    /// Character style id (`w:rStyle`)
    pub style: Option<String>,
    pub size: Option<FontSize>,
}

impl RawRun {
    /// Whether the run has any non-whitespace text
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// A paragraph as written in the document part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawParagraph {
    pub id: u32,
    /// Inside a floating text frame (`w:framePr`)
    pub framed: bool,
    /// Inside a table cell
    pub is_table: bool,
    pub hyperlink: bool,
    pub style: Option<String>,
    pub outline_level: Option<u8>,
    pub ilvl: Option<u8>,
    pub num_id: Option<u32>,
    /// Raw `w:spacing/@w:line`
    pub line_spacing: Option<u32>,
    /// Geometry of the section this paragraph closes
    pub section_break: Option<SectionGeometry>,
    pub runs: Vec<RawRun>,
}

impl RawParagraph {
    /// Concatenated run text
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }
}

/// The body of a document part
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDocument {
    /// Paragraphs in id order
    pub paragraphs: Vec<RawParagraph>,
    /// Geometry from the body-level `sectPr`
    pub final_section: Option<SectionGeometry>,
}

impl RawDocument {
    /// Parse a document from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        // Don't trim text - preserve whitespace in runs
        let mut reader = xml::reader(xml, false);
        let mut buf = Vec::new();
        let mut skip_buf = Vec::new();
        let mut walker = BodyWalker::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    if SKIPPED.contains(&e.local_name().as_ref()) {
                        reader.read_to_end_into(e.name(), &mut skip_buf)?;
                        skip_buf.clear();
                    } else {
                        walker.element(e);
                        walker.stack.push(e.local_name().as_ref().to_vec());
                    }
                }
                Event::Empty(ref e) => {
                    walker.element(e);
                    walker.close(e.local_name().as_ref());
                }
                Event::End(ref e) => {
                    walker.stack.pop();
                    walker.close(e.local_name().as_ref());
                }
                Event::Text(ref e) => {
                    if walker.in_text {
                        let text = e.unescape().map_err(quick_xml::Error::from)?;
                        walker.text(&text);
                    }
                }
                Event::CData(ref e) => {
                    if walker.in_text {
                        walker.text(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let mut paragraphs = walker.done;
        // Nested paragraphs finish before their container
        paragraphs.sort_by_key(|p| p.id);
        log::debug!("Walked {} paragraphs", paragraphs.len());

        Ok(Self {
            paragraphs,
            final_section: walker.final_section,
        })
    }
}

/// Streaming state for one pass over the body
#[derive(Default)]
struct BodyWalker {
    /// Local names of the open elements
    stack: Vec<Vec<u8>>,
    /// Paragraphs still open, innermost last
    open: Vec<RawParagraph>,
    done: Vec<RawParagraph>,
    last_id: u32,
    run: Option<RawRun>,
    in_text: bool,
    section: Option<SectionGeometry>,
    final_section: Option<SectionGeometry>,
}

impl BodyWalker {
    fn parent(&self) -> &[u8] {
        self.stack.last().map(Vec::as_slice).unwrap_or_default()
    }

    fn grandparent(&self) -> &[u8] {
        self.stack
            .len()
            .checked_sub(2)
            .and_then(|i| self.stack.get(i))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn inside(&self, name: &[u8]) -> bool {
        self.stack.iter().any(|n| n == name)
    }

    /// Handle an opening or empty element
    fn element(&mut self, e: &BytesStart) {
        let name = e.local_name();
        let name = name.as_ref();

        if let Some(geometry) = self.section.as_mut() {
            section::apply_property(geometry, e);
            return;
        }

        match name {
            b"p" => {
                self.last_id += 1;
                self.open.push(RawParagraph {
                    id: self.last_id,
                    is_table: self.inside(b"tc"),
                    ..RawParagraph::default()
                });
            }
            b"sectPr" => self.section = Some(SectionGeometry::default()),
            b"hyperlink" => {
                if let Some(p) = self.open.last_mut() {
                    p.hyperlink = true;
                }
            }
            b"r" if !self.open.is_empty() => self.run = Some(RawRun::default()),
            _ => {
                let (grandparent, parent) = (self.grandparent(), self.parent());
                let run_content = parent == b"r";
                let run_property = grandparent == b"r" && parent == b"rPr";
                let paragraph_property = matches!(
                    (grandparent, parent),
                    (b"p", b"pPr") | (b"pPr", b"numPr")
                );

                if run_content {
                    self.run_content(name);
                } else if run_property {
                    self.run_property(name, e);
                } else if paragraph_property {
                    self.paragraph_property(name, e);
                }
            }
        }
    }

    fn run_content(&mut self, name: &[u8]) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match name {
            b"t" => self.in_text = true,
            b"tab" => {
                run.text.push(' ');
                run.html.push(' ');
            }
            b"br" | b"cr" => {
                run.text.push('\n');
                run.html.push_str("<br/>");
            }
            _ => {}
        }
    }

    fn run_property(&mut self, name: &[u8], e: &BytesStart) {
        let Some(run) = self.run.as_mut() else {
            return;
        };
        match name {
            b"b" => run.bold = Some(xml::toggle(e)),
            b"color" => run.color = xml::val(e),
            b"rFonts" => {
                run.font_ascii = xml::attr(e, b"ascii");
                run.font_theme = xml::attr(e, b"asciiTheme");
            }
            b"rStyle" => run.style = xml::val(e),
            b"sz" => run.size = xml::val_parsed(e).map(FontSize::from_half_points),
            _ => {}
        }
    }

    fn paragraph_property(&mut self, name: &[u8], e: &BytesStart) {
        let Some(p) = self.open.last_mut() else {
            return;
        };
        match name {
            b"pStyle" => p.style = xml::val(e),
            b"outlineLvl" => p.outline_level = xml::val_parsed(e),
            b"framePr" => p.framed = true,
            b"spacing" => {
                if let Some(line) = xml::attr(e, b"line").and_then(|v| v.trim().parse().ok()) {
                    p.line_spacing = Some(line);
                }
            }
            b"ilvl" => p.ilvl = xml::val_parsed(e),
            b"numId" => p.num_id = xml::val_parsed(e),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(run) = self.run.as_mut() {
            run.text.push_str(text);
            run.html.push_str(&escape(text));
        }
    }

    /// Handle a closing (or empty) element; the stack no longer holds it
    fn close(&mut self, name: &[u8]) {
        match name {
            b"t" => self.in_text = false,
            b"r" => {
                if let (Some(run), Some(p)) = (self.run.take(), self.open.last_mut()) {
                    p.runs.push(run);
                }
            }
            b"p" => {
                if let Some(p) = self.open.pop() {
                    self.done.push(p);
                }
            }
            b"sectPr" => {
                let Some(geometry) = self.section.take() else {
                    return;
                };
                if self.parent() == b"pPr" {
                    if let Some(p) = self.open.last_mut() {
                        p.section_break = Some(geometry);
                    }
                } else if self.parent() == b"body" {
                    self.final_section = Some(geometry);
                }
            }
            _ => {}
        }
    }
}
