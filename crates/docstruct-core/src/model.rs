//! Document model definitions
//!
//! A [`Document`] is the ordered sequence of [`ParagraphRecord`]s produced by
//! the extraction pipeline. It is assembled once, classified into chapters
//! during construction, and read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::chapter::{self, ChapterMode, ChapterRules};
use crate::sentence::SentenceSegmenter;

/// Value recorded when a font name or size could not be resolved
pub const NONE_SENTINEL: &str = "None";

/// Page geometry of one document section
///
/// Lengths are in inches.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SectionGeometry {
    /// 1-based section index
    pub section_num: u32,
    /// Page number the section starts at, if restarted
    pub start_page: Option<i64>,
    /// Page number format (`decimal`, `lowerRoman`, ...)
    pub page_number_format: Option<String>,
    pub left_margin: Option<f64>,
    pub right_margin: Option<f64>,
    pub top_margin: Option<f64>,
    pub bottom_margin: Option<f64>,
    pub page_height: Option<f64>,
    pub page_width: Option<f64>,
}

impl SectionGeometry {
    /// Create an empty geometry record for a section
    pub fn new(section_num: u32) -> Self {
        Self {
            section_num,
            ..Default::default()
        }
    }
}

/// Creator metadata from the extended properties part
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct DocumentProperties {
    /// Application that wrote the package
    pub application: Option<String>,
    /// Version of that application
    pub app_version: Option<String>,
}

/// One retained paragraph with its resolved structure and typography
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphRecord {
    /// Source-order id; gaps mark skipped or empty paragraphs
    pub paragraph_id: u32,
    /// Section the paragraph belongs to (1-based)
    pub section_num: u32,
    /// Named paragraph style
    pub style_id: Option<String>,
    /// Outline level from direct paragraph properties
    pub outline_level: Option<u8>,
    /// List nesting depth
    pub ilvl: u8,
    /// Numbering instance id
    pub num_id: Option<u32>,
    /// Left indent of the numbering level, raw document units
    pub indent: Option<String>,
    /// Raw level-text template of the numbering level, empty when none
    pub format_string: String,
    /// Rendered numbering/heading label, empty when none
    pub level_label: String,
    /// Paragraph contains a hyperlink
    pub hyperlink: bool,
    /// Normalized paragraph text
    pub text: String,
    /// Per-run span markup
    pub html_text: String,
    pub font_names: BTreeSet<String>,
    pub font_sizes: BTreeSet<String>,
    pub font_name_char_counts: BTreeMap<String, usize>,
    pub font_size_char_counts: BTreeMap<String, usize>,
    pub bold: bool,
    pub colored: bool,
    /// Paragraph sits in a table cell
    pub is_table: bool,
    /// Line spacing as a multiple of single spacing
    pub line_spacing: f64,
    /// Geometry of the owning section, attached after the walk
    pub section: Option<SectionGeometry>,
    is_chapter: bool,
}

impl ParagraphRecord {
    /// Create a record with default attributes
    pub fn new(paragraph_id: u32, section_num: u32, text: impl Into<String>) -> Self {
        Self {
            paragraph_id,
            section_num,
            style_id: None,
            outline_level: None,
            ilvl: 0,
            num_id: None,
            indent: None,
            format_string: String::new(),
            level_label: String::new(),
            hyperlink: false,
            text: text.into(),
            html_text: String::new(),
            font_names: BTreeSet::new(),
            font_sizes: BTreeSet::new(),
            font_name_char_counts: BTreeMap::new(),
            font_size_char_counts: BTreeMap::new(),
            bold: false,
            colored: false,
            is_table: false,
            line_spacing: 1.0,
            section: None,
            is_chapter: false,
        }
    }

    /// Set the paragraph style
    pub fn with_style(mut self, style_id: impl Into<String>) -> Self {
        self.style_id = Some(style_id.into());
        self
    }

    /// Set the rendered label and its template
    pub fn with_label(
        mut self,
        level_label: impl Into<String>,
        format_string: impl Into<String>,
    ) -> Self {
        self.level_label = level_label.into();
        self.format_string = format_string.into();
        self
    }

    /// Whether the chapter classifier marked this paragraph as a chapter start
    pub fn is_chapter(&self) -> bool {
        self.is_chapter
    }

    /// Style id, or an empty string
    pub fn style(&self) -> &str {
        self.style_id.as_deref().unwrap_or("")
    }

    /// Font name covering the most characters
    pub fn dominant_font_name(&self) -> Option<&str> {
        dominant(&self.font_name_char_counts)
    }

    /// Font size covering the most characters
    pub fn dominant_font_size(&self) -> Option<&str> {
        dominant(&self.font_size_char_counts)
    }

    /// Substitute the sentinel into empty font sets
    ///
    /// Returns true when a sentinel had to be inserted.
    pub fn ensure_font_sentinels(&mut self) -> bool {
        let mut inserted = false;
        if self.font_names.is_empty() {
            self.font_names.insert(NONE_SENTINEL.to_string());
            inserted = true;
        }
        if self.font_sizes.is_empty() {
            self.font_sizes.insert(NONE_SENTINEL.to_string());
            inserted = true;
        }
        inserted
    }

    /// Flatten into the exported table row
    pub fn to_row(&self) -> ParagraphRow {
        let geometry = self.section.clone().unwrap_or_default();
        ParagraphRow {
            paragraph_id: self.paragraph_id,
            section_num: self.section_num,
            style: self.style_id.clone(),
            ilvl: self.ilvl,
            num_id: self.num_id,
            indent: self.indent.clone(),
            format_string: self.format_string.clone(),
            level_number: self.level_label.clone(),
            hyperlink: self.hyperlink,
            text: self.text.clone(),
            html_text: self.html_text.clone(),
            font_names: join_set(&self.font_names),
            font_sizes: join_set(&self.font_sizes),
            font_name_char_counts: counts_json(&self.font_name_char_counts),
            font_size_char_counts: counts_json(&self.font_size_char_counts),
            bold: self.bold,
            colored: self.colored,
            is_table: self.is_table,
            line_spacing: self.line_spacing,
            left_margin: geometry.left_margin,
            right_margin: geometry.right_margin,
            top_margin: geometry.top_margin,
            bottom_margin: geometry.bottom_margin,
            page_height: geometry.page_height,
            page_width: geometry.page_width,
            start_page: geometry.start_page,
            page_number_format: geometry.page_number_format,
            is_chapter: self.is_chapter,
        }
    }
}

fn dominant(counts: &BTreeMap<String, usize>) -> Option<&str> {
    // max_by_key keeps the last maximum; iterate in reverse so ties go to the
    // alphabetically first key
    counts
        .iter()
        .rev()
        .max_by_key(|(_, count)| **count)
        .map(|(name, _)| name.as_str())
}

fn join_set(set: &BTreeSet<String>) -> String {
    set.iter().map(String::as_str).collect::<Vec<_>>().join(",")
}

fn counts_json(counts: &BTreeMap<String, usize>) -> String {
    serde_json::to_string(counts).unwrap_or_else(|_| "{}".to_string())
}

/// One row of the exported paragraph table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParagraphRow {
    pub paragraph_id: u32,
    pub section_num: u32,
    pub style: Option<String>,
    pub ilvl: u8,
    pub num_id: Option<u32>,
    pub indent: Option<String>,
    pub format_string: String,
    pub level_number: String,
    pub hyperlink: bool,
    pub text: String,
    pub html_text: String,
    pub font_names: String,
    pub font_sizes: String,
    pub font_name_char_counts: String,
    pub font_size_char_counts: String,
    pub bold: bool,
    pub colored: bool,
    pub is_table: bool,
    pub line_spacing: f64,
    pub left_margin: Option<f64>,
    pub right_margin: Option<f64>,
    pub top_margin: Option<f64>,
    pub bottom_margin: Option<f64>,
    pub page_height: Option<f64>,
    pub page_width: Option<f64>,
    pub start_page: Option<i64>,
    pub page_number_format: Option<String>,
    pub is_chapter: bool,
}

/// An extracted document
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    properties: DocumentProperties,
    sections: BTreeMap<u32, SectionGeometry>,
    chapter_mode: ChapterMode,
    paragraphs: Vec<ParagraphRecord>,
}

impl Document {
    /// Assemble a document and run the chapter classifier over it
    pub fn new(
        mut paragraphs: Vec<ParagraphRecord>,
        sections: BTreeMap<u32, SectionGeometry>,
        properties: DocumentProperties,
        rules: &ChapterRules,
    ) -> Self {
        for paragraph in &mut paragraphs {
            paragraph.ensure_font_sentinels();
        }

        let (chapter_mode, flags) = chapter::classify(&paragraphs, rules);
        for (paragraph, flag) in paragraphs.iter_mut().zip(flags) {
            paragraph.is_chapter = flag;
        }

        Self {
            properties,
            sections,
            chapter_mode,
            paragraphs,
        }
    }

    /// Paragraphs in document order
    pub fn paragraphs(&self) -> &[ParagraphRecord] {
        &self.paragraphs
    }

    /// Section geometry keyed by section index
    pub fn sections(&self) -> &BTreeMap<u32, SectionGeometry> {
        &self.sections
    }

    /// Creator metadata
    pub fn properties(&self) -> &DocumentProperties {
        &self.properties
    }

    /// Mode the chapter classifier selected
    pub fn chapter_mode(&self) -> ChapterMode {
        self.chapter_mode
    }

    /// Number of retained paragraphs
    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    /// Check if no paragraph was retained
    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    /// Paragraphs flagged as chapter starts
    pub fn chapter_starts(&self) -> impl Iterator<Item = &ParagraphRecord> {
        self.paragraphs.iter().filter(|p| p.is_chapter)
    }

    /// Split the paragraphs into chapter groups
    ///
    /// Every group after the first starts with a chapter paragraph. The
    /// first group is a preamble when the document does not open with one.
    pub fn chapters(&self) -> Vec<&[ParagraphRecord]> {
        let mut groups = Vec::new();
        let mut start = 0;
        for (i, paragraph) in self.paragraphs.iter().enumerate() {
            if paragraph.is_chapter && i > start {
                groups.push(&self.paragraphs[start..i]);
                start = i;
            }
        }
        if start < self.paragraphs.len() {
            groups.push(&self.paragraphs[start..]);
        }
        groups
    }

    /// Flatten into the exported paragraph table
    pub fn rows(&self) -> Vec<ParagraphRow> {
        self.paragraphs.iter().map(ParagraphRecord::to_row).collect()
    }

    /// Serialize one line per sentence
    ///
    /// The first sentence of a paragraph with a rendered label is prefixed
    /// with `"<label> "`.
    pub fn sentence_lines(&self, segmenter: &dyn SentenceSegmenter) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in &self.paragraphs {
            let mut first = true;
            for span in segmenter.segment(&paragraph.text) {
                let sentence = paragraph.text[span].trim();
                if sentence.is_empty() {
                    continue;
                }
                if first && !paragraph.level_label.is_empty() {
                    lines.push(format!("{} {}", paragraph.level_label, sentence));
                } else {
                    lines.push(sentence.to_string());
                }
                first = false;
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentence::PunctuationSegmenter;

    fn document(paragraphs: Vec<ParagraphRecord>) -> Document {
        Document::new(
            paragraphs,
            BTreeMap::new(),
            DocumentProperties::default(),
            &ChapterRules::default(),
        )
    }

    #[test]
    fn test_sentinels_inserted_on_construction() {
        let doc = document(vec![ParagraphRecord::new(1, 1, "Body")]);
        let p = &doc.paragraphs()[0];
        assert!(p.font_names.contains(NONE_SENTINEL));
        assert!(p.font_sizes.contains(NONE_SENTINEL));
    }

    #[test]
    fn test_sentinel_not_added_when_resolved() {
        let mut p = ParagraphRecord::new(1, 1, "Body");
        p.font_names.insert("Arial".to_string());
        p.font_sizes.insert("11.0".to_string());
        assert!(!p.ensure_font_sentinels());
        assert_eq!(p.font_names.len(), 1);
    }

    #[test]
    fn test_row_flattening() {
        let mut p = ParagraphRecord::new(3, 2, "Scope").with_label("1.", "%1.");
        p.font_names.insert("Calibri".to_string());
        p.font_names.insert("Arial".to_string());
        p.font_sizes.insert("12.0".to_string());
        p.font_name_char_counts.insert("Arial".to_string(), 2);
        p.font_name_char_counts.insert("Calibri".to_string(), 3);
        let mut geometry = SectionGeometry::new(2);
        geometry.left_margin = Some(1.0);
        geometry.page_width = Some(8.5);
        p.section = Some(geometry);

        let row = p.to_row();
        assert_eq!(row.font_names, "Arial,Calibri");
        assert_eq!(row.font_sizes, "12.0");
        assert_eq!(row.font_name_char_counts, r#"{"Arial":2,"Calibri":3}"#);
        assert_eq!(row.level_number, "1.");
        assert_eq!(row.format_string, "%1.");
        assert_eq!(row.left_margin, Some(1.0));
        assert_eq!(row.page_width, Some(8.5));
        assert_eq!(row.top_margin, None);
    }

    #[test]
    fn test_dominant_font() {
        let mut p = ParagraphRecord::new(1, 1, "x");
        p.font_name_char_counts.insert("Arial".to_string(), 4);
        p.font_name_char_counts.insert("Calibri".to_string(), 40);
        p.font_size_char_counts.insert("10.0".to_string(), 5);
        p.font_size_char_counts.insert("12.0".to_string(), 5);

        assert_eq!(p.dominant_font_name(), Some("Calibri"));
        assert_eq!(p.dominant_font_size(), Some("10.0"));
    }

    #[test]
    fn test_chapters_grouping() {
        let doc = document(vec![
            ParagraphRecord::new(1, 1, "Cover page"),
            ParagraphRecord::new(2, 1, "APPENDIX A"),
            ParagraphRecord::new(3, 1, "Details"),
            ParagraphRecord::new(4, 1, "Appendix B"),
        ]);

        let chapters = doc.chapters();
        assert_eq!(chapters.len(), 3);
        assert_eq!(chapters[0][0].text, "Cover page");
        assert_eq!(chapters[1].len(), 2);
        assert_eq!(chapters[2][0].paragraph_id, 4);
        assert_eq!(doc.chapter_starts().count(), 2);
    }

    #[test]
    fn test_sentence_lines_prefix_first_sentence_only() {
        let doc = document(vec![
            ParagraphRecord::new(1, 1, "Purpose. This covers scope.").with_label("1.", "%1."),
            ParagraphRecord::new(2, 1, "Unlabelled text."),
        ]);

        let lines = doc.sentence_lines(&PunctuationSegmenter);
        assert_eq!(
            lines,
            vec![
                "1. Purpose.".to_string(),
                "This covers scope.".to_string(),
                "Unlabelled text.".to_string(),
            ]
        );
    }
}
