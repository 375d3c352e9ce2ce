//! Section geometry (`w:sectPr`)
//!
//! A `sectPr` inside a paragraph's properties closes the section that
//! paragraph belongs to; the `sectPr` at the end of the body describes the
//! last section. Geometry is collected while the body is walked and
//! attached to the paragraph records afterwards.

use std::collections::BTreeMap;

use docstruct_core::diagnostics::codes;
use docstruct_core::{Diagnostic, DiagnosticSink, ParagraphRecord, SectionGeometry};
use quick_xml::events::BytesStart;

use crate::xml;

/// Twentieths of a point per inch
pub const TWIPS_PER_INCH: f64 = 1440.0;

fn inches(e: &BytesStart, name: &[u8]) -> Option<f64> {
    xml::attr(e, name)
        .and_then(|v| v.trim().parse::<f64>().ok())
        .map(|twips| twips / TWIPS_PER_INCH)
}

/// Record a page property element (`pgMar`, `pgSz`, `pgNumType`)
///
/// Returns false for elements that carry no geometry.
pub(crate) fn apply_property(geometry: &mut SectionGeometry, e: &BytesStart) -> bool {
    match e.local_name().as_ref() {
        b"pgMar" => {
            geometry.left_margin = inches(e, b"left");
            geometry.right_margin = inches(e, b"right");
            geometry.top_margin = inches(e, b"top");
            geometry.bottom_margin = inches(e, b"bottom");
        }
        b"pgSz" => {
            geometry.page_width = inches(e, b"w");
            geometry.page_height = inches(e, b"h");
        }
        b"pgNumType" => {
            geometry.start_page = xml::attr(e, b"start").and_then(|v| v.trim().parse().ok());
            geometry.page_number_format = xml::attr(e, b"fmt");
        }
        _ => return false,
    }
    true
}

/// Running section counter and the geometry collected so far
#[derive(Debug, Clone)]
pub struct SectionTracker {
    current: u32,
    table: BTreeMap<u32, SectionGeometry>,
}

impl Default for SectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SectionTracker {
    pub fn new() -> Self {
        Self {
            current: 1,
            table: BTreeMap::new(),
        }
    }

    /// Section that paragraphs encountered now belong to
    pub fn current(&self) -> u32 {
        self.current
    }

    /// Store the geometry of the open section and start the next one
    pub fn close_section(&mut self, geometry: SectionGeometry) {
        self.store(geometry);
        self.current += 1;
    }

    /// Store the geometry of the last section
    pub fn close_final(&mut self, geometry: SectionGeometry) {
        self.store(geometry);
    }

    fn store(&mut self, mut geometry: SectionGeometry) {
        geometry.section_num = self.current;
        log::debug!(
            "Section {} closed (page {:?} x {:?})",
            self.current,
            geometry.page_width,
            geometry.page_height
        );
        self.table.insert(self.current, geometry);
    }

    /// Collected geometry keyed by section number
    pub fn into_table(self) -> BTreeMap<u32, SectionGeometry> {
        self.table
    }
}

/// Copy each section's geometry onto its paragraphs
///
/// A section without geometry is reported once and leaves its paragraphs
/// unannotated.
pub fn annotate(
    records: &mut [ParagraphRecord],
    table: &BTreeMap<u32, SectionGeometry>,
    sink: &mut dyn DiagnosticSink,
) {
    let mut reported = Vec::new();
    for record in records.iter_mut() {
        match table.get(&record.section_num) {
            Some(geometry) => record.section = Some(geometry.clone()),
            None if !reported.contains(&record.section_num) => {
                reported.push(record.section_num);
                log::warn!("Section {} has no geometry", record.section_num);
                sink.report(
                    Diagnostic::warning(format!(
                        "Section {} has no recorded page geometry",
                        record.section_num
                    ))
                    .with_code(codes::MISSING_SECTION_GEOMETRY)
                    .with_paragraph(record.paragraph_id),
                );
            }
            None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quick_xml::events::Event;

    fn element(xml: &str) -> BytesStart<'static> {
        let mut reader = xml::reader(xml.as_bytes(), true);
        loop {
            match reader.read_event().unwrap() {
                Event::Start(e) | Event::Empty(e) => return e.into_owned(),
                Event::Eof => panic!("no element"),
                _ => {}
            }
        }
    }

    #[test]
    fn test_margins_in_inches() {
        let mut geometry = SectionGeometry::new(0);
        let e = element(
            r#"<w:pgMar w:top="1440" w:right="1800" w:bottom="720" w:left="1440" w:header="708"/>"#,
        );
        assert!(apply_property(&mut geometry, &e));

        assert_eq!(geometry.top_margin, Some(1.0));
        assert_eq!(geometry.right_margin, Some(1.25));
        assert_eq!(geometry.bottom_margin, Some(0.5));
        assert_eq!(geometry.left_margin, Some(1.0));
    }

    #[test]
    fn test_page_size_and_numbering() {
        let mut geometry = SectionGeometry::new(0);
        apply_property(&mut geometry, &element(r#"<w:pgSz w:w="12240" w:h="15840"/>"#));
        apply_property(
            &mut geometry,
            &element(r#"<w:pgNumType w:start="3" w:fmt="lowerRoman"/>"#),
        );

        assert_eq!(geometry.page_width, Some(8.5));
        assert_eq!(geometry.page_height, Some(11.0));
        assert_eq!(geometry.start_page, Some(3));
        assert_eq!(geometry.page_number_format.as_deref(), Some("lowerRoman"));
        assert!(!apply_property(&mut geometry, &element("<w:cols/>")));
    }

    #[test]
    fn test_tracker_keys_by_closing_section() {
        let mut tracker = SectionTracker::new();
        assert_eq!(tracker.current(), 1);

        tracker.close_section(SectionGeometry::new(0));
        assert_eq!(tracker.current(), 2);
        tracker.close_final(SectionGeometry::new(0));
        assert_eq!(tracker.current(), 2);

        let table = tracker.into_table();
        assert_eq!(table.keys().copied().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(table[&2].section_num, 2);
    }

    #[test]
    fn test_annotate_reports_missing_once() {
        let mut table = BTreeMap::new();
        let mut first = SectionGeometry::new(1);
        first.left_margin = Some(1.0);
        table.insert(1, first);

        let mut records = vec![
            ParagraphRecord::new(1, 1, "a"),
            ParagraphRecord::new(2, 2, "b"),
            ParagraphRecord::new(3, 2, "c"),
        ];
        let mut sink: Vec<Diagnostic> = Vec::new();
        annotate(&mut records, &table, &mut sink);

        assert_eq!(records[0].section.as_ref().unwrap().left_margin, Some(1.0));
        assert!(records[1].section.is_none());
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].code.as_deref(), Some(codes::MISSING_SECTION_GEOMETRY));
        assert_eq!(sink[0].paragraph_id, Some(2));
    }
}
