//! Paragraph structural parser
//!
//! Turns the raw paragraphs of the body into [`ParagraphRecord`]s, one at a
//! time and in document order. Each paragraph advances the list counters
//! and the running section number, so the parser is strictly sequential.

use std::collections::BTreeMap;

use docstruct_core::diagnostics::codes;
use docstruct_core::{Diagnostic, DiagnosticSink, ParagraphRecord, SectionGeometry, NONE_SENTINEL};

use crate::document::{RawParagraph, RawRun};
use crate::error::Result;
use crate::numbering::NumberingResolver;
use crate::section::SectionTracker;
use crate::styles::{FontSize, StyleDefinition, StyleSheet};
use crate::text;
use crate::theme::ThemeFonts;

/// `w:spacing/@w:line` value of single spacing
pub const SINGLE_LINE_SPACING: u32 = 240;

/// Resolved typography of one run
#[derive(Debug, Clone, PartialEq)]
pub struct RunFormat {
    pub font_name: Option<String>,
    pub font_size: Option<FontSize>,
    pub bold: bool,
    pub colored: bool,
}

/// Sequential parser over the paragraphs of one document
pub struct ParagraphParser<'a> {
    styles: &'a StyleSheet,
    theme: &'a ThemeFonts,
    numbering: NumberingResolver<'a>,
    sections: SectionTracker,
}

impl<'a> ParagraphParser<'a> {
    pub fn new(
        styles: &'a StyleSheet,
        theme: &'a ThemeFonts,
        numbering: NumberingResolver<'a>,
    ) -> Self {
        Self {
            styles,
            theme,
            numbering,
            sections: SectionTracker::new(),
        }
    }

    /// Process the next paragraph in document order
    ///
    /// Returns `Ok(None)` for paragraphs that are not retained: those in a
    /// floating text frame and those without text. Framed paragraphs are
    /// skipped outright, so their section breaks and numbering are ignored.
    pub fn parse(
        &mut self,
        raw: &RawParagraph,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Option<ParagraphRecord>> {
        if raw.framed {
            log::debug!("Skipping framed paragraph {}", raw.id);
            return Ok(None);
        }

        let section_num = self.sections.current();
        if let Some(geometry) = &raw.section_break {
            self.sections.close_section(geometry.clone());
        }

        let mut text = text::normalize(&raw.text());
        let heuristic = text::heuristic_label(&text);
        if let Some(stripped) = heuristic.as_ref().and_then(|h| h.text.clone()) {
            text = stripped;
        }

        let style = self.paragraph_style(raw, sink);

        // numId 0 removes numbering, it never names a list
        let num_id = raw
            .num_id
            .or_else(|| style.and_then(|s| s.num_id))
            .filter(|&id| id != 0);
        let ilvl = raw.ilvl.or_else(|| style.and_then(|s| s.ilvl)).unwrap_or(0);

        let mut record = ParagraphRecord::new(raw.id, section_num, String::new());
        record.style_id = raw.style.clone();
        record.outline_level = raw.outline_level.or_else(|| style.and_then(|s| s.outline_level));
        record.ilvl = ilvl;
        record.num_id = num_id;
        record.hyperlink = raw.hyperlink;
        record.is_table = raw.is_table;

        let mut label = None;
        if let Some(num_id) = num_id {
            match self.numbering.resolve_label(num_id, ilvl)? {
                Some(resolved) => {
                    if resolved.unresolved_placeholder {
                        log::warn!(
                            "Paragraph {}: label '{}' still has a placeholder",
                            raw.id,
                            resolved.label
                        );
                        sink.report(
                            Diagnostic::warning(format!(
                                "Label '{}' from template '{}' has an unresolved placeholder",
                                resolved.label, resolved.format_string
                            ))
                            .with_code(codes::UNRESOLVED_PLACEHOLDER)
                            .with_paragraph(raw.id),
                        );
                    }
                    record.indent = resolved.indent;
                    record.format_string = resolved.format_string;
                    label = Some(resolved.label);
                }
                None => {
                    log::warn!("Paragraph {}: numbering {} level {} not found", raw.id, num_id, ilvl);
                    sink.report(
                        Diagnostic::warning(format!(
                            "Numbering instance {} has no level {}",
                            num_id, ilvl
                        ))
                        .with_code(codes::NUMBERING_NOT_FOUND)
                        .with_paragraph(raw.id)
                        .with_help("The paragraph falls back to its textual label"),
                    );
                }
            }
        }
        record.level_label = label
            .or_else(|| heuristic.map(|h| h.label))
            .unwrap_or_default();

        self.apply_runs(&mut record, raw, style, sink);

        let line = raw
            .line_spacing
            .or_else(|| style.and_then(|s| s.line_spacing))
            .unwrap_or(SINGLE_LINE_SPACING);
        record.line_spacing = f64::from(line) / f64::from(SINGLE_LINE_SPACING);

        if text.trim().is_empty() {
            return Ok(None);
        }
        record.text = text;

        Ok(Some(record))
    }

    /// Close the last section and hand back the geometry table
    pub fn finish(mut self, final_section: Option<SectionGeometry>) -> BTreeMap<u32, SectionGeometry> {
        if let Some(geometry) = final_section {
            self.sections.close_final(geometry);
        }
        self.sections.into_table()
    }

    fn paragraph_style(
        &self,
        raw: &RawParagraph,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<&'a StyleDefinition> {
        let id = raw.style.as_deref()?;
        let style = self.styles.get(id);
        if style.is_none() {
            sink.report(
                Diagnostic::warning(format!("Paragraph style '{}' is not defined", id))
                    .with_code(codes::UNKNOWN_PARAGRAPH_STYLE)
                    .with_paragraph(raw.id),
            );
        }
        style
    }

    /// Resolve every run and roll the results up into the record
    fn apply_runs(
        &self,
        record: &mut ParagraphRecord,
        raw: &RawParagraph,
        style: Option<&StyleDefinition>,
        sink: &mut dyn DiagnosticSink,
    ) {
        let mut all_bold = true;
        let mut text_runs = 0;
        let mut colored = style.and_then(|s| s.colored).unwrap_or(false);

        for run in &raw.runs {
            let format = self.run_format(run, style, raw.id, sink);
            let font_label = format.font_name.as_deref().unwrap_or(NONE_SENTINEL);
            let size_label = format
                .font_size
                .map(|s| s.to_string())
                .unwrap_or_else(|| NONE_SENTINEL.to_string());

            if run.has_text() {
                let chars = run.text.chars().count();
                text_runs += 1;
                all_bold &= format.bold;
                colored |= format.colored;

                match &format.font_name {
                    Some(name) => {
                        record.font_names.insert(name.clone());
                        *record.font_name_char_counts.entry(name.clone()).or_default() += chars;
                    }
                    None => sink.report(
                        Diagnostic::warning("Run has no resolvable font name")
                            .with_code(codes::MISSING_FONT_NAME)
                            .with_paragraph(raw.id),
                    ),
                }
                match format.font_size {
                    Some(_) => {
                        record.font_sizes.insert(size_label.clone());
                        *record.font_size_char_counts.entry(size_label.clone()).or_default() +=
                            chars;
                    }
                    None => sink.report(
                        Diagnostic::warning("Run has no resolvable font size")
                            .with_code(codes::MISSING_FONT_SIZE)
                            .with_paragraph(raw.id),
                    ),
                }
            }

            let body = if format.bold {
                format!("<b>{}</b>", run.html)
            } else {
                run.html.clone()
            };
            record.html_text.push_str(&format!(
                "<span style=\"font-size:{}pt;font-family:'{}'\">{}</span>",
                size_label, font_label, body
            ));
        }

        record.bold = if text_runs > 0 {
            all_bold
        } else {
            style.and_then(|s| s.bold).unwrap_or(false)
        };
        record.colored = colored;
    }

    /// Font, size and emphasis of a run
    ///
    /// Each attribute falls back from direct formatting to the run style,
    /// the paragraph style, the "Normal" style and finally the document
    /// defaults.
    pub fn run_format(
        &self,
        run: &RawRun,
        paragraph_style: Option<&StyleDefinition>,
        paragraph_id: u32,
        sink: &mut dyn DiagnosticSink,
    ) -> RunFormat {
        let run_style = run.style.as_deref().and_then(|id| {
            let style = self.styles.get(id);
            if style.is_none() {
                sink.report(
                    Diagnostic::warning(format!("Run style '{}' is not defined", id))
                        .with_code(codes::UNKNOWN_RUN_STYLE)
                        .with_paragraph(paragraph_id),
                );
            }
            style
        });
        let chain = [run_style, paragraph_style, self.styles.normal()];
        let defaults = self.styles.defaults();

        let font_name = self
            .theme
            .font_name(run.font_ascii.clone(), run.font_theme.as_deref())
            .or_else(|| chain.iter().flatten().find_map(|s| s.font_name.clone()))
            .or_else(|| defaults.font_name.clone());

        let font_size = run
            .size
            .or_else(|| chain.iter().flatten().find_map(|s| s.font_size))
            .or(defaults.font_size);

        // Normal's emphasis does not carry into runs
        let bold = run
            .bold
            .or_else(|| run_style.and_then(|s| s.bold))
            .or_else(|| paragraph_style.and_then(|s| s.bold))
            .unwrap_or(false);

        let colored = run
            .color
            .as_deref()
            .map(|c| c != "auto")
            .or_else(|| run_style.and_then(|s| s.colored))
            .unwrap_or(false);

        RunFormat {
            font_name,
            font_size,
            bold,
            colored,
        }
    }
}
