//! Chapter classification
//!
//! Best-effort heuristic over a finished paragraph sequence. Two rule sets
//! run in order:
//!
//! 1. Mode selection. When the heading style (`Heading1`) is used at least
//!    `min_heading_count` times, every paragraph whose style contains
//!    `Heading` starts a chapter. Otherwise every paragraph whose numbering
//!    template is the bare top-level marker (`%1.0`) starts a chapter.
//! 2. Appendix override. Any paragraph outside a `TOC` style whose text
//!    starts with `APPENDIX` (case-insensitive) starts a chapter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ParagraphRecord;

/// Tunables for the chapter heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterRules {
    /// Exact style name counted to select style-based mode
    pub heading_style: String,
    /// Minimum uses of `heading_style` for style-based mode
    pub min_heading_count: usize,
    /// Substring identifying heading styles
    pub heading_marker: String,
    /// Substring identifying table-of-contents styles
    pub toc_marker: String,
    /// Text prefix of appendix paragraphs, compared case-insensitively
    pub appendix_prefix: String,
    /// Numbering template marking a top-level chapter in numeric mode
    pub numeric_chapter_template: String,
}

impl Default for ChapterRules {
    fn default() -> Self {
        Self {
            heading_style: "Heading1".to_string(),
            min_heading_count: 3,
            heading_marker: "Heading".to_string(),
            toc_marker: "TOC".to_string(),
            appendix_prefix: "APPENDIX".to_string(),
            numeric_chapter_template: "%1.0".to_string(),
        }
    }
}

/// Mode picked by the first rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterMode {
    /// Chapters start at heading-styled paragraphs
    StyleBased,
    /// Chapters start at top-level numbered paragraphs
    Numeric,
}

fn is_heading(paragraph: &ParagraphRecord, rules: &ChapterRules) -> bool {
    paragraph
        .style_id
        .as_deref()
        .is_some_and(|style| style.contains(rules.heading_marker.as_str()))
}

/// Count heading-styled paragraphs per exact style name
pub fn heading_tally(paragraphs: &[ParagraphRecord], rules: &ChapterRules) -> HashMap<String, usize> {
    let mut tally = HashMap::new();
    for paragraph in paragraphs.iter().filter(|p| is_heading(p, rules)) {
        if let Some(style) = paragraph.style_id.as_ref() {
            *tally.entry(style.clone()).or_insert(0) += 1;
        }
    }
    tally
}

/// Pick style-based or numeric mode
pub fn select_mode(paragraphs: &[ParagraphRecord], rules: &ChapterRules) -> ChapterMode {
    let tally = heading_tally(paragraphs, rules);
    match tally.get(&rules.heading_style) {
        Some(&count) if count >= rules.min_heading_count => ChapterMode::StyleBased,
        _ => ChapterMode::Numeric,
    }
}

/// Chapter flags produced by the selected mode
pub fn mode_flags(
    paragraphs: &[ParagraphRecord],
    mode: ChapterMode,
    rules: &ChapterRules,
) -> Vec<bool> {
    paragraphs
        .iter()
        .map(|p| match mode {
            ChapterMode::StyleBased => is_heading(p, rules),
            ChapterMode::Numeric => p.format_string == rules.numeric_chapter_template,
        })
        .collect()
}

/// Chapter flags produced by the appendix override
///
/// TOC-styled paragraphs are never checked.
pub fn appendix_flags(paragraphs: &[ParagraphRecord], rules: &ChapterRules) -> Vec<bool> {
    let prefix = rules.appendix_prefix.to_uppercase();
    paragraphs
        .iter()
        .map(|p| {
            let in_toc = p
                .style_id
                .as_deref()
                .is_some_and(|style| style.contains(rules.toc_marker.as_str()));
            !in_toc && p.text.to_uppercase().starts_with(prefix.as_str())
        })
        .collect()
}

/// Run both rule sets and merge their flags
pub fn classify(paragraphs: &[ParagraphRecord], rules: &ChapterRules) -> (ChapterMode, Vec<bool>) {
    let mode = select_mode(paragraphs, rules);
    let flags = mode_flags(paragraphs, mode, rules)
        .into_iter()
        .zip(appendix_flags(paragraphs, rules))
        .map(|(by_mode, by_appendix)| by_mode || by_appendix)
        .collect();
    (mode, flags)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn styled(id: u32, style: &str, text: &str) -> ParagraphRecord {
        ParagraphRecord::new(id, 1, text).with_style(style)
    }

    #[test]
    fn test_style_mode_with_four_headings() {
        let rules = ChapterRules::default();
        let paragraphs: Vec<_> = (1..=4)
            .map(|i| styled(i, "Heading1", &format!("Chapter {}", i)))
            .collect();

        assert_eq!(select_mode(&paragraphs, &rules), ChapterMode::StyleBased);
        let (_, flags) = classify(&paragraphs, &rules);
        assert!(flags.iter().all(|f| *f));
    }

    #[test]
    fn test_numeric_mode_with_few_headings() {
        let rules = ChapterRules::default();
        for count in 0..=2 {
            let paragraphs: Vec<_> = (1..=count).map(|i| styled(i, "Heading1", "Title")).collect();
            assert_eq!(select_mode(&paragraphs, &rules), ChapterMode::Numeric);
        }
    }

    #[test]
    fn test_style_mode_flags_all_heading_levels() {
        let rules = ChapterRules::default();
        let paragraphs = vec![
            styled(1, "Heading1", "One"),
            styled(2, "Heading2", "One point one"),
            styled(3, "Heading1", "Two"),
            styled(4, "Normal", "Body"),
            styled(5, "Heading1", "Three"),
        ];

        let (mode, flags) = classify(&paragraphs, &rules);
        assert_eq!(mode, ChapterMode::StyleBased);
        assert_eq!(flags, vec![true, true, true, false, true]);
    }

    #[test]
    fn test_numeric_mode_uses_top_level_template() {
        let rules = ChapterRules::default();
        let paragraphs = vec![
            ParagraphRecord::new(1, 1, "Introduction").with_label("1.0", "%1.0"),
            ParagraphRecord::new(2, 1, "Background").with_label("1.1", "%1.%2"),
            ParagraphRecord::new(3, 1, "Plain"),
        ];

        let (mode, flags) = classify(&paragraphs, &rules);
        assert_eq!(mode, ChapterMode::Numeric);
        assert_eq!(flags, vec![true, false, false]);
    }

    #[test]
    fn test_appendix_overrides_any_mode() {
        let rules = ChapterRules::default();
        let paragraphs = vec![ParagraphRecord::new(1, 1, "APPENDIX A: SCOPE")];
        let (_, flags) = classify(&paragraphs, &rules);
        assert_eq!(flags, vec![true]);

        let lower = vec![ParagraphRecord::new(1, 1, "Appendix b - terms")];
        assert_eq!(appendix_flags(&lower, &rules), vec![true]);
    }

    #[test]
    fn test_configured_prefix_any_case() {
        let rules = ChapterRules {
            appendix_prefix: "annex".to_string(),
            ..ChapterRules::default()
        };
        let paragraphs = vec![
            ParagraphRecord::new(1, 1, "ANNEX 1 Tables"),
            ParagraphRecord::new(2, 1, "Annex 2"),
            ParagraphRecord::new(3, 1, "Appendix A"),
        ];
        assert_eq!(appendix_flags(&paragraphs, &rules), vec![true, true, false]);
    }

    #[test]
    fn test_toc_paragraphs_skip_appendix_rule() {
        let rules = ChapterRules::default();
        let paragraphs = vec![
            styled(1, "TOCHeading", "APPENDIX"),
            styled(2, "TOC1", "Appendix A ........ 12"),
        ];
        assert_eq!(appendix_flags(&paragraphs, &rules), vec![false, false]);
    }

    #[test]
    fn test_heading_tally_groups_by_exact_style() {
        let rules = ChapterRules::default();
        let paragraphs = vec![
            styled(1, "Heading1", "a"),
            styled(2, "Heading2", "b"),
            styled(3, "Heading1", "c"),
            styled(4, "BodyText", "d"),
        ];
        let tally = heading_tally(&paragraphs, &rules);
        assert_eq!(tally.get("Heading1"), Some(&2));
        assert_eq!(tally.get("Heading2"), Some(&1));
        assert!(!tally.contains_key("BodyText"));
    }

    #[test]
    fn test_classification_is_repeatable() {
        let rules = ChapterRules::default();
        let paragraphs = vec![
            styled(1, "Heading1", "a"),
            ParagraphRecord::new(2, 1, "APPENDIX C"),
            ParagraphRecord::new(3, 1, "x").with_label("2.0", "%1.0"),
        ];
        assert_eq!(classify(&paragraphs, &rules), classify(&paragraphs, &rules));
    }
}
