//! Paragraph text normalization and textual numbering heuristics
//!
//! Word documents often carry typed-in numbering ("2.1.3 Scope", "(a)",
//! "SECTION 4") instead of numbering metadata. The matchers below recover
//! such labels from the leading text. They are tried in order and the
//! first match wins; explicit numbering properties override them later.

use std::sync::OnceLock;

use regex::Regex;

/// Replacement for a single character, or `None` to keep it
fn replacement(c: char) -> Option<&'static str> {
    let replaced = match c {
        // Bullet glyphs, including Symbol-font private-use code points
        '\u{2022}' | '\u{F0A7}' | '\u{F0B7}' | '\u{F02D}' | '\u{00AD}' | '\u{25CF}'
        | '\u{25AA}' | '\u{25CB}' => "-",
        '\u{2014}' | '\u{2013}' => "-",
        '\u{2003}' | '\u{2002}' | '\u{2005}' | '\u{00A0}' => " ",
        '\u{00A9}' => "COPYRIGHT",
        '\u{00AE}' => "REGISTERED",
        '\u{2122}' => "TRADEMARK",
        '\u{00A7}' => "SECTION",
        '\u{00B6}' => "PARAGRAPH",
        '\u{2026}' => "...",
        '\u{2018}' | '\u{2019}' => "'",
        '\u{201C}' | '\u{201D}' => "\"",
        '\u{25A1}' => "[]",
        '\u{2044}' => "/",
        _ => return None,
    };
    Some(replaced)
}

/// Replace typographic punctuation with plain ASCII equivalents
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match replacement(c) {
            Some(r) => out.push_str(r),
            None => out.push(c),
        }
    }
    out
}

/// A label recovered from the leading paragraph text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeuristicLabel {
    /// Trimmed label text
    pub label: String,
    /// Replacement paragraph text, when the marker is removed from it
    pub text: Option<String>,
}

impl HeuristicLabel {
    fn new(label: &str) -> Self {
        Self {
            label: label.trim().to_string(),
            text: None,
        }
    }
}

type Matcher = fn(&str) -> Option<HeuristicLabel>;

/// Matchers in priority order
const MATCHERS: &[(&str, Matcher)] = &[
    ("dash", dash),
    ("numeric", numeric),
    ("section", section),
    ("parenthesized", parenthesized),
    ("roman", roman),
];

/// Run the matchers in order and return the first label found
pub fn heuristic_label(text: &str) -> Option<HeuristicLabel> {
    MATCHERS.iter().find_map(|(name, matcher)| {
        let found = matcher(text);
        if let Some(ref m) = found {
            log::trace!("{} heuristic matched {:?}", name, m.label);
        }
        found
    })
}

fn dash(text: &str) -> Option<HeuristicLabel> {
    static DASH_RE: OnceLock<Regex> = OnceLock::new();
    let re = DASH_RE.get_or_init(|| Regex::new(r"^ *-").unwrap());

    re.find(text).map(|m| HeuristicLabel {
        label: "-".to_string(),
        text: Some(text[m.end()..].trim_start().to_string()),
    })
}

fn numeric(text: &str) -> Option<HeuristicLabel> {
    static NUMERIC_RE: OnceLock<Regex> = OnceLock::new();
    let re = NUMERIC_RE
        .get_or_init(|| Regex::new(r"^ *[A-Za-z]?[\-\.]?(\d+[.]?)+\s+").unwrap());

    let m = re.find(text)?;
    // Leading quantities such as "250 units" are not numbering
    match m.as_str().trim().parse::<f64>() {
        Ok(value) if value >= 100.0 => None,
        _ => Some(HeuristicLabel::new(m.as_str())),
    }
}

fn section(text: &str) -> Option<HeuristicLabel> {
    static SECTION_RE: OnceLock<Regex> = OnceLock::new();
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    let re = SECTION_RE.get_or_init(|| Regex::new(r"(?i)^ *SECTION \w+").unwrap());
    let word = WORD_RE.get_or_init(|| Regex::new(r"(?i)section").unwrap());

    re.find(text)
        .map(|m| HeuristicLabel::new(&word.replace_all(m.as_str(), "")))
}

fn parenthesized(text: &str) -> Option<HeuristicLabel> {
    static PAREN_RE: OnceLock<Regex> = OnceLock::new();
    let re = PAREN_RE.get_or_init(|| Regex::new(r"^ *[(]?\w+[)]").unwrap());

    re.find(text).map(|m| HeuristicLabel::new(m.as_str()))
}

fn roman(text: &str) -> Option<HeuristicLabel> {
    static ROMAN_RE: OnceLock<Regex> = OnceLock::new();
    let re = ROMAN_RE.get_or_init(|| Regex::new(r"^ *([IVXivx]+[.]?)+[.]").unwrap());

    re.find(text).map(|m| HeuristicLabel::new(m.as_str()))
}
