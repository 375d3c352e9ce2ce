//! Style definitions parsing (word/styles.xml)
//!
//! Styles are flattened once at load time: every style carries the
//! attributes it inherits through its `basedOn` chain, so lookups during
//! the paragraph walk never walk the chain again. A child's own attributes
//! are never overwritten by an ancestor.

use std::collections::{HashMap, HashSet};
use std::fmt;

use quick_xml::events::{BytesStart, Event};
use serde::Serialize;

use crate::error::{OoxmlError, Result};
use crate::theme::ThemeFonts;
use crate::xml;

/// Font size used when `docDefaults` declares none (10pt)
pub const DEFAULT_FONT_SIZE: FontSize = FontSize(20);

/// Font size in half-points, as stored by `w:sz`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FontSize(u32);

impl FontSize {
    /// Size from a raw `w:sz` value
    pub fn from_half_points(half_points: u32) -> Self {
        Self(half_points)
    }

    /// Raw half-point value
    pub fn half_points(self) -> u32 {
        self.0
    }

    /// Size in points
    pub fn points(self) -> f64 {
        f64::from(self.0) / 2.0
    }
}

/// Renders as decimal points: `24` half-points is `12.0`, `21` is `10.5`
impl fmt::Display for FontSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fraction = if self.0 % 2 == 0 { 0 } else { 5 };
        write!(f, "{}.{}", self.0 / 2, fraction)
    }
}

/// Type of style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleType {
    /// Paragraph style
    #[default]
    Paragraph,
    /// Character (run) style
    Character,
    /// Table style
    Table,
    /// Numbering style
    Numbering,
}

impl StyleType {
    fn from_attr(value: &str) -> Self {
        match value {
            "character" => StyleType::Character,
            "table" => StyleType::Table,
            "numbering" => StyleType::Numbering,
            _ => StyleType::Paragraph,
        }
    }
}

/// A Word style with its inherited attributes filled in
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleDefinition {
    /// Style ID (used in document references)
    pub id: String,
    /// Display name
    pub name: Option<String>,
    /// Style type
    pub style_type: StyleType,
    /// Parent style ID
    pub based_on: Option<String>,
    /// ASCII font, theme references already resolved
    pub font_name: Option<String>,
    pub font_size: Option<FontSize>,
    pub bold: Option<bool>,
    /// Whether the run properties set a non-automatic color
    pub colored: Option<bool>,
    /// Raw `w:spacing/@w:line` value (240 = single)
    pub line_spacing: Option<u32>,
    pub line_rule: Option<String>,
    /// Numbering instance reference (0 removes inherited numbering)
    pub num_id: Option<u32>,
    pub ilvl: Option<u8>,
    /// Outline level (0-8, where 0 = Heading 1)
    pub outline_level: Option<u8>,
}

impl StyleDefinition {
    /// Copy every attribute the parent has and this style lacks
    fn inherit_from(&mut self, parent: &StyleDefinition) {
        fn fill<T: Clone>(own: &mut Option<T>, inherited: &Option<T>) {
            if own.is_none() {
                own.clone_from(inherited);
            }
        }

        fill(&mut self.font_name, &parent.font_name);
        fill(&mut self.font_size, &parent.font_size);
        fill(&mut self.bold, &parent.bold);
        fill(&mut self.colored, &parent.colored);
        fill(&mut self.line_spacing, &parent.line_spacing);
        fill(&mut self.line_rule, &parent.line_rule);
        fill(&mut self.num_id, &parent.num_id);
        fill(&mut self.ilvl, &parent.ilvl);
        fill(&mut self.outline_level, &parent.outline_level);
    }
}

/// Document-wide run defaults (`w:docDefaults`)
///
/// A parsed styles part always has a default size; only a package without
/// one leaves it unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DocDefaults {
    pub font_name: Option<String>,
    pub font_size: Option<FontSize>,
}

/// Collection of flattened styles from a document
#[derive(Debug, Clone, Default)]
pub struct StyleSheet {
    /// All styles, keyed by style ID
    styles: HashMap<String, StyleDefinition>,
    defaults: DocDefaults,
}

impl StyleSheet {
    /// Stylesheet for a package without a styles part
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse styles from XML bytes and flatten their inheritance chains
    pub fn parse(xml: &[u8], theme: &ThemeFonts) -> Result<Self> {
        let mut reader = xml::reader(xml, true);
        let mut buf = Vec::new();

        let mut raw: HashMap<String, StyleDefinition> = HashMap::new();
        let mut defaults = DocDefaults::default();
        // Local names of the open elements below the root
        let mut stack: Vec<Vec<u8>> = Vec::new();
        let mut current: Option<StyleDefinition> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => {
                    let name = e.local_name().as_ref().to_vec();
                    if name == b"style" {
                        current = Some(start_style(e));
                    } else {
                        apply(&stack, e, &mut current, &mut defaults, theme);
                    }
                    stack.push(name);
                }
                Event::Empty(ref e) => {
                    if e.local_name().as_ref() == b"style" {
                        finish_style(&mut raw, Some(start_style(e)));
                    } else {
                        apply(&stack, e, &mut current, &mut defaults, theme);
                    }
                }
                Event::End(ref e) => {
                    stack.pop();
                    if e.local_name().as_ref() == b"style" {
                        finish_style(&mut raw, current.take());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let styles = flatten(&raw)?;
        let size = *defaults.font_size.get_or_insert(DEFAULT_FONT_SIZE);
        log::debug!(
            "Loaded {} styles (default font {:?}, {}pt)",
            styles.len(),
            defaults.font_name,
            size
        );

        Ok(Self { styles, defaults })
    }

    /// Get a flattened style by ID
    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.styles.get(id)
    }

    /// Check whether a style ID is defined
    pub fn contains(&self, id: &str) -> bool {
        self.styles.contains_key(id)
    }

    /// The "Normal" paragraph style, if the document defines one
    pub fn normal(&self) -> Option<&StyleDefinition> {
        self.get("Normal")
    }

    /// Document-wide run defaults
    pub fn defaults(&self) -> &DocDefaults {
        &self.defaults
    }

    /// Number of styles
    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Whether no styles were defined
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    /// All styles, in no particular order
    pub fn all(&self) -> impl Iterator<Item = &StyleDefinition> {
        self.styles.values()
    }
}

fn start_style(e: &BytesStart) -> StyleDefinition {
    StyleDefinition {
        id: xml::attr(e, b"styleId").unwrap_or_default(),
        style_type: xml::attr(e, b"type")
            .map(|t| StyleType::from_attr(&t))
            .unwrap_or_default(),
        ..StyleDefinition::default()
    }
}

fn finish_style(raw: &mut HashMap<String, StyleDefinition>, style: Option<StyleDefinition>) {
    match style {
        Some(style) if !style.id.is_empty() => {
            raw.insert(style.id.clone(), style);
        }
        Some(_) => log::debug!("Skipping style without styleId"),
        None => {}
    }
}

/// Route a property element to the open style or to the document defaults
fn apply(
    stack: &[Vec<u8>],
    e: &BytesStart,
    current: &mut Option<StyleDefinition>,
    defaults: &mut DocDefaults,
    theme: &ThemeFonts,
) {
    let parent = stack.last().map(Vec::as_slice).unwrap_or_default();

    // Conditional table formatting does not describe the style itself
    if stack.iter().any(|n| n == b"tblStylePr") {
        return;
    }

    if let Some(style) = current.as_mut() {
        apply_to_style(style, parent, e, theme);
    } else if stack.iter().any(|n| n == b"rPrDefault") && parent == b"rPr" {
        match e.local_name().as_ref() {
            b"rFonts" => {
                defaults.font_name = theme.font_name(
                    xml::attr(e, b"ascii"),
                    xml::attr(e, b"asciiTheme").as_deref(),
                );
            }
            b"sz" => {
                if let Some(sz) = xml::val_parsed(e) {
                    defaults.font_size = Some(FontSize(sz));
                }
            }
            _ => {}
        }
    }
}

fn apply_to_style(style: &mut StyleDefinition, parent: &[u8], e: &BytesStart, theme: &ThemeFonts) {
    match (parent, e.local_name().as_ref()) {
        (b"style", b"name") => style.name = xml::val(e),
        (b"style", b"basedOn") => style.based_on = xml::val(e),
        (b"pPr", b"outlineLvl") => style.outline_level = xml::val_parsed(e),
        (b"pPr", b"spacing") => {
            if let Some(line) = xml::attr(e, b"line").and_then(|v| v.parse().ok()) {
                style.line_spacing = Some(line);
            }
            if let Some(rule) = xml::attr(e, b"lineRule") {
                style.line_rule = Some(rule);
            }
        }
        (b"numPr", b"ilvl") => style.ilvl = xml::val_parsed(e),
        (b"numPr", b"numId") => style.num_id = xml::val_parsed(e),
        (b"rPr", b"b") => style.bold = Some(xml::toggle(e)),
        (b"rPr", b"color") => {
            style.colored = Some(xml::val(e).is_some_and(|c| c != "auto"));
        }
        (b"rPr", b"rFonts") => {
            let font = theme.font_name(
                xml::attr(e, b"ascii"),
                xml::attr(e, b"asciiTheme").as_deref(),
            );
            if font.is_some() {
                style.font_name = font;
            }
        }
        (b"rPr", b"sz") => style.font_size = xml::val_parsed(e).map(FontSize),
        _ => {}
    }
}

/// Resolve every style's `basedOn` chain into a flattened definition
fn flatten(raw: &HashMap<String, StyleDefinition>) -> Result<HashMap<String, StyleDefinition>> {
    let mut ids: Vec<&String> = raw.keys().collect();
    ids.sort();

    let mut resolved = HashMap::with_capacity(raw.len());
    for id in ids {
        let mut style = raw[id].clone();
        let mut seen: HashSet<&str> = HashSet::from([id.as_str()]);
        let mut child = id.as_str();
        let mut next = raw[id].based_on.as_deref();

        while let Some(parent_id) = next {
            if !seen.insert(parent_id) {
                return Err(OoxmlError::StyleCycle(id.clone()));
            }
            let parent = raw
                .get(parent_id)
                .ok_or_else(|| OoxmlError::UnknownStyleReference {
                    style: child.to_string(),
                    based_on: parent_id.to_string(),
                })?;
            style.inherit_from(parent);
            child = parent_id;
            next = parent.based_on.as_deref();
        }

        resolved.insert(id.clone(), style);
    }

    Ok(resolved)
}
