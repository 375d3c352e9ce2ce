//! Numbering definitions (word/numbering.xml) and list counters
//!
//! Abstract definitions describe the format of each list level; numbering
//! instances point at one abstract definition and may override the start
//! value of individual levels. [`NumberingResolver`] owns the counters and
//! renders a label every time a numbered paragraph is encountered, so it
//! must see paragraphs strictly in document order.

use std::collections::{BTreeMap, HashMap, HashSet};

use quick_xml::events::{BytesStart, Event};
use serde::{Deserialize, Serialize};

use crate::error::{OoxmlError, Result};
use crate::styles::StyleSheet;
use crate::text;
use crate::xml;

/// Label rendered for values outside the supported range of a format
pub const OUT_OF_RANGE_MARKER: &str = "xxx";

/// Highest value rendered in a letter format (`zzz...` thirty times)
pub const MAX_LETTER_VALUE: i64 = 26 * 30;

const ROMAN_LOWER: [&str; 10] = ["i", "ii", "iii", "iv", "v", "vi", "vii", "viii", "ix", "x"];
const ROMAN_UPPER: [&str; 10] = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

/// Which lists share a counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterScope {
    /// Every numbering instance counts on its own
    #[default]
    Instance,
    /// Instances of one abstract definition continue each other's count
    AbstractDefinition,
}

/// Number format of a list level (`w:numFmt`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum NumFormat {
    Decimal,
    LowerLetter,
    UpperLetter,
    LowerRoman,
    UpperRoman,
    Bullet,
    None,
    /// A format this extractor cannot render
    Unsupported(String),
}

impl NumFormat {
    /// Parse a `w:numFmt` value
    pub fn parse(value: &str) -> Self {
        match value {
            "decimal" => NumFormat::Decimal,
            "lowerLetter" => NumFormat::LowerLetter,
            "upperLetter" => NumFormat::UpperLetter,
            "lowerRoman" => NumFormat::LowerRoman,
            "upperRoman" => NumFormat::UpperRoman,
            "bullet" => NumFormat::Bullet,
            "none" => NumFormat::None,
            other => NumFormat::Unsupported(other.to_string()),
        }
    }

    /// Whether the level renders a fixed marker instead of a count
    pub fn is_bullet(&self) -> bool {
        matches!(self, NumFormat::Bullet)
    }

    /// Render a counter value in this format
    pub fn render(&self, value: i64) -> Result<String> {
        let rendered = match self {
            NumFormat::Decimal => value.to_string(),
            NumFormat::LowerLetter => letters(value, b'a'),
            NumFormat::UpperLetter => letters(value, b'A'),
            NumFormat::LowerRoman => roman(value, &ROMAN_LOWER),
            NumFormat::UpperRoman => roman(value, &ROMAN_UPPER),
            NumFormat::Bullet | NumFormat::None => String::new(),
            NumFormat::Unsupported(name) => {
                return Err(OoxmlError::UnsupportedNumberFormat(name.clone()))
            }
        };
        Ok(rendered)
    }
}

/// `a`..`z`, then `aa`..`zz` and so on, as word processors count
fn letters(value: i64, base: u8) -> String {
    if !(1..=MAX_LETTER_VALUE).contains(&value) {
        return OUT_OF_RANGE_MARKER.to_string();
    }
    let index = (value - 1) % 26;
    let repeat = (value - 1) / 26 + 1;
    let letter = char::from(base + index as u8);
    std::iter::repeat(letter).take(repeat as usize).collect()
}

fn roman(value: i64, table: &[&str; 10]) -> String {
    usize::try_from(value.saturating_sub(1))
        .ok()
        .and_then(|i| table.get(i))
        .map_or_else(|| OUT_OF_RANGE_MARKER.to_string(), |s| s.to_string())
}

/// One level of an abstract numbering definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelDef {
    /// Declared `w:start`; absent means 0
    pub start: Option<i64>,
    pub num_format: NumFormat,
    /// Label template with `%1`..`%9` placeholders
    pub level_text: String,
    /// Left indent from the level's paragraph properties
    pub indent: Option<String>,
}

impl Default for LevelDef {
    fn default() -> Self {
        Self {
            start: None,
            num_format: NumFormat::Decimal,
            level_text: String::new(),
            indent: None,
        }
    }
}

impl LevelDef {
    /// Counter value before the first increment
    pub fn base(&self) -> i64 {
        self.start.unwrap_or(0).saturating_sub(1)
    }
}

/// An abstract numbering definition (`w:abstractNum`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AbstractNumbering {
    pub id: u32,
    pub levels: BTreeMap<u8, LevelDef>,
    /// Style whose numbering this definition borrows when it has no levels
    pub style_link: Option<String>,
}

/// A concrete list (`w:num`)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NumberingInstance {
    pub num_id: u32,
    pub abstract_id: u32,
    /// `w:startOverride` values by level
    pub overrides: BTreeMap<u8, i64>,
}

/// Parsed numbering part
#[derive(Debug, Clone, Default)]
pub struct NumberingDefinitions {
    abstracts: BTreeMap<u32, AbstractNumbering>,
    instances: BTreeMap<u32, NumberingInstance>,
}

impl NumberingDefinitions {
    /// Definitions for a package without a numbering part
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse numbering definitions from XML bytes
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = xml::reader(xml, true);
        let mut buf = Vec::new();
        let mut builder = DefinitionsBuilder::default();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => builder.open(e),
                Event::Empty(ref e) => {
                    builder.open(e);
                    builder.close(e.local_name().as_ref());
                }
                Event::End(ref e) => builder.close(e.local_name().as_ref()),
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        let defs = builder.defs;
        log::debug!(
            "Loaded {} abstract numbering definitions, {} instances",
            defs.abstracts.len(),
            defs.instances.len()
        );
        Ok(defs)
    }

    /// Abstract definition by id
    pub fn abstract_numbering(&self, id: u32) -> Option<&AbstractNumbering> {
        self.abstracts.get(&id)
    }

    /// Numbering instance by id
    pub fn instance(&self, num_id: u32) -> Option<&NumberingInstance> {
        self.instances.get(&num_id)
    }

    /// Whether no lists are defined
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// Accumulates definitions while the numbering part is streamed
#[derive(Default)]
struct DefinitionsBuilder {
    defs: NumberingDefinitions,
    current_abstract: Option<AbstractNumbering>,
    current_level: Option<(u8, LevelDef)>,
    current_num: Option<NumberingInstance>,
    override_level: Option<u8>,
}

impl DefinitionsBuilder {
    fn open(&mut self, e: &BytesStart) {
        let name = e.local_name();
        match name.as_ref() {
            b"abstractNum" => {
                self.current_abstract = Some(AbstractNumbering {
                    id: id_attr(e, b"abstractNumId"),
                    ..AbstractNumbering::default()
                });
            }
            // Levels redefined inside a lvlOverride are not supported
            b"lvl" if self.current_abstract.is_some() => {
                let ilvl = xml::attr(e, b"ilvl")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(0);
                self.current_level = Some((ilvl, LevelDef::default()));
            }
            b"num" => {
                self.current_num = Some(NumberingInstance {
                    num_id: id_attr(e, b"numId"),
                    ..NumberingInstance::default()
                });
            }
            other => self.property(other, e),
        }
    }

    fn property(&mut self, name: &[u8], e: &BytesStart) {
        if let Some((_, level)) = self.current_level.as_mut() {
            match name {
                b"start" => level.start = xml::val_parsed(e),
                b"numFmt" => {
                    if let Some(fmt) = xml::val(e) {
                        level.num_format = NumFormat::parse(&fmt);
                    }
                }
                b"lvlText" => {
                    level.level_text = text::normalize(&xml::val(e).unwrap_or_default());
                }
                b"ind" => {
                    level.indent = xml::attr(e, b"left").or_else(|| xml::attr(e, b"start"));
                }
                _ => {}
            }
        } else if let Some(abstract_num) = self.current_abstract.as_mut() {
            if name == b"numStyleLink" {
                abstract_num.style_link = xml::val(e);
            }
        } else if let Some(num) = self.current_num.as_mut() {
            match name {
                b"abstractNumId" => num.abstract_id = xml::val_parsed(e).unwrap_or_default(),
                b"lvlOverride" => {
                    self.override_level = xml::attr(e, b"ilvl").and_then(|v| v.parse().ok());
                }
                b"startOverride" => {
                    if let (Some(ilvl), Some(start)) = (self.override_level, xml::val_parsed(e)) {
                        num.overrides.insert(ilvl, start);
                    }
                }
                _ => {}
            }
        }
    }

    fn close(&mut self, name: &[u8]) {
        match name {
            b"lvl" => {
                if let (Some(abstract_num), Some((ilvl, level))) =
                    (self.current_abstract.as_mut(), self.current_level.take())
                {
                    abstract_num.levels.insert(ilvl, level);
                }
            }
            b"abstractNum" => {
                if let Some(abstract_num) = self.current_abstract.take() {
                    self.defs.abstracts.insert(abstract_num.id, abstract_num);
                }
            }
            b"lvlOverride" => self.override_level = None,
            b"num" => {
                if let Some(num) = self.current_num.take() {
                    self.defs.instances.insert(num.num_id, num);
                }
            }
            _ => {}
        }
    }
}

fn id_attr(e: &BytesStart, name: &[u8]) -> u32 {
    xml::attr(e, name)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or_default()
}

/// Mutable list counters, keyed by `(list, ilvl)`
///
/// The list key is a numbering instance id or an abstract definition id,
/// depending on the [`CounterScope`]. One-time start overrides are tracked
/// per `(num_id, ilvl)` regardless of scope.
#[derive(Debug, Clone, Default)]
pub struct LevelCounterState {
    counters: HashMap<(u32, u8), i64>,
    consumed: HashSet<(u32, u8)>,
}

impl LevelCounterState {
    fn value(&self, list: u32, ilvl: u8, base: i64) -> i64 {
        self.counters.get(&(list, ilvl)).copied().unwrap_or(base)
    }

    fn set(&mut self, list: u32, ilvl: u8, value: i64) {
        self.counters.insert((list, ilvl), value);
    }

    fn increment(&mut self, list: u32, ilvl: u8, base: i64) {
        let counter = self.counters.entry((list, ilvl)).or_insert(base);
        *counter = counter.saturating_add(1);
    }

    /// Mark an override as used; false if it already was
    fn consume(&mut self, num_id: u32, ilvl: u8) -> bool {
        self.consumed.insert((num_id, ilvl))
    }
}

/// A rendered list label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLevel {
    pub label: String,
    /// The level's raw `lvlText` template
    pub format_string: String,
    pub indent: Option<String>,
    /// The template still contained a `%` after substitution
    pub unresolved_placeholder: bool,
}

/// Renders list labels in document order
pub struct NumberingResolver<'a> {
    definitions: NumberingDefinitions,
    styles: &'a StyleSheet,
    scope: CounterScope,
    bullet_marker: String,
    counters: LevelCounterState,
}

impl<'a> NumberingResolver<'a> {
    pub fn new(
        definitions: NumberingDefinitions,
        styles: &'a StyleSheet,
        scope: CounterScope,
        bullet_marker: impl Into<String>,
    ) -> Self {
        Self {
            definitions,
            styles,
            scope,
            bullet_marker: bullet_marker.into(),
            counters: LevelCounterState::default(),
        }
    }

    /// Instance and abstract definition behind a numbering id
    ///
    /// A definition without levels that links to a style borrows the level
    /// definitions of the list that style points at. Overrides and the
    /// counter key stay with the instance that was asked for.
    fn lookup(&self, num_id: u32) -> Option<(&NumberingInstance, &AbstractNumbering)> {
        let instance = self.definitions.instance(num_id)?;
        let abstract_num = self.definitions.abstract_numbering(instance.abstract_id)?;

        match abstract_num.style_link.as_deref() {
            Some(link) if abstract_num.levels.is_empty() => {
                let linked_id = self.styles.get(link)?.num_id?;
                if linked_id == num_id {
                    return None;
                }
                let linked = self.definitions.instance(linked_id)?;
                let linked_abstract = self.definitions.abstract_numbering(linked.abstract_id)?;
                Some((instance, linked_abstract))
            }
            _ => Some((instance, abstract_num)),
        }
    }

    /// Advance the counters for one occurrence of `(num_id, ilvl)` and
    /// render its label
    ///
    /// Returns `Ok(None)` when the numbering id or level is not defined.
    pub fn resolve_label(&mut self, num_id: u32, ilvl: u8) -> Result<Option<ResolvedLevel>> {
        let (instance, abstract_num) = match self.lookup(num_id) {
            Some(found) => found,
            None => return Ok(None),
        };
        let level = match abstract_num.levels.get(&ilvl) {
            Some(level) => level.clone(),
            None => return Ok(None),
        };
        let instance_id = instance.num_id;
        let list = match self.scope {
            CounterScope::Instance => instance.num_id,
            CounterScope::AbstractDefinition => abstract_num.id,
        };
        let override_start = instance.overrides.get(&ilvl).copied();
        let levels = abstract_num.levels.clone();

        let mut resolved = ResolvedLevel {
            label: String::new(),
            format_string: level.level_text.clone(),
            indent: level.indent.clone(),
            unresolved_placeholder: false,
        };

        if level.num_format.is_bullet() {
            resolved.label = self.bullet_marker.clone();
            return Ok(Some(resolved));
        }

        match override_start {
            Some(start) if self.counters.consume(instance_id, ilvl) => {
                self.counters.set(list, ilvl, start);
            }
            _ => {
                // A deep level seen before its parents still counts them once
                for (&i, shallower) in levels.range(..ilvl) {
                    let base = shallower.base();
                    if !shallower.num_format.is_bullet()
                        && self.counters.value(list, i, base) == base
                    {
                        self.counters.increment(list, i, base);
                    }
                }
                self.counters.increment(list, ilvl, level.base());
            }
        }

        // Restart every deeper level
        for (&k, deeper) in levels.range(ilvl + 1..) {
            if !deeper.num_format.is_bullet() {
                self.counters.set(list, k, deeper.base());
            }
        }

        let mut label = resolved.format_string.clone();
        for i in 0..=ilvl {
            let placeholder = format!("%{}", i + 1);
            if !label.contains(&placeholder) {
                continue;
            }
            let owner = levels.get(&i).unwrap_or(&level);
            let value = self.counters.value(list, i, owner.base());
            label = label.replace(&placeholder, &owner.num_format.render(value)?);
        }

        resolved.unresolved_placeholder = label.contains('%');
        resolved.label = label;
        Ok(Some(resolved))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbering_xml(body: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">{body}</w:numbering>"#
        )
        .into_bytes()
    }

    const OUTLINE: &str = r#"
        <w:abstractNum w:abstractNumId="0">
            <w:lvl w:ilvl="0">
                <w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/>
                <w:pPr><w:ind w:left="360" w:hanging="360"/></w:pPr>
            </w:lvl>
            <w:lvl w:ilvl="1">
                <w:start w:val="1"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%1.%2"/>
            </w:lvl>
            <w:lvl w:ilvl="2">
                <w:start w:val="1"/><w:numFmt w:val="lowerRoman"/><w:lvlText w:val="(%3)"/>
            </w:lvl>
        </w:abstractNum>
        <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
        <w:num w:numId="2">
            <w:abstractNumId w:val="0"/>
            <w:lvlOverride w:ilvl="0"><w:startOverride w:val="5"/></w:lvlOverride>
        </w:num>"#;

    fn resolver<'a>(body: &str, styles: &'a StyleSheet, scope: CounterScope) -> NumberingResolver<'a> {
        let defs = NumberingDefinitions::parse(&numbering_xml(body)).unwrap();
        NumberingResolver::new(defs, styles, scope, "-")
    }

    fn label(resolver: &mut NumberingResolver<'_>, num_id: u32, ilvl: u8) -> String {
        resolver.resolve_label(num_id, ilvl).unwrap().unwrap().label
    }

    #[test]
    fn test_parse_definitions() {
        let defs = NumberingDefinitions::parse(&numbering_xml(OUTLINE)).unwrap();
        let abstract_num = defs.abstract_numbering(0).unwrap();

        assert_eq!(abstract_num.levels.len(), 3);
        let first = &abstract_num.levels[&0];
        assert_eq!(first.start, Some(1));
        assert_eq!(first.base(), 0);
        assert_eq!(first.num_format, NumFormat::Decimal);
        assert_eq!(first.level_text, "%1.");
        assert_eq!(first.indent.as_deref(), Some("360"));

        assert_eq!(defs.instance(1).unwrap().abstract_id, 0);
        assert_eq!(defs.instance(2).unwrap().overrides.get(&0), Some(&5));
        assert!(defs.instance(3).is_none());
    }

    #[test]
    fn test_same_level_counts_up() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 1, 0), "1.");
        assert_eq!(label(&mut r, 1, 0), "2.");
        assert_eq!(label(&mut r, 1, 0), "3.");
    }

    #[test]
    fn test_deeper_levels_restart() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 1, 0), "1.");
        assert_eq!(label(&mut r, 1, 1), "1.a");
        assert_eq!(label(&mut r, 1, 1), "1.b");
        assert_eq!(label(&mut r, 1, 2), "(i)");
        assert_eq!(label(&mut r, 1, 0), "2.");
        assert_eq!(r.counters.value(1, 1, i64::MIN), 0);
        assert_eq!(r.counters.value(1, 2, i64::MIN), 0);
        assert_eq!(label(&mut r, 1, 1), "2.a");
    }

    #[test]
    fn test_deep_level_first_counts_parent() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 1, 1), "1.a");
        assert_eq!(label(&mut r, 1, 0), "2.");
    }

    #[test]
    fn test_override_applies_once() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 2, 0), "5.");
        assert_eq!(label(&mut r, 2, 0), "6.");
        assert_eq!(label(&mut r, 2, 0), "7.");
    }

    #[test]
    fn test_instances_count_separately() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 1, 0), "1.");
        assert_eq!(label(&mut r, 2, 0), "5.");
        assert_eq!(label(&mut r, 1, 0), "2.");
    }

    #[test]
    fn test_abstract_scope_shares_counters() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::AbstractDefinition);

        assert_eq!(label(&mut r, 1, 0), "1.");
        assert_eq!(label(&mut r, 1, 0), "2.");
        // The override restarts the shared list
        assert_eq!(label(&mut r, 2, 0), "5.");
        assert_eq!(label(&mut r, 1, 0), "6.");
    }

    #[test]
    fn test_bullet_leaves_counters_alone() {
        let body = r#"
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
                <w:lvl w:ilvl="1"><w:start w:val="1"/><w:numFmt w:val="bullet"/><w:lvlText w:val="&#8226;"/></w:lvl>
            </w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#;
        let styles = StyleSheet::empty();
        let mut r = resolver(body, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 1, 0), "1.");
        let bullet = r.resolve_label(1, 1).unwrap().unwrap();
        assert_eq!(bullet.label, "-");
        assert_eq!(bullet.format_string, "-");
        assert_eq!(label(&mut r, 1, 0), "2.");
    }

    #[test]
    fn test_unknown_ids_resolve_to_none() {
        let styles = StyleSheet::empty();
        let mut r = resolver(OUTLINE, &styles, CounterScope::Instance);

        assert_eq!(r.resolve_label(42, 0).unwrap(), None);
        assert_eq!(r.resolve_label(1, 7).unwrap(), None);
    }

    #[test]
    fn test_missing_start_counts_from_zero() {
        let body = r#"
            <w:abstractNum w:abstractNumId="3">
                <w:lvl w:ilvl="0"><w:lvlText w:val="%1)"/></w:lvl>
            </w:abstractNum>
            <w:num w:numId="9"><w:abstractNumId w:val="3"/></w:num>"#;
        let styles = StyleSheet::empty();
        let mut r = resolver(body, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 9, 0), "0)");
        assert_eq!(label(&mut r, 9, 0), "1)");
    }

    #[test]
    fn test_unsupported_format_fails_on_render() {
        let body = r#"
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="ordinal"/><w:lvlText w:val="%1"/></w:lvl>
            </w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#;
        let styles = StyleSheet::empty();
        let mut r = resolver(body, &styles, CounterScope::Instance);

        let err = r.resolve_label(1, 0).unwrap_err();
        assert!(matches!(err, OoxmlError::UnsupportedNumberFormat(ref f) if f == "ordinal"));
    }

    #[test]
    fn test_unresolved_placeholder_flagged() {
        let body = r#"
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1.%2"/></w:lvl>
            </w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>"#;
        let styles = StyleSheet::empty();
        let mut r = resolver(body, &styles, CounterScope::Instance);

        let resolved = r.resolve_label(1, 0).unwrap().unwrap();
        assert_eq!(resolved.label, "1.%2");
        assert!(resolved.unresolved_placeholder);
    }

    #[test]
    fn test_style_link_borrows_list() {
        let body = r#"
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="upperRoman"/><w:lvlText w:val="%1."/></w:lvl>
            </w:abstractNum>
            <w:abstractNum w:abstractNumId="1">
                <w:numStyleLink w:val="LegalList"/>
            </w:abstractNum>
            <w:num w:numId="4"><w:abstractNumId w:val="0"/></w:num>
            <w:num w:numId="5"><w:abstractNumId w:val="1"/></w:num>"#;
        let styles_xml = br#"<w:styles xmlns:w="urn:w">
            <w:style w:type="numbering" w:styleId="LegalList">
                <w:pPr><w:numPr><w:numId w:val="4"/></w:numPr></w:pPr>
            </w:style>
        </w:styles>"#;
        let styles =
            StyleSheet::parse(styles_xml, &crate::theme::ThemeFonts::default()).unwrap();
        let mut r = resolver(body, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 5, 0), "I.");
        assert_eq!(label(&mut r, 5, 0), "II.");
        // The style's own list keeps a separate count
        assert_eq!(label(&mut r, 4, 0), "I.");
    }

    #[test]
    fn test_style_link_keeps_instance_overrides() {
        let body = r#"
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl>
            </w:abstractNum>
            <w:abstractNum w:abstractNumId="1">
                <w:numStyleLink w:val="LegalList"/>
            </w:abstractNum>
            <w:num w:numId="4"><w:abstractNumId w:val="0"/></w:num>
            <w:num w:numId="5">
                <w:abstractNumId w:val="1"/>
                <w:lvlOverride w:ilvl="0"><w:startOverride w:val="7"/></w:lvlOverride>
            </w:num>"#;
        let styles_xml = br#"<w:styles xmlns:w="urn:w">
            <w:style w:type="numbering" w:styleId="LegalList">
                <w:pPr><w:numPr><w:numId w:val="4"/></w:numPr></w:pPr>
            </w:style>
        </w:styles>"#;
        let styles =
            StyleSheet::parse(styles_xml, &crate::theme::ThemeFonts::default()).unwrap();

        let mut r = resolver(body, &styles, CounterScope::Instance);
        assert_eq!(label(&mut r, 5, 0), "7.");
        assert_eq!(label(&mut r, 5, 0), "8.");
        assert_eq!(label(&mut r, 4, 0), "1.");

        // Sharing by definition continues the borrowed list
        let mut r = resolver(body, &styles, CounterScope::AbstractDefinition);
        assert_eq!(label(&mut r, 4, 0), "1.");
        assert_eq!(label(&mut r, 5, 0), "7.");
        assert_eq!(label(&mut r, 4, 0), "8.");
    }

    #[test]
    fn test_extreme_start_values() {
        let body = r#"
            <w:abstractNum w:abstractNumId="0">
                <w:lvl w:ilvl="0"><w:start w:val="2000000000"/><w:numFmt w:val="lowerLetter"/><w:lvlText w:val="%1"/></w:lvl>
                <w:lvl w:ilvl="1"><w:start w:val="-9223372036854775808"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%2"/></w:lvl>
                <w:lvl w:ilvl="2"><w:start w:val="9223372036854775807"/><w:numFmt w:val="upperRoman"/><w:lvlText w:val="%3"/></w:lvl>
            </w:abstractNum>
            <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
            <w:num w:numId="2">
                <w:abstractNumId w:val="0"/>
                <w:lvlOverride w:ilvl="0"><w:startOverride w:val="9223372036854775807"/></w:lvlOverride>
            </w:num>"#;
        let styles = StyleSheet::empty();
        let mut r = resolver(body, &styles, CounterScope::Instance);

        assert_eq!(label(&mut r, 1, 0), OUT_OF_RANGE_MARKER);
        // The value before the first increment saturates at i64::MIN
        assert_eq!(label(&mut r, 1, 1), "-9223372036854775807");
        assert_eq!(label(&mut r, 1, 1), "-9223372036854775806");
        assert_eq!(label(&mut r, 1, 2), OUT_OF_RANGE_MARKER);
        assert_eq!(label(&mut r, 1, 2), OUT_OF_RANGE_MARKER);

        assert_eq!(label(&mut r, 2, 0), OUT_OF_RANGE_MARKER);
        assert_eq!(label(&mut r, 2, 0), OUT_OF_RANGE_MARKER);
    }

    #[test]
    fn test_render_formats() {
        assert_eq!(NumFormat::Decimal.render(12).unwrap(), "12");
        assert_eq!(NumFormat::LowerLetter.render(3).unwrap(), "c");
        assert_eq!(NumFormat::UpperLetter.render(28).unwrap(), "BB");
        assert_eq!(NumFormat::LowerLetter.render(MAX_LETTER_VALUE).unwrap(), "z".repeat(30));
        assert_eq!(NumFormat::LowerLetter.render(MAX_LETTER_VALUE + 1).unwrap(), OUT_OF_RANGE_MARKER);
        assert_eq!(NumFormat::LowerLetter.render(0).unwrap(), OUT_OF_RANGE_MARKER);
        assert_eq!(NumFormat::UpperRoman.render(4).unwrap(), "IV");
        assert_eq!(NumFormat::LowerRoman.render(11).unwrap(), OUT_OF_RANGE_MARKER);
        assert_eq!(NumFormat::None.render(5).unwrap(), "");
    }
}
