//! Theme font scheme (word/theme/theme1.xml)
//!
//! Styles and runs may name a theme font (`w:asciiTheme="minorHAnsi"`)
//! instead of a typeface. The theme's font scheme maps those references to
//! the major (headings) and minor (body) Latin typefaces.

use quick_xml::events::Event;

use crate::error::Result;
use crate::xml;

/// Latin typefaces of the theme font scheme
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeFonts {
    /// Major (heading) Latin typeface
    pub major_latin: Option<String>,
    /// Minor (body) Latin typeface
    pub minor_latin: Option<String>,
}

#[derive(Clone, Copy)]
enum Slot {
    Major,
    Minor,
}

impl ThemeFonts {
    /// Parse the font scheme out of a theme part
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = xml::reader(xml, true);
        let mut fonts = ThemeFonts::default();
        let mut buf = Vec::new();
        let mut in_scheme = false;
        let mut slot: Option<Slot> = None;

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => match e.local_name().as_ref() {
                    b"fontScheme" => in_scheme = true,
                    b"majorFont" if in_scheme => slot = Some(Slot::Major),
                    b"minorFont" if in_scheme => slot = Some(Slot::Minor),
                    b"latin" => fonts.capture(slot, e),
                    _ => {}
                },
                Event::Empty(ref e) => {
                    if e.local_name().as_ref() == b"latin" {
                        fonts.capture(slot, e);
                    }
                }
                Event::End(ref e) => match e.local_name().as_ref() {
                    b"fontScheme" => in_scheme = false,
                    b"majorFont" | b"minorFont" => slot = None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        log::debug!(
            "Theme fonts: major={:?} minor={:?}",
            fonts.major_latin,
            fonts.minor_latin
        );
        Ok(fonts)
    }

    fn capture(&mut self, slot: Option<Slot>, e: &quick_xml::events::BytesStart) {
        let typeface = xml::attr(e, b"typeface").filter(|t| !t.is_empty());
        match slot {
            Some(Slot::Major) => self.major_latin = typeface,
            Some(Slot::Minor) => self.minor_latin = typeface,
            None => {}
        }
    }

    /// Resolve a theme font reference such as `majorHAnsi` or `minorAscii`
    pub fn resolve(&self, theme_ref: &str) -> Option<&str> {
        if theme_ref.contains("major") {
            self.major_latin.as_deref()
        } else if theme_ref.contains("minor") {
            self.minor_latin.as_deref()
        } else {
            None
        }
    }

    /// Pick a font name: an explicit typeface wins over a theme reference
    pub fn font_name(&self, ascii: Option<String>, ascii_theme: Option<&str>) -> Option<String> {
        ascii.or_else(|| ascii_theme.and_then(|t| self.resolve(t)).map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const THEME: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<a:theme xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" name="Office Theme">
  <a:themeElements>
    <a:fontScheme name="Office">
      <a:majorFont>
        <a:latin typeface="Calibri Light" panose="020F0302020204030204"/>
        <a:ea typeface=""/>
        <a:font script="Jpan" typeface="Yu Gothic Light"/>
      </a:majorFont>
      <a:minorFont>
        <a:latin typeface="Calibri" panose="020F0502020204030204"/>
        <a:ea typeface=""/>
      </a:minorFont>
    </a:fontScheme>
  </a:themeElements>
</a:theme>"#;

    #[test]
    fn test_parse_font_scheme() {
        let fonts = ThemeFonts::parse(THEME.as_bytes()).unwrap();
        assert_eq!(fonts.major_latin.as_deref(), Some("Calibri Light"));
        assert_eq!(fonts.minor_latin.as_deref(), Some("Calibri"));
    }

    #[test]
    fn test_resolve_references() {
        let fonts = ThemeFonts::parse(THEME.as_bytes()).unwrap();
        assert_eq!(fonts.resolve("majorHAnsi"), Some("Calibri Light"));
        assert_eq!(fonts.resolve("minorAscii"), Some("Calibri"));
        assert_eq!(fonts.resolve("other"), None);
    }

    #[test]
    fn test_explicit_font_wins() {
        let fonts = ThemeFonts::parse(THEME.as_bytes()).unwrap();
        assert_eq!(
            fonts.font_name(Some("Arial".to_string()), Some("minorHAnsi")),
            Some("Arial".to_string())
        );
        assert_eq!(
            fonts.font_name(None, Some("minorHAnsi")),
            Some("Calibri".to_string())
        );
        assert_eq!(fonts.font_name(None, None), None);
    }

    #[test]
    fn test_theme_without_scheme() {
        let fonts = ThemeFonts::parse(b"<a:theme xmlns:a=\"urn:a\"/>").unwrap();
        assert_eq!(fonts, ThemeFonts::default());
    }
}
