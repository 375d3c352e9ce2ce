//! Small helpers shared by the part parsers

use quick_xml::events::BytesStart;
use quick_xml::Reader;

/// Reader over a part, with text trimming configured per part
pub(crate) fn reader(xml: &[u8], trim_text: bool) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(trim_text);
    reader
}

/// Attribute value by local name (prefix ignored), unescaped
pub(crate) fn attr(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// `w:val` of an element
pub(crate) fn val(e: &BytesStart) -> Option<String> {
    attr(e, b"val")
}

/// Numeric `w:val` of an element
pub(crate) fn val_parsed<T: std::str::FromStr>(e: &BytesStart) -> Option<T> {
    val(e).and_then(|v| v.trim().parse().ok())
}

/// Value of an on/off property such as `<w:b/>` or `<w:b w:val="0"/>`
pub(crate) fn toggle(e: &BytesStart) -> bool {
    !matches!(
        val(e).as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}
