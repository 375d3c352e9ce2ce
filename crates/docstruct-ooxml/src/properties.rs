//! Extended document properties (docProps/app.xml)

use docstruct_core::DocumentProperties;
use quick_xml::events::Event;

use crate::error::Result;
use crate::xml;

#[derive(Clone, Copy)]
enum Field {
    Application,
    AppVersion,
}

/// Read the creator application and its version
pub fn parse(xml: &[u8]) -> Result<DocumentProperties> {
    let mut reader = xml::reader(xml, true);
    let mut buf = Vec::new();
    let mut properties = DocumentProperties::default();
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                field = match e.local_name().as_ref() {
                    b"Application" => Some(Field::Application),
                    b"AppVersion" => Some(Field::AppVersion),
                    _ => None,
                };
            }
            Event::Text(ref e) => {
                if let Some(field) = field {
                    let value = e
                        .unescape()
                        .map_err(quick_xml::Error::from)?
                        .trim()
                        .to_string();
                    match field {
                        Field::Application => properties.application = Some(value),
                        Field::AppVersion => properties.app_version = Some(value),
                    }
                }
            }
            Event::End(_) => field = None,
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(properties)
}
