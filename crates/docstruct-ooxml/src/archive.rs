//! Archive handling for DOCX files
//!
//! DOCX files are ZIP archives containing XML parts. The whole package is
//! read into memory once, before extraction starts.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use zip::read::ZipArchive;

use crate::error::{OoxmlError, Result};

/// Main document part
pub const DOCUMENT_PART: &str = "word/document.xml";
/// Style definitions part
pub const STYLES_PART: &str = "word/styles.xml";
/// Numbering definitions part
pub const NUMBERING_PART: &str = "word/numbering.xml";
/// Preferred theme part
pub const THEME_PART: &str = "word/theme/theme1.xml";
/// Extended properties part
pub const APP_PART: &str = "docProps/app.xml";

/// Represents an unpacked OOXML package
#[derive(Debug, Default)]
pub struct OoxmlArchive {
    /// All files in the archive, keyed by path
    files: HashMap<String, Vec<u8>>,
}

impl OoxmlArchive {
    /// Open and unpack a DOCX file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Create from any reader that implements Read + Seek
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)?;
        let mut files = HashMap::new();

        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            let name = file.name().to_string();

            // Skip directories
            if name.ends_with('/') {
                continue;
            }

            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            files.insert(name, contents);
        }

        log::debug!("Unpacked {} parts", files.len());
        Ok(Self { files })
    }

    /// Build a package from in-memory parts
    pub fn from_parts<I, K>(parts: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            files: parts.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Get a file's contents by path
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path).map(|v| v.as_slice())
    }

    /// Get the main document content (word/document.xml)
    pub fn document_xml(&self) -> Result<&[u8]> {
        self.get(DOCUMENT_PART)
            .ok_or_else(|| OoxmlError::MissingFile(DOCUMENT_PART.to_string()))
    }

    /// Get the styles definition (word/styles.xml)
    pub fn styles_xml(&self) -> Option<&[u8]> {
        self.get(STYLES_PART)
    }

    /// Get the numbering definitions (word/numbering.xml)
    pub fn numbering_xml(&self) -> Option<&[u8]> {
        self.get(NUMBERING_PART)
    }

    /// Get the theme part
    ///
    /// `theme1.xml` is preferred; otherwise the first theme part by name.
    pub fn theme_xml(&self) -> Option<&[u8]> {
        self.get(THEME_PART).or_else(|| {
            let mut themes: Vec<&str> = self
                .file_list()
                .filter(|k| k.starts_with("word/theme/") && k.ends_with(".xml"))
                .collect();
            themes.sort();
            themes.first().and_then(|k| self.get(k))
        })
    }

    /// Get the extended properties (docProps/app.xml)
    pub fn app_xml(&self) -> Option<&[u8]> {
        self.get(APP_PART)
    }

    /// Check if a file exists in the archive
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// List all files in the archive
    pub fn file_list(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DocxBuilder;
    use std::io::Cursor;

    #[test]
    fn test_from_parts_lookup() {
        let archive = OoxmlArchive::from_parts(vec![(
            DOCUMENT_PART,
            b"<w:document/>".to_vec(),
        )]);

        assert!(archive.contains(DOCUMENT_PART));
        assert_eq!(
            archive.get(DOCUMENT_PART),
            Some(b"<w:document/>".as_slice())
        );
        assert!(archive.styles_xml().is_none());
        assert!(archive.numbering_xml().is_none());
    }

    #[test]
    fn test_missing_document_part() {
        let archive = OoxmlArchive::default();
        let err = archive.document_xml().unwrap_err();
        assert!(matches!(err, OoxmlError::MissingFile(ref p) if p == DOCUMENT_PART));
    }

    #[test]
    fn test_theme_fallback_to_other_part() {
        let archive = OoxmlArchive::from_parts(vec![(
            "word/theme/theme2.xml",
            b"<a:theme/>".to_vec(),
        )]);
        assert_eq!(archive.theme_xml(), Some(&b"<a:theme/>"[..]));
    }

    #[test]
    fn test_read_zip_package() {
        let bytes = DocxBuilder::new()
            .body(r#"<w:p><w:r><w:t>Hello</w:t></w:r></w:p>"#)
            .build()
            .unwrap();

        let archive = OoxmlArchive::from_reader(Cursor::new(bytes)).unwrap();
        assert!(archive.contains("[Content_Types].xml"));
        assert!(archive.document_xml().is_ok());
        assert!(archive.file_list().all(|name| !name.ends_with('/')));
    }
}
