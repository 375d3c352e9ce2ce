//! Configuration settings
//!
//! Loaded from `docstruct.toml`. Every section is optional and falls back to
//! the extraction defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use docstruct_core::ChapterRules;
use docstruct_ooxml::{CounterScope, ExtractOptions};
use serde::{Deserialize, Serialize};

/// Config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "docstruct.toml";

/// What the extract command writes per document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// The full document as pretty JSON
    #[default]
    Json,
    /// One sentence per line
    Lines,
    /// The flat paragraph table as JSON
    Rows,
}

impl OutputFormat {
    /// File extension for written output
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Lines => "txt",
            OutputFormat::Rows => "rows.json",
        }
    }
}

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub numbering: NumberingSettings,
    pub chapters: ChapterRules,
    pub output: OutputSettings,
}

/// List numbering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NumberingSettings {
    /// `instance` or `abstract_definition`
    pub counter_scope: CounterScope,
    /// Label for bullet levels
    pub bullet_marker: String,
}

impl Default for NumberingSettings {
    fn default() -> Self {
        let defaults = ExtractOptions::default();
        Self {
            counter_scope: defaults.counter_scope,
            bullet_marker: defaults.bullet_marker,
        }
    }
}

/// Output settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputSettings {
    pub format: OutputFormat,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Load settings from `path`, or from `docstruct.toml` when present
    ///
    /// An explicitly named file must exist; the default one is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Path::new(DEFAULT_CONFIG_FILE),
            None => return Ok(Self::default()),
        };

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let settings = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid config: {}", path.display()))?;
        tracing::debug!("Loaded config from {}", path.display());
        Ok(settings)
    }

    /// Extraction options for these settings
    pub fn extract_options(&self) -> ExtractOptions {
        ExtractOptions::default()
            .with_counter_scope(self.numbering.counter_scope)
            .with_bullet_marker(self.numbering.bullet_marker.clone())
            .with_chapter_rules(self.chapters.clone())
    }
}
