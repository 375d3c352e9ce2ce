//! docstruct CLI - Command-line interface library
//!
//! This library provides the CLI functionality for docstruct:
//! - Extract: paragraph structure of DOCX files as JSON, rows or sentence lines
//! - Inspect: a short structural summary of one DOCX file
//!
//! # Library Usage
//!
//! ```ignore
//! use docstruct_cli::{extract_command, OutputFormat, Settings};
//!
//! let settings = Settings::load(None)?;
//! extract_command(&["docs/*.docx".to_string()], Some(out.as_path()), OutputFormat::Rows, &settings)?;
//! ```
//!
//! # Binary Usage
//!
//! ```bash
//! # Extract every document in a folder
//! docstruct extract 'docs/*.docx' --output result/ --format rows
//!
//! # Print one document's sentences to stdout
//! docstruct extract report.docx --format lines
//!
//! # Summarize a document
//! docstruct inspect report.docx
//! ```

pub mod app;
pub mod settings;

// Re-export main entry point and types
pub use app::{
    expand_inputs, extract_command, inspect_command, render, run_cli, BatchReport, Inspection,
};
pub use settings::{OutputFormat, Settings, DEFAULT_CONFIG_FILE};
