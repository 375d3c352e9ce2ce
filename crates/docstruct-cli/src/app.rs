//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;
use rayon::prelude::*;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use docstruct_core::diagnostics::codes;
use docstruct_core::{Diagnostic, Diagnostics, Document, PunctuationSegmenter};
use docstruct_ooxml::archive::{APP_PART, DOCUMENT_PART, NUMBERING_PART, STYLES_PART};
use docstruct_ooxml::{extract, extract_path, ExtractOptions, OoxmlArchive};

use crate::settings::{OutputFormat, Settings};

#[derive(Parser)]
#[command(name = "docstruct")]
#[command(author, version, about = "Structural paragraph extraction for DOCX files", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the paragraph structure of one or more DOCX files
    Extract {
        /// Input files or glob patterns
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory (stdout for a single input when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format, overrides the config file
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print a structural summary of a DOCX file
    Inspect {
        /// Input DOCX file
        input: PathBuf,

        /// Configuration file path
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Run the CLI application
///
/// Parses arguments, installs the log subscriber and dispatches to the
/// selected command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract {
            inputs,
            output,
            format,
            config,
        } => {
            let settings = Settings::load(config.as_deref())?;
            let format = format.unwrap_or(settings.output.format);
            extract_command(&inputs, output.as_deref(), format, &settings)?;
        }
        Commands::Inspect { input, config } => {
            let settings = Settings::load(config.as_deref())?;
            let inspection = inspect_command(&input, &settings)?;
            print!("{}", inspection);
        }
    }

    Ok(())
}

/// Install the stderr subscriber; library `log` records are forwarded to it
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Expand file names and glob patterns into document paths
pub fn expand_inputs(patterns: &[String]) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if Path::new(pattern).is_file() {
            paths.push(PathBuf::from(pattern));
            continue;
        }

        let before = paths.len();
        for entry in glob(pattern).with_context(|| format!("Invalid pattern: {}", pattern))? {
            let path = entry.with_context(|| format!("Failed to read match of {}", pattern))?;
            if path.is_file() {
                paths.push(path);
            }
        }
        if paths.len() == before {
            warn!("No documents match {}", pattern);
        }
    }

    if paths.is_empty() {
        anyhow::bail!("No input documents found");
    }
    Ok(paths)
}

/// Outcome of one extract run
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Files written, or the single input when printing to stdout
    pub written: Vec<PathBuf>,
    /// Documents that could not be extracted (E001) or written (E002)
    pub failed: Vec<Diagnostic>,
    /// Warnings across all successful documents
    pub warnings: usize,
}

/// Render a document in the requested format
pub fn render(doc: &Document, format: OutputFormat) -> Result<String> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(doc)?,
        OutputFormat::Rows => serde_json::to_string_pretty(&doc.rows())?,
        OutputFormat::Lines => {
            let mut lines = doc.sentence_lines(&PunctuationSegmenter).join("\n");
            lines.push('\n');
            lines
        }
    };
    Ok(rendered)
}

/// Extract and render one document with its own diagnostics
fn process(
    path: &Path,
    options: &ExtractOptions,
    format: OutputFormat,
) -> Result<(String, Diagnostics)> {
    let mut diagnostics = Diagnostics::new();
    let doc = extract_path(path, options, &mut diagnostics)
        .with_context(|| format!("Failed to extract {}", path.display()))?;
    debug!(
        "{}: {} paragraphs, {} chapters",
        path.display(),
        doc.len(),
        doc.chapter_starts().count()
    );
    Ok((render(&doc, format)?, diagnostics))
}

/// Execute the extract command
///
/// Documents are extracted in parallel. A failed document is logged and
/// recorded in the report; the command only fails when every document did.
pub fn extract_command(
    inputs: &[String],
    output_dir: Option<&Path>,
    format: OutputFormat,
    settings: &Settings,
) -> Result<BatchReport> {
    info!("docstruct v{}", docstruct_core::VERSION);
    let paths = expand_inputs(inputs)?;
    if output_dir.is_none() && paths.len() > 1 {
        anyhow::bail!(
            "{} documents matched; use --output to choose a directory",
            paths.len()
        );
    }
    if let Some(dir) = output_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;
    }

    let options = settings.extract_options();
    let results: Vec<(&PathBuf, Result<(String, Diagnostics)>)> = paths
        .par_iter()
        .map(|path| (path, process(path, &options, format)))
        .collect();

    let mut report = BatchReport::default();
    for (path, result) in results {
        match result {
            Ok((rendered, diagnostics)) => {
                for diagnostic in diagnostics.iter() {
                    warn!("{}: {}", path.display(), diagnostic.message);
                }
                report.warnings += diagnostics.warning_count();

                match output_dir {
                    Some(dir) => {
                        let target = dir.join(output_name(path, format));
                        match fs::write(&target, rendered) {
                            Ok(()) => {
                                info!("Created {}", target.display());
                                report.written.push(target);
                            }
                            Err(err) => {
                                error!("Failed to write {}: {}", target.display(), err);
                                report.failed.push(
                                    Diagnostic::error(format!(
                                        "Failed to write {}: {}",
                                        target.display(),
                                        err
                                    ))
                                    .with_code(codes::OUTPUT_FAILED)
                                    .with_file(path.display().to_string()),
                                );
                            }
                        }
                    }
                    None => {
                        print!("{}", rendered);
                        report.written.push(path.clone());
                    }
                }
            }
            Err(err) => {
                error!("{:#}", err);
                report.failed.push(
                    Diagnostic::fatal(format!("{:#}", err))
                        .with_code(codes::DOCUMENT_FAILED)
                        .with_file(path.display().to_string()),
                );
            }
        }
    }

    info!(
        "{} extracted, {} failed, {} warnings",
        report.written.len(),
        report.failed.len(),
        report.warnings
    );
    if report.written.is_empty() {
        anyhow::bail!("All {} documents failed", report.failed.len());
    }
    Ok(report)
}

fn output_name(path: &Path, format: OutputFormat) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    format!("{}.{}", stem, format.extension())
}

/// Structural summary of one document
#[derive(Debug, Clone, PartialEq)]
pub struct Inspection {
    pub path: PathBuf,
    /// Known parts and whether the package has them
    pub parts: Vec<(&'static str, bool)>,
    pub application: Option<String>,
    pub paragraphs: usize,
    pub chapters: usize,
    pub sections: usize,
    pub warnings: usize,
}

impl fmt::Display for Inspection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.path.display())?;
        for (part, present) in &self.parts {
            writeln!(f, "  {:<24} {}", part, if *present { "yes" } else { "no" })?;
        }
        writeln!(
            f,
            "  Application: {}",
            self.application.as_deref().unwrap_or("unknown")
        )?;
        writeln!(f, "  Paragraphs:  {}", self.paragraphs)?;
        writeln!(f, "  Chapters:    {}", self.chapters)?;
        writeln!(f, "  Sections:    {}", self.sections)?;
        writeln!(f, "  Warnings:    {}", self.warnings)
    }
}

/// Execute the inspect command
pub fn inspect_command(input: &Path, settings: &Settings) -> Result<Inspection> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let archive = OoxmlArchive::open(input)
        .with_context(|| format!("Failed to open DOCX file: {}", input.display()))?;
    let parts = [DOCUMENT_PART, STYLES_PART, NUMBERING_PART, APP_PART]
        .into_iter()
        .map(|part| (part, archive.contains(part)))
        .chain(std::iter::once(("theme", archive.theme_xml().is_some())))
        .collect();

    let mut diagnostics = Diagnostics::new();
    let doc = extract(&archive, &settings.extract_options(), &mut diagnostics)
        .with_context(|| format!("Failed to extract document: {}", input.display()))?;

    Ok(Inspection {
        path: input.to_path_buf(),
        parts,
        application: doc.properties().application.clone(),
        paragraphs: doc.len(),
        chapters: doc.chapter_starts().count(),
        sections: doc.sections().len(),
        warnings: diagnostics.warning_count(),
    })
}
