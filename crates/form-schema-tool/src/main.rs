//! Command-line front end for form-schema.
//!
//! Reads a stored form record (optionally gzip-compressed) and prints the
//! preview document, the submission payload, validation findings, or the
//! result of an export/import round trip.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use form_schema::codec::Importer;
use form_schema::{
    validate_tree, BuilderConfig, ConfigError, FormBuilder, FormRecord, SubmitError, WireElement,
};
use serde_json::Value;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Inspect and convert stored form records.
#[derive(Debug, Parser)]
#[command(name = "form-schema", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Builder configuration file (TOML)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
enum Command {
    /// Print the document the builder would persist
    Preview { record: PathBuf },
    /// Print the submission payload
    Submit { record: PathBuf },
    /// Report import diagnostics and validation issues
    Check { record: PathBuf },
    /// Export, re-import and compare the form tree
    Roundtrip { record: PathBuf },
}

impl Command {
    /// The record file (`.json` or `.json.gz`) the command reads.
    fn record(&self) -> &Path {
        match self {
            Command::Preview { record }
            | Command::Submit { record }
            | Command::Check { record }
            | Command::Roundtrip { record } => record,
        }
    }
}

#[derive(Debug, Error)]
enum ToolError {
    #[error("{0}")]
    Usage(#[from] clap::Error),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid record JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot submit: {0}")]
    Submit(#[from] SubmitError),
}

impl ToolError {
    fn exit_code(&self) -> u8 {
        match self {
            // --help and --version arrive as clap errors too.
            ToolError::Usage(e) if !e.use_stderr() => 0,
            ToolError::Usage(_) => 1,
            ToolError::Io { .. } | ToolError::Json(_) | ToolError::Config(_) => 2,
            ToolError::Submit(_) => 3,
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,form_schema=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match Cli::try_parse().map_err(ToolError::from).and_then(|cli| run(&cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match &e {
                ToolError::Usage(usage) => {
                    let _ = usage.print();
                }
                other => eprintln!("error: {other}"),
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(args: &Cli) -> Result<(), ToolError> {
    let config = match &args.config {
        Some(path) => BuilderConfig::load(path)?,
        None => BuilderConfig::default(),
    };
    let record: FormRecord = serde_json::from_str(&read_text(args.command.record())?)?;
    let builder = FormBuilder::open(&record, config);

    match args.command {
        Command::Preview { .. } => {
            let document = serde_json::to_value(WireElement::Div(builder.preview()))?;
            print_json(&document, args.pretty)?;
        }
        Command::Submit { .. } => {
            let payload = builder.submit()?.to_payload()?;
            print_json(&payload, args.pretty)?;
        }
        Command::Check { .. } => check(&builder),
        Command::Roundtrip { .. } => roundtrip(&builder, &record)?,
    }
    Ok(())
}

fn check(builder: &FormBuilder) {
    let diagnostics = builder.import_diagnostics();
    let issues = validate_tree(builder.tree());
    for diagnostic in diagnostics {
        println!("import: {diagnostic}");
    }
    for issue in &issues {
        println!("validate: {issue}");
    }
    println!(
        "{} fields, {} import diagnostics, {} validation issues",
        builder.tree().field_count(),
        diagnostics.len(),
        issues.len()
    );
}

fn roundtrip(builder: &FormBuilder, record: &FormRecord) -> Result<(), ToolError> {
    let exported = serde_json::to_value(WireElement::Div(builder.preview()))?;
    let mut ids = builder.config().id_generator();
    let reimported = Importer::new(ids.as_mut())
        .with_max_depth(builder.config().max_import_depth)
        .import_document(&exported);

    let equivalent = reimported.is_clean() && reimported.tree.same_content(builder.tree());
    println!(
        "record {}: {} fields, round trip {}",
        record.id.as_ref().map_or_else(|| "(new)".to_string(), Value::to_string),
        builder.tree().field_count(),
        if equivalent { "preserved the form" } else { "changed the form" }
    );
    Ok(())
}

/// Reads a file as UTF-8, decompressing it first if the name ends in `.gz`.
fn read_text(path: &Path) -> Result<String, ToolError> {
    let io_error = |source: std::io::Error| ToolError::Io {
        path: path.to_path_buf(),
        source,
    };
    let bytes = fs::read(path).map_err(io_error)?;
    if path.extension().is_some_and(|ext| ext == "gz") {
        let mut decoder = flate2::read::GzDecoder::new(bytes.as_slice());
        let mut text = String::new();
        decoder.read_to_string(&mut text).map_err(io_error)?;
        tracing::debug!("decompressed {} bytes from {}", bytes.len(), path.display());
        Ok(text)
    } else {
        String::from_utf8(bytes)
            .map_err(|e| io_error(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
    }
}

fn print_json(value: &Value, pretty: bool) -> Result<(), ToolError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{text}");
    Ok(())
}
