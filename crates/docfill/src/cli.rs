//! CLI command structure using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "docfill")]
#[command(version, about = "Fill {{KEY}} placeholders in DOCX templates", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ./docfill.toml when present)
    #[arg(long, global = true, value_name = "PATH", env = "DOCFILL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replace placeholders in a DOCX document
    Fill(FillArgs),

    /// Replace placeholders, then convert the result to PDF
    Pdf(PdfArgs),

    /// Convert a DOCX document to PDF
    Convert {
        /// DOCX file, or - for stdin
        input: PathBuf,

        /// Output file (default: INPUT with a .pdf extension)
        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },

    /// Template catalog management
    #[command(subcommand)]
    Template(TemplateCommands),

    /// Check environment health
    Doctor {
        #[arg(long)]
        json: bool,
    },
}

/// Where the replacement values come from
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct MetadataArgs {
    /// JSON object file with the replacement values
    #[arg(long, value_name = "FILE")]
    pub metadata: Option<PathBuf>,

    /// Inline JSON object with the replacement values
    #[arg(long, value_name = "JSON")]
    pub metadata_json: Option<String>,
}

#[derive(Args, Debug)]
pub struct FillArgs {
    /// DOCX file, or - for stdin
    pub input: PathBuf,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// Output format: bytes or text-base64
    #[arg(long, default_value = "bytes")]
    pub format: String,

    /// INPUT holds base64 text instead of raw DOCX bytes
    #[arg(long)]
    pub input_base64: bool,

    /// Output file (required for bytes; text goes to stdout otherwise)
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct PdfArgs {
    /// DOCX file, or - for stdin
    pub input: PathBuf,

    #[command(flatten)]
    pub metadata: MetadataArgs,

    /// INPUT holds base64 text instead of raw DOCX bytes
    #[arg(long)]
    pub input_base64: bool,

    /// Emit the PDF as base64 text
    #[arg(long)]
    pub base64: bool,

    /// Output file (default: INPUT with a .pdf extension, or stdout with --base64)
    #[arg(short, long, value_name = "OUT")]
    pub output: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Add a DOCX file to the catalog
    Add {
        file: PathBuf,

        #[arg(long)]
        name: String,

        /// Document kind (e.g. "demanda")
        #[arg(long)]
        kind: String,

        #[arg(long)]
        court: String,

        #[arg(long)]
        description: Option<String>,

        #[arg(long, default_value = "local")]
        uploaded_by_id: String,

        #[arg(long, default_value = "docfill")]
        uploaded_by_name: String,

        #[arg(long)]
        json: bool,
    },

    /// List catalog templates, newest first
    List {
        #[arg(long)]
        court: Option<String>,

        #[arg(long)]
        kind: Option<String>,

        /// Substring of the name or description
        #[arg(long)]
        text: Option<String>,

        /// Uploaded on or after (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        from: Option<String>,

        /// Uploaded on or before (YYYY-MM-DD or RFC 3339)
        #[arg(long)]
        to: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Show one template
    Show {
        id: String,

        #[arg(long)]
        json: bool,
    },

    /// Remove a template and its stored file
    Remove { id: String },

    /// Fill a stored template
    Fill {
        id: String,

        #[command(flatten)]
        metadata: MetadataArgs,

        /// Output format: bytes or text-base64
        #[arg(long, default_value = "bytes")]
        format: String,

        #[arg(short, long, value_name = "OUT")]
        output: Option<PathBuf>,
    },
}
