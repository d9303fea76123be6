//! Substitution engine
//!
//! Replaces `{{KEY}}` placeholders in a DOCX document with caller-supplied
//! values, including placeholders whose characters an editor has split across
//! several formatting runs.
//!
//! ## Guarantees
//!
//! - **Text only**: run styling is never touched; the replacement inherits the
//!   style of the run holding the opening `{{`
//! - **Shape preserved**: paragraph, table, row, cell and run counts never change
//! - **Unknown tokens stay literal**: a placeholder with no value is left as-is
//! - **All or nothing**: either the whole document is rewritten and serialized
//!   or an error is returned

mod scan;
mod walk;

pub use scan::substitute_runs;
pub use walk::paragraph_order;

use crate::docx::Document;
use crate::error::{DocfillError, Result};
use crate::files::encode_base64;
use crate::mapping::{Metadata, PlaceholderMapping};
use std::fmt;
use std::str::FromStr;

/// Requested encoding of the rewritten document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Raw DOCX bytes
    Bytes,
    /// Standard padded base64 text
    TextBase64,
}

impl FromStr for OutputFormat {
    type Err = DocfillError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "bytes" => Ok(OutputFormat::Bytes),
            "text-base64" => Ok(OutputFormat::TextBase64),
            other => Err(DocfillError::validation(format!(
                "unsupported output format: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Bytes => f.write_str("bytes"),
            OutputFormat::TextBase64 => f.write_str("text-base64"),
        }
    }
}

/// Rewritten document in the requested encoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Bytes(Vec<u8>),
    Text(String),
}

impl Output {
    /// Bytes to write out: the DOCX itself, or the UTF-8 of the base64 text
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Output::Bytes(bytes) => bytes,
            Output::Text(text) => text.as_bytes(),
        }
    }
}

/// Counters collected while rewriting a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionReport {
    pub paragraphs_visited: usize,
    pub placeholders_replaced: usize,
    pub runs_rewritten: usize,
}

/// Substitute `metadata` into a DOCX document
///
/// # Errors
///
/// - `Validation` when the metadata has no non-null value or `output_format`
///   is neither `"bytes"` nor `"text-base64"`
/// - `Processing` when the document cannot be parsed or serialized
///
/// # Examples
///
/// ```no_run
/// use docfill_core::{Output, parse_metadata, substitute};
///
/// let template = std::fs::read("demanda.docx").unwrap();
/// let metadata = parse_metadata(r#"{"nombre": "Juan Pérez"}"#).unwrap();
/// match substitute(&template, &metadata, "bytes").unwrap() {
///     Output::Bytes(docx) => std::fs::write("demanda-llena.docx", docx).unwrap(),
///     Output::Text(_) => unreachable!(),
/// }
/// ```
pub fn substitute(document_bytes: &[u8], metadata: &Metadata, output_format: &str) -> Result<Output> {
    let mapping = PlaceholderMapping::build(metadata)?;
    let format: OutputFormat = output_format.parse()?;

    let span = tracing::debug_span!("substitute", placeholders = mapping.len(), %format);
    let _enter = span.enter();

    let mut document = Document::load(document_bytes)
        .map_err(|e| DocfillError::Processing(format!("failed to parse document: {}", e)))?;

    let report = substitute_document(&mut document, &mapping);
    tracing::debug!(
        paragraphs = report.paragraphs_visited,
        placeholders = report.placeholders_replaced,
        runs = report.runs_rewritten,
        "substitution complete"
    );

    let bytes = document
        .save()
        .map_err(|e| DocfillError::Processing(format!("failed to serialize document: {}", e)))?;

    Ok(match format {
        OutputFormat::Bytes => Output::Bytes(bytes),
        OutputFormat::TextBase64 => Output::Text(encode_base64(&bytes)),
    })
}

/// Rewrite every visited paragraph of a loaded document in place
pub fn substitute_document(document: &mut Document, mapping: &PlaceholderMapping) -> SubstitutionReport {
    let order = paragraph_order(document);
    let mut report = SubstitutionReport {
        paragraphs_visited: order.len(),
        ..Default::default()
    };

    for id in order {
        let runs = document.paragraph_mut(id).runs_mut();
        report.placeholders_replaced += substitute_runs(runs, mapping);
        report.runs_rewritten += runs.iter().filter(|run| run.is_modified()).count();
    }

    report
}

#[cfg(test)]
mod tests;
