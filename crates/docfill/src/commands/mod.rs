//! CLI command implementations

pub mod convert;
pub mod doctor;
pub mod fill;
pub mod pdf;
pub mod template;

use crate::cli::MetadataArgs;
use anyhow::{Context as _, Result, bail};
use docfill_core::{Metadata, parse_metadata};
use std::path::{Path, PathBuf};

/// Parse the metadata object from `--metadata` or `--metadata-json`
pub(crate) fn load_metadata(args: &MetadataArgs) -> Result<Metadata> {
    let json = match (&args.metadata, &args.metadata_json) {
        (Some(path), None) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read metadata {}", path.display()))?,
        (None, Some(json)) => json.clone(),
        _ => bail!("exactly one of --metadata or --metadata-json is required"),
    };
    Ok(parse_metadata(&json)?)
}

/// `<input>.pdf`, or `document.pdf` when reading stdin
pub(crate) fn default_pdf_path(input: &Path) -> PathBuf {
    if input == Path::new("-") {
        PathBuf::from("document.pdf")
    } else {
        input.with_extension("pdf")
    }
}

/// Run a converter future to completion on a fresh runtime
pub(crate) fn block_on<F: std::future::Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pdf_path() {
        assert_eq!(
            default_pdf_path(Path::new("out/demanda.docx")),
            PathBuf::from("out/demanda.pdf")
        );
        assert_eq!(default_pdf_path(Path::new("-")), PathBuf::from("document.pdf"));
    }

    #[test]
    fn test_load_inline_metadata() {
        let args = MetadataArgs {
            metadata: None,
            metadata_json: Some(r#"{"nombre": "Ana"}"#.to_string()),
        };
        let metadata = load_metadata(&args).unwrap();
        assert_eq!(metadata.len(), 1);
    }
}
