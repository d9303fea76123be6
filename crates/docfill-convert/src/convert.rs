use docfill_core::config::ConverterConfig;
use docfill_core::{DocfillError, Result};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::Semaphore;

const INPUT_FILE_NAME: &str = "input.docx";
const OUTPUT_FILE_NAME: &str = "input.pdf";
const PROFILE_DIR_NAME: &str = "lo_profile";
const PDF_MAGIC: &[u8] = b"%PDF-";
const MAX_MESSAGE_LEN: usize = 700;

/// Options for [`PdfConverter`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterOptions {
    pub binary: PathBuf,
    pub timeout: Duration,
    /// Conversions allowed to run at once; values below 1 count as 1
    pub max_concurrency: usize,
}

impl ConverterOptions {
    /// Defaults: 60 second timeout, 2 concurrent conversions
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self::from_config(binary, &ConverterConfig::default())
    }

    pub fn from_config(binary: impl Into<PathBuf>, config: &ConverterConfig) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(config.timeout_secs),
            max_concurrency: config.max_concurrency,
        }
    }
}

/// Headless LibreOffice DOCX to PDF converter
///
/// Each conversion runs in its own temporary directory with a private user
/// profile, so concurrent conversions do not contend on the profile lock.
#[derive(Debug, Clone)]
pub struct PdfConverter {
    options: ConverterOptions,
    permits: Arc<Semaphore>,
}

impl PdfConverter {
    pub fn new(mut options: ConverterOptions) -> Self {
        options.max_concurrency = options.max_concurrency.max(1);
        let permits = Arc::new(Semaphore::new(options.max_concurrency));
        Self { options, permits }
    }

    pub fn options(&self) -> &ConverterOptions {
        &self.options
    }

    /// Convert DOCX bytes to PDF bytes
    pub async fn convert(&self, docx: &[u8]) -> Result<Vec<u8>> {
        if docx.is_empty() {
            return Err(DocfillError::validation("cannot convert an empty document"));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|e| DocfillError::ConversionFailed(e.to_string()))?;

        let workdir = tempfile::Builder::new()
            .prefix("conv_")
            .tempdir()
            .map_err(system_error)?;
        let started = Instant::now();
        let pdf = self.run(workdir.path(), docx).await?;

        tracing::info!(
            docx_bytes = docx.len(),
            pdf_bytes = pdf.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "converted document to PDF"
        );
        Ok(pdf)
    }

    async fn run(&self, workdir: &Path, docx: &[u8]) -> Result<Vec<u8>> {
        let input = workdir.join(INPUT_FILE_NAME);
        let profile = workdir.join(PROFILE_DIR_NAME);
        tokio::fs::write(&input, docx).await.map_err(system_error)?;
        tokio::fs::create_dir_all(&profile)
            .await
            .map_err(system_error)?;

        let mut command = Command::new(&self.options.binary);
        command
            .arg("--headless")
            .arg("--nologo")
            .arg("--nolockcheck")
            .arg(format!("-env:UserInstallation=file://{}", profile.display()))
            .arg("--convert-to")
            .arg("pdf:writer_pdf_Export")
            .arg("--outdir")
            .arg(workdir)
            .arg(&input)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(binary = %self.options.binary.display(), "running soffice");

        let output = match tokio::time::timeout(self.options.timeout, command.output()).await {
            Ok(output) => output.map_err(system_error)?,
            Err(_) => {
                tracing::warn!(timeout = ?self.options.timeout, "soffice timed out");
                return Err(DocfillError::ConversionTimeout {
                    secs: self.options.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = |fallback: &str| {
            let stderr = stderr.trim();
            let stdout = stdout.trim();
            let message = if !stderr.is_empty() {
                stderr
            } else if !stdout.is_empty() {
                stdout
            } else {
                fallback
            };
            compact_message(message, MAX_MESSAGE_LEN)
        };

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            return Err(DocfillError::ConversionFailed(format!(
                "conversion failed (rc={}): {}",
                code,
                diagnostics("unknown LibreOffice failure")
            )));
        }

        let pdf_path = workdir.join(OUTPUT_FILE_NAME);
        if !pdf_path.exists() {
            return Err(DocfillError::ConversionFailed(format!(
                "conversion incomplete: {}",
                diagnostics("no PDF was produced")
            )));
        }

        let pdf = tokio::fs::read(&pdf_path).await.map_err(system_error)?;
        if pdf.is_empty() {
            return Err(DocfillError::ConversionFailed(
                "generated PDF is empty".to_string(),
            ));
        }
        if !pdf.starts_with(PDF_MAGIC) {
            return Err(DocfillError::ConversionFailed(
                "generated file is not a valid PDF".to_string(),
            ));
        }
        Ok(pdf)
    }
}

fn system_error(e: std::io::Error) -> DocfillError {
    DocfillError::ConversionFailed(format!("system error while converting: {}", e))
}

/// Collapse whitespace runs to one space and cap the length at `max_len`
/// characters, ending in `...` when cut
pub fn compact_message(message: &str, max_len: usize) -> String {
    let compact = message.split_whitespace().collect::<Vec<_>>().join(" ");
    if compact.chars().count() <= max_len {
        return compact;
    }
    let mut cut: String = compact.chars().take(max_len.saturating_sub(3)).collect();
    cut.push_str("...");
    cut
}
