//! DOCX to PDF conversion through LibreOffice for docfill.
//!
//! This crate resolves a `soffice` binary and runs it headless to turn DOCX
//! bytes into PDF bytes.
//!
//! # Architecture
//!
//! - [`info`]: metadata about a resolved binary
//! - [`resolve`]: binary lookup (config, `DOCFILL_SOFFICE`, PATH)
//! - [`convert`]: the async converter with timeout and concurrency limit
//!
//! # Binary Resolution Flow
//!
//! ```text
//! resolve_soffice(explicit)
//!     ↓
//! 1. Explicit path from docfill.toml
//!     ↓ (not given)
//! 2. DOCFILL_SOFFICE
//!     ↓ (not set)
//! 3. `soffice` on PATH, then `libreoffice`
//!     ↓ (not found)
//! 4. ConverterNotFound with searched locations
//! ```
//!
//! # Examples
//!
//! ```no_run
//! use docfill_convert::{resolve_soffice, ConverterOptions, PdfConverter};
//!
//! # async fn run() -> docfill_core::Result<()> {
//! let soffice = resolve_soffice(None)?;
//! let converter = PdfConverter::new(ConverterOptions::new(soffice.path));
//!
//! let docx = std::fs::read("filled.docx")?;
//! let pdf = converter.convert(&docx).await?;
//! std::fs::write("filled.pdf", pdf)?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod convert;
pub mod info;
pub mod resolve;

// Re-export commonly used types
pub use convert::{ConverterOptions, PdfConverter, compact_message};
pub use info::{SofficeInfo, SofficeSource};
pub use resolve::{SOFFICE_ENV, resolve_soffice};

// Type alias for convenience
pub type Result<T> = docfill_core::Result<T>;
