//! Convert command - DOCX to PDF only

use super::{block_on, default_pdf_path};
use crate::context::Context;
use crate::output;
use anyhow::Result;
use std::path::PathBuf;

pub fn run(ctx: &Context, input: PathBuf, output_path: Option<PathBuf>) -> Result<()> {
    let document = output::read_input(&input, false)?;
    let converter = ctx.converter()?;
    let pdf = block_on(converter.convert(&document))??;

    let path = output_path.unwrap_or_else(|| default_pdf_path(&input));
    output::write_file(&path, &pdf)?;
    if ctx.verbose {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
