//! Pdf command - substitution followed by conversion

use super::{block_on, default_pdf_path, load_metadata};
use crate::cli::PdfArgs;
use crate::context::Context;
use crate::output;
use anyhow::{Result, anyhow};
use docfill_core::files::encode_base64;
use docfill_core::{Output, substitute};

pub fn run(ctx: &Context, args: PdfArgs) -> Result<()> {
    let metadata = load_metadata(&args.metadata)?;
    let document = output::read_input(&args.input, args.input_base64)?;

    let Output::Bytes(filled) = substitute(&document, &metadata, "bytes")? else {
        return Err(anyhow!("substitution did not return document bytes"));
    };

    let converter = ctx.converter()?;
    let pdf = block_on(converter.convert(&filled))??;

    if args.base64 {
        return output::emit(&Output::Text(encode_base64(&pdf)), args.output.as_deref());
    }

    let path = args
        .output
        .unwrap_or_else(|| default_pdf_path(&args.input));
    output::write_file(&path, &pdf)?;
    if ctx.verbose {
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}
