//! Fill command - placeholder substitution

use super::load_metadata;
use crate::cli::FillArgs;
use crate::output;
use anyhow::{Result, bail};
use docfill_core::{OutputFormat, substitute};

pub fn run(args: FillArgs) -> Result<()> {
    let format: OutputFormat = args.format.parse()?;
    if format == OutputFormat::Bytes && args.output.is_none() {
        bail!("--output is required for bytes output");
    }

    let metadata = load_metadata(&args.metadata)?;
    let document = output::read_input(&args.input, args.input_base64)?;

    let filled = substitute(&document, &metadata, &args.format)?;
    output::emit(&filled, args.output.as_deref())
}
