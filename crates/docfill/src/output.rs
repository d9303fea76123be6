use anyhow::{Context as _, Result, bail};
use docfill_core::Output;
use std::io::{self, Read, Write};
use std::path::Path;

pub fn print_json(s: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{s}")
}

pub fn print_text(s: &str) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(out, "{s}")
}

/// Read a document from a file, or stdin for `-`, optionally base64 decoded
pub fn read_input(path: &Path, base64: bool) -> Result<Vec<u8>> {
    let bytes = if path == Path::new("-") {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("failed to read stdin")?;
        buf
    } else {
        std::fs::read(path).with_context(|| format!("failed to read {}", path.display()))?
    };

    if !base64 {
        return Ok(bytes);
    }
    let text = String::from_utf8(bytes).context("base64 input is not UTF-8 text")?;
    Ok(docfill_core::files::decode_base64(&text)?)
}

/// Write engine output: bytes need a file, text goes to the file or stdout
pub fn emit(output: &Output, path: Option<&Path>) -> Result<()> {
    match (output, path) {
        (_, Some(path)) => write_file(path, output.as_bytes()),
        (Output::Text(text), None) => Ok(print_text(text)?),
        (Output::Bytes(_), None) => bail!("--output is required for bytes output"),
    }
}

pub fn write_file(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote output");
    Ok(())
}
