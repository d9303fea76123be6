use crate::info::{SofficeInfo, SofficeSource};
use docfill_core::{DocfillError, Result};
use std::path::Path;

/// Environment variable naming the soffice binary
pub const SOFFICE_ENV: &str = "DOCFILL_SOFFICE";

const PATH_CANDIDATES: &[&str] = &["soffice", "libreoffice"];

/// Resolve the soffice binary
///
/// Resolution priority:
/// 1. `explicit` (the `converter.soffice` setting)
/// 2. `DOCFILL_SOFFICE`
/// 3. `soffice`, then `libreoffice`, on PATH
///
/// An explicit path or environment value that does not name an executable is
/// an error rather than a reason to keep searching.
pub fn resolve_soffice(explicit: Option<&Path>) -> Result<SofficeInfo> {
    if let Some(path) = explicit {
        return locate(path, SofficeSource::Config);
    }

    if let Some(value) = std::env::var_os(SOFFICE_ENV).filter(|v| !v.is_empty()) {
        return locate(Path::new(&value), SofficeSource::Env);
    }

    for name in PATH_CANDIDATES {
        if let Ok(path) = which::which(name) {
            tracing::debug!(path = %path.display(), "found {} on PATH", name);
            return Ok(SofficeInfo {
                path,
                source: SofficeSource::SystemPath,
            });
        }
    }

    Err(DocfillError::ConverterNotFound {
        searched: format!("{}, PATH ({})", SOFFICE_ENV, PATH_CANDIDATES.join(", ")),
    })
}

/// Accepts either a path or a bare command name
fn locate(candidate: &Path, source: SofficeSource) -> Result<SofficeInfo> {
    which::which(candidate)
        .map(|path| SofficeInfo { path, source })
        .map_err(|_| DocfillError::ConverterNotFound {
            searched: format!("{} ({})", candidate.display(), source),
        })
}
