use std::fmt;
use std::path::PathBuf;
use std::process::Command;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SofficeSource {
    Config,
    Env,
    SystemPath,
}

impl fmt::Display for SofficeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SofficeSource::Config => write!(f, "docfill.toml"),
            SofficeSource::Env => write!(f, "DOCFILL_SOFFICE"),
            SofficeSource::SystemPath => write!(f, "system PATH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SofficeInfo {
    pub path: PathBuf,
    pub source: SofficeSource,
}

impl SofficeInfo {
    /// First line of `soffice --version`, if the binary answers
    ///
    /// Starting LibreOffice just to print its version takes a moment, so this
    /// is only called by diagnostics.
    pub fn version(&self) -> Option<String> {
        let output = Command::new(&self.path).arg("--version").output().ok()?;
        if !output.status.success() {
            return None;
        }
        parse_version(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Expected format: "LibreOffice 24.2.0.3 420(Build:3)"
fn parse_version(output: &str) -> Option<String> {
    output
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_version() {
        assert_eq!(
            parse_version("\nLibreOffice 7.6.4.1 60(Build:1)\n"),
            Some("LibreOffice 7.6.4.1 60(Build:1)".to_string())
        );
        assert_eq!(parse_version("  \n"), None);
    }

    #[test]
    fn test_source_display() {
        assert_eq!(SofficeSource::Env.to_string(), "DOCFILL_SOFFICE");
        assert_eq!(SofficeSource::SystemPath.to_string(), "system PATH");
    }

    #[test]
    fn test_version_of_missing_binary_is_none() {
        let info = SofficeInfo {
            path: PathBuf::from("/nonexistent/soffice"),
            source: SofficeSource::Config,
        };
        assert_eq!(info.version(), None);
    }
}
