use crate::error::{DocfillError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// docfill.toml schema
///
/// Every section is optional; a missing file means all defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Explicit soffice path; takes precedence over `DOCFILL_SOFFICE` and PATH
    #[serde(default)]
    pub soffice: Option<PathBuf>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            soffice: None,
            timeout_secs: default_timeout_secs(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_concurrency() -> usize {
    2
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Directory holding catalog.json and the stored templates
    #[serde(default = "default_catalog_root")]
    pub root: PathBuf,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            root: default_catalog_root(),
        }
    }
}

fn default_catalog_root() -> PathBuf {
    PathBuf::from(".docfill")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// `tracing` filter used when neither RUST_LOG nor --verbose is given
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

impl Config {
    /// Read and validate a configuration file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| DocfillError::ConfigParse(format!("{}: {}", path.display(), e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| DocfillError::ConfigParse(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `docfill.toml` in `dir` when present,
    /// else the defaults
    ///
    /// Returns the config and the file it came from.
    pub fn discover(explicit: Option<&Path>, dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }

        let candidate = dir.join(super::CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using configuration file");
            return Ok((Self::from_file(&candidate)?, Some(candidate)));
        }

        Ok((Self::default(), None))
    }

    pub fn validate(&self) -> Result<()> {
        if self.converter.timeout_secs == 0 {
            return Err(invalid("converter.timeout_secs", "must be greater than 0"));
        }
        if self.converter.max_concurrency == 0 {
            return Err(invalid("converter.max_concurrency", "must be at least 1"));
        }
        if self.catalog.root.as_os_str().is_empty() {
            return Err(invalid("catalog.root", "must not be empty"));
        }
        if !LOG_LEVELS.contains(&self.log.level.to_ascii_lowercase().as_str()) {
            return Err(invalid(
                "log.level",
                &format!("expected one of {}", LOG_LEVELS.join(", ")),
            ));
        }
        Ok(())
    }

    pub fn conversion_timeout(&self) -> Duration {
        Duration::from_secs(self.converter.timeout_secs)
    }
}

fn invalid(field: &str, reason: &str) -> DocfillError {
    DocfillError::ConfigInvalid {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_testkit::temp_dir_in_workspace;

    #[test]
    fn test_parse_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.converter.timeout_secs, 60);
        assert_eq!(config.converter.max_concurrency, 2);
        assert_eq!(config.catalog.root, PathBuf::from(".docfill"));
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[converter]
soffice = "/opt/libreoffice/program/soffice"
timeout_secs = 120
max_concurrency = 4

[catalog]
root = "/var/lib/docfill"

[log]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.converter.soffice,
            Some(PathBuf::from("/opt/libreoffice/program/soffice"))
        );
        assert_eq!(config.conversion_timeout(), Duration::from_secs(120));
        assert_eq!(config.converter.max_concurrency, 4);
        assert_eq!(config.catalog.root, PathBuf::from("/var/lib/docfill"));
        assert_eq!(config.log.level, "debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_timeout_is_invalid() {
        let temp = temp_dir_in_workspace();
        let path = temp.path().join("docfill.toml");
        std::fs::write(&path, "[converter]\ntimeout_secs = 0\n").unwrap();

        match Config::from_file(&path).unwrap_err() {
            DocfillError::ConfigInvalid { field, .. } => {
                assert_eq!(field, "converter.timeout_secs")
            }
            other => panic!("Expected ConfigInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_log_level_is_invalid() {
        let mut config = Config::default();
        config.log.level = "loud".to_string();
        assert!(matches!(
            config.validate(),
            Err(DocfillError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let temp = temp_dir_in_workspace();
        let path = temp.path().join("docfill.toml");
        std::fs::write(&path, "[converter\n").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(DocfillError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_discover_prefers_explicit_then_directory_then_defaults() {
        let temp = temp_dir_in_workspace();

        let (config, source) = Config::discover(None, temp.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(source.is_none());

        std::fs::write(temp.path().join("docfill.toml"), "[log]\nlevel = \"info\"\n").unwrap();
        let (config, source) = Config::discover(None, temp.path()).unwrap();
        assert_eq!(config.log.level, "info");
        assert_eq!(source, Some(temp.path().join("docfill.toml")));

        let explicit = temp.path().join("other.toml");
        std::fs::write(&explicit, "[catalog]\nroot = \"x\"\n").unwrap();
        let (config, _) = Config::discover(Some(&explicit), temp.path()).unwrap();
        assert_eq!(config.catalog.root, PathBuf::from("x"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp = temp_dir_in_workspace();
        let missing = temp.path().join("nope.toml");
        assert!(Config::discover(Some(&missing), temp.path()).is_err());
    }
}
