//! Global context for CLI commands

use anyhow::Result;
use docfill_convert::{ConverterOptions, PdfConverter, resolve_soffice};
use docfill_core::catalog::CatalogStore;
use docfill_core::config::Config;
use std::env;
use std::path::{Path, PathBuf};

/// Loaded configuration and global flags
pub struct Context {
    pub config: Config,
    /// File the configuration came from; `None` means built-in defaults
    pub config_path: Option<PathBuf>,
    pub verbose: bool,
}

impl Context {
    /// Load `explicit`, or `./docfill.toml` when present, or the defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read, parsed or
    /// validated.
    pub fn new(explicit: Option<&Path>, verbose: bool) -> Result<Self> {
        let current_dir = env::current_dir()?;
        let (config, config_path) = Config::discover(explicit, &current_dir)?;

        Ok(Self {
            config,
            config_path,
            verbose,
        })
    }

    pub fn catalog(&self) -> CatalogStore {
        CatalogStore::open(&self.config.catalog.root)
    }

    /// Resolve soffice and build a converter from the `[converter]` settings
    pub fn converter(&self) -> Result<PdfConverter> {
        let soffice = resolve_soffice(self.config.converter.soffice.as_deref())?;
        tracing::debug!(path = %soffice.path.display(), source = %soffice.source, "resolved soffice");
        Ok(PdfConverter::new(ConverterOptions::from_config(
            soffice.path,
            &self.config.converter,
        )))
    }
}
