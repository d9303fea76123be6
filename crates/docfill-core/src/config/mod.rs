//! `docfill.toml` configuration

mod model;

pub use model::{CatalogConfig, Config, ConverterConfig, LogConfig};

/// Default configuration file, looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "docfill.toml";
