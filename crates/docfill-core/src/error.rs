use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocfillError {
    // Caller input errors
    #[error("VALIDATION_ERROR: {0}")]
    Validation(String),

    // Document codec errors
    #[error("PROCESSING_ERROR: {0}")]
    Processing(String),

    // Catalog errors
    #[error("TEMPLATE_NOT_FOUND: template '{0}' not found")]
    TemplateNotFound(String),

    #[error("CATALOG_READ_ERROR: failed to read catalog.json: {0}")]
    CatalogRead(String),

    #[error("CATALOG_WRITE_ERROR: failed to write catalog.json: {0}")]
    CatalogWrite(String),

    #[error("CATALOG_INVALID_SCHEMA: unknown schema version '{0}'")]
    CatalogInvalidSchema(String),

    // Converter errors
    #[error("CONVERTER_NOT_FOUND: soffice not found (searched: {searched})")]
    ConverterNotFound { searched: String },

    #[error("CONVERSION_FAILED: {0}")]
    ConversionFailed(String),

    #[error("CONVERSION_TIMEOUT: soffice exceeded {secs} seconds")]
    ConversionTimeout { secs: u64 },

    // Config errors
    #[error("CONFIG_PARSE_ERROR: {0}")]
    ConfigParse(String),

    #[error("CONFIG_INVALID_VALUE: {field}: {reason}")]
    ConfigInvalid { field: String, reason: String },

    // IO errors
    #[error("IO_ERROR: {0}")]
    Io(#[from] std::io::Error),
}

impl DocfillError {
    /// Shorthand for a validation failure with a formatted message
    pub fn validation(message: impl Into<String>) -> Self {
        DocfillError::Validation(message.into())
    }

    /// Whether the error was caused by caller input rather than the environment
    pub fn is_validation(&self) -> bool {
        matches!(self, DocfillError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DocfillError>;
