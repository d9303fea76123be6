// Core modules
pub mod catalog;
pub mod config;
pub mod docx;
pub mod error;
pub mod files;
pub mod lock;
pub mod mapping;
pub mod substitute;

// Re-export commonly used types
pub use error::{DocfillError, Result};
pub use mapping::{parse_metadata, Metadata, MetadataValue, PlaceholderMapping};
pub use substitute::{substitute, Output, OutputFormat, SubstitutionReport};
