//! Local template catalog
//!
//! `<root>/catalog.json` indexes the templates; each template file lives under
//! `<root>/<storage_path>`.

mod filter;
mod model;
mod store;

pub use filter::TemplateFilter;
pub use model::{slugify, storage_path, NewTemplate, TemplateRecord, Uploader};
pub use store::{CatalogStore, CATALOG_FILE_NAME, SCHEMA_VERSION};

#[cfg(test)]
mod tests;
