//! Test utilities for docfill
//!
//! This crate provides shared testing utilities used across the docfill workspace:
//! workspace-local temporary directories, environment isolation, an in-memory
//! DOCX builder and a fake `soffice` executable.

mod docx;
mod env;
mod fixtures;

pub use docx::{CellSpec, DocxBuilder, TableSpec, document_text, entry_names, read_entry};
pub use env::{ENV_LOCK, with_isolated_env};
pub use fixtures::{FAKE_SOFFICE_VERSION, FakeSoffice};

use tempfile::TempDir;

/// Creates a temporary directory within `.tmp/` at the project root
///
/// This ensures all test temporary files are centralized in a single location
/// that is gitignored and easy to clean up manually if needed.
///
/// # Panics
///
/// Panics if the current directory cannot be determined or `.tmp/` cannot be
/// created.
///
/// # Examples
///
/// ```rust
/// use docfill_testkit::temp_dir_in_workspace;
///
/// let temp = temp_dir_in_workspace();
/// let file_path = temp.path().join("plantilla.docx");
/// std::fs::write(&file_path, b"data").unwrap();
/// // Cleanup happens automatically when temp is dropped
/// ```
pub fn temp_dir_in_workspace() -> TempDir {
    let workspace_root = std::env::current_dir().expect("Failed to get current directory");

    let tmp_base = workspace_root.join(".tmp");

    // Ensure .tmp/ exists
    std::fs::create_dir_all(&tmp_base).expect("Failed to create .tmp directory");

    TempDir::new_in(&tmp_base).expect("Failed to create temporary directory in .tmp/")
}
