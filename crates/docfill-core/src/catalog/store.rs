use super::filter::TemplateFilter;
use super::model::{NewTemplate, TemplateRecord, Uploader};
use crate::error::{DocfillError, Result};
use crate::lock::{self, LockGuard, LockMode};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;

pub const CATALOG_FILE_NAME: &str = "catalog.json";
pub const SCHEMA_VERSION: &str = "1.0";

const LOCK_FILE_NAME: &str = "catalog.lock";
const WRITE_LOCK_TIMEOUT: Duration = Duration::from_secs(30);
const READ_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// catalog.json schema
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogIndex {
    schema_version: String,
    #[serde(default)]
    templates: Vec<TemplateRecord>,
}

impl CatalogIndex {
    fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            templates: Vec::new(),
        }
    }
}

/// File-backed catalog rooted at a directory
///
/// Readers hold a shared lock on `<root>/catalog.lock`, writers an exclusive
/// one; catalog.json is replaced atomically.
#[derive(Debug, Clone)]
pub struct CatalogStore {
    root: PathBuf,
}

impl CatalogStore {
    /// Open the catalog at `root`; nothing is created until the first write
    pub fn open(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn index_path(&self) -> PathBuf {
        self.root.join(CATALOG_FILE_NAME)
    }

    /// Store `bytes` as a new template and index it
    ///
    /// The template file is removed again if the index cannot be written.
    pub fn add(&self, new: NewTemplate, uploader: &Uploader, bytes: &[u8]) -> Result<TemplateRecord> {
        let record = TemplateRecord::new(new, uploader, bytes)?;
        let file_path = self.resolve(&record.storage_path, DocfillError::CatalogWrite)?;

        let _lock = self.lock(LockMode::Exclusive)?;
        let mut index = self.read_index()?;

        let dir = parent_of(&file_path, DocfillError::CatalogWrite)?;
        std::fs::create_dir_all(dir).map_err(|e| {
            DocfillError::CatalogWrite(format!("failed to create {}: {}", dir.display(), e))
        })?;
        atomic_write(bytes, &file_path)?;

        index.templates.push(record.clone());
        if let Err(e) = self.write_index(&index) {
            discard_template_file(&file_path);
            return Err(e);
        }

        tracing::info!(
            id = %record.id,
            name = %record.name,
            size_bytes = record.size_bytes,
            "template added"
        );
        Ok(record)
    }

    pub fn get(&self, id: &str) -> Result<TemplateRecord> {
        let _lock = self.lock(LockMode::Shared)?;
        self.read_index()?
            .templates
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| DocfillError::TemplateNotFound(id.to_string()))
    }

    /// Unindex a template and delete its stored file
    pub fn remove(&self, id: &str) -> Result<TemplateRecord> {
        let _lock = self.lock(LockMode::Exclusive)?;
        let mut index = self.read_index()?;

        let position = index
            .templates
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| DocfillError::TemplateNotFound(id.to_string()))?;
        let record = index.templates.remove(position);
        self.write_index(&index)?;

        match self.resolve(&record.storage_path, DocfillError::CatalogWrite) {
            Ok(file_path) => discard_template_file(&file_path),
            Err(e) => tracing::warn!(id = %record.id, error = %e, "not deleting template file"),
        }

        tracing::info!(id = %record.id, name = %record.name, "template removed");
        Ok(record)
    }

    /// Matching records, newest first
    pub fn filter(&self, filter: &TemplateFilter) -> Result<Vec<TemplateRecord>> {
        let _lock = self.lock(LockMode::Shared)?;
        Ok(filter.apply(self.read_index()?.templates))
    }

    pub fn list(&self) -> Result<Vec<TemplateRecord>> {
        self.filter(&TemplateFilter::default())
    }

    /// Read the stored file of `record`
    pub fn load_bytes(&self, record: &TemplateRecord) -> Result<Vec<u8>> {
        let path = self.resolve(&record.storage_path, DocfillError::CatalogRead)?;
        std::fs::read(&path).map_err(|e| {
            DocfillError::CatalogRead(format!("failed to read {}: {}", path.display(), e))
        })
    }

    /// Check that catalog.json is readable and return the number of templates
    pub fn check(&self) -> Result<usize> {
        let _lock = self.lock(LockMode::Shared)?;
        Ok(self.read_index()?.templates.len())
    }

    fn lock(&self, mode: LockMode) -> Result<LockGuard> {
        let timeout = match mode {
            LockMode::Shared => READ_LOCK_TIMEOUT,
            LockMode::Exclusive => WRITE_LOCK_TIMEOUT,
        };
        lock::acquire(&self.root.join(LOCK_FILE_NAME), mode, timeout).map_err(|e| {
            let message = format!("failed to acquire lock: {}", e);
            match mode {
                LockMode::Shared => DocfillError::CatalogRead(message),
                LockMode::Exclusive => DocfillError::CatalogWrite(message),
            }
        })
    }

    fn read_index(&self) -> Result<CatalogIndex> {
        let path = self.index_path();
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(CatalogIndex::empty());
            }
            Err(e) => return Err(DocfillError::CatalogRead(e.to_string())),
        };

        let index: CatalogIndex = serde_json::from_str(&content)
            .map_err(|e| DocfillError::CatalogRead(format!("failed to parse: {}", e)))?;

        match index.schema_version.as_str() {
            SCHEMA_VERSION => Ok(index),
            version => Err(DocfillError::CatalogInvalidSchema(version.to_string())),
        }
    }

    fn write_index(&self, index: &CatalogIndex) -> Result<()> {
        let content = serde_json::to_string_pretty(index)
            .map_err(|e| DocfillError::CatalogWrite(format!("failed to serialize: {}", e)))?;
        atomic_write(content.as_bytes(), &self.index_path())
    }

    /// Join a stored relative path onto the root, refusing anything that
    /// could leave it
    fn resolve(&self, storage_path: &str, error: fn(String) -> DocfillError) -> Result<PathBuf> {
        let relative = Path::new(storage_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if storage_path.is_empty() || escapes {
            return Err(error(format!("invalid storage path '{}'", storage_path)));
        }
        Ok(self.root.join(relative))
    }
}

fn parent_of(path: &Path, error: fn(String) -> DocfillError) -> Result<&Path> {
    path.parent()
        .ok_or_else(|| error(format!("{} has no parent directory", path.display())))
}

/// Write through a temporary file in the same directory, then persist
fn atomic_write(content: &[u8], path: &Path) -> Result<()> {
    let parent = parent_of(path, DocfillError::CatalogWrite)?;
    std::fs::create_dir_all(parent).map_err(|e| {
        DocfillError::CatalogWrite(format!("failed to create {}: {}", parent.display(), e))
    })?;

    let mut temp_file = NamedTempFile::new_in(parent)
        .map_err(|e| DocfillError::CatalogWrite(format!("failed to create temp file: {}", e)))?;
    temp_file
        .write_all(content)
        .map_err(|e| DocfillError::CatalogWrite(format!("failed to write temp file: {}", e)))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| DocfillError::CatalogWrite(format!("failed to sync temp file: {}", e)))?;
    temp_file
        .persist(path)
        .map_err(|e| DocfillError::CatalogWrite(format!("failed to persist temp file: {}", e)))?;

    #[cfg(unix)]
    {
        std::fs::File::open(parent)
            .and_then(|dir| dir.sync_all())
            .map_err(|e| DocfillError::CatalogWrite(format!("failed to sync directory: {}", e)))?;
    }

    Ok(())
}

/// Best-effort removal of a stored file and its now-empty directory
fn discard_template_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "failed to delete template file");
            return;
        }
    }
    if let Some(dir) = path.parent() {
        // Fails harmlessly when other files remain
        let _ = std::fs::remove_dir(dir);
    }
}
