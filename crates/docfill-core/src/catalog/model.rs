use crate::error::{DocfillError, Result};
use crate::files;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

const SLUG_MAX_LEN: usize = 80;
const SLUG_FALLBACK: &str = "plantilla";

/// Caller-supplied description of a template being added
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub file_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: String,
    pub court: String,
}

/// Who added a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Uploader {
    pub id: String,
    pub name: String,
}

/// One catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateRecord {
    pub id: String,
    pub name: String,
    pub file_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: String,
    pub court: String,
    /// Location of the stored file, relative to the catalog root
    pub storage_path: String,
    pub size_bytes: u64,
    pub sha256: String,
    pub uploaded_by_id: String,
    pub uploaded_by_name: String,
    pub uploaded_at: DateTime<Utc>,
}

impl TemplateRecord {
    /// Build a validated record for `bytes`, with a fresh id and upload time
    pub fn new(new: NewTemplate, uploader: &Uploader, bytes: &[u8]) -> Result<Self> {
        let id = Uuid::new_v4().to_string();
        let mut record = Self {
            storage_path: String::new(),
            size_bytes: files::size_bytes(bytes),
            sha256: files::sha256_hex(bytes),
            uploaded_by_id: uploader.id.clone(),
            uploaded_by_name: uploader.name.clone(),
            uploaded_at: Utc::now(),
            id,
            name: new.name,
            file_name: new.file_name,
            description: new.description,
            kind: new.kind,
            court: new.court,
        };
        record.normalize()?;
        Ok(record)
    }

    /// Trim and check every field, lowercase the digest and fill in the
    /// storage path when it is blank
    pub fn normalize(&mut self) -> Result<()> {
        for (field, value) in [
            ("name", &mut self.name),
            ("file_name", &mut self.file_name),
            ("kind", &mut self.kind),
            ("court", &mut self.court),
            ("sha256", &mut self.sha256),
            ("uploaded_by_id", &mut self.uploaded_by_id),
            ("uploaded_by_name", &mut self.uploaded_by_name),
        ] {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                return Err(DocfillError::validation(format!(
                    "field '{}' must not be blank",
                    field
                )));
            }
            *value = trimmed.to_string();
        }

        if self.size_bytes == 0 {
            return Err(DocfillError::validation(
                "field 'size_bytes' must be greater than 0",
            ));
        }

        if self.sha256.len() != 64 || !self.sha256.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DocfillError::validation(
                "field 'sha256' must be a 64-character hexadecimal SHA-256 digest",
            ));
        }
        self.sha256 = self.sha256.to_ascii_lowercase();

        self.description = self
            .description
            .take()
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        if self.storage_path.trim().is_empty() {
            self.storage_path = storage_path(&self.id, &self.name);
        }
        Ok(())
    }
}

/// Default storage location: `templates/<id>/<slug>.docx`
pub fn storage_path(id: &str, name: &str) -> String {
    format!("templates/{}/{}.docx", id, slugify(name))
}

/// ASCII file-name slug of a template name
pub fn slugify(name: &str) -> String {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase().trim().replace(' ', "-");

    let mut slug = String::with_capacity(lowered.len());
    for c in lowered.chars() {
        let keep = c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_';
        if !keep || (c == '-' && slug.ends_with('-')) {
            continue;
        }
        slug.push(c);
    }

    let mut slug = slug.trim_matches('-').to_string();
    slug.truncate(SLUG_MAX_LEN);
    if slug.is_empty() {
        SLUG_FALLBACK.to_string()
    } else {
        slug
    }
}
