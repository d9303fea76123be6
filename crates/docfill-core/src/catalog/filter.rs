use super::model::TemplateRecord;
use chrono::{DateTime, Utc};

/// Catalog query; every set criterion must match
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFilter {
    /// Exact court, ignoring case
    pub court: Option<String>,
    /// Exact kind, ignoring case
    pub kind: Option<String>,
    /// Substring of name or description, ignoring case
    pub text: Option<String>,
    pub uploaded_from: Option<DateTime<Utc>>,
    pub uploaded_to: Option<DateTime<Utc>>,
}

impl TemplateFilter {
    pub fn matches(&self, record: &TemplateRecord) -> bool {
        if let Some(court) = criterion(&self.court) {
            if record.court.to_lowercase() != court.to_lowercase() {
                return false;
            }
        }
        if let Some(kind) = criterion(&self.kind) {
            if record.kind.to_lowercase() != kind.to_lowercase() {
                return false;
            }
        }
        if let Some(text) = criterion(&self.text) {
            let needle = text.to_lowercase();
            let in_name = record.name.to_lowercase().contains(&needle);
            let in_description = record
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }
        if self.uploaded_from.is_some_and(|from| record.uploaded_at < from) {
            return false;
        }
        if self.uploaded_to.is_some_and(|to| record.uploaded_at > to) {
            return false;
        }
        true
    }

    /// Matching records, newest first
    pub fn apply(&self, records: impl IntoIterator<Item = TemplateRecord>) -> Vec<TemplateRecord> {
        let mut matched: Vec<TemplateRecord> =
            records.into_iter().filter(|r| self.matches(r)).collect();
        matched.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        matched
    }
}

/// Blank criteria are treated as unset
fn criterion(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
