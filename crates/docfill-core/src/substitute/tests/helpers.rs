//! Shared test helpers for substitution tests

use crate::docx::Run;
use crate::mapping::{Metadata, MetadataValue, PlaceholderMapping};

/// Metadata from `(key, value)` string pairs
pub(super) fn metadata(pairs: &[(&str, &str)]) -> Metadata {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), MetadataValue::from(*value)))
        .collect()
}

pub(super) fn mapping(pairs: &[(&str, &str)]) -> PlaceholderMapping {
    PlaceholderMapping::build(&metadata(pairs)).unwrap()
}

pub(super) fn runs(texts: &[&str]) -> Vec<Run> {
    texts.iter().map(|text| Run::new(*text)).collect()
}

/// Substitute into runs made of `texts` and return the resulting run texts
pub(super) fn rewrite(texts: &[&str], pairs: &[(&str, &str)]) -> Vec<String> {
    let mut runs = runs(texts);
    super::substitute_runs(&mut runs, &mapping(pairs));
    runs.iter().map(|run| run.text().to_string()).collect()
}

pub(super) fn joined(texts: &[String]) -> String {
    texts.concat()
}
