//! Package relationships (`*.rels`)

use super::part::{xml_error, XmlPart};
use super::DocxError;
use quick_xml::events::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    pub external: bool,
}

/// Parse a relationships part into its entries
pub(crate) fn parse_relationships(xml: &[u8]) -> Result<Vec<Relationship>, DocxError> {
    let part = XmlPart::parse("relationships", xml)?;
    let mut relationships = Vec::new();

    for event in &part.events {
        let (Event::Start(start) | Event::Empty(start)) = event else {
            continue;
        };
        if start.local_name().as_ref() != b"Relationship" {
            continue;
        }

        let mut rel = Relationship {
            id: String::new(),
            rel_type: String::new(),
            target: String::new(),
            external: false,
        };
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(&part.name, e))?;
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(&part.name, e))?
                .into_owned();
            match attr.key.as_ref() {
                b"Id" => rel.id = value,
                b"Type" => rel.rel_type = value,
                b"Target" => rel.target = value,
                b"TargetMode" => rel.external = value == "External",
                _ => {}
            }
        }
        relationships.push(rel);
    }

    Ok(relationships)
}

/// `word/document.xml` → `word/_rels/document.xml.rels`
pub(crate) fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the part that owns the relationship
///
/// Absolute targets (`/word/header1.xml`) are taken from the package root.
pub(crate) fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
