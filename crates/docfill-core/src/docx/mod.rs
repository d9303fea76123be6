//! WordprocessingML (DOCX) document codec
//!
//! Loads a DOCX package into an arena-backed tree of paragraphs, tables and
//! header/footer sections, and writes it back. The tree only exposes run
//! *text*: everything else in the package (styles, run properties, media,
//! untouched parts) is carried through verbatim.
//!
//! ## Layout
//!
//! - Paragraphs live in an arena owned by [`Document`] and are addressed by
//!   [`ParagraphId`]. Tables, cells and sections hold ids, never references.
//! - A run is addressed by [`RunRef`] (paragraph id + run index).
//! - A run's text is the concatenation of its `w:t` children, with `\t` for
//!   each `w:tab` and `\n` for each line break. On save, a modified run keeps
//!   its tabs and breaks in place when their sequence is unchanged and writes
//!   each stretch of text into the first `w:t` next to it. New tabs and line
//!   breaks in the text become `w:tab`/`w:br` elements.

mod builder;
mod model;
mod package;
mod part;
mod rels;

pub use model::{
    Cell, Content, DocumentStats, HeaderFooter, Paragraph, ParagraphId, Row, Run, RunRef,
    Section, Table,
};

use builder::SectionRefs;
use package::Package;
use part::{Segment, XmlPart};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Errors raised while reading or writing a DOCX package
#[derive(Error, Debug)]
pub enum DocxError {
    #[error("invalid package: {0}")]
    Package(String),

    #[error("missing part '{0}'")]
    MissingPart(String),

    #[error("malformed XML in '{part}': {message}")]
    Xml { part: String, message: String },
}

const OFFICE_DOCUMENT_REL: &str = "/officeDocument";
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// A loaded DOCX document
#[derive(Debug)]
pub struct Document {
    package: Package,
    parts: Vec<XmlPart>,
    paragraphs: Vec<Paragraph>,
    body: Content,
    sections: Vec<Section>,
}

impl Document {
    /// Load a document from the bytes of a DOCX package
    pub fn load(bytes: &[u8]) -> Result<Self, DocxError> {
        let package = Package::read(bytes)?;
        let main_name = main_part_name(&package)?;

        let main_bytes = package
            .get(&main_name)
            .ok_or_else(|| DocxError::MissingPart(main_name.clone()))?;

        let mut parts = vec![XmlPart::parse(&main_name, main_bytes)?];
        let mut paragraphs = Vec::new();
        let main_tree = builder::build(&mut parts[0], 0, &mut paragraphs)?;

        let relationships = match package.get(&rels::rels_path_for(&main_name)) {
            Some(xml) => rels::parse_relationships(xml)?,
            None => Vec::new(),
        };
        let targets: HashMap<&str, String> = relationships
            .iter()
            .filter(|rel| !rel.external)
            .map(|rel| (rel.id.as_str(), rels::resolve_target(&main_name, &rel.target)))
            .collect();

        let mut loaded: HashSet<String> = HashSet::new();
        let mut sections = Vec::with_capacity(main_tree.sections.len());
        for refs in &main_tree.sections {
            let mut load_ref = |rid: &Option<String>| -> Result<Option<HeaderFooter>, DocxError> {
                load_header_footer(
                    rid.as_deref(),
                    &targets,
                    &package,
                    &mut loaded,
                    &mut parts,
                    &mut paragraphs,
                )
            };
            sections.push(section_from_refs(refs, &mut load_ref)?);
        }

        tracing::debug!(
            main_part = %main_name,
            paragraphs = paragraphs.len(),
            sections = sections.len(),
            "loaded document"
        );

        Ok(Self {
            package,
            parts,
            paragraphs,
            body: main_tree.content,
            sections,
        })
    }

    /// Serialize the document back to DOCX bytes
    ///
    /// Parts without modified runs are written back byte-identical.
    pub fn save(&self) -> Result<Vec<u8>, DocxError> {
        let mut replacements: HashMap<String, Vec<u8>> = HashMap::new();

        for (index, part) in self.parts.iter().enumerate() {
            let overrides = self.slot_overrides(index);
            if overrides.is_empty() {
                continue;
            }
            replacements.insert(part.name.clone(), part.render(&overrides)?);
        }

        tracing::debug!(rewritten_parts = replacements.len(), "saving document");
        self.package.write(&replacements)
    }

    /// Body content (paragraphs and tables) in document order
    pub fn body(&self) -> &Content {
        &self.body
    }

    /// Sections in document order
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn paragraph(&self, id: ParagraphId) -> &Paragraph {
        &self.paragraphs[id.0]
    }

    pub fn paragraph_mut(&mut self, id: ParagraphId) -> &mut Paragraph {
        &mut self.paragraphs[id.0]
    }

    pub fn run(&self, at: RunRef) -> Option<&Run> {
        self.paragraphs.get(at.paragraph.0)?.runs().get(at.run)
    }

    /// Every paragraph in the arena, including ones the walker never visits
    pub fn paragraphs(&self) -> impl Iterator<Item = (ParagraphId, &Paragraph)> {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(index, paragraph)| (ParagraphId(index), paragraph))
    }

    /// Structural counts over the whole tree
    pub fn stats(&self) -> DocumentStats {
        let mut stats = DocumentStats::default();
        stats.add_content(&self.body, &self.paragraphs);
        for section in &self.sections {
            for hf in section.header_footers() {
                stats.add_content(&hf.content, &self.paragraphs);
            }
        }
        stats
    }

    /// Map of slot index → replacement pieces for one part
    fn slot_overrides(&self, part: usize) -> HashMap<usize, Vec<Segment<'_>>> {
        let xml = &self.parts[part];
        let mut overrides = HashMap::new();
        for paragraph in self.paragraphs.iter().filter(|p| p.part == part) {
            for run in paragraph.runs().iter().filter(|r| r.is_modified()) {
                if !xml.layout_run(&run.slots, run.text(), &mut overrides) {
                    tracing::warn!(part, "dropping text written to a run without w:t");
                }
            }
        }
        overrides
    }
}

/// Locate the main document part through the package relationships
fn main_part_name(package: &Package) -> Result<String, DocxError> {
    let Some(xml) = package.get("_rels/.rels") else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };

    let main = rels::parse_relationships(xml)?
        .into_iter()
        .find(|rel| rel.rel_type.ends_with(OFFICE_DOCUMENT_REL) && !rel.external)
        .map(|rel| rels::resolve_target("", &rel.target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string());

    Ok(main)
}

fn section_from_refs<F>(refs: &SectionRefs, load: &mut F) -> Result<Section, DocxError>
where
    F: FnMut(&Option<String>) -> Result<Option<HeaderFooter>, DocxError>,
{
    Ok(Section {
        header: load(&refs.header)?,
        footer: load(&refs.footer)?,
        first_page_header: load(&refs.first_page_header)?,
        first_page_footer: load(&refs.first_page_footer)?,
        even_page_header: load(&refs.even_page_header)?,
        even_page_footer: load(&refs.even_page_footer)?,
    })
}

/// Parse a header/footer part once; later references to the same part yield `None`
fn load_header_footer(
    rid: Option<&str>,
    targets: &HashMap<&str, String>,
    package: &Package,
    loaded: &mut HashSet<String>,
    parts: &mut Vec<XmlPart>,
    paragraphs: &mut Vec<Paragraph>,
) -> Result<Option<HeaderFooter>, DocxError> {
    let Some(rid) = rid else {
        return Ok(None);
    };
    let Some(name) = targets.get(rid) else {
        tracing::warn!(relationship = rid, "header/footer relationship not found");
        return Ok(None);
    };
    if !loaded.insert(name.clone()) {
        return Ok(None);
    }
    let Some(bytes) = package.get(name) else {
        tracing::warn!(part = %name, "header/footer part missing from package");
        return Ok(None);
    };

    let index = parts.len();
    parts.push(XmlPart::parse(name, bytes)?);
    let tree = builder::build(&mut parts[index], index, paragraphs)?;

    Ok(Some(HeaderFooter {
        part_name: name.clone(),
        content: tree.content,
    }))
}
