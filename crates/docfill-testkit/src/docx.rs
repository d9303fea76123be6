//! In-memory DOCX fixtures
//!
//! [`DocxBuilder`] produces minimal but valid WordprocessingML packages with
//! explicit run boundaries, so tests can place placeholders across runs
//! exactly the way an editor splits them.

use std::io::{Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// A table of cells
#[derive(Debug, Clone, Default)]
pub struct TableSpec {
    rows: Vec<Vec<CellSpec>>,
}

impl TableSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn row(mut self, cells: Vec<CellSpec>) -> Self {
        self.rows.push(cells);
        self
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from("<w:tbl><w:tblPr><w:tblW w:w=\"0\" w:type=\"auto\"/></w:tblPr>");
        for row in &self.rows {
            xml.push_str("<w:tr>");
            for cell in row {
                xml.push_str(&cell.to_xml());
            }
            xml.push_str("</w:tr>");
        }
        xml.push_str("</w:tbl>");
        xml
    }
}

/// One table cell: paragraphs followed by nested tables
#[derive(Debug, Clone, Default)]
pub struct CellSpec {
    paragraphs: Vec<Vec<String>>,
    tables: Vec<TableSpec>,
}

impl CellSpec {
    /// A cell with a single paragraph made of `runs`
    pub fn new(runs: &[&str]) -> Self {
        Self::default().paragraph(runs)
    }

    pub fn paragraph(mut self, runs: &[&str]) -> Self {
        self.paragraphs
            .push(runs.iter().map(|run| run.to_string()).collect());
        self
    }

    pub fn table(mut self, table: TableSpec) -> Self {
        self.tables.push(table);
        self
    }

    fn to_xml(&self) -> String {
        let mut xml = String::from("<w:tc><w:tcPr><w:tcW w:w=\"0\" w:type=\"auto\"/></w:tcPr>");
        for runs in &self.paragraphs {
            xml.push_str(&paragraph_xml(runs));
        }
        for table in &self.tables {
            xml.push_str(&table.to_xml());
            // A cell must end with a paragraph
            xml.push_str("<w:p/>");
        }
        xml.push_str("</w:tc>");
        xml
    }
}

#[derive(Debug, Clone)]
struct HeaderFooterPart {
    name: String,
    rel_id: String,
    header: bool,
    xml: String,
}

/// Builder for DOCX test documents
///
/// # Examples
///
/// ```rust
/// use docfill_testkit::DocxBuilder;
///
/// let bytes = DocxBuilder::new()
///     .paragraph(&["Señor ", "{{", "NOMBRE}}"])
///     .header(&[&["Expediente {{DEMANDA_ID}}"]])
///     .build();
/// assert!(!bytes.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocxBuilder {
    body: String,
    section_refs: String,
    parts: Vec<HeaderFooterPart>,
    extra: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body paragraph whose runs hold exactly `runs`
    pub fn paragraph(mut self, runs: &[&str]) -> Self {
        let runs: Vec<String> = runs.iter().map(|run| run.to_string()).collect();
        self.body.push_str(&paragraph_xml(&runs));
        self
    }

    pub fn table(mut self, table: TableSpec) -> Self {
        self.body.push_str(&table.to_xml());
        self
    }

    /// Append raw WordprocessingML to the body
    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    /// Default header of the current section
    pub fn header(self, paragraphs: &[&[&str]]) -> Self {
        self.header_footer(true, "default", paragraphs)
    }

    /// Default footer of the current section
    pub fn footer(self, paragraphs: &[&[&str]]) -> Self {
        self.header_footer(false, "default", paragraphs)
    }

    pub fn first_page_header(self, paragraphs: &[&[&str]]) -> Self {
        self.header_footer(true, "first", paragraphs)
    }

    pub fn first_page_footer(self, paragraphs: &[&[&str]]) -> Self {
        self.header_footer(false, "first", paragraphs)
    }

    pub fn even_page_header(self, paragraphs: &[&[&str]]) -> Self {
        self.header_footer(true, "even", paragraphs)
    }

    /// Close the current section and start a new one without headers/footers
    pub fn section_break(mut self) -> Self {
        self.body.push_str(&format!(
            "<w:p><w:pPr><w:sectPr>{}</w:sectPr></w:pPr></w:p>",
            self.section_refs
        ));
        self.section_refs.clear();
        self
    }

    /// Close the current section and start one that references the same
    /// header/footer parts
    pub fn section_break_keeping_headers(mut self) -> Self {
        let refs = self.section_refs.clone();
        self = self.section_break();
        self.section_refs = refs;
        self
    }

    /// Add an arbitrary package entry (e.g. media), stored uncompressed
    pub fn entry(mut self, name: &str, data: &[u8]) -> Self {
        self.extra.push((name.to_string(), data.to_vec()));
        self
    }

    fn header_footer(mut self, header: bool, kind: &str, paragraphs: &[&[&str]]) -> Self {
        let index = self.parts.iter().filter(|p| p.header == header).count() + 1;
        let (root, base) = if header { ("hdr", "header") } else { ("ftr", "footer") };
        let name = format!("{}{}.xml", base, index);
        let rel_id = format!("rId{}", 100 + self.parts.len());

        let mut xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:{root} xmlns:w="{W_NS}" xmlns:r="{R_NS}">"#
        );
        for runs in paragraphs {
            let runs: Vec<String> = runs.iter().map(|run| run.to_string()).collect();
            xml.push_str(&paragraph_xml(&runs));
        }
        xml.push_str(&format!("</w:{root}>"));

        self.section_refs.push_str(&format!(
            r#"<w:{base}Reference w:type="{kind}" r:id="{rel_id}"/>"#
        ));
        self.parts.push(HeaderFooterPart {
            name,
            rel_id,
            header,
            xml,
        });
        self
    }

    /// Assemble the package
    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        let mut files: Vec<(String, String)> = vec![
            ("[Content_Types].xml".to_string(), self.content_types()),
            ("_rels/.rels".to_string(), ROOT_RELS.to_string()),
            ("word/document.xml".to_string(), self.document_xml()),
            ("word/_rels/document.xml.rels".to_string(), self.document_rels()),
        ];
        for part in &self.parts {
            files.push((format!("word/{}", part.name), part.xml.clone()));
        }

        for (name, content) in files {
            zip.start_file(name, options(CompressionMethod::Deflated))
                .unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        for (name, data) in &self.extra {
            zip.start_file(name.as_str(), options(CompressionMethod::Stored))
                .unwrap();
            zip.write_all(data).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    /// Build and write the package to `path`
    pub fn write_to(&self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }

    fn document_xml(&self) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{W_NS}" xmlns:r="{R_NS}"><w:body>{}<w:sectPr>{}<w:pgSz w:w="11906" w:h="16838"/></w:sectPr></w:body></w:document>"#,
            self.body, self.section_refs
        )
    }

    fn document_rels(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        );
        for part in &self.parts {
            let kind = if part.header { "header" } else { "footer" };
            xml.push_str(&format!(
                r#"<Relationship Id="{}" Type="{REL_BASE}/{kind}" Target="{}"/>"#,
                part.rel_id, part.name
            ));
        }
        xml.push_str("</Relationships>");
        xml
    }

    fn content_types(&self) -> String {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        );
        for part in &self.parts {
            let kind = if part.header { "header" } else { "footer" };
            xml.push_str(&format!(
                r#"<Override PartName="/word/{}" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.{kind}+xml"/>"#,
                part.name
            ));
        }
        xml.push_str("</Types>");
        xml
    }
}

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn options(method: CompressionMethod) -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(method)
}

fn paragraph_xml(runs: &[String]) -> String {
    let mut xml = String::from("<w:p>");
    for run in runs {
        xml.push_str(&format!(
            r#"<w:r><w:rPr><w:rFonts w:ascii="Arial"/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape(run)
        ));
    }
    xml.push_str("</w:p>");
    xml
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Raw bytes of a package entry
pub fn read_entry(docx: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut archive = ZipArchive::new(Cursor::new(docx)).ok()?;
    let mut file = archive.by_name(name).ok()?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).ok()?;
    Some(data)
}

/// Names of all entries, in archive order
pub fn entry_names(docx: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(docx)).unwrap();
    archive.file_names().map(str::to_string).collect::<Vec<_>>()
}

/// Visible text of an XML part: `w:t` contents, one line per paragraph
///
/// Intended for assertions; it is a plain string scan, not an XML parser.
pub fn document_text(docx: &[u8], part: &str) -> String {
    let xml = String::from_utf8(read_entry(docx, part).unwrap_or_default()).unwrap();
    let mut lines = Vec::new();

    for paragraph in xml.split("</w:p>") {
        let mut line = String::new();
        let mut rest = paragraph;
        while let Some(start) = rest.find("<w:t") {
            let after = &rest[start + 4..];
            // Skip <w:tbl>, <w:tc>, <w:tr>, <w:tab/>...
            if !after.starts_with('>') && !after.starts_with(' ') && !after.starts_with('/') {
                rest = after;
                continue;
            }
            let Some(tag_end) = after.find('>') else {
                break;
            };
            if after[..tag_end].ends_with('/') {
                rest = &after[tag_end + 1..];
                continue;
            }
            let content = &after[tag_end + 1..];
            let Some(close) = content.find("</w:t>") else {
                break;
            };
            line.push_str(&unescape(&content[..close]));
            rest = &content[close + 6..];
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }

    lines.join("\n")
}
