//! Builds the document tree from a part's event sequence
//!
//! The builder walks the events once with a frame stack. Only the block
//! structure (body/header/footer, paragraphs, tables, rows, cells) and the
//! direct `w:r` children of paragraphs are modelled; every other element is
//! an opaque frame whose descendants are skipped. Block-level `w:sdt`,
//! `w:sdtContent` and `w:customXml` are transparent.
//!
//! A run's text is read the way Word shows it: `w:t` content, `\t` for a
//! `w:tab` and `\n` for a `w:cr` or a text-wrapping `w:br`. Page and column
//! breaks carry no text.

use super::model::{Cell, Content, Paragraph, ParagraphId, Row, Run, Table};
use super::part::{append_text, xml_error, SlotKind, TextSlot, XmlPart};
use super::DocxError;
use quick_xml::events::{BytesStart, Event};

/// Header/footer relationship ids referenced by one `w:sectPr`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SectionRefs {
    pub header: Option<String>,
    pub footer: Option<String>,
    pub first_page_header: Option<String>,
    pub first_page_footer: Option<String>,
    pub even_page_header: Option<String>,
    pub even_page_footer: Option<String>,
}

/// Result of building one part
#[derive(Debug, Default)]
pub(crate) struct PartTree {
    pub content: Content,
    /// Sections in document order; empty for header/footer parts
    pub sections: Vec<SectionRefs>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Root,
    Container,
    Table,
    Row,
    Cell,
    Paragraph,
    Run,
    Text,
    Opaque,
}

#[derive(Debug)]
enum Frame {
    Root,
    Container(Content),
    Wrapper,
    Table(Table),
    Row(Row),
    Cell(Cell),
    Paragraph(ParagraphId),
    Run { text: String, slots: Vec<usize> },
    Text { slot: usize, text: String },
    Char { slot: usize },
    Opaque,
}

impl Frame {
    fn kind(&self) -> Kind {
        match self {
            Frame::Root => Kind::Root,
            Frame::Container(_) => Kind::Container,
            Frame::Table(_) => Kind::Table,
            Frame::Row(_) => Kind::Row,
            Frame::Cell(_) => Kind::Cell,
            Frame::Paragraph(_) => Kind::Paragraph,
            Frame::Run { .. } => Kind::Run,
            Frame::Text { .. } | Frame::Char { .. } => Kind::Text,
            Frame::Wrapper | Frame::Opaque => Kind::Opaque,
        }
    }
}

fn is_container(name: &[u8]) -> bool {
    matches!(name, b"w:body" | b"w:hdr" | b"w:ftr")
}

fn is_wrapper(name: &[u8]) -> bool {
    matches!(name, b"w:sdt" | b"w:sdtContent" | b"w:customXml")
}

/// Build the tree of `part`, allocating its paragraphs in `arena`
///
/// Replaces `part.slots` with the `w:t` slots owned by modelled runs.
pub(crate) fn build(
    part: &mut XmlPart,
    part_index: usize,
    arena: &mut Vec<Paragraph>,
) -> Result<PartTree, DocxError> {
    let XmlPart {
        name,
        events,
        slots,
    } = part;
    slots.clear();

    let mut builder = Builder {
        part_index,
        part_name: name.as_str(),
        arena,
        slots,
        stack: Vec::new(),
        content: None,
        sections: Vec::new(),
        section_depth: 0,
        current_section: SectionRefs::default(),
    };

    for (index, event) in events.iter().enumerate() {
        match event {
            Event::Start(start) => builder.open(index, start)?,
            Event::Empty(start) => {
                builder.open(index, start)?;
                builder.close(index, start.name().as_ref());
            }
            Event::End(end) => builder.close(index, end.name().as_ref()),
            Event::Text(_) | Event::CData(_) => builder.text(event)?,
            _ => {}
        }
    }

    Ok(PartTree {
        content: builder.content.unwrap_or_default(),
        sections: builder.sections,
    })
}

struct Builder<'a> {
    part_index: usize,
    part_name: &'a str,
    arena: &'a mut Vec<Paragraph>,
    slots: &'a mut Vec<TextSlot>,
    stack: Vec<Frame>,
    content: Option<Content>,
    sections: Vec<SectionRefs>,
    section_depth: usize,
    current_section: SectionRefs,
}

impl Builder<'_> {
    /// Nearest enclosing frame that is not a transparent wrapper
    fn parent_kind(&self) -> Option<Kind> {
        self.stack
            .iter()
            .rev()
            .find(|frame| !matches!(frame, Frame::Wrapper))
            .map(Frame::kind)
    }

    fn parent_mut(&mut self) -> Option<&mut Frame> {
        self.stack
            .iter_mut()
            .rev()
            .find(|frame| !matches!(frame, Frame::Wrapper))
    }

    fn open(&mut self, index: usize, start: &BytesStart<'_>) -> Result<(), DocxError> {
        let qname = start.name();
        let name = qname.as_ref();
        self.track_section(name, start)?;

        let frame = match (self.parent_kind(), name) {
            (None | Some(Kind::Root), n) if is_container(n) => Frame::Container(Content::default()),
            (None, _) => Frame::Root,
            (Some(Kind::Container | Kind::Cell), b"w:p") => self.open_paragraph(),
            (Some(Kind::Container | Kind::Cell), b"w:tbl") => Frame::Table(Table::default()),
            (Some(Kind::Container | Kind::Cell | Kind::Table | Kind::Row), n) if is_wrapper(n) => {
                Frame::Wrapper
            }
            (Some(Kind::Table), b"w:tr") => Frame::Row(Row::default()),
            (Some(Kind::Row), b"w:tc") => Frame::Cell(Cell::default()),
            (Some(Kind::Paragraph), b"w:r") => Frame::Run {
                text: String::new(),
                slots: Vec::new(),
            },
            (Some(Kind::Run), b"w:t") => self.open_text(index),
            (Some(Kind::Run), b"w:tab") => self.open_char(index, '\t'),
            (Some(Kind::Run), b"w:cr") => self.open_char(index, '\n'),
            (Some(Kind::Run), b"w:br") if self.is_line_break(start)? => {
                self.open_char(index, '\n')
            }
            _ => Frame::Opaque,
        };

        self.stack.push(frame);
        Ok(())
    }

    fn open_paragraph(&mut self) -> Frame {
        let id = ParagraphId(self.arena.len());
        self.arena.push(Paragraph::in_part(self.part_index));
        match self.parent_mut() {
            Some(Frame::Container(content)) => content.paragraphs.push(id),
            Some(Frame::Cell(cell)) => cell.paragraphs.push(id),
            _ => {}
        }
        Frame::Paragraph(id)
    }

    fn open_text(&mut self, index: usize) -> Frame {
        let slot = self.push_slot(index, SlotKind::Text);
        Frame::Text {
            slot,
            text: String::new(),
        }
    }

    fn open_char(&mut self, index: usize, ch: char) -> Frame {
        let slot = self.push_slot(index, SlotKind::Char(ch));
        if let Some(Frame::Run { text, .. }) = self.parent_mut() {
            text.push(ch);
        }
        Frame::Char { slot }
    }

    fn push_slot(&mut self, index: usize, kind: SlotKind) -> usize {
        let slot = self.slots.len();
        self.slots.push(TextSlot {
            open: index,
            close: index,
            kind,
        });
        if let Some(Frame::Run { slots, .. }) = self.parent_mut() {
            slots.push(slot);
        }
        slot
    }

    /// `w:br` without a type, or of type `textWrapping`
    fn is_line_break(&self, start: &BytesStart<'_>) -> Result<bool, DocxError> {
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(self.part_name, e))?;
            if attr.key.local_name().as_ref() == b"type" {
                return Ok(&*attr.value == b"textWrapping");
            }
        }
        Ok(true)
    }

    fn close(&mut self, index: usize, name: &[u8]) {
        if name == b"w:sectPr" {
            self.end_section();
        }

        let Some(frame) = self.stack.pop() else {
            return;
        };

        match frame {
            Frame::Container(content) => match self.content.as_mut() {
                Some(existing) => {
                    existing.paragraphs.extend(content.paragraphs);
                    existing.tables.extend(content.tables);
                }
                None => self.content = Some(content),
            },
            Frame::Table(table) => match self.parent_mut() {
                Some(Frame::Container(content)) => content.tables.push(table),
                Some(Frame::Cell(cell)) => cell.tables.push(table),
                _ => {}
            },
            Frame::Row(row) => {
                if let Some(Frame::Table(table)) = self.parent_mut() {
                    table.rows.push(row);
                }
            }
            Frame::Cell(cell) => {
                if let Some(Frame::Row(row)) = self.parent_mut() {
                    row.cells.push(cell);
                }
            }
            Frame::Run { text, slots } => {
                let paragraph = match self.parent_mut() {
                    Some(Frame::Paragraph(id)) => Some(*id),
                    _ => None,
                };
                if let Some(id) = paragraph {
                    self.arena[id.0].push_run(Run::with_slots(text, slots));
                }
            }
            Frame::Text { slot, text } => {
                self.slots[slot].close = index;
                if let Some(Frame::Run { text: run_text, .. }) = self.parent_mut() {
                    run_text.push_str(&text);
                }
            }
            Frame::Char { slot } => self.slots[slot].close = index,
            Frame::Root | Frame::Wrapper | Frame::Paragraph(_) | Frame::Opaque => {}
        }
    }

    fn text(&mut self, event: &Event<'_>) -> Result<(), DocxError> {
        if let Some(Frame::Text { text, .. }) = self.stack.last_mut() {
            append_text(self.part_name, event, text)?;
        }
        Ok(())
    }

    fn track_section(&mut self, name: &[u8], start: &BytesStart<'_>) -> Result<(), DocxError> {
        match name {
            b"w:sectPr" => {
                self.section_depth += 1;
                if self.section_depth == 1 {
                    self.current_section = SectionRefs::default();
                }
            }
            b"w:headerReference" if self.section_depth == 1 => self.record_reference(start, true)?,
            b"w:footerReference" if self.section_depth == 1 => self.record_reference(start, false)?,
            _ => {}
        }
        Ok(())
    }

    fn end_section(&mut self) {
        // A nested w:sectPr (inside w:sectPrChange) is revision history
        if self.section_depth == 1 {
            self.sections.push(std::mem::take(&mut self.current_section));
        }
        self.section_depth = self.section_depth.saturating_sub(1);
    }

    fn record_reference(&mut self, start: &BytesStart<'_>, header: bool) -> Result<(), DocxError> {
        let mut kind = String::from("default");
        let mut rid = None;
        for attr in start.attributes() {
            let attr = attr.map_err(|e| xml_error(self.part_name, e))?;
            let value = attr
                .unescape_value()
                .map_err(|e| xml_error(self.part_name, e))?
                .into_owned();
            match attr.key.local_name().as_ref() {
                b"type" => kind = value,
                b"id" => rid = Some(value),
                _ => {}
            }
        }

        let Some(rid) = rid else {
            return Ok(());
        };
        let refs = &mut self.current_section;
        let target = match (header, kind.as_str()) {
            (true, "first") => &mut refs.first_page_header,
            (true, "even") => &mut refs.even_page_header,
            (true, _) => &mut refs.header,
            (false, "first") => &mut refs.first_page_footer,
            (false, "even") => &mut refs.even_page_footer,
            (false, _) => &mut refs.footer,
        };
        *target = Some(rid);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    fn build_xml(xml: &str) -> (PartTree, XmlPart, Vec<Paragraph>) {
        let mut part = XmlPart::parse("word/document.xml", xml.as_bytes()).unwrap();
        let mut arena = Vec::new();
        let tree = build(&mut part, 0, &mut arena).unwrap();
        (tree, part, arena)
    }

    fn runs(arena: &[Paragraph], id: ParagraphId) -> Vec<&str> {
        arena[id.0].runs().iter().map(Run::text).collect()
    }

    #[test]
    fn test_body_paragraphs_and_runs() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
<w:p><w:r><w:rPr><w:b/></w:rPr><w:t>Hola </w:t></w:r><w:r><w:t>{{{{NOMBRE}}}}</w:t></w:r></w:p>
<w:p/>
</w:body></w:document>"#
        );
        let (tree, part, arena) = build_xml(&xml);
        assert_eq!(tree.content.paragraphs.len(), 2);
        assert_eq!(runs(&arena, tree.content.paragraphs[0]), vec!["Hola ", "{{NOMBRE}}"]);
        assert!(arena[tree.content.paragraphs[1].0].runs().is_empty());
        assert_eq!(part.slots.len(), 2);
    }

    #[test]
    fn test_run_text_concatenates_text_elements() {
        let xml = format!(
            r#"<w:document {NS}><w:body><w:p><w:r><w:t>{{{{NOM</w:t><w:t>BRE}}}}</w:t><w:t/></w:r></w:p></w:body></w:document>"#
        );
        let (tree, part, arena) = build_xml(&xml);
        let run = &arena[tree.content.paragraphs[0].0].runs()[0];
        assert_eq!(run.text(), "{{NOMBRE}}");
        assert_eq!(run.slots, vec![0, 1, 2]);
        let empty = part.slots[2];
        assert_eq!(empty.open, empty.close);
    }

    #[test]
    fn test_tabs_and_line_breaks_are_run_text() {
        let xml = format!(
            r#"<w:document {NS}><w:body><w:p><w:r><w:t>{{{{NOM</w:t><w:tab/><w:t>BRE}}}}</w:t><w:br/><w:t>a</w:t><w:cr/><w:br w:type="textWrapping"></w:br><w:br w:type="page"/><w:t>b</w:t></w:r></w:p></w:body></w:document>"#
        );
        let (tree, part, arena) = build_xml(&xml);
        let run = &arena[tree.content.paragraphs[0].0].runs()[0];
        assert_eq!(run.text(), "{{NOM\tBRE}}\na\n\nb");
        assert_eq!(run.slots, vec![0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(part.slots[1].kind, SlotKind::Char('\t'));
        assert_eq!(part.slots[2].kind, SlotKind::Text);

        let wrapping = part.slots[6];
        assert_eq!(wrapping.kind, SlotKind::Char('\n'));
        assert_eq!(wrapping.close, wrapping.open + 1);
    }

    #[test]
    fn test_tables_rows_cells_and_nesting() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
<w:tbl><w:tblPr/><w:tr><w:tc><w:tcPr/><w:p><w:r><w:t>A</w:t></w:r></w:p>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>inner</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:tc><w:tc><w:p><w:r><w:t>B</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:body></w:document>"#
        );
        let (tree, _, arena) = build_xml(&xml);
        assert!(tree.content.paragraphs.is_empty());
        let table = &tree.content.tables[0];
        let row = &table.rows[0];
        assert_eq!(row.cells.len(), 2);
        assert_eq!(runs(&arena, row.cells[0].paragraphs[0]), vec!["A"]);
        assert_eq!(runs(&arena, row.cells[1].paragraphs[0]), vec!["B"]);

        let nested = &row.cells[0].tables[0];
        assert_eq!(runs(&arena, nested.rows[0].cells[0].paragraphs[0]), vec!["inner"]);
    }

    #[test]
    fn test_block_wrappers_are_transparent() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
<w:sdt><w:sdtPr><w:alias w:val="x"/></w:sdtPr><w:sdtContent><w:p><w:r><w:t>inside</w:t></w:r></w:p></w:sdtContent></w:sdt>
</w:body></w:document>"#
        );
        let (tree, _, arena) = build_xml(&xml);
        assert_eq!(tree.content.paragraphs.len(), 1);
        assert_eq!(runs(&arena, tree.content.paragraphs[0]), vec!["inside"]);
    }

    #[test]
    fn test_only_direct_runs_are_modelled() {
        let xml = format!(
            r#"<w:document {NS}><w:body><w:p>
<w:r><w:t>direct</w:t></w:r>
<w:hyperlink r:id="rId9"><w:r><w:t>linked</w:t></w:r></w:hyperlink>
<w:r><w:drawing><w:txbxContent><w:p><w:r><w:t>textbox</w:t></w:r></w:p></w:txbxContent></w:drawing></w:r>
</w:p></w:body></w:document>"#
        );
        let (tree, part, arena) = build_xml(&xml);
        assert_eq!(tree.content.paragraphs.len(), 1);
        assert_eq!(arena.len(), 1);
        assert_eq!(runs(&arena, tree.content.paragraphs[0]), vec!["direct", ""]);
        assert_eq!(part.slots.len(), 1);
    }

    #[test]
    fn test_section_references() {
        let xml = format!(
            r#"<w:document {NS}><w:body>
<w:p><w:pPr><w:sectPr><w:headerReference w:type="default" r:id="rId1"/></w:sectPr></w:pPr></w:p>
<w:sectPr>
  <w:headerReference w:type="first" r:id="rId2"/>
  <w:footerReference w:type="default" r:id="rId3"/>
  <w:footerReference w:type="even" r:id="rId4"/>
  <w:sectPrChange><w:sectPr><w:headerReference w:type="default" r:id="rId99"/></w:sectPr></w:sectPrChange>
</w:sectPr>
</w:body></w:document>"#
        );
        let (tree, _, _) = build_xml(&xml);
        assert_eq!(tree.sections.len(), 2);
        assert_eq!(tree.sections[0].header.as_deref(), Some("rId1"));
        assert_eq!(tree.sections[1].header, None);
        assert_eq!(tree.sections[1].first_page_header.as_deref(), Some("rId2"));
        assert_eq!(tree.sections[1].footer.as_deref(), Some("rId3"));
        assert_eq!(tree.sections[1].even_page_footer.as_deref(), Some("rId4"));
    }

    #[test]
    fn test_empty_section_properties() {
        let xml = format!(r#"<w:document {NS}><w:body><w:sectPr/></w:body></w:document>"#);
        let (tree, _, _) = build_xml(&xml);
        assert_eq!(tree.sections, vec![SectionRefs::default()]);
    }

    #[test]
    fn test_header_part_root_container() {
        let xml = format!(r#"<w:hdr {NS}><w:p><w:r><w:t>{{{{DEMANDA_ID}}}}</w:t></w:r></w:p></w:hdr>"#);
        let mut part = XmlPart::parse("word/header1.xml", xml.as_bytes()).unwrap();
        let mut arena = vec![Paragraph::default()];
        let tree = build(&mut part, 3, &mut arena).unwrap();
        let id = tree.content.paragraphs[0];
        assert_eq!(id.index(), 1);
        assert_eq!(arena[1].part, 3);
        assert!(tree.sections.is_empty());
    }
}
