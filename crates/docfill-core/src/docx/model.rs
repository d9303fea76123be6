//! Document tree types

/// Index of a paragraph in the document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParagraphId(pub(crate) usize);

impl ParagraphId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable address of a run: (paragraph, position within the paragraph)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunRef {
    pub paragraph: ParagraphId,
    pub run: usize,
}

/// Smallest styled text unit. Styling stays in the package and is never
/// visible here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Run {
    text: String,
    /// Indices of this run's `w:t` slots in the owning part
    pub(crate) slots: Vec<usize>,
    modified: bool,
}

impl Run {
    /// A run that is not backed by any package part
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            slots: Vec::new(),
            modified: false,
        }
    }

    pub(crate) fn with_slots(text: String, slots: Vec<usize>) -> Self {
        Self {
            text,
            slots,
            modified: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the run's text; a no-op when the text is unchanged
    pub fn set_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.text {
            self.text = text;
            self.modified = true;
        }
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

/// An ordered sequence of runs
#[derive(Debug, Clone, Default)]
pub struct Paragraph {
    /// Index of the part this paragraph was parsed from
    pub(crate) part: usize,
    runs: Vec<Run>,
}

impl Paragraph {
    pub(crate) fn in_part(part: usize) -> Self {
        Self {
            part,
            runs: Vec::new(),
        }
    }

    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self { part: 0, runs }
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> &mut [Run] {
        &mut self.runs
    }

    pub(crate) fn push_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    /// Concatenated text of all runs
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::text).collect()
    }
}

/// Paragraphs and tables of a body, header or footer
#[derive(Debug, Clone, Default)]
pub struct Content {
    pub paragraphs: Vec<ParagraphId>,
    pub tables: Vec<Table>,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    pub rows: Vec<Row>,
}

#[derive(Debug, Clone, Default)]
pub struct Row {
    pub cells: Vec<Cell>,
}

#[derive(Debug, Clone, Default)]
pub struct Cell {
    pub paragraphs: Vec<ParagraphId>,
    /// Tables nested directly inside this cell
    pub tables: Vec<Table>,
}

/// A header or footer part
#[derive(Debug, Clone)]
pub struct HeaderFooter {
    /// Package entry the content was parsed from (e.g. `word/header1.xml`)
    pub part_name: String,
    pub content: Content,
}

/// Header/footer set owned by one `w:sectPr`
///
/// A variant is `None` when the section has no reference of that type or
/// when the referenced part already belongs to an earlier section.
#[derive(Debug, Clone, Default)]
pub struct Section {
    pub header: Option<HeaderFooter>,
    pub footer: Option<HeaderFooter>,
    pub first_page_header: Option<HeaderFooter>,
    pub first_page_footer: Option<HeaderFooter>,
    pub even_page_header: Option<HeaderFooter>,
    pub even_page_footer: Option<HeaderFooter>,
}

impl Section {
    /// Present header/footer parts: default header, default footer, then the
    /// first-page and even-page variants
    pub fn header_footers(&self) -> impl Iterator<Item = &HeaderFooter> {
        [
            &self.header,
            &self.footer,
            &self.first_page_header,
            &self.first_page_footer,
            &self.even_page_header,
            &self.even_page_footer,
        ]
        .into_iter()
        .flatten()
    }
}

/// Counts of structural elements, used to check that substitution never
/// changes the shape of a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DocumentStats {
    pub paragraphs: usize,
    pub tables: usize,
    pub rows: usize,
    pub cells: usize,
    pub runs: usize,
}

impl DocumentStats {
    pub(crate) fn add_content(&mut self, content: &Content, arena: &[Paragraph]) {
        self.add_paragraphs(&content.paragraphs, arena);
        for table in &content.tables {
            self.add_table(table, arena);
        }
    }

    fn add_table(&mut self, table: &Table, arena: &[Paragraph]) {
        self.tables += 1;
        for row in &table.rows {
            self.rows += 1;
            for cell in &row.cells {
                self.cells += 1;
                self.add_paragraphs(&cell.paragraphs, arena);
                for nested in &cell.tables {
                    self.add_table(nested, arena);
                }
            }
        }
    }

    fn add_paragraphs(&mut self, ids: &[ParagraphId], arena: &[Paragraph]) {
        self.paragraphs += ids.len();
        self.runs += ids.iter().map(|id| arena[id.0].runs().len()).sum::<usize>();
    }
}
