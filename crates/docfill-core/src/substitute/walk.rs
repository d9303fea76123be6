//! Paragraph visiting order

use crate::docx::{Content, Document, ParagraphId, Table};

/// Every paragraph the engine rewrites, in visiting order
///
/// Body paragraphs, then body tables; then for each section its header/footer
/// parts, each as paragraphs followed by tables. Tables nested inside a cell
/// are visited one level deep.
pub fn paragraph_order(document: &Document) -> Vec<ParagraphId> {
    let mut order = Vec::new();

    push_content(&mut order, document.body());
    for section in document.sections() {
        for header_footer in section.header_footers() {
            push_content(&mut order, &header_footer.content);
        }
    }

    order
}

fn push_content(order: &mut Vec<ParagraphId>, content: &Content) {
    order.extend_from_slice(&content.paragraphs);
    for table in &content.tables {
        push_table(order, table, true);
    }
}

fn push_table(order: &mut Vec<ParagraphId>, table: &Table, descend: bool) {
    for row in &table.rows {
        for cell in &row.cells {
            order.extend_from_slice(&cell.paragraphs);
            if descend {
                for nested in &cell.tables {
                    push_table(order, nested, false);
                }
            }
        }
    }
}
