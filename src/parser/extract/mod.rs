pub mod abilities;
pub mod appearances;
pub mod evolution;
pub mod infobox;
pub mod moves;
pub mod narrative;
pub mod profile;
pub mod stats;

use scraper::ElementRef;

use super::blocks::{descendants_named, first_named, next_sibling_named, parent, text_of, Blocks};
use crate::config::Anchor;
use crate::error::{ExtractError, Result};

/// Element matching `anchor`, or an anchor-not-found error for `field`.
pub fn locate<'a>(blocks: &Blocks<'a>, anchor: &Anchor, field: &'static str) -> Result<ElementRef<'a>> {
    blocks
        .find_el(anchor)
        .ok_or_else(|| ExtractError::anchor(field, anchor))
}

/// Infobox layout: `<b><a title=…>Label</a></b><table>…</table>`. The value
/// table is the next `table` sibling of the label's parent.
pub fn sibling_table(label: ElementRef) -> Option<ElementRef> {
    parent(label).and_then(|p| next_sibling_named(p, "table"))
}

/// First `table` after the anchor's parent heading, in source order.
pub fn table_after<'a>(blocks: &Blocks<'a>, anchor: ElementRef<'a>) -> Option<ElementRef<'a>> {
    let from = parent(anchor).unwrap_or(anchor);
    blocks.next_named_after(from, "table")
}

/// Data cells of a row.
pub fn cells(row: ElementRef) -> Vec<ElementRef> {
    descendants_named(row, "td")
}

/// A row that only wraps another table.
pub fn is_container_row(row: ElementRef) -> bool {
    first_named(row, "table").is_some()
}

/// Text of the first `span` inside a cell, or the whole cell.
pub fn span_or_text(cell: ElementRef) -> String {
    first_named(cell, "span")
        .map(text_of)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| text_of(cell))
}

// ── Tests ──
