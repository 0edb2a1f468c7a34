use scraper::ElementRef;
use tracing::debug;

use super::{cells, is_container_row, locate, span_or_text, table_after};
use crate::config::{Anchor, BisafansAnchors, BulbapediaAnchors};
use crate::error::{ExtractError, Result};
use crate::model::{Move, MoveList};
use crate::parser::blocks::{descendants_named, first_named, text_of, Blocks};
use crate::parser::text::leading_number;

/// Accuracy of moves that never miss or have no accuracy check.
pub const UNRATABLE_ACCURACY: u32 = 101;

const LEVEL_UP_COLUMNS: usize = 7;
const TECHNICAL_COLUMNS: usize = 8;
const DASHES: &[char] = &['—', '–', '‒', '―', '-'];

/// Level tokens: "Evo." is learned on evolution, "Rem." by the move reminder.
pub fn level(raw: &str) -> String {
    match raw.trim() {
        "Evo." => "0".to_string(),
        "Rem." => "999".to_string(),
        other => leading_number(other)
            .map(|n| n.to_string())
            .unwrap_or_else(|| other.to_string()),
    }
}

/// `"000"` and dashes mean no base power.
pub fn power(raw: &str) -> u32 {
    leading_number(raw).unwrap_or(0)
}

/// Percent without padding; dash glyphs and out-of-range values become
/// [`UNRATABLE_ACCURACY`].
pub fn accuracy(raw: &str) -> u32 {
    if raw.contains(DASHES) {
        return UNRATABLE_ACCURACY;
    }
    leading_number(raw).map_or(UNRATABLE_ACCURACY, canonical_accuracy)
}

pub fn canonical_accuracy(value: u32) -> u32 {
    if value > 100 {
        UNRATABLE_ACCURACY
    } else {
        value
    }
}

/// Rows missing a level, name, type or category are dropped.
fn complete(m: Move) -> Option<Move> {
    let fields = [&m.learned_at, &m.name, &m.move_type, &m.category];
    if fields.iter().any(|f| f.is_empty()) {
        debug!(field = "moves", name = %m.name, "skipping incomplete move row");
        return None;
    }
    Some(m)
}

/// Data rows of a move table. Container rows that only wrap the real table
/// are skipped; their nested rows are visited on their own.
fn data_rows(table: ElementRef) -> impl Iterator<Item = ElementRef> {
    descendants_named(table, "tr")
        .into_iter()
        .filter(|row| !is_container_row(*row))
}

pub fn english(blocks: &Blocks, anchors: &BulbapediaAnchors) -> Result<MoveList> {
    let heading = locate(blocks, &anchors.level_up, "moves")?;
    let level_up: Vec<Move> = table_after(blocks, heading)
        .map(|t| data_rows(t).filter_map(english_level_up_row).collect())
        .unwrap_or_default();

    // Not every creature can learn moves from machines.
    let technical: Vec<Move> = blocks
        .find_el(&anchors.technical)
        .and_then(|h| table_after(blocks, h))
        .map(|t| data_rows(t).filter_map(english_technical_row).collect())
        .unwrap_or_default();

    Ok(MoveList { level_up, technical })
}

fn english_level_up_row(row: ElementRef) -> Option<Move> {
    let cells = cells(row);
    if cells.len() < LEVEL_UP_COLUMNS {
        if !cells.is_empty() {
            debug!(field = "moves", cells = cells.len(), "skipping short level-up row");
        }
        return None;
    }
    complete(Move {
        learned_at: level(&span_or_text(cells[0])),
        name: text_of(cells[1]),
        move_type: text_of(cells[2]),
        category: text_of(cells[3]),
        power: power(&span_or_text(cells[4])),
        accuracy: accuracy(&span_or_text(cells[5])),
        pp: leading_number(&text_of(cells[6])).unwrap_or(0),
    })
}

fn english_technical_row(row: ElementRef) -> Option<Move> {
    let mut cells = cells(row);
    // Some rows repeat the machine id in an extra leading cell.
    if cells.len() > 2 && text_of(cells[1]) == text_of(cells[2]) {
        cells.remove(0);
    }
    if cells.len() < TECHNICAL_COLUMNS {
        if !cells.is_empty() {
            debug!(field = "moves", cells = cells.len(), "skipping short machine row");
        }
        return None;
    }
    complete(Move {
        learned_at: text_of(cells[1]),
        name: text_of(cells[2]),
        move_type: text_of(cells[3]),
        category: text_of(cells[4]),
        power: power(&span_or_text(cells[5])),
        accuracy: accuracy(&span_or_text(cells[6])),
        pp: leading_number(&text_of(cells[7])).unwrap_or(0),
    })
}

pub fn german(blocks: &Blocks, anchors: &BisafansAnchors) -> Result<MoveList> {
    if blocks.find(&anchors.level_up).is_none() && blocks.find(&anchors.technical).is_none() {
        return Err(ExtractError::anchor("moves", &anchors.level_up));
    }
    let level_up: Vec<Move> = german_table(blocks, anchors, &anchors.level_up)
        .into_iter()
        .map(|mut m| {
            m.learned_at = level(&m.learned_at);
            m
        })
        .collect();
    let technical = german_table(blocks, anchors, &anchors.technical);
    Ok(MoveList { level_up, technical })
}

/// Rows of the first table body after a move heading.
fn german_table(blocks: &Blocks, anchors: &BisafansAnchors, heading: &Anchor) -> Vec<Move> {
    let Some(body) = blocks
        .find(heading)
        .and_then(|i| blocks.following(i))
        .and_then(|el| first_named(el, "tbody"))
    else {
        return Vec::new();
    };
    descendants_named(body, "tr")
        .into_iter()
        .filter_map(|row| german_row(row, anchors))
        .collect()
}

fn german_row(row: ElementRef, anchors: &BisafansAnchors) -> Option<Move> {
    let cells = cells(row);
    if cells.len() < LEVEL_UP_COLUMNS {
        if !cells.is_empty() {
            debug!(field = "moves", cells = cells.len(), "skipping short move row");
        }
        return None;
    }
    let name = first_named(cells[1], "a")
        .map(text_of)
        .unwrap_or_else(|| text_of(cells[1]));
    let move_type = first_named(cells[2], "img").and_then(|img| img.value().attr("alt"));
    let category = first_named(cells[3], "img").and_then(|img| img.value().attr("title"));
    let (move_type, category) = match (move_type, category) {
        (Some(t), Some(c)) => (t.trim().to_string(), c.trim().to_string()),
        _ => (
            anchors.fallback_move_type.clone(),
            anchors.fallback_move_category.clone(),
        ),
    };
    complete(Move {
        learned_at: text_of(cells[0]),
        name,
        move_type,
        category,
        power: power(&text_of(cells[4])),
        accuracy: accuracy(&text_of(cells[5])),
        pp: leading_number(&text_of(cells[6])).unwrap_or(0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_tokens() {
        assert_eq!(level("Evo."), "0");
        assert_eq!(level("Rem."), "999");
        assert_eq!(level("01"), "1");
        assert_eq!(level("Start"), "Start");
    }

    #[test]
    fn accuracy_sentinels() {
        assert_eq!(accuracy("00—"), UNRATABLE_ACCURACY);
        assert_eq!(accuracy("—"), UNRATABLE_ACCURACY);
        assert_eq!(accuracy(""), UNRATABLE_ACCURACY);
        assert_eq!(accuracy("095"), 95);
        assert_eq!(accuracy("100%"), 100);
        assert_eq!(canonical_accuracy(999), UNRATABLE_ACCURACY);
    }

    #[test]
    fn power_padding() {
        assert_eq!(power("000"), 0);
        assert_eq!(power("040"), 40);
        assert_eq!(power("—"), 0);
    }

    #[test]
    fn duplicated_machine_column_shifts() {
        let doc = r#"<html><body><table>
            <tr><td>x</td><td>TM01</td><td>TM01</td><td>Mega Punch</td><td>Normal</td>
                <td>Physical</td><td>080</td><td>085</td><td>20</td></tr>
        </table></body></html>"#;
        let html = scraper::Html::parse_document(doc);
        let row = descendants_named(html.root_element(), "tr")[0];
        let m = english_technical_row(row).unwrap();
        assert_eq!(m.learned_at, "TM01");
        assert_eq!(m.name, "Mega Punch");
        assert_eq!(m.power, 80);
        assert_eq!(m.accuracy, 85);
        assert_eq!(m.pp, 20);
    }

    #[test]
    fn incomplete_rows_are_dropped() {
        let doc = r#"<html><body><table>
            <tr><td></td><td>Thunder Shock</td><td>Electric</td><td>Special</td>
                <td>040</td><td>100</td><td>30</td></tr>
            <tr><td>01</td><td></td><td>Electric</td><td>Special</td>
                <td>040</td><td>100</td><td>30</td></tr>
            <tr><td>01</td><td>Thunder Shock</td><td>Electric</td><td>Special</td>
                <td>040</td><td>100</td><td>30</td></tr>
        </table></body></html>"#;
        let html = scraper::Html::parse_document(doc);
        let rows: Vec<Move> = descendants_named(html.root_element(), "tr")
            .into_iter()
            .filter_map(english_level_up_row)
            .collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].learned_at, "1");
    }
}
