//! Text cleanup shared by every extractor. All functions are pure and
//! idempotent: cleaning already-clean text returns it unchanged.

use std::sync::LazyLock;

use regex::Regex;

/// Footnote markers: digit runs, optionally bracketed (`[12]` or bare `12`).
static FOOTNOTE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[\d+\]|\d+").unwrap());
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

const NO_BREAK_SPACE: char = '\u{a0}';
const INVISIBLES: &[char] = &['\u{2060}', '\u{200d}', '\u{200b}', '\u{feff}'];

/// Collapse every whitespace run to one space and trim the ends.
pub fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// No-break spaces become plain spaces; zero-width joiners are dropped.
pub fn replace_invisibles(s: &str) -> String {
    s.replace(NO_BREAK_SPACE, " ").replace(INVISIBLES, "")
}

pub fn strip_footnotes(s: &str) -> String {
    FOOTNOTE_RE.replace_all(s, "").into_owned()
}

/// Cleanup for labels and table cells: invisibles removed, whitespace collapsed.
pub fn clean_inline(s: &str) -> String {
    collapse_ws(&replace_invisibles(s))
}

/// Cleanup for narrative text: inline cleanup plus footnote stripping.
/// Whitespace is collapsed last so removed markers leave no double spaces.
pub fn clean_narrative(s: &str) -> String {
    collapse_ws(&strip_footnotes(&replace_invisibles(s)))
}

/// Join paragraphs with single spaces and clean the result as one block.
pub fn join_paragraphs<S: AsRef<str>>(paragraphs: &[S]) -> String {
    let joined = paragraphs
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    clean_narrative(&joined)
}

/// Clean each paragraph on its own, dropping the ones left empty.
pub fn paragraph_list<S: AsRef<str>>(paragraphs: &[S]) -> Vec<String> {
    paragraphs
        .iter()
        .map(|p| clean_narrative(p.as_ref()))
        .filter(|p| !p.is_empty())
        .collect()
}

/// First digit run of a display token, with zero padding removed
/// (`"040"` → 40, `"000"` → 0, `"30 (max. 48)"` → 30). A run too large for
/// a `u32` yields `None`.
pub fn leading_number(s: &str) -> Option<u32> {
    let digits = LEADING_NUMBER_RE.find(s)?.as_str().trim_start_matches('0');
    if digits.is_empty() {
        Some(0)
    } else {
        digits.parse().ok()
    }
}

/// Drop empty strings and later duplicates, keeping first-seen order.
pub fn dedup_ordered<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !item.is_empty() && !out.contains(&item) {
            out.push(item);
        }
    }
    out
}
