//! Annotation files and the patristic source table.
//!
//! Study, liturgical, variant and citation notes share one layout: a `div`
//! per note (`footnotedef` or `footnotepara`) whose id is the annotation id
//! and whose first link points back to the verse, labelled with the verse
//! reference (`1:1`, `1:1-3`).

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::articles::linked_verses;
use crate::dom::{ArenaDom, outer_html, parse_html};
use crate::model::{Annotation, AnnotationKind, PatristicSource};
use crate::text::{clean_text, styled_text};

static PARENTHESISED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^)]+)\)").expect("valid regex"));
static CITATION_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[,;\s]+").expect("valid regex"));

/// Words that appear between source abbreviations inside parentheses.
const FILLER_WORDS: &[&str] = &["and", "or", "cf", "cf.", "see", "also"];

const TABLE_HEADER: &str = "Source";

/// Container classes of one note, by kind.
fn note_classes(kind: AnnotationKind) -> &'static [&'static str] {
    match kind {
        AnnotationKind::Citation => &["footnotedef"],
        _ => &["footnotedef", "footnotepara"],
    }
}

/// Parse one note file into annotations of `kind`, in document order.
///
/// `is_known_source` decides which parenthesised tokens count as patristic
/// citations. Notes without an id are skipped. The returned annotations have
/// no passage ids yet; verses attach themselves during segmentation.
pub fn parse_notes<F>(html: &str, kind: AnnotationKind, is_known_source: F) -> Vec<Annotation>
where
    F: Fn(&str) -> bool,
{
    let dom = parse_html(html);
    notes_from_dom(&dom, kind, is_known_source)
}

pub fn notes_from_dom<F>(dom: &ArenaDom, kind: AnnotationKind, is_known_source: F) -> Vec<Annotation>
where
    F: Fn(&str) -> bool,
{
    let classes = note_classes(kind);
    let no_pruning = HashSet::new();
    let mut notes = Vec::new();

    for div in dom.find_all_tags(dom.document(), "div") {
        if !classes.iter().any(|c| dom.has_class(div, c)) {
            continue;
        }
        let Some(id) = dom.element_id(div) else {
            continue;
        };

        let verse_display = dom
            .descendants(div)
            .find(|&n| dom.is_tag(n, "a"))
            .map(|a| clean_text(&dom.plain_text(a)))
            .unwrap_or_default();

        notes.push(Annotation {
            id: id.to_string(),
            kind,
            passage_ids: Vec::new(),
            verse_display,
            text: clean_text(&styled_text(dom, div, &no_pruning)),
            html: outer_html(dom, div),
            patristic_citations: patristic_citations(&dom.plain_text(div), &is_known_source),
            scripture_refs: linked_verses(dom, div),
        });
    }
    notes
}

/// Known source abbreviations cited in parentheses, e.g. `(BasilG)` or
/// `(JohnChr, Aug)`, deduplicated in first-seen order.
pub fn patristic_citations<F>(text: &str, is_known_source: F) -> Vec<String>
where
    F: Fn(&str) -> bool,
{
    let mut found: Vec<String> = Vec::new();
    for caps in PARENTHESISED.captures_iter(text) {
        let Some(inner) = caps.get(1) else {
            continue;
        };
        for part in CITATION_SEPARATOR.split(inner.as_str()) {
            let part = part.trim();
            if part.is_empty() || FILLER_WORDS.contains(&part.to_lowercase().as_str()) {
                continue;
            }
            if is_known_source(part) && !found.iter().any(|f| f == part) {
                found.push(part.to_string());
            }
        }
    }
    found
}

/// Parse the source abbreviation table: name in the first cell, abbreviation
/// in the second. Header and incomplete rows are skipped; a repeated
/// abbreviation keeps its first row.
pub fn parse_patristic_table(html: &str) -> Vec<PatristicSource> {
    let dom = parse_html(html);
    let mut sources: Vec<PatristicSource> = Vec::new();

    for row in dom.find_all_tags(dom.document(), "tr") {
        let cells = dom.find_all_tags(row, "td");
        let [name_cell, abbrev_cell, ..] = cells.as_slice() else {
            continue;
        };
        let name = clean_text(&dom.plain_text(*name_cell));
        let abbrev = clean_text(&dom.plain_text(*abbrev_cell));
        if name.is_empty() || abbrev.is_empty() || name == TABLE_HEADER {
            continue;
        }
        if sources.iter().any(|s| s.id == abbrev) {
            continue;
        }
        sources.push(PatristicSource { id: abbrev, name });
    }
    sources
}
