//! Marker collection and marker stripping for one book file.
//!
//! Per file the phases run in a fixed order: markers are collected with
//! their positional context, presentation-only markers are then recorded in
//! an [`IgnoreSet`], and only after that are verses segmented. Nothing is
//! removed from the DOM; segmentation simply skips the ignored subtrees.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::ids::{classify_href, is_strippable_marker, is_verse_id};
use crate::model::{AnnotationMarker, MarkerKind};
use crate::walk::{nearest_preceding, preceding_text};

/// Markers grouped by the verse they belong to, each list in document order.
pub type MarkersByVerse = HashMap<String, Vec<AnnotationMarker>>;

/// Collect every annotation marker in the document.
///
/// A marker belongs to the nearest verse anchor before it; markers with no
/// verse anchor before them (introductions, front matter) are dropped.
pub fn collect_markers(dom: &ArenaDom, window: usize) -> MarkersByVerse {
    let mut by_verse: MarkersByVerse = HashMap::new();
    let mut dropped = 0usize;

    for link in dom.descendants(dom.document()) {
        if !dom.is_tag(link, "a") {
            continue;
        }
        let Some((kind, marker_id)) = dom.get_attr(link, "href").and_then(classify_href) else {
            continue;
        };

        let verse = nearest_preceding(dom, link, |id| dom.element_id(id).is_some_and(is_verse_id))
            .and_then(|id| dom.element_id(id));
        let Some(verse) = verse else {
            dropped += 1;
            continue;
        };

        by_verse
            .entry(verse.to_string())
            .or_default()
            .push(AnnotationMarker {
                id: marker_id.to_string(),
                kind,
                preceding: preceding_text(dom, link, window),
            });
    }

    if dropped > 0 {
        debug!(dropped, "markers without a preceding verse anchor");
    }
    by_verse
}

/// Ids of markers of `kind` attached to `verse_id`, in document order.
pub fn marker_ids(markers: &MarkersByVerse, verse_id: &str, kind: MarkerKind) -> Vec<String> {
    markers
        .get(verse_id)
        .map(|list| {
            list.iter()
                .filter(|m| m.kind == kind)
                .map(|m| m.id.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// Subtrees excluded from verse text and verse reference scans.
#[derive(Debug, Default, Clone)]
pub struct IgnoreSet(HashSet<ArenaNodeId>);

impl IgnoreSet {
    pub fn contains(&self, id: ArenaNodeId) -> bool {
        self.0.contains(&id)
    }

    pub fn as_set(&self) -> &HashSet<ArenaNodeId> {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Record the single-letter variant and reference markers.
///
/// When a marker link sits directly in a `sup`, the whole `sup` is ignored
/// so its brackets or spacing do not leak either.
pub fn strip_markers(dom: &ArenaDom) -> IgnoreSet {
    let mut ignored = HashSet::new();
    for link in dom.descendants(dom.document()) {
        if !dom.is_tag(link, "a") {
            continue;
        }
        let Some(href) = dom.get_attr(link, "href") else {
            continue;
        };
        if !is_strippable_marker(href, &dom.plain_text(link)) {
            continue;
        }
        let target = match dom.parent(link) {
            Some(parent) if dom.is_tag(parent, "sup") => parent,
            _ => link,
        };
        ignored.insert(target);
    }
    IgnoreSet(ignored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::text::styled_text;

    const PSALM: &str = r#"<html><body>
        <p class="tx1"><span id="Gen_vchap1-1"></span>In the beginning God<a href="study1.html#f1">&#8224;</a>
        created<sup><a href="variant.html#fvar1">a</a></sup> the heavens<sup><a href="crossReference.html#fcross1">b</a></sup>
        and the earth.<a href="x-liturgical.html#fx1">&#969;</a></p>
        <p class="tx"><span id="Gen_vchap1-2"></span>The earth was<a href="citation.html#fcit1">c</a> void.</p>
        </body></html>"#;

    #[test]
    fn test_collect_groups_by_verse_in_document_order() {
        let dom = parse_html(PSALM);
        let markers = collect_markers(&dom, 40);

        let first = &markers["Gen_vchap1-1"];
        let kinds: Vec<_> = first.iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MarkerKind::Study,
                MarkerKind::Variant,
                MarkerKind::CrossRef,
                MarkerKind::Liturgical
            ]
        );
        assert_eq!(first[0].id, "f1");
        assert_eq!(first[0].preceding, "In the beginning God");

        let second = &markers["Gen_vchap1-2"];
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].id, "fcit1");
        assert!(second[0].preceding.ends_with("the earth.The earth was"));
    }

    #[test]
    fn test_marker_windows_are_bounded() {
        let dom = parse_html(PSALM);
        for list in collect_markers(&dom, 40).values() {
            for marker in list {
                assert!(marker.preceding.chars().count() <= 40);
            }
        }
    }

    #[test]
    fn test_marker_ids_by_kind() {
        let dom = parse_html(PSALM);
        let markers = collect_markers(&dom, 40);
        assert_eq!(
            marker_ids(&markers, "Gen_vchap1-1", MarkerKind::Variant),
            vec!["fvar1"]
        );
        assert!(marker_ids(&markers, "Gen_vchap9-9", MarkerKind::Variant).is_empty());
    }

    #[test]
    fn test_orphan_markers_are_dropped() {
        let dom = parse_html(
            r#"<p>Introduction<a href="study1.html#f1">&#8224;</a></p>
               <p><span id="Gen_vchap1-1"></span>x</p>"#,
        );
        assert!(collect_markers(&dom, 40).is_empty());
    }

    #[test]
    fn test_strip_marks_variant_and_letter_refs() {
        let dom = parse_html(PSALM);
        let ignored = strip_markers(&dom);
        assert_eq!(ignored.len(), 2);

        let p = dom.find(|id| dom.is_tag(id, "p")).unwrap();
        let text = styled_text(&dom, p, ignored.as_set());
        assert!(text.contains("created the heavens"));
        assert!(!text.contains("createda"));
    }

    #[test]
    fn test_strip_keeps_word_links() {
        let dom = parse_html(
            r#"<p><span id="Gen_vchap1-1"></span>x<a href="crossReference.html#fcross2">see</a></p>"#,
        );
        assert!(strip_markers(&dom).is_empty());
    }
}
