//! Backward walks through the DOM.
//!
//! Both walks visit previous siblings first, then climb to the parent and
//! continue with the parent's previous siblings, stopping at `body`, `html`
//! or the document root.

use crate::dom::{ArenaDom, ArenaNodeId};
use crate::text::clean_text;

/// Default size of the preceding-text window, in characters.
pub const PRECEDING_WINDOW: usize = 40;

/// A word break this close to the start of a truncated window is used to
/// drop the leading word fragment.
const WORD_TRIM_LIMIT: usize = 10;

fn is_walk_root(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    id == dom.document() || dom.is_tag(id, "body") || dom.is_tag(id, "html")
}

/// Nearest node before `start` in document order accepted by `predicate`.
///
/// `start` itself and its ancestors are candidates too, since an ancestor
/// precedes its content in document order.
pub fn nearest_preceding<F>(dom: &ArenaDom, start: ArenaNodeId, predicate: F) -> Option<ArenaNodeId>
where
    F: Fn(ArenaNodeId) -> bool,
{
    let mut current = start;
    loop {
        if predicate(current) {
            return Some(current);
        }
        let mut sibling = dom.prev_sibling(current);
        while let Some(sib) = sibling {
            if let Some(found) = last_match_in(dom, sib, &predicate) {
                return Some(found);
            }
            sibling = dom.prev_sibling(sib);
        }
        match dom.parent(current) {
            Some(parent) if !is_walk_root(dom, parent) => current = parent,
            _ => return None,
        }
    }
}

/// Last node of the subtree under `root` (document order) accepted by
/// `predicate`, `root` included.
fn last_match_in<F>(dom: &ArenaDom, root: ArenaNodeId, predicate: &F) -> Option<ArenaNodeId>
where
    F: Fn(ArenaNodeId) -> bool,
{
    let mut child = dom.last_child(root);
    while let Some(c) = child {
        if let Some(found) = last_match_in(dom, c, predicate) {
            return Some(found);
        }
        child = dom.prev_sibling(c);
    }
    predicate(root).then_some(root)
}

/// Up to `max_chars` characters of cleaned text immediately before `start`.
///
/// When the collected text is longer than the window it is cut to its last
/// `max_chars` characters; a space within the first few characters of the
/// cut then marks where the partial leading word is dropped.
pub fn preceding_text(dom: &ArenaDom, start: ArenaNodeId, max_chars: usize) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut collected = 0;
    let mut current = start;

    while collected < max_chars {
        let mut sibling = dom.prev_sibling(current);
        while let Some(sib) = sibling {
            if collected >= max_chars {
                break;
            }
            let text = collapse_whitespace(&dom.plain_text(sib));
            if !text.trim().is_empty() {
                collected += text.chars().count();
                parts.push(text);
            }
            sibling = dom.prev_sibling(sib);
        }
        match dom.parent(current) {
            Some(parent) if !is_walk_root(dom, parent) => current = parent,
            _ => break,
        }
    }

    parts.reverse();
    let cleaned = clean_text(&parts.concat());
    truncate_window(&cleaned, max_chars)
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn truncate_window(text: &str, max_chars: usize) -> String {
    let total = text.chars().count();
    if total <= max_chars {
        return text.to_string();
    }
    let tail: String = text.chars().skip(total - max_chars).collect();
    match tail.chars().position(|c| c == ' ') {
        Some(idx) if idx > 0 && idx < WORD_TRIM_LIMIT => tail.chars().skip(idx + 1).collect(),
        _ => tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;
    use crate::ids::is_verse_id;

    fn verse_before(dom: &ArenaDom, start: ArenaNodeId) -> Option<String> {
        nearest_preceding(dom, start, |id| dom.element_id(id).is_some_and(is_verse_id))
            .and_then(|id| dom.element_id(id))
            .map(str::to_string)
    }

    fn link(dom: &ArenaDom, href: &str) -> ArenaNodeId {
        dom.find(|id| dom.get_attr(id, "href") == Some(href))
            .expect("link present")
    }

    #[test]
    fn test_nearest_verse_in_same_paragraph() {
        let dom = parse_html(
            r#"<p><span id="Gen_vchap1-1"></span>In the beginning
               <span id="Gen_vchap1-2"></span>The earth was void<a href="study1.html#f2">&#8224;</a></p>"#,
        );
        let a = link(&dom, "study1.html#f2");
        assert_eq!(verse_before(&dom, a).as_deref(), Some("Gen_vchap1-2"));
    }

    #[test]
    fn test_nearest_verse_in_earlier_paragraph() {
        let dom = parse_html(
            r#"<p><span id="Gen_vchap1-1"></span>In the beginning</p>
               <p class="tx">God created<sup><a href="variant.html#fvar1">a</a></sup></p>"#,
        );
        let a = link(&dom, "variant.html#fvar1");
        assert_eq!(verse_before(&dom, a).as_deref(), Some("Gen_vchap1-1"));
    }

    #[test]
    fn test_verse_on_enclosing_list() {
        let dom = parse_html(
            r#"<ol id="Ps_vchap1-1"><li>Blessed is the man<a href="study4.html#f9">&#8224;</a></li></ol>"#,
        );
        let a = link(&dom, "study4.html#f9");
        assert_eq!(verse_before(&dom, a).as_deref(), Some("Ps_vchap1-1"));
    }

    #[test]
    fn test_nested_previous_sibling_prefers_last_match() {
        let dom = parse_html(
            r#"<div><p><span id="Gen_vchap1-1"></span>a<span id="Gen_vchap1-2"></span>b</p></div>
               <p>c<a href="study1.html#f5">&#8224;</a></p>"#,
        );
        let a = link(&dom, "study1.html#f5");
        assert_eq!(verse_before(&dom, a).as_deref(), Some("Gen_vchap1-2"));
    }

    #[test]
    fn test_no_verse_before_marker() {
        let dom = parse_html(
            r#"<p>Introduction<a href="study1.html#f1">&#8224;</a></p><p><span id="Gen_vchap1-1"></span>x</p>"#,
        );
        let a = link(&dom, "study1.html#f1");
        assert_eq!(verse_before(&dom, a), None);
    }

    #[test]
    fn test_preceding_text_short() {
        let dom = parse_html(
            r#"<p><span id="Gen_vchap1-1"></span>In the beginning God<a href="study1.html#f1">&#8224;</a> created</p>"#,
        );
        let a = link(&dom, "study1.html#f1");
        assert_eq!(preceding_text(&dom, a, PRECEDING_WINDOW), "In the beginning God");
    }

    #[test]
    fn test_preceding_text_crosses_elements() {
        let dom = parse_html(
            r#"<p>And God said,</p><p class="tx">Let there be <i>light</i><a href="study1.html#f3">&#8224;</a></p>"#,
        );
        let a = link(&dom, "study1.html#f3");
        assert_eq!(
            preceding_text(&dom, a, PRECEDING_WINDOW),
            "And God said,Let there be light"
        );
    }

    #[test]
    fn test_preceding_text_truncates_at_word_boundary() {
        let dom = parse_html(
            r#"<p>Now the earth was without form and void and darkness was on the face of the deep<a href="study1.html#f4">&#8224;</a></p>"#,
        );
        let a = link(&dom, "study1.html#f4");
        let window = preceding_text(&dom, a, PRECEDING_WINDOW);
        assert!(window.chars().count() <= PRECEDING_WINDOW);
        assert_eq!(window, "darkness was on the face of the deep");
    }

    #[test]
    fn test_truncate_window_without_early_space() {
        let text = "abcdefghijklmnopqrstuvwxyz0123456789abcdefghij klm";
        let out = truncate_window(text, 40);
        assert_eq!(out.chars().count(), 40);
        assert!(out.ends_with("klm"));
    }
}
