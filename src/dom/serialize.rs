//! Outer-HTML serialization for the raw-markup fields.

use std::collections::HashSet;

use super::arena::{ArenaDom, ArenaNodeData, ArenaNodeId};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Serialize a node and its subtree back to HTML.
pub fn outer_html(dom: &ArenaDom, id: ArenaNodeId) -> String {
    outer_html_pruned(dom, id, &HashSet::new())
}

/// Like [`outer_html`], leaving out the subtrees rooted at `pruned` nodes.
pub fn outer_html_pruned(dom: &ArenaDom, id: ArenaNodeId, pruned: &HashSet<ArenaNodeId>) -> String {
    let mut out = String::new();
    write_node(dom, id, pruned, &mut out);
    out
}

fn write_node(dom: &ArenaDom, id: ArenaNodeId, pruned: &HashSet<ArenaNodeId>, out: &mut String) {
    if pruned.contains(&id) {
        return;
    }
    let Some(node) = dom.get(id) else {
        return;
    };

    match &node.data {
        ArenaNodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, pruned, out);
            }
        }
        ArenaNodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                out.push(' ');
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                escape_into(&attr.value, true, out);
                out.push('"');
            }
            if VOID_ELEMENTS.contains(&tag) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in dom.children(id) {
                write_node(dom, child, pruned, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
        ArenaNodeData::Text(text) => escape_into(text, false, out),
        ArenaNodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        ArenaNodeData::Doctype { .. } => {}
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_html;

    #[test]
    fn test_round_trips_simple_markup() {
        let dom = parse_html(r#"<p class="tx"><sup id="Ps_vchap1-1">1</sup>Blessed <i>is</i> the man</p>"#);
        let p = dom.find(|id| dom.is_tag(id, "p")).expect("p");
        assert_eq!(
            outer_html(&dom, p),
            r#"<p class="tx"><sup id="Ps_vchap1-1">1</sup>Blessed <i>is</i> the man</p>"#
        );
    }

    #[test]
    fn test_escapes_text_and_attributes() {
        let dom = parse_html(r#"<a href="a.html?x=1&amp;y=&quot;2&quot;">1 &lt; 2</a><br>"#);
        let a = dom.find(|id| dom.is_tag(id, "a")).expect("a");
        assert_eq!(
            outer_html(&dom, a),
            r#"<a href="a.html?x=1&amp;y=&quot;2&quot;">1 &lt; 2</a>"#
        );
        let br = dom.find(|id| dom.is_tag(id, "br")).expect("br");
        assert_eq!(outer_html(&dom, br), "<br/>");
    }

    #[test]
    fn test_pruned_subtrees_are_left_out() {
        let dom = parse_html(r#"<p>the man<sup><a href="variant.html#fvar1">a</a></sup> who</p>"#);
        let p = dom.find(|id| dom.is_tag(id, "p")).expect("p");
        let sup = dom.find(|id| dom.is_tag(id, "sup")).expect("sup");
        let pruned: HashSet<_> = [sup].into_iter().collect();
        assert_eq!(outer_html_pruned(&dom, p, &pruned), "<p>the man who</p>");
    }
}
