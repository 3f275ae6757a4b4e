//! Structural boundaries that end any forward text or marker scan.

use crate::dom::{ArenaDom, ArenaNodeId};

/// Classes of psalm headers and section headers.
pub const BOUNDARY_CLASSES: &[&str] = &["psalm", "sub1", "sub2"];

/// True if the node is a section/psalm header or an inline article block.
///
/// Article blocks are `div`s whose inline style sets a gray background.
pub fn is_boundary(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    if !dom.is_element(id) {
        return false;
    }
    if dom
        .element_classes(id)
        .iter()
        .any(|c| BOUNDARY_CLASSES.contains(&c.as_str()))
    {
        return true;
    }
    is_article_block(dom, id)
}

/// True for a gray-background `div`, the wrapper of an inline article.
pub fn is_article_block(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    dom.is_tag(id, "div")
        && dom
            .get_attr(id, "style")
            .is_some_and(|style| style.contains("background-color") && style.contains("gray"))
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::dom::{outer_html, parse_html};

    fn by_id(dom: &ArenaDom, id: &str) -> ArenaNodeId {
        dom.get_by_id(id).expect("id present")
    }

    #[test]
    fn test_header_classes() {
        let dom = parse_html(
            r#"<p id="a" class="psalm">Psalm 1</p>
               <p id="b" class="sub1">The Creation</p>
               <p id="c" class="tx sub2">Heading</p>
               <p id="d" class="tx1">Plain</p>"#,
        );
        assert!(is_boundary(&dom, by_id(&dom, "a")));
        assert!(is_boundary(&dom, by_id(&dom, "b")));
        assert!(is_boundary(&dom, by_id(&dom, "c")));
        assert!(!is_boundary(&dom, by_id(&dom, "d")));
    }

    #[test]
    fn test_article_block() {
        let dom = parse_html(
            r#"<div id="a" style="background-color: gray; padding: 1em"><p>x</p></div>
               <div id="b" style="background-color: white"><p>y</p></div>
               <p id="c" style="background-color: gray">z</p>"#,
        );
        assert!(is_boundary(&dom, by_id(&dom, "a")));
        assert!(!is_boundary(&dom, by_id(&dom, "b")));
        assert!(!is_boundary(&dom, by_id(&dom, "c")));
    }

    #[test]
    fn test_text_nodes_are_never_boundaries() {
        let dom = parse_html(r#"<p class="sub1">Heading</p>"#);
        let p = dom.find(|id| dom.is_tag(id, "p")).unwrap();
        let text = dom.first_child(p).unwrap();
        assert!(!is_boundary(&dom, text));
    }

    proptest! {
        #[test]
        fn prop_classifier_is_pure(class in "(psalm|sub1|sub2|tx|tx1|ct)", gray in any::<bool>()) {
            let style = if gray { "background-color: gray" } else { "margin: 0" };
            let html = format!(r#"<div id="n" class="{class}" style="{style}"><p>t</p></div>"#);
            let dom = parse_html(&html);
            let node = by_id(&dom, "n");
            let before = outer_html(&dom, dom.document());
            let first = is_boundary(&dom, node);
            let second = is_boundary(&dom, node);
            prop_assert_eq!(first, second);
            prop_assert_eq!(outer_html(&dom, dom.document()), before);
            prop_assert_eq!(first, gray || BOUNDARY_CLASSES.contains(&class.as_str()));
        }
    }
}
