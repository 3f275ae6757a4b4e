//! Styled-text extraction and text cleaning.
//!
//! Verse and note text keeps only emphasis: runs under an italic or bold
//! ancestor are wrapped in `<i>`, `<b>` or `<b><i>`, every other tag is
//! dropped while its text is kept. Extraction only reads the arena, so the
//! same nodes can be extracted any number of times.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{ArenaDom, ArenaNodeId};

/// Elements whose start separates words even without whitespace in the source.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "ol", "ul", "br", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th",
    "blockquote", "table",
];

/// Emphasis in effect for a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Emphasis {
    pub italic: bool,
    pub bold: bool,
}

impl Emphasis {
    /// Emphasis of `node` from its ancestors. With `limit`, ancestors above
    /// `limit` are ignored (`limit` itself still counts).
    pub fn of(dom: &ArenaDom, node: ArenaNodeId, limit: Option<ArenaNodeId>) -> Self {
        let mut emphasis = Emphasis::default();
        let mut current = Some(node);
        while let Some(id) = current {
            match dom.tag_name(id) {
                Some("i" | "em") => emphasis.italic = true,
                Some("b" | "strong") => emphasis.bold = true,
                _ => {}
            }
            if Some(id) == limit {
                break;
            }
            current = dom.parent(id);
        }
        emphasis
    }

    fn is_plain(&self) -> bool {
        !self.italic && !self.bold
    }

    fn open_tags(&self) -> &'static str {
        match (self.bold, self.italic) {
            (true, true) => "<b><i>",
            (true, false) => "<b>",
            (false, true) => "<i>",
            (false, false) => "",
        }
    }

    fn close_tags(&self) -> &'static str {
        match (self.bold, self.italic) {
            (true, true) => "</i></b>",
            (true, false) => "</b>",
            (false, true) => "</i>",
            (false, false) => "",
        }
    }
}

/// Accumulates text runs, opening and closing emphasis tags only when the
/// emphasis changes between runs.
#[derive(Debug, Default)]
pub struct StyledBuf {
    out: String,
    open: Emphasis,
}

impl StyledBuf {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, text: &str, emphasis: Emphasis) {
        if text.is_empty() {
            return;
        }
        if emphasis != self.open {
            self.out.push_str(self.open.close_tags());
            self.out.push_str(emphasis.open_tags());
            self.open = emphasis;
        }
        escape_into(text, &mut self.out);
    }

    /// Word separator that does not change the open emphasis.
    pub fn push_space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(' ') {
            self.out.push(' ');
        }
    }

    /// Push `text` as its own word. The separating space goes outside any
    /// emphasis change, so `<b>a</b> b` rather than `<b>a </b>b`.
    pub fn push_separated(&mut self, text: &str, emphasis: Emphasis) {
        if text.is_empty() {
            return;
        }
        if emphasis != self.open {
            self.out.push_str(self.open.close_tags());
            self.open = Emphasis::default();
        }
        self.push_space();
        self.push(text, emphasis);
    }

    pub fn is_empty(&self) -> bool {
        self.out.is_empty()
    }

    pub fn finish(mut self) -> String {
        if !self.open.is_plain() {
            self.out.push_str(self.open.close_tags());
        }
        self.out
    }
}

fn escape_into(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// True for elements that start a new block of text.
pub fn is_block_tag(dom: &ArenaDom, id: ArenaNodeId) -> bool {
    dom.tag_name(id).is_some_and(|t| BLOCK_TAGS.contains(&t))
}

/// Feed one node of a document-order scan into `buf`.
pub fn push_node(dom: &ArenaDom, id: ArenaNodeId, limit: Option<ArenaNodeId>, buf: &mut StyledBuf) {
    if let Some(text) = dom.text_content(id) {
        buf.push(text, Emphasis::of(dom, id, limit));
    } else if is_block_tag(dom, id) {
        buf.push_space();
    }
}

/// Styled text of the subtree under `root`, skipping `pruned` subtrees.
/// Emphasis is taken from `root` and below only.
pub fn styled_text(dom: &ArenaDom, root: ArenaNodeId, pruned: &HashSet<ArenaNodeId>) -> String {
    let mut buf = StyledBuf::new();
    if dom.is_text(root) {
        push_node(dom, root, Some(root), &mut buf);
        return buf.finish();
    }
    for id in dom.descendants_pruned(root, pruned) {
        push_node(dom, id, Some(root), &mut buf);
    }
    buf.finish()
}

static FOOTNOTE_GLYPHS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("[\u{2020}\u{2021}\u{03c9}]").expect("valid regex"));
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));
static DROP_CAP_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Z]) ([a-z])").expect("valid regex"));
static DROP_CAP_SENTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\. )([A-Z]) ([a-z])").expect("valid regex"));
static LEADING_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s+").expect("valid regex"));
static EMPTY_ITALIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<i>\s*</i>").expect("valid regex"));
static EMPTY_BOLD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<b>\s*</b>").expect("valid regex"));
static SPACE_BEFORE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+<").expect("valid regex"));
static SPACE_AFTER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r">\s+").expect("valid regex"));
static SPACE_INSIDE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<\s+").expect("valid regex"));
static SPACE_INSIDE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+>").expect("valid regex"));

/// Normalize extracted text while keeping `<i>`/`<b>` markup.
///
/// Strips the dagger, double-dagger and omega note glyphs, collapses
/// whitespace, rejoins drop-cap initials ("T he" at the start or after a
/// full stop), drops a stray leading verse number, removes emphasis tags
/// left empty and tidies whitespace at tag boundaries.
pub fn clean_text(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let text = FOOTNOTE_GLYPHS.replace_all(text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = DROP_CAP_START.replace(&text, "${1}${2}");
    let text = DROP_CAP_SENTENCE.replace_all(&text, "${1}${2}${3}");
    let text = LEADING_NUMBER.replace(text.trim(), "");
    let text = EMPTY_ITALIC.replace_all(&text, "");
    let text = EMPTY_BOLD.replace_all(&text, "");
    let text = SPACE_BEFORE_TAG.replace_all(&text, " <");
    let text = SPACE_AFTER_TAG.replace_all(&text, "> ");
    let text = SPACE_INSIDE_OPEN.replace_all(&text, "<");
    let text = SPACE_INSIDE_CLOSE.replace_all(&text, ">");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::dom::{outer_html, parse_html};

    fn first(dom: &ArenaDom, tag: &str) -> ArenaNodeId {
        dom.find(|id| dom.is_tag(id, tag)).expect("element present")
    }

    #[test]
    fn test_styled_text_keeps_only_emphasis() {
        let dom = parse_html(
            r#"<p class="tx">In the <i>beginning</i> <span class="x">God</span> <b>created</b></p>"#,
        );
        let p = first(&dom, "p");
        assert_eq!(
            styled_text(&dom, p, &HashSet::new()),
            "In the <i>beginning</i> God <b>created</b>"
        );
    }

    #[test]
    fn test_nested_emphasis_collapses() {
        let dom = parse_html("<p><b>Lord <i>of hosts</i></b></p>");
        let p = first(&dom, "p");
        assert_eq!(
            styled_text(&dom, p, &HashSet::new()),
            "<b>Lord </b><b><i>of hosts</i></b>"
        );
    }

    #[test]
    fn test_adjacent_runs_share_a_wrapper() {
        let dom = parse_html("<p><i>heavens</i><i><span> and</span></i> earth</p>");
        let p = first(&dom, "p");
        assert_eq!(
            styled_text(&dom, p, &HashSet::new()),
            "<i>heavens and</i> earth"
        );
    }

    #[test]
    fn test_extraction_is_non_destructive() {
        let dom = parse_html(r#"<div><p>Blessed <i>is</i> the man<sup>a</sup></p></div>"#);
        let div = first(&dom, "div");
        let before = outer_html(&dom, div);
        let once = styled_text(&dom, div, &HashSet::new());
        let twice = styled_text(&dom, div, &HashSet::new());
        assert_eq!(once, twice);
        assert_eq!(outer_html(&dom, div), before);
    }

    #[test]
    fn test_pruned_subtrees_are_skipped() {
        let dom = parse_html("<p>the man<sup><a>a</a></sup> who walks</p>");
        let p = first(&dom, "p");
        let sup = first(&dom, "sup");
        let pruned: HashSet<_> = [sup].into_iter().collect();
        assert_eq!(styled_text(&dom, p, &pruned), "the man who walks");
    }

    #[test]
    fn test_block_boundaries_separate_words() {
        let dom = parse_html("<ol><li>line one</li><li>line two</li></ol>");
        let ol = first(&dom, "ol");
        assert_eq!(clean_text(&styled_text(&dom, ol, &HashSet::new())), "line one line two");
    }

    #[test]
    fn test_separated_words_keep_spaces_outside_tags() {
        let mut buf = StyledBuf::new();
        let bold = Emphasis {
            italic: false,
            bold: true,
        };
        buf.push_separated("how they", Emphasis::default());
        buf.push_separated("increase", bold);
        buf.push_separated("who", Emphasis::default());
        assert_eq!(buf.finish(), "how they <b>increase</b> who");
    }

    #[test]
    fn test_text_is_escaped() {
        let dom = parse_html("<p>1 &lt; 2 &amp; 3</p>");
        let p = first(&dom, "p");
        assert_eq!(styled_text(&dom, p, &HashSet::new()), "1 &lt; 2 &amp; 3");
    }

    #[test]
    fn test_clean_drop_cap() {
        assert_eq!(clean_text("T he beginning"), "The beginning");
        assert_eq!(
            clean_text("and it was good. T hen God said"),
            "and it was good. Then God said"
        );
    }

    #[test]
    fn test_clean_glyphs_and_whitespace() {
        assert_eq!(clean_text("  God\u{2020}   said\n\u{03c9} Let "), "God said Let");
    }

    #[test]
    fn test_clean_leading_verse_number() {
        assert_eq!(clean_text("12 And Adam said"), "And Adam said");
        assert_eq!(clean_text("12"), "12");
    }

    #[test]
    fn test_clean_empty_and_spaced_tags() {
        assert_eq!(clean_text("the <i> </i>earth"), "the earth");
        assert_eq!(clean_text("the <b><i> </i></b>earth"), "the earth");
        assert_eq!(clean_text("the<i>   void </i>  and"), "the<i> void </i> and");
        assert_eq!(clean_text("< i>void</i >"), "<i>void</i>");
    }

    #[test]
    fn test_clean_empty_input() {
        assert_eq!(clean_text(""), "");
        assert_eq!(clean_text("   "), "");
    }

    proptest! {
        #[test]
        fn prop_clean_output_has_no_whitespace_runs(s in "[A-Za-z .\t\n]{0,60}") {
            let cleaned = clean_text(&s);
            prop_assert!(!cleaned.contains("  "));
            prop_assert!(!cleaned.contains('\n'));
            prop_assert_eq!(cleaned.trim(), cleaned.as_str());
        }

        #[test]
        fn prop_clean_strips_glyphs(s in "[a-z \u{2020}\u{2021}\u{03c9}]{0,40}") {
            let cleaned = clean_text(&s);
            prop_assert!(!cleaned.contains('\u{2020}'), "cleaned text contains U+2020");
            prop_assert!(!cleaned.contains('\u{2021}'), "cleaned text contains U+2021");
            prop_assert!(!cleaned.contains('\u{03c9}'), "cleaned text contains U+03c9");
        }
    }
}
