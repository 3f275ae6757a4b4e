//! Verse segmentation.
//!
//! Verse boundaries are implicit: an anchor element carries the verse id and
//! the verse runs until the next anchor of the same book. Three layouts occur:
//!
//! - prose: the anchor sits in a `p`/`div`; the scan starts right after the
//!   anchor and may continue into following `p`/`ol`/`div` siblings until a
//!   boundary or the next verse,
//! - poetry list: the anchor is the `ol` itself; each `li` is one line,
//! - nested poetry: the anchor sits inside an `li` of an `ol`; the scan walks
//!   the list from the anchor to the next verse.
//!
//! Annotation references are gathered over exactly the nodes whose text
//! makes up the verse.

use crate::boundary::is_boundary;
use crate::dom::{ArenaDom, ArenaNodeId, outer_html_pruned};
use crate::ids::{VerseId, classify_href};
use crate::markers::IgnoreSet;
use crate::model::{MarkerKind, PassageFormat};
use crate::text::{Emphasis, StyledBuf, clean_text, push_node, styled_text};

/// Tags a prose verse may continue into.
const CONTINUATION_TAGS: &[&str] = &["p", "ol", "div"];

/// Anchor ids found inside a verse, by kind, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerseRefs {
    pub study: Vec<String>,
    pub liturgical: Vec<String>,
    pub citation: Vec<String>,
    /// Cross-reference ids; the caller resolves them against the table.
    pub cross_refs: Vec<String>,
}

impl VerseRefs {
    fn record(&mut self, kind: MarkerKind, id: &str) {
        let list = match kind {
            MarkerKind::Study => &mut self.study,
            MarkerKind::Liturgical => &mut self.liturgical,
            MarkerKind::Citation => &mut self.citation,
            MarkerKind::CrossRef => &mut self.cross_refs,
            // Variant anchors are stripped before segmentation.
            MarkerKind::Variant => return,
        };
        list.push(id.to_string());
    }
}

/// One segmented verse.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub html: String,
    pub format: PassageFormat,
    pub refs: VerseRefs,
}

#[derive(Debug, Clone, Copy)]
enum Layout {
    Prose(Option<ArenaNodeId>),
    PoetryList,
    PoetryNested(ArenaNodeId),
}

/// Segments verses of one parsed book file.
pub struct Segmenter<'a> {
    dom: &'a ArenaDom,
    ignored: &'a IgnoreSet,
}

impl<'a> Segmenter<'a> {
    pub fn new(dom: &'a ArenaDom, ignored: &'a IgnoreSet) -> Self {
        Self { dom, ignored }
    }

    /// Segment the verse whose anchor is `anchor`. Returns `None` when the
    /// node does not carry a verse id.
    pub fn segment(&self, anchor: ArenaNodeId) -> Option<Segment> {
        let verse = VerseId::parse(self.dom.element_id(anchor)?)?;
        let stop = |node: ArenaNodeId| self.is_other_verse(node, &verse);

        let segment = match self.layout(anchor) {
            Layout::Prose(container) => self.prose(anchor, container, &stop),
            Layout::PoetryList => self.poetry_list(anchor, &stop),
            Layout::PoetryNested(ol) => self.poetry_nested(anchor, ol, &stop),
        };
        Some(segment)
    }

    fn layout(&self, anchor: ArenaNodeId) -> Layout {
        if self.dom.is_tag(anchor, "ol") {
            return Layout::PoetryList;
        }
        if let Some(ol) = self.dom.find_ancestor(anchor, |n| self.dom.is_tag(n, "ol")) {
            return Layout::PoetryNested(ol);
        }
        Layout::Prose(self.dom.find_ancestor(anchor, |n| {
            self.dom.is_tag(n, "p") || self.dom.is_tag(n, "div")
        }))
    }

    /// True for an anchor of another verse of the same book.
    fn is_other_verse(&self, node: ArenaNodeId, verse: &VerseId<'_>) -> bool {
        self.dom
            .element_id(node)
            .and_then(VerseId::parse)
            .is_some_and(|other| other.abbrev == verse.abbrev && other != *verse)
    }

    fn html(&self, node: ArenaNodeId) -> String {
        outer_html_pruned(self.dom, node, self.ignored.as_set())
    }

    fn record_ref(&self, node: ArenaNodeId, refs: &mut VerseRefs) {
        if !self.dom.is_tag(node, "a") {
            return;
        }
        if let Some((kind, id)) = self.dom.get_attr(node, "href").and_then(classify_href) {
            refs.record(kind, id);
        }
    }

    /// Visit the descendants of `root` in document order, starting after
    /// `start_after` when given, until `stop` accepts a node. Returns whether
    /// the scan stopped.
    fn scan<S, V>(&self, root: ArenaNodeId, start_after: Option<ArenaNodeId>, stop: &S, visit: &mut V) -> bool
    where
        S: Fn(ArenaNodeId) -> bool,
        V: FnMut(ArenaNodeId),
    {
        let mut collecting = start_after.is_none();
        for node in self.dom.descendants_pruned(root, self.ignored.as_set()) {
            if !collecting {
                collecting = Some(node) == start_after;
                continue;
            }
            if stop(node) {
                return true;
            }
            visit(node);
        }
        false
    }

    /// Prose traversal: rest of the container, then content siblings.
    fn walk_prose<S, V>(&self, anchor: ArenaNodeId, container: ArenaNodeId, stop: &S, visit: &mut V)
    where
        S: Fn(ArenaNodeId) -> bool,
        V: FnMut(ArenaNodeId),
    {
        if self.scan(container, Some(anchor), stop, visit) {
            return;
        }
        let mut sibling = self.dom.next_element_sibling(container);
        while let Some(current) = sibling {
            if is_boundary(self.dom, current) || stop(current) {
                break;
            }
            let is_content = self
                .dom
                .tag_name(current)
                .is_some_and(|tag| CONTINUATION_TAGS.contains(&tag));
            if is_content && !self.ignored.contains(current) {
                visit(current);
                if self.scan(current, None, stop, visit) {
                    break;
                }
            }
            sibling = self.dom.next_element_sibling(current);
        }
    }

    fn prose<S>(&self, anchor: ArenaNodeId, container: Option<ArenaNodeId>, stop: &S) -> Segment
    where
        S: Fn(ArenaNodeId) -> bool,
    {
        let mut refs = VerseRefs::default();
        let Some(container) = container else {
            self.scan(anchor, None, stop, &mut |node| self.record_ref(node, &mut refs));
            return Segment {
                text: clean_text(&styled_text(self.dom, anchor, self.ignored.as_set())),
                html: self.html(anchor),
                format: PassageFormat::Prose,
                refs,
            };
        };

        let mut buf = StyledBuf::new();
        self.walk_prose(anchor, container, stop, &mut |node| {
            push_node(self.dom, node, None, &mut buf);
            self.record_ref(node, &mut refs);
        });

        Segment {
            text: clean_text(&buf.finish()),
            html: self.html(anchor),
            format: PassageFormat::Prose,
            refs,
        }
    }

    /// Lines of a poetry list up to the first line holding another verse.
    fn verse_lines<S>(&self, ol: ArenaNodeId, stop: &S) -> Vec<ArenaNodeId>
    where
        S: Fn(ArenaNodeId) -> bool,
    {
        self.dom
            .find_all_tags(ol, "li")
            .into_iter()
            .take_while(|&li| !self.dom.descendants(li).any(stop))
            .collect()
    }

    fn poetry_list<S>(&self, ol: ArenaNodeId, stop: &S) -> Segment
    where
        S: Fn(ArenaNodeId) -> bool,
    {
        let mut refs = VerseRefs::default();
        let mut lines = Vec::new();
        for li in self.verse_lines(ol, stop) {
            let line = clean_text(&styled_text(self.dom, li, self.ignored.as_set()));
            if !line.is_empty() {
                lines.push(line);
            }
            for node in self.dom.descendants_pruned(li, self.ignored.as_set()) {
                self.record_ref(node, &mut refs);
            }
        }

        Segment {
            text: lines.join("\n"),
            html: self.html(ol),
            format: PassageFormat::Poetry,
            refs,
        }
    }

    fn poetry_nested<S>(&self, anchor: ArenaNodeId, ol: ArenaNodeId, stop: &S) -> Segment
    where
        S: Fn(ArenaNodeId) -> bool,
    {
        let mut refs = VerseRefs::default();
        let mut buf = StyledBuf::new();
        self.scan(ol, Some(anchor), stop, &mut |node| {
            if let Some(text) = self.dom.text_content(node).map(str::trim)
                && !text.is_empty()
            {
                buf.push_separated(text, Emphasis::of(self.dom, node, None));
            }
            self.record_ref(node, &mut refs);
        });

        Segment {
            text: clean_text(&buf.finish()),
            html: self.html(anchor),
            format: PassageFormat::Poetry,
            refs,
        }
    }
}
