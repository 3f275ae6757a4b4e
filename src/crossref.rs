//! Cross-reference table.
//!
//! The cross-reference file holds one `div` per entry, `id="fcrossN"`. Its
//! links point at verse anchors in the book files, except the back-link to
//! the referring verse, which targets a marker id rather than a verse id.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::dom::{ArenaDom, outer_html, parse_html};
use crate::ids::verse_ref_in_href;
use crate::text::{clean_text, styled_text};

static ENTRY_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^fcross\d+$").expect("valid regex"));

/// One cross-reference group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossRef {
    /// Target verse ids, in link order.
    pub targets: Vec<String>,
    /// Cleaned display text of the whole entry.
    pub text: String,
    pub html: String,
}

/// Cross-reference id to entry. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct CrossRefTable {
    entries: HashMap<String, CrossRef>,
}

impl CrossRefTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the cross-reference file.
    pub fn parse(html: &str) -> Self {
        let dom = parse_html(html);
        Self::from_dom(&dom)
    }

    pub fn from_dom(dom: &ArenaDom) -> Self {
        let mut table = Self::new();
        let no_pruning = HashSet::new();

        for div in dom.find_all_tags(dom.document(), "div") {
            let Some(id) = dom.element_id(div).filter(|id| ENTRY_ID.is_match(id)) else {
                continue;
            };
            let targets = dom
                .descendants(div)
                .filter(|&n| dom.is_tag(n, "a"))
                .filter_map(|a| dom.get_attr(a, "href").and_then(verse_ref_in_href))
                .map(str::to_string)
                .collect();
            table.insert(
                id.to_string(),
                CrossRef {
                    targets,
                    text: clean_text(&styled_text(dom, div, &no_pruning)),
                    html: outer_html(dom, div),
                },
            );
        }
        table
    }

    /// Add an entry. An id seen before keeps its first entry.
    pub fn insert(&mut self, id: String, entry: CrossRef) {
        self.entries.entry(id).or_insert(entry);
    }

    pub fn get(&self, id: &str) -> Option<&CrossRef> {
        self.entries.get(id)
    }

    /// The entry for `id` if it has at least one target.
    pub fn resolve(&self, id: &str) -> Option<&CrossRef> {
        self.get(id).filter(|entry| !entry.targets.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r##"<html><body>
        <div class="footnotedef" id="fcross1"><a href="Genesis.html#fcr1">1:1</a>
          <i>see also</i> <a href="John.html#John_vchap1-1">John 1:1</a>;
          <a href="Hebrews.html#Heb_vchap11-3">Heb 11:3</a></div>
        <div id="fcross2"><a href="Genesis.html#fcr2">1:2</a> no targets</div>
        <div id="note3"><a href="John.html#John_vchap3-16">x</a></div>
        </body></html>"##;

    #[test]
    fn test_parse_entries() {
        let table = CrossRefTable::parse(FILE);
        assert_eq!(table.len(), 2);

        let entry = table.get("fcross1").unwrap();
        assert_eq!(entry.targets, vec!["John_vchap1-1", "Heb_vchap11-3"]);
        assert!(entry.text.starts_with("1:1 <i>see also</i> John 1:1"));
        assert!(entry.html.starts_with(r#"<div class="footnotedef" id="fcross1">"#));
    }

    #[test]
    fn test_back_link_is_not_a_target() {
        let table = CrossRefTable::parse(FILE);
        assert!(table.get("fcross2").unwrap().targets.is_empty());
    }

    #[test]
    fn test_resolve_requires_targets() {
        let table = CrossRefTable::parse(FILE);
        assert!(table.resolve("fcross1").is_some());
        assert!(table.resolve("fcross2").is_none());
        assert!(table.resolve("fcross9").is_none());
        assert!(table.get("note3").is_none());
    }
}
