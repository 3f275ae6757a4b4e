//! Id conventions of the corpus.
//!
//! Verse anchors carry ids of the form `{Abbrev}_vchap{chapter}-{verse}`.
//! Annotation anchors are links whose href names the note file and the note
//! id (`study3.html#f812`, `x-liturgical.html#fx40`, `variant.html#fvar7`,
//! `citation.html#fcit2`, `crossReference.html#fcross96`).

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::model::MarkerKind;

static VERSE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9]+)_vchap(\d+)-(\d+)$").expect("valid regex"));

static VERSE_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Za-z0-9]+_vchap\d+-\d+)").expect("valid regex"));

static MARKER_HREFS: LazyLock<Vec<(MarkerKind, Regex)>> = LazyLock::new(|| {
    [
        (MarkerKind::Liturgical, r"liturgical\.html#(fx\d+)"),
        (MarkerKind::Study, r"study\d+\.html#(f\d+)"),
        (MarkerKind::Variant, r"variant\.html#(fvar\d+)"),
        (MarkerKind::Citation, r"citation\.html#(fcit\d+)"),
        (MarkerKind::CrossRef, r"crossReference\.html#(fcross\d+)"),
    ]
    .into_iter()
    .map(|(kind, pattern)| (kind, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Href fragments of presentation-only reference letters.
const LETTER_MARKER_HREFS: &[&str] = &[
    "crossReference.html#fcross",
    "translation.html#ftran",
    "background.html#fback",
];

/// A parsed verse id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerseId<'a> {
    pub abbrev: &'a str,
    pub chapter: u32,
    pub verse: u32,
}

impl<'a> VerseId<'a> {
    /// Parse a complete verse id; anything else (including numbers that do
    /// not fit in `u32`) yields `None`.
    pub fn parse(id: &'a str) -> Option<Self> {
        let caps = VERSE_ID.captures(id)?;
        Some(Self {
            abbrev: caps.get(1)?.as_str(),
            chapter: caps.get(2)?.as_str().parse().ok()?,
            verse: caps.get(3)?.as_str().parse().ok()?,
        })
    }

    /// `chapter:verse`, as shown next to notes.
    pub fn display_ref(&self) -> String {
        format!("{}:{}", self.chapter, self.verse)
    }
}

impl fmt::Display for VerseId<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_vchap{}-{}", self.abbrev, self.chapter, self.verse)
    }
}

/// True if `id` is a verse id of any book.
pub fn is_verse_id(id: &str) -> bool {
    VerseId::parse(id).is_some()
}

/// The verse id an href points to, e.g. `Isaiah.html#Isa_vchap7-14`.
pub fn verse_ref_in_href(href: &str) -> Option<&str> {
    if !href.contains("_vchap") {
        return None;
    }
    VERSE_REF.find(href).map(|m| m.as_str())
}

/// Classify an annotation anchor by its href.
pub fn classify_href(href: &str) -> Option<(MarkerKind, &str)> {
    MARKER_HREFS.iter().find_map(|(kind, re)| {
        re.captures(href)
            .and_then(|caps| caps.get(1))
            .map(|m| (*kind, m.as_str()))
    })
}

/// True if the anchor is a presentation-only marker that must not leak into
/// verse text: any variant link, or a single-letter cross-reference,
/// translation or background link.
pub fn is_strippable_marker(href: &str, link_text: &str) -> bool {
    if href.contains("variant.html") {
        return true;
    }
    if !LETTER_MARKER_HREFS.iter().any(|p| href.contains(p)) {
        return false;
    }
    let mut chars = link_text.trim().chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

/// Abbreviations a verse scan treats as "this book".
#[derive(Debug, Clone, Default)]
pub struct AbbrevSet(Vec<String>);

impl AbbrevSet {
    pub fn new<I, S>(abbrevs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(abbrevs.into_iter().map(Into::into).collect())
    }

    pub fn contains(&self, abbrev: &str) -> bool {
        self.0.iter().any(|a| a == abbrev)
    }

    /// True if `id` is a verse id whose abbreviation is in the set.
    pub fn matches(&self, id: &str) -> bool {
        VerseId::parse(id).is_some_and(|v| self.contains(v.abbrev))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
