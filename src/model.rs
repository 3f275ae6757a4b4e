//! Entity records emitted by the extractor.
//!
//! These are the four collections handed to a persistence sink: books,
//! passages (verses), annotations and patristic sources. Field names follow
//! the document-store layout the loader expects.

use serde::{Deserialize, Serialize};

/// Old or New Testament, derived from the manifest ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    Old,
    New,
}

/// A canonical book. One manifest book may yield several of these when its
/// files carry more than one verse-id abbreviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub name: String,
    pub abbreviations: Vec<String>,
    /// Canonical order; split books get fractional offsets.
    pub order: f64,
    pub testament: Testament,
    pub files: Vec<String>,
}

impl Book {
    /// First abbreviation, or an empty string for a book with no verses.
    pub fn primary_abbreviation(&self) -> &str {
        self.abbreviations.first().map(String::as_str).unwrap_or("")
    }
}

/// Verse layout in the source markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassageFormat {
    Prose,
    Poetry,
}

/// One verse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    /// `{Abbrev}_vchap{chapter}-{verse}`, verbatim from the source.
    pub id: String,
    pub book_id: String,
    pub chapter: u32,
    pub verse: u32,
    /// Cleaned text; may contain `<i>`/`<b>` emphasis.
    pub text: String,
    /// Raw markup of the verse anchor (or the poetry list).
    pub html: String,
    pub format: PassageFormat,
    pub study_note_ids: Vec<String>,
    pub liturgical_ids: Vec<String>,
    pub variant_ids: Vec<String>,
    pub citation_ids: Vec<String>,
    pub article_ids: Vec<String>,
    pub cross_ref_targets: Vec<String>,
    pub cross_ref_text: Option<String>,
    pub annotation_markers: Vec<AnnotationMarker>,
}

impl Passage {
    /// The id list that holds annotations of `kind`.
    pub fn annotation_ids(&self, kind: AnnotationKind) -> &[String] {
        match kind {
            AnnotationKind::Study => &self.study_note_ids,
            AnnotationKind::Liturgical => &self.liturgical_ids,
            AnnotationKind::Variant => &self.variant_ids,
            AnnotationKind::Citation => &self.citation_ids,
            AnnotationKind::Article => &self.article_ids,
        }
    }
}

/// Kind of an annotation entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnotationKind {
    Study,
    Liturgical,
    Variant,
    Citation,
    Article,
}

impl AnnotationKind {
    pub const ALL: [AnnotationKind; 5] = [
        AnnotationKind::Study,
        AnnotationKind::Liturgical,
        AnnotationKind::Variant,
        AnnotationKind::Citation,
        AnnotationKind::Article,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnnotationKind::Study => "study",
            AnnotationKind::Liturgical => "liturgical",
            AnnotationKind::Variant => "variant",
            AnnotationKind::Citation => "citation",
            AnnotationKind::Article => "article",
        }
    }
}

/// Study note, liturgical note, textual variant, citation note or article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// `fN`, `fxN`, `fvarN`, `fcitN` or an article slug.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: AnnotationKind,
    /// Verses pointing at this annotation; duplicate-free.
    pub passage_ids: Vec<String>,
    /// Short reference such as `1:1` or `1:1-3`.
    pub verse_display: String,
    pub text: String,
    pub html: String,
    pub patristic_citations: Vec<String>,
    pub scripture_refs: Vec<String>,
}

impl Annotation {
    /// Record that `passage_id` points here, keeping the list duplicate-free.
    pub fn attach(&mut self, passage_id: &str) -> bool {
        if self.passage_ids.iter().any(|p| p == passage_id) {
            return false;
        }
        self.passage_ids.push(passage_id.to_string());
        true
    }
}

/// Church Father or liturgical source, keyed by its abbreviation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatristicSource {
    pub id: String,
    pub name: String,
}

/// Kind of an inline annotation anchor found in verse text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerKind {
    Study,
    Liturgical,
    Variant,
    Citation,
    CrossRef,
}

impl MarkerKind {
    /// Annotation kind this marker points to; cross-references are resolved
    /// through the cross-reference table instead.
    pub fn annotation_kind(&self) -> Option<AnnotationKind> {
        match self {
            MarkerKind::Study => Some(AnnotationKind::Study),
            MarkerKind::Liturgical => Some(AnnotationKind::Liturgical),
            MarkerKind::Variant => Some(AnnotationKind::Variant),
            MarkerKind::Citation => Some(AnnotationKind::Citation),
            MarkerKind::CrossRef => None,
        }
    }
}

/// Where a marker sat inside its verse: the text just before the anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationMarker {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: MarkerKind,
    /// At most 40 characters of preceding text.
    pub preceding: String,
}
