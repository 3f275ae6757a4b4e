//! Extraction pipeline.
//!
//! Runs the phases in dependency order:
//!
//! 1. manifest and book resolution,
//! 2. patristic source table,
//! 3. cross-reference table,
//! 4. note files (study, liturgical, variant, citation),
//! 5. book files, one at a time: articles, markers, strip set, verses.
//!
//! Everything read in phases 2-4 is read-only by the time verses are
//! segmented, except for the back-references verses append to annotations.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use tracing::{debug, info, warn};

use crate::articles::{disambiguate, extract_articles};
use crate::crossref::CrossRefTable;
use crate::dom::{ArenaDom, parse_html};
use crate::error::{Error, Result};
use crate::ids::{AbbrevSet, VerseId};
use crate::manifest::{group_books, parse_manifest, resolve_books, scan_abbreviations};
use crate::markers::{MarkersByVerse, collect_markers, marker_ids, strip_markers};
use crate::model::{
    Annotation, AnnotationKind, Book, MarkerKind, Passage, PatristicSource,
};
use crate::notes::{parse_notes, parse_patristic_table};
use crate::segment::Segmenter;
use crate::sink::CorpusSink;
use crate::source::ContentSource;
use crate::walk::PRECEDING_WINDOW;

/// Ordinal of the first New Testament book in the manifest.
pub const DEFAULT_NT_START: u32 = 50;

/// File names and limits of one extraction run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Content directory inside an unpacked EPUB.
    pub content_dir: String,
    pub manifest_file: String,
    pub patristic_file: String,
    pub cross_ref_file: String,
    /// Study notes live in `{study_stem}1.html` ... `{study_stem}{study_count}.html`.
    pub study_stem: String,
    pub study_count: u32,
    pub liturgical_file: String,
    pub variant_file: String,
    pub citation_file: String,
    pub nt_start: u32,
    pub preceding_window: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            content_dir: "OEBPS".into(),
            manifest_file: "content.opf".into(),
            patristic_file: "Source_Abbreviations.html".into(),
            cross_ref_file: "crossReference.html".into(),
            study_stem: "study".into(),
            study_count: 11,
            liturgical_file: "x-liturgical.html".into(),
            variant_file: "variant.html".into(),
            citation_file: "citation.html".into(),
            nt_start: DEFAULT_NT_START,
            preceding_window: PRECEDING_WINDOW,
        }
    }
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_dir(mut self, dir: impl Into<String>) -> Self {
        self.content_dir = dir.into();
        self
    }

    pub fn with_manifest_file(mut self, name: impl Into<String>) -> Self {
        self.manifest_file = name.into();
        self
    }

    pub fn with_study_files(mut self, stem: impl Into<String>, count: u32) -> Self {
        self.study_stem = stem.into();
        self.study_count = count;
        self
    }

    pub fn with_nt_start(mut self, order: u32) -> Self {
        self.nt_start = order;
        self
    }

    pub fn with_preceding_window(mut self, chars: usize) -> Self {
        self.preceding_window = chars;
        self
    }

    /// Note files in parse order, with the kind of note each holds.
    pub fn note_files(&self) -> Vec<(AnnotationKind, String)> {
        let mut files: Vec<_> = (1..=self.study_count)
            .map(|i| (AnnotationKind::Study, format!("{}{}.html", self.study_stem, i)))
            .collect();
        files.push((AnnotationKind::Liturgical, self.liturgical_file.clone()));
        files.push((AnnotationKind::Variant, self.variant_file.clone()));
        files.push((AnnotationKind::Citation, self.citation_file.clone()));
        files
    }
}

/// Shared tables built before the book files are read.
#[derive(Debug, Default)]
pub struct Registry {
    annotations: BTreeMap<String, Annotation>,
    sources: BTreeMap<String, PatristicSource>,
    cross_refs: CrossRefTable,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_source(&mut self, source: PatristicSource) {
        self.sources.entry(source.id.clone()).or_insert(source);
    }

    pub fn is_known_source(&self, abbrev: &str) -> bool {
        self.sources.contains_key(abbrev)
    }

    pub fn set_cross_refs(&mut self, table: CrossRefTable) {
        self.cross_refs = table;
    }

    pub fn cross_refs(&self) -> &CrossRefTable {
        &self.cross_refs
    }

    /// Add a note. A note id seen before keeps its first note.
    pub fn add_note(&mut self, note: Annotation) -> bool {
        if self.annotations.contains_key(&note.id) {
            debug!(id = %note.id, "duplicate note id");
            return false;
        }
        self.annotations.insert(note.id.clone(), note);
        true
    }

    /// Add an article, renaming it when its id is already taken. Returns
    /// the id it was stored under.
    pub fn add_article(&mut self, mut article: Annotation) -> String {
        let id = disambiguate(&article.id, |candidate| self.annotations.contains_key(candidate));
        if id != article.id {
            debug!(from = %article.id, to = %id, "renamed colliding article id");
            article.id = id.clone();
        }
        self.annotations.insert(id.clone(), article);
        id
    }

    pub fn annotation(&self, id: &str) -> Option<&Annotation> {
        self.annotations.get(id)
    }

    /// Record that `verse_id` points at annotation `id`, if it exists.
    pub fn attach(&mut self, id: &str, verse_id: &str) {
        if let Some(annotation) = self.annotations.get_mut(id) {
            annotation.attach(verse_id);
        }
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }
}

/// Aggregate counts of a run, for sanity checks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub books: usize,
    pub passages: usize,
    pub annotations: usize,
    pub annotations_by_kind: BTreeMap<&'static str, usize>,
    pub patristic_sources: usize,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Books:             {}", self.books)?;
        writeln!(f, "Passages:          {}", self.passages)?;
        writeln!(f, "Annotations:       {}", self.annotations)?;
        for (kind, count) in &self.annotations_by_kind {
            writeln!(f, "  {kind:<16} {count}")?;
        }
        write!(f, "Patristic sources: {}", self.patristic_sources)
    }
}

/// The four extracted collections, keyed by entity id.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    pub books: BTreeMap<String, Book>,
    pub passages: BTreeMap<String, Passage>,
    pub annotations: BTreeMap<String, Annotation>,
    pub patristic_sources: BTreeMap<String, PatristicSource>,
    /// Window the marker contexts were collected with.
    pub preceding_window: usize,
}

impl Corpus {
    pub fn summary(&self) -> Summary {
        let mut annotations_by_kind = BTreeMap::new();
        for annotation in self.annotations.values() {
            *annotations_by_kind.entry(annotation.kind.as_str()).or_insert(0) += 1;
        }
        Summary {
            books: self.books.len(),
            passages: self.passages.len(),
            annotations: self.annotations.len(),
            annotations_by_kind,
            patristic_sources: self.patristic_sources.len(),
        }
    }

    /// Books in canonical order.
    pub fn books_in_order(&self) -> Vec<&Book> {
        let mut books: Vec<_> = self.books.values().collect();
        books.sort_by(|a, b| a.order.total_cmp(&b.order));
        books
    }

    /// Passages in reading order: book order, then chapter, then verse.
    pub fn passages_in_order(&self) -> Vec<&Passage> {
        let book_order: HashMap<&str, f64> = self
            .books
            .values()
            .map(|b| (b.id.as_str(), b.order))
            .collect();
        let mut passages: Vec<_> = self.passages.values().collect();
        passages.sort_by(|a, b| {
            let oa = book_order.get(a.book_id.as_str()).copied().unwrap_or(f64::MAX);
            let ob = book_order.get(b.book_id.as_str()).copied().unwrap_or(f64::MAX);
            oa.total_cmp(&ob)
                .then_with(|| a.book_id.cmp(&b.book_id))
                .then_with(|| a.chapter.cmp(&b.chapter))
                .then_with(|| a.verse.cmp(&b.verse))
        });
        passages
    }

    /// Passages of one book in reading order.
    pub fn passages_of<'a>(&'a self, book_id: &'a str) -> impl Iterator<Item = &'a Passage> + 'a {
        self.passages_in_order()
            .into_iter()
            .filter(move |p| p.book_id == book_id)
    }

    /// Check the structural invariants of the corpus and describe every
    /// violation found.
    pub fn validate(&self) -> Vec<String> {
        let mut violations = Vec::new();

        for (key, passage) in &self.passages {
            if *key != passage.id {
                violations.push(format!("passage stored under {key} has id {}", passage.id));
            }
            match VerseId::parse(&passage.id) {
                Some(v) if v.chapter == passage.chapter && v.verse == passage.verse => {}
                Some(_) => violations.push(format!(
                    "passage {} stores chapter {} verse {}",
                    passage.id, passage.chapter, passage.verse
                )),
                None => violations.push(format!("passage id {} is not a verse id", passage.id)),
            }
            if !self.books.contains_key(&passage.book_id) {
                violations.push(format!("passage {} has unknown book {}", passage.id, passage.book_id));
            }
            for marker in &passage.annotation_markers {
                if marker.preceding.chars().count() > self.preceding_window {
                    violations.push(format!(
                        "marker {} of {} has a preceding window over {} chars",
                        marker.id, passage.id, self.preceding_window
                    ));
                }
            }
        }

        for annotation in self.annotations.values() {
            let mut seen = std::collections::HashSet::new();
            for passage_id in &annotation.passage_ids {
                if !seen.insert(passage_id.as_str()) {
                    violations.push(format!(
                        "annotation {} lists passage {passage_id} twice",
                        annotation.id
                    ));
                    continue;
                }
                let linked = self
                    .passages
                    .get(passage_id)
                    .is_some_and(|p| p.annotation_ids(annotation.kind).contains(&annotation.id));
                if !linked {
                    violations.push(format!(
                        "annotation {} lists passage {passage_id}, which does not point back",
                        annotation.id
                    ));
                }
            }
        }

        let mut abbreviations = HashMap::new();
        for book in self.books.values() {
            for abbrev in &book.abbreviations {
                if let Some(other) = abbreviations.insert(abbrev.as_str(), book.id.as_str()) {
                    violations.push(format!(
                        "abbreviation {abbrev} belongs to both {other} and {}",
                        book.id
                    ));
                }
            }
        }

        violations
    }

    /// Hand the collections to a persistence sink: clear, books, passages
    /// (reading order), annotations, patristic sources, then indexes.
    pub fn load_into(&self, sink: &mut dyn CorpusSink) -> Result<()> {
        let books: Vec<Book> = self.books_in_order().into_iter().cloned().collect();
        let passages: Vec<Passage> = self.passages_in_order().into_iter().cloned().collect();
        let annotations: Vec<Annotation> = self.annotations.values().cloned().collect();
        let sources: Vec<PatristicSource> = self.patristic_sources.values().cloned().collect();

        sink.clear()?;
        sink.load_books(&books)?;
        sink.load_passages(&passages)?;
        sink.load_annotations(&annotations)?;
        sink.load_patristic_sources(&sources)?;
        sink.create_indexes()?;
        Ok(())
    }
}

/// Run the whole extraction over `source`.
///
/// Fails only when the manifest is missing or malformed, or the source
/// cannot be read at all; every other irregularity is logged and skipped.
pub fn extract(source: &dyn ContentSource, options: &ExtractOptions) -> Result<Corpus> {
    info!(source = %source.describe(), "starting extraction");

    let manifest_name = source
        .manifest_hint()
        .unwrap_or_else(|| options.manifest_file.clone());
    let opf = source
        .read_text(&manifest_name)?
        .ok_or_else(|| Error::MissingFile(manifest_name.clone()))?;
    let groups = group_books(&parse_manifest(&opf)?);

    let mut book_texts: HashMap<String, String> = HashMap::new();
    for file in groups.iter().flat_map(|g| g.files.iter()) {
        if book_texts.contains_key(file) {
            continue;
        }
        match source.read_text(file) {
            Ok(Some(text)) => {
                book_texts.insert(file.clone(), text);
            }
            Ok(None) => warn!(%file, "book file not found"),
            Err(e) => warn!(%file, error = %e, "failed to read book file"),
        }
    }

    let books = resolve_books(
        &groups,
        |file| book_texts.get(file).map(|t| scan_abbreviations(t)).unwrap_or_default(),
        options.nt_start,
    );
    info!(books = books.len(), files = book_texts.len(), "resolved books");

    let mut registry = Registry::new();
    load_patristic_sources(source, options, &mut registry);
    load_cross_refs(source, options, &mut registry);
    load_notes(source, options, &mut registry);

    let mut passages = BTreeMap::new();
    for (file, owners) in files_in_book_order(&books) {
        let Some(text) = book_texts.get(file) else {
            continue;
        };
        let dom = parse_html(text);
        let before = passages.len();
        process_book_file(&dom, &owners, options, &mut registry, &mut passages);
        debug!(%file, passages = passages.len() - before, "processed book file");
    }
    info!(passages = passages.len(), "segmented verses");

    let corpus = Corpus {
        books: books.into_iter().map(|b| (b.id.clone(), b)).collect(),
        passages,
        annotations: registry.annotations,
        patristic_sources: registry.sources,
        preceding_window: options.preceding_window,
    };
    let summary = corpus.summary();
    info!(
        books = summary.books,
        passages = summary.passages,
        annotations = summary.annotations,
        sources = summary.patristic_sources,
        "extraction complete"
    );
    Ok(corpus)
}

fn read_optional(source: &dyn ContentSource, name: &str) -> Option<String> {
    match source.read_text(name) {
        Ok(Some(text)) => Some(text),
        Ok(None) => {
            info!(file = %name, "optional file not present, skipping");
            None
        }
        Err(e) => {
            warn!(file = %name, error = %e, "failed to read file, skipping");
            None
        }
    }
}

fn load_patristic_sources(source: &dyn ContentSource, options: &ExtractOptions, registry: &mut Registry) {
    let Some(html) = read_optional(source, &options.patristic_file) else {
        return;
    };
    for entry in parse_patristic_table(&html) {
        registry.add_source(entry);
    }
    info!(sources = registry.sources.len(), "parsed patristic sources");
}

fn load_cross_refs(source: &dyn ContentSource, options: &ExtractOptions, registry: &mut Registry) {
    let Some(html) = read_optional(source, &options.cross_ref_file) else {
        return;
    };
    registry.set_cross_refs(CrossRefTable::parse(&html));
    info!(entries = registry.cross_refs().len(), "parsed cross-references");
}

fn load_notes(source: &dyn ContentSource, options: &ExtractOptions, registry: &mut Registry) {
    for (kind, file) in options.note_files() {
        let Some(html) = read_optional(source, &file) else {
            continue;
        };
        let notes = parse_notes(&html, kind, |abbrev| registry.is_known_source(abbrev));
        let count = notes.len();
        for note in notes {
            registry.add_note(note);
        }
        info!(%file, kind = kind.as_str(), notes = count, "parsed notes");
    }
}

/// Every book file once, in book order, with the books whose verses it holds.
fn files_in_book_order(books: &[Book]) -> Vec<(&str, Vec<&Book>)> {
    let mut ordered: Vec<&Book> = books.iter().collect();
    ordered.sort_by(|a, b| a.order.total_cmp(&b.order));

    let mut files: Vec<(&str, Vec<&Book>)> = Vec::new();
    for book in ordered {
        for file in &book.files {
            match files.iter_mut().find(|(f, _)| f == file) {
                Some((_, owners)) => owners.push(book),
                None => files.push((file.as_str(), vec![book])),
            }
        }
    }
    files
}

/// Segment every verse of one parsed book file owned by `owners`.
fn process_book_file(
    dom: &ArenaDom,
    owners: &[&Book],
    options: &ExtractOptions,
    registry: &mut Registry,
    passages: &mut BTreeMap<String, Passage>,
) {
    let book_of: HashMap<&str, &str> = owners
        .iter()
        .flat_map(|b| b.abbreviations.iter().map(|a| (a.as_str(), b.id.as_str())))
        .collect();
    let abbrevs = AbbrevSet::new(book_of.keys().copied());
    if abbrevs.is_empty() {
        return;
    }

    let mut articles_by_verse: HashMap<String, Vec<String>> = HashMap::new();
    for article in extract_articles(dom) {
        let verse_id = article.passage_ids.first().cloned().unwrap_or_default();
        let id = registry.add_article(article);
        articles_by_verse.entry(verse_id).or_default().push(id);
    }

    let markers = collect_markers(dom, options.preceding_window);
    let ignored = strip_markers(dom);
    let segmenter = Segmenter::new(dom, &ignored);

    for node in dom.descendants(dom.document()) {
        let Some(verse_id) = dom.element_id(node).filter(|id| abbrevs.matches(id)) else {
            continue;
        };
        let Some(verse) = VerseId::parse(verse_id) else {
            continue;
        };
        if passages.contains_key(verse_id) {
            warn!(%verse_id, "duplicate verse id, keeping the first");
            continue;
        }
        let Some(book_id) = book_of.get(verse.abbrev) else {
            continue;
        };
        let Some(segment) = segmenter.segment(node) else {
            continue;
        };

        let variant_ids = marker_ids(&markers, verse_id, MarkerKind::Variant);
        let (cross_ref_targets, cross_ref_text) =
            resolve_cross_ref(registry, &markers, verse_id, &segment.refs.cross_refs);

        let passage = Passage {
            id: verse_id.to_string(),
            book_id: book_id.to_string(),
            chapter: verse.chapter,
            verse: verse.verse,
            text: segment.text,
            html: segment.html,
            format: segment.format,
            study_note_ids: segment.refs.study,
            liturgical_ids: segment.refs.liturgical,
            variant_ids,
            citation_ids: segment.refs.citation,
            article_ids: articles_by_verse.get(verse_id).cloned().unwrap_or_default(),
            cross_ref_targets,
            cross_ref_text,
            annotation_markers: markers.get(verse_id).cloned().unwrap_or_default(),
        };

        for id in passage
            .study_note_ids
            .iter()
            .chain(&passage.liturgical_ids)
            .chain(&passage.variant_ids)
            .chain(&passage.citation_ids)
        {
            registry.attach(id, verse_id);
        }
        passages.insert(passage.id.clone(), passage);
    }
}

/// First resolvable cross-reference of a verse: markers collected before
/// stripping come first, then references found while segmenting.
fn resolve_cross_ref(
    registry: &Registry,
    markers: &MarkersByVerse,
    verse_id: &str,
    found: &[String],
) -> (Vec<String>, Option<String>) {
    let collected = marker_ids(markers, verse_id, MarkerKind::CrossRef);
    collected
        .iter()
        .chain(found)
        .find_map(|id| registry.cross_refs().resolve(id))
        .map(|entry| (entry.targets.clone(), Some(entry.text.clone())))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crossref::CrossRef;
    use crate::model::{PassageFormat, Testament};

    fn book(id: &str, abbrev: &str, order: f64, files: &[&str]) -> Book {
        Book {
            id: id.into(),
            name: id.into(),
            abbreviations: vec![abbrev.into()],
            order,
            testament: Testament::Old,
            files: files.iter().map(|f| f.to_string()).collect(),
        }
    }

    fn note(id: &str, kind: AnnotationKind) -> Annotation {
        Annotation {
            id: id.into(),
            kind,
            passage_ids: vec![],
            verse_display: String::new(),
            text: String::new(),
            html: String::new(),
            patristic_citations: vec![],
            scripture_refs: vec![],
        }
    }

    #[test]
    fn test_default_options() {
        let options = ExtractOptions::default();
        let files = options.note_files();
        assert_eq!(files.len(), 14);
        assert_eq!(files[0], (AnnotationKind::Study, "study1.html".to_string()));
        assert_eq!(files[10], (AnnotationKind::Study, "study11.html".to_string()));
        assert_eq!(files[13], (AnnotationKind::Citation, "citation.html".to_string()));
        assert_eq!(options.nt_start, 50);
        assert_eq!(options.preceding_window, 40);
    }

    #[test]
    fn test_builder() {
        let options = ExtractOptions::new()
            .with_nt_start(40)
            .with_study_files("notes", 2)
            .with_preceding_window(20);
        assert_eq!(options.nt_start, 40);
        assert_eq!(options.note_files()[1].1, "notes2.html");
        assert_eq!(options.preceding_window, 20);
    }

    #[test]
    fn test_registry_articles_are_renamed_on_collision() {
        let mut registry = Registry::new();
        assert!(registry.add_note(note("the_law", AnnotationKind::Study)));
        assert!(!registry.add_note(note("the_law", AnnotationKind::Study)));
        let id = registry.add_article(note("the_law", AnnotationKind::Article));
        assert_eq!(id, "the_law_2");
        assert_eq!(registry.annotation("the_law_2").unwrap().id, "the_law_2");
    }

    #[test]
    fn test_registry_attach_is_duplicate_free() {
        let mut registry = Registry::new();
        registry.add_note(note("f1", AnnotationKind::Study));
        registry.attach("f1", "Gen_vchap1-1");
        registry.attach("f1", "Gen_vchap1-1");
        registry.attach("f404", "Gen_vchap1-1");
        assert_eq!(registry.annotation("f1").unwrap().passage_ids, vec!["Gen_vchap1-1"]);
    }

    #[test]
    fn test_files_in_book_order_merges_shared_files() {
        let books = vec![
            book("dan", "Dan", 34.1, &["Daniel.html"]),
            book("sus", "Sus", 34.0, &["Daniel.html"]),
            book("genesis", "Gen", 1.0, &["Genesis.html", "Genesis1.html"]),
        ];
        let files = files_in_book_order(&books);
        let names: Vec<_> = files.iter().map(|(f, _)| *f).collect();
        assert_eq!(names, vec!["Genesis.html", "Genesis1.html", "Daniel.html"]);
        let owners: Vec<_> = files[2].1.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(owners, vec!["sus", "dan"]);
    }

    #[test]
    fn test_process_book_file() {
        let html = r##"<html><body>
            <p class="tx1"><span id="Gen_vchap1-1"></span>In the beginning God<a href="study1.html#f1">&#8224;</a>
            made<sup><a href="variant.html#fvar1">a</a></sup> the heavens<sup><a href="crossReference.html#fcross1">b</a></sup>.
            <span id="Gen_vchap1-2"></span>The earth was void.</p>
            </body></html>"##;
        let dom = parse_html(html);
        let genesis = book("genesis", "Gen", 1.0, &["Genesis.html"]);

        let mut registry = Registry::new();
        registry.add_note(note("f1", AnnotationKind::Study));
        registry.add_note(note("fvar1", AnnotationKind::Variant));
        let mut table = CrossRefTable::new();
        table.insert(
            "fcross1".into(),
            CrossRef {
                targets: vec!["Ps_vchap32-6".into(), "John_vchap1-3".into()],
                text: "see also".into(),
                html: String::new(),
            },
        );
        registry.set_cross_refs(table);

        let mut passages = BTreeMap::new();
        process_book_file(
            &dom,
            &[&genesis],
            &ExtractOptions::default(),
            &mut registry,
            &mut passages,
        );

        assert_eq!(passages.len(), 2);
        let first = &passages["Gen_vchap1-1"];
        assert_eq!(first.book_id, "genesis");
        assert_eq!(first.format, PassageFormat::Prose);
        assert_eq!(first.text, "In the beginning God made the heavens.");
        assert_eq!(first.study_note_ids, vec!["f1"]);
        assert_eq!(first.variant_ids, vec!["fvar1"]);
        assert_eq!(first.cross_ref_targets, vec!["Ps_vchap32-6", "John_vchap1-3"]);
        assert_eq!(first.cross_ref_text.as_deref(), Some("see also"));
        assert_eq!(first.annotation_markers.len(), 3);

        assert_eq!(passages["Gen_vchap1-2"].text, "The earth was void.");
        assert_eq!(registry.annotation("f1").unwrap().passage_ids, vec!["Gen_vchap1-1"]);
        assert_eq!(
            registry.annotation("fvar1").unwrap().passage_ids,
            vec!["Gen_vchap1-1"]
        );
    }

    #[test]
    fn test_first_resolvable_cross_ref_wins() {
        let mut registry = Registry::new();
        let mut table = CrossRefTable::new();
        for (id, target) in [("fcross1", None), ("fcross2", Some("A")), ("fcross3", Some("B"))] {
            table.insert(
                id.into(),
                CrossRef {
                    targets: target.map(|t| vec![t.to_string()]).unwrap_or_default(),
                    text: id.into(),
                    html: String::new(),
                },
            );
        }
        registry.set_cross_refs(table);

        let markers = MarkersByVerse::new();
        let found = vec!["fcross1".to_string(), "fcross2".to_string(), "fcross3".to_string()];
        let (targets, text) = resolve_cross_ref(&registry, &markers, "Gen_vchap1-1", &found);
        assert_eq!(targets, vec!["A"]);
        assert_eq!(text.as_deref(), Some("fcross2"));
    }
}
