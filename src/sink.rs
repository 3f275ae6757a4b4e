//! Persistence sinks for an extracted corpus.
//!
//! A sink receives the four collections in a fixed order (see
//! [`Corpus::load_into`](crate::pipeline::Corpus::load_into)). The bundled
//! [`JsonDirSink`] writes one JSON array per collection plus an index
//! manifest describing the lookups a document store should build.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::model::{Annotation, Book, Passage, PatristicSource};

/// Destination of an extracted corpus.
pub trait CorpusSink {
    /// Remove whatever a previous run stored.
    fn clear(&mut self) -> Result<()>;
    fn load_books(&mut self, books: &[Book]) -> Result<()>;
    fn load_passages(&mut self, passages: &[Passage]) -> Result<()>;
    fn load_annotations(&mut self, annotations: &[Annotation]) -> Result<()>;
    fn load_patristic_sources(&mut self, sources: &[PatristicSource]) -> Result<()>;
    /// Create secondary indexes once everything is loaded.
    fn create_indexes(&mut self) -> Result<()>;
}

pub const BOOKS_FILE: &str = "books.json";
pub const PASSAGES_FILE: &str = "passages.json";
pub const ANNOTATIONS_FILE: &str = "annotations.json";
pub const PATRISTIC_SOURCES_FILE: &str = "patristic_sources.json";
pub const INDEXES_FILE: &str = "indexes.json";

const OUTPUT_FILES: &[&str] = &[
    BOOKS_FILE,
    PASSAGES_FILE,
    ANNOTATIONS_FILE,
    PATRISTIC_SOURCES_FILE,
    INDEXES_FILE,
];

/// One secondary index: a collection and the fields it is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexSpec {
    pub collection: &'static str,
    pub fields: Vec<&'static str>,
}

impl IndexSpec {
    fn new(collection: &'static str, fields: &[&'static str]) -> Self {
        Self {
            collection,
            fields: fields.to_vec(),
        }
    }
}

/// Lookups readers of the corpus rely on: verses by book, chapter and
/// verse, verses by any annotation they reference, and annotations by kind,
/// verse and cited source.
pub fn secondary_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::new("passages", &["book_id"]),
        IndexSpec::new("passages", &["book_id", "chapter"]),
        IndexSpec::new("passages", &["book_id", "chapter", "verse"]),
        IndexSpec::new("passages", &["cross_ref_targets"]),
        IndexSpec::new("passages", &["study_note_ids"]),
        IndexSpec::new("passages", &["liturgical_ids"]),
        IndexSpec::new("passages", &["variant_ids"]),
        IndexSpec::new("passages", &["citation_ids"]),
        IndexSpec::new("passages", &["article_ids"]),
        IndexSpec::new("passages", &["annotation_markers.id"]),
        IndexSpec::new("annotations", &["type"]),
        IndexSpec::new("annotations", &["passage_ids"]),
        IndexSpec::new("annotations", &["patristic_citations"]),
    ]
}

/// Book record as stored: the book plus its primary abbreviation, which
/// older readers look up directly.
#[derive(Serialize)]
struct BookRecord<'a> {
    #[serde(flatten)]
    book: &'a Book,
    abbreviation: &'a str,
}

/// Writes each collection as a JSON array into a directory.
pub struct JsonDirSink {
    dir: PathBuf,
    pretty: bool,
}

impl JsonDirSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pretty: false,
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let mut writer = BufWriter::new(File::create(&path)?);
        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, value)?;
        } else {
            serde_json::to_writer(&mut writer, value)?;
        }
        writer.write_all(b"\n")?;
        writer.flush()?;
        debug!(path = %path.display(), "wrote collection");
        Ok(())
    }
}

impl CorpusSink for JsonDirSink {
    fn clear(&mut self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        for name in OUTPUT_FILES {
            let path = self.dir.join(name);
            if path.is_file() {
                fs::remove_file(path)?;
            }
        }
        Ok(())
    }

    fn load_books(&mut self, books: &[Book]) -> Result<()> {
        let records: Vec<BookRecord<'_>> = books
            .iter()
            .map(|book| BookRecord {
                book,
                abbreviation: book.primary_abbreviation(),
            })
            .collect();
        self.write(BOOKS_FILE, &records)?;
        info!(count = books.len(), "loaded books");
        Ok(())
    }

    fn load_passages(&mut self, passages: &[Passage]) -> Result<()> {
        self.write(PASSAGES_FILE, passages)?;
        info!(count = passages.len(), "loaded passages");
        Ok(())
    }

    fn load_annotations(&mut self, annotations: &[Annotation]) -> Result<()> {
        self.write(ANNOTATIONS_FILE, annotations)?;
        info!(count = annotations.len(), "loaded annotations");
        Ok(())
    }

    fn load_patristic_sources(&mut self, sources: &[PatristicSource]) -> Result<()> {
        self.write(PATRISTIC_SOURCES_FILE, sources)?;
        info!(count = sources.len(), "loaded patristic sources");
        Ok(())
    }

    fn create_indexes(&mut self) -> Result<()> {
        self.write(INDEXES_FILE, &secondary_indexes())
    }
}
