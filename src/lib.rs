//! # osb-extract
//!
//! Extracts a structured corpus from the HTML files of a study-Bible EPUB:
//! verses, study notes, liturgical notes, textual variants, citation notes,
//! inline articles, cross-references and the table of patristic sources.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//!
//! use osb_extract::{ExtractOptions, JsonDirSink, extract, open_source};
//!
//! let options = ExtractOptions::default();
//! let source = open_source(Path::new("osb-epub"), &options.content_dir).unwrap();
//! let corpus = extract(source.as_ref(), &options).unwrap();
//!
//! println!("{}", corpus.summary());
//! corpus.load_into(&mut JsonDirSink::new("out")).unwrap();
//! ```
//!
//! ## Pipeline
//!
//! Book files are parsed once into an immutable arena DOM. Per file,
//! annotation markers are collected first (with the text just before each
//! one), presentation-only markers are then recorded in an ignore set, and
//! finally each verse is segmented by walking forward from its anchor. No
//! pass mutates the tree, so segmentation is repeatable and verses never
//! depend on each other.

pub mod articles;
pub mod boundary;
pub mod crossref;
pub mod dom;
pub mod error;
pub mod ids;
pub mod manifest;
pub mod markers;
pub mod model;
pub mod notes;
pub mod pipeline;
pub mod segment;
pub mod sink;
pub mod source;
pub mod text;
pub(crate) mod util;
pub mod walk;

pub use crossref::{CrossRef, CrossRefTable};
pub use error::{Error, Result};
pub use ids::VerseId;
pub use model::{
    Annotation, AnnotationKind, AnnotationMarker, Book, MarkerKind, Passage, PassageFormat,
    PatristicSource, Testament,
};
pub use pipeline::{Corpus, ExtractOptions, Registry, Summary, extract};
pub use segment::{Segment, Segmenter};
pub use sink::{CorpusSink, JsonDirSink};
pub use source::{ContentSource, DirSource, EpubSource, open_source};
