//! Package manifest and book resolution.
//!
//! Book files are manifest items with ids like `RW_05_Genesis` or
//! `RW_05_Genesis1` (ordinal, name, optional continuation number). A book's
//! abbreviations are the distinct verse-id prefixes found in its files; a
//! file group with several prefixes (Susanna, Daniel and Bel share one file)
//! becomes one book per prefix.

use std::collections::HashSet;
use std::sync::LazyLock;

use quick_xml::Reader;
use quick_xml::events::Event;
use regex::Regex;
use tracing::warn;

use crate::error::{Error, Result};
use crate::model::{Book, Testament};

static BOOK_ITEM_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^RW_(\d+)_(.+?)(\d*)$").expect("valid regex"));

static VERSE_ID_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"id="([A-Za-z0-9]+)_vchap"#).expect("valid regex"));

/// Order step between books split out of one file group.
pub const SPLIT_ORDER_STEP: f64 = 0.1;

/// Display names of books that share a file with other books.
const SPLIT_BOOK_NAMES: &[(&str, &str)] = &[
    ("Sus", "Susanna"),
    ("Dan", "Daniel"),
    ("Bel", "Bel and the Dragon"),
];

/// A book file listed in the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub order: u32,
    /// Book name as spelled in the item id, e.g. `Song_of_Songs`.
    pub name: String,
    /// Continuation number; `None` for the main file.
    pub continuation: Option<u32>,
    pub href: String,
}

impl ManifestEntry {
    /// `genesis` for `Genesis`, `songofsongs` for `Song_of_Songs`.
    pub fn book_id(&self) -> String {
        self.name.to_lowercase().replace('_', "")
    }
}

/// Book files of the manifest in manifest order.
///
/// Items whose id does not follow the book pattern, whose href is not an
/// `.html` file, or that are tables of contents are left out.
pub fn parse_manifest(opf: &str) -> Result<Vec<ManifestEntry>> {
    let mut reader = Reader::from_str(opf);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"item" => {
                let mut id = String::new();
                let mut href = String::new();
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"id" => id = String::from_utf8(attr.value.to_vec())?,
                        b"href" => href = String::from_utf8(attr.value.to_vec())?,
                        _ => {}
                    }
                }
                if let Some(entry) = book_entry(&id, href) {
                    entries.push(entry);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }
    Ok(entries)
}

fn book_entry(id: &str, href: String) -> Option<ManifestEntry> {
    let caps = BOOK_ITEM_ID.captures(id)?;
    if !href.ends_with(".html") {
        return None;
    }
    let name = caps.get(2)?.as_str();
    if name.to_lowercase().contains("_toc") {
        return None;
    }
    let continuation = match caps.get(3).map(|m| m.as_str()) {
        None | Some("") => None,
        Some(digits) => Some(digits.parse().ok()?),
    };
    Some(ManifestEntry {
        order: caps.get(1)?.as_str().parse().ok()?,
        name: name.to_string(),
        continuation,
        href,
    })
}

/// The files of one manifest book, main file first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookGroup {
    pub id: String,
    pub name: String,
    pub order: u32,
    pub files: Vec<String>,
}

/// Group entries by book id in first-seen order. Within a group the main
/// file comes first, then continuations by number; the main file's ordinal
/// and name stand for the group.
pub fn group_books(entries: &[ManifestEntry]) -> Vec<BookGroup> {
    let mut grouped: Vec<(String, Vec<&ManifestEntry>)> = Vec::new();
    for entry in entries {
        let id = entry.book_id();
        match grouped.iter_mut().find(|(gid, _)| *gid == id) {
            Some((_, members)) => members.push(entry),
            None => grouped.push((id, vec![entry])),
        }
    }

    grouped
        .into_iter()
        .filter_map(|(id, mut members)| {
            members.sort_by_key(|e| e.continuation.unwrap_or(0));
            let first = *members.first()?;
            Some(BookGroup {
                id,
                name: first.name.clone(),
                order: first.order,
                files: members.iter().map(|e| e.href.clone()).collect(),
            })
        })
        .collect()
}

/// Distinct verse-id prefixes of a book file, in order of first occurrence.
pub fn scan_abbreviations(html: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    VERSE_ID_PREFIX
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|abbrev| seen.insert(*abbrev))
        .map(str::to_string)
        .collect()
}

/// Display name of a book split out of a shared file.
pub fn split_book_name(abbrev: &str) -> &str {
    SPLIT_BOOK_NAMES
        .iter()
        .find(|(a, _)| *a == abbrev)
        .map(|(_, name)| *name)
        .unwrap_or(abbrev)
}

/// Turn file groups into books.
///
/// `abbreviations_of` returns the verse-id prefixes of one file. An
/// abbreviation already owned by an earlier book stays with that book, and a
/// book id already taken is skipped, so abbreviations and ids stay unique.
pub fn resolve_books<F>(groups: &[BookGroup], mut abbreviations_of: F, nt_start: u32) -> Vec<Book>
where
    F: FnMut(&str) -> Vec<String>,
{
    let mut books: Vec<Book> = Vec::new();
    let mut owned: HashSet<String> = HashSet::new();

    for group in groups {
        let mut abbreviations: Vec<String> = Vec::new();
        for file in &group.files {
            for abbrev in abbreviations_of(file) {
                if abbreviations.contains(&abbrev) {
                    continue;
                }
                if owned.contains(&abbrev) {
                    warn!(book = %group.id, %abbrev, "abbreviation already belongs to another book");
                    continue;
                }
                abbreviations.push(abbrev);
            }
        }

        let testament = if group.order >= nt_start {
            Testament::New
        } else {
            Testament::Old
        };
        let base_order = f64::from(group.order);

        let candidates: Vec<Book> = if abbreviations.len() > 1 {
            abbreviations
                .iter()
                .enumerate()
                .map(|(i, abbrev)| Book {
                    id: abbrev.to_lowercase(),
                    name: split_book_name(abbrev).to_string(),
                    abbreviations: vec![abbrev.clone()],
                    order: base_order + SPLIT_ORDER_STEP * i as f64,
                    testament,
                    files: group.files.clone(),
                })
                .collect()
        } else {
            vec![Book {
                id: group.id.clone(),
                name: group.name.replace('_', " "),
                abbreviations,
                order: base_order,
                testament,
                files: group.files.clone(),
            }]
        };

        for book in candidates {
            if books.iter().any(|b| b.id == book.id) {
                warn!(book = %book.id, "duplicate book id");
                continue;
            }
            owned.extend(book.abbreviations.iter().cloned());
            books.push(book);
        }
    }
    books
}
