//! Where corpus files come from.
//!
//! The extractor reads a handful of named files (manifest, note files, book
//! files) relative to the EPUB content directory. Both an unpacked EPUB
//! directory and a packed `.epub` archive can serve them.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};
use crate::util::decode_text;

/// Read-only access to the files of one EPUB content directory.
pub trait ContentSource: Send + Sync {
    /// Raw bytes of `name`, or `None` when the file does not exist.
    fn read_bytes(&self, name: &str) -> Result<Option<Vec<u8>>>;

    /// Decoded text of `name`, or `None` when the file does not exist.
    fn read_text(&self, name: &str) -> Result<Option<String>> {
        Ok(self
            .read_bytes(name)?
            .map(|bytes| decode_text(&bytes).into_owned()))
    }

    /// Manifest file name when the source knows it (from container.xml).
    fn manifest_hint(&self) -> Option<String> {
        None
    }

    /// Human-readable location for log lines.
    fn describe(&self) -> String;
}

/// Open `path` as either an unpacked EPUB directory or an `.epub` archive.
///
/// For directories, `content_dir` (normally `OEBPS`) is used when present;
/// otherwise the directory itself is taken as the content root.
pub fn open_source(path: &Path, content_dir: &str) -> Result<Box<dyn ContentSource>> {
    if path.is_dir() {
        let nested = path.join(content_dir);
        let root = if nested.is_dir() {
            nested
        } else {
            path.to_path_buf()
        };
        return Ok(Box::new(DirSource::new(root)));
    }
    if path.is_file() {
        return Ok(Box::new(EpubSource::open(path)?));
    }
    Err(Error::UnsupportedSource(format!(
        "{} is neither a directory nor a file",
        path.display()
    )))
}

/// Files under an extracted EPUB content directory.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ContentSource for DirSource {
    fn read_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let path = self.root.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        Ok(Some(std::fs::read(path)?))
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}

/// Files inside a packed `.epub`, relative to the OPF's directory.
pub struct EpubSource {
    archive: Mutex<ZipArchive<File>>,
    label: String,
    opf_dir: String,
    opf_name: String,
}

impl EpubSource {
    pub fn open(path: &Path) -> Result<Self> {
        let mut archive = ZipArchive::new(File::open(path)?)?;
        let opf_path = find_opf_path(&mut archive)?;
        let (opf_dir, opf_name) = match opf_path.rsplit_once('/') {
            Some((dir, name)) => (dir.to_string(), name.to_string()),
            None => (String::new(), opf_path.clone()),
        };
        Ok(Self {
            archive: Mutex::new(archive),
            label: path.display().to_string(),
            opf_dir,
            opf_name,
        })
    }

    fn entry_path(&self, name: &str) -> String {
        if self.opf_dir.is_empty() {
            name.to_string()
        } else {
            format!("{}/{}", self.opf_dir, name)
        }
    }
}

impl ContentSource for EpubSource {
    fn read_bytes(&self, name: &str) -> Result<Option<Vec<u8>>> {
        let mut archive = self
            .archive
            .lock()
            .map_err(|_| Error::InvalidEpub("archive lock poisoned".into()))?;
        let entry = archive.by_name(&self.entry_path(name));
        match entry {
            Ok(mut file) => {
                let mut data = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut data)?;
                Ok(Some(data))
            }
            Err(ZipError::FileNotFound) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn manifest_hint(&self) -> Option<String> {
        Some(self.opf_name.clone())
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

fn find_opf_path(archive: &mut ZipArchive<File>) -> Result<String> {
    let mut container = String::new();
    archive
        .by_name("META-INF/container.xml")
        .map_err(|_| Error::InvalidEpub("missing META-INF/container.xml".into()))?
        .read_to_string(&mut container)?;

    let mut reader = Reader::from_str(&container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e)) if e.local_name().as_ref() == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(String::from_utf8(attr.value.to_vec())?);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Xml(e)),
            _ => {}
        }
    }

    Err(Error::InvalidEpub(
        "no rootfile found in container.xml".into(),
    ))
}
