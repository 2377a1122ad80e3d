//! Locating and loading the package document inside an EPUB archive.

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use percent_encoding::percent_decode_str;
use quick_xml::Reader;
use quick_xml::events::Event;
use zip::ZipArchive;

use crate::epub::package::{PackageDocument, local_name, unescape};
use crate::error::{Error, Result};
use crate::util::decode_xml;

/// Where the container descriptor lives in a well-formed EPUB.
pub const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Package document names tried, in order, when the container descriptor is
/// missing or points nowhere.
pub const PRESUMPTIVE_PACKAGE_NAMES: [&str; 3] = ["content.opf", "package.opf", "volume.opf"];

/// An opened EPUB archive.
///
/// The archive handle is released when this value is dropped.
pub struct EpubArchive<R> {
    archive: ZipArchive<R>,
    /// Entry names in central directory order.
    entries: Vec<String>,
    /// Display name of the archive for diagnostics.
    source: String,
}

impl EpubArchive<BufReader<File>> {
    /// Open an EPUB file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file), path.display().to_string())
    }
}

impl<R: Read + Seek> EpubArchive<R> {
    /// Open an EPUB from any [`Read`] + [`Seek`] source.
    pub fn from_reader(reader: R, source: impl Into<String>) -> Result<Self> {
        let archive = ZipArchive::new(reader)?;
        let entries = archive.file_names().map(str::to_string).collect();

        Ok(Self {
            archive,
            entries,
            source: source.into(),
        })
    }

    /// All entry names in the archive.
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Find an entry by name.
    ///
    /// The requested name is percent-decoded first. An exact match wins;
    /// otherwise the first entry with the same file name anywhere in the
    /// archive is returned.
    pub fn find_entry(&self, name: &str) -> Option<&str> {
        if let Some(entry) = self.entries.iter().find(|e| e.as_str() == name) {
            return Some(entry.as_str());
        }

        let wanted = normalize_entry_name(name);
        if let Some(entry) = self
            .entries
            .iter()
            .find(|e| normalize_entry_name(e) == wanted)
        {
            return Some(entry.as_str());
        }

        let wanted_base = basename(&wanted);
        let found = self
            .entries
            .iter()
            .find(|e| basename(&normalize_entry_name(e)) == wanted_base)
            .map(String::as_str);

        if found.is_none() {
            tracing::debug!(file = %self.source, entry = %wanted, "entry not found in archive");
        }
        found
    }

    /// Read an entry by its exact stored name.
    pub fn read_entry(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut file = self.archive.by_name(name)?;
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Resolve the stored name of the package document.
    ///
    /// The container descriptor is consulted first. If it is absent,
    /// unreadable, or names an entry that does not exist, the presumptive
    /// package names are tried in priority order.
    pub fn package_path(&mut self) -> Result<String> {
        if let Some(container) = self.find_entry(CONTAINER_PATH).map(str::to_string) {
            match self.read_entry(&container).and_then(|bytes| parse_container_xml(&bytes)) {
                Ok(declared) => match self.find_entry(&declared) {
                    Some(path) => return Ok(path.to_string()),
                    None => tracing::warn!(
                        file = %self.source,
                        package = %declared,
                        "container.xml names a package document that is not in the archive"
                    ),
                },
                Err(e) => tracing::warn!(
                    file = %self.source,
                    error = %e,
                    "could not read container.xml"
                ),
            }
        }

        let presumptive = PRESUMPTIVE_PACKAGE_NAMES
            .iter()
            .find_map(|name| self.find_entry(name))
            .map(str::to_string)
            .ok_or(Error::MissingPackageDocument)?;

        tracing::info!(file = %self.source, package = %presumptive, "using presumptive package file");
        Ok(presumptive)
    }

    /// Resolve, read and parse the package document.
    pub fn package_document(&mut self) -> Result<PackageDocument> {
        let path = self.package_path()?;
        let bytes = self.read_entry(&path)?;
        PackageDocument::from_bytes(&bytes)
    }
}

/// Parse META-INF/container.xml to find the package document path.
///
/// The first `<rootfile>` declaring a `full-path` wins.
pub fn parse_container_xml(bytes: &[u8]) -> Result<String> {
    let content = decode_xml(bytes);

    let mut reader = Reader::from_str(&content);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event()? {
            Event::Empty(e) | Event::Start(e) if local_name(e.name().as_ref()) == b"rootfile" => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Ok(unescape(&String::from_utf8_lossy(&attr.value)));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Err(Error::MissingElement("rootfile in container.xml".into()))
}

/// Percent-decode an entry name and use forward slashes.
fn normalize_entry_name(name: &str) -> Cow<'_, str> {
    let decoded = percent_decode_str(name).decode_utf8_lossy();
    if decoded.contains('\\') {
        Cow::Owned(decoded.replace('\\', "/"))
    } else {
        decoded
    }
}

fn basename(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}
