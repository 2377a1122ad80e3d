//! EPUB package metadata.
//!
//! [`EpubArchive`] locates and parses the package document; [`extract_metadata`]
//! turns it into a [`Metadata`] record. The `read_metadata*` functions do both.

mod archive;
mod isbn;
mod metadata;
mod package;

use std::io::{Read, Seek};
use std::path::Path;

pub use archive::{CONTAINER_PATH, EpubArchive, PRESUMPTIVE_PACKAGE_NAMES, parse_container_xml};
pub use isbn::is_isbn13;
pub use metadata::{
    IdScheme, Identifiers, Metadata, OtherId, UNKNOWN_AUTHOR, UNKNOWN_YEAR, extract_metadata,
};
pub use package::{Element, MetaEntry, MetaValue, MetadataBlock, PackageDocument};

use crate::error::Result;

/// Read the metadata of an EPUB file.
///
/// Returns `None` if the file is not a ZIP archive or has no resolvable
/// package document; the reason is logged. Missing or malformed individual
/// fields never cause `None`, they take their defaults instead.
///
/// # Example
///
/// ```no_run
/// if let Some(meta) = epubsort::read_metadata("Dune.epub") {
///     println!("{} by {} ({})", meta.title, meta.author, meta.year);
/// }
/// ```
pub fn read_metadata<P: AsRef<Path>>(path: P) -> Option<Metadata> {
    let path = path.as_ref();
    match try_read_metadata(path) {
        Ok(metadata) => Some(metadata),
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "no metadata");
            None
        }
    }
}

/// Read the metadata of an EPUB file, reporting structural failures.
pub fn try_read_metadata<P: AsRef<Path>>(path: P) -> Result<Metadata> {
    let path = path.as_ref();
    let mut archive = EpubArchive::open(path)?;
    let doc = archive.package_document()?;
    Ok(extract_metadata(&doc, path))
}

/// Read the metadata of an EPUB from any [`Read`] + [`Seek`] source.
///
/// `source` stands in for the file path: its stem is the fallback title.
///
/// ```no_run
/// use std::io::Cursor;
/// use std::path::Path;
///
/// let bytes = std::fs::read("book.epub")?;
/// let meta = epubsort::epub::read_metadata_from_reader(Cursor::new(bytes), Path::new("book.epub"))?;
/// # Ok::<(), epubsort::Error>(())
/// ```
pub fn read_metadata_from_reader<R: Read + Seek>(reader: R, source: &Path) -> Result<Metadata> {
    let mut archive = EpubArchive::from_reader(reader, source.display().to_string())?;
    let doc = archive.package_document()?;
    Ok(extract_metadata(&doc, source))
}
