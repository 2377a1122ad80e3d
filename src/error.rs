//! Error types for epubsort operations.

use thiserror::Error;

/// Structural errors: the archive could not be read or no package document
/// could be resolved inside it. A book failing with one of these has no
/// metadata at all.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("No package document found in archive")]
    MissingPackageDocument,

    #[error("Missing required element: {0}")]
    MissingElement(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Why a single metadata field fell back to its default.
///
/// Only used for diagnostics; extraction never fails because of one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("field not present")]
    Missing,

    #[error("field is an empty list")]
    EmptyList,

    #[error("element has no text")]
    NoText,

    #[error("no four-digit year in {0:?}")]
    InvalidYear(String),

    #[error("{0} identifier has no text")]
    MissingIdentifierText(String),
}
