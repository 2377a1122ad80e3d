//! Metadata record extraction from a parsed package document.
//!
//! Every field is extracted on its own. A field that is missing or has an
//! unusable shape takes its default and a warning is logged; it never
//! prevents the other fields from being read.

use std::path::Path;

use crate::epub::isbn::is_isbn13;
use crate::epub::package::{MetaEntry, MetaValue, PackageDocument};
use crate::error::FieldError;

/// Author used when the package names no creator.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Year used when the package has no usable date.
pub const UNKNOWN_YEAR: u16 = 9999;

type FieldResult<T> = std::result::Result<T, FieldError>;

/// Book metadata extracted from an EPUB package document.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Metadata {
    pub title: String,
    pub author: String,
    pub year: u16,
    pub identifiers: Identifiers,
    pub tags: Vec<String>,
}

/// Identifiers recognised in the package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Identifiers {
    /// ISBN values in document order. The same value may appear more than
    /// once if two entries describe it.
    pub isbn: Vec<String>,
    pub other: Vec<OtherId>,
}

impl Identifiers {
    pub fn is_empty(&self) -> bool {
        self.isbn.is_empty() && self.other.is_empty()
    }
}

/// A non-ISBN identifier with a recognised scheme.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct OtherId {
    pub scheme: IdScheme,
    pub value: String,
}

impl OtherId {
    pub fn new(scheme: IdScheme, value: impl Into<String>) -> Self {
        Self {
            scheme,
            value: value.into(),
        }
    }
}

/// Identifier schemes kept besides ISBN.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
#[cfg_attr(feature = "cli", serde(rename_all = "kebab-case"))]
pub enum IdScheme {
    MobiAsin,
    Amazon,
}

impl IdScheme {
    /// Match an `opf:scheme` attribute value, ignoring case.
    pub fn from_scheme(scheme: &str) -> Option<Self> {
        if scheme.eq_ignore_ascii_case("mobi-asin") {
            Some(IdScheme::MobiAsin)
        } else if scheme.eq_ignore_ascii_case("amazon") {
            Some(IdScheme::Amazon)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdScheme::MobiAsin => "mobi-asin",
            IdScheme::Amazon => "amazon",
        }
    }
}

impl std::fmt::Display for IdScheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Build a [`Metadata`] record from a package document.
///
/// `source` is the archive path; its file stem is the fallback title and it
/// identifies the book in log messages.
pub fn extract_metadata(doc: &PackageDocument, source: &Path) -> Metadata {
    let block = doc.metadata_block();
    if block.is_none() {
        tracing::warn!(file = %source.display(), "package document has no metadata block");
    }
    let field = |name: &str| block.as_ref().and_then(|b| b.field(name));

    let title = extract_title(field("title").as_ref()).unwrap_or_else(|reason| {
        tracing::warn!(file = %source.display(), %reason, "title not found");
        file_stem(source)
    });

    let author = extract_author(field("creator").as_ref()).unwrap_or_else(|reason| {
        tracing::warn!(file = %source.display(), %reason, "author not found");
        UNKNOWN_AUTHOR.to_string()
    });

    let year = extract_year(field("date").as_ref()).unwrap_or_else(|reason| {
        tracing::warn!(file = %source.display(), %reason, "year not found");
        UNKNOWN_YEAR
    });

    let mut identifiers = Identifiers::default();
    if let Err(reason) =
        collect_identifiers(field("identifier").as_ref(), source, &mut identifiers)
    {
        tracing::warn!(
            file = %source.display(),
            %reason,
            isbn = identifiers.isbn.len(),
            other = identifiers.other.len(),
            "problem reading identifiers"
        );
    }

    let tags = extract_tags(field("subject").as_ref()).unwrap_or_else(|reason| {
        match reason {
            FieldError::Missing => tracing::debug!(file = %source.display(), "no subjects"),
            _ => tracing::warn!(file = %source.display(), %reason, "tags not readable"),
        }
        Vec::new()
    });

    Metadata {
        title,
        author,
        year,
        identifiers,
        tags,
    }
}

fn extract_title(value: Option<&MetaValue<'_>>) -> FieldResult<String> {
    Ok(value.ok_or(FieldError::Missing)?.flatten()?.to_string())
}

fn extract_author(value: Option<&MetaValue<'_>>) -> FieldResult<String> {
    Ok(value.ok_or(FieldError::Missing)?.flatten()?.to_string())
}

/// The first four characters of the date, read as a number.
///
/// A shorter date is read whole, so `"65"` is the year 65.
fn extract_year(value: Option<&MetaValue<'_>>) -> FieldResult<u16> {
    let date = value.ok_or(FieldError::Missing)?.flatten()?;
    let end = date.char_indices().nth(4).map_or(date.len(), |(i, _)| i);
    date[..end]
        .trim()
        .parse()
        .map_err(|_| FieldError::InvalidYear(date.to_string()))
}

fn extract_tags(value: Option<&MetaValue<'_>>) -> FieldResult<Vec<String>> {
    match value.ok_or(FieldError::Missing)? {
        MetaValue::Single(entry) => entry
            .text()
            .map(|text| vec![text.to_string()])
            .ok_or(FieldError::NoText),
        MetaValue::List(entries) => Ok(entries
            .iter()
            .filter_map(|entry| entry.text())
            .map(str::to_string)
            .collect()),
    }
}

/// How one identifier entry is recorded.
#[derive(Debug, PartialEq, Eq)]
enum IdentifierKind {
    Isbn(String),
    Other(OtherId),
}

/// Classify one identifier entry. `Ok(None)` means the entry is ignored.
fn classify_identifier(entry: &MetaEntry<'_>) -> FieldResult<Option<IdentifierKind>> {
    match entry {
        MetaEntry::Bare(text) => {
            if !text.to_ascii_lowercase().contains("isbn") {
                return Ok(None);
            }
            let value = text.rsplit_once(':').map_or(*text, |(_, last)| last);
            Ok(Some(IdentifierKind::Isbn(value.to_string())))
        }
        MetaEntry::Structured(_) => {
            let Some(scheme) = entry.scheme() else {
                return Ok(None);
            };
            let missing = || FieldError::MissingIdentifierText(scheme.to_string());

            if scheme.eq_ignore_ascii_case("isbn") {
                let text = entry.text().ok_or_else(missing)?;
                return Ok(Some(IdentifierKind::Isbn(text.to_string())));
            }

            match IdScheme::from_scheme(scheme) {
                Some(id_scheme) => {
                    let text = entry.text().ok_or_else(missing)?;
                    Ok(Some(IdentifierKind::Other(OtherId::new(id_scheme, text))))
                }
                None => Ok(None),
            }
        }
    }
}

/// Add every recognised identifier to `ids`.
///
/// A listed entry that cannot be read is logged and skipped. On error, `ids`
/// keeps whatever was collected before it.
fn collect_identifiers(
    value: Option<&MetaValue<'_>>,
    source: &Path,
    ids: &mut Identifiers,
) -> FieldResult<()> {
    let value = value.ok_or(FieldError::Missing)?;

    match value {
        MetaValue::Single(entry) => {
            let kind = classify_identifier(entry)?;
            let captured_isbn = matches!(kind, Some(IdentifierKind::Isbn(_)));
            record(kind, ids);

            // A lone structured identifier that looks like an ISBN-13 counts
            // whatever its scheme says.
            if !captured_isbn
                && let MetaEntry::Structured(element) = entry
                && let Some(text) = element.text()
                && is_isbn13(text)
            {
                ids.isbn.push(text.to_string());
            }
        }
        MetaValue::List(entries) => {
            for entry in entries {
                match classify_identifier(entry) {
                    Ok(kind) => record(kind, ids),
                    Err(reason) => {
                        tracing::warn!(file = %source.display(), %reason, "identifier skipped");
                    }
                }
            }
        }
    }

    Ok(())
}

fn record(kind: Option<IdentifierKind>, ids: &mut Identifiers) {
    match kind {
        Some(IdentifierKind::Isbn(value)) => ids.isbn.push(value),
        Some(IdentifierKind::Other(other)) => ids.other.push(other),
        None => {}
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}
