//! Destination path construction.

use std::path::{Path, PathBuf};

use crate::epub::Metadata;

/// Stand-in for a component that sanitizes to nothing.
const EMPTY_COMPONENT: &str = "Unknown";

/// Render an author written `"Last, First"` as `"First Last"`.
///
/// Only the first two comma-separated parts are used, so a suffix such as
/// `", Jr."` is dropped. Names without a comma are returned unchanged.
pub fn display_author(author: &str) -> String {
    let mut parts = author.split(',');
    match (parts.next(), parts.next()) {
        (Some(last), Some(first)) => {
            let first = first.strip_prefix(' ').unwrap_or(first);
            format!("{first} {last}")
        }
        _ => author.to_string(),
    }
}

/// Make one path component safe on every platform we care about.
///
/// Colons are removed (invalid on Windows), path separators become `_` so a
/// title cannot add directory levels, and surrounding whitespace and
/// trailing dots are trimmed.
pub fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| *c != ':')
        .map(|c| match c {
            '/' | '\\' => '_',
            c if c.is_control() => ' ',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim().trim_end_matches('.').trim_end();
    if trimmed.is_empty() {
        EMPTY_COMPONENT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Directory a book belongs in: `dest/<author>/<title>`.
pub fn book_dir(dest: &Path, metadata: &Metadata) -> PathBuf {
    dest.join(sanitize_component(&display_author(&metadata.author)))
        .join(sanitize_component(&metadata.title))
}

/// Full destination of `source` under `dest`, keeping its file name.
///
/// Returns `None` if `source` has no file name.
pub fn book_destination(dest: &Path, metadata: &Metadata, source: &Path) -> Option<PathBuf> {
    source
        .file_name()
        .map(|name| book_dir(dest, metadata).join(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::epub::Identifiers;

    fn metadata(title: &str, author: &str) -> Metadata {
        Metadata {
            title: title.into(),
            author: author.into(),
            year: 1994,
            identifiers: Identifiers::default(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_display_author() {
        assert_eq!(display_author("Goodkind, Terry"), "Terry Goodkind");
        assert_eq!(display_author("Goodkind,Terry"), "Terry Goodkind");
        assert_eq!(display_author("Terry Goodkind"), "Terry Goodkind");
        assert_eq!(display_author("Unknown"), "Unknown");
    }

    #[test]
    fn test_display_author_drops_suffix() {
        assert_eq!(display_author("Tolkien, J. R. R., Jr."), "J. R. R. Tolkien");
        assert_eq!(display_author("Doe, Jane, PhD"), "Jane Doe");
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("Dune: Messiah"), "Dune Messiah");
        assert_eq!(sanitize_component("AC/DC"), "AC_DC");
        assert_eq!(sanitize_component("  Title.  "), "Title");
        assert_eq!(sanitize_component("..."), "Unknown");
        assert_eq!(sanitize_component("::"), "Unknown");
        assert_eq!(sanitize_component("Line\nBreak"), "Line Break");
    }

    #[test]
    fn test_book_destination() {
        let meta = metadata("Wizard's First Rule: Book 1", "Goodkind, Terry");
        let dest = book_destination(Path::new("/out"), &meta, Path::new("/in/wfr.epub")).unwrap();
        assert_eq!(
            dest,
            Path::new("/out/Terry Goodkind/Wizard's First Rule Book 1/wfr.epub")
        );
    }

    #[test]
    fn test_book_destination_without_file_name() {
        let meta = metadata("T", "A");
        assert!(book_destination(Path::new("/out"), &meta, Path::new("/")).is_none());
    }
}
