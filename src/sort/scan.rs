//! Discovering candidate EPUB files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// Recursively collect EPUB files under `root`, sorted by path.
///
/// Files are matched on a case-insensitive `.epub` extension; macOS
/// resource fork files (`._name.epub`) are skipped, as are directory
/// entries that cannot be read.
pub fn find_epubs<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let mut epubs: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_epub(path))
        .collect();

    epubs.sort();
    epubs
}

fn is_epub(path: &Path) -> bool {
    let has_extension = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("epub"));
    let resource_fork = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with("._"));

    has_extension && !resource_fork
}
