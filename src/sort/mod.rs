//! Sorting EPUB files into an `author/title` directory tree.
//!
//! ```no_run
//! use epubsort::sort::{SortOptions, Sorter, Transfer, find_epubs};
//!
//! let books = find_epubs("/home/me/Downloads");
//! let sorter = Sorter::new(SortOptions::new("/home/me/Books").with_mode(Transfer::Copy));
//! let report = sorter.run(&books);
//! println!("{} placed, {} skipped", report.placed.len(), report.skipped.len());
//! ```

mod path;
mod scan;

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use thiserror::Error;

use crate::epub::{Metadata, read_metadata};

pub use path::{book_destination, book_dir, display_author, sanitize_component};
pub use scan::find_epubs;

/// What to do with a book once its destination is known.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Transfer {
    #[default]
    Move,
    Copy,
}

/// Configuration for a [`Sorter`].
#[derive(Debug, Clone)]
pub struct SortOptions {
    /// Root of the output tree.
    pub dest: PathBuf,
    pub mode: Transfer,
    /// Compute destinations without touching the filesystem.
    pub dry_run: bool,
    /// Number of threads used to read metadata. `0` or `1` reads sequentially.
    pub jobs: usize,
}

impl SortOptions {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self {
            dest: dest.into(),
            mode: Transfer::default(),
            dry_run: false,
            jobs: 1,
        }
    }

    pub fn with_mode(mut self, mode: Transfer) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs;
        self
    }
}

/// Why a book was left where it was.
#[derive(Error, Debug)]
pub enum SkipReason {
    #[error("no readable metadata")]
    NoMetadata,

    #[error("source has no file name")]
    NoFileName,

    #[error("destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),

    #[error("transfer failed: {0}")]
    Transfer(#[from] io::Error),
}

/// A book that was (or, in a dry run, would be) placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub metadata: Metadata,
}

/// Outcome of a sorting run.
#[derive(Debug, Default)]
pub struct SortReport {
    pub placed: Vec<Placed>,
    pub skipped: Vec<(PathBuf, SkipReason)>,
}

/// Places EPUB files under `dest/<author>/<title>/`.
pub struct Sorter {
    options: SortOptions,
}

impl Sorter {
    pub fn new(options: SortOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SortOptions {
        &self.options
    }

    /// Sort every book in `books`.
    ///
    /// Metadata is read first (in parallel when `jobs > 1`), then books are
    /// transferred one at a time. A book that fails is recorded in the report
    /// and never stops the rest.
    pub fn run(&self, books: &[PathBuf]) -> SortReport {
        let metadata = self.read_all(books);
        let mut report = SortReport::default();
        let mut claimed = HashSet::new();

        for (source, metadata) in books.iter().zip(metadata) {
            match self.place(source, metadata, &mut claimed) {
                Ok(placed) => {
                    tracing::info!(
                        from = %placed.source.display(),
                        to = %placed.destination.display(),
                        "placed book"
                    );
                    report.placed.push(placed);
                }
                Err(reason) => {
                    tracing::warn!(file = %source.display(), %reason, "skipping book");
                    report.skipped.push((source.clone(), reason));
                }
            }
        }

        report
    }

    fn read_all(&self, books: &[PathBuf]) -> Vec<Option<Metadata>> {
        if self.options.jobs > 1 {
            match rayon::ThreadPoolBuilder::new()
                .num_threads(self.options.jobs)
                .build()
            {
                Ok(pool) => return pool.install(|| books.par_iter().map(read_metadata).collect()),
                Err(e) => tracing::warn!(error = %e, "thread pool unavailable, reading sequentially"),
            }
        }
        books.iter().map(read_metadata).collect()
    }

    /// Transfer one book. `claimed` holds the destinations already taken in
    /// this run, so a dry run skips the same books a real run would.
    fn place(
        &self,
        source: &Path,
        metadata: Option<Metadata>,
        claimed: &mut HashSet<PathBuf>,
    ) -> Result<Placed, SkipReason> {
        let metadata = metadata.ok_or(SkipReason::NoMetadata)?;
        let destination = book_destination(&self.options.dest, &metadata, source)
            .ok_or(SkipReason::NoFileName)?;

        if destination.exists() || claimed.contains(&destination) {
            return Err(SkipReason::DestinationExists(destination));
        }

        if !self.options.dry_run {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            match self.options.mode {
                Transfer::Move => move_file(source, &destination)?,
                Transfer::Copy => {
                    fs::copy(source, &destination)?;
                }
            }
        }

        claimed.insert(destination.clone());
        Ok(Placed {
            source: source.to_path_buf(),
            destination,
            metadata,
        })
    }
}

/// Rename `from` to `to`, copying and removing when they are on different
/// filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(from, to)?;
            fs::remove_file(from)
        }
        result => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_options_builder() {
        let options = SortOptions::new("/out")
            .with_mode(Transfer::Copy)
            .with_dry_run(true)
            .with_jobs(4);
        assert_eq!(options.dest, PathBuf::from("/out"));
        assert_eq!(options.mode, Transfer::Copy);
        assert!(options.dry_run);
        assert_eq!(options.jobs, 4);
        assert_eq!(SortOptions::new("/x").mode, Transfer::Move);
    }

    #[test]
    fn test_move_file() {
        let dir = TempDir::new().unwrap();
        let from = dir.path().join("a.epub");
        let to = dir.path().join("b.epub");
        fs::write(&from, b"data").unwrap();

        move_file(&from, &to).unwrap();
        assert!(!from.exists());
        assert_eq!(fs::read(&to).unwrap(), b"data");
    }

    #[test]
    fn test_unreadable_books_are_skipped() {
        let dir = TempDir::new().unwrap();
        let bogus = dir.path().join("bogus.epub");
        fs::write(&bogus, b"not a zip").unwrap();
        let missing = dir.path().join("missing.epub");

        let sorter = Sorter::new(SortOptions::new(dir.path().join("out")).with_jobs(2));
        let report = sorter.run(&[bogus.clone(), missing]);

        assert!(report.placed.is_empty());
        assert_eq!(report.skipped.len(), 2);
        assert!(matches!(report.skipped[0].1, SkipReason::NoMetadata));
        assert!(bogus.exists());
    }

    #[test]
    fn test_skip_reason_display() {
        let reason = SkipReason::DestinationExists(PathBuf::from("/out/a.epub"));
        assert_eq!(reason.to_string(), "destination already exists: /out/a.epub");
    }
}
