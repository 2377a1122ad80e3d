//! # epubsort
//!
//! Organize EPUB files into an `author/title` directory tree using the
//! metadata embedded in each book's package document.
//!
//! ## Reading metadata
//!
//! ```no_run
//! use epubsort::read_metadata;
//!
//! match read_metadata("Dune.epub") {
//!     Some(meta) => {
//!         println!("{} by {} ({})", meta.title, meta.author, meta.year);
//!         for isbn in &meta.identifiers.isbn {
//!             println!("ISBN {isbn}");
//!         }
//!     }
//!     None => println!("not an EPUB, or no package document"),
//! }
//! ```
//!
//! Every field of a [`Metadata`] record always has a value: a missing title
//! becomes the file name without its extension, a missing author
//! [`UNKNOWN_AUTHOR`], and a missing year [`UNKNOWN_YEAR`].
//!
//! ## Sorting a library
//!
//! ```no_run
//! use epubsort::sort::{SortOptions, Sorter, find_epubs};
//!
//! let books = find_epubs("incoming");
//! let report = Sorter::new(SortOptions::new("library")).run(&books);
//! for (path, reason) in &report.skipped {
//!     eprintln!("skipped {}: {reason}", path.display());
//! }
//! ```

pub mod epub;
pub mod error;
pub mod sort;
pub(crate) mod util;

pub use epub::{
    Identifiers, IdScheme, Metadata, OtherId, UNKNOWN_AUTHOR, UNKNOWN_YEAR, extract_metadata,
    read_metadata, try_read_metadata,
};
pub use error::{Error, FieldError, Result};
