//! epubsort - Sort EPUB files into an author/title tree

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use epubsort::sort::{SortOptions, Sorter, Transfer, find_epubs};
use epubsort::{Metadata, try_read_metadata};

#[derive(Parser)]
#[command(name = "epubsort")]
#[command(version, about = "Sort EPUB files into an author/title directory tree", long_about = None)]
#[command(after_help = "EXAMPLES:
    epubsort sort ~/Downloads ~/Books          Move every EPUB into ~/Books/<author>/<title>/
    epubsort sort --copy --dry-run in out      Show where books would be copied
    epubsort info book.epub                    Show book metadata

Set RUST_LOG (e.g. RUST_LOG=epubsort=debug) for finer log control.")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Log every placed book and fallback decision
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Sort every EPUB under SOURCE into DEST/<author>/<title>/
    Sort {
        /// Directory searched recursively for .epub files
        #[arg(value_name = "SOURCE")]
        source: PathBuf,

        /// Root of the sorted tree
        #[arg(value_name = "DEST")]
        dest: PathBuf,

        /// Copy books instead of moving them
        #[arg(short, long)]
        copy: bool,

        /// Print destinations without touching any file
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Threads used to read metadata
        #[arg(short, long, default_value_t = 1)]
        jobs: usize,
    },

    /// Show the metadata of one EPUB
    Info {
        /// EPUB file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let result = match cli.command {
        Command::Sort {
            source,
            dest,
            copy,
            dry_run,
            jobs,
        } => {
            let mode = if copy { Transfer::Copy } else { Transfer::Move };
            let options = SortOptions::new(dest)
                .with_mode(mode)
                .with_dry_run(dry_run)
                .with_jobs(jobs);
            sort(&source, options, cli.quiet)
        }
        Command::Info { file, json } => show_info(&file, json),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    let level = if verbose {
        tracing::Level::INFO
    } else if quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::WARN
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();
}

fn sort(source: &Path, options: SortOptions, quiet: bool) -> Result<(), String> {
    if !source.is_dir() {
        return Err(format!("{} is not a directory", source.display()));
    }

    let books = find_epubs(source);
    if !quiet {
        println!("Found {} EPUB files in {}", books.len(), source.display());
    }

    let dry_run = options.dry_run;
    let report = Sorter::new(options).run(&books);

    if dry_run && !quiet {
        for placed in &report.placed {
            println!("{} -> {}", placed.source.display(), placed.destination.display());
        }
    }

    for (path, reason) in &report.skipped {
        eprintln!("skipped {}: {reason}", path.display());
    }

    if !quiet {
        let verb = if dry_run { "would place" } else { "placed" };
        println!(
            "Done: {verb} {}, skipped {}",
            report.placed.len(),
            report.skipped.len()
        );
    }

    Ok(())
}

fn show_info(path: &Path, json: bool) -> Result<(), String> {
    let meta = try_read_metadata(path).map_err(|e| e.to_string())?;

    if json {
        let out = serde_json::to_string_pretty(&meta).map_err(|e| e.to_string())?;
        println!("{out}");
    } else {
        print_metadata(path, &meta);
    }

    Ok(())
}

fn print_metadata(path: &Path, meta: &Metadata) {
    println!("File: {}", path.display());
    println!("Title: {}", meta.title);
    println!("Author: {}", meta.author);
    println!("Year: {}", meta.year);
    if !meta.identifiers.isbn.is_empty() {
        println!("ISBN: {}", meta.identifiers.isbn.join(", "));
    }
    for other in &meta.identifiers.other {
        println!("{}: {}", other.scheme, other.value);
    }
    if !meta.tags.is_empty() {
        println!("Tags: {}", meta.tags.join(", "));
    }
}
