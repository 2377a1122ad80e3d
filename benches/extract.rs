//! Benchmarks for metadata extraction.
//!
//! Run with: cargo bench

use std::io::{Cursor, Write};
use std::path::Path;

use criterion::{Criterion, criterion_group, criterion_main};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use epubsort::epub::{PackageDocument, extract_metadata, read_metadata_from_reader};

const CONTAINER: &str = r#"<?xml version="1.0"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

const OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    <dc:title>Dune</dc:title>
    <dc:creator opf:role="aut" opf:file-as="Herbert, Frank">Frank Herbert</dc:creator>
    <dc:date>1965-08-01</dc:date>
    <dc:identifier id="uid" opf:scheme="uuid">3b2e1f4a-0000-4000-8000-000000000000</dc:identifier>
    <dc:identifier opf:scheme="ISBN">9780441013593</dc:identifier>
    <dc:identifier opf:scheme="MOBI-ASIN">B00B7NPRY8</dc:identifier>
    <dc:subject>Science Fiction</dc:subject>
    <dc:subject>Classics</dc:subject>
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine><itemref idref="ch1"/></spine>
</package>"#;

fn build_epub() -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in [
        ("mimetype", "application/epub+zip"),
        ("META-INF/container.xml", CONTAINER),
        ("OEBPS/content.opf", OPF),
        ("OEBPS/ch1.xhtml", "<html><body><p>The spice must flow.</p></body></html>"),
    ] {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn bench_read_metadata(c: &mut Criterion) {
    let epub = build_epub();
    c.bench_function("read_metadata", |b| {
        b.iter(|| read_metadata_from_reader(Cursor::new(&epub[..]), Path::new("dune.epub")).unwrap());
    });
}

fn bench_extract_metadata(c: &mut Criterion) {
    let doc = PackageDocument::parse(OPF).unwrap();
    c.bench_function("extract_metadata", |b| {
        b.iter(|| extract_metadata(&doc, Path::new("dune.epub")));
    });
}

criterion_group!(benches, bench_read_metadata, bench_extract_metadata);
criterion_main!(benches);
