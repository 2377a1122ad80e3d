//! Helpers for building small EPUB archives in tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Builder for an EPUB archive held in memory.
#[derive(Default)]
pub struct EpubBuilder {
    files: Vec<(String, Vec<u8>)>,
}

impl EpubBuilder {
    /// An archive containing only the `mimetype` entry.
    pub fn new() -> Self {
        Self::default().file("mimetype", "application/epub+zip")
    }

    /// A conventional EPUB: container.xml pointing at `OEBPS/content.opf`
    /// whose metadata block is `metadata`.
    pub fn standard(metadata: &str) -> Self {
        Self::new()
            .file("META-INF/container.xml", container_xml("OEBPS/content.opf"))
            .file("OEBPS/content.opf", opf(metadata))
    }

    pub fn file(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.files.push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

        for (name, content) in &self.files {
            // mimetype must be stored uncompressed
            let method = if name == "mimetype" {
                CompressionMethod::Stored
            } else {
                CompressionMethod::Deflated
            };
            let options = SimpleFileOptions::default().compression_method(method);
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(content).unwrap();
        }

        zip.finish().unwrap().into_inner()
    }

    /// Write the archive to `dir/name` and return its path.
    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

pub fn container_xml(full_path: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="{full_path}" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#
    )
}

pub fn opf(metadata: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="2.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:opf="http://www.idpf.org/2007/opf">
    {metadata}
  </metadata>
  <manifest>
    <item id="ch1" href="ch1.xhtml" media-type="application/xhtml+xml"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
  </spine>
</package>"#
    )
}

pub const DUNE: &str = r#"<dc:title>Dune</dc:title>
    <dc:creator opf:role="aut">Frank Herbert</dc:creator>
    <dc:date>1965-08-01</dc:date>
    <dc:identifier opf:scheme="isbn">9780441013593</dc:identifier>"#;
