//! Generic package document tree and the flattenable view of its metadata.
//!
//! The OPF is parsed into a small element tree with local names (namespace
//! prefixes stripped), then metadata fields are exposed as [`MetaValue`]s:
//! a field is either a single entry or a list of entries, and each entry is
//! either bare text or a structured element carrying attributes.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{Error, FieldError, Result};
use crate::util::decode_xml;

/// An XML element with its local name, attributes and direct text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attribute (local name, unescaped value) pairs in document order.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    /// Concatenated direct text content, trimmed.
    pub text: String,
}

impl Element {
    fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Look up an attribute by local name (`opf:scheme` matches `scheme`).
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct text content, or `None` if the element has none.
    pub fn text(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }
}

/// A parsed OPF package document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDocument {
    root: Element,
}

impl PackageDocument {
    /// Parse raw OPF bytes, detecting their text encoding.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&decode_xml(bytes))
    }

    /// Parse an OPF document into an element tree.
    pub fn parse(content: &str) -> Result<Self> {
        Ok(Self {
            root: parse_tree(content)?,
        })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The `<metadata>` block of the package, if any.
    pub fn metadata_block(&self) -> Option<MetadataBlock<'_>> {
        if self.root.name != "package" {
            return None;
        }
        self.root.child("metadata").map(|element| MetadataBlock { element })
    }
}

/// View over a package's `<metadata>` element.
#[derive(Debug, Clone, Copy)]
pub struct MetadataBlock<'a> {
    element: &'a Element,
}

impl<'a> MetadataBlock<'a> {
    /// Collect every element with the given local name.
    ///
    /// Children of the legacy OEB `<dc-metadata>`/`<x-metadata>` wrappers are
    /// searched as well.
    pub fn field(&self, name: &str) -> Option<MetaValue<'a>> {
        let element: &'a Element = self.element;
        let legacy = element
            .children
            .iter()
            .filter(|c| c.name == "dc-metadata" || c.name == "x-metadata")
            .flat_map(|c| c.children.iter());

        let mut entries: Vec<MetaEntry<'a>> = element
            .children
            .iter()
            .chain(legacy)
            .filter(|c| c.name == name)
            .map(MetaEntry::from_element)
            .collect();

        match entries.len() {
            0 => None,
            1 => entries.pop().map(MetaValue::Single),
            _ => Some(MetaValue::List(entries)),
        }
    }
}

/// One occurrence of a metadata element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaEntry<'a> {
    /// An element with text and nothing else.
    Bare(&'a str),
    /// An element carrying attributes (or no text at all).
    Structured(&'a Element),
}

impl<'a> MetaEntry<'a> {
    fn from_element(element: &'a Element) -> Self {
        match element.text() {
            Some(text) if element.attributes.is_empty() && element.children.is_empty() => {
                MetaEntry::Bare(text)
            }
            _ => MetaEntry::Structured(element),
        }
    }

    /// The text payload of this entry.
    pub fn text(&self) -> Option<&'a str> {
        match self {
            MetaEntry::Bare(text) => Some(*text),
            MetaEntry::Structured(element) => element.text(),
        }
    }

    /// The `scheme` attribute of a structured entry.
    pub fn scheme(&self) -> Option<&'a str> {
        match self {
            MetaEntry::Bare(_) => None,
            MetaEntry::Structured(element) => element.attr("scheme"),
        }
    }
}

/// A metadata field as found in the document: one entry or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue<'a> {
    Single(MetaEntry<'a>),
    List(Vec<MetaEntry<'a>>),
}

impl<'a> MetaValue<'a> {
    /// Resolve the field to one string: the first entry of a list, then the
    /// text payload of that entry.
    pub fn flatten(&self) -> std::result::Result<&'a str, FieldError> {
        let entry = match self {
            MetaValue::Single(entry) => entry,
            MetaValue::List(entries) => entries.first().ok_or(FieldError::EmptyList)?,
        };
        entry.text().ok_or(FieldError::NoText)
    }
}

// ----------------------------------------------------------------------------
// Tree construction
// ----------------------------------------------------------------------------

fn parse_tree(content: &str) -> Result<Element> {
    let mut reader = Reader::from_str(content);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(e) => stack.push(start_element(&e)),
            Event::Empty(e) => attach(start_element(&e), &mut stack, &mut root),
            Event::End(_) => {
                let mut element = stack
                    .pop()
                    .ok_or_else(|| Error::InvalidEpub("unbalanced end tag".into()))?;
                let trimmed = element.text.trim();
                if trimmed.len() != element.text.len() {
                    element.text = trimmed.to_string();
                }
                attach(element, &mut stack, &mut root);
            }
            Event::Text(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::CData(e) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                }
            }
            Event::GeneralRef(e) => {
                if let Some(current) = stack.last_mut() {
                    let entity = String::from_utf8_lossy(e.as_ref());
                    if let Some(c) = resolve_entity(&entity) {
                        current.text.push(c);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.first() {
        return Err(Error::InvalidEpub(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| Error::MissingElement("root element".into()))
}

fn start_element(e: &BytesStart<'_>) -> Element {
    let name = e.name();
    let mut element = Element::new(String::from_utf8_lossy(local_name(name.as_ref())).into_owned());

    for attr in e.attributes().flatten() {
        let key = attr.key.as_ref();
        // Namespace declarations carry no metadata
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let value = String::from_utf8_lossy(&attr.value);
        element.attributes.push((
            String::from_utf8_lossy(local_name(key)).into_owned(),
            unescape(&value),
        ));
    }

    element
}

fn attach(element: Element, stack: &mut [Element], root: &mut Option<Element>) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        // Only the first top-level element is the document root
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}

/// Extract local name from namespaced XML name (e.g., "dc:title" -> "title").
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .rposition(|&b| b == b':')
        .map(|i| &name[i + 1..])
        .unwrap_or(name)
}

/// Resolve XML entity references.
pub(crate) fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => return Some('\''),
        "quot" => return Some('"'),
        "lt" => return Some('<'),
        "gt" => return Some('>'),
        "amp" => return Some('&'),
        _ => {}
    }

    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}

/// Replace entity references in an attribute value. Unknown entities are
/// kept verbatim.
pub(crate) fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match tail.find(';').and_then(|semi| resolve_entity(&tail[1..semi]).map(|c| (c, semi))) {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}
