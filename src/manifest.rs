//! The APP-LIST.xml document: typed records, an append-only builder and a
//! canonical XML formatter.
//!
//! The document shape is fixed by the APS package format: a single `files`
//! root element in the `http://apstandard.com/ns/1` namespace (with the
//! `ns2` signature namespace declared even when unused), containing one
//! `file` child per content entry with the attributes `sha256`, `size` and
//! `name`, in that order. The formatter is deterministic: identical input
//! records always serialize to byte-identical XML.

use std::fmt::Write;

/// Name of the manifest entry inside the archive.
pub const MANIFEST_ENTRY_NAME: &str = "APP-LIST.xml";

/// Namespace of the `files` root element.
pub const FILES_NAMESPACE: &str = "http://apstandard.com/ns/1";

/// Auxiliary XML digital-signature namespace, bound to the `ns2` prefix.
pub const XMLDSIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";

const XML_DECLARATION: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>";
const INDENT: &str = "    ";

/// One line of the manifest: a content entry's name, declared size and the
/// SHA-256 digest of its decompressed bytes (64 lowercase hex characters).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestRecord {
    pub name: String,
    pub size: u64,
    pub sha256: String,
}

/// Append-only builder for the manifest document.
///
/// Records are kept in insertion order, which the pipeline guarantees to be
/// the archive's index order. The builder never contains a record for the
/// manifest entry itself; the caller filters that name out before hashing.
#[derive(Debug, Default)]
pub struct AppList {
    records: Vec<ManifestRecord>,
}

impl AppList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record. Order of calls is preserved in the serialized output.
    pub fn push(&mut self, record: ManifestRecord) {
        self.records.push(record);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes the manifest to its canonical pretty-printed UTF-8 form.
    ///
    /// Attribute order within each `file` element is fixed (`sha256`, `size`,
    /// `name`) and attribute values are XML-escaped, so the output is stable
    /// across runs for identical records.
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push('\n');
        if self.records.is_empty() {
            let _ = writeln!(out, "<files xmlns=\"{}\" xmlns:ns2=\"{}\"/>", FILES_NAMESPACE, XMLDSIG_NAMESPACE);
            return out;
        }
        let _ = writeln!(out, "<files xmlns=\"{}\" xmlns:ns2=\"{}\">", FILES_NAMESPACE, XMLDSIG_NAMESPACE);
        for record in &self.records {
            let _ = writeln!(
                out,
                "{}<file sha256=\"{}\" size=\"{}\" name=\"{}\"/>",
                INDENT,
                record.sha256,
                record.size,
                escape_attr(&record.name)
            );
        }
        out.push_str("</files>\n");
        out
    }
}

/// Escapes the five XML-special characters for use inside a double-quoted
/// attribute value.
fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
