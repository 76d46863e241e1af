//! Contact-tracing documents (`.contact.xml` files)
//!
//! The document is kept as its original text together with the byte span of
//! every contact element directly under the document element. Filtering
//! removes spans and copies everything else verbatim, so retained elements,
//! attributes, comments and whitespace survive byte for byte.

use std::collections::HashSet;
use std::io::Write;
use std::ops::Range;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{Result, TruncateError};
use crate::infective::Label;
use crate::settings::ContactSchema;

/// A contact element located in the document text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactElement {
    pub id: Label,
    /// From `<` of the start tag to just past the closing `>`
    span: Range<usize>,
    /// Start of the whitespace run preceding the element (or `span.start`)
    removal_start: usize,
}

impl ContactElement {
    fn shifted_back(&self, by: usize) -> Self {
        Self {
            id: self.id,
            span: self.span.start - by..self.span.end - by,
            removal_start: self.removal_start - by,
        }
    }
}

/// Contact-tracing document held in memory
#[derive(Debug, Clone)]
pub struct ContactDocument {
    source: PathBuf,
    text: String,
    contacts: Vec<ContactElement>,
}

impl ContactDocument {
    /// Read and scan a contact document.
    pub fn load(path: &Path, schema: &ContactSchema) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| TruncateError::io(path, e))?;
        let text = String::from_utf8(bytes)
            .map_err(|e| TruncateError::structure(path, format!("document is not valid UTF-8: {}", e)))?;
        Self::parse(path, text, schema)
    }

    /// Scan document text. `source` is only used to label errors.
    pub fn parse(source: &Path, text: String, schema: &ContactSchema) -> Result<Self> {
        let contacts = scan_contacts(source, &text, schema)?;
        if contacts.is_empty() {
            tracing::warn!(path = %source.display(), "Contact document has no contact elements");
        }
        Ok(Self {
            source: source.to_path_buf(),
            text,
            contacts,
        })
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    /// Contact ids in document order
    pub fn contact_ids(&self) -> Vec<Label> {
        self.contacts.iter().map(|c| c.id).collect()
    }

    /// Exact text of the `index`-th contact element
    pub fn contact_text(&self, index: usize) -> Option<&str> {
        self.contacts.get(index).map(|c| &self.text[c.span.clone()])
    }

    /// Remove every contact whose id is not in `labels`.
    ///
    /// Spans to drop are collected first and the surviving text is built in
    /// a second pass, so adjacent removals cannot skip one another. Returns
    /// the number of contacts removed.
    pub fn retain_labels(&mut self, labels: &HashSet<Label>) -> usize {
        let removed = self
            .contacts
            .iter()
            .filter(|c| !labels.contains(&c.id))
            .count();
        if removed == 0 {
            return 0;
        }

        let mut text = String::with_capacity(self.text.len());
        let mut kept = Vec::with_capacity(self.contacts.len() - removed);
        let mut cursor = 0;
        let mut shift = 0;

        for contact in &self.contacts {
            if labels.contains(&contact.id) {
                kept.push(contact.shifted_back(shift));
            } else {
                tracing::debug!(id = contact.id, "Removing contact element");
                text.push_str(&self.text[cursor..contact.removal_start]);
                cursor = contact.span.end;
                shift += contact.span.end - contact.removal_start;
            }
        }
        text.push_str(&self.text[cursor..]);

        self.text = text;
        self.contacts = kept;
        removed
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writer.write_all(self.text.as_bytes())
    }
}

fn scan_contacts(source: &Path, text: &str, schema: &ContactSchema) -> Result<Vec<ContactElement>> {
    // The reader skips a byte-order mark, so positions are taken relative to
    // the text after it and moved back onto `text` at the end.
    let body = text.strip_prefix('\u{FEFF}').unwrap_or(text);
    let bom_len = text.len() - body.len();
    let bytes = body.as_bytes();
    let mut reader = NsReader::from_str(body);
    let mut contacts = Vec::new();
    let mut depth = 0usize;
    let mut seen_root = false;
    let mut open_contact: Option<(Label, usize)> = None;

    loop {
        let before = reader.buffer_position();
        let (is_contact, event) = match reader.read_resolved_event() {
            Ok((ns, event)) => {
                let in_namespace = match ns {
                    ResolveResult::Bound(Namespace(uri)) => uri == schema.namespace.as_bytes(),
                    ResolveResult::Unbound => schema.namespace.is_empty(),
                    ResolveResult::Unknown(prefix) => {
                        return Err(TruncateError::structure(
                            source,
                            format!(
                                "undeclared namespace prefix '{}'",
                                String::from_utf8_lossy(&prefix)
                            ),
                        ))
                    }
                };
                let is_contact = match &event {
                    Event::Start(e) | Event::Empty(e) => {
                        in_namespace && e.local_name().as_ref() == schema.element.as_bytes()
                    }
                    _ => false,
                };
                (is_contact, event)
            }
            Err(e) => {
                return Err(TruncateError::structure(
                    source,
                    format!("malformed XML after byte {}: {}", before, e),
                ))
            }
        };
        let after = reader.buffer_position();

        match event {
            Event::Start(e) => {
                if depth == 0 {
                    check_single_root(source, &mut seen_root)?;
                } else if depth == 1 && is_contact {
                    let id = contact_id(source, &e, schema)?;
                    // `<` + content + `>`
                    let start = tag_start(source, bytes, after, e.len() + 2)?;
                    open_contact = Some((id, start));
                }
                depth += 1;
            }
            Event::Empty(e) => {
                if depth == 0 {
                    check_single_root(source, &mut seen_root)?;
                } else if depth == 1 && is_contact {
                    let id = contact_id(source, &e, schema)?;
                    // `<` + content + `/>`
                    let start = tag_start(source, bytes, after, e.len() + 3)?;
                    contacts.push(element(bytes, id, start..after));
                }
            }
            Event::End(_) => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    TruncateError::structure(source, format!("unexpected end tag at byte {}", before))
                })?;
                if depth == 1 {
                    if let Some((id, start)) = open_contact.take() {
                        contacts.push(element(bytes, id, start..after));
                    }
                }
            }
            Event::Text(t) if depth == 0 => {
                if !t.iter().all(u8::is_ascii_whitespace) {
                    return Err(TruncateError::structure(
                        source,
                        format!("text outside the document element at byte {}", before),
                    ));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        return Err(TruncateError::structure(
            source,
            format!("{} element(s) left unclosed at end of document", depth),
        ));
    }
    if !seen_root {
        return Err(TruncateError::structure(source, "document has no root element"));
    }

    if bom_len > 0 {
        for contact in &mut contacts {
            contact.span = contact.span.start + bom_len..contact.span.end + bom_len;
            contact.removal_start += bom_len;
        }
    }

    tracing::debug!(
        path = %source.display(),
        contacts = contacts.len(),
        "Scanned contact document"
    );
    Ok(contacts)
}

fn check_single_root(source: &Path, seen_root: &mut bool) -> Result<()> {
    if *seen_root {
        return Err(TruncateError::structure(
            source,
            "document has more than one root element",
        ));
    }
    *seen_root = true;
    Ok(())
}

fn contact_id(source: &Path, e: &BytesStart<'_>, schema: &ContactSchema) -> Result<Label> {
    for attr in e.attributes() {
        let attr = attr.map_err(|err| {
            TruncateError::structure(source, format!("bad attribute on contact element: {}", err))
        })?;
        if attr.key.as_ref() != schema.id_attribute.as_bytes() {
            continue;
        }
        let value = attr.unescape_value().map_err(|err| {
            TruncateError::structure(source, format!("bad '{}' attribute value: {}", schema.id_attribute, err))
        })?;
        return value.trim().parse::<Label>().map_err(|_| {
            TruncateError::structure(
                source,
                format!(
                    "contact {} {:?} is not an integer",
                    schema.id_attribute, value
                ),
            )
        });
    }
    Err(TruncateError::structure(
        source,
        format!("contact element without '{}' attribute", schema.id_attribute),
    ))
}

fn tag_start(source: &Path, bytes: &[u8], tag_end: usize, tag_len: usize) -> Result<usize> {
    tag_end
        .checked_sub(tag_len)
        .filter(|&start| bytes.get(start) == Some(&b'<'))
        .ok_or_else(|| {
            TruncateError::structure(
                source,
                format!("cannot locate start of contact tag ending at byte {}", tag_end),
            )
        })
}

fn element(bytes: &[u8], id: Label, span: Range<usize>) -> ContactElement {
    let mut removal_start = span.start;
    while removal_start > 0 && bytes[removal_start - 1].is_ascii_whitespace() {
        removal_start -= 1;
    }
    ContactElement {
        id,
        span,
        removal_start,
    }
}
