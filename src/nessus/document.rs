//! In-memory XML document tree.
//!
//! The report is read once with quick-xml's namespace-aware reader and
//! turned into a small owned tree, so the extractor can look elements up
//! by local name and namespace URI without dealing with reader events.

use crate::error::{CacusError, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use std::path::Path;
use tracing::debug;

/// A parsed XML element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local name, without any prefix.
    pub name: String,
    /// Namespace URI the prefix resolved to, if any.
    pub namespace: Option<String>,
    /// Attributes in document order, keyed by local name.
    pub attributes: Vec<(String, String)>,
    /// Unescaped character data directly inside this element.
    pub text: String,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(namespace: Option<String>, start: &BytesStart<'_>) -> quick_xml::Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }

        Ok(Self {
            name,
            namespace,
            attributes,
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// Returns the value of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns every child with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Returns the first child bound to `namespace` with the given local name.
    pub fn find_ns(&self, namespace: &str, name: &str) -> Option<&XmlElement> {
        self.children
            .iter()
            .find(|c| c.name == name && c.namespace.as_deref() == Some(namespace))
    }

    /// Returns the element text, or `None` if it is empty or only whitespace.
    pub fn text(&self) -> Option<&str> {
        if self.text.trim().is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }
}

/// Read and parse a report file.
pub fn load_document(path: &Path) -> Result<XmlElement> {
    let content =
        std::fs::read_to_string(path).map_err(|e| CacusError::input_parse(path, e))?;

    debug!("Read {} bytes from {}", content.len(), path.display());
    parse_document(&content, path)
}

/// Parse a document held in memory. `source` is only used in error messages.
pub fn parse_document(xml: &str, source: &Path) -> Result<XmlElement> {
    let mut reader = NsReader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    let fail = |reader: &NsReader<&[u8]>, message: String| {
        CacusError::input_parse(
            source,
            format!("{} (at byte {})", message, reader.buffer_position()),
        )
    };

    loop {
        let step = reader
            .read_resolved_event()
            .map(|(resolved, event)| (namespace_uri(resolved), event));
        let (resolved, event) = match step {
            Ok(step) => step,
            Err(e) => return Err(fail(&reader, e.to_string())),
        };

        match event {
            Event::Start(start) => {
                let element = XmlElement::from_start(resolved, &start)
                    .map_err(|e| fail(&reader, e.to_string()))?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = XmlElement::from_start(resolved, &start)
                    .map_err(|e| fail(&reader, e.to_string()))?;
                attach(&mut stack, &mut root, element)
                    .map_err(|message| fail(&reader, message))?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| fail(&reader, "unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)
                    .map_err(|message| fail(&reader, message))?;
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| fail(&reader, e.to_string()))?;
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(fail(&reader, format!("unclosed element <{}>", open.name)));
    }

    root.ok_or_else(|| CacusError::input_parse(source, "document has no root element"))
}

fn namespace_uri(resolved: ResolveResult<'_>) -> Option<String> {
    match resolved {
        ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
        _ => None,
    }
}

/// Hang a finished element on its parent, or make it the root.
fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> std::result::Result<(), String> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        Ok(())
    } else if root.is_none() {
        *root = Some(element);
        Ok(())
    } else {
        Err(format!("second root element <{}>", element.name))
    }
}
