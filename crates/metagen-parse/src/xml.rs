//! Minimal owned element tree built from quick-xml events.

use std::collections::BTreeMap;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ParseError, Result};

#[derive(Debug, Clone, Default)]
pub(crate) struct XmlElement {
    pub name: String,
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// First non-blank value among several attribute names.
    pub fn first_attr(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| self.attr(name))
    }

    /// Local name without a namespace prefix.
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    pub fn children_named<'a>(&'a self, local: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children
            .iter()
            .filter(move |child| child.local_name() == local)
    }

    /// All descendants in document order, excluding `self`.
    pub fn descendants(&self) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children.iter().rev().collect();

        while let Some(element) = stack.pop() {
            found.push(element);
            stack.extend(element.children.iter().rev());
        }

        found
    }
}

pub(crate) fn read_document(path: &Path) -> Result<XmlElement> {
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_document(&content, path)
}

pub(crate) fn parse_document(content: &str, path: &Path) -> Result<XmlElement> {
    let malformed = |reason: String| ParseError::MalformedModel {
        path: path.to_path_buf(),
        reason,
    };

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(start)) => {
                if root.is_some() {
                    return Err(malformed("content after the root element".to_string()));
                }
                stack.push(element_from(&start).map_err(malformed)?);
            }
            Ok(Event::Empty(start)) => {
                if root.is_some() {
                    return Err(malformed("content after the root element".to_string()));
                }
                let element = element_from(&start).map_err(malformed)?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let Some(element) = stack.pop() else {
                    return Err(malformed("unexpected closing tag".to_string()));
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(_) | Event::CData(_)) if root.is_some() => {
                return Err(malformed("text after the root element".to_string()));
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(err) => {
                return Err(malformed(format!(
                    "error at position {}: {err}",
                    reader.error_position()
                )));
            }
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element '{}'", open.name)));
    }

    root.ok_or_else(|| malformed("document has no root element".to_string()))
}

fn element_from(start: &BytesStart<'_>) -> std::result::Result<XmlElement, String> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut attributes = BTreeMap::new();

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|err| err.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|err| err.to_string())?
            .into_owned();
        attributes.insert(key, value);
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}
