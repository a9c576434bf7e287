//! In-memory XML tree used as the context document of a template render.

use std::{io::BufRead, path::PathBuf};

use quick_xml::{
    Reader,
    events::{BytesStart, Event},
};

use crate::{error::Error, traits::Parser};

/// An element with its attributes, direct text and child elements.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name || local_name(key) == name)
            .map(|(_, value)| value.as_str())
    }

    /// Sets an attribute, replacing an existing one with the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// First child whose qualified or local name is `name`.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children
            .iter()
            .find(|child| child.name == name || local_name(&child.name) == name)
    }

    /// Text of this element and all its descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Resolves `a/b/c` (text content) or `a/b@attr` (attribute) below this
    /// element. A leading `/` is ignored; `@attr` alone reads this element.
    pub fn lookup(&self, path: &str) -> Option<String> {
        let path = path.trim().trim_start_matches('/');
        let (elements, attribute) = match path.rsplit_once('@') {
            Some((elements, attribute)) => (elements, Some(attribute)),
            None => (path, None),
        };

        let mut node = self;
        for segment in elements.split('/').filter(|s| !s.is_empty()) {
            node = node.child(segment)?;
        }

        match attribute {
            Some(attribute) => node.attribute(attribute).map(str::to_string),
            None => Some(node.text_content()),
        }
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

fn element_from_start(e: &BytesStart) -> Result<XmlNode, Error> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()));
    for attr in e.attributes().with_checks(false) {
        let attr = attr.map_err(|e| Error::input_format(PathBuf::new(), e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr.unescape_value()?.to_string();
        node.attributes.push((key, value));
    }
    Ok(node)
}

impl Parser for XmlNode {
    /// Parses a document and returns its root element.
    fn from_reader<R: BufRead>(reader: R) -> Result<Self, Error> {
        let mut xml_reader = Reader::from_reader(reader);
        xml_reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root = None;

        loop {
            match xml_reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => stack.push(element_from_start(e)?),
                Ok(Event::Empty(ref e)) => {
                    let node = element_from_start(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
                Ok(Event::End(_)) => {
                    let node = stack.pop().ok_or_else(|| {
                        Error::input_format(PathBuf::new(), "unbalanced closing tag")
                    })?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => root = Some(node),
                    }
                }
                Ok(Event::Text(e)) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&e.unescape()?);
                    }
                }
                Ok(Event::CData(e)) => {
                    if let Some(node) = stack.last_mut() {
                        node.text.push_str(&String::from_utf8_lossy(&e));
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(Error::XmlParse(e)),
            }
            buf.clear();
        }

        if !stack.is_empty() {
            return Err(Error::input_format(
                PathBuf::new(),
                format!("element <{}> is never closed", stack[stack.len() - 1].name),
            ));
        }
        root.ok_or_else(|| Error::input_format(PathBuf::new(), "document has no root element"))
    }
}
