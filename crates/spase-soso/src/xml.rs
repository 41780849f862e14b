//! Owned XML element tree built from a quick-xml event stream
//!
//! SPASE extractors need path-based navigation relative to a subject element,
//! so the event stream is materialized into a small tree of namespace-stripped
//! elements. Attribute names keep their prefixed form (`xml:lang`).

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::Error;

/// A parsed XML element with its local (namespace-stripped) tag name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    /// Text content as stored. Surrounding whitespace is already stripped at
    /// parse time, not here.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Value of the attribute with the given (prefixed) name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Depth-first, document-order iterator over this element and all
    /// descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element matching a chain of direct child names, searching in
    /// document order.
    pub fn find(&self, path: &[&str]) -> Option<&Element> {
        let (head, rest) = path.split_first()?;
        for child in &self.children {
            if child.name == *head {
                if rest.is_empty() {
                    return Some(child);
                }
                if let Some(found) = child.find(rest) {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Text of the first element matching the path.
    pub fn find_text(&self, path: &[&str]) -> Option<&str> {
        self.find(path).and_then(|e| e.text())
    }

    /// Every element matching a chain of direct child names, in document
    /// order.
    pub fn find_all(&self, path: &[&str]) -> Vec<&Element> {
        let mut out = Vec::new();
        self.collect_all(path, &mut out);
        out
    }

    fn collect_all<'a>(&'a self, path: &[&str], out: &mut Vec<&'a Element>) {
        let Some((head, rest)) = path.split_first() else {
            return;
        };
        for child in &self.children {
            if child.name == *head {
                if rest.is_empty() {
                    out.push(child);
                } else {
                    child.collect_all(rest, out);
                }
            }
        }
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let next = self.stack.pop()?;
        // push children in reverse so document order comes off the stack first
        for child in next.children.iter().rev() {
            self.stack.push(child);
        }
        Some(next)
    }
}

/// Parse an XML document into an element tree.
pub fn parse(xml: &str) -> Result<Element, Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_tag(e));
            }
            Ok(Event::Empty(ref e)) => {
                let element = element_from_tag(e);
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Text(e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if !text.is_empty() {
                        match &mut top.text {
                            Some(existing) => existing.push_str(&text),
                            None => top.text = Some(text),
                        }
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(top) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).to_string();
                    match &mut top.text {
                        Some(existing) => existing.push_str(&text),
                        None => top.text = Some(text),
                    }
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Parse("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element);
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::Parse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(Error::Parse("unclosed element at end of input".to_string()));
    }
    root.ok_or_else(|| Error::Parse("document has no root element".to_string()))
}

fn element_from_tag(e: &quick_xml::events::BytesStart<'_>) -> Element {
    let name = String::from_utf8_lossy(e.local_name().as_ref()).to_string();
    let attributes = e
        .attributes()
        .flatten()
        .map(|attr| {
            (
                String::from_utf8_lossy(attr.key.as_ref()).to_string(),
                String::from_utf8_lossy(&attr.value).to_string(),
            )
        })
        .collect();
    Element {
        name,
        attributes,
        text: None,
        children: Vec::new(),
    }
}

fn attach(stack: &mut Vec<Element>, root: &mut Option<Element>, element: Element) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None => {
            if root.is_none() {
                *root = Some(element);
            }
        }
    }
}
