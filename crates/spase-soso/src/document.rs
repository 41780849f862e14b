//! SPASE document loading and subject-element selection

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Error;
use crate::xml::{self, Element};

/// The record types a SPASE document can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    NumericalData,
    DisplayData,
    Observatory,
    Instrument,
    Person,
    Collection,
}

impl ResourceKind {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "NumericalData" => Some(ResourceKind::NumericalData),
            "DisplayData" => Some(ResourceKind::DisplayData),
            "Observatory" => Some(ResourceKind::Observatory),
            "Instrument" => Some(ResourceKind::Instrument),
            "Person" => Some(ResourceKind::Person),
            "Collection" => Some(ResourceKind::Collection),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::NumericalData => "NumericalData",
            ResourceKind::DisplayData => "DisplayData",
            ResourceKind::Observatory => "Observatory",
            ResourceKind::Instrument => "Instrument",
            ResourceKind::Person => "Person",
            ResourceKind::Collection => "Collection",
        }
    }
}

/// A parsed SPASE record.
///
/// The subject element is the record-type node (NumericalData, DisplayData,
/// Observatory, Instrument, Person, or Collection) beneath the root. The walk
/// is depth-first in document order and, when a document carries more than one
/// candidate, the last one encountered wins. A missing subject is not an error
/// until an extractor asks for it.
#[derive(Debug, Clone)]
pub struct SpaseDocument {
    root: Element,
    subject_path: Option<Vec<usize>>,
    pub schema_version: Option<String>,
    pub namespace: Option<String>,
    pub path: PathBuf,
}

impl SpaseDocument {
    /// Load a SPASE record from a `.xml` file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        if path.extension().and_then(|e| e.to_str()) != Some("xml") {
            return Err(Error::InvalidFormat(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let root = xml::parse(&content)?;
        Ok(Self::from_root(root, path.to_path_buf()))
    }

    /// Parse a SPASE record from an XML string (tests, in-memory resolvers).
    pub fn from_xml(content: &str) -> Result<Self, Error> {
        let root = xml::parse(content)?;
        Ok(Self::from_root(root, PathBuf::new()))
    }

    fn from_root(root: Element, path: PathBuf) -> Self {
        let namespace = root
            .attributes
            .iter()
            .filter(|(k, _)| k == "xmlns" || k.starts_with("xmlns:"))
            .find(|(_, v)| v.contains("spase-group"))
            .map(|(_, v)| v.clone());
        let schema_version = root.find_text(&["Version"]).map(String::from);

        let mut subject_path = None;
        let mut trail = Vec::new();
        find_subject(&root, &mut trail, &mut subject_path);

        SpaseDocument {
            root,
            subject_path,
            schema_version,
            namespace,
            path,
        }
    }

    /// The document root element.
    pub fn root(&self) -> &Element {
        &self.root
    }

    /// The subject element, or `NoSubjectElement` if the document does not
    /// contain a recognizable record type.
    pub fn subject(&self) -> Result<&Element, Error> {
        let path = self.subject_path.as_ref().ok_or(Error::NoSubjectElement)?;
        let mut element = &self.root;
        for &index in path {
            element = &element.children[index];
        }
        Ok(element)
    }

    /// The kind of record the subject element describes.
    pub fn subject_kind(&self) -> Result<ResourceKind, Error> {
        let subject = self.subject()?;
        ResourceKind::from_tag(&subject.name).ok_or(Error::NoSubjectElement)
    }

    /// The record's ResourceID, if present.
    pub fn resource_id(&self) -> Result<Option<&str>, Error> {
        Ok(self.subject()?.find_text(&["ResourceID"]))
    }
}

fn find_subject(element: &Element, trail: &mut Vec<usize>, found: &mut Option<Vec<usize>>) {
    for (index, child) in element.children.iter().enumerate() {
        trail.push(index);
        if ResourceKind::from_tag(&child.name).is_some() {
            // last match wins
            *found = Some(trail.clone());
        }
        find_subject(child, trail, found);
        trail.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_xml_extension() {
        let err = SpaseDocument::from_file("record.json").unwrap_err();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_subject_detection() {
        let doc = SpaseDocument::from_xml(
            r#"<Spase xmlns="http://www.spase-group.org/data/schema">
                 <Version>2.7.0</Version>
                 <NumericalData><ResourceID>spase://X/NumericalData/A</ResourceID></NumericalData>
               </Spase>"#,
        )
        .unwrap();
        assert_eq!(doc.subject_kind().unwrap(), ResourceKind::NumericalData);
        assert_eq!(
            doc.resource_id().unwrap(),
            Some("spase://X/NumericalData/A")
        );
        assert_eq!(doc.schema_version.as_deref(), Some("2.7.0"));
        assert!(doc.namespace.as_deref().unwrap().contains("spase-group"));
    }

    #[test]
    fn test_last_candidate_wins() {
        let doc = SpaseDocument::from_xml(
            r#"<Spase>
                 <Instrument><ResourceID>spase://X/Instrument/A</ResourceID></Instrument>
                 <Observatory><ResourceID>spase://X/Observatory/B</ResourceID></Observatory>
               </Spase>"#,
        )
        .unwrap();
        assert_eq!(doc.subject_kind().unwrap(), ResourceKind::Observatory);
    }

    #[test]
    fn test_missing_subject_is_deferred() {
        let doc = SpaseDocument::from_xml("<Spase><Version>2.7.0</Version></Spase>").unwrap();
        assert!(matches!(doc.subject(), Err(Error::NoSubjectElement)));
    }
}
