//! Association resolution between SPASE records
//!
//! Associations point at other SPASE records or at DOIs. Local targets are
//! resolved through the document resolver and described in full; external
//! targets are classified as Dataset or ScholarlyArticle by following the DOI
//! redirect and, failing that, asking the DataCite API. Resolution is guarded
//! by a shared visited set and depth limit so cyclic association graphs
//! terminate with a partial result.

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::document::SpaseDocument;
use crate::error::Error;
use crate::jsonld::creator_entry;
use crate::person::PersonDetails;
use crate::remote::RemoteLookup;
use crate::resolver::DocumentResolver;

const NO_CREATORS: &str = "No creators were found. View record for contacts.";

/// Cycle and depth guard shared across one conversion, including all nested
/// record resolutions.
#[derive(Debug)]
pub struct RelationGuard {
    visited: HashSet<String>,
    max_depth: usize,
    truncated: bool,
}

impl RelationGuard {
    pub fn new(max_depth: usize) -> Self {
        RelationGuard {
            visited: HashSet::new(),
            max_depth,
            truncated: false,
        }
    }

    /// Claim an identifier at the given depth. Returns false, and marks the
    /// result truncated, when the identifier was already visited or the
    /// depth limit is exceeded.
    pub fn try_visit(&mut self, identifier: &str, depth: usize) -> bool {
        if depth > self.max_depth || !self.visited.insert(identifier.to_string()) {
            self.truncated = true;
            return false;
        }
        true
    }

    /// Whether any resolution was cut short by the guard.
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// Full description of a locally resolved related record, produced by the
/// caller from a nested conversion.
pub struct LocalRecord {
    pub url: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub license: Option<Value>,
    pub creators: Option<Value>,
}

pub type DescribeFn<'a> = dyn Fn(Rc<SpaseDocument>) -> Result<LocalRecord, Error> + 'a;

/// AssociationIDs under the subject whose AssociationType is in `types`.
pub fn association_ids(doc: &SpaseDocument, types: &[&str]) -> Result<Vec<String>, Error> {
    let mut ids = Vec::new();
    for block in doc.subject()?.descendants() {
        if block.name != "Association" {
            continue;
        }
        let Some(id) = block.find_text(&["AssociationID"]) else {
            continue;
        };
        let assoc_type = block.find_text(&["AssociationType"]).unwrap_or_default();
        if types.contains(&assoc_type) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Resolve and format the associations of the given types.
///
/// Locally resolvable targets carry name, description, license, and creators
/// from the target record; everything else is classified remotely. A target
/// that fails to resolve locally and remotely still appears as a bare entry.
#[allow(clippy::too_many_arguments)]
pub fn related_records(
    doc: &SpaseDocument,
    types: &[&str],
    resolver: &dyn DocumentResolver,
    remote: &dyn RemoteLookup,
    guard: &Rc<RefCell<RelationGuard>>,
    depth: usize,
    describe: &DescribeFn<'_>,
) -> Result<Option<Value>, Error> {
    let ids = association_ids(doc, types)?;
    if ids.is_empty() {
        return Ok(None);
    }

    // insertion-ordered url -> local description
    let mut resolved: Vec<LocalRecord> = Vec::new();
    for id in &ids {
        if !guard.borrow_mut().try_visit(id, depth + 1) {
            warn!(identifier = %id, "skipping association: already visited or depth limit reached");
            continue;
        }
        match resolver.resolve(id) {
            Ok(target) => match describe(target) {
                Ok(record) => resolved.push(record),
                Err(err) => {
                    warn!(identifier = %id, %err, "could not describe associated record");
                }
            },
            Err(err) => {
                warn!(identifier = %id, %err, "could not access associated SPASE record");
            }
        }
    }

    let mut entries = Vec::new();
    if resolved.is_empty() {
        // nothing local: classify the raw identifiers remotely
        for id in &ids {
            entries.push(remote_entry(id, remote, None));
        }
    } else {
        for record in &resolved {
            entries.push(remote_entry(&record.url, remote, Some(record)));
        }
    }
    Ok(Some(Value::Array(entries)))
}

fn remote_entry(url: &str, remote: &dyn RemoteLookup, local: Option<&LocalRecord>) -> Value {
    let mut entry = Map::new();
    entry.insert("@id".to_string(), json!(url));
    entry.insert("identifier".to_string(), json!(url));
    entry.insert("url".to_string(), json!(url));

    let verified = match verify_type(url, remote) {
        Ok(verified) => verified,
        Err(err) => {
            warn!(%url, %err, "could not verify related record type");
            Verified::default()
        }
    };

    if verified.is_dataset {
        entry.insert("@type".to_string(), json!("Dataset"));
        match local {
            Some(record) => {
                entry.insert("name".to_string(), json!(record.name));
                entry.insert("description".to_string(), json!(record.description));
                if let Some(license) = &record.license {
                    entry.insert("license".to_string(), license.clone());
                }
                entry.insert(
                    "creator".to_string(),
                    record.creators.clone().unwrap_or_else(|| json!(NO_CREATORS)),
                );
            }
            None => {
                if let Some(name) = verified.name {
                    entry.insert("name".to_string(), json!(name));
                }
                if let Some(description) = verified.description {
                    entry.insert("description".to_string(), json!(description));
                }
                if let Some(license) = verified.license {
                    entry.insert("license".to_string(), license);
                }
                if let Some(creators) = verified.creators {
                    entry.insert("creator".to_string(), creators);
                }
            }
        }
    } else if verified.is_article {
        entry.insert("@type".to_string(), json!("ScholarlyArticle"));
    }
    Value::Object(entry)
}

#[derive(Default)]
struct Verified {
    is_dataset: bool,
    is_article: bool,
    name: Option<String>,
    description: Option<String>,
    license: Option<Value>,
    creators: Option<Value>,
}

/// Classify a related URL as Dataset or ScholarlyArticle.
///
/// spase-metadata.org landing pages are datasets when the path names a data
/// resource type. Other URLs are treated as DOIs: follow the redirect, and
/// when it does not land on spase-metadata.org, ask DataCite for the
/// record's resource type.
fn verify_type(url: &str, remote: &dyn RemoteLookup) -> Result<Verified, Error> {
    let mut verified = Verified::default();
    if url.contains("spase-metadata.org") {
        verified.is_dataset = url.contains("Data");
        return Ok(verified);
    }

    if let Some(location) = remote.resolve_redirect(url)? {
        if location.contains("spase-metadata.org") {
            verified.is_dataset = location.contains("Data");
            return Ok(verified);
        }
    }

    let doi = match url.split_once("doi.org/") {
        Some((_, doi)) => doi,
        None => url,
    };
    let record = remote.datacite_lookup(doi)?;
    let kind = record
        .types
        .resource_type
        .as_deref()
        .filter(|t| !t.is_empty())
        .or(record.types.resource_type_general.as_deref())
        .unwrap_or_default();
    match kind {
        "Dataset" => verified.is_dataset = true,
        "JournalArticle" => verified.is_article = true,
        _ => {}
    }

    if verified.is_dataset {
        verified.name = record.titles.first().map(|t| t.title.clone());
        verified.description = Some(match record.descriptions.first() {
            Some(d) => d.description.clone(),
            None => format!("No description currently available for {url}."),
        });
        if !record.rights_list.is_empty() {
            let uris: Vec<&str> = record
                .rights_list
                .iter()
                .filter_map(|r| r.rights_uri.as_deref())
                .collect();
            verified.license = Some(json!(uris));
        }
        // last creator wins; DataCite relations rarely carry more than one
        for creator in &record.creators {
            let (given, family) = match (&creator.given_name, &creator.family_name) {
                (Some(given), Some(family)) => (given.clone(), family.clone()),
                _ => match creator.name.split_once(", ") {
                    Some((family, given)) => (given.to_string(), family.to_string()),
                    None => (String::new(), String::new()),
                },
            };
            let details = PersonDetails {
                affiliation: creator
                    .affiliation
                    .as_ref()
                    .map(|a| a.name.clone())
                    .unwrap_or_default(),
                ..PersonDetails::default()
            };
            verified.creators = Some(creator_entry(&creator.name, &given, &family, &details));
        }
    }
    Ok(verified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::{DataCiteRecord, OfflineRemote};
    use crate::resolver::StaticResolver;

    struct FakeRemote {
        redirect: Option<String>,
        record: Option<String>,
    }

    impl RemoteLookup for FakeRemote {
        fn resolve_redirect(&self, _url: &str) -> Result<Option<String>, Error> {
            Ok(self.redirect.clone())
        }

        fn datacite_lookup(&self, doi: &str) -> Result<DataCiteRecord, Error> {
            match &self.record {
                Some(raw) => serde_json::from_str(raw)
                    .map_err(|e| Error::RemoteLookup(e.to_string())),
                None => Err(Error::RemoteLookup(format!("no record for {doi}"))),
            }
        }
    }

    fn describe_none(_: Rc<SpaseDocument>) -> Result<LocalRecord, Error> {
        Err(Error::NoSubjectElement)
    }

    const DATASET: &str = r#"<Spase><NumericalData>
      <ResourceID>spase://NASA/NumericalData/Demo</ResourceID>
      <Association>
        <AssociationID>spase://NASA/NumericalData/Other</AssociationID>
        <AssociationType>PartOf</AssociationType>
      </Association>
      <Association>
        <AssociationID>https://doi.org/10.48322/example</AssociationID>
        <AssociationType>Other</AssociationType>
      </Association>
    </NumericalData></Spase>"#;

    #[test]
    fn test_association_ids_filtered_by_type() {
        let doc = SpaseDocument::from_xml(DATASET).unwrap();
        assert_eq!(
            association_ids(&doc, &["PartOf"]).unwrap(),
            vec!["spase://NASA/NumericalData/Other"]
        );
        assert_eq!(
            association_ids(&doc, &["Other"]).unwrap(),
            vec!["https://doi.org/10.48322/example"]
        );
        assert!(association_ids(&doc, &["RevisionOf"]).unwrap().is_empty());
    }

    #[test]
    fn test_local_resolution_wins() {
        let doc = SpaseDocument::from_xml(DATASET).unwrap();
        let mut resolver = StaticResolver::new();
        resolver
            .insert(
                "spase://NASA/NumericalData/Other",
                "<Spase><NumericalData><ResourceID>spase://NASA/NumericalData/Other</ResourceID></NumericalData></Spase>",
            )
            .unwrap();
        let guard = Rc::new(RefCell::new(RelationGuard::new(2)));
        let describe = |target: Rc<SpaseDocument>| -> Result<LocalRecord, Error> {
            Ok(LocalRecord {
                url: crate::fields::landing_page(&target)?,
                name: Some("Other Dataset".to_string()),
                description: Some("A related dataset.".to_string()),
                license: None,
                creators: None,
            })
        };
        let relations = related_records(
            &doc,
            &["PartOf"],
            &resolver,
            &OfflineRemote,
            &guard,
            0,
            &describe,
        )
        .unwrap()
        .unwrap();
        let entry = &relations[0];
        assert_eq!(entry["@type"], "Dataset");
        assert_eq!(entry["name"], "Other Dataset");
        assert_eq!(entry["creator"], NO_CREATORS);
    }

    #[test]
    fn test_remote_datacite_classification() {
        let doc = SpaseDocument::from_xml(DATASET).unwrap();
        let remote = FakeRemote {
            redirect: None,
            record: Some(
                r#"{
                    "types": {"resourceTypeGeneral": "Dataset"},
                    "titles": [{"title": "External Dataset"}],
                    "descriptions": [],
                    "creators": [{"name": "Doe, Jane"}]
                }"#
                .to_string(),
            ),
        };
        let guard = Rc::new(RefCell::new(RelationGuard::new(2)));
        let relations = related_records(
            &doc,
            &["Other"],
            &StaticResolver::new(),
            &remote,
            &guard,
            0,
            &describe_none,
        )
        .unwrap()
        .unwrap();
        let entry = &relations[0];
        assert_eq!(entry["@type"], "Dataset");
        assert_eq!(entry["name"], "External Dataset");
        assert_eq!(
            entry["description"],
            "No description currently available for https://doi.org/10.48322/example."
        );
        assert_eq!(entry["creator"]["familyName"], "Doe");
    }

    #[test]
    fn test_article_classification() {
        let remote = FakeRemote {
            redirect: None,
            record: Some(r#"{"types": {"resourceTypeGeneral": "JournalArticle"}}"#.to_string()),
        };
        let verified = verify_type("https://doi.org/10.1029/paper", &remote).unwrap();
        assert!(verified.is_article);
        assert!(!verified.is_dataset);
    }

    #[test]
    fn test_landing_page_heuristic() {
        let verified = verify_type(
            "https://spase-metadata.org/NASA/NumericalData/Demo",
            &OfflineRemote,
        )
        .unwrap();
        assert!(verified.is_dataset);
        let verified =
            verify_type("https://spase-metadata.org/SMWG/Person/X", &OfflineRemote).unwrap();
        assert!(!verified.is_dataset);
    }

    #[test]
    fn test_guard_terminates_cycles() {
        let guard = Rc::new(RefCell::new(RelationGuard::new(2)));
        assert!(guard.borrow_mut().try_visit("spase://A", 1));
        assert!(!guard.borrow_mut().try_visit("spase://A", 1));
        assert!(!guard.borrow_mut().try_visit("spase://B", 3));
        assert!(guard.borrow().truncated());
    }

    #[test]
    fn test_unverifiable_target_gets_bare_entry() {
        let doc = SpaseDocument::from_xml(DATASET).unwrap();
        let guard = Rc::new(RefCell::new(RelationGuard::new(2)));
        let relations = related_records(
            &doc,
            &["Other"],
            &StaticResolver::new(),
            &OfflineRemote,
            &guard,
            0,
            &describe_none,
        )
        .unwrap()
        .unwrap();
        let entry = &relations[0];
        assert!(entry.get("@type").is_none());
        assert_eq!(entry["url"], "https://doi.org/10.48322/example");
    }
}
