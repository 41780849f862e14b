//! The SPASE conversion strategy
//!
//! `Spase` owns one parsed record plus the collaborators every extractor
//! needs: a document resolver for `spase://` links, a remote lookup for DOIs,
//! and the run configuration. Nested conversions of related records share the
//! same relation guard, so cyclic association graphs terminate.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use serde_json::{json, Map, Value};

use crate::access;
use crate::authors::{scrape_authors, AuthorScrape, ContactState, RoleSlot};
use crate::config::ConvertConfig;
use crate::document::SpaseDocument;
use crate::error::Error;
use crate::fields;
use crate::jsonld::{contributor_entry, creator_entry};
use crate::person::{name_splitter, orcid_and_affiliation, PersonDetails};
use crate::provenance;
use crate::relations::{related_records, LocalRecord, RelationGuard};
use crate::remote::RemoteLookup;
use crate::resolver::DocumentResolver;
use crate::roles::CONTRIBUTOR_BUCKETS;

pub struct Spase<'a> {
    doc: Rc<SpaseDocument>,
    resolver: &'a dyn DocumentResolver,
    remote: &'a dyn RemoteLookup,
    config: &'a ConvertConfig,
    guard: Rc<RefCell<RelationGuard>>,
    depth: usize,
    scrape: RefCell<Option<AuthorScrape>>,
    relations: RefCell<HashMap<String, Option<Value>>>,
}

impl<'a> Spase<'a> {
    pub fn new(
        doc: Rc<SpaseDocument>,
        resolver: &'a dyn DocumentResolver,
        remote: &'a dyn RemoteLookup,
        config: &'a ConvertConfig,
    ) -> Self {
        Spase {
            doc,
            resolver,
            remote,
            config,
            guard: Rc::new(RefCell::new(RelationGuard::new(config.max_relation_depth))),
            depth: 0,
            scrape: RefCell::new(None),
            relations: RefCell::new(HashMap::new()),
        }
    }

    /// A conversion of a related record sharing this one's relation guard.
    fn nested(&self, doc: Rc<SpaseDocument>) -> Spase<'a> {
        Spase {
            doc,
            resolver: self.resolver,
            remote: self.remote,
            config: self.config,
            guard: Rc::clone(&self.guard),
            depth: self.depth + 1,
            scrape: RefCell::new(None),
            relations: RefCell::new(HashMap::new()),
        }
    }

    pub fn document(&self) -> &SpaseDocument {
        &self.doc
    }

    /// Whether relation resolution was cut short by the cycle/depth guard.
    pub fn truncated(&self) -> bool {
        self.guard.borrow().truncated()
    }

    fn file_key(&self) -> String {
        let path = &self.doc.path;
        path.strip_prefix(&self.config.spase_root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }

    /// Author scrape, computed once per conversion.
    fn authors(&self) -> Result<AuthorScrape, Error> {
        if let Some(scrape) = self.scrape.borrow().as_ref() {
            return Ok(scrape.clone());
        }
        let scrape = scrape_authors(&self.doc, &self.file_key(), &self.config.no_split)?;
        *self.scrape.borrow_mut() = Some(scrape.clone());
        Ok(scrape)
    }

    pub fn get_id(&self) -> Result<String, Error> {
        fields::landing_page(&self.doc)
    }

    pub fn get_name(&self) -> Result<Option<String>, Error> {
        fields::name(&self.doc)
    }

    pub fn get_description(&self) -> Result<Option<String>, Error> {
        fields::description(&self.doc)
    }

    pub fn get_url(&self) -> Result<String, Error> {
        fields::url(&self.doc)
    }

    pub fn get_same_as(&self) -> Result<Option<Value>, Error> {
        fields::same_as(&self.doc)
    }

    pub fn get_keywords(&self) -> Result<Option<Value>, Error> {
        fields::keywords(&self.doc)
    }

    pub fn get_identifier(&self) -> Result<Value, Error> {
        fields::identifier(&self.doc)
    }

    pub fn get_citation(&self) -> Result<Option<Value>, Error> {
        fields::citation(&self.doc)
    }

    pub fn get_variable_measured(&self) -> Result<Option<Value>, Error> {
        fields::variable_measured(&self.doc)
    }

    pub fn get_temporal_coverage(&self) -> Result<Option<Value>, Error> {
        fields::temporal_coverage(&self.doc)
    }

    pub fn get_temporal(&self) -> Result<Option<Value>, Error> {
        fields::temporal(&self.doc)
    }

    pub fn get_spatial_coverage(&self) -> Result<Option<Value>, Error> {
        fields::spatial_coverage(&self.doc)
    }

    pub fn get_alternate_name(&self) -> Result<Option<String>, Error> {
        fields::alternate_name(&self.doc)
    }

    pub fn get_funding(&self) -> Result<Option<Value>, Error> {
        fields::funding(&self.doc)
    }

    pub fn get_license(&self) -> Result<Option<Value>, Error> {
        fields::license(&self.doc)
    }

    pub fn get_subject_of(&self) -> Result<Option<Value>, Error> {
        fields::subject_of(&self.doc)
    }

    pub fn get_date_modified(&self) -> Result<Option<String>, Error> {
        fields::date_modified(&self.doc)
    }

    pub fn get_date_published(&self) -> Result<Option<String>, Error> {
        let scrape = self.authors()?;
        let (_, revisions) = fields::dates(&self.doc)?;
        Ok(fields::date_published(&scrape.publication_date, &revisions))
    }

    pub fn get_date_created(&self) -> Result<Option<String>, Error> {
        self.get_date_published()
    }

    pub fn get_publisher(&self) -> Result<Option<Value>, Error> {
        let scrape = self.authors()?;
        if scrape.publisher.is_empty() {
            return Ok(None);
        }
        Ok(Some(json!({"name": scrape.publisher})))
    }

    pub fn get_distribution(&self) -> Result<Option<Value>, Error> {
        let urls = access::collect_access_urls(&self.doc)?;
        Ok(access::distribution_json(&urls.downloads))
    }

    pub fn get_potential_action(&self) -> Result<Option<Value>, Error> {
        let urls = access::collect_access_urls(&self.doc)?;
        let coverage = self.get_temporal_coverage()?;
        let coverage_str = coverage.as_ref().and_then(fields::coverage_string);
        Ok(access::potential_actions_json(&urls.actions, coverage_str))
    }

    /// schema.org `creator`. Contact-derived authors resolve their Person
    /// records for ORCID and affiliation; an unresolvable direct creator is
    /// fatal.
    pub fn get_creator(&self) -> Result<Option<Value>, Error> {
        let scrape = self.authors()?;
        if scrape.authors.is_empty() {
            return Ok(None);
        }
        let mut creators = Vec::new();
        let from_contacts = scrape.authors.iter().any(|a| a.contains("Person/"));

        if from_contacts {
            for person in &scrape.authors {
                let name = name_splitter(person);
                let details = orcid_and_affiliation(self.resolver, person)?;
                creators.push(creator_entry(
                    &name.full,
                    &name.given,
                    &name.family,
                    &details,
                ));
            }
        } else if scrape.authors.len() > 1 {
            for person in &scrape.authors {
                let (family, given) = match person.split_once(", ") {
                    Some((family, given)) => (family, given),
                    None => (person.as_str(), ""),
                };
                creators.push(self.free_text_creator(&scrape, person, given, family)?);
            }
        } else {
            let person = &scrape.authors[0];
            let splittable = !self.config.no_split.iter().any(|e| *e == self.file_key());
            if person.contains(", ") && splittable {
                let (family, given) = person.split_once(", ").unwrap_or((person, ""));
                creators.push(self.free_text_creator(&scrape, person, given, family)?);
            } else {
                // consortium or organization: no name parts
                creators.push(creator_entry(person, "", "", &PersonDetails::default()));
            }
        }
        Ok(Some(Value::Array(creators)))
    }

    /// Creator entry for a free-text author, enriched from the matching
    /// contact's Person record when one was matched during author scraping.
    fn free_text_creator(
        &self,
        scrape: &AuthorScrape,
        person: &str,
        given: &str,
        family: &str,
    ) -> Result<Value, Error> {
        for (key, state) in &scrape.contacts {
            if let ContactState::Matched(matched) = state {
                if matched == person {
                    let details = orcid_and_affiliation(self.resolver, key)?;
                    return Ok(creator_entry(person, given, family, &details));
                }
            }
        }
        Ok(creator_entry(person, given, family, &PersonDetails::default()))
    }

    /// schema.org `contributor`: author-eligible contacts that never made
    /// the creator list, then the non-author contacts bucketed into DataCite
    /// contributor types.
    pub fn get_contributor(&self) -> Result<Option<Value>, Error> {
        let scrape = self.authors()?;
        let mut contributors = Vec::new();

        // author-role contacts absent from the free-text author list
        for (key, state) in &scrape.contacts {
            let ContactState::Roles(roles) = state else {
                continue;
            };
            let first = contributors.is_empty();
            let name = name_splitter(key);
            let details = orcid_and_affiliation(self.resolver, key)?;
            let bucket = if roles.iter().any(|r| r == "CoInvestigator") {
                "ProjectMember"
            } else {
                "ProjectLeader"
            };
            contributors.push(contributor_entry(
                bucket,
                &name.full,
                &name.given,
                &name.family,
                &details,
                first,
            ));
        }

        // curators, contacts, and project staff by bucket priority
        let first = contributors.is_empty();
        for (bucket, raws) in CONTRIBUTOR_BUCKETS {
            for (key, roles) in &scrape.backups {
                if !roles.iter().any(|role| raws.contains(&role.as_str())) {
                    continue;
                }
                let name = name_splitter(key);
                let details = orcid_and_affiliation(self.resolver, key)?;
                contributors.push(contributor_entry(
                    bucket,
                    &name.full,
                    &name.given,
                    &name.family,
                    &details,
                    first,
                ));
            }
        }
        Ok((!contributors.is_empty()).then(|| Value::Array(contributors)))
    }

    /// Each association type set is resolved once per conversion. Without the
    /// cache, a repeat getter for the same set would find its identifiers
    /// already in the guard's visited set and come back truncated.
    fn get_relation(&self, types: &[&str]) -> Result<Option<Value>, Error> {
        let key = types.join(",");
        if let Some(cached) = self.relations.borrow().get(&key) {
            return Ok(cached.clone());
        }
        let describe = |target: Rc<SpaseDocument>| -> Result<LocalRecord, Error> {
            let nested = self.nested(target);
            Ok(LocalRecord {
                url: nested.get_url()?,
                name: nested.get_name()?,
                description: nested.get_description()?,
                license: nested.get_license()?,
                creators: nested.get_creator()?,
            })
        };
        let related = related_records(
            &self.doc,
            types,
            self.resolver,
            self.remote,
            &self.guard,
            self.depth,
            &describe,
        )?;
        self.relations.borrow_mut().insert(key, related.clone());
        Ok(related)
    }

    pub fn get_was_revision_of(&self) -> Result<Option<Value>, Error> {
        self.get_relation(&["RevisionOf"])
    }

    pub fn get_is_based_on(&self) -> Result<Option<Value>, Error> {
        self.get_relation(&["ChildEventOf", "DerivedFrom"])
    }

    pub fn get_was_derived_from(&self) -> Result<Option<Value>, Error> {
        self.get_is_based_on()
    }

    pub fn get_is_part_of(&self) -> Result<Option<Value>, Error> {
        self.get_relation(&["PartOf"])
    }

    pub fn get_mentions(&self) -> Result<Option<Value>, Error> {
        self.get_relation(&["Other"])
    }

    pub fn get_was_generated_by(&self) -> Result<Option<Value>, Error> {
        provenance::was_generated_by(&self.doc, self.resolver)
    }

    /// Assemble the complete JSON-LD record. Key order is fixed; absent
    /// optional fields are omitted entirely.
    pub fn to_json_ld(&self) -> Result<Value, Error> {
        let mut record = Map::new();
        record.insert(
            "@context".to_string(),
            json!({
                "@vocab": "https://schema.org/",
                "prov": "http://www.w3.org/ns/prov#",
                "sosa": "http://www.w3.org/ns/sosa/",
                "spase": "http://www.spase-group.org/data/schema",
            }),
        );
        record.insert("@type".to_string(), json!("Dataset"));
        record.insert("@id".to_string(), json!(self.get_id()?));

        insert_string(&mut record, "name", self.get_name()?);
        insert_string(&mut record, "alternateName", self.get_alternate_name()?);
        insert_string(&mut record, "description", self.get_description()?);
        record.insert("identifier".to_string(), self.get_identifier()?);
        record.insert("url".to_string(), json!(self.get_url()?));
        insert_value(&mut record, "sameAs", self.get_same_as()?);
        insert_value(&mut record, "keywords", self.get_keywords()?);
        insert_value(&mut record, "citation", self.get_citation()?);
        insert_value(&mut record, "creator", self.get_creator()?);
        insert_value(&mut record, "contributor", self.get_contributor()?);
        insert_value(&mut record, "publisher", self.get_publisher()?);
        insert_string(&mut record, "datePublished", self.get_date_published()?);
        insert_string(&mut record, "dateCreated", self.get_date_created()?);
        insert_string(&mut record, "dateModified", self.get_date_modified()?);
        insert_value(&mut record, "license", self.get_license()?);
        insert_value(&mut record, "funding", self.get_funding()?);
        insert_value(
            &mut record,
            "variableMeasured",
            self.get_variable_measured()?,
        );
        insert_value(
            &mut record,
            "temporalCoverage",
            self.get_temporal_coverage()?,
        );
        insert_value(&mut record, "temporal", self.get_temporal()?);
        insert_value(&mut record, "spatialCoverage", self.get_spatial_coverage()?);
        insert_value(&mut record, "distribution", self.get_distribution()?);
        insert_value(
            &mut record,
            "potentialAction",
            self.get_potential_action()?,
        );
        insert_value(&mut record, "subjectOf", self.get_subject_of()?);
        insert_value(&mut record, "isPartOf", self.get_is_part_of()?);
        insert_value(&mut record, "mentions", self.get_mentions()?);
        insert_value(&mut record, "isBasedOn", self.get_is_based_on()?);
        insert_value(
            &mut record,
            "prov:wasDerivedFrom",
            self.get_was_derived_from()?,
        );
        insert_value(
            &mut record,
            "prov:wasRevisionOf",
            self.get_was_revision_of()?,
        );
        insert_value(
            &mut record,
            "prov:wasGeneratedBy",
            self.get_was_generated_by()?,
        );
        Ok(Value::Object(record))
    }

    /// The role slots that accompany the creator list, mirroring its order.
    pub fn creator_roles(&self) -> Result<Vec<RoleSlot>, Error> {
        Ok(self.authors()?.roles)
    }
}

fn insert_string(record: &mut Map<String, Value>, key: &str, value: Option<String>) {
    if let Some(value) = value {
        record.insert(key.to_string(), json!(value));
    }
}

fn insert_value(record: &mut Map<String, Value>, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        record.insert(key.to_string(), value);
    }
}
