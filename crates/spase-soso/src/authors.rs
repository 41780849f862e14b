//! Author and contact aggregation
//!
//! Authorship comes from two places in a SPASE record: structured
//! `ResourceHeader/Contact` entries (PersonID plus one or more roles) and the
//! free-text `PublicationInfo/Authors` string. PublicationInfo wins when both
//! are present; contacts then only contribute roles, ORCID, and affiliation
//! through fuzzy name matching. Contacts that never make the author list feed
//! the contributor pass.

use lazy_static::lazy_static;
use regex::Regex;

use crate::document::SpaseDocument;
use crate::error::Error;
use crate::person::{matched_contact_name, matches_author, name_splitter};
use crate::roles::{is_author_role, is_curation_role, AUTHOR_PRIORITY};

lazy_static! {
    // a trailing single letter preceded by a period or space is an initial
    static ref TRAILING_INITIAL: Regex = Regex::new(r"[.\s]\w$").unwrap();
}

/// Role(s) attached to one author slot. The author and role sequences are
/// positionally correlated and stay equal length.
#[derive(Debug, Clone, PartialEq)]
pub enum RoleSlot {
    One(String),
    Many(Vec<String>),
}

impl RoleSlot {
    pub fn as_list(&self) -> Vec<String> {
        match self {
            RoleSlot::One(role) => vec![role.clone()],
            RoleSlot::Many(roles) => roles.clone(),
        }
    }
}

/// State of an author-eligible contact while authors are being assembled.
#[derive(Debug, Clone, PartialEq)]
pub enum ContactState {
    /// Author-eligible roles collected from the Contact block, document order,
    /// duplicates preserved.
    Roles(Vec<String>),
    /// Replaced by the formatted `"Family, Given"` name once the contact was
    /// matched to a free-text author.
    Matched(String),
}

/// Everything scraped from ResourceHeader Contacts and PublicationInfo.
#[derive(Debug, Clone, Default)]
pub struct AuthorScrape {
    pub authors: Vec<String>,
    pub roles: Vec<RoleSlot>,
    pub publication_date: String,
    pub publisher: String,
    pub dataset_title: String,
    /// Contacts with non-author roles, insertion order preserved.
    pub backups: Vec<(String, Vec<String>)>,
    /// Author-eligible contacts, insertion order preserved.
    pub contacts: Vec<(String, ContactState)>,
}

impl Default for RoleSlot {
    fn default() -> Self {
        RoleSlot::One(String::new())
    }
}

/// Scrape authors, roles, publication info, and contact lists from a record.
///
/// `file_key` identifies the record in the do-not-split list (consortium
/// author strings that must not be cut at separators).
pub fn scrape_authors(
    doc: &SpaseDocument,
    file_key: &str,
    no_split: &[String],
) -> Result<AuthorScrape, Error> {
    let subject = doc.subject()?;
    let mut scrape = AuthorScrape::default();
    let mut raw_contacts: Vec<(String, Vec<String>)> = Vec::new();
    let mut publication_info = None;

    if let Some(header) = subject.find(&["ResourceHeader"]) {
        for child in &header.children {
            match child.name.as_str() {
                "PublicationInfo" => publication_info = Some(child),
                "Contact" => {
                    let mut person: Option<String> = None;
                    for field in &child.children {
                        match field.name.as_str() {
                            "PersonID" => {
                                let id = field.text().unwrap_or_default().to_string();
                                reset_entry(&mut scrape.backups, &id);
                                reset_entry(&mut raw_contacts, &id);
                                person = Some(id);
                            }
                            "Role" => {
                                let Some(person) = &person else { continue };
                                let Some(role) = field.text() else { continue };
                                if is_author_role(role) {
                                    push_author_role(&mut scrape, person, role);
                                    push_role(&mut raw_contacts, person, role);
                                } else if role == "Publisher" {
                                    scrape.publisher = role.to_string();
                                } else {
                                    push_role(&mut scrape.backups, person, role);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
    }

    // PublicationInfo overrides contact-derived authors
    if let Some(info) = publication_info {
        for field in info.descendants() {
            let Some(text) = field.text() else { continue };
            match field.name.as_str() {
                "Authors" => {
                    scrape.authors = vec![text.to_string()];
                    scrape.roles = vec![RoleSlot::One("Author".to_string())];
                }
                "PublicationDate" => scrape.publication_date = text.to_string(),
                "PublishedBy" => scrape.publisher = text.to_string(),
                "Title" => scrape.dataset_title = text.to_string(),
                _ => {}
            }
        }
    }

    scrape.backups.retain(|(_, roles)| !roles.is_empty());
    raw_contacts.retain(|(_, roles)| !roles.is_empty());

    let (authors, roles, contacts) = process_authors(
        scrape.authors.clone(),
        scrape.roles.clone(),
        raw_contacts,
        file_key,
        no_split,
    );
    scrape.authors = authors;
    scrape.roles = roles;
    scrape.contacts = contacts;

    // drop authors from the contributor backups unless they also hold a
    // ContactPerson/DataCurator role
    let authors = scrape.authors.clone();
    scrape.backups.retain(|(key, roles)| {
        let is_author = authors.iter().any(|author| {
            if author.contains("spase") {
                author == key
            } else {
                let name = name_splitter(key);
                *author == format!("{}, {}", name.family, name.given)
            }
        });
        !(is_author && roles.iter().any(|role| !is_curation_role(role)))
    });

    Ok(scrape)
}

fn reset_entry(entries: &mut Vec<(String, Vec<String>)>, key: &str) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some((_, roles)) => roles.clear(),
        None => entries.push((key.to_string(), Vec::new())),
    }
}

fn push_role(entries: &mut Vec<(String, Vec<String>)>, key: &str, role: &str) {
    if let Some((_, roles)) = entries.iter_mut().find(|(k, _)| k == key) {
        roles.push(role.to_string());
    }
}

fn push_author_role(scrape: &mut AuthorScrape, person: &str, role: &str) {
    match scrape.authors.iter().position(|a| a == person) {
        None => {
            scrape.authors.push(person.to_string());
            scrape.roles.push(RoleSlot::One(role.to_string()));
        }
        Some(index) => {
            let mut roles = scrape.roles[index].as_list();
            roles.push(role.to_string());
            scrape.roles[index] = RoleSlot::Many(roles);
        }
    }
}

/// Normalize the author list: split free-text author strings, merge contact
/// roles into matched authors, and re-order contact-derived authors by
/// priority.
fn process_authors(
    authors: Vec<String>,
    roles: Vec<RoleSlot>,
    contacts: Vec<(String, Vec<String>)>,
    file_key: &str,
    no_split: &[String],
) -> (Vec<String>, Vec<RoleSlot>, Vec<(String, ContactState)>) {
    let from_contacts = authors.iter().any(|a| a.contains("Person/"));

    if from_contacts {
        // keep only non-author roles for the contributor pass
        let mut remaining = Vec::new();
        for (person, contact_roles) in contacts {
            let kept: Vec<String> = contact_roles
                .into_iter()
                .filter(|role| !is_author_role(role))
                .collect();
            if !kept.is_empty() {
                remaining.push((person, ContactState::Roles(kept)));
            }
        }

        // re-order by author priority; only single-role slots participate
        let mut ordered = Vec::new();
        let mut ordered_roles = Vec::new();
        for priority in AUTHOR_PRIORITY {
            for (index, creator) in authors.iter().enumerate() {
                if roles[index] == RoleSlot::One(priority.to_string())
                    && !ordered.contains(creator)
                {
                    ordered.push(creator.clone());
                    ordered_roles.push(roles[index].clone());
                }
            }
        }
        return (ordered, ordered_roles, remaining);
    }

    let mut contacts: Vec<(String, ContactState)> = contacts
        .into_iter()
        .map(|(person, r)| (person, ContactState::Roles(r)))
        .collect();

    let Some(text) = authors.first().cloned() else {
        return (authors, roles, contacts);
    };
    let mut authors = authors;
    let mut roles = roles;
    let splittable = !no_split.iter().any(|entry| entry == file_key);

    let multiple = (text.contains("; ")
        || text.contains("., ")
        || text.contains(" and ")
        || text.contains(" & "))
        && splittable;

    if multiple {
        let parts: Vec<String> = if text.contains(';') {
            text.split("; ").map(String::from).collect()
        } else if text.contains(".,") {
            text.split("., ").map(String::from).collect()
        } else if text.contains(" and ") {
            text.split(" and ").map(String::from).collect()
        } else {
            text.split(" & ").map(String::from).collect()
        };
        authors = parts;
        while roles.len() < authors.len() {
            roles.push(RoleSlot::One("Author".to_string()));
        }

        for index in 0..authors.len() {
            let mut person = authors[index].replace('\'', "");
            // a bare trailing initial gets its period back
            if !person.ends_with('.') && TRAILING_INITIAL.is_match(&person) {
                person.push('.');
            }
            if person.contains("and ") {
                person = person.replace("and ", "");
            }
            let (family, given) = split_person_string(&person);
            find_match(&mut contacts, &person, &mut roles, index);
            authors[index] = format!("{family}, {given}").trim().to_string();
        }
    } else {
        let person = text.replace('\'', "");
        if person.contains(", ") && splittable {
            let (family, given) = match person.split_once(", ") {
                Some((f, g)) => (f.to_string(), g.replace(',', "")),
                None => (person.clone(), String::new()),
            };
            find_match(&mut contacts, &person, &mut roles, 0);
            authors[0] = format!("{family}, {given}").trim().to_string();
        } else if person.contains(". ") && splittable {
            let (given, family) = match person.split_once(". ") {
                Some((g, f)) => (g.to_string(), f.to_string()),
                None => (String::new(), person.clone()),
            };
            let (given, family) = if let Some((initial, family)) = family.split_once(' ') {
                let initial = initial.chars().next().map(String::from).unwrap_or_default();
                (format!("{given}. {initial}."), family.to_string())
            } else {
                (given, family)
            };
            find_match(&mut contacts, &person, &mut roles, 0);
            authors[0] = format!("{family}, {given}").trim().to_string();
        } else {
            // no separators: a consortium or organization, kept whole
            authors[0] = person.trim().to_string();
        }
    }

    (authors, roles, contacts)
}

fn split_person_string(person: &str) -> (String, String) {
    if let Some((family, given)) = person.split_once(", ") {
        (family.to_string(), given.replace(',', ""))
    } else {
        let (given, family) = match person.split_once(". ") {
            Some((g, f)) => (format!("{g}."), f.to_string()),
            None => (format!("{person}."), String::new()),
        };
        (family, given.replace(',', ""))
    }
}

/// Find the first contact whose identifier fuzzily matches the author string.
/// On a match the contact's roles move into the author's role slot and the
/// contact is marked with its formatted name.
fn find_match(
    contacts: &mut [(String, ContactState)],
    person: &str,
    roles: &mut [RoleSlot],
    index: usize,
) {
    let position = contacts.iter().position(|(key, state)| {
        matches!(state, ContactState::Roles(_)) && matches_author(key, person)
    });
    let Some(position) = position else { return };

    let (key, state) = &mut contacts[position];
    if let ContactState::Roles(contact_roles) = state {
        if roles[index].as_list() != *contact_roles {
            let mut merged = roles[index].as_list();
            merged.extend(contact_roles.iter().cloned());
            roles[index] = RoleSlot::Many(merged);
        }
        *state = ContactState::Matched(matched_contact_name(key));
    }
}
