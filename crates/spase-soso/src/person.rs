//! Person-record resolution and contact-name heuristics
//!
//! SPASE contact identifiers embed names as period-separated path segments
//! (`spase://SMWG/Person/Jane.Q.Doe`). This module splits those segments into
//! name parts, resolves the referenced Person record for ORCID/affiliation
//! details, and fuzzily matches free-text author strings against contacts.

use crate::error::Error;
use crate::resolver::DocumentResolver;

/// Name fields split out of a contact identifier.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SplitName {
    /// Full display name, e.g. `"Jane Q. Doe"`.
    pub full: String,
    /// Given name plus any middle initials, e.g. `"Jane Q."`.
    pub given: String,
    /// Family name, e.g. `"Doe"`.
    pub family: String,
}

/// Details pulled from a resolved SPASE Person record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PersonDetails {
    pub orcid: String,
    pub affiliation: String,
    pub ror: String,
}

/// Split a contact identifier's trailing `Person/` segment into name parts.
///
/// The first period separates the given name from the remainder; each further
/// period-delimited piece is collapsed to a single initial and appended to the
/// given name with a trailing period, leaving the final piece as the family
/// name. An identifier without a `Person/` segment or without periods yields
/// empty given/family names.
pub fn name_splitter(person: &str) -> SplitName {
    let name_str = match person.split_once("Person/") {
        Some((_, after)) => after,
        None => "",
    };
    let name_str = name_str.replace('\'', "");

    if let Some((given, remainder)) = name_str.split_once('.') {
        let mut given = given.to_string();
        let mut family = remainder.to_string();
        while let Some(split) = family.find('.') {
            let mut initial: String = family[..split].to_string();
            if initial.chars().count() > 1 {
                initial.truncate(initial.chars().next().map_or(0, char::len_utf8));
            }
            family = family[split + 1..].to_string();
            given = format!("{given} {initial}.");
        }
        let full = format!("{given} {family}").replace('"', "");
        SplitName {
            full,
            given,
            family,
        }
    } else {
        SplitName {
            full: name_str,
            given: String::new(),
            family: String::new(),
        }
    }
}

/// Resolve a person identifier and read ORCID, affiliation, and ROR from the
/// target record. A missing record is `UnresolvedPerson`; whether that is
/// fatal depends on the call site.
pub fn orcid_and_affiliation(
    resolver: &dyn DocumentResolver,
    person_id: &str,
) -> Result<PersonDetails, Error> {
    let doc = resolver.resolve(person_id)?;
    let subject = doc.subject()?;

    let mut details = PersonDetails::default();
    for element in subject.descendants() {
        match element.name.as_str() {
            "ORCIdentifier" => {
                if let Some(text) = element.text() {
                    details.orcid = text.to_string();
                }
            }
            "OrganizationName" => {
                if let Some(text) = element.text() {
                    details.affiliation = text.to_string();
                }
            }
            "RORIdentifier" => {
                if let Some(text) = element.text() {
                    details.ror = text.to_string();
                }
            }
            _ => {}
        }
    }
    Ok(details)
}

/// First-name/initial/family-name pieces of a contact identifier as used by
/// the fuzzy matcher.
#[derive(Debug, Clone)]
struct ContactNameParts {
    first: String,
    initial: String,
    family: String,
}

fn contact_name_parts(contact: &str) -> ContactNameParts {
    // the text after the last period is the family name; everything before it
    // splits into first name and optional middle initial(s)
    let (before, family) = match contact.rsplit_once('.') {
        Some((before, family)) => (before, family),
        None => ("", contact),
    };
    let (first, initial) = match before.split_once('.') {
        Some((first, initial)) => (first, initial),
        None => (before, ""),
    };
    let first = first.rsplit('/').next().unwrap_or(first);
    let first = if first.chars().count() == 1 {
        format!("{first}.")
    } else {
        first.to_string()
    };
    ContactNameParts {
        first,
        initial: initial.to_string(),
        family: family.to_string(),
    }
}

/// Does a free-text author string refer to the person behind a contact
/// identifier?
///
/// A match requires the family name as a substring, the first name either
/// initialized (`"J."`) or spelled out, and — when the contact carries a
/// middle name — the middle piece as well (bare when it is a full middle
/// name, with a trailing period when it is a single initial). First match
/// in contact iteration order wins; there is no scoring.
pub fn matches_author(contact: &str, author: &str) -> bool {
    let parts = contact_name_parts(contact);
    let Some(first_char) = parts.first.chars().next() else {
        return false;
    };
    let first_found =
        author.contains(&format!("{first_char}.")) || author.contains(&parts.first);
    let family_found = author.contains(&parts.family);

    if parts.initial.is_empty() {
        first_found && family_found
    } else if parts.initial.chars().count() > 1 {
        first_found && family_found && author.contains(&parts.initial)
    } else {
        first_found && family_found && author.contains(&format!("{}.", parts.initial))
    }
}

/// Format the matched contact the way authors are listed: `"Family, First"`
/// with the middle initial carried along when present.
pub fn matched_contact_name(contact: &str) -> String {
    let parts = contact_name_parts(contact);
    if parts.initial.is_empty() {
        format!("{}, {}", parts.family, parts.first)
    } else if parts.initial.chars().count() > 1 {
        format!("{}, {} {}", parts.family, parts.first, parts.initial)
    } else {
        format!("{}, {} {}.", parts.family, parts.first, parts.initial)
    }
}
