//! JSON-LD entry builders for people
//!
//! Creators and contributors share the same Person payload but sit inside
//! different wrappers: a creator is a bare schema.org Person, a contributor is
//! wrapped in a Role/DefinedTerm object carrying the SPASE role as a term
//! code. The first contributor entry expands the DefinedTermSet inline.

use serde_json::{json, Map, Value};

use crate::person::PersonDetails;
use crate::roles::prettify_role;

const ROLE_TERM_SET: &str =
    "https://spase-group.org/data/model/spase-latest/spase-latest_xsd.htm#Role";

/// Build a schema.org creator entry.
pub fn creator_entry(
    name: &str,
    given_name: &str,
    family_name: &str,
    details: &PersonDetails,
) -> Value {
    let mut entry = Map::new();
    entry.insert("@type".to_string(), json!("Person"));
    entry.insert("name".to_string(), json!(name));
    if !given_name.is_empty() && !family_name.is_empty() {
        entry.insert("familyName".to_string(), json!(family_name));
        entry.insert("givenName".to_string(), json!(given_name));
    }
    attach_details(&mut entry, details);
    Value::Object(entry)
}

/// Build a schema.org contributor entry wrapped in its role term.
pub fn contributor_entry(
    role_name: &str,
    name: &str,
    given_name: &str,
    family_name: &str,
    details: &PersonDetails,
    first_entry: bool,
) -> Value {
    let mut person = Map::new();
    person.insert("@type".to_string(), json!("Person"));
    person.insert("name".to_string(), json!(name));
    if !given_name.is_empty() && !family_name.is_empty() {
        person.insert("familyName".to_string(), json!(family_name));
        person.insert("givenName".to_string(), json!(given_name));
    }
    attach_details(&mut person, details);

    let mut term_set = Map::new();
    term_set.insert("@id".to_string(), json!(ROLE_TERM_SET));
    if first_entry {
        term_set.insert("@type".to_string(), json!("DefinedTermSet"));
        term_set.insert("name".to_string(), json!("SPASE Role"));
        term_set.insert("url".to_string(), json!(ROLE_TERM_SET));
    }

    json!({
        "@type": ["Role", "DefinedTerm"],
        "contributor": Value::Object(person),
        "inDefinedTermSet": Value::Object(term_set),
        "roleName": prettify_role(role_name),
        "termCode": role_name,
    })
}

fn attach_details(person: &mut Map<String, Value>, details: &PersonDetails) {
    if !details.orcid.is_empty() {
        let orcid_value = details
            .orcid
            .rsplit('/')
            .next()
            .unwrap_or(details.orcid.as_str());
        let orcid_url = format!("https://orcid.org/{}", details.orcid);
        person.insert(
            "identifier".to_string(),
            json!({
                "@id": orcid_url,
                "@type": "PropertyValue",
                "propertyID": "https://registry.identifiers.org/registry/orcid",
                "url": orcid_url,
                "value": format!("orcid:{orcid_value}"),
            }),
        );
        person.insert("@id".to_string(), json!(orcid_url));
    }
    if !details.affiliation.is_empty() {
        let affiliation = if details.ror.is_empty() {
            json!({"@type": "Organization", "name": details.affiliation})
        } else {
            let ror_url = format!("https://ror.org/{}", details.ror);
            json!({
                "@type": "Organization",
                "name": details.affiliation,
                "identifier": {
                    "@id": ror_url,
                    "@type": "PropertyValue",
                    "propertyID": "https://registry.identifiers.org/registry/ror",
                    "url": ror_url,
                    "value": format!("ror:{}", details.ror),
                },
            })
        };
        person.insert("affiliation".to_string(), affiliation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> PersonDetails {
        PersonDetails {
            orcid: "0000-0001-2345-6789".to_string(),
            affiliation: "Example University".to_string(),
            ror: "03yrm5c26".to_string(),
        }
    }

    #[test]
    fn test_creator_with_orcid_and_ror() {
        let entry = creator_entry("Doe, Jane Q.", "Jane Q.", "Doe", &details());
        assert_eq!(entry["@type"], "Person");
        assert_eq!(entry["givenName"], "Jane Q.");
        assert_eq!(entry["@id"], "https://orcid.org/0000-0001-2345-6789");
        assert_eq!(entry["identifier"]["value"], "orcid:0000-0001-2345-6789");
        assert_eq!(entry["affiliation"]["name"], "Example University");
        assert_eq!(entry["affiliation"]["identifier"]["value"], "ror:03yrm5c26");
    }

    #[test]
    fn test_creator_without_name_parts() {
        let entry = creator_entry("AMPTE Consortium", "", "", &PersonDetails::default());
        assert!(entry.get("givenName").is_none());
        assert!(entry.get("identifier").is_none());
        assert!(entry.get("affiliation").is_none());
    }

    #[test]
    fn test_contributor_role_wrapping() {
        let entry = contributor_entry(
            "ContactPerson",
            "Lee, Ann",
            "Ann",
            "Lee",
            &PersonDetails::default(),
            true,
        );
        assert_eq!(entry["roleName"], "Contact Person");
        assert_eq!(entry["termCode"], "ContactPerson");
        assert_eq!(entry["contributor"]["name"], "Lee, Ann");
        assert_eq!(entry["inDefinedTermSet"]["@type"], "DefinedTermSet");
        assert_eq!(entry["inDefinedTermSet"]["name"], "SPASE Role");
    }

    #[test]
    fn test_later_contributors_reference_term_set() {
        let entry = contributor_entry(
            "DataCurator",
            "Lee, Ann",
            "Ann",
            "Lee",
            &PersonDetails::default(),
            false,
        );
        assert!(entry["inDefinedTermSet"].get("@type").is_none());
        assert!(entry["inDefinedTermSet"]["@id"]
            .as_str()
            .unwrap()
            .ends_with("#Role"));
    }
}
