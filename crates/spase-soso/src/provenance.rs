//! Provenance: the instruments and observatories behind a dataset
//!
//! A dataset record names its instruments through InstrumentID; each
//! instrument record names its observatory, which may in turn belong to an
//! observatory group. All three levels resolve locally. A link that cannot be
//! resolved is logged and skipped, never fatal.

use serde_json::{json, Value};
use tracing::warn;

use crate::document::SpaseDocument;
use crate::error::Error;
use crate::fields;
use crate::resolver::DocumentResolver;

fn identifier_value(id: &str) -> Value {
    json!({
        "@type": "PropertyValue",
        "propertyID": "SPASE Resource ID",
        "value": id,
    })
}

fn instrument_ids(doc: &SpaseDocument) -> Result<Vec<String>, Error> {
    let mut ids: Vec<String> = Vec::new();
    for element in doc.subject()?.descendants() {
        if element.name == "InstrumentID" {
            if let Some(text) = element.text() {
                if !ids.iter().any(|i| i == text) {
                    ids.push(text.to_string());
                }
            }
        }
    }
    Ok(ids)
}

/// Each InstrumentID resolved to an IndividualProduct entry. `None` when the
/// record names no instruments.
pub fn instruments(
    doc: &SpaseDocument,
    resolver: &dyn DocumentResolver,
) -> Result<Option<Vec<Value>>, Error> {
    let ids = instrument_ids(doc)?;
    if ids.is_empty() {
        return Ok(None);
    }
    let mut entries = Vec::new();
    for id in &ids {
        let resolved = match resolver.resolve(id) {
            Ok(resolved) => resolved,
            Err(err) => {
                warn!(identifier = %id, %err, "could not access associated SPASE record");
                continue;
            }
        };
        let name = fields::name(&resolved)?.unwrap_or_default();
        let url = fields::url(&resolved)?;
        if !url.is_empty() {
            entries.push(json!({
                "@id": url,
                "@type": ["IndividualProduct", "prov:Entity", "sosa:System"],
                "identifier": identifier_value(id),
                "name": name,
                "url": url,
            }));
        }
    }
    Ok(Some(entries))
}

/// The observatories (and observatory groups) each instrument is mounted on,
/// resolved through the instrument records and de-duplicated by resource ID.
pub fn observatories(
    doc: &SpaseDocument,
    resolver: &dyn DocumentResolver,
) -> Result<Option<Vec<Value>>, Error> {
    let ids = instrument_ids(doc)?;
    if ids.is_empty() {
        return Ok(None);
    }
    let mut entries = Vec::new();
    let mut recorded: Vec<String> = Vec::new();

    for id in &ids {
        let instrument = match resolver.resolve(id) {
            Ok(instrument) => instrument,
            Err(err) => {
                warn!(identifier = %id, %err, "could not access associated SPASE record");
                continue;
            }
        };
        let Some(observatory_id) = last_text(&instrument, "ObservatoryID")? else {
            continue;
        };
        let observatory = match resolver.resolve(&observatory_id) {
            Ok(observatory) => observatory,
            Err(err) => {
                warn!(identifier = %observatory_id, %err, "could not access associated SPASE record");
                continue;
            }
        };
        let group_id = last_text(&observatory, "ObservatoryGroupID")?;
        let name = fields::name(&observatory)?.unwrap_or_default();
        let url = fields::url(&observatory)?;

        if let Some(group_id) = group_id {
            if let Ok(group) = resolver.resolve(&group_id) {
                let group_name = fields::name(&group)?.unwrap_or_default();
                let group_url = fields::url(&group)?;
                if !group_url.is_empty() && !recorded.contains(&group_id) {
                    entries.push(json!({
                        "@type": ["ResearchProject", "prov:Entity", "sosa:Platform"],
                        "@id": group_url,
                        "name": group_name,
                        "identifier": identifier_value(&group_id),
                        "url": group_url,
                    }));
                    recorded.push(group_id);
                }
            }
        }
        if !url.is_empty() && !recorded.contains(&observatory_id) {
            entries.push(json!({
                "@type": ["ResearchProject", "prov:Entity", "sosa:Platform"],
                "@id": url,
                "name": name,
                "identifier": identifier_value(&observatory_id),
                "url": url,
            }));
            recorded.push(observatory_id);
        }
    }
    Ok(Some(entries))
}

/// prov:wasGeneratedBy: every observatory and instrument wrapped as an
/// activity input, observatories first.
pub fn was_generated_by(
    doc: &SpaseDocument,
    resolver: &dyn DocumentResolver,
) -> Result<Option<Value>, Error> {
    let mut generated = Vec::new();
    if let Some(observatories) = observatories(doc, resolver)? {
        for each in observatories {
            generated.push(json!({
                "@type": ["ResearchProject", "prov:Activity"],
                "prov:used": each,
            }));
        }
    }
    if let Some(instruments) = instruments(doc, resolver)? {
        for each in instruments {
            generated.push(json!({
                "@type": ["ResearchProject", "prov:Activity"],
                "prov:used": each,
            }));
        }
    }
    Ok((!generated.is_empty()).then(|| Value::Array(generated)))
}

fn last_text(doc: &SpaseDocument, tag: &str) -> Result<Option<String>, Error> {
    let mut found = None;
    for element in doc.subject()?.descendants() {
        if element.name == tag {
            found = element.text().map(String::from);
        }
    }
    Ok(found)
}
