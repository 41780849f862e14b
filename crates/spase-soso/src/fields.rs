//! Scalar and list field extractors
//!
//! Each function maps one region of a SPASE record onto its schema.org
//! counterpart. All navigation is relative to the document's subject element;
//! a missing subject surfaces as `NoSubjectElement` from the first extractor
//! that needs it.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};

use crate::document::SpaseDocument;
use crate::error::Error;

const REGION_TERM_SET: &str =
    "https://spase-group.org/data/model/spase-latest/spase-latest_xsd.htm#Region";

/// SPDX entries for the metadata licenses commonly used in SPASE.
const COMMON_LICENSES: [(&str, &str, &str); 3] = [
    (
        "Creative Commons Zero v1.0 Universal",
        "CC0-1.0",
        "https://spdx.org/licenses/CC0-1.0.html",
    ),
    (
        "Creative Commons Attribution Non Commercial 3.0 Unported",
        "CC-BY-NC-3.0",
        "https://spdx.org/licenses/CC-BY-NC-3.0.html",
    ),
    (
        "Creative Commons Attribution 1.0 Generic",
        "CC-BY-1.0",
        "https://spdx.org/licenses/CC-BY-1.0.html",
    ),
];

/// The spase-metadata.org landing page for a record.
pub fn landing_page(doc: &SpaseDocument) -> Result<String, Error> {
    let id = doc.resource_id()?.unwrap_or_default();
    Ok(id.replace("spase://", "https://spase-metadata.org/"))
}

pub fn name(doc: &SpaseDocument) -> Result<Option<String>, Error> {
    Ok(doc
        .subject()?
        .find_text(&["ResourceHeader", "ResourceName"])
        .map(String::from))
}

pub fn description(doc: &SpaseDocument) -> Result<Option<String>, Error> {
    Ok(doc
        .subject()?
        .find_text(&["ResourceHeader", "Description"])
        .map(String::from))
}

/// The record's DOI, or its landing page when no DOI is registered.
pub fn url(doc: &SpaseDocument) -> Result<String, Error> {
    match doc.subject()?.find_text(&["ResourceHeader", "DOI"]) {
        Some(doi) => Ok(doi.to_string()),
        None => landing_page(doc),
    }
}

/// All PriorID values; a single value is unwrapped from its array.
pub fn same_as(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let mut ids: Vec<&str> = doc
        .subject()?
        .descendants()
        .filter(|e| e.name == "PriorID")
        .filter_map(|e| e.text())
        .collect();
    Ok(match ids.len() {
        0 => None,
        1 => Some(json!(ids.remove(0))),
        _ => Some(json!(ids)),
    })
}

/// Keyword and MeasurementType terms, grouped.
pub fn keywords(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let mut words = Vec::new();
    let mut measurement_types = Vec::new();
    for element in doc.subject()?.descendants() {
        match element.name.as_str() {
            "Keyword" => words.extend(element.text()),
            "MeasurementType" => measurement_types.extend(element.text()),
            _ => {}
        }
    }
    if words.is_empty() && measurement_types.is_empty() {
        return Ok(None);
    }
    Ok(Some(json!({
        "keywords": words,
        "measurementTypes": measurement_types,
    })))
}

/// schema.org `identifier`. DOI-bearing records get both the DOI and the
/// SPASE landing page as PropertyValues; others get the landing page alone.
pub fn identifier(doc: &SpaseDocument) -> Result<Value, Error> {
    let url = url(doc)?;
    let id = doc.resource_id()?.unwrap_or_default().to_string();
    let landing = landing_page(doc)?;

    if url.contains("doi") {
        let value = format!(
            "doi:{}",
            url.splitn(4, '/').nth(3).unwrap_or_default()
        );
        Ok(json!([
            {
                "@id": url,
                "@type": "PropertyValue",
                "propertyID": "https://registry.identifiers.org/registry/doi",
                "value": value,
                "url": url,
            },
            {
                "@id": landing,
                "@type": "PropertyValue",
                "propertyID": "SPASE",
                "value": id,
                "url": landing,
            },
        ]))
    } else {
        Ok(json!({
            "@id": url,
            "@type": "PropertyValue",
            "propertyID": "SPASE",
            "url": url,
            "value": id,
        }))
    }
}

/// One InformationURL block from the ResourceHeader.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoUrl {
    pub name: Option<String>,
    pub url: String,
    pub description: Option<String>,
}

pub fn information_urls(doc: &SpaseDocument) -> Result<Vec<InfoUrl>, Error> {
    let subject = doc.subject()?;
    let Some(header) = subject.find(&["ResourceHeader"]) else {
        return Ok(Vec::new());
    };
    let mut urls = Vec::new();
    for block in &header.children {
        if block.name != "InformationURL" {
            continue;
        }
        let Some(url) = block.find_text(&["URL"]) else {
            continue;
        };
        urls.push(InfoUrl {
            name: block.find_text(&["Name"]).map(String::from),
            url: url.to_string(),
            description: block.find_text(&["Description"]).map(String::from),
        });
    }
    Ok(urls)
}

/// schema.org `citation`: each InformationURL as a CreativeWork.
pub fn citation(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let urls = information_urls(doc)?;
    if urls.is_empty() {
        return Ok(None);
    }
    let entries: Vec<Value> = urls
        .iter()
        .map(|info| {
            let mut entry = Map::new();
            entry.insert("@id".to_string(), json!(info.url));
            entry.insert("@type".to_string(), json!("CreativeWork"));
            if let Some(name) = &info.name {
                entry.insert("name".to_string(), json!(name));
            }
            entry.insert("url".to_string(), json!(info.url));
            if info.name.is_some() {
                if let Some(description) = &info.description {
                    entry.insert("description".to_string(), json!(description));
                }
            }
            Value::Object(entry)
        })
        .collect();
    Ok(Some(Value::Array(entries)))
}

/// schema.org `variableMeasured`: one PropertyValue per Parameter, with the
/// first line of its description and its units when present.
pub fn variable_measured(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let mut variables = Vec::new();
    for parameter in doc.subject()?.descendants() {
        if parameter.name != "Parameter" {
            continue;
        }
        let Some(name) = parameter.find_text(&["Name"]) else {
            continue;
        };
        let description = parameter
            .find_text(&["Description"])
            .map(|d| d.split('\n').next().unwrap_or(d));
        let units = parameter.find_text(&["Units"]);

        let mut entry = Map::new();
        entry.insert("@type".to_string(), json!("PropertyValue"));
        entry.insert("name".to_string(), json!(name));
        if let Some(description) = description {
            entry.insert("description".to_string(), json!(description));
        }
        if let Some(units) = units {
            entry.insert("unitText".to_string(), json!(units));
        }
        variables.push(Value::Object(entry));
    }
    Ok((!variables.is_empty()).then(|| Value::Array(variables)))
}

/// schema.org `temporalCoverage`. A closed interval is typed DateTime; an
/// interval without a stop date becomes the open-ended `start/..` string.
pub fn temporal_coverage(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let subject = doc.subject()?;
    let start = subject.find_text(&["TemporalDescription", "TimeSpan", "StartDate"]);
    let stop = subject.find_text(&["TemporalDescription", "TimeSpan", "StopDate"]);
    Ok(match (start, stop) {
        (Some(start), Some(stop)) => Some(json!({
            "@type": "DateTime",
            "temporalCoverage": format!("{}/{}", start.trim(), stop.trim()),
        })),
        (Some(start), None) => Some(json!(format!("{start}/.."))),
        _ => None,
    })
}

/// The interval string inside a `temporalCoverage` value.
pub fn coverage_string(coverage: &Value) -> Option<&str> {
    match coverage {
        Value::String(s) => Some(s),
        Value::Object(map) => map.get("temporalCoverage").and_then(Value::as_str),
        _ => None,
    }
}

/// schema.org `temporal`: the measurement cadence with a plain-language
/// explanation.
pub fn temporal(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let cadence = doc
        .subject()?
        .find_text(&["TemporalDescription", "Cadence"]);
    Ok(cadence.map(|cadence| json!([cadence_context(cadence), cadence])))
}

/// Explain an ISO 8601 duration cadence (`PT4M`, `P1D`) in a sentence.
pub fn cadence_context(cadence: &str) -> String {
    let mut context = String::from("The time series is periodic with a ");
    let after_p = match cadence.split_once('P') {
        Some((_, rest)) => rest,
        None => "",
    };
    let unit_table: &[(char, &str)] = if let Some((_, time)) = after_p.split_once('T') {
        return match time.find(|c| matches!(c, 'H' | 'M' | 'S')) {
            Some(at) => {
                let unit = match time.as_bytes()[at] {
                    b'H' => "hour",
                    b'M' => "minute",
                    _ => "second",
                };
                format!("{context}{} {unit} cadence", &time[..at])
            }
            None => context,
        };
    } else {
        &[('D', "day"), ('M', "month"), ('Y', "year")]
    };
    for (marker, unit) in unit_table {
        if let Some(at) = after_p.find(*marker) {
            context.push_str(&after_p[..at]);
            context.push_str(&format!(" {unit} cadence"));
            return context;
        }
    }
    context
}

/// schema.org `spatialCoverage`: each ObservedRegion as a Place keyed by a
/// SPASE Region term. The first entry expands the DefinedTermSet inline.
pub fn spatial_coverage(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let regions: Vec<&str> = doc
        .subject()?
        .descendants()
        .filter(|e| e.name == "ObservedRegion")
        .filter_map(|e| e.text())
        .collect();
    if regions.is_empty() {
        return Ok(None);
    }
    let entries: Vec<Value> = regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let mut term_set = Map::new();
            term_set.insert("@id".to_string(), json!(REGION_TERM_SET));
            if index == 0 {
                term_set.insert("@type".to_string(), json!("DefinedTermSet"));
                term_set.insert("name".to_string(), json!("SPASE Region"));
                term_set.insert("url".to_string(), json!(REGION_TERM_SET));
            }
            json!({
                "@type": "Place",
                "keywords": {
                    "@type": "DefinedTerm",
                    "inDefinedTermSet": Value::Object(term_set),
                    "termCode": region,
                },
                "name": region.replace('.', " "),
            })
        })
        .collect();
    Ok(Some(Value::Array(entries)))
}

/// A date from the revision history, with or without a time component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevisionDate {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
}

impl RevisionDate {
    fn as_datetime(&self) -> NaiveDateTime {
        match self {
            RevisionDate::DateTime(dt) => *dt,
            RevisionDate::Date(d) => d.and_hms_opt(0, 0, 0).unwrap_or_default(),
        }
    }

    pub fn to_iso_string(&self) -> String {
        match self {
            RevisionDate::DateTime(dt) => dt.format("%Y-%m-%dT%H:%M:%S").to_string(),
            RevisionDate::Date(d) => d.format("%Y-%m-%d").to_string(),
        }
    }
}

impl PartialOrd for RevisionDate {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.as_datetime().cmp(&other.as_datetime()))
    }
}

fn parse_release_date(text: &str) -> Option<RevisionDate> {
    let (date, time) = match text.split_once('T') {
        Some((date, time)) => (date, time),
        None => (text, ""),
    };
    let time = time.replace('Z', "");
    let time = match time.split_once('.') {
        Some((whole, _)) => whole.to_string(),
        None => time,
    };
    let joined = format!("{date} {time}");
    if let Ok(dt) = NaiveDateTime::parse_from_str(&joined, "%Y-%m-%d %H:%M:%S") {
        return Some(RevisionDate::DateTime(dt));
    }
    NaiveDate::parse_from_str(joined.trim(), "%Y-%m-%d")
        .ok()
        .map(RevisionDate::Date)
}

/// The header ReleaseDate and every ReleaseDate in the RevisionHistory.
pub fn dates(doc: &SpaseDocument) -> Result<(Option<RevisionDate>, Vec<RevisionDate>), Error> {
    let subject = doc.subject()?;
    let mut release = None;
    let mut revisions = Vec::new();
    if let Some(header) = subject.find(&["ResourceHeader"]) {
        for child in &header.children {
            match child.name.as_str() {
                "ReleaseDate" => {
                    if let Some(text) = child.text() {
                        release = parse_release_date(text);
                    }
                }
                "RevisionHistory" => {
                    for event in &child.children {
                        for field in &event.children {
                            if field.name == "ReleaseDate" {
                                if let Some(parsed) =
                                    field.text().and_then(parse_release_date)
                                {
                                    revisions.push(parsed);
                                }
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    Ok((release, revisions))
}

/// schema.org `dateModified`: the header ReleaseDate.
pub fn date_modified(doc: &SpaseDocument) -> Result<Option<String>, Error> {
    let (release, _) = dates(doc)?;
    Ok(release.map(|d| d.to_iso_string()))
}

/// schema.org `datePublished`: the PublicationDate, falling back to the
/// earliest revision-history date. The scan compares consecutive entries
/// only, so an out-of-order history can return a non-minimal date.
pub fn date_published(
    publication_date: &str,
    revisions: &[RevisionDate],
) -> Option<String> {
    if publication_date.is_empty() {
        let mut earliest = *revisions.first()?;
        for window in revisions.windows(2) {
            if window[1] < window[0] {
                earliest = window[1];
            }
        }
        Some(earliest.to_iso_string().replace('Z', ""))
    } else {
        Some(publication_date.replace(' ', "T").replace('Z', ""))
    }
}

/// The dataset's AlternateName, last one winning.
pub fn alternate_name(doc: &SpaseDocument) -> Result<Option<String>, Error> {
    let subject = doc.subject()?;
    let Some(header) = subject.find(&["ResourceHeader"]) else {
        return Ok(None);
    };
    let mut alternate = None;
    for child in &header.children {
        if child.name == "AlternateName" {
            alternate = child.text().map(String::from);
        }
    }
    Ok(alternate)
}

/// schema.org `funding`: one MonetaryGrant per funding Agency, with the
/// positionally matching Project and AwardNumber when present.
pub fn funding(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let mut agencies = Vec::new();
    let mut projects = Vec::new();
    let mut awards = Vec::new();
    for block in doc.subject()?.descendants() {
        if block.name != "Funding" {
            continue;
        }
        for child in &block.children {
            match child.name.as_str() {
                "Agency" => agencies.extend(child.text()),
                "Project" => projects.extend(child.text()),
                "AwardNumber" => awards.extend(child.text()),
                _ => {}
            }
        }
    }
    if agencies.is_empty() {
        return Ok(None);
    }
    let grants: Vec<Value> = agencies
        .iter()
        .enumerate()
        .map(|(i, agency)| {
            let mut entry = Map::new();
            entry.insert("@type".to_string(), json!("MonetaryGrant"));
            entry.insert(
                "funder".to_string(),
                json!({"@type": "Organization", "name": agency}),
            );
            if let Some(award) = awards.get(i) {
                entry.insert("identifier".to_string(), json!(award));
            }
            if let Some(project) = projects.get(i) {
                entry.insert("name".to_string(), json!(project));
            }
            Value::Object(entry)
        })
        .collect();
    Ok(Some(Value::Array(grants)))
}

/// schema.org `license`: the Rights entries from every RightsList, carrying
/// their attributes verbatim, de-duplicated by rightsURI.
pub fn license(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let subject = doc.subject()?;
    let mut seen: Vec<String> = Vec::new();
    let mut licenses = Vec::new();
    for rights in subject.find_all(&["AccessInformation", "RightsList", "Rights"]) {
        let uri = rights.attr("rightsURI").unwrap_or_default().to_string();
        if !uri.is_empty() && seen.contains(&uri) {
            continue;
        }
        let mut entry = Map::new();
        for (key, value) in &rights.attributes {
            entry.insert(key.clone(), json!(value));
        }
        entry.insert(
            "name".to_string(),
            json!(rights.text().unwrap_or_default().trim()),
        );
        seen.push(uri);
        licenses.push(Value::Object(entry));
    }
    Ok((!licenses.is_empty()).then(|| Value::Array(licenses)))
}

/// The metadata license declared as a rights attribute on the document root.
pub fn metadata_license(doc: &SpaseDocument) -> Option<String> {
    let mut found = None;
    for (key, value) in &doc.root().attributes {
        if key.contains("rights") {
            found = Some(value.clone());
        }
    }
    found
}

/// The RepositoryID from the last AccessInformation block.
pub fn repository_id(doc: &SpaseDocument) -> Result<Option<String>, Error> {
    let mut repo = None;
    for block in doc.subject()?.descendants() {
        if block.name == "RepositoryID" {
            repo = block.text().map(String::from);
        }
    }
    Ok(repo)
}

/// schema.org `subjectOf`: the SPASE record itself as a DataDownload, with
/// its metadata license resolved to an SPDX URL when recognized.
pub fn subject_of(doc: &SpaseDocument) -> Result<Option<Value>, Error> {
    let content_url = landing_page(doc)?;
    if content_url.is_empty() {
        return Ok(None);
    }
    let mut entry = Map::new();
    entry.insert("@type".to_string(), json!("DataDownload"));
    entry.insert("name".to_string(), json!("SPASE metadata for dataset"));
    entry.insert(
        "description".to_string(),
        json!("The SPASE metadata describing the indicated dataset."),
    );
    entry.insert("encodingFormat".to_string(), json!("application/xml"));
    entry.insert("contentUrl".to_string(), json!(content_url));
    entry.insert("identifier".to_string(), json!(content_url));
    if content_url.contains("doi") {
        entry.insert("@id".to_string(), json!(content_url));
    }
    if let Some(license_name) = metadata_license(doc) {
        if let Some((_, _, url)) = COMMON_LICENSES
            .iter()
            .find(|(full, _, _)| *full == license_name)
        {
            entry.insert("license".to_string(), json!(url));
        }
        if let Some(modified) = date_modified(doc)? {
            entry.insert("dateModified".to_string(), json!(modified));
        }
    }
    Ok(Some(Value::Object(entry)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn doc(xml: &str) -> SpaseDocument {
        SpaseDocument::from_xml(xml).unwrap()
    }

    const RECORD: &str = r#"<Spase xmlns="http://www.spase-group.org/data/schema" xsi:rights="Creative Commons Zero v1.0 Universal">
      <Version>2.7.0</Version>
      <NumericalData>
        <ResourceID>spase://NASA/NumericalData/ACE/MAG/L2/PT16S</ResourceID>
        <ResourceHeader>
          <ResourceName>ACE Magnetic Field 16-Second Data</ResourceName>
          <AlternateName>AC_H0_MFI</AlternateName>
          <ReleaseDate>2022-07-04T12:34:56Z</ReleaseDate>
          <RevisionHistory>
            <RevisionEvent><ReleaseDate>2021-04-27T15:38:11</ReleaseDate></RevisionEvent>
            <RevisionEvent><ReleaseDate>2020-01-01</ReleaseDate></RevisionEvent>
          </RevisionHistory>
          <Description>Magnetic field measurements.</Description>
          <InformationURL>
            <Name>ACE Home</Name>
            <URL>https://izw1.caltech.edu/ACE/</URL>
            <Description>The ACE mission site.</Description>
          </InformationURL>
          <InformationURL>
            <URL>https://example.gov/docs</URL>
          </InformationURL>
          <PriorID>spase://NASA/NumericalData/ACE/MAG/Old</PriorID>
        </ResourceHeader>
        <AccessInformation>
          <RepositoryID>spase://SMWG/Repository/NASA/GSFC/SPDF</RepositoryID>
          <RightsList>
            <Rights rightsURI="https://spdx.org/licenses/CC0-1.0.html" rightsIdentifier="CC0-1.0">Creative Commons Zero v1.0 Universal</Rights>
          </RightsList>
        </AccessInformation>
        <MeasurementType>MagneticField</MeasurementType>
        <TemporalDescription>
          <TimeSpan>
            <StartDate>1997-09-02T00:00:12</StartDate>
            <StopDate>2023-01-01T00:00:00</StopDate>
          </TimeSpan>
          <Cadence>PT16S</Cadence>
        </TemporalDescription>
        <ObservedRegion>Heliosphere.Inner</ObservedRegion>
        <ObservedRegion>Earth.Magnetosphere</ObservedRegion>
        <Parameter>
          <Name>Bx</Name>
          <Description>Magnetic field X component.
Second line.</Description>
          <Units>nT</Units>
        </Parameter>
      </NumericalData>
    </Spase>"#;

    #[test]
    fn test_landing_page_and_url() {
        let doc = doc(RECORD);
        assert_eq!(
            landing_page(&doc).unwrap(),
            "https://spase-metadata.org/NASA/NumericalData/ACE/MAG/L2/PT16S"
        );
        // no DOI in the header, so url falls back to the landing page
        assert_eq!(url(&doc).unwrap(), landing_page(&doc).unwrap());
    }

    #[test]
    fn test_identifier_with_doi() {
        let xml = RECORD.replace(
            "<ResourceName>",
            "<DOI>https://doi.org/10.48322/fake-doi</DOI><ResourceName>",
        );
        let identifier = identifier(&doc(&xml)).unwrap();
        let entries = identifier.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["value"], "doi:10.48322/fake-doi");
        assert_eq!(entries[1]["propertyID"], "SPASE");
    }

    #[test]
    fn test_identifier_without_doi() {
        let identifier = identifier(&doc(RECORD)).unwrap();
        assert!(identifier.is_object());
        assert_eq!(identifier["propertyID"], "SPASE");
    }

    #[test]
    fn test_citation_entries() {
        let citation = citation(&doc(RECORD)).unwrap().unwrap();
        let entries = citation.as_array().unwrap();
        assert_eq!(entries[0]["name"], "ACE Home");
        assert_eq!(entries[0]["description"], "The ACE mission site.");
        assert!(entries[1].get("name").is_none());
        assert_eq!(entries[1]["url"], "https://example.gov/docs");
    }

    #[test]
    fn test_variable_measured_first_description_line() {
        let variables = variable_measured(&doc(RECORD)).unwrap().unwrap();
        assert_eq!(variables[0]["name"], "Bx");
        assert_eq!(variables[0]["description"], "Magnetic field X component.");
        assert_eq!(variables[0]["unitText"], "nT");
    }

    #[test]
    fn test_temporal_coverage_closed_interval() {
        let coverage = temporal_coverage(&doc(RECORD)).unwrap().unwrap();
        assert_eq!(
            coverage["temporalCoverage"],
            "1997-09-02T00:00:12/2023-01-01T00:00:00"
        );
        assert_eq!(
            coverage_string(&coverage),
            Some("1997-09-02T00:00:12/2023-01-01T00:00:00")
        );
    }

    #[test]
    fn test_temporal_coverage_open_interval() {
        let xml = RECORD.replace("<StopDate>2023-01-01T00:00:00</StopDate>", "");
        let coverage = temporal_coverage(&doc(&xml)).unwrap().unwrap();
        assert_eq!(coverage, json!("1997-09-02T00:00:12/.."));
    }

    #[test_case("PT16S", "The time series is periodic with a 16 second cadence")]
    #[test_case("PT4M", "The time series is periodic with a 4 minute cadence")]
    #[test_case("PT1H", "The time series is periodic with a 1 hour cadence")]
    #[test_case("P1D", "The time series is periodic with a 1 day cadence")]
    #[test_case("P1M", "The time series is periodic with a 1 month cadence")]
    #[test_case("P1Y", "The time series is periodic with a 1 year cadence")]
    fn test_cadence_context(cadence: &str, expected: &str) {
        assert_eq!(cadence_context(cadence), expected);
    }

    #[test]
    fn test_spatial_coverage_first_entry_expanded() {
        let coverage = spatial_coverage(&doc(RECORD)).unwrap().unwrap();
        let entries = coverage.as_array().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0]["name"], "Heliosphere Inner");
        assert_eq!(
            entries[0]["keywords"]["inDefinedTermSet"]["name"],
            "SPASE Region"
        );
        assert!(entries[1]["keywords"]["inDefinedTermSet"]
            .get("name")
            .is_none());
        assert_eq!(entries[1]["keywords"]["termCode"], "Earth.Magnetosphere");
    }

    #[test]
    fn test_dates_parse_with_and_without_time() {
        let (release, revisions) = dates(&doc(RECORD)).unwrap();
        assert_eq!(release.unwrap().to_iso_string(), "2022-07-04T12:34:56");
        assert_eq!(revisions.len(), 2);
        assert_eq!(revisions[1].to_iso_string(), "2020-01-01");
    }

    #[test]
    fn test_date_published_falls_back_to_earliest_revision() {
        let (_, revisions) = dates(&doc(RECORD)).unwrap();
        assert_eq!(date_published("", &revisions), Some("2020-01-01".to_string()));
        assert_eq!(
            date_published("2021-04-01 00:00:00Z", &revisions),
            Some("2021-04-01T00:00:00".to_string())
        );
    }

    #[test]
    fn test_license_and_metadata_license() {
        let doc = doc(RECORD);
        let license = license(&doc).unwrap().unwrap();
        assert_eq!(license[0]["rightsIdentifier"], "CC0-1.0");
        assert_eq!(license[0]["name"], "Creative Commons Zero v1.0 Universal");
        assert_eq!(
            metadata_license(&doc),
            Some("Creative Commons Zero v1.0 Universal".to_string())
        );
    }

    #[test]
    fn test_subject_of_resolves_common_license() {
        let subject_of = subject_of(&doc(RECORD)).unwrap().unwrap();
        assert_eq!(subject_of["@type"], "DataDownload");
        assert_eq!(
            subject_of["license"],
            "https://spdx.org/licenses/CC0-1.0.html"
        );
        assert_eq!(subject_of["dateModified"], "2022-07-04T12:34:56");
    }

    #[test]
    fn test_misc_scalars() {
        let doc = doc(RECORD);
        assert_eq!(
            name(&doc).unwrap().as_deref(),
            Some("ACE Magnetic Field 16-Second Data")
        );
        assert_eq!(alternate_name(&doc).unwrap().as_deref(), Some("AC_H0_MFI"));
        assert_eq!(
            repository_id(&doc).unwrap().as_deref(),
            Some("spase://SMWG/Repository/NASA/GSFC/SPDF")
        );
        assert_eq!(
            same_as(&doc).unwrap(),
            Some(json!("spase://NASA/NumericalData/ACE/MAG/Old"))
        );
        let keywords = keywords(&doc).unwrap().unwrap();
        assert_eq!(keywords["measurementTypes"][0], "MagneticField");
    }
}
