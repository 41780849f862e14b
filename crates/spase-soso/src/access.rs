//! Access URL collection and classification
//!
//! Every `AccessInformation/AccessURL` in a record is either a direct data
//! download (the URL's file extension names a data format) or an interactive
//! access point that becomes a schema.org SearchAction. URLs carrying product
//! keys are always access points, never direct downloads.

use chrono::{Duration, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde_json::{json, Value};

use crate::document::SpaseDocument;
use crate::error::Error;

/// File extensions that mark a URL as a direct data download.
const DATA_FILE_EXT: [&str; 15] = [
    "csv", "cdf", "fits", "txt", "nc", "jpeg", "png", "gif", "tar", "netcdf3", "netcdf4",
    "hdf5", "zarr", "asdf", "zip",
];

lazy_static! {
    /// ISO 8601 datetime, seconds precision, optional fraction and Z suffix.
    pub static ref ISO_DATETIME: Regex = Regex::new(
        r"(-?(?:[1-9][0-9]*)?[0-9]{4})-(1[0-2]|0[1-9])-(3[01]|0[1-9]|[12][0-9])T(2[0-3]|[01][0-9]):([0-5][0-9]):([0-5][0-9])(.[0-9]+)?(Z)?"
    )
    .unwrap();
}

/// One access URL with its declared format and any product keys.
#[derive(Debug, Clone, PartialEq)]
pub struct AccessUrl {
    pub url: String,
    pub format: String,
    /// `None` when the URL carries no ProductKey elements.
    pub product_keys: Option<Vec<String>>,
}

/// Access URLs split into direct downloads and interactive access points.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccessUrls {
    pub downloads: Vec<AccessUrl>,
    pub actions: Vec<AccessUrl>,
}

/// Collect and classify every AccessURL under the record's subject element.
pub fn collect_access_urls(doc: &SpaseDocument) -> Result<AccessUrls, Error> {
    let subject = doc.subject()?;
    let mut split = AccessUrls::default();

    for block in subject.descendants() {
        if block.name != "AccessInformation" {
            continue;
        }
        let format = block.find_text(&["Format"]).unwrap_or_default().to_string();
        for access_url in block.find_all(&["AccessURL"]) {
            let Some(url) = access_url.find_text(&["URL"]) else {
                continue;
            };
            let keys: Vec<String> = access_url
                .find_all(&["ProductKey"])
                .iter()
                .filter_map(|k| k.text())
                .map(String::from)
                .collect();

            if keys.is_empty() {
                let entry = AccessUrl {
                    url: url.to_string(),
                    format: format.clone(),
                    product_keys: None,
                };
                if is_downloadable(url) {
                    split.downloads.push(entry);
                } else {
                    split.actions.push(entry);
                }
            } else {
                // keyed URLs need a query to reach data, never a direct download
                split.actions.push(AccessUrl {
                    url: url.to_string(),
                    format: format.clone(),
                    product_keys: Some(keys),
                });
            }
        }
    }
    Ok(split)
}

/// Does the URL's trailing file extension name a data file?
fn is_downloadable(url: &str) -> bool {
    let after_scheme = match url.split_once("://") {
        Some((_, rest)) => rest,
        None => url,
    };
    let file = after_scheme.rsplit('/').next().unwrap_or(after_scheme);
    match file.rsplit_once('.') {
        Some((_, ext)) => DATA_FILE_EXT.contains(&ext),
        None => false,
    }
}

/// schema.org `distribution`: one DataDownload per direct download URL.
/// A single entry is unwrapped from its array.
pub fn distribution_json(downloads: &[AccessUrl]) -> Option<Value> {
    let mut entries: Vec<Value> = downloads
        .iter()
        .map(|d| {
            json!({
                "@type": "DataDownload",
                "contentUrl": d.url,
                "encodingFormat": d.format,
            })
        })
        .collect();
    match entries.len() {
        0 => None,
        1 => Some(entries.remove(0)),
        _ => Some(Value::Array(entries)),
    }
}

/// schema.org `potentialAction`: one SearchAction per access point, expanded
/// per product key. HAPI endpoints get a parameterized urlTemplate with
/// start/end query inputs seeded from the record's temporal coverage.
pub fn potential_actions_json(actions: &[AccessUrl], temporal_coverage: Option<&str>) -> Option<Value> {
    let (start_sentence, end_sentence) = coverage_sentences(temporal_coverage);

    let mut list = Vec::new();
    for action in actions {
        match &action.product_keys {
            None => list.push(plain_action(action, &entry_description(&action.format))),
            Some(keys) => {
                for key in keys {
                    let key = key.replace('"', "");
                    if action.url.contains("/hapi") {
                        list.push(hapi_action(action, &key, &start_sentence, &end_sentence));
                    } else {
                        list.push(plain_action(
                            action,
                            "Download dataset data as CDF or CSV file at this URL",
                        ));
                    }
                }
            }
        }
    }
    if list.is_empty() {
        None
    } else {
        Some(Value::Array(list))
    }
}

fn entry_description(format: &str) -> String {
    format!("Download dataset data as {format} file at this URL")
}

/// Derive the query-input guidance sentences from the temporal coverage
/// interval. The suggested test end time is one minute past the start, and
/// stands in for the real end when coverage is open ended.
fn coverage_sentences(temporal_coverage: Option<&str>) -> (String, String) {
    let Some(coverage) = temporal_coverage else {
        return (String::new(), String::new());
    };
    let (start, end) = match coverage.split_once('/') {
        Some((start, end)) => (start, end),
        None => (coverage, ""),
    };
    let Some(test_end) = test_end_time(start) else {
        return (String::new(), String::new());
    };
    let mut end_sentence = String::new();
    if !(end.is_empty() || end == "..") {
        end_sentence = format!("Data is available up to {end}. ");
    }
    end_sentence.push_str(&format!("Use {test_end} as a test end value."));
    let start_sentence = format!("Use {start} as default value.");
    (start_sentence, end_sentence)
}

fn test_end_time(start: &str) -> Option<String> {
    let (date, time) = start.split_once('T')?;
    let time = time.replace('Z', "");
    let time = match time.split_once('.') {
        Some((whole, _)) => whole.to_string(),
        None => time,
    };
    let parsed =
        NaiveDateTime::parse_from_str(&format!("{date} {time}"), "%Y-%m-%d %H:%M:%S").ok()?;
    Some((parsed + Duration::minutes(1)).format("%Y-%m-%dT%H:%M:%S").to_string())
}

fn plain_action(action: &AccessUrl, description: &str) -> Value {
    // ftp endpoints are not dereferenceable as linked data, so no @id
    let mut target = serde_json::Map::new();
    if !action.url.contains("ftp") {
        target.insert("@id".to_string(), json!(action.url));
    }
    target.insert("@type".to_string(), json!("EntryPoint"));
    target.insert("contentType".to_string(), json!(action.format));
    target.insert("url".to_string(), json!(action.url));
    target.insert("description".to_string(), json!(description));
    json!({
        "@type": "SearchAction",
        "target": Value::Object(target),
    })
}

fn hapi_action(action: &AccessUrl, key: &str, start_sentence: &str, end_sentence: &str) -> Value {
    let mut target = serde_json::Map::new();
    if !action.url.contains("ftp") {
        target.insert("@id".to_string(), json!(action.url));
    }
    target.insert("@type".to_string(), json!("EntryPoint"));
    target.insert("contentType".to_string(), json!(action.format));
    target.insert(
        "urlTemplate".to_string(),
        json!(format!(
            "{}/data?id={key}&time.min=(start)&time.max=(end)",
            action.url
        )),
    );
    target.insert(
        "description".to_string(),
        json!("Download dataset labeled by id in CSV format based on the requested start and end dates"),
    );
    target.insert("httpMethod".to_string(), json!("GET"));
    json!({
        "@type": "SearchAction",
        "target": Value::Object(target),
        "query-input": [
            {
                "@type": "PropertyValueSpecification",
                "valueName": "start",
                "description": format!("A UTC ISO DateTime. {start_sentence}"),
                "valueRequired": false,
                "valuePattern": ISO_DATETIME.as_str(),
            },
            {
                "@type": "PropertyValueSpecification",
                "valueName": "end",
                "description": format!("A UTC ISO DateTime. {end_sentence}"),
                "valueRequired": false,
                "valuePattern": ISO_DATETIME.as_str(),
            },
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const RECORD: &str = r#"<Spase><NumericalData>
      <AccessInformation>
        <Format>CDF</Format>
        <AccessURL>
          <URL>https://example.gov/data/file.cdf</URL>
        </AccessURL>
        <AccessURL>
          <URL>https://cdaweb.gsfc.nasa.gov/hapi</URL>
          <ProductKey>AC_H2_MFI</ProductKey>
        </AccessURL>
      </AccessInformation>
      <AccessInformation>
        <Format>Text</Format>
        <AccessURL>
          <URL>https://example.gov/browse</URL>
        </AccessURL>
      </AccessInformation>
    </NumericalData></Spase>"#;

    fn doc(xml: &str) -> SpaseDocument {
        SpaseDocument::from_xml(xml).unwrap()
    }

    #[test_case("https://example.gov/data/file.cdf", true)]
    #[test_case("https://example.gov/data/file.csv", true)]
    #[test_case("https://example.gov/data.tar", true)]
    #[test_case("https://example.gov/index.html", false)]
    #[test_case("https://example.gov/browse", false)]
    #[test_case("ftp://spdf.gsfc.nasa.gov/pub", false)]
    fn test_is_downloadable(url: &str, expected: bool) {
        assert_eq!(is_downloadable(url), expected);
    }

    #[test]
    fn test_collect_and_classify() {
        let urls = collect_access_urls(&doc(RECORD)).unwrap();
        assert_eq!(urls.downloads.len(), 1);
        assert_eq!(urls.downloads[0].url, "https://example.gov/data/file.cdf");
        assert_eq!(urls.downloads[0].format, "CDF");
        assert_eq!(urls.actions.len(), 2);
        assert_eq!(
            urls.actions[0].product_keys,
            Some(vec!["AC_H2_MFI".to_string()])
        );
        assert_eq!(urls.actions[1].format, "Text");
        assert_eq!(urls.actions[1].product_keys, None);
    }

    #[test]
    fn test_single_distribution_unwrapped() {
        let urls = collect_access_urls(&doc(RECORD)).unwrap();
        let dist = distribution_json(&urls.downloads).unwrap();
        assert!(dist.is_object());
        assert_eq!(dist["@type"], "DataDownload");
        assert_eq!(dist["encodingFormat"], "CDF");
    }

    #[test]
    fn test_hapi_action_template() {
        let urls = collect_access_urls(&doc(RECORD)).unwrap();
        let actions = potential_actions_json(
            &urls.actions,
            Some("2021-04-01T00:00:00Z/2022-01-01T00:00:00Z"),
        )
        .unwrap();
        let hapi = &actions[0];
        assert_eq!(
            hapi["target"]["urlTemplate"],
            "https://cdaweb.gsfc.nasa.gov/hapi/data?id=AC_H2_MFI&time.min=(start)&time.max=(end)"
        );
        assert_eq!(hapi["target"]["httpMethod"], "GET");
        let start_desc = hapi["query-input"][0]["description"].as_str().unwrap();
        assert!(start_desc.contains("Use 2021-04-01T00:00:00Z as default value."));
        let end_desc = hapi["query-input"][1]["description"].as_str().unwrap();
        assert!(end_desc.contains("Data is available up to 2022-01-01T00:00:00Z."));
        assert!(end_desc.contains("Use 2021-04-01T00:01:00 as a test end value."));
    }

    #[test]
    fn test_open_ended_coverage_uses_test_end() {
        let (_, end_sentence) = coverage_sentences(Some("2021-04-01T00:00:00/.."));
        assert_eq!(end_sentence, "Use 2021-04-01T00:01:00 as a test end value.");
    }

    #[test]
    fn test_ftp_target_has_no_id() {
        let action = AccessUrl {
            url: "ftp://spdf.gsfc.nasa.gov/pub".to_string(),
            format: "Text".to_string(),
            product_keys: None,
        };
        let json = potential_actions_json(&[action], None).unwrap();
        assert!(json[0]["target"].get("@id").is_none());
        assert_eq!(json[0]["target"]["url"], "ftp://spdf.gsfc.nasa.gov/pub");
    }
}
