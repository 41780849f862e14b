//! Remote lookups against DOI redirects and the DataCite REST API
//!
//! Relation resolution only needs two network operations: following a DOI to
//! see where it lands, and fetching the DataCite record behind a DOI to learn
//! its resource type and descriptive metadata. Both sit behind a trait so
//! conversions can run fully offline in tests.

use std::time::Duration;

use serde::Deserialize;

use crate::error::Error;

const DATACITE_API: &str = "https://api.datacite.org";
const TIMEOUT: Duration = Duration::from_secs(30);

/// A DataCite DOI record, in the `vnd.datacite.datacite+json` representation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteRecord {
    #[serde(default)]
    pub types: DataCiteTypes,
    #[serde(default)]
    pub titles: Vec<DataCiteTitle>,
    #[serde(default)]
    pub descriptions: Vec<DataCiteDescription>,
    #[serde(default, rename = "rightsList")]
    pub rights_list: Vec<DataCiteRights>,
    #[serde(default)]
    pub creators: Vec<DataCiteCreator>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteTypes {
    #[serde(default, rename = "resourceType")]
    pub resource_type: Option<String>,
    #[serde(default, rename = "resourceTypeGeneral")]
    pub resource_type_general: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteTitle {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteDescription {
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteRights {
    #[serde(default, rename = "rightsUri")]
    pub rights_uri: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteCreator {
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "givenName")]
    pub given_name: Option<String>,
    #[serde(default, rename = "familyName")]
    pub family_name: Option<String>,
    #[serde(default)]
    pub affiliation: Option<DataCiteAffiliation>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataCiteAffiliation {
    #[serde(default)]
    pub name: String,
}

/// Network seam for relation resolution.
pub trait RemoteLookup {
    /// Follow a URL one redirect hop and return the Location it points to.
    fn resolve_redirect(&self, url: &str) -> Result<Option<String>, Error>;

    /// Fetch the DataCite record for a bare DOI (no `https://doi.org/`).
    fn datacite_lookup(&self, doi: &str) -> Result<DataCiteRecord, Error>;
}

/// Blocking HTTP client for DOI and DataCite lookups.
pub struct DataCiteClient {
    client: reqwest::blocking::Client,
    api_base: String,
}

impl DataCiteClient {
    pub fn new() -> Result<Self, Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::RemoteLookup(e.to_string()))?;
        Ok(DataCiteClient {
            client,
            api_base: DATACITE_API.to_string(),
        })
    }

    #[cfg(test)]
    fn with_base(api_base: impl Into<String>) -> Result<Self, Error> {
        let mut client = Self::new()?;
        client.api_base = api_base.into();
        Ok(client)
    }

    /// Delete a draft DOI record. Requires repository credentials.
    pub fn delete_draft(&self, doi: &str, username: &str, password: &str) -> Result<(), Error> {
        let url = format!("{}/dois/{doi}", self.api_base);
        let response = self
            .client
            .delete(&url)
            .basic_auth(username, Some(password))
            .send()
            .map_err(|e| Error::RemoteLookup(e.to_string()))?;
        response
            .error_for_status()
            .map_err(|e| Error::RemoteLookup(e.to_string()))?;
        Ok(())
    }
}

impl RemoteLookup for DataCiteClient {
    fn resolve_redirect(&self, url: &str) -> Result<Option<String>, Error> {
        let response = self
            .client
            .head(url)
            .send()
            .map_err(|e| Error::RemoteLookup(e.to_string()))?;
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        Ok(location)
    }

    fn datacite_lookup(&self, doi: &str) -> Result<DataCiteRecord, Error> {
        let url = format!(
            "{}/application/vnd.datacite.datacite+json/{doi}",
            self.api_base
        );
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| Error::RemoteLookup(e.to_string()))?
            .error_for_status()
            .map_err(|e| Error::RemoteLookup(e.to_string()))?;
        response
            .json()
            .map_err(|e| Error::RemoteLookup(e.to_string()))
    }
}

/// Offline stand-in: every redirect is unknown and every DataCite lookup
/// fails. Used when conversions must not touch the network.
#[derive(Default)]
pub struct OfflineRemote;

impl RemoteLookup for OfflineRemote {
    fn resolve_redirect(&self, _url: &str) -> Result<Option<String>, Error> {
        Ok(None)
    }

    fn datacite_lookup(&self, doi: &str) -> Result<DataCiteRecord, Error> {
        Err(Error::RemoteLookup(format!(
            "offline: cannot look up {doi}"
        )))
    }
}
