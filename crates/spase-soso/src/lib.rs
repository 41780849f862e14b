//! SPASE to schema.org JSON-LD conversion
//!
//! Converts SPASE (Space Physics Archive Search and Extract) XML metadata
//! records into schema.org Dataset descriptions with PROV provenance, suitable
//! for DataCite DOI registration. The [`Spase`] strategy drives a conversion;
//! cross-record `spase://` links resolve through a [`DocumentResolver`] and
//! DOI classification goes through a [`RemoteLookup`], both injectable.
//!
//! ```no_run
//! use std::rc::Rc;
//! use spase_soso::{ConvertConfig, DataCiteClient, FilesystemResolver, Spase, SpaseDocument};
//!
//! # fn main() -> Result<(), spase_soso::Error> {
//! let config = ConvertConfig::new("/data/spase");
//! let resolver = FilesystemResolver::new(&config.spase_root);
//! let remote = DataCiteClient::new()?;
//! let doc = Rc::new(SpaseDocument::from_file("record.xml")?);
//! let record = Spase::new(doc, &resolver, &remote, &config).to_json_ld()?;
//! println!("{}", serde_json::to_string_pretty(&record).unwrap());
//! # Ok(())
//! # }
//! ```

pub mod access;
pub mod authors;
pub mod config;
pub mod document;
pub mod error;
pub mod fields;
pub mod jsonld;
pub mod maintenance;
pub mod person;
pub mod provenance;
pub mod relations;
pub mod remote;
pub mod resolver;
pub mod roles;
pub mod strategy;
pub mod xml;

pub use config::ConvertConfig;
pub use document::{ResourceKind, SpaseDocument};
pub use error::Error;
pub use remote::{DataCiteClient, OfflineRemote, RemoteLookup};
pub use resolver::{DocumentResolver, FilesystemResolver, StaticResolver};
pub use strategy::Spase;
