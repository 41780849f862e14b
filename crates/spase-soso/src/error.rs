//! Error taxonomy for SPASE conversion

use thiserror::Error;

/// Errors raised while loading, navigating, or cross-resolving SPASE records.
///
/// `UnresolvedPerson` is fatal where a person record is looked up directly
/// (creator/contributor extraction) but is downgraded to skip-and-continue
/// when it surfaces while chasing an incidental relation, instrument, or
/// observatory reference. That asymmetry is load-bearing: partial output is
/// always preferred over aborting a conversion.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{0} must be an XML file")]
    InvalidFormat(String),

    #[error("XML parse error: {0}")]
    Parse(String),

    #[error("no SPASE resource element found in document")]
    NoSubjectElement,

    #[error("could not access associated SPASE record: {0}")]
    UnresolvedPerson(String),

    #[error("remote lookup failed: {0}")]
    RemoteLookup(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
