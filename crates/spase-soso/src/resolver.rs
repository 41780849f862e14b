//! Cross-document resolution of SPASE identifiers
//!
//! SPASE records reference each other through `spase://` identifiers. The
//! filesystem resolver derives candidate paths from an identifier: a local
//! override directory keyed by the trailing segment is checked first, then the
//! scheme prefix is substituted with the root installation directory.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::debug;

use crate::document::SpaseDocument;
use crate::error::Error;

/// Resolves a SPASE identifier to a parsed document.
///
/// Injectable seam: conversion logic only depends on this trait, so tests can
/// supply an in-memory implementation.
pub trait DocumentResolver {
    fn resolve(&self, identifier: &str) -> Result<Rc<SpaseDocument>, Error>;
}

/// Resolver backed by a local SPASE installation.
///
/// Resolutions are memoized for the lifetime of the resolver, so repeated
/// lookups of the same person or instrument within one conversion re-use the
/// parsed document instead of re-reading the file.
pub struct FilesystemResolver {
    root: PathBuf,
    overrides: Option<PathBuf>,
    cache: RefCell<HashMap<String, Rc<SpaseDocument>>>,
}

impl FilesystemResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemResolver {
            root: root.into(),
            overrides: None,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Directory of locally adjusted records, checked before the root tree.
    /// Files there are named `spase-{trailing segment}.xml`.
    pub fn with_overrides(mut self, dir: impl Into<PathBuf>) -> Self {
        self.overrides = Some(dir.into());
        self
    }

    fn candidate_path(&self, identifier: &str) -> PathBuf {
        let id = identifier.replace('\'', "");
        if let Some(dir) = &self.overrides {
            let trailing = id.rsplit('/').next().unwrap_or(&id);
            let local = dir.join(format!("spase-{trailing}.xml"));
            if local.is_file() {
                return local;
            }
        }
        let relative = id.trim_start_matches("spase://");
        self.root.join(format!("{relative}.xml"))
    }
}

impl DocumentResolver for FilesystemResolver {
    fn resolve(&self, identifier: &str) -> Result<Rc<SpaseDocument>, Error> {
        if let Some(doc) = self.cache.borrow().get(identifier) {
            return Ok(Rc::clone(doc));
        }
        let path = self.candidate_path(identifier);
        if !path.is_file() {
            return Err(Error::UnresolvedPerson(identifier.to_string()));
        }
        debug!(identifier, path = %path.display(), "resolving SPASE record");
        let doc = Rc::new(SpaseDocument::from_file(&path)?);
        self.cache
            .borrow_mut()
            .insert(identifier.to_string(), Rc::clone(&doc));
        Ok(doc)
    }
}

/// In-memory resolver for tests and embedded use.
#[derive(Default)]
pub struct StaticResolver {
    documents: HashMap<String, Rc<SpaseDocument>>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, identifier: impl Into<String>, xml: &str) -> Result<(), Error> {
        self.documents
            .insert(identifier.into(), Rc::new(SpaseDocument::from_xml(xml)?));
        Ok(())
    }
}

impl DocumentResolver for StaticResolver {
    fn resolve(&self, identifier: &str) -> Result<Rc<SpaseDocument>, Error> {
        self.documents
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::UnresolvedPerson(identifier.to_string()))
    }
}
