//! The table of embedded module source text.

use std::collections::BTreeMap;

use hearth_common::{Digest, ModuleId};

use crate::error::IntegrityError;

/// A borrowed view of one module's source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceRecord<'a> {
    /// The module id.
    pub id: &'a ModuleId,
    /// The source text.
    pub text: &'a str,
    /// Digest of the source text, if one was recorded.
    pub digest: Option<&'a Digest>,
}

/// Read-only mapping from module id to source text and source digest.
#[derive(Debug, Default)]
pub struct SourceTable {
    sources: BTreeMap<ModuleId, String>,
    digests: BTreeMap<ModuleId, Digest>,
}

impl SourceTable {
    /// Creates a table from the source and source-digest maps.
    pub fn new(sources: BTreeMap<ModuleId, String>, digests: BTreeMap<ModuleId, Digest>) -> Self {
        Self { sources, digests }
    }

    /// Looks up a module's source.
    ///
    /// An unknown id is an [`IntegrityError::UnknownModule`]: built-in ids are
    /// a closed set, so asking for one that does not exist is a bug in the
    /// caller.
    pub fn lookup_source(&self, id: &str) -> Result<SourceRecord<'_>, IntegrityError> {
        let (id, text) = self
            .sources
            .get_key_value(id)
            .ok_or_else(|| IntegrityError::UnknownModule(ModuleId::new(id)))?;
        Ok(SourceRecord {
            id,
            text,
            digest: self.digests.get(id.as_str()),
        })
    }

    /// Returns the digest recorded for a module's current source text.
    pub fn source_digest(&self, id: &str) -> Option<&Digest> {
        self.digests.get(id)
    }

    /// Returns `true` if a source is registered for `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    /// Iterates over `(id, text)` pairs in id order.
    pub fn sources(&self) -> impl Iterator<Item = (&ModuleId, &str)> {
        self.sources.iter().map(|(id, text)| (id, text.as_str()))
    }

    /// Iterates over all module ids in order.
    pub fn ids(&self) -> impl Iterator<Item = &ModuleId> {
        self.sources.keys()
    }

    /// Returns the number of modules.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Returns `true` if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}
