//! The table of precompiled code cache blobs.

use std::collections::BTreeMap;

use hearth_common::{Digest, ModuleId};

/// A borrowed view of one module's code cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheRecord<'a> {
    /// The module id.
    pub id: &'a ModuleId,
    /// The engine-specific bytecode blob.
    pub blob: &'a [u8],
    /// Digest of the source text the blob was produced from, if recorded.
    pub producing_digest: Option<&'a Digest>,
}

/// Read-only mapping from module id to code cache blob and producing digest.
#[derive(Debug, Default)]
pub struct CacheTable {
    blobs: BTreeMap<ModuleId, Vec<u8>>,
    digests: BTreeMap<ModuleId, Digest>,
}

impl CacheTable {
    /// Creates a table from the code cache and code-cache-digest maps.
    pub fn new(blobs: BTreeMap<ModuleId, Vec<u8>>, digests: BTreeMap<ModuleId, Digest>) -> Self {
        Self { blobs, digests }
    }

    /// Looks up a module's code cache.
    ///
    /// Returns `None` when the module was built without a cache, which is
    /// normal: some modules are excluded from caching.
    pub fn lookup_cache(&self, id: &str) -> Option<CacheRecord<'_>> {
        let (id, blob) = self.blobs.get_key_value(id)?;
        Some(CacheRecord {
            id,
            blob,
            producing_digest: self.digests.get(id.as_str()),
        })
    }

    /// Returns the producing digest recorded for a module.
    pub fn producing_digest(&self, id: &str) -> Option<&Digest> {
        self.digests.get(id)
    }

    /// Iterates over ids that have a producing digest but no blob.
    pub fn orphan_digests(&self) -> impl Iterator<Item = &ModuleId> {
        self.digests.keys().filter(|id| !self.blobs.contains_key(*id))
    }

    /// Returns the number of cached modules.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Returns `true` if the build carries no code cache at all.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}
