//! The four build-time maps, as produced by the build step.

use std::collections::BTreeMap;

use hearth_common::{Digest, ModuleId};
use serde::{Deserialize, Serialize};

use crate::cache_table::CacheTable;
use crate::error::IntegrityError;
use crate::source_table::SourceTable;

/// Everything the build step embeds for the loader.
///
/// The source and source-digest maps are generated together, as are the code
/// cache and code-cache-digest maps. A module may have source but no code
/// cache: some modules are excluded from caching by policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildArtifacts {
    /// Module source text.
    pub sources: BTreeMap<ModuleId, String>,
    /// Digest of each module's source text.
    pub source_digests: BTreeMap<ModuleId, Digest>,
    /// Precompiled code cache blobs.
    pub code_cache: BTreeMap<ModuleId, Vec<u8>>,
    /// Digest of the source text each code cache blob was produced from.
    pub code_cache_digests: BTreeMap<ModuleId, Digest>,
}

impl BuildArtifacts {
    /// Creates an empty set of artifacts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module's source text together with its digest.
    pub fn add_source(&mut self, id: impl Into<ModuleId>, text: impl Into<String>, digest: Digest) {
        let id = id.into();
        self.sources.insert(id.clone(), text.into());
        self.source_digests.insert(id, digest);
    }

    /// Registers a module's source text, digesting it with [`Digest::of_text`].
    pub fn add_source_digested(&mut self, id: impl Into<ModuleId>, text: impl Into<String>) {
        let text = text.into();
        let digest = Digest::of_text(&text);
        self.add_source(id, text, digest);
    }

    /// Registers a code cache blob together with the digest of the source
    /// text it was produced from.
    pub fn add_code_cache(&mut self, id: impl Into<ModuleId>, blob: Vec<u8>, digest: Digest) {
        let id = id.into();
        self.code_cache.insert(id.clone(), blob);
        self.code_cache_digests.insert(id, digest);
    }

    /// Drops every code cache blob and its digest, keeping only sources.
    pub fn clear_code_cache(&mut self) {
        self.code_cache.clear();
        self.code_cache_digests.clear();
    }

    /// Checks that every source has a digest and that cache blobs and cache
    /// digests come in pairs.
    ///
    /// Returns the first inconsistency found, in id order.
    pub fn check_consistency(&self) -> Result<(), IntegrityError> {
        if let Some(id) = self
            .sources
            .keys()
            .find(|id| !self.source_digests.contains_key(*id))
        {
            return Err(IntegrityError::MissingSourceDigest(id.clone()));
        }
        if let Some(id) = self
            .code_cache
            .keys()
            .find(|id| !self.code_cache_digests.contains_key(*id))
        {
            return Err(IntegrityError::MissingCacheDigest(id.clone()));
        }
        if let Some(id) = self
            .code_cache_digests
            .keys()
            .find(|id| !self.code_cache.contains_key(*id))
        {
            return Err(IntegrityError::OrphanCacheDigest(id.clone()));
        }
        Ok(())
    }

    /// Splits the artifacts into the two runtime tables.
    pub fn into_tables(self) -> (SourceTable, CacheTable) {
        (
            SourceTable::new(self.sources, self.source_digests),
            CacheTable::new(self.code_cache, self.code_cache_digests),
        )
    }
}
