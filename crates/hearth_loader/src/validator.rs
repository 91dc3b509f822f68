//! The digest gate in front of code cache consumption.
//!
//! Engines accept a cache blob after only a cheap compatibility check (source
//! length, engine flags). A blob built from different text of the same length
//! would pass that check and run the wrong code, so the loader refuses to hand
//! a blob to the engine unless the digest it was produced from equals the
//! digest of the source text registered now.

use hearth_tables::IntegrityError;
use tracing::{trace, warn};

use crate::context::LoaderContext;
use crate::pipeline::CompileMode;

/// Decides whether the code cache for `id` may be handed to the engine.
///
/// Returns `Ok(false)` when caching is off, when producing a cache, when the
/// module has no blob, or when the digests differ under the default policy.
/// A blob without a producing digest, or a source without a digest, is an
/// integrity error. With `strict_digests` set a mismatch is an error too.
pub fn is_cache_usable(
    loader: &LoaderContext,
    id: &str,
    mode: CompileMode,
) -> Result<bool, IntegrityError> {
    if mode == CompileMode::CacheGeneration || !loader.has_code_cache() {
        return Ok(false);
    }
    let Some(record) = loader.cache().lookup_cache(id) else {
        trace!(module = id, "no code cache built for module");
        return Ok(false);
    };
    let cached = record
        .producing_digest
        .ok_or_else(|| IntegrityError::MissingCacheDigest(record.id.clone()))?;
    let current = loader
        .sources()
        .source_digest(id)
        .ok_or_else(|| IntegrityError::MissingSourceDigest(record.id.clone()))?;

    if cached == current {
        return Ok(true);
    }
    if loader.options().strict_digests {
        return Err(IntegrityError::DigestSkew {
            id: record.id.clone(),
            cached: cached.clone(),
            current: current.clone(),
        });
    }
    warn!(
        module = %record.id,
        %cached,
        %current,
        "code cache was built from different source, compiling from source"
    );
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::LoaderOptions;
    use hearth_common::{Digest, ModuleId};
    use hearth_tables::BuildArtifacts;

    fn loader_with(source_digest: &str, cache_digest: &str, options: LoaderOptions) -> LoaderContext {
        let mut artifacts = BuildArtifacts::new();
        artifacts.add_source("a", "const a = 1;", Digest::new(source_digest));
        artifacts.add_code_cache("a", vec![1, 2, 3], Digest::new(cache_digest));
        artifacts.add_source("b", "const b = 1;", Digest::new("DB"));
        LoaderContext::new(artifacts, options)
    }

    #[test]
    fn matching_digests_are_usable() {
        let loader = loader_with("D1", "D1", LoaderOptions::default());
        assert_eq!(is_cache_usable(&loader, "a", CompileMode::Execute), Ok(true));
    }

    #[test]
    fn mismatch_downgrades_by_default() {
        let loader = loader_with("D2", "D1", LoaderOptions::default());
        assert_eq!(is_cache_usable(&loader, "a", CompileMode::Execute), Ok(false));
    }

    #[test]
    fn mismatch_is_fatal_when_strict() {
        let options = LoaderOptions {
            strict_digests: true,
            ..LoaderOptions::default()
        };
        let loader = loader_with("D2", "D1", options);
        assert_eq!(
            is_cache_usable(&loader, "a", CompileMode::Execute),
            Err(IntegrityError::DigestSkew {
                id: ModuleId::new("a"),
                cached: Digest::new("D1"),
                current: Digest::new("D2"),
            })
        );
    }

    #[test]
    fn never_usable_for_cache_generation() {
        let loader = loader_with("D1", "D1", LoaderOptions::default());
        assert_eq!(
            is_cache_usable(&loader, "a", CompileMode::CacheGeneration),
            Ok(false)
        );
    }

    #[test]
    fn never_usable_when_disabled() {
        let options = LoaderOptions {
            cache_enabled: false,
            ..LoaderOptions::default()
        };
        let loader = loader_with("D1", "D1", options);
        assert_eq!(is_cache_usable(&loader, "a", CompileMode::Execute), Ok(false));
    }

    #[test]
    fn module_without_blob_is_not_usable() {
        let loader = loader_with("D1", "D1", LoaderOptions::default());
        assert_eq!(is_cache_usable(&loader, "b", CompileMode::Execute), Ok(false));
    }

    #[test]
    fn blob_without_digest_is_fatal() {
        let mut artifacts = BuildArtifacts::new();
        artifacts.add_source("a", "const a = 1;", Digest::new("D1"));
        artifacts.code_cache.insert(ModuleId::new("a"), vec![1]);
        let loader = LoaderContext::new(artifacts, LoaderOptions::default());
        assert_eq!(
            is_cache_usable(&loader, "a", CompileMode::Execute),
            Err(IntegrityError::MissingCacheDigest(ModuleId::new("a")))
        );
    }

    #[test]
    fn source_without_digest_is_fatal() {
        let mut artifacts = BuildArtifacts::new();
        artifacts
            .sources
            .insert(ModuleId::new("a"), "const a = 1;".to_string());
        artifacts.add_code_cache("a", vec![1], Digest::new("D1"));
        let loader = LoaderContext::new(artifacts, LoaderOptions::default());
        assert_eq!(
            is_cache_usable(&loader, "a", CompileMode::Execute),
            Err(IntegrityError::MissingSourceDigest(ModuleId::new("a")))
        );
    }
}
