//! Error types for table lookups and bundle I/O.

use std::path::PathBuf;

use hearth_common::{Digest, ModuleId};

/// The embedded artifacts contradict themselves or the caller asked for a
/// module that was never built in.
///
/// Every variant is fatal. Ids are a closed, build-time set and the digest
/// maps are generated together with the source and cache maps, so any of
/// these means the binary is inconsistent and continuing would risk running
/// code that does not match its source.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// No source is registered for the requested id.
    #[error("no built-in module named '{0}'")]
    UnknownModule(ModuleId),

    /// A source text has no digest recorded next to it.
    #[error("module '{0}' has source text but no source digest")]
    MissingSourceDigest(ModuleId),

    /// A code cache blob has no producing digest recorded next to it.
    #[error("module '{0}' has a code cache but no code cache digest")]
    MissingCacheDigest(ModuleId),

    /// A producing digest is recorded for a module with no code cache blob.
    #[error("module '{0}' has a code cache digest but no code cache")]
    OrphanCacheDigest(ModuleId),

    /// The code cache was produced from different source text than the one
    /// registered now. Only raised when strict digest checking is enabled.
    #[error("code cache for '{id}' was built from digest {cached}, but the source digest is {current}")]
    DigestSkew {
        /// The module whose cache is stale.
        id: ModuleId,
        /// Digest recorded with the cache blob.
        cached: Digest,
        /// Digest recorded with the current source text.
        current: Digest,
    },
}

/// Errors that can occur while reading or writing an artifact bundle.
#[derive(Debug, thiserror::Error)]
pub enum BundleError {
    /// An I/O error occurred while reading or writing the bundle file.
    #[error("bundle I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The bundle header is missing, truncated or has the wrong magic bytes.
    #[error("invalid bundle header: {reason}")]
    InvalidHeader {
        /// Description of the header problem.
        reason: String,
    },

    /// The bundle format version does not match the current version.
    #[error("bundle version mismatch: expected {expected}, got {actual}")]
    VersionMismatch {
        /// The expected format version.
        expected: u32,
        /// The format version found in the bundle.
        actual: u32,
    },

    /// The stored checksum does not match the checksum of the payload.
    #[error("bundle checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// The checksum from the header.
        expected: String,
        /// The checksum computed from the payload.
        actual: String,
    },

    /// A serialization or deserialization error occurred.
    #[error("bundle serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },
}
