//! Process-wide, read-only tables of embedded module source and bytecode.
//!
//! The build step produces four maps: module source text, a digest of each
//! source text, precompiled code cache blobs, and the digest of the source text
//! each blob was produced from. [`BuildArtifacts`] carries them, the
//! [`bundle`] module persists them, and [`SourceTable`] / [`CacheTable`] serve
//! lookups once the process has started. Nothing mutates the tables after
//! construction.

#![warn(missing_docs)]

pub mod artifacts;
pub mod bundle;
pub mod cache_table;
pub mod error;
pub mod source_table;

pub use artifacts::BuildArtifacts;
pub use bundle::{read_bundle, write_bundle};
pub use cache_table::{CacheRecord, CacheTable};
pub use error::{BundleError, IntegrityError};
pub use source_table::{SourceRecord, SourceTable};
