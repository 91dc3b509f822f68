//! Shared foundational types used across the Hearth module loader.
//!
//! This crate provides the [`ModuleId`] key used by every table and ledger,
//! the opaque [`Digest`] that ties cached bytecode to the source text it was
//! produced from, and the XXH3-based [`ContentHash`] used by build tooling and
//! artifact checksums.

#![warn(missing_docs)]

pub mod digest;
pub mod hash;
pub mod module_id;

pub use digest::Digest;
pub use hash::ContentHash;
pub use module_id::ModuleId;
