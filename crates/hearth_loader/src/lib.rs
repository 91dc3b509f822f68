//! Resolves built-in module ids to compiled code, reusing embedded code caches
//! only when they provably match the embedded source.
//!
//! The pieces, leaves first:
//!
//! - [`LoaderContext`] owns the read-only source and cache tables, the loader
//!   options, and the one-shot host bridge slot. It is built once at startup
//!   and passed by reference everywhere.
//! - [`validator::is_cache_usable`] decides whether a module's cache blob was
//!   produced from the source text registered now, by comparing digests.
//! - [`pipeline::lookup_and_compile`] drives the engine: consume a validated
//!   cache, or compile from text, or compile eagerly to produce a new cache.
//! - [`UsageLedger`] records per execution context which modules were compiled
//!   with and without a cache.
//! - [`bridge`] lets an external host install five callbacks and receive the
//!   runtime's stdout/stderr bytes; [`ffi`] adapts it to a C ABI.
//! - [`binding`] exposes all of the above to scripts as a frozen namespace.

#![warn(missing_docs)]

pub mod binding;
pub mod bridge;
pub mod context;
pub mod error;
pub mod ffi;
pub mod ledger;
pub mod pipeline;
pub mod validator;

pub use binding::{initialize, Method, Namespace};
pub use bridge::{
    BridgeFunctions, ExternalHost, HostBridge, HostCallbacks, OutputPayload, RuntimeCallbacks,
};
pub use context::{ExecutionContext, LoaderContext, LoaderOptions};
pub use error::{BindingError, BridgeError, LoaderError};
pub use ledger::UsageLedger;
pub use pipeline::{
    compile_and_call, compile_as_module, lookup_and_compile, CompileMode, CompileOutput,
};
