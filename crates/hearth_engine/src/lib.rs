//! The scripting-engine boundary the Hearth loader compiles against.
//!
//! The loader does not parse, compile or execute scripts itself. It drives an
//! engine through the [`ScriptEngine`] trait: compile a source text as the body
//! of a function with named free parameters, optionally consuming a code cache
//! blob, serialize a compiled function back into a blob, and invoke a compiled
//! function.
//!
//! [`ScanEngine`] is a small reference implementation used by the `hearth`
//! tooling and by tests. It validates syntax at the token level and produces
//! code caches whose compatibility check, like production engines, looks at
//! the source length, engine flags and parameter list but never the text.

#![warn(missing_docs)]

pub mod error;
pub mod scan;
pub mod source;
pub mod value;

pub use error::{CompileError, ScriptError};
pub use scan::ScanEngine;
pub use source::{CachedData, CompileOptions, ScriptOrigin, ScriptSource};
pub use value::{FunctionHandle, Value};

/// An embedded scripting engine bound to one execution context.
///
/// All methods take `&self`: engines are called re-entrantly (a host callback
/// can run script which calls back into the host), so implementations keep
/// their mutable state behind interior mutability and are not shared across
/// threads.
pub trait ScriptEngine {
    /// Compiles `source` as the body of a function taking `parameters`.
    ///
    /// With [`CompileOptions::ConsumeCodeCache`] the engine may use the
    /// source's cached data instead of compiling from text. If it refuses the
    /// blob it must mark it rejected (see [`CachedData::reject`]) and compile
    /// from text instead. Early errors such as syntax errors are returned as a
    /// [`CompileError`] that already carries the source position.
    fn compile_function(
        &self,
        source: &mut ScriptSource<'_>,
        parameters: &[String],
        options: CompileOptions,
    ) -> Result<FunctionHandle, CompileError>;

    /// Serializes a compiled function into a code cache blob.
    ///
    /// Returns `None` if the engine cannot produce a cache for this function.
    fn create_code_cache(&self, function: FunctionHandle) -> Option<Vec<u8>>;

    /// Invokes a compiled function with the given receiver and arguments.
    fn call(
        &self,
        function: FunctionHandle,
        receiver: &Value,
        args: &[Value],
    ) -> Result<Value, ScriptError>;
}
