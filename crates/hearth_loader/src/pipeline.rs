//! Resolves a module id to a compiled function or a fresh code cache.
//!
//! Every built-in module goes through [`lookup_and_compile`]: look the source
//! up, attach the embedded cache if the digest gate allows it, compile, record
//! the outcome in the ledger, and in cache-generation mode serialize the
//! result.

use hearth_common::ModuleId;
use hearth_engine::{
    CompileOptions, FunctionHandle, ScriptEngine, ScriptOrigin, ScriptSource, Value,
};
use tracing::{debug, warn};

use crate::context::{ExecutionContext, LoaderContext};
use crate::error::LoaderError;
use crate::ledger::UsageLedger;
use crate::validator;

/// What a compile is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileMode {
    /// Produce a runnable function, consuming an embedded cache if valid.
    Execute,
    /// Compile eagerly from text and serialize the result as a new cache.
    CacheGeneration,
}

/// The result of [`lookup_and_compile`], shaped by the [`CompileMode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutput {
    /// A compiled function, from [`CompileMode::Execute`].
    Function(FunctionHandle),
    /// A serialized code cache, from [`CompileMode::CacheGeneration`].
    CodeCache(Vec<u8>),
}

impl CompileOutput {
    /// Returns the function handle, if this is an execute-mode result.
    pub fn into_function(self) -> Option<FunctionHandle> {
        match self {
            CompileOutput::Function(function) => Some(function),
            CompileOutput::CodeCache(_) => None,
        }
    }

    /// Returns the cache blob, if this is a cache-generation result.
    pub fn into_code_cache(self) -> Option<Vec<u8>> {
        match self {
            CompileOutput::CodeCache(blob) => Some(blob),
            CompileOutput::Function(_) => None,
        }
    }
}

/// Compiles the built-in module `id` as a function over `parameters`.
///
/// In [`CompileMode::Execute`] the embedded cache is attached only if
/// [`validator::is_cache_usable`] allows it. The ledger, when given, records a
/// hit only if the engine consumed the blob without rejecting it; every other
/// outcome is a miss. In [`CompileMode::CacheGeneration`] the module is
/// compiled eagerly from text and serialized; the ledger still records a miss.
///
/// # Errors
///
/// - [`LoaderError::Integrity`] for unknown ids and broken digest pairing.
/// - [`LoaderError::Compile`] for early errors in the source.
/// - [`LoaderError::EmptyCodeCache`] if the engine serialized nothing.
pub fn lookup_and_compile<E: ScriptEngine + ?Sized>(
    loader: &LoaderContext,
    engine: &E,
    id: &str,
    parameters: &[String],
    mode: CompileMode,
    ledger: Option<&mut UsageLedger>,
) -> Result<CompileOutput, LoaderError> {
    let (module, function) = compile(loader, engine, id, parameters, mode, ledger)?;
    match mode {
        CompileMode::Execute => Ok(CompileOutput::Function(function)),
        CompileMode::CacheGeneration => engine
            .create_code_cache(function)
            .filter(|blob| !blob.is_empty())
            .map(CompileOutput::CodeCache)
            .ok_or_else(|| LoaderError::EmptyCodeCache(module.clone())),
    }
}

/// Looks up, gates, compiles and records. Returns the registered id so
/// callers can build errors without a second lookup.
fn compile<'l, E: ScriptEngine + ?Sized>(
    loader: &'l LoaderContext,
    engine: &E,
    id: &str,
    parameters: &[String],
    mode: CompileMode,
    ledger: Option<&mut UsageLedger>,
) -> Result<(&'l ModuleId, FunctionHandle), LoaderError> {
    let record = loader.sources().lookup_source(id)?;
    let mut source = ScriptSource::new(record.text, ScriptOrigin::new(record.id.resource_name()));

    let mut attached = false;
    if validator::is_cache_usable(loader, id, mode)? {
        if let Some(cached) = loader.cache().lookup_cache(id) {
            source = source.with_cached_data(cached.blob);
            attached = true;
        }
    }

    let options = match mode {
        CompileMode::CacheGeneration => CompileOptions::EagerCompile,
        CompileMode::Execute if attached => CompileOptions::ConsumeCodeCache,
        CompileMode::Execute => CompileOptions::NoCompileOptions,
    };

    let function = engine
        .compile_function(&mut source, parameters, options)
        .map_err(|err| LoaderError::Compile {
            id: record.id.clone(),
            source: err,
        })?;

    let consumed = source.cached_data().is_some_and(|cached| !cached.rejected());
    if attached && !consumed {
        warn!(module = %record.id, "engine rejected code cache, compiled from source");
    }
    if let Some(ledger) = ledger {
        if consumed {
            ledger.record_with_cache(record.id);
        } else {
            ledger.record_without_cache(record.id);
        }
    }
    debug!(module = %record.id, ?mode, ?options, consumed, "compiled built-in module");
    Ok((record.id, function))
}

/// Compiles `id` with the configured module parameters and records the
/// outcome in the context's ledger.
pub fn compile_as_module<E: ScriptEngine>(
    loader: &LoaderContext,
    cx: &mut ExecutionContext<E>,
    id: &str,
    mode: CompileMode,
) -> Result<CompileOutput, LoaderError> {
    let (engine, ledger) = cx.parts_mut();
    lookup_and_compile(
        loader,
        engine,
        id,
        &loader.options().parameters,
        mode,
        Some(ledger),
    )
}

/// Compiles `id` over `parameters` and invokes it once with a null receiver.
///
/// Used for bootstrap scripts, whose parameter lists differ from the module
/// wrapper's. The ledger is not touched.
pub fn compile_and_call<E: ScriptEngine>(
    loader: &LoaderContext,
    cx: &ExecutionContext<E>,
    id: &str,
    parameters: &[String],
    arguments: &[Value],
) -> Result<Value, LoaderError> {
    let (module, function) = compile(
        loader,
        cx.engine(),
        id,
        parameters,
        CompileMode::Execute,
        None,
    )?;
    cx.engine()
        .call(function, &Value::Null, arguments)
        .map_err(|err| LoaderError::Call {
            id: module.clone(),
            source: err,
        })
}
