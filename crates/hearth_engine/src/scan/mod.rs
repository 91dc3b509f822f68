//! A reference [`ScriptEngine`] that checks syntax at the token level.
//!
//! `ScanEngine` compiles a function by lexing its body and checking bracket
//! balance and parameter names. Its code caches record the engine flags, the
//! source length and the parameter list, and consuming one checks exactly
//! those. Like production engines it never looks at the text itself, so a
//! blob built from different text of equal length is accepted, which is why
//! the loader validates digests before handing a blob over.
//!
//! Calling a compiled function does not evaluate it; it returns `undefined`.

mod cache;
mod lexer;

use std::cell::RefCell;

use hearth_common::ContentHash;
use tracing::{debug, trace};

use crate::error::{CompileError, ScriptError};
use crate::source::{CompileOptions, ScriptOrigin, ScriptSource};
use crate::value::{FunctionHandle, Value};
use crate::ScriptEngine;

use cache::CachedUnit;

/// A function compiled by the scan engine.
#[derive(Debug, Clone)]
struct CompiledUnit {
    parameters: Vec<String>,
    source_length: u32,
    token_count: u32,
    from_cache: bool,
}

/// Reference script engine for one execution context.
#[derive(Debug)]
pub struct ScanEngine {
    flags: Vec<String>,
    flag_hash: u64,
    units: RefCell<Vec<CompiledUnit>>,
}

impl ScanEngine {
    /// Creates an engine with no engine flags.
    pub fn new() -> Self {
        Self::with_flags(Vec::<String>::new())
    }

    /// Creates an engine running with the given low-level flags.
    ///
    /// Code caches only load into an engine whose flags match the ones the
    /// cache was produced under.
    pub fn with_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let flags: Vec<String> = flags.into_iter().map(Into::into).collect();
        let flag_hash = ContentHash::from_bytes(flags.join("\0").as_bytes()).as_u64();
        Self {
            flags,
            flag_hash,
            units: RefCell::new(Vec::new()),
        }
    }

    /// Returns the flags this engine runs with.
    pub fn flags(&self) -> &[String] {
        &self.flags
    }

    /// Returns how many functions have been compiled in this context.
    pub fn compiled_count(&self) -> usize {
        self.units.borrow().len()
    }

    /// Returns whether a function was materialized from a code cache, or
    /// `None` for an unknown handle.
    pub fn loaded_from_cache(&self, function: FunctionHandle) -> Option<bool> {
        self.units
            .borrow()
            .get(function.as_raw() as usize)
            .map(|u| u.from_cache)
    }

    /// Returns the parameter names a function was compiled with.
    pub fn parameters(&self, function: FunctionHandle) -> Option<Vec<String>> {
        self.units
            .borrow()
            .get(function.as_raw() as usize)
            .map(|u| u.parameters.clone())
    }

    fn push_unit(&self, unit: CompiledUnit) -> FunctionHandle {
        let mut units = self.units.borrow_mut();
        let handle = FunctionHandle::from_raw(units.len() as u32);
        units.push(unit);
        handle
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine for ScanEngine {
    fn compile_function(
        &self,
        source: &mut ScriptSource<'_>,
        parameters: &[String],
        options: CompileOptions,
    ) -> Result<FunctionHandle, CompileError> {
        let text = source.text();
        let Some(source_length) = cacheable_length(text.len()) else {
            return Err(compile_error(
                source.origin(),
                text,
                0,
                format!("source text of {} bytes is too large", text.len()),
            ));
        };

        if let Some(bad) = parameters.iter().find(|p| !lexer::is_identifier(p)) {
            return Err(compile_error(
                source.origin(),
                text,
                0,
                format!("invalid parameter name '{bad}'"),
            ));
        }

        if options == CompileOptions::ConsumeCodeCache {
            if let Some(cached) = source.cached_data_mut() {
                match CachedUnit::decode_checked(
                    cached.data(),
                    self.flag_hash,
                    source_length,
                    parameters,
                ) {
                    Ok(unit) => {
                        trace!(tokens = unit.token_count, "materialized function from code cache");
                        return Ok(self.push_unit(CompiledUnit {
                            parameters: parameters.to_vec(),
                            source_length,
                            token_count: unit.token_count,
                            from_cache: true,
                        }));
                    }
                    Err(reason) => {
                        debug!(?reason, "code cache rejected");
                        cached.reject();
                    }
                }
            }
        }

        let token_count = lexer::scan(text)
            .map_err(|e| compile_error(source.origin(), text, e.offset, e.message))?;

        Ok(self.push_unit(CompiledUnit {
            parameters: parameters.to_vec(),
            source_length,
            token_count,
            from_cache: false,
        }))
    }

    fn create_code_cache(&self, function: FunctionHandle) -> Option<Vec<u8>> {
        let units = self.units.borrow();
        let unit = units.get(function.as_raw() as usize)?;
        CachedUnit::new(
            self.flag_hash,
            unit.source_length,
            unit.parameters.clone(),
            unit.token_count,
        )
        .encode()
    }

    fn call(
        &self,
        function: FunctionHandle,
        _receiver: &Value,
        args: &[Value],
    ) -> Result<Value, ScriptError> {
        if function.as_raw() as usize >= self.units.borrow().len() {
            return Err(ScriptError::UnknownFunction(function));
        }
        trace!(function = function.as_raw(), argc = args.len(), "call");
        Ok(Value::Undefined)
    }
}

/// Source length as recorded in a code cache, or `None` past `u32::MAX` bytes.
fn cacheable_length(len: usize) -> Option<u32> {
    u32::try_from(len).ok()
}

/// Builds a [`CompileError`] positioned at `offset` within `text`.
fn compile_error(
    origin: &ScriptOrigin,
    text: &str,
    offset: usize,
    message: impl Into<String>,
) -> CompileError {
    let before = &text.as_bytes()[..offset.min(text.len())];
    let line_idx = before.iter().filter(|&&b| b == b'\n').count() as u32;
    let line_start = before
        .iter()
        .rposition(|&b| b == b'\n')
        .map_or(0, |i| i + 1);
    let mut column = (before.len() - line_start) as u32 + 1;
    if line_idx == 0 {
        column += origin.column_offset;
    }
    CompileError {
        message: message.into(),
        resource: origin.resource_name.clone(),
        line: line_idx + 1 + origin.line_offset,
        column,
    }
}
