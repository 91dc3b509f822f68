//! Errors reported by script engines.

use crate::value::FunctionHandle;

/// An early error (syntax error, invalid parameter list) reported by the engine
/// while compiling a script.
///
/// The position is authored by the engine and already accounts for the script
/// origin's line and column offsets. Callers pass it on unchanged.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{resource}:{line}:{column}: SyntaxError: {message}")]
pub struct CompileError {
    /// Description of the early error.
    pub message: String,
    /// Resource name from the script origin (e.g. `"internal/util.js"`).
    pub resource: String,
    /// 1-indexed line of the error.
    pub line: u32,
    /// 1-indexed column of the error.
    pub column: u32,
}

/// An error raised while invoking a compiled function.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScriptError {
    /// The handle does not name a function compiled in this context.
    #[error("no function with handle {0:?} in this context")]
    UnknownFunction(FunctionHandle),

    /// The script threw; the payload is the thrown value's display string.
    #[error("uncaught exception: {0}")]
    Thrown(String),
}
