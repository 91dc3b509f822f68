//! Error types for loading, the host bridge, and the binding namespace.

use hearth_common::ModuleId;
use hearth_engine::{CompileError, ScriptError};
use hearth_tables::IntegrityError;

/// Errors produced while resolving and compiling a built-in module.
///
/// [`LoaderError::is_fatal`] separates the two grades: fatal errors mean the
/// embedded artifacts are inconsistent and the process should not continue;
/// the rest are reported to the caller, who decides.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The embedded tables are inconsistent or the id is unknown.
    #[error(transparent)]
    Integrity(#[from] IntegrityError),

    /// The module source has an early error. The engine's diagnostic is
    /// carried unchanged.
    #[error("failed to compile '{id}': {source}")]
    Compile {
        /// The module that failed to compile.
        id: ModuleId,
        /// The engine's diagnostic.
        source: CompileError,
    },

    /// Cache generation compiled the module but the engine produced no cache.
    #[error("code cache generation produced no data for '{0}'")]
    EmptyCodeCache(ModuleId),

    /// The compiled module threw when invoked.
    #[error("calling '{id}' failed: {source}")]
    Call {
        /// The module that was invoked.
        id: ModuleId,
        /// The engine's error.
        source: ScriptError,
    },
}

impl LoaderError {
    /// Returns `true` for errors that mean the embedded artifacts cannot be
    /// trusted: integrity failures and empty cache generation.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LoaderError::Integrity(_) | LoaderError::EmptyCodeCache(_))
    }
}

/// Errors from installing the host bridge.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// A host bridge was already installed in this loader context.
    #[error("host bridge is already installed")]
    AlreadyInstalled,
}

/// Errors from defining or invoking methods on the binding namespace.
#[derive(Debug, thiserror::Error)]
pub enum BindingError {
    /// The namespace has no method with this name.
    #[error("namespace has no method '{0}'")]
    NoSuchMethod(String),

    /// The namespace is frozen and cannot gain or lose methods.
    #[error("cannot modify frozen namespace (method '{0}')")]
    Frozen(String),

    /// A method was called with arguments of the wrong shape.
    #[error("invalid argument to {method}: {reason}")]
    InvalidArgument {
        /// The method that was called.
        method: &'static str,
        /// What was wrong.
        reason: String,
    },

    /// The underlying loader operation failed.
    #[error(transparent)]
    Loader(#[from] LoaderError),
}
