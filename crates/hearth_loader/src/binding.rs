//! The internal binding namespace scripts use to reach the loader.
//!
//! [`initialize`] builds the namespace once per execution context and freezes
//! it. Diagnostic methods are always present; the three bridge methods exist
//! only when a host bridge was installed before initialization, so scripts
//! can feature-detect the host by checking for `registerBridge`.

use std::collections::BTreeMap;
use std::rc::Rc;

use hearth_engine::{ScriptEngine, Value};

use crate::bridge::{BridgeFunctions, OutputPayload, RuntimeCallbacks};
use crate::context::{ExecutionContext, LoaderContext};
use crate::error::BindingError;
use crate::pipeline::{compile_as_module, CompileMode, CompileOutput};

/// A method the namespace can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Method {
    /// `getSource()`: every module id mapped to its source text.
    GetSource,
    /// `getCacheUsage()`: the context's usage ledger.
    GetCacheUsage,
    /// `compileFunction(id)`: compile a module for execution.
    CompileFunction,
    /// `compileCodeCache(id)`: compile a module and return a new cache blob.
    CompileCodeCache,
    /// `registerBridge(callMain, require, log, error, tickCallback)`.
    RegisterBridge,
    /// `forwardStdout(data)`.
    ForwardStdout,
    /// `forwardStderr(data)`.
    ForwardStderr,
}

impl Method {
    /// Every method, in definition order.
    pub const ALL: [Method; 7] = [
        Method::GetSource,
        Method::GetCacheUsage,
        Method::CompileFunction,
        Method::CompileCodeCache,
        Method::RegisterBridge,
        Method::ForwardStdout,
        Method::ForwardStderr,
    ];

    /// The script-visible name.
    pub fn name(self) -> &'static str {
        match self {
            Method::GetSource => "getSource",
            Method::GetCacheUsage => "getCacheUsage",
            Method::CompileFunction => "compileFunction",
            Method::CompileCodeCache => "compileCodeCache",
            Method::RegisterBridge => "registerBridge",
            Method::ForwardStdout => "forwardStdout",
            Method::ForwardStderr => "forwardStderr",
        }
    }

    /// Looks a method up by its script-visible name.
    pub fn from_name(name: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|m| m.name() == name)
    }

    /// Returns `true` for methods that only exist when a host is installed.
    pub fn requires_bridge(self) -> bool {
        matches!(
            self,
            Method::RegisterBridge | Method::ForwardStdout | Method::ForwardStderr
        )
    }
}

/// A set of named methods that can be frozen against further changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespace {
    methods: BTreeMap<&'static str, Method>,
    frozen: bool,
}

impl Namespace {
    /// Creates an empty, unfrozen namespace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `method` under its script-visible name.
    pub fn define(&mut self, method: Method) -> Result<(), BindingError> {
        if self.frozen {
            return Err(BindingError::Frozen(method.name().to_string()));
        }
        self.methods.insert(method.name(), method);
        Ok(())
    }

    /// Removes the method called `name`. Removing an absent name succeeds.
    pub fn remove(&mut self, name: &str) -> Result<(), BindingError> {
        if self.frozen {
            return Err(BindingError::Frozen(name.to_string()));
        }
        self.methods.remove(name);
        Ok(())
    }

    /// Freezes the namespace. Later `define` and `remove` calls fail.
    pub fn freeze(&mut self) {
        self.frozen = true;
    }

    /// Returns `true` once the namespace is frozen.
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Returns `true` if a method called `name` is defined.
    pub fn has(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Defined method names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.methods.keys().copied()
    }

    /// Calls the method `name` with `args`.
    ///
    /// # Errors
    ///
    /// [`BindingError::NoSuchMethod`] if `name` is not defined, or names a
    /// bridge method while `loader` has no bridge.
    /// [`BindingError::InvalidArgument`] for arguments of the wrong type.
    /// [`BindingError::Loader`] when compilation fails; check
    /// [`LoaderError::is_fatal`](crate::LoaderError::is_fatal) on the inner
    /// error.
    pub fn invoke<E: ScriptEngine + 'static>(
        &self,
        loader: &LoaderContext,
        cx: &mut ExecutionContext<E>,
        name: &str,
        args: &[Value],
    ) -> Result<Value, BindingError> {
        let method = *self
            .methods
            .get(name)
            .ok_or_else(|| BindingError::NoSuchMethod(name.to_string()))?;

        match method {
            Method::GetSource => Ok(Value::Object(
                loader
                    .sources()
                    .sources()
                    .map(|(id, text)| (id.as_str().to_string(), Value::from(text)))
                    .collect(),
            )),
            Method::GetCacheUsage => Ok(cx.ledger().to_value()),
            Method::CompileFunction => {
                let id = id_argument(method, args)?;
                match compile_as_module(loader, cx, id, CompileMode::Execute)? {
                    CompileOutput::Function(function) => Ok(Value::Function(function)),
                    CompileOutput::CodeCache(blob) => Ok(Value::Bytes(blob)),
                }
            }
            Method::CompileCodeCache => {
                let id = id_argument(method, args)?;
                match compile_as_module(loader, cx, id, CompileMode::CacheGeneration)? {
                    CompileOutput::CodeCache(blob) => Ok(Value::Bytes(blob)),
                    CompileOutput::Function(function) => Ok(Value::Function(function)),
                }
            }
            Method::RegisterBridge => {
                let bridge = loader
                    .bridge()
                    .ok_or_else(|| BindingError::NoSuchMethod(name.to_string()))?;
                let functions = bridge_functions(args)?;
                bridge.register(Rc::new(RuntimeCallbacks::new(cx.engine_rc(), functions)));
                Ok(Value::Undefined)
            }
            Method::ForwardStdout | Method::ForwardStderr => {
                let bridge = loader
                    .bridge()
                    .ok_or_else(|| BindingError::NoSuchMethod(name.to_string()))?;
                let data = args.first().unwrap_or(&Value::Undefined);
                let payload = OutputPayload::from_value(data);
                if method == Method::ForwardStdout {
                    bridge.forward_stdout(&payload);
                } else {
                    bridge.forward_stderr(&payload);
                }
                Ok(Value::Undefined)
            }
        }
    }
}

/// Builds the frozen binding namespace for one execution context.
pub fn initialize(loader: &LoaderContext) -> Namespace {
    let with_bridge = loader.bridge().is_some();
    let mut namespace = Namespace::new();
    for method in Method::ALL {
        if method.requires_bridge() && !with_bridge {
            continue;
        }
        namespace.methods.insert(method.name(), method);
    }
    namespace.freeze();
    namespace
}

fn id_argument(method: Method, args: &[Value]) -> Result<&str, BindingError> {
    let arg = args.first().unwrap_or(&Value::Undefined);
    arg.as_str().ok_or_else(|| BindingError::InvalidArgument {
        method: method.name(),
        reason: format!("expected a string id, got {}", arg.type_name()),
    })
}

fn bridge_functions(args: &[Value]) -> Result<BridgeFunctions, BindingError> {
    const NAMES: [&str; 5] = ["callMain", "require", "log", "error", "tickCallback"];
    let mut handles = Vec::with_capacity(NAMES.len());
    for (index, name) in NAMES.iter().enumerate() {
        let arg = args.get(index).unwrap_or(&Value::Undefined);
        let handle = arg.as_function().ok_or_else(|| BindingError::InvalidArgument {
            method: Method::RegisterBridge.name(),
            reason: format!("{name} must be a function, got {}", arg.type_name()),
        })?;
        handles.push(handle);
    }
    Ok(BridgeFunctions {
        call_main: handles[0],
        require: handles[1],
        log: handles[2],
        error: handles[3],
        tick_callback: handles[4],
    })
}
