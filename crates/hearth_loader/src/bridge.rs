//! The two-way bridge between the runtime and an embedding host.
//!
//! The host implements [`ExternalHost`] and installs it once through
//! [`LoaderContext::install_bridge`](crate::LoaderContext::install_bridge).
//! Script code then hands five of its functions to `registerBridge`; the
//! loader wraps them in a [`RuntimeCallbacks`] and passes that to
//! [`ExternalHost::main_call`], after which the host can drive the runtime
//! through the [`HostCallbacks`] trait. Output written by scripts reaches the
//! host through [`ExternalHost::stdout_call`] and
//! [`ExternalHost::stderr_call`] as raw bytes.

use std::borrow::Cow;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use hearth_engine::{FunctionHandle, ScriptEngine, ScriptError, Value};
use tracing::trace;

/// The embedding host, as seen from the runtime.
///
/// Installed once per process and shared across threads. Output callbacks
/// may be invoked from any execution context.
pub trait ExternalHost: Send + Sync {
    /// Receives the callback record built by `registerBridge`.
    ///
    /// The record is bound to one execution context and must only be used on
    /// the thread that owns it.
    fn main_call(&self, callbacks: Rc<dyn HostCallbacks>);

    /// Receives bytes the runtime wrote to stdout.
    fn stdout_call(&self, data: &[u8]);

    /// Receives bytes the runtime wrote to stderr.
    fn stderr_call(&self, data: &[u8]);
}

/// The operations a host can invoke on the runtime after registration.
pub trait HostCallbacks {
    /// Runs the runtime's main entry point.
    fn call_main(&self) -> Result<(), ScriptError>;

    /// Loads the module at `path`.
    fn require(&self, path: &str) -> Result<(), ScriptError>;

    /// Writes `message` to the runtime's log.
    fn log(&self, message: &str) -> Result<(), ScriptError>;

    /// Writes `message` to the runtime's error log.
    fn error(&self, message: &str) -> Result<(), ScriptError>;

    /// Drains the runtime's pending tick queue.
    fn tick_callback(&self) -> Result<(), ScriptError>;
}

/// The five script functions passed to `registerBridge`, in argument order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeFunctions {
    /// Runs main.
    pub call_main: FunctionHandle,
    /// Loads a module by path.
    pub require: FunctionHandle,
    /// Logs a message.
    pub log: FunctionHandle,
    /// Logs an error message.
    pub error: FunctionHandle,
    /// Drains the tick queue.
    pub tick_callback: FunctionHandle,
}

/// [`HostCallbacks`] backed by script functions of one execution context.
///
/// Each callback invokes its function with the global receiver and zero or
/// one string argument, and discards the return value. Holds a strong
/// reference to the engine so the handles stay valid for as long as the host
/// keeps the record.
pub struct RuntimeCallbacks<E> {
    engine: Rc<E>,
    functions: BridgeFunctions,
}

impl<E: ScriptEngine> RuntimeCallbacks<E> {
    /// Binds `functions` to `engine`.
    pub fn new(engine: Rc<E>, functions: BridgeFunctions) -> Self {
        Self { engine, functions }
    }

    /// The bound functions.
    pub fn functions(&self) -> BridgeFunctions {
        self.functions
    }

    fn invoke(&self, function: FunctionHandle, argument: Option<&str>) -> Result<(), ScriptError> {
        let args: Vec<Value> = argument.map(Value::from).into_iter().collect();
        self.engine.call(function, &Value::Undefined, &args)?;
        Ok(())
    }
}

impl<E: ScriptEngine> HostCallbacks for RuntimeCallbacks<E> {
    fn call_main(&self) -> Result<(), ScriptError> {
        self.invoke(self.functions.call_main, None)
    }

    fn require(&self, path: &str) -> Result<(), ScriptError> {
        self.invoke(self.functions.require, Some(path))
    }

    fn log(&self, message: &str) -> Result<(), ScriptError> {
        self.invoke(self.functions.log, Some(message))
    }

    fn error(&self, message: &str) -> Result<(), ScriptError> {
        self.invoke(self.functions.error, Some(message))
    }

    fn tick_callback(&self) -> Result<(), ScriptError> {
        self.invoke(self.functions.tick_callback, None)
    }
}

/// Data a script passed to `forwardStdout` or `forwardStderr`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPayload<'a> {
    /// A string; forwarded as its UTF-8 bytes.
    Text(Cow<'a, str>),
    /// The contents of a byte buffer view; forwarded verbatim.
    Bytes(Cow<'a, [u8]>),
}

impl<'a> OutputPayload<'a> {
    /// Maps a script value onto a payload.
    ///
    /// Strings and byte buffers are borrowed. Any other value is converted to
    /// its display string, the way script string coercion would.
    pub fn from_value(value: &'a Value) -> Self {
        match value {
            Value::String(text) => OutputPayload::Text(Cow::Borrowed(text)),
            Value::Bytes(bytes) => OutputPayload::Bytes(Cow::Borrowed(bytes)),
            other => OutputPayload::Text(Cow::Owned(other.to_string())),
        }
    }

    /// The bytes to forward.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            OutputPayload::Text(text) => text.as_bytes(),
            OutputPayload::Bytes(bytes) => bytes,
        }
    }

    /// Number of bytes to forward.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` if there is nothing to forward.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// The installed host, plus the runtime-side entry points that reach it.
pub struct HostBridge {
    host: Arc<dyn ExternalHost>,
}

impl HostBridge {
    pub(crate) fn new(host: Arc<dyn ExternalHost>) -> Self {
        Self { host }
    }

    /// Hands a callback record to the host's main entry point.
    pub fn register(&self, callbacks: Rc<dyn HostCallbacks>) {
        trace!("handing callbacks to host");
        self.host.main_call(callbacks);
    }

    /// Forwards a payload to the host's stdout callback.
    pub fn forward_stdout(&self, payload: &OutputPayload<'_>) {
        let data = payload.as_bytes();
        trace!(len = data.len(), "forwarding stdout");
        self.host.stdout_call(data);
    }

    /// Forwards a payload to the host's stderr callback.
    pub fn forward_stderr(&self, payload: &OutputPayload<'_>) {
        let data = payload.as_bytes();
        trace!(len = data.len(), "forwarding stderr");
        self.host.stderr_call(data);
    }
}

impl fmt::Debug for HostBridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostBridge").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_engine::ScanEngine;
    use hearth_engine::{CompileOptions, ScriptOrigin, ScriptSource};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture {
        stdout: Mutex<Vec<u8>>,
        stderr: Mutex<Vec<u8>>,
    }

    impl ExternalHost for Capture {
        fn main_call(&self, callbacks: Rc<dyn HostCallbacks>) {
            callbacks.log("registered").unwrap();
        }

        fn stdout_call(&self, data: &[u8]) {
            self.stdout.lock().unwrap().extend_from_slice(data);
        }

        fn stderr_call(&self, data: &[u8]) {
            self.stderr.lock().unwrap().extend_from_slice(data);
        }
    }

    fn compiled(engine: &ScanEngine, count: usize) -> Vec<FunctionHandle> {
        (0..count)
            .map(|_| {
                let mut source = ScriptSource::new("f();", ScriptOrigin::new("cb.js"));
                engine
                    .compile_function(&mut source, &[], CompileOptions::NoCompileOptions)
                    .unwrap()
            })
            .collect()
    }

    fn functions(handles: &[FunctionHandle]) -> BridgeFunctions {
        BridgeFunctions {
            call_main: handles[0],
            require: handles[1],
            log: handles[2],
            error: handles[3],
            tick_callback: handles[4],
        }
    }

    #[test]
    fn text_payload_is_utf8() {
        let value = Value::from("héllo");
        let payload = OutputPayload::from_value(&value);
        assert_eq!(payload.as_bytes(), "héllo".as_bytes());
        assert_eq!(payload.len(), 6);
    }

    #[test]
    fn bytes_payload_is_verbatim() {
        let value = Value::Bytes(vec![0, 159, 255]);
        let payload = OutputPayload::from_value(&value);
        assert_eq!(payload, OutputPayload::Bytes(Cow::Borrowed(&[0, 159, 255])));
        assert_eq!(payload.as_bytes(), &[0, 159, 255]);
    }

    #[test]
    fn other_values_use_display_string() {
        let value = Value::Number(42.0);
        assert_eq!(OutputPayload::from_value(&value).as_bytes(), b"42");
        let value = Value::Undefined;
        assert_eq!(OutputPayload::from_value(&value).as_bytes(), b"undefined");
    }

    #[test]
    fn runtime_callbacks_invoke_engine() {
        let engine = Rc::new(ScanEngine::new());
        let handles = compiled(&engine, 5);
        let callbacks = RuntimeCallbacks::new(Rc::clone(&engine), functions(&handles));
        assert!(callbacks.call_main().is_ok());
        assert!(callbacks.require("./app").is_ok());
        assert!(callbacks.log("hi").is_ok());
        assert!(callbacks.error("oops").is_ok());
        assert!(callbacks.tick_callback().is_ok());
    }

    #[test]
    fn runtime_callbacks_report_engine_errors() {
        let engine = Rc::new(ScanEngine::new());
        let bogus = FunctionHandle::from_raw(99);
        let callbacks = RuntimeCallbacks::new(
            engine,
            BridgeFunctions {
                call_main: bogus,
                require: bogus,
                log: bogus,
                error: bogus,
                tick_callback: bogus,
            },
        );
        assert_eq!(
            callbacks.call_main(),
            Err(ScriptError::UnknownFunction(bogus))
        );
    }

    #[test]
    fn bridge_forwards_to_host() {
        let host = Arc::new(Capture::default());
        let bridge = HostBridge::new(host.clone());
        bridge.forward_stdout(&OutputPayload::Text(Cow::Borrowed("out")));
        bridge.forward_stderr(&OutputPayload::Bytes(Cow::Borrowed(b"err")));
        assert_eq!(*host.stdout.lock().unwrap(), b"out");
        assert_eq!(*host.stderr.lock().unwrap(), b"err");
    }

    #[test]
    fn register_hands_callbacks_to_host() {
        let engine = Rc::new(ScanEngine::new());
        let handles = compiled(&engine, 5);
        let bridge = HostBridge::new(Arc::new(Capture::default()));
        bridge.register(Rc::new(RuntimeCallbacks::new(engine, functions(&handles))));
    }
}
