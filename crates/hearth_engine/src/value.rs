//! Runtime values exchanged with the engine.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque handle to a function compiled in one execution context.
///
/// Handles are only meaningful to the engine instance that issued them and
/// live as long as that instance.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FunctionHandle(u32);

impl FunctionHandle {
    /// Creates a handle from a raw engine index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw engine index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A value crossing the boundary between the loader and script code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `undefined`.
    Undefined,
    /// `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    String(String),
    /// The contents of a binary buffer view (`Uint8Array` and friends).
    Bytes(Vec<u8>),
    /// A compiled function.
    Function(FunctionHandle),
    /// A set of strings.
    Set(BTreeSet<String>),
    /// A plain object with string keys.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Returns the string payload, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the function handle, if this is a function.
    pub fn as_function(&self) -> Option<FunctionHandle> {
        match self {
            Value::Function(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the name of this value's type, as `typeof` would report it
    /// (buffers and sets report `"object"`).
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Function(_) => "function",
            Value::Null | Value::Bytes(_) | Value::Set(_) | Value::Object(_) => "object",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::Bytes(bytes) => {
                for (i, b) in bytes.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{b}")?;
                }
                Ok(())
            }
            Value::Function(_) => f.write_str("function"),
            Value::Set(_) => f.write_str("[object Set]"),
            Value::Object(_) => f.write_str("[object Object]"),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}
