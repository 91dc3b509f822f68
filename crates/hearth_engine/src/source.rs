//! Compilation inputs: source text, origin, cached data and options.

/// Where a script came from, for error positions and stack traces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptOrigin {
    /// Resource name reported in diagnostics.
    pub resource_name: String,
    /// Line offset added to every reported line.
    pub line_offset: u32,
    /// Column offset added to columns on the first line.
    pub column_offset: u32,
}

impl ScriptOrigin {
    /// Creates an origin with zero offsets.
    pub fn new(resource_name: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            line_offset: 0,
            column_offset: 0,
        }
    }
}

/// A code cache blob handed to the engine, plus the engine's verdict on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedData<'a> {
    data: &'a [u8],
    rejected: bool,
}

impl<'a> CachedData<'a> {
    /// Wraps a borrowed blob. The blob is not copied.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            rejected: false,
        }
    }

    /// Returns the blob bytes.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Returns `true` if the engine refused this blob during compilation.
    pub fn rejected(&self) -> bool {
        self.rejected
    }

    /// Marks the blob as refused. Called by engines only.
    pub fn reject(&mut self) {
        self.rejected = true;
    }
}

/// Source text submitted for compilation.
#[derive(Debug, Clone)]
pub struct ScriptSource<'a> {
    text: &'a str,
    origin: ScriptOrigin,
    cached_data: Option<CachedData<'a>>,
}

impl<'a> ScriptSource<'a> {
    /// Creates a source without cached data.
    pub fn new(text: &'a str, origin: ScriptOrigin) -> Self {
        Self {
            text,
            origin,
            cached_data: None,
        }
    }

    /// Attaches a code cache blob for the engine to consume.
    pub fn with_cached_data(mut self, data: &'a [u8]) -> Self {
        self.cached_data = Some(CachedData::new(data));
        self
    }

    /// Returns the source text.
    pub fn text(&self) -> &'a str {
        self.text
    }

    /// Returns the script origin.
    pub fn origin(&self) -> &ScriptOrigin {
        &self.origin
    }

    /// Returns the attached cached data, if any.
    pub fn cached_data(&self) -> Option<&CachedData<'a>> {
        self.cached_data.as_ref()
    }

    /// Returns the attached cached data mutably, so the engine can reject it.
    pub fn cached_data_mut(&mut self) -> Option<&mut CachedData<'a>> {
        self.cached_data.as_mut()
    }
}

/// How the engine should compile a function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileOptions {
    /// Compile from text with the engine's default (lazy) strategy.
    NoCompileOptions,
    /// Try to materialize the function from the attached cached data.
    ConsumeCodeCache,
    /// Compile everything up front so the resulting cache is complete.
    EagerCompile,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cached_data_starts_accepted() {
        let blob = [1u8, 2, 3];
        let mut source = ScriptSource::new("x", ScriptOrigin::new("x.js")).with_cached_data(&blob);
        assert!(!source.cached_data().unwrap().rejected());
        source.cached_data_mut().unwrap().reject();
        assert!(source.cached_data().unwrap().rejected());
        assert_eq!(source.cached_data().unwrap().data(), &blob);
    }

    #[test]
    fn origin_defaults_to_zero_offsets() {
        let origin = ScriptOrigin::new("internal/util.js");
        assert_eq!(origin.line_offset, 0);
        assert_eq!(origin.column_offset, 0);
    }
}
