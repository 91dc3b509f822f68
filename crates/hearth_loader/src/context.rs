//! The process-wide loader context and the per-context execution state.

use std::rc::Rc;
use std::sync::{Arc, OnceLock};

use hearth_config::{LoaderConfig, DEFAULT_PARAMETERS};
use hearth_engine::ScriptEngine;
use hearth_tables::{BuildArtifacts, CacheTable, IntegrityError, SourceTable};
use tracing::debug;

use crate::bridge::{ExternalHost, HostBridge};
use crate::error::BridgeError;
use crate::ledger::UsageLedger;

/// Options fixed when the loader context is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoaderOptions {
    /// Process-wide switch for consuming code caches.
    pub cache_enabled: bool,
    /// Treat a digest mismatch as a fatal integrity error.
    pub strict_digests: bool,
    /// Free parameter names module bodies are compiled with.
    pub parameters: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            cache_enabled: true,
            strict_digests: false,
            parameters: DEFAULT_PARAMETERS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl From<&LoaderConfig> for LoaderOptions {
    fn from(config: &LoaderConfig) -> Self {
        Self {
            cache_enabled: config.cache.enabled,
            strict_digests: config.cache.strict_digests,
            parameters: config.loader.parameters.clone(),
        }
    }
}

/// Owns the embedded tables, the loader options and the host bridge slot.
///
/// Built once at startup and shared by reference. Everything except the
/// bridge slot is read-only after construction; the slot is written at most
/// once through [`LoaderContext::install_bridge`].
#[derive(Debug)]
pub struct LoaderContext {
    sources: SourceTable,
    cache: CacheTable,
    options: LoaderOptions,
    bridge: OnceLock<HostBridge>,
}

impl LoaderContext {
    /// Builds a context from build artifacts.
    pub fn new(artifacts: BuildArtifacts, options: LoaderOptions) -> Self {
        let (sources, cache) = artifacts.into_tables();
        debug!(
            sources = sources.len(),
            caches = cache.len(),
            cache_enabled = options.cache_enabled,
            "loader context created"
        );
        Self {
            sources,
            cache,
            options,
            bridge: OnceLock::new(),
        }
    }

    /// Builds a context with options taken from a parsed configuration.
    pub fn from_config(artifacts: BuildArtifacts, config: &LoaderConfig) -> Self {
        Self::new(artifacts, LoaderOptions::from(config))
    }

    /// Checks the pairing invariants of the embedded tables.
    ///
    /// Every source must carry a digest, and every cache blob must carry a
    /// producing digest and vice versa. Lookups check the same things lazily;
    /// this reports the first violation up front, in id order.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        if let Some(id) = self
            .sources
            .ids()
            .find(|id| self.sources.source_digest(id.as_str()).is_none())
        {
            return Err(IntegrityError::MissingSourceDigest(id.clone()));
        }
        if let Some(id) = self.sources.ids().find(|id| {
            self.cache.lookup_cache(id.as_str()).is_some()
                && self.cache.producing_digest(id.as_str()).is_none()
        }) {
            return Err(IntegrityError::MissingCacheDigest(id.clone()));
        }
        if let Some(id) = self.cache.orphan_digests().next() {
            return Err(IntegrityError::OrphanCacheDigest(id.clone()));
        }
        Ok(())
    }

    /// The embedded source table.
    pub fn sources(&self) -> &SourceTable {
        &self.sources
    }

    /// The embedded code cache table.
    pub fn cache(&self) -> &CacheTable {
        &self.cache
    }

    /// The options this context was built with.
    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    /// Returns `true` if caches may be consumed: the feature is enabled and
    /// the build carries at least one blob.
    pub fn has_code_cache(&self) -> bool {
        self.options.cache_enabled && !self.cache.is_empty()
    }

    /// Installs the external host. Succeeds at most once per context.
    pub fn install_bridge(&self, host: Arc<dyn ExternalHost>) -> Result<(), BridgeError> {
        self.bridge
            .set(HostBridge::new(host))
            .map_err(|_| BridgeError::AlreadyInstalled)?;
        debug!("host bridge installed");
        Ok(())
    }

    /// The installed host bridge, or `None` if no host was installed.
    pub fn bridge(&self) -> Option<&HostBridge> {
        self.bridge.get()
    }
}

/// State owned by one scripting execution context: its engine and its
/// compile usage ledger.
///
/// The engine is reference-counted because host callback records created by
/// `registerBridge` keep it alive after the binding call returns.
pub struct ExecutionContext<E> {
    engine: Rc<E>,
    ledger: UsageLedger,
}

impl<E: ScriptEngine> ExecutionContext<E> {
    /// Creates an execution context with an empty ledger.
    pub fn new(engine: E) -> Self {
        Self::from_rc(Rc::new(engine))
    }

    /// Creates an execution context around an already shared engine.
    pub fn from_rc(engine: Rc<E>) -> Self {
        Self {
            engine,
            ledger: UsageLedger::new(),
        }
    }

    /// The engine.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// A new strong reference to the engine.
    pub fn engine_rc(&self) -> Rc<E> {
        Rc::clone(&self.engine)
    }

    /// The compile usage ledger.
    pub fn ledger(&self) -> &UsageLedger {
        &self.ledger
    }

    /// Borrows the engine and the ledger at the same time.
    pub(crate) fn parts_mut(&mut self) -> (&E, &mut UsageLedger) {
        (&self.engine, &mut self.ledger)
    }
}
