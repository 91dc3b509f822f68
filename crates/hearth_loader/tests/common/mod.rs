//! Shared fixtures for loader integration tests.

#![allow(dead_code)]

use std::rc::Rc;
use std::sync::Mutex;

use hearth_common::Digest;
use hearth_engine::ScanEngine;
use hearth_loader::{
    lookup_and_compile, CompileMode, ExternalHost, HostCallbacks, LoaderContext, LoaderOptions,
};
use hearth_tables::BuildArtifacts;

pub const LOADERS: &str = "internal/bootstrap/loaders";

/// Produces a cache blob for `text` with a fresh engine carrying `flags`.
pub fn blob_for(text: &str, flags: &[&str]) -> Vec<u8> {
    generate(text, flags, &LoaderOptions::default().parameters)
}

/// Produces a cache blob for `text` compiled over `parameters`.
pub fn blob_with_parameters(text: &str, parameters: &[&str]) -> Vec<u8> {
    let parameters: Vec<String> = parameters.iter().map(|p| p.to_string()).collect();
    generate(text, &[], &parameters)
}

fn generate(text: &str, flags: &[&str], parameters: &[String]) -> Vec<u8> {
    let engine = ScanEngine::with_flags(flags.iter().copied());
    let mut artifacts = BuildArtifacts::new();
    artifacts.add_source_digested("scratch", text);
    let loader = LoaderContext::new(artifacts, LoaderOptions::default());
    lookup_and_compile(
        &loader,
        &engine,
        "scratch",
        parameters,
        CompileMode::CacheGeneration,
        None,
    )
    .unwrap()
    .into_code_cache()
    .unwrap()
}

/// One module whose source carries `source_digest` and whose cache blob was
/// produced from `cached_text` and recorded under `cache_digest`.
pub fn single_module(
    text: &str,
    source_digest: &str,
    cached_text: &str,
    cache_digest: &str,
) -> BuildArtifacts {
    let mut artifacts = BuildArtifacts::new();
    artifacts.add_source(LOADERS, text, Digest::new(source_digest));
    artifacts.add_code_cache(LOADERS, blob_for(cached_text, &[]), Digest::new(cache_digest));
    artifacts
}

/// Host that records everything it receives.
#[derive(Default)]
pub struct CaptureHost {
    pub stdout: Mutex<Vec<u8>>,
    pub stderr: Mutex<Vec<u8>>,
    pub stdout_calls: Mutex<usize>,
    pub registrations: Mutex<usize>,
}

impl ExternalHost for CaptureHost {
    fn main_call(&self, callbacks: Rc<dyn HostCallbacks>) {
        *self.registrations.lock().unwrap() += 1;
        callbacks.call_main().unwrap();
    }

    fn stdout_call(&self, data: &[u8]) {
        *self.stdout_calls.lock().unwrap() += 1;
        self.stdout.lock().unwrap().extend_from_slice(data);
    }

    fn stderr_call(&self, data: &[u8]) {
        self.stderr.lock().unwrap().extend_from_slice(data);
    }
}
