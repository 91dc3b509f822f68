mod common;

use common::{blob_for, blob_with_parameters, single_module, LOADERS};
use hearth_common::Digest;
use hearth_engine::{ScanEngine, Value};
use hearth_loader::{
    compile_as_module, initialize, lookup_and_compile, CompileMode, ExecutionContext,
    LoaderContext, LoaderError, LoaderOptions,
};
use hearth_tables::{read_bundle, write_bundle, BuildArtifacts, IntegrityError};

#[test]
fn matching_digest_compiles_with_cache() {
    let loader = LoaderContext::new(
        single_module("const a = 1;", "D1", "const a = 1;", "D1"),
        LoaderOptions::default(),
    );
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let function = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute)
        .unwrap()
        .into_function()
        .unwrap();

    assert_eq!(cx.engine().loaded_from_cache(function), Some(true));
    assert!(cx.ledger().compiled_with_cache().contains(LOADERS));
    assert!(!cx.ledger().compiled_without_cache().contains(LOADERS));
}

#[test]
fn digest_skew_compiles_from_source() {
    // Same length as the cached text, so the engine alone would accept it.
    let loader = LoaderContext::new(
        single_module("const a = 2;", "D2", "const a = 1;", "D1"),
        LoaderOptions::default(),
    );
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let function = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute)
        .unwrap()
        .into_function()
        .unwrap();

    assert_eq!(cx.engine().loaded_from_cache(function), Some(false));
    assert!(cx.ledger().compiled_without_cache().contains(LOADERS));
    assert!(cx.ledger().compiled_with_cache().is_empty());
}

#[test]
fn digest_skew_is_fatal_when_strict() {
    let options = LoaderOptions {
        strict_digests: true,
        ..LoaderOptions::default()
    };
    let loader = LoaderContext::new(
        single_module("const a = 2;", "D2", "const a = 1;", "D1"),
        options,
    );
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let err = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(
        err,
        LoaderError::Integrity(IntegrityError::DigestSkew { .. })
    ));
    assert!(cx.ledger().is_empty());
}

#[test]
fn disabled_cache_feature_compiles_from_source() {
    let options = LoaderOptions {
        cache_enabled: false,
        ..LoaderOptions::default()
    };
    let loader = LoaderContext::new(
        single_module("const a = 1;", "D1", "const a = 1;", "D1"),
        options,
    );
    let mut cx = ExecutionContext::new(ScanEngine::new());
    compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute).unwrap();
    assert!(cx.ledger().compiled_without_cache().contains(LOADERS));
}

#[test]
fn engine_rejection_is_recorded_as_miss() {
    let text = "const a = 1;";
    let mut artifacts = BuildArtifacts::new();
    artifacts.add_source(LOADERS, text, Digest::new("D1"));
    artifacts.add_code_cache(
        LOADERS,
        blob_for(text, &["--no-lazy"]),
        Digest::new("D1"),
    );
    let loader = LoaderContext::new(artifacts, LoaderOptions::default());
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let function = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute)
        .unwrap()
        .into_function()
        .unwrap();

    assert_eq!(cx.engine().loaded_from_cache(function), Some(false));
    assert!(cx.ledger().compiled_without_cache().contains(LOADERS));
    assert!(cx.ledger().compiled_with_cache().is_empty());
}

#[test]
fn repeated_compiles_leave_ledger_unchanged() {
    let loader = LoaderContext::new(
        single_module("const a = 1;", "D1", "const a = 1;", "D1"),
        LoaderOptions::default(),
    );
    let mut cx = ExecutionContext::new(ScanEngine::new());
    let first = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute)
        .unwrap()
        .into_function()
        .unwrap();
    let after_first = cx.ledger().clone();
    let second = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute)
        .unwrap()
        .into_function()
        .unwrap();

    assert_eq!(*cx.ledger(), after_first);
    assert_ne!(first, second);
    assert_eq!(cx.engine().loaded_from_cache(first), Some(true));
    assert_eq!(cx.engine().loaded_from_cache(second), Some(true));
    assert_eq!(cx.engine().compiled_count(), 2);
}

#[test]
fn cache_built_over_other_parameters_is_a_miss() {
    let text = "exports.a = 1;";
    let mut artifacts = BuildArtifacts::new();
    artifacts.add_source_digested(LOADERS, text);
    artifacts.add_code_cache(
        LOADERS,
        blob_with_parameters(text, &["exports"]),
        Digest::of_text(text),
    );
    let loader = LoaderContext::new(artifacts, LoaderOptions::default());
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let function = compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute)
        .unwrap()
        .into_function()
        .unwrap();

    assert_eq!(cx.engine().loaded_from_cache(function), Some(false));
    assert_eq!(
        cx.engine().parameters(function),
        Some(LoaderOptions::default().parameters)
    );
    assert!(cx.ledger().compiled_without_cache().contains(LOADERS));
    assert!(cx.ledger().compiled_with_cache().is_empty());
}

#[test]
fn generated_cache_is_usable_after_rebuild() {
    let text = "exports.join = function (a, b) { return `${a}/${b}`; };";
    let mut artifacts = BuildArtifacts::new();
    artifacts.add_source_digested("path", text);

    // Build step: generate caches from the current sources.
    let build = LoaderContext::new(artifacts.clone(), LoaderOptions::default());
    let mut build_cx = ExecutionContext::new(ScanEngine::new());
    let blob = compile_as_module(&build, &mut build_cx, "path", CompileMode::CacheGeneration)
        .unwrap()
        .into_code_cache()
        .unwrap();
    let digest = build.sources().source_digest("path").unwrap().clone();
    artifacts.add_code_cache("path", blob, digest);

    // Runtime: a fresh context consumes the generated cache.
    let runtime = LoaderContext::new(artifacts, LoaderOptions::default());
    runtime.verify().unwrap();
    let mut cx = ExecutionContext::new(ScanEngine::new());
    compile_as_module(&runtime, &mut cx, "path", CompileMode::Execute).unwrap();
    assert!(cx.ledger().compiled_with_cache().contains("path"));
}

#[test]
fn bundle_round_trip_keeps_cache_usable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("hearth.bundle");
    let artifacts = single_module("const a = 1;", "D1", "const a = 1;", "D1");
    write_bundle(&path, &artifacts, "test").unwrap();

    let loader = LoaderContext::new(read_bundle(&path).unwrap(), LoaderOptions::default());
    let mut cx = ExecutionContext::new(ScanEngine::new());
    compile_as_module(&loader, &mut cx, LOADERS, CompileMode::Execute).unwrap();
    assert!(cx.ledger().compiled_with_cache().contains(LOADERS));
}

#[test]
fn unknown_module_is_fatal() {
    let loader = LoaderContext::new(BuildArtifacts::new(), LoaderOptions::default());
    let engine = ScanEngine::new();
    let err = lookup_and_compile(
        &loader,
        &engine,
        "does/not/exist",
        &[],
        CompileMode::Execute,
        None,
    )
    .unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(err.to_string(), "no built-in module named 'does/not/exist'");
}

#[test]
fn syntax_error_is_reported_with_position() {
    let mut artifacts = BuildArtifacts::new();
    artifacts.add_source_digested("internal/util", "const s = 'unterminated;\n");
    let loader = LoaderContext::new(artifacts, LoaderOptions::default());
    let mut cx = ExecutionContext::new(ScanEngine::new());

    let err = compile_as_module(&loader, &mut cx, "internal/util", CompileMode::Execute).unwrap_err();
    assert!(!err.is_fatal());
    let LoaderError::Compile { id, source } = err else {
        panic!("expected a compile error, got {err:?}");
    };
    assert_eq!(id.as_str(), "internal/util");
    assert_eq!(source.resource, "internal/util.js");
    assert_eq!(source.line, 1);
    assert!(cx.ledger().is_empty());
}

#[test]
fn usage_query_reflects_compiles() {
    let mut artifacts = single_module("const a = 1;", "D1", "const a = 1;", "D1");
    artifacts.add_source_digested("fs", "exports.x = 1;");
    let loader = LoaderContext::new(artifacts, LoaderOptions::default());
    let namespace = initialize(&loader);
    let mut cx = ExecutionContext::new(ScanEngine::new());

    for id in [LOADERS, "fs"] {
        namespace
            .invoke(&loader, &mut cx, "compileFunction", &[Value::from(id)])
            .unwrap();
    }
    let Value::Object(usage) = namespace
        .invoke(&loader, &mut cx, "getCacheUsage", &[])
        .unwrap()
    else {
        panic!("expected an object");
    };
    assert_eq!(
        usage["compiledWithCache"],
        Value::Set([LOADERS.to_string()].into())
    );
    assert_eq!(
        usage["compiledWithoutCache"],
        Value::Set(["fs".to_string()].into())
    );
}
