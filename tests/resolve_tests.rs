//! Integration tests for the resolution engine through the public API.
//!
//! Covers priority order, literal handling, redaction of sensitive values,
//! and the all-or-nothing failure behavior.

use serde_json::json;
use std::sync::Arc;
use strata_config::diagnostics::DiagnosticEvent;
use strata_config::error::ErrorKind;
use strata_config::redact::REDACTED;
use strata_config::resolve::{CandidateBundle, resolve};
use strata_config::resolved::{DebugOptions, get_diagnostics, get_sources};
use strata_config::schema::{FieldSpec, SchemaNode};
use strata_config::secrets::MemorySecretReader;
use strata_config::source::SourceTag;

/// Field reachable from every source.
fn everywhere_schema() -> SchemaNode {
    SchemaNode::object([(
        "v",
        SchemaNode::field(
            FieldSpec::string()
                .env("V")
                .secret_file("v")
                .default_value("default"),
        ),
    )])
}

fn full_bundle() -> CandidateBundle {
    CandidateBundle::new()
        .with_overrides(json!({"v": "override"}))
        .with_env_vars([("V", "env")])
        .with_secrets_base_path("/secrets")
        .with_file_values(json!({"v": "file"}), None)
        .with_initial_values(json!({"v": "initial"}))
}

fn tried(events: &[DiagnosticEvent], path: &str) -> Vec<String> {
    events
        .iter()
        .find_map(|e| match e {
            DiagnosticEvent::SourceDecision { path: p, tried, .. } if p == path => {
                Some(tried.iter().map(ToString::to_string).collect())
            }
            _ => None,
        })
        .unwrap_or_default()
}

#[test]
fn env_beats_default() {
    let schema = SchemaNode::object([(
        "host",
        SchemaNode::field(FieldSpec::string().env("HOST").default_value("localhost")),
    )]);
    let bundle = CandidateBundle::new().with_env_vars([("HOST", "x")]);

    let resolved = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap();
    assert_eq!(resolved.value(), &json!({"host": "x"}));
    assert_eq!(resolved.source("host").map(ToString::to_string), Some("env:HOST".into()));
}

#[test]
fn missing_env_without_default_fails() {
    let schema = SchemaNode::object([("host", SchemaNode::field(FieldSpec::string().env("HOST")))]);
    let bundle = CandidateBundle::new().with_env(Default::default());

    let err = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::MissingValue);
    assert_eq!(err.path, "host");
    assert!(err.message.contains("undefined"));
}

#[test]
fn missing_sensitive_secret_shows_marker() {
    let schema = SchemaNode::object([(
        "db",
        SchemaNode::object([(
            "pass",
            SchemaNode::field(FieldSpec::string().secret_file("p").sensitive()),
        )]),
    )]);
    let bundle = CandidateBundle::new().with_secrets_base_path("/secrets");

    let err = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap_err();
    assert_eq!(err.path, "db.pass");
    assert!(err.sensitive);
    assert!(err.to_string().contains(REDACTED));
    assert!(!err.to_string().contains("undefined"));
}

#[test]
fn priority_chain_peels_one_source_at_a_time() {
    let schema = Arc::new(everywhere_schema());
    let secrets = MemorySecretReader::new().with_secret("/secrets/v", "secret");

    let expected = [
        ("override", "override"),
        ("env", "env:V"),
        ("secret", "secretFile:/secrets/v"),
        ("file", "file"),
        ("initial", "initial"),
        ("default", "default"),
    ];

    let mut bundle = full_bundle();
    for (i, (value, tag)) in expected.iter().enumerate() {
        let empty = MemorySecretReader::new();
        let reader = if i <= 2 { &secrets } else { &empty };
        let resolved = resolve(Arc::clone(&schema), &bundle, reader).unwrap();
        assert_eq!(resolved.value()["v"], json!(value), "step {}", i);
        assert_eq!(resolved.source("v").map(ToString::to_string).as_deref(), Some(*tag));

        // Drop the winning source for the next round.
        match i {
            0 => bundle.overrides = None,
            1 => bundle.env = None,
            2 => {}
            3 => bundle.file_values = None,
            4 => bundle.initial_values = None,
            _ => {}
        }
    }
}

#[test]
fn tried_list_holds_every_higher_source_and_the_winner() {
    let schema = Arc::new(everywhere_schema());
    let bundle = CandidateBundle::new()
        .with_env(Default::default())
        .with_secrets_base_path("/secrets")
        .with_file_values(json!({}), Some("base.json".into()))
        .with_initial_values(json!({"v": "seed"}));

    let resolved = resolve(schema, &bundle, &MemorySecretReader::new()).unwrap();
    assert_eq!(resolved.source("v"), Some(&SourceTag::Initial));
    assert_eq!(
        tried(&resolved.diagnostics(), "v"),
        vec!["env:V", "secretFile:/secrets/v", "file:base.json", "initial"]
    );
}

#[test]
fn literal_is_never_overridden() {
    let schema = SchemaNode::object([
        ("kind", SchemaNode::literal("service")),
        ("name", FieldSpec::string().default_value("svc").into()),
    ]);
    let bundle = full_bundle()
        .with_overrides(json!({"kind": "hacked"}))
        .with_file_values(json!({"kind": "file"}), None);

    let resolved = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap();
    assert_eq!(resolved.value()["kind"], json!("service"));
    assert_eq!(resolved.source("kind"), Some(&SourceTag::Literal));
}

#[test]
fn sensitive_values_never_leak() {
    let schema = SchemaNode::object([
        ("user", SchemaNode::field(FieldSpec::string().default_value("admin"))),
        ("token", FieldSpec::string().env("TOKEN").sensitive().into()),
    ]);
    let bundle = CandidateBundle::new().with_env_vars([("TOKEN", "tok-123")]);
    let resolved = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap();

    assert_eq!(resolved.value()["token"], json!("tok-123"));
    assert!(!resolved.to_string().contains("tok-123"));
    assert!(!format!("{:?}", resolved).contains("tok-123"));

    let debug = resolved.to_debug_object(DebugOptions {
        include_diagnostics: true,
    });
    let text = serde_json::to_string(&debug).unwrap();
    assert!(!text.contains("tok-123"));
    assert_eq!(debug.config["token"]["value"], json!(REDACTED));
    assert_eq!(debug.config["token"]["source"], json!("env:TOKEN"));
}

#[test]
fn invalid_sensitive_value_is_redacted_in_error() {
    let schema = SchemaNode::object([(
        "pin",
        SchemaNode::field(FieldSpec::integer().env("PIN").sensitive()),
    )]);
    let bundle = CandidateBundle::new().with_env_vars([("PIN", "not-a-number-9931")]);

    let err = resolve(Arc::new(schema), &bundle, &MemorySecretReader::new()).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidValue);
    assert!(!err.to_string().contains("9931"));
    assert!(err.to_string().contains(REDACTED));
}

#[test]
fn deep_path_is_reported() {
    let schema = SchemaNode::object([(
        "a",
        SchemaNode::object([("b", SchemaNode::object([("c", SchemaNode::field(FieldSpec::integer()))]))]),
    )]);

    let bad = CandidateBundle::new().with_file_values(json!({"a": {"b": {"c": "nope"}}}), None);
    let err = resolve(Arc::new(schema.clone()), &bad, &MemorySecretReader::new()).unwrap_err();
    assert_eq!(err.path, "a.b.c");
    assert!(err.to_string().contains("\"a.b.c\""));

    let good = CandidateBundle::new().with_file_values(json!({"a": {"b": {"c": 7}}}), None);
    let resolved = resolve(Arc::new(schema), &good, &MemorySecretReader::new()).unwrap();
    assert_eq!(tried(&resolved.diagnostics(), "a.b.c"), vec!["file"]);
}

#[test]
fn failure_returns_no_partial_result() {
    let schema = SchemaNode::object([
        ("first", SchemaNode::field(FieldSpec::string().default_value("ok"))),
        ("second", FieldSpec::string().env("MISSING").into()),
    ]);
    let err = resolve(Arc::new(schema), &CandidateBundle::new(), &MemorySecretReader::new())
        .unwrap_err();
    assert_eq!(err.path, "second");
    // The trace up to the failure is attached; no decisions were committed.
    assert!(
        err.diagnostics
            .iter()
            .all(|e| !matches!(e, DiagnosticEvent::SourceDecision { .. }))
    );
}

#[test]
fn side_channel_accessors() {
    let schema = SchemaNode::object([("n", SchemaNode::field(FieldSpec::integer().default_value(1)))]);
    let resolved = resolve(Arc::new(schema), &CandidateBundle::new(), &MemorySecretReader::new())
        .unwrap();

    assert_eq!(get_sources(&resolved).map(|s| s.len()), Some(1));
    assert_eq!(get_diagnostics(&resolved).map(|d| d.len()), Some(1));
    assert!(get_sources(resolved.value()).is_none());
    assert!(get_diagnostics(&42_u32).is_none());
    // Plain data: no side-channel keys in the value tree.
    assert_eq!(resolved.value(), &json!({"n": 1}));
}
