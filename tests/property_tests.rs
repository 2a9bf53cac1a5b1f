//! Property tests for the instrumentation decorator.
//!
//! These validate record-shape and identity invariants under generated
//! inputs: falsy results never produce a `result` field, success records
//! never carry `error`, thrown errors keep their identity and message, and
//! the deepest policy emits exactly one record per error instance.

use std::sync::Arc;

use instrument_core::{
    is_truthy, sanitize, CallError, CollectingLogger, Config, Decorator, DedupPolicy, Target,
};
use proptest::prelude::*;
use serde_json::Value;

// Strategy: Generate arbitrary JSON scalars (the interesting truthiness cases)
fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
    ]
}

// Strategy: Generate small argument arrays
fn arb_args() -> impl Strategy<Value = Value> {
    prop::collection::vec(arb_scalar(), 0..4).prop_map(Value::from)
}

fn decorator(sink: Arc<CollectingLogger>, level: &str) -> Decorator {
    let config = Config::builder("svc")
        .level(level)
        .params_sanitizer(sanitize::passthrough())
        .result_sanitizer(sanitize::passthrough())
        .error_sanitizer(sanitize::error_message())
        .logger(sink)
        .build()
        .expect("complete configuration");
    Decorator::new("app", config)
}

proptest! {
    /// Property: the caller always observes the wrapped function's exact
    /// result, and the record's `result` field is present iff the raw
    /// result was truthy.
    #[test]
    fn result_inclusion_follows_truthiness(args in arb_args(), result in arb_scalar()) {
        let sink = Arc::new(CollectingLogger::new());
        let decorator = decorator(Arc::clone(&sink), "info");

        let returned = result.clone();
        let wrapped = decorator.wrap("m", Target::from_fn(move |_| Ok(returned.clone())));

        let observed = wrapped.call(args.clone()).expect("call succeeds");
        prop_assert_eq!(&observed, &result);

        let records = sink.snapshot();
        prop_assert_eq!(records.len(), 1);
        let record = &records[0].1;
        prop_assert_eq!(record.result.is_some(), is_truthy(&result));
        prop_assert!(record.error.is_none());
        prop_assert_eq!(&record.params, &args);
    }

    /// Property: serialized records never contain a null-valued optional
    /// field, whatever the call looked like.
    #[test]
    fn serialized_records_are_compact(args in arb_args(), result in arb_scalar()) {
        let sink = Arc::new(CollectingLogger::new());
        let decorator = decorator(Arc::clone(&sink), "info");

        let returned = result.clone();
        let wrapped = decorator.wrap("m", Target::from_fn(move |_| Ok(returned.clone())));
        wrapped.call(args).expect("call succeeds");

        let value = sink.snapshot()[0].1.to_value();
        let object = value.as_object().expect("record serializes to an object");
        for (key, field) in object {
            prop_assert!(
                !field.is_null() || key == "params" || key == "benchmark",
                "field '{}' serialized as null",
                key
            );
        }
    }

    /// Property: error identity and message survive instrumentation
    /// untouched, for any message.
    #[test]
    fn error_identity_is_preserved(args in arb_args(), message in "[a-zA-Z0-9 ]{1,24}") {
        let sink = Arc::new(CollectingLogger::new());
        let decorator = decorator(Arc::clone(&sink), "info");

        let original = CallError::msg(message.clone());
        let thrown = original.clone();
        let wrapped = decorator.wrap("m", Target::from_fn(move |_| Err(thrown.clone())));

        let observed = wrapped.call(args).unwrap_err();
        prop_assert!(observed.same_instance(&original));
        prop_assert_eq!(observed.to_string(), message);
    }

    /// Property: with `errors_only`, successful calls never reach the
    /// logger regardless of arguments or results.
    #[test]
    fn errors_only_never_logs_success(args in arb_args(), result in arb_scalar()) {
        let sink = Arc::new(CollectingLogger::new());
        let config = Config::builder("svc")
            .level("info")
            .errors_only(true)
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(Arc::clone(&sink))
            .build()
            .expect("complete configuration");
        let decorator = Decorator::new("app", config);

        let returned = result.clone();
        let wrapped = decorator.wrap("m", Target::from_fn(move |_| Ok(returned.clone())));
        wrapped.call(args).expect("call succeeds");

        prop_assert!(sink.is_empty());
    }

    /// Property: under the deepest policy, an error propagating through any
    /// nesting depth is logged exactly once, from the innermost frame.
    #[test]
    fn deepest_policy_logs_once_at_any_depth(args in arb_args(), depth in 1usize..6) {
        let sink = Arc::new(CollectingLogger::new());
        let config = Config::builder("svc")
            .log_errors(DedupPolicy::Deepest)
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(Arc::clone(&sink))
            .build()
            .expect("complete configuration");
        let decorator = Decorator::new("app", config);

        let mut current = decorator.wrap(
            "layer-0",
            Target::from_fn(|_| Err(CallError::msg("deep"))),
        );
        for layer in 1..depth {
            let inner = current.clone();
            current = decorator.wrap(
                format!("layer-{}", layer),
                Target::from_fn(move |a: &Value| inner.call(a.clone())),
            );
        }

        current.call(args).unwrap_err();

        let records = sink.snapshot();
        prop_assert_eq!(records.len(), 1);
        prop_assert_eq!(&records[0].1.method, "layer-0");
    }

    /// Property: without a dedup policy, the same nesting logs once per
    /// instrumented layer, innermost first.
    #[test]
    fn unset_policy_logs_once_per_layer(args in arb_args(), depth in 1usize..6) {
        let sink = Arc::new(CollectingLogger::new());
        let config = Config::builder("svc")
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(Arc::clone(&sink))
            .build()
            .expect("complete configuration");
        let decorator = Decorator::new("app", config);

        let mut current = decorator.wrap(
            "layer-0",
            Target::from_fn(|_| Err(CallError::msg("deep"))),
        );
        for layer in 1..depth {
            let inner = current.clone();
            current = decorator.wrap(
                format!("layer-{}", layer),
                Target::from_fn(move |a: &Value| inner.call(a.clone())),
            );
        }

        current.call(args).unwrap_err();

        let records = sink.snapshot();
        prop_assert_eq!(records.len(), depth);
        for (i, (_, record)) in records.iter().enumerate() {
            prop_assert_eq!(&record.method, &format!("layer-{}", i));
        }
    }
}
