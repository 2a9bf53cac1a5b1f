//! Demonstrates wrapping functions, success and error logging, and the
//! deepest duplicate-suppression policy across nested instrumented calls.
//!
//! Run with: `cargo run --example nested_calls`

use instrument_core::{
    sanitize, CallError, Config, Decorator, DedupPolicy, Target, TracingLogger,
};
use serde_json::json;

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .init();

    let config = Config::builder("billing")
        .level("info")
        .error_level("error")
        .log_errors(DedupPolicy::Deepest)
        .timestamp(true)
        .params_sanitizer(sanitize::redact_all())
        .result_sanitizer(sanitize::passthrough())
        .error_sanitizer(sanitize::error_message())
        .logger(TracingLogger)
        .build()
        .expect("complete configuration");

    let decorator = Decorator::new("demo-app", config);

    // A successful instrumented call: one info record, params redacted.
    let charge = decorator.wrap(
        "charge",
        Target::from_fn(|args| Ok(json!({"charged": args[0], "status": "ok"}))),
    );
    let result = charge
        .call(json!(["4111-1111-1111-1111", 250]))
        .expect("charge succeeds");
    println!("charge returned: {}", result);

    // Nested instrumented calls sharing one failing error instance: under
    // the deepest policy only the inner frame logs it.
    let lookup = decorator.wrap(
        "lookup_account",
        Target::from_fn(|_| Err(CallError::msg("account not found"))),
    );
    let lookup_handle = lookup.clone();
    let refund = decorator.wrap(
        "refund",
        Target::from_fn(move |args| lookup_handle.call(args.clone())),
    );

    match refund.call(json!(["acct-404"])) {
        Ok(_) => unreachable!("refund cannot succeed"),
        Err(error) => println!("refund failed as expected: {}", error),
    }
}
