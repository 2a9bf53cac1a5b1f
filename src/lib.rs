//! Configuration-driven call instrumentation.
//!
//! This crate wraps arbitrary functions so that every invocation is timed,
//! has its inputs and outputs sanitized, and emits a structured log record
//! describing success or failure — without altering the wrapped function's
//! return value or error. It targets library authors who want opt-in
//! observability on selected methods without scattering logging calls
//! through business logic.
//!
//! # Core Types
//!
//! - [`Decorator`]: produces instrumented versions of functions for one
//!   application
//! - [`Instrumented`]: a wrapped function; calling it runs the original
//!   exactly once and logs around it
//! - [`Config`]: immutable per-wrapper options (levels, sanitizers,
//!   duplicate-suppression policy, logger, benchmark source)
//! - [`LoggerSink`]: the single emission capability, with adapters for
//!   callable loggers ([`FnLogger`]), level-keyed loggers
//!   ([`LeveledLogger`]), and the `tracing` ecosystem ([`TracingLogger`])
//! - [`CallError`]: shared-identity error crossing the call seam, carrying
//!   the hidden marker behind the deepest duplicate-suppression policy
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use instrument_core::{sanitize, CollectingLogger, Config, Decorator, Target};
//! use serde_json::json;
//!
//! let sink = Arc::new(CollectingLogger::new());
//! let config = Config::builder("billing")
//!     .level("info")
//!     .params_sanitizer(sanitize::redact_all())
//!     .result_sanitizer(sanitize::passthrough())
//!     .error_sanitizer(sanitize::error_message())
//!     .logger(Arc::clone(&sink))
//!     .build()
//!     .expect("complete configuration");
//!
//! let decorator = Decorator::new("api", config);
//! let charge = decorator.wrap("charge", Target::from_fn(|args| {
//!     Ok(json!({"charged": args[0]}))
//! }));
//!
//! charge.call(json!(["4111-1111"])).expect("call succeeds");
//!
//! let (level, record) = sink.snapshot().remove(0);
//! assert_eq!(level, "info");
//! assert_eq!(record.params, json!("[REDACTED]"));
//! ```
//!
//! The decorator only produces the replacement function. Substituting it
//! into an object or class — method interception — is the caller's
//! mechanism, consumed through [`Decorator::wrap`]'s input and output.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod benchmark;
mod config;
mod decorator;
mod error;
mod level;
mod record;
pub mod sanitize;
mod sink;

pub use benchmark::{Benchmark, BenchmarkToken, WallClock};
pub use config::{Config, ConfigBuilder, ConfigError, ConfigErrorKind, DedupPolicy};
pub use decorator::{Decorator, Instrumented, Target, TargetFn};
pub use error::{CallError, CallErrorKind};
pub use level::LevelSpec;
pub use record::{is_truthy, CallData, LogRecord};
pub use sanitize::{ErrorSanitizer, ValueSanitizer};
pub use sink::{CollectingLogger, FnLogger, LeveledLogger, LoggerSink, TracingLogger};
