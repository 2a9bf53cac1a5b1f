//! The call-instrumentation decorator: wrap guard, per-call lifecycle, and
//! the decision logic for what gets logged, at which level, with which
//! payload.

use std::fmt;
use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::config::{Config, DedupPolicy};
use crate::error::CallError;
use crate::record::{is_truthy, CallData, LogRecord};

/// The signature every instrumented function reduces to: JSON-shaped
/// arguments in, JSON-shaped result or a [`CallError`] out.
pub type TargetFn = Box<dyn Fn(&Value) -> Result<Value, CallError> + Send + Sync>;

/// A function handed to [`Decorator::wrap`].
///
/// Either a plain closure, or a function that is already instrumented —
/// being an [`Instrumented`] *is* the instrumentation marker, so the wrap
/// guard can tell the two apart without hidden tags.
pub enum Target {
    /// A plain, not-yet-instrumented function.
    Plain(TargetFn),
    /// A function some decorator already wrapped.
    Wrapped(Instrumented),
}

impl Target {
    /// Wraps a plain closure as a target.
    pub fn from_fn(f: impl Fn(&Value) -> Result<Value, CallError> + Send + Sync + 'static) -> Self {
        Self::Plain(Box::new(f))
    }
}

impl From<Instrumented> for Target {
    fn from(instrumented: Instrumented) -> Self {
        Self::Wrapped(instrumented)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain(_) => f.debug_tuple("Plain").field(&"<fn>").finish(),
            Self::Wrapped(i) => f.debug_tuple("Wrapped").field(i).finish(),
        }
    }
}

/// Produces instrumented versions of functions for one application.
///
/// The decorator owns the application name (included in every record as
/// `application`) and a shared, immutable [`Config`]. It only *produces*
/// replacement functions; substituting them back into an object or class is
/// the caller's interception mechanism, not this crate's concern.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use instrument_core::{sanitize, CollectingLogger, Config, Decorator, Target};
/// use serde_json::json;
///
/// let sink = Arc::new(CollectingLogger::new());
/// let config = Config::builder("billing")
///     .level("info")
///     .params_sanitizer(sanitize::passthrough())
///     .result_sanitizer(sanitize::passthrough())
///     .error_sanitizer(sanitize::error_message())
///     .logger(Arc::clone(&sink))
///     .build()
///     .expect("complete configuration");
///
/// let decorator = Decorator::new("api", config);
/// let charge = decorator.wrap("charge", Target::from_fn(|args| {
///     Ok(json!({"charged": args[0]}))
/// }));
///
/// let result = charge.call(json!([42])).expect("call succeeds");
/// assert_eq!(result, json!({"charged": 42}));
/// assert_eq!(sink.len(), 1);
/// ```
#[derive(Debug)]
pub struct Decorator {
    name: String,
    config: Arc<Config>,
}

impl Decorator {
    /// Creates a decorator for the named application with the given
    /// configuration.
    pub fn new(name: impl Into<String>, config: Config) -> Self {
        Self {
            name: name.into(),
            config: Arc::new(config),
        }
    }

    /// Returns the application name stamped on every record.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wraps a function, producing its instrumented version.
    ///
    /// If the target is already instrumented and the configuration does not
    /// allow re-entry, the target is returned unchanged — same reference,
    /// no extra logging layer. Otherwise a new [`Instrumented`] is produced;
    /// re-wrapping an instrumented function under `allow_reentry` stacks a
    /// second logging layer on top of the first.
    pub fn wrap(&self, method: impl Into<String>, target: impl Into<Target>) -> Instrumented {
        let target = match target.into() {
            Target::Wrapped(inner) => {
                if !self.config.allow_reentry {
                    return inner;
                }
                Box::new(move |args: &Value| inner.call(args.clone())) as TargetFn
            }
            Target::Plain(f) => f,
        };

        Instrumented {
            inner: Arc::new(InstrumentedInner {
                config: Arc::clone(&self.config),
                application: self.name.clone(),
                method: method.into(),
                target,
            }),
        }
    }
}

/// An instrumented function.
///
/// Calling it invokes the wrapped function exactly once with the original
/// arguments and returns its result or error unchanged; as a side effect, a
/// structured [`LogRecord`](crate::LogRecord) may be emitted per the
/// configuration. Clones are cheap and share the same underlying function:
/// [`same_instance()`](Self::same_instance) tells whether two handles refer
/// to one wrapping.
#[derive(Clone)]
pub struct Instrumented {
    inner: Arc<InstrumentedInner>,
}

struct InstrumentedInner {
    config: Arc<Config>,
    application: String,
    method: String,
    target: TargetFn,
}

impl Instrumented {
    /// Invokes the instrumented function without per-invocation context.
    ///
    /// # Errors
    ///
    /// Propagates the wrapped function's error unchanged, or an
    /// [`UnsupportedLevel`](crate::CallErrorKind::UnsupportedLevel)
    /// configuration error if the logger sink cannot emit at the resolved
    /// level.
    pub fn call(&self, args: Value) -> Result<Value, CallError> {
        self.invoke(args, None)
    }

    /// Invokes the instrumented function with caller-supplied context.
    ///
    /// The context is opaque to the decorator: it is handed to the context
    /// sanitizer (when one is configured) and to level resolvers, nothing
    /// else. See [`call()`](Self::call) for error behavior.
    pub fn call_with_context(&self, args: Value, context: Value) -> Result<Value, CallError> {
        self.invoke(args, Some(context))
    }

    /// Returns the instrumented method name.
    pub fn method(&self) -> &str {
        &self.inner.method
    }

    /// Returns the application name.
    pub fn application(&self) -> &str {
        &self.inner.application
    }

    /// Returns `true` if `self` and `other` are handles to the same
    /// wrapping.
    pub fn same_instance(&self, other: &Instrumented) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn invoke(&self, args: Value, context: Option<Value>) -> Result<Value, CallError> {
        let config = &self.inner.config;
        let token = config.benchmark.start();

        match (self.inner.target)(&args) {
            Ok(result) => {
                self.on_success(&args, &result, context.as_ref(), token)?;
                Ok(result)
            }
            Err(error) => {
                self.on_error(&args, &error, context.as_ref(), token)?;
                Err(error)
            }
        }
    }

    fn on_success(
        &self,
        args: &Value,
        result: &Value,
        context: Option<&Value>,
        token: crate::benchmark::BenchmarkToken,
    ) -> Result<(), CallError> {
        let config = &self.inner.config;
        let level = match &config.level {
            Some(level) if !config.errors_only => level,
            _ => return Ok(()),
        };

        let elapsed = config.benchmark.elapsed(token);
        let data = CallData {
            args,
            result: Some(result),
            error: None,
            elapsed: &elapsed,
            context,
        };
        let level = level.resolve(&data);
        let record = self.build_record(&level, &data);
        config.logger.emit(&level, &record)
    }

    fn on_error(
        &self,
        args: &Value,
        error: &CallError,
        context: Option<&Value>,
        token: crate::benchmark::BenchmarkToken,
    ) -> Result<(), CallError> {
        let config = &self.inner.config;
        let deepest_only = config.log_errors == Some(DedupPolicy::Deepest);

        if !deepest_only || !error.is_logged() {
            let elapsed = config.benchmark.elapsed(token);
            let data = CallData {
                args,
                result: None,
                error: Some(error),
                elapsed: &elapsed,
                context,
            };
            let level = config.error_level.resolve(&data);
            let record = self.build_record(&level, &data);
            config.logger.emit(&level, &record)?;
        }

        // Marked even when this layer's emission was suppressed; the marker
        // is idempotent and never cleared.
        if deepest_only {
            error.mark_logged();
        }

        Ok(())
    }

    fn build_record(&self, level: &str, data: &CallData<'_>) -> LogRecord {
        let config = &self.inner.config;

        LogRecord {
            service: config.service_name.clone(),
            method: self.inner.method.clone(),
            application: self.inner.application.clone(),
            level: level.to_string(),
            params: (config.params_sanitizer)(data.args),
            // Truthiness, not presence: a falsy result (0, "", false, null)
            // is omitted, matching the source behavior.
            result: data
                .result
                .filter(|r| is_truthy(r))
                .map(|r| (config.result_sanitizer)(r)),
            error: data.error.map(|e| (config.error_sanitizer)(e)),
            context: match (&config.context_sanitizer, data.context) {
                (Some(sanitize), Some(context)) => Some(sanitize(context)),
                _ => None,
            },
            benchmark: data.elapsed.clone(),
            timestamp: config
                .timestamp
                .then(|| Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }
}

impl fmt::Debug for Instrumented {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumented")
            .field("application", &self.inner.application)
            .field("method", &self.inner.method)
            .finish_non_exhaustive()
    }
}
