use std::collections::HashMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use crate::error::CallError;
use crate::record::LogRecord;

/// Trait for sinks that receive emitted log records.
///
/// `LoggerSink` is the single capability the decorator needs from a logging
/// backend: deliver one record at one level. Two adapters cover the common
/// shapes — a single callable taking `(level, record)` ([`FnLogger`]) and an
/// object exposing one callable per level ([`LeveledLogger`]) — so the
/// polymorphism is resolved at configuration time, not at every log call.
///
/// # Errors
///
/// An implementation that has no emission path for `level` must return
/// [`CallError::unsupported_level`]. That error is a configuration error:
/// the decorator propagates it synchronously and never logs it.
pub trait LoggerSink: Send + Sync {
    /// Delivers one record at the given level.
    ///
    /// # Errors
    ///
    /// Returns an [`UnsupportedLevel`](crate::CallErrorKind::UnsupportedLevel)
    /// error when the sink cannot emit at `level`.
    fn emit(&self, level: &str, record: &LogRecord) -> Result<(), CallError>;
}

impl<L: LoggerSink + ?Sized> LoggerSink for std::sync::Arc<L> {
    fn emit(&self, level: &str, record: &LogRecord) -> Result<(), CallError> {
        (**self).emit(level, record)
    }
}

/// A sink backed by a single callable taking `(level, record)`.
///
/// Accepts every level; the callable is expected to do its own dispatch.
///
/// # Examples
///
/// ```
/// use instrument_core::{FnLogger, LoggerSink};
///
/// let sink = FnLogger::new(|level, record| {
///     println!("[{}] {}", level, record.to_value());
/// });
/// ```
pub struct FnLogger {
    f: Box<dyn Fn(&str, &LogRecord) + Send + Sync>,
}

impl FnLogger {
    /// Creates a sink from a `(level, record)` callable.
    pub fn new(f: impl Fn(&str, &LogRecord) + Send + Sync + 'static) -> Self {
        Self { f: Box::new(f) }
    }
}

impl LoggerSink for FnLogger {
    fn emit(&self, level: &str, record: &LogRecord) -> Result<(), CallError> {
        (self.f)(level, record);
        Ok(())
    }
}

impl fmt::Debug for FnLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnLogger").finish_non_exhaustive()
    }
}

/// A sink exposing one callable per level name.
///
/// Emission at a level with no registered handler fails with a
/// configuration error naming the level.
///
/// # Examples
///
/// ```
/// use instrument_core::{CallErrorKind, LeveledLogger, LoggerSink};
///
/// let sink = LeveledLogger::new()
///     .on("info", |record| println!("info: {}", record.to_value()))
///     .on("error", |record| eprintln!("error: {}", record.to_value()));
///
/// # let record = instrument_core::LogRecord {
/// #     service: "s".into(), method: "m".into(), application: "a".into(),
/// #     level: "audit".into(), params: serde_json::json!([]),
/// #     result: None, error: None, context: None,
/// #     benchmark: serde_json::json!(null), timestamp: None,
/// # };
/// let failure = sink.emit("audit", &record).unwrap_err();
/// assert_eq!(failure.kind(), CallErrorKind::UnsupportedLevel);
/// ```
#[derive(Default)]
pub struct LeveledLogger {
    handlers: HashMap<String, Box<dyn Fn(&LogRecord) + Send + Sync>>,
}

impl LeveledLogger {
    /// Creates a sink with no registered levels.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for a level, replacing any previous one.
    pub fn on(
        mut self,
        level: impl Into<String>,
        handler: impl Fn(&LogRecord) + Send + Sync + 'static,
    ) -> Self {
        self.handlers.insert(level.into(), Box::new(handler));
        self
    }
}

impl LoggerSink for LeveledLogger {
    fn emit(&self, level: &str, record: &LogRecord) -> Result<(), CallError> {
        match self.handlers.get(level) {
            Some(handler) => {
                handler(record);
                Ok(())
            }
            None => Err(CallError::unsupported_level(level)),
        }
    }
}

impl fmt::Debug for LeveledLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut levels: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        levels.sort_unstable();
        f.debug_struct("LeveledLogger")
            .field("levels", &levels)
            .finish()
    }
}

/// A sink bridging records into the `tracing` ecosystem.
///
/// Supports the five standard `tracing` levels (`trace`, `debug`, `info`,
/// `warn`, `error`); any other level is a configuration error.
///
/// # Examples
///
/// ```
/// use instrument_core::TracingLogger;
///
/// let sink = TracingLogger;
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl LoggerSink for TracingLogger {
    fn emit(&self, level: &str, record: &LogRecord) -> Result<(), CallError> {
        let payload = record.to_value();
        match level {
            "trace" => tracing::trace!(
                service = %record.service,
                method = %record.method,
                record = %payload,
                "instrumented call"
            ),
            "debug" => tracing::debug!(
                service = %record.service,
                method = %record.method,
                record = %payload,
                "instrumented call"
            ),
            "info" => tracing::info!(
                service = %record.service,
                method = %record.method,
                record = %payload,
                "instrumented call"
            ),
            "warn" => tracing::warn!(
                service = %record.service,
                method = %record.method,
                record = %payload,
                "instrumented call"
            ),
            "error" => tracing::error!(
                service = %record.service,
                method = %record.method,
                record = %payload,
                "instrumented call"
            ),
            other => return Err(CallError::unsupported_level(other)),
        }
        Ok(())
    }
}

/// A sink that collects emitted records in memory (for tests and demos).
///
/// Accepts every level and stores `(level, record)` pairs in emission order.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use instrument_core::CollectingLogger;
///
/// let sink = Arc::new(CollectingLogger::new());
/// assert!(sink.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct CollectingLogger {
    records: Mutex<Vec<(String, LogRecord)>>,
}

impl CollectingLogger {
    /// Creates an empty collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of collected records.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if nothing has been emitted.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Provides borrowed access to the collected records via callback.
    pub fn with_records<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[(String, LogRecord)]) -> R,
    {
        f(&self.lock())
    }

    /// Returns a snapshot of the collected records.
    pub fn snapshot(&self) -> Vec<(String, LogRecord)> {
        self.lock().clone()
    }

    /// Consumes the sink and returns the collected records.
    pub fn into_records(self) -> Vec<(String, LogRecord)> {
        self.records
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, LogRecord)>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl LoggerSink for CollectingLogger {
    fn emit(&self, level: &str, record: &LogRecord) -> Result<(), CallError> {
        self.lock().push((level.to_string(), record.clone()));
        Ok(())
    }
}
