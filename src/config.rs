use std::fmt;

use crate::benchmark::{Benchmark, WallClock};
use crate::error::CallError;
use crate::level::LevelSpec;
use crate::sanitize::{ErrorSanitizer, ValueSanitizer};
use crate::sink::LoggerSink;

use serde_json::Value;

/// Duplicate-suppression policy for errors crossing nested instrumented calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupPolicy {
    /// Log each error instance once, at its innermost instrumented frame;
    /// outer layers re-throw silently.
    Deepest,
}

impl fmt::Display for DedupPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deepest => write!(f, "deepest"),
        }
    }
}

/// Immutable configuration for a wrapped function.
///
/// Supplied once via [`ConfigBuilder`] and shared for the lifetime of every
/// function the owning [`Decorator`](crate::Decorator) wraps. The builder is
/// the validation step the per-call path relies on: required sanitizers and
/// the logger are checked up front, so the hot path never has to.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use instrument_core::{sanitize, CollectingLogger, Config};
///
/// let sink = Arc::new(CollectingLogger::new());
/// let config = Config::builder("billing")
///     .level("info")
///     .params_sanitizer(sanitize::redact_all())
///     .result_sanitizer(sanitize::passthrough())
///     .error_sanitizer(sanitize::error_message())
///     .logger(sink)
///     .build()
///     .expect("complete configuration");
///
/// assert_eq!(config.service_name(), "billing");
/// ```
pub struct Config {
    pub(crate) service_name: String,
    pub(crate) level: Option<LevelSpec>,
    pub(crate) error_level: LevelSpec,
    pub(crate) errors_only: bool,
    pub(crate) log_errors: Option<DedupPolicy>,
    pub(crate) allow_reentry: bool,
    pub(crate) params_sanitizer: ValueSanitizer,
    pub(crate) result_sanitizer: ValueSanitizer,
    pub(crate) error_sanitizer: ErrorSanitizer,
    pub(crate) context_sanitizer: Option<ValueSanitizer>,
    pub(crate) timestamp: bool,
    pub(crate) logger: Box<dyn LoggerSink>,
    pub(crate) benchmark: Box<dyn Benchmark>,
}

impl Config {
    /// Starts building a configuration for the given service.
    pub fn builder(service_name: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder {
            service_name: service_name.into(),
            level: None,
            error_level: None,
            errors_only: false,
            log_errors: None,
            allow_reentry: false,
            params_sanitizer: None,
            result_sanitizer: None,
            error_sanitizer: None,
            context_sanitizer: None,
            timestamp: false,
            logger: None,
            benchmark: None,
        }
    }

    /// Returns the service identifier included in every record.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Returns `true` when success logging is suppressed entirely.
    pub fn errors_only(&self) -> bool {
        self.errors_only
    }

    /// Returns the duplicate-suppression policy, if one is set.
    pub fn log_errors(&self) -> Option<DedupPolicy> {
        self.log_errors
    }

    /// Returns `true` when wrapping an already-instrumented function wraps
    /// it again instead of returning it unchanged.
    pub fn allow_reentry(&self) -> bool {
        self.allow_reentry
    }

    /// Returns `true` when records carry an ISO-8601 timestamp.
    pub fn timestamp(&self) -> bool {
        self.timestamp
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("service_name", &self.service_name)
            .field("level", &self.level)
            .field("error_level", &self.error_level)
            .field("errors_only", &self.errors_only)
            .field("log_errors", &self.log_errors)
            .field("allow_reentry", &self.allow_reentry)
            .field("context_sanitizer", &self.context_sanitizer.is_some())
            .field("timestamp", &self.timestamp)
            .finish_non_exhaustive()
    }
}

/// Builder validating and defaulting a [`Config`].
///
/// Required pieces: the three sanitizers (`params`, `result`, `error`) and
/// the logger sink. Defaults: error level `"error"`, [`WallClock`] as the
/// benchmark source, everything else off.
pub struct ConfigBuilder {
    service_name: String,
    level: Option<LevelSpec>,
    error_level: Option<LevelSpec>,
    errors_only: bool,
    log_errors: Option<DedupPolicy>,
    allow_reentry: bool,
    params_sanitizer: Option<ValueSanitizer>,
    result_sanitizer: Option<ValueSanitizer>,
    error_sanitizer: Option<ErrorSanitizer>,
    context_sanitizer: Option<ValueSanitizer>,
    timestamp: bool,
    logger: Option<Box<dyn LoggerSink>>,
    benchmark: Option<Box<dyn Benchmark>>,
}

impl ConfigBuilder {
    /// Sets the level used on success. Success is logged only when set.
    pub fn level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.level = Some(level.into());
        self
    }

    /// Sets the level used on failure (default: literal `"error"`).
    pub fn error_level(mut self, level: impl Into<LevelSpec>) -> Self {
        self.error_level = Some(level.into());
        self
    }

    /// Suppresses success logging entirely.
    pub fn errors_only(mut self, errors_only: bool) -> Self {
        self.errors_only = errors_only;
        self
    }

    /// Sets the duplicate-suppression policy for nested instrumented calls.
    pub fn log_errors(mut self, policy: DedupPolicy) -> Self {
        self.log_errors = Some(policy);
        self
    }

    /// Allows re-wrapping a function that is already instrumented.
    pub fn allow_reentry(mut self, allow: bool) -> Self {
        self.allow_reentry = allow;
        self
    }

    /// Sets the sanitizer applied to raw call arguments. Required.
    pub fn params_sanitizer(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.params_sanitizer = Some(Box::new(f));
        self
    }

    /// Sets the sanitizer applied to the raw result. Required.
    pub fn result_sanitizer(mut self, f: impl Fn(&Value) -> Value + Send + Sync + 'static) -> Self {
        self.result_sanitizer = Some(Box::new(f));
        self
    }

    /// Sets the sanitizer applied to the thrown error. Required.
    pub fn error_sanitizer(
        mut self,
        f: impl Fn(&CallError) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.error_sanitizer = Some(Box::new(f));
        self
    }

    /// Sets the sanitizer applied to call context. Optional: without it the
    /// `context` field is suppressed even when context is present.
    pub fn context_sanitizer(
        mut self,
        f: impl Fn(&Value) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.context_sanitizer = Some(Box::new(f));
        self
    }

    /// Includes an ISO-8601 timestamp in each record, captured at
    /// record-build time.
    pub fn timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Sets the logger sink records are emitted to. Required.
    pub fn logger(mut self, sink: impl LoggerSink + 'static) -> Self {
        self.logger = Some(Box::new(sink));
        self
    }

    /// Sets the benchmark source (default: [`WallClock`]).
    pub fn benchmark(mut self, source: impl Benchmark + 'static) -> Self {
        self.benchmark = Some(Box::new(source));
        self
    }

    /// Validates the accumulated options and produces a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when the service name is empty or a
    /// required sanitizer or the logger is missing.
    pub fn build(self) -> Result<Config, ConfigError> {
        if self.service_name.trim().is_empty() {
            return Err(ConfigError::new(
                ConfigErrorKind::EmptyServiceName,
                "service name must not be empty",
            ));
        }

        let params_sanitizer = self.params_sanitizer.ok_or_else(|| {
            ConfigError::new(
                ConfigErrorKind::MissingSanitizer { field: "params" },
                "params sanitizer is required",
            )
        })?;
        let result_sanitizer = self.result_sanitizer.ok_or_else(|| {
            ConfigError::new(
                ConfigErrorKind::MissingSanitizer { field: "result" },
                "result sanitizer is required",
            )
        })?;
        let error_sanitizer = self.error_sanitizer.ok_or_else(|| {
            ConfigError::new(
                ConfigErrorKind::MissingSanitizer { field: "error" },
                "error sanitizer is required",
            )
        })?;
        let logger = self.logger.ok_or_else(|| {
            ConfigError::new(ConfigErrorKind::MissingLogger, "logger sink is required")
        })?;

        Ok(Config {
            service_name: self.service_name,
            level: self.level,
            error_level: self.error_level.unwrap_or_else(|| LevelSpec::literal("error")),
            errors_only: self.errors_only,
            log_errors: self.log_errors,
            allow_reentry: self.allow_reentry,
            params_sanitizer,
            result_sanitizer,
            error_sanitizer,
            context_sanitizer: self.context_sanitizer,
            timestamp: self.timestamp,
            logger,
            benchmark: self.benchmark.unwrap_or_else(|| Box::new(WallClock)),
        })
    }
}

/// Error returned when a configuration is incomplete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    kind: ConfigErrorKind,
    message: String,
}

impl ConfigError {
    fn new(kind: ConfigErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> ConfigErrorKind {
        self.kind
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration ({}): {}", self.kind, self.message)
    }
}

impl std::error::Error for ConfigError {}

/// Kind of configuration error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigErrorKind {
    /// The service name is empty or whitespace.
    EmptyServiceName,
    /// A required sanitizer was not supplied.
    MissingSanitizer {
        /// Which sanitizer is missing (`params`, `result`, or `error`).
        field: &'static str,
    },
    /// No logger sink was supplied.
    MissingLogger,
}

impl fmt::Display for ConfigErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyServiceName => write!(f, "empty service name"),
            Self::MissingSanitizer { field } => write!(f, "missing {} sanitizer", field),
            Self::MissingLogger => write!(f, "missing logger"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sanitize;
    use crate::sink::CollectingLogger;

    fn complete_builder() -> ConfigBuilder {
        Config::builder("billing")
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(CollectingLogger::new())
    }

    #[test]
    fn complete_configuration_builds() {
        let config = complete_builder()
            .level("info")
            .timestamp(true)
            .build()
            .expect("should build");

        assert_eq!(config.service_name(), "billing");
        assert!(config.timestamp());
        assert!(!config.errors_only());
        assert!(!config.allow_reentry());
        assert!(config.log_errors().is_none());
    }

    #[test]
    fn error_level_defaults_to_error() {
        let config = complete_builder().build().expect("should build");

        let args = serde_json::json!([]);
        let elapsed = serde_json::json!(null);
        let data = crate::record::CallData {
            args: &args,
            result: None,
            error: None,
            elapsed: &elapsed,
            context: None,
        };
        assert_eq!(config.error_level.resolve(&data), "error");
    }

    #[test]
    fn empty_service_name_is_rejected() {
        let failure = Config::builder("  ")
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(CollectingLogger::new())
            .build()
            .unwrap_err();

        assert_eq!(failure.kind(), ConfigErrorKind::EmptyServiceName);
    }

    #[test]
    fn missing_params_sanitizer_is_rejected() {
        let failure = Config::builder("billing")
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(CollectingLogger::new())
            .build()
            .unwrap_err();

        assert_eq!(
            failure.kind(),
            ConfigErrorKind::MissingSanitizer { field: "params" }
        );
    }

    #[test]
    fn missing_result_sanitizer_is_rejected() {
        let failure = Config::builder("billing")
            .params_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .logger(CollectingLogger::new())
            .build()
            .unwrap_err();

        assert_eq!(
            failure.kind(),
            ConfigErrorKind::MissingSanitizer { field: "result" }
        );
    }

    #[test]
    fn missing_error_sanitizer_is_rejected() {
        let failure = Config::builder("billing")
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .logger(CollectingLogger::new())
            .build()
            .unwrap_err();

        assert_eq!(
            failure.kind(),
            ConfigErrorKind::MissingSanitizer { field: "error" }
        );
    }

    #[test]
    fn missing_logger_is_rejected() {
        let failure = Config::builder("billing")
            .params_sanitizer(sanitize::passthrough())
            .result_sanitizer(sanitize::passthrough())
            .error_sanitizer(sanitize::error_message())
            .build()
            .unwrap_err();

        assert_eq!(failure.kind(), ConfigErrorKind::MissingLogger);
        let output = format!("{}", failure);
        assert!(output.contains("missing logger"));
    }

    #[test]
    fn context_sanitizer_is_optional() {
        let config = complete_builder().build().expect("should build");
        assert!(config.context_sanitizer.is_none());

        let config = complete_builder()
            .context_sanitizer(sanitize::redact_all())
            .build()
            .expect("should build");
        assert!(config.context_sanitizer.is_some());
    }

    #[test]
    fn dedup_policy_displays() {
        assert_eq!(format!("{}", DedupPolicy::Deepest), "deepest");
    }
}
