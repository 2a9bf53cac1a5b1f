use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Error surfaced by an instrumented call.
///
/// `CallError` is shared by reference: cloning it produces another handle to
/// the same underlying error instance, so identity survives propagation
/// through nested instrumented layers. Identity can be checked with
/// [`same_instance()`](Self::same_instance).
///
/// The error also carries the hidden "already logged" marker used by the
/// deepest duplicate-suppression policy. The marker is not part of the
/// `Debug` output and is never cleared once set.
///
/// # Examples
///
/// ```
/// use instrument_core::{CallError, CallErrorKind};
///
/// let error = CallError::msg("connection refused");
/// assert_eq!(error.kind(), CallErrorKind::Wrapped);
/// assert_eq!(error.to_string(), "connection refused");
///
/// // Clones share identity with the original
/// let propagated = error.clone();
/// assert!(error.same_instance(&propagated));
/// ```
#[derive(Clone)]
pub struct CallError {
    inner: Arc<Inner>,
}

struct Inner {
    kind: CallErrorKind,
    message: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
    logged: AtomicBool,
}

impl CallError {
    /// Wraps an error raised by the instrumented function.
    ///
    /// The message and source are preserved untouched; the wrapper only adds
    /// shared identity and the suppression marker.
    ///
    /// # Examples
    ///
    /// ```
    /// use instrument_core::CallError;
    ///
    /// let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
    /// let error = CallError::wrap(io);
    /// assert_eq!(error.to_string(), "disk full");
    /// ```
    pub fn wrap(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind: CallErrorKind::Wrapped,
                message: source.to_string(),
                source: Some(Box::new(source)),
                logged: AtomicBool::new(false),
            }),
        }
    }

    /// Creates a wrapped-call error from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind: CallErrorKind::Wrapped,
                message: message.into(),
                source: None,
                logged: AtomicBool::new(false),
            }),
        }
    }

    /// Creates the configuration error raised when a logger sink has no
    /// emission path for a resolved level.
    ///
    /// Logger sink implementations return this from
    /// [`emit()`](crate::LoggerSink::emit) when asked for a level they do
    /// not support. It indicates misconfiguration, not a call failure, and
    /// is never itself logged.
    pub fn unsupported_level(level: &str) -> Self {
        Self {
            inner: Arc::new(Inner {
                kind: CallErrorKind::UnsupportedLevel,
                message: format!("logger does not support '{}' level", level),
                source: None,
                logged: AtomicBool::new(false),
            }),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> CallErrorKind {
        self.inner.kind
    }

    /// Returns `true` if `self` and `other` are handles to the same
    /// underlying error instance.
    pub fn same_instance(&self, other: &CallError) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Marks this error instance as logged. Idempotent, never cleared.
    pub(crate) fn mark_logged(&self) {
        self.inner.logged.store(true, Ordering::Release);
    }

    /// Returns `true` if some instrumented layer already logged this
    /// instance under the deepest policy.
    pub(crate) fn is_logged(&self) -> bool {
        self.inner.logged.load(Ordering::Acquire)
    }
}

impl fmt::Display for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.message)
    }
}

// Manual impl: the suppression marker stays out of the Debug output.
impl fmt::Debug for CallError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallError")
            .field("kind", &self.inner.kind)
            .field("message", &self.inner.message)
            .finish()
    }
}

impl std::error::Error for CallError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Kind of call error.
///
/// Distinguishes failures of the wrapped function from configuration errors
/// raised by the log-emission step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallErrorKind {
    /// The wrapped function failed; the original error is carried untouched.
    Wrapped,
    /// The resolved log level has no emission path on the logger sink.
    UnsupportedLevel,
}

impl fmt::Display for CallErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wrapped => write!(f, "wrapped call failure"),
            Self::UnsupportedLevel => write!(f, "unsupported level"),
        }
    }
}
