use std::fmt;

use crate::record::CallData;

/// A configured log level: a literal value or a resolver over call data.
///
/// A level can be fixed at configuration time, or computed per call from the
/// assembled [`CallData`] (arguments, result or error, elapsed time,
/// context) — for example to escalate slow calls to `warn`. Resolution
/// happens explicitly at each use site via [`resolve()`](Self::resolve).
///
/// # Examples
///
/// ```
/// use instrument_core::LevelSpec;
///
/// // Literal level
/// let level = LevelSpec::literal("info");
///
/// // Level computed from the call data
/// let level = LevelSpec::resolver(|data| {
///     if data.error.is_some() { "error".to_string() } else { "debug".to_string() }
/// });
/// ```
pub enum LevelSpec {
    /// A fixed level used verbatim.
    Literal(String),
    /// A function mapping call data to a level.
    Resolver(Box<dyn Fn(&CallData<'_>) -> String + Send + Sync>),
}

impl LevelSpec {
    /// Creates a literal level.
    pub fn literal(level: impl Into<String>) -> Self {
        Self::Literal(level.into())
    }

    /// Creates a level resolver invoked with the assembled call data.
    pub fn resolver(f: impl Fn(&CallData<'_>) -> String + Send + Sync + 'static) -> Self {
        Self::Resolver(Box::new(f))
    }

    /// Resolves the effective level for a call.
    ///
    /// Literals are used directly; resolvers are invoked with `data` and
    /// their return value is used verbatim.
    pub fn resolve(&self, data: &CallData<'_>) -> String {
        match self {
            Self::Literal(level) => level.clone(),
            Self::Resolver(f) => f(data),
        }
    }
}

impl From<&str> for LevelSpec {
    fn from(level: &str) -> Self {
        Self::Literal(level.to_string())
    }
}

impl From<String> for LevelSpec {
    fn from(level: String) -> Self {
        Self::Literal(level)
    }
}

impl fmt::Debug for LevelSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(level) => f.debug_tuple("Literal").field(level).finish(),
            Self::Resolver(_) => f.debug_tuple("Resolver").field(&"<fn>").finish(),
        }
    }
}
