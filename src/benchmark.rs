use std::any::Any;
use std::fmt;
use std::time::Instant;

use serde_json::Value;

/// An opaque handle representing a call's start time.
///
/// Produced by [`Benchmark::start`] and consumed by [`Benchmark::elapsed`].
/// The decorator never inspects the token; only the benchmark source that
/// created it knows what is inside.
pub struct BenchmarkToken(Box<dyn Any + Send>);

impl BenchmarkToken {
    /// Wraps source-specific start data into an opaque token.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// Recovers the start data, if the token was created with type `T`.
    pub fn take<T: Any>(self) -> Option<T> {
        self.0.downcast().ok().map(|boxed| *boxed)
    }
}

impl fmt::Debug for BenchmarkToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BenchmarkToken").finish()
    }
}

/// Trait for timing sources.
///
/// A benchmark source hands out an opaque start token at call start and
/// later converts it into an elapsed-time representation for the log
/// record. The representation is an arbitrary JSON value; the default
/// [`WallClock`] source renders milliseconds as a string.
pub trait Benchmark: Send + Sync {
    /// Captures a start token for a new call.
    fn start(&self) -> BenchmarkToken;

    /// Converts a start token into an elapsed-time representation.
    fn elapsed(&self, token: BenchmarkToken) -> Value;
}

/// The default wall-clock benchmark source.
///
/// Renders elapsed time as a millisecond string like `"1.234ms"`. A token
/// this source did not create yields `Value::Null` rather than panicking.
///
/// # Examples
///
/// ```
/// use instrument_core::{Benchmark, WallClock};
///
/// let clock = WallClock;
/// let token = clock.start();
/// let elapsed = clock.elapsed(token);
/// assert!(elapsed.as_str().expect("renders a string").ends_with("ms"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct WallClock;

impl Benchmark for WallClock {
    fn start(&self) -> BenchmarkToken {
        BenchmarkToken::new(Instant::now())
    }

    fn elapsed(&self, token: BenchmarkToken) -> Value {
        match token.take::<Instant>() {
            Some(start) => {
                let ms = start.elapsed().as_secs_f64() * 1000.0;
                Value::String(format!("{:.3}ms", ms))
            }
            None => Value::Null,
        }
    }
}
