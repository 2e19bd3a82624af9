//! Simple time helpers used by multiple services.

use std::time::Instant;

/// Monotonic timer for `dur_ms` log fields.
#[derive(Copy, Clone, Debug)]
pub struct Stopwatch(Instant);

impl Stopwatch {
    pub fn start() -> Self {
        Self(Instant::now())
    }

    /// Milliseconds since `start`.
    pub fn elapsed_ms(&self) -> u128 {
        self.0.elapsed().as_millis()
    }
}
