//! Phase timing.

use std::time::{Duration, Instant};

use tracing::debug;

/// Measures one pipeline phase and prints its duration when finished.
pub struct Timer {
    name: &'static str,
    start: Instant,
}

impl Timer {
    /// Start timing `name`.
    pub fn start(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }

    /// Print the elapsed time and return it.
    pub fn finish(self) -> Duration {
        let elapsed = self.start.elapsed();
        let secs = elapsed.as_secs_f64();
        if secs >= 60.0 {
            println!("  [{:.1}m] {}", secs / 60.0, self.name);
        } else {
            println!("  [{:.1}s] {}", secs, self.name);
        }
        debug!(phase = self.name, elapsed_ms = elapsed.as_millis() as u64, "phase finished");
        elapsed
    }
}
