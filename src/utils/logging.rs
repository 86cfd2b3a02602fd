use log::{Level, log_enabled, warn};
use std::time::{Duration, Instant};

/// Simple scoped timer for profiling critical sections.
///
/// Logs at trace level and adds the elapsed time to a [`Duration`] slot,
/// which is how the world fills its step profile.
pub struct ScopedTimer<'a> {
    label: &'a str,
    start: Instant,
    output: &'a mut Duration,
}

impl<'a> ScopedTimer<'a> {
    pub fn accumulate(label: &'a str, output: &'a mut Duration) -> Self {
        if log_enabled!(Level::Trace) {
            log::trace!("⏱️ start {label}");
        }
        Self {
            label,
            start: Instant::now(),
            output,
        }
    }
}

impl<'a> Drop for ScopedTimer<'a> {
    fn drop(&mut self) {
        let elapsed = self.start.elapsed();
        *self.output += elapsed;
        if log_enabled!(Level::Trace) {
            log::trace!("⏱️ end {} ({} µs)", self.label, elapsed.as_micros());
        }
    }
}

/// Registers a warning when a world step exceeds its budget.
pub fn warn_if_frame_budget_exceeded(duration: Duration, budget_ms: f32) -> bool {
    let elapsed_ms = duration.as_secs_f32() * 1000.0;
    if elapsed_ms > budget_ms {
        warn!("Physics step exceeded budget: {elapsed_ms:.2} ms > {budget_ms:.2} ms");
        return true;
    }
    false
}
