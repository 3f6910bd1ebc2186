//! Per-move wall-clock budget

use std::time::{Duration, Instant};

/// Remaining-time fraction below which the budget counts as spent. The
/// margin leaves head-room to unwind the search stack and hand back a
/// move before an external hard deadline fires.
const TIMEOUT_MARGIN: f64 = 0.01;

/// Deadline controller for a single move search.
///
/// An owned value on the engine rather than process-global state: the
/// search threads it through its recursion explicitly, which keeps a
/// search call pure with respect to its inputs.
#[derive(Clone, Debug)]
pub struct MoveTimer {
    timeout: Duration,
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl MoveTimer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    /// Set the allowed wall-clock budget for the upcoming move
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Restart the clock from zero
    pub fn start(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = Some(Instant::now());
    }

    /// Freeze the clock, keeping the elapsed time
    pub fn stop(&mut self) {
        self.accumulated = self.elapsed();
        self.started_at = None;
    }

    /// Clear the clock without starting it
    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.started_at = None;
    }

    pub fn elapsed(&self) -> Duration {
        match self.started_at {
            Some(started) => self.accumulated + started.elapsed(),
            None => self.accumulated,
        }
    }

    /// Fraction of the budget still unspent, decreasing toward (and
    /// past) zero while the clock runs. A zero timeout reports as fully
    /// spent instead of dividing by zero.
    pub fn percent_of_time_remaining(&self) -> f64 {
        if self.timeout.is_zero() {
            return 0.0;
        }
        let timeout = self.timeout.as_secs_f64();
        (timeout - self.elapsed().as_secs_f64()) / timeout
    }

    /// True once less than 1% of the budget remains
    pub fn is_timed_out(&self) -> bool {
        self.percent_of_time_remaining() < TIMEOUT_MARGIN
    }
}
