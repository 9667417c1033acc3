//! Time-remaining queries consulted by the search.
//!
//! A deadline is polled at every recursive entry point; search stops
//! cooperatively once the reported time drops to the agent's safety threshold.

use std::time::{Duration, Instant};

/// Reports how much time is left for the current move request, in
/// milliseconds. Successive calls never report more time than before.
pub trait Deadline {
    fn time_left_ms(&self) -> f64;
}

/// Any `Fn() -> f64` closure works as a deadline, which keeps tests simple
impl<F> Deadline for F
where
    F: Fn() -> f64,
{
    fn time_left_ms(&self) -> f64 {
        self()
    }
}

/// Wall-clock budget that starts counting when created
#[derive(Debug, Clone, Copy)]
pub struct Countdown {
    start: Instant,
    budget: Duration,
}

impl Countdown {
    pub fn new(budget: Duration) -> Self {
        Countdown {
            start: Instant::now(),
            budget,
        }
    }

    pub fn from_millis(budget_ms: u64) -> Self {
        Self::new(Duration::from_millis(budget_ms))
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Deadline for Countdown {
    fn time_left_ms(&self) -> f64 {
        self.budget.as_secs_f64() * 1000.0 - self.start.elapsed().as_secs_f64() * 1000.0
    }
}

/// A deadline that never fires
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeadline;

impl Deadline for NoDeadline {
    fn time_left_ms(&self) -> f64 {
        f64::INFINITY
    }
}
