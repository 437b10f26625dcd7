use std::{
    sync::{Mutex, MutexGuard, PoisonError},
    time::Duration,
};

/// Largest amount of time a single gap between pulses can contribute.
pub const MAX_CREDIT_PER_GAP: Duration = Duration::from_secs(30);

/// Running total of active seconds waiting to be delivered.
///
/// The total only grows through [TimeAccumulator::credit] and [TimeAccumulator::restore] and
/// only shrinks through [TimeAccumulator::drain], which always leaves exactly zero behind. The
/// lock is never held across an await point, so pulses are never blocked by a pending delivery.
#[derive(Debug, Default)]
pub struct TimeAccumulator {
    seconds: Mutex<f64>,
}

impl TimeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, f64> {
        // An f64 can't be left half written, so a poisoned lock still holds a valid total.
        self.seconds.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Credits a gap between two pulses, capped at [MAX_CREDIT_PER_GAP]. Returns the amount of
    /// seconds actually credited.
    pub fn credit(&self, gap: Duration) -> f64 {
        let credited = gap.min(MAX_CREDIT_PER_GAP).as_secs_f64();
        *self.lock() += credited;
        credited
    }

    pub fn total(&self) -> f64 {
        *self.lock()
    }

    /// Takes the whole total, leaving zero behind.
    pub fn drain(&self) -> f64 {
        std::mem::take(&mut *self.lock())
    }

    /// Adds back seconds taken by [TimeAccumulator::drain] that couldn't be delivered. Unlike
    /// [TimeAccumulator::credit] this isn't capped: the amount was already capped per gap.
    pub fn restore(&self, seconds: f64) {
        if seconds.is_finite() && seconds > 0. {
            *self.lock() += seconds;
        }
    }
}
