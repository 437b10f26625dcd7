use std::{
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
    time::Duration,
};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::{ActivityClient, ActivityPayload};

use super::accumulator::TimeAccumulator;

pub const SYNC_INTERVAL: Duration = Duration::from_secs(30);

const BACKLOG_WARN_INTERVALS: u64 = 10;

/// Once this many undelivered seconds pile up, every failed flush is reported as a growing
/// backlog. Nothing is dropped, retries continue on every trigger.
pub const BACKLOG_WARN_SECONDS: f64 = (BACKLOG_WARN_INTERVALS * SYNC_INTERVAL.as_secs()) as f64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    Timer,
    PageHidden,
    Teardown,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FlushOutcome {
    /// Nothing was accumulated, no request was made.
    Empty,
    Delivered { duration_seconds: u64 },
    /// Delivery failed and the drained seconds were put back.
    Failed { restored: f64 },
}

/// Packages accumulated seconds into payloads and hands them to the [ActivityClient].
///
/// A flush drains the accumulator before the request and puts the amount back if the request
/// fails, so flushes may overlap with each other and with new pulses without losing or
/// duplicating seconds.
pub struct SyncDispatcher {
    client: Arc<dyn ActivityClient>,
    accumulator: Arc<TimeAccumulator>,
    path: watch::Receiver<String>,
    consecutive_failures: AtomicU32,
}

impl SyncDispatcher {
    pub fn new(
        client: Arc<dyn ActivityClient>,
        accumulator: Arc<TimeAccumulator>,
        path: watch::Receiver<String>,
    ) -> Self {
        Self {
            client,
            accumulator,
            path,
            consecutive_failures: AtomicU32::new(0),
        }
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures.load(Ordering::Relaxed)
    }

    pub async fn flush(&self, trigger: FlushTrigger) -> FlushOutcome {
        let drained = self.accumulator.drain();
        if drained <= 0. {
            debug!("Nothing to flush on {trigger:?}");
            return FlushOutcome::Empty;
        }

        let payload = ActivityPayload::for_page(&self.path.borrow(), drained);
        let duration_seconds = payload.duration_seconds;
        debug!("Flushing {payload:?} on {trigger:?}");

        match self.client.post_activity(payload).await {
            Ok(()) => {
                self.consecutive_failures.store(0, Ordering::Relaxed);
                info!("Delivered {duration_seconds}s of activity");
                FlushOutcome::Delivered { duration_seconds }
            }
            Err(e) => {
                self.accumulator.restore(drained);
                let failures = self.consecutive_failures.fetch_add(1, Ordering::Relaxed) + 1;
                warn!("Failed to deliver {drained:.1}s of activity ({failures} in a row): {e}");

                let backlog = self.accumulator.total();
                if backlog > BACKLOG_WARN_SECONDS {
                    warn!("{backlog:.0}s of activity are waiting for delivery");
                }
                FlushOutcome::Failed { restored: drained }
            }
        }
    }
}
