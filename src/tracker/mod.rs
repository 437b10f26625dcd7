//! The activity tracker. [ActivityTracker::start] spawns an agent that owns the state machine,
//! the sync timer and every in-flight delivery; the returned [TrackerHandle] feeds it signals
//! and tears it down.
//!
//! ```text
//! host signals -> SignalSender -> agent -> ActivityStateMachine -> TimeAccumulator
//!                                   |                                    |
//!                              sync timer / page hidden / stop -> SyncDispatcher -> backend
//! ```

pub mod accumulator;
pub mod dispatcher;
pub mod signals;
pub mod state;

use std::{ops::ControlFlow, sync::Arc};

use accumulator::TimeAccumulator;
use anyhow::Result;
use dispatcher::{FlushOutcome, FlushTrigger, SyncDispatcher, SYNC_INTERVAL};
use signals::{normalize, signal_channel, Signal, SignalSender, TrackerEvent};
use state::ActivityStateMachine;
use tokio::{
    sync::{mpsc, watch},
    task::{JoinHandle, JoinSet},
};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, error, info, info_span, trace, Instrument};

use crate::{
    api::ActivityClient,
    utils::clock::{Clock, DefaultClock},
};

/// Configures and starts tracking. Nothing happens until [ActivityTracker::start] is called.
pub struct ActivityTracker {
    client: Arc<dyn ActivityClient>,
    path: watch::Receiver<String>,
    clock: Arc<dyn Clock>,
}

impl ActivityTracker {
    /// `path` carries the current navigation path, read at the moment of every flush.
    pub fn new(client: Arc<dyn ActivityClient>, path: watch::Receiver<String>) -> Self {
        Self {
            client,
            path,
            clock: Arc::new(DefaultClock),
        }
    }

    pub fn with_clock(self, clock: impl Clock) -> Self {
        Self {
            clock: Arc::new(clock),
            ..self
        }
    }

    /// Spawns the tracking agent on the current tokio runtime.
    pub fn start(self) -> TrackerHandle {
        let (signals, receiver) = signal_channel(self.clock.clone());
        let accumulator = Arc::new(TimeAccumulator::new());
        let shutdown = CancellationToken::new();

        let agent = TrackerAgent {
            receiver,
            machine: ActivityStateMachine::new(self.clock.instant()),
            accumulator: accumulator.clone(),
            dispatcher: Arc::new(SyncDispatcher::new(
                self.client,
                accumulator.clone(),
                self.path,
            )),
            clock: self.clock,
            shutdown: shutdown.clone(),
            in_flight: JoinSet::new(),
        };
        info!("Activity tracking enabled");

        TrackerHandle {
            signals,
            accumulator,
            agent: tokio::spawn(agent.run()),
            shutdown: shutdown.drop_guard(),
        }
    }
}

/// Owns a running tracker. Dropping the handle stops the agent as well, but only
/// [TrackerHandle::stop] waits for the final flush to be attempted.
pub struct TrackerHandle {
    signals: SignalSender,
    accumulator: Arc<TimeAccumulator>,
    agent: JoinHandle<()>,
    shutdown: DropGuard,
}

impl TrackerHandle {
    pub fn signals(&self) -> SignalSender {
        self.signals.clone()
    }

    /// Seconds credited but not yet delivered.
    pub fn accumulated_seconds(&self) -> f64 {
        self.accumulator.total()
    }

    /// Stops listening, cancels the timer and attempts a last flush. Deliveries that were
    /// already in flight are left to finish on their own.
    pub async fn stop(self) -> Result<()> {
        let TrackerHandle {
            agent, shutdown, ..
        } = self;
        shutdown.disarm().cancel();
        agent.await?;
        Ok(())
    }
}

struct TrackerAgent {
    receiver: mpsc::UnboundedReceiver<Signal>,
    machine: ActivityStateMachine,
    accumulator: Arc<TimeAccumulator>,
    dispatcher: Arc<SyncDispatcher>,
    clock: Arc<dyn Clock>,
    shutdown: CancellationToken,
    in_flight: JoinSet<FlushOutcome>,
}

impl TrackerAgent {
    async fn run(mut self) {
        let mut sync_point = self.clock.instant() + SYNC_INTERVAL;
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                signal = self.receiver.recv() => {
                    let Some(signal) = signal else { break };
                    if self.handle_signal(signal).is_break() {
                        break;
                    }
                }
                _ = self.clock.sleep_until(sync_point) => {
                    sync_point += SYNC_INTERVAL;
                    self.spawn_flush(FlushTrigger::Timer);
                }
                Some(joined) = self.in_flight.join_next() => {
                    match joined {
                        Ok(outcome) => trace!("Flush finished with {outcome:?}"),
                        Err(e) => error!("Flush task failed {e:?}"),
                    }
                }
            }
        }
        self.teardown().await;
    }

    fn handle_signal(&mut self, signal: Signal) -> ControlFlow<()> {
        match normalize(signal) {
            TrackerEvent::Pulse(at) => {
                if let Some(gap) = self.machine.pulse(at) {
                    let credited = self.accumulator.credit(gap);
                    trace!("Credited {credited:.3}s for {:?}", signal.kind);
                }
            }
            TrackerEvent::PageHidden => {
                debug!("Page hidden, pausing");
                self.machine.page_hidden();
                self.spawn_flush(FlushTrigger::PageHidden);
            }
            TrackerEvent::PageVisible(at) => {
                debug!("Page visible, re-arming");
                self.machine.page_visible(at);
            }
            TrackerEvent::Unload => {
                debug!("Page unloading");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    fn spawn_flush(&mut self, trigger: FlushTrigger) {
        let dispatcher = self.dispatcher.clone();
        let span = info_span!("flush", ?trigger);
        self.in_flight
            .spawn(async move { dispatcher.flush(trigger).await }.instrument(span));
    }

    async fn teardown(mut self) {
        // Signals sent before the stop still count, whichever select branch won.
        self.receiver.close();
        while let Ok(signal) = self.receiver.try_recv() {
            let _ = self.handle_signal(signal);
        }
        self.in_flight.detach_all();

        let span = info_span!("flush", trigger = ?FlushTrigger::Teardown);
        let outcome = self
            .dispatcher
            .flush(FlushTrigger::Teardown)
            .instrument(span)
            .await;
        info!("Activity tracking disabled, last flush {outcome:?}");
    }
}
