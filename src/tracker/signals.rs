//! Every input the tracker understands, and the adapter that reduces them to the few events the
//! state machine cares about.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::{sync::mpsc, time::Instant};
use tracing::trace;

use crate::utils::clock::Clock;

/// Interactions that count as the user doing something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionKind {
    KeyPress,
    PointerMove,
    PointerDown,
    Scroll,
    TouchStart,
    Click,
}

pub const TRACKED_INTERACTIONS: [InteractionKind; 6] = [
    InteractionKind::KeyPress,
    InteractionKind::PointerMove,
    InteractionKind::PointerDown,
    InteractionKind::Scroll,
    InteractionKind::TouchStart,
    InteractionKind::Click,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleKind {
    Hidden,
    Visible,
    Unload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Interaction(InteractionKind),
    Lifecycle(LifecycleKind),
}

/// A raw signal, stamped when the host observed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signal {
    pub kind: SignalKind,
    pub at: Instant,
}

/// What a signal means to the tracker, independent of where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerEvent {
    Pulse(Instant),
    PageHidden,
    PageVisible(Instant),
    Unload,
}

pub fn normalize(signal: Signal) -> TrackerEvent {
    match signal.kind {
        SignalKind::Interaction(_) => TrackerEvent::Pulse(signal.at),
        SignalKind::Lifecycle(LifecycleKind::Hidden) => TrackerEvent::PageHidden,
        SignalKind::Lifecycle(LifecycleKind::Visible) => TrackerEvent::PageVisible(signal.at),
        SignalKind::Lifecycle(LifecycleKind::Unload) => TrackerEvent::Unload,
    }
}

/// Host side of the signal channel. Sending never blocks or fails: once the tracker is gone
/// signals are silently dropped. Clones feed the same tracker, so subscribing twice is harmless.
#[derive(Clone)]
pub struct SignalSender {
    sender: mpsc::UnboundedSender<Signal>,
    clock: Arc<dyn Clock>,
}

pub fn signal_channel(clock: Arc<dyn Clock>) -> (SignalSender, mpsc::UnboundedReceiver<Signal>) {
    let (sender, receiver) = mpsc::unbounded_channel();
    (SignalSender { sender, clock }, receiver)
}

impl SignalSender {
    pub fn send(&self, kind: SignalKind) {
        let signal = Signal {
            kind,
            at: self.clock.instant(),
        };
        if self.sender.send(signal).is_err() {
            trace!("Tracker is stopped, dropping {kind:?}");
        }
    }

    pub fn interaction(&self, kind: InteractionKind) {
        self.send(SignalKind::Interaction(kind));
    }

    pub fn visibility(&self, visible: bool) {
        let kind = if visible {
            LifecycleKind::Visible
        } else {
            LifecycleKind::Hidden
        };
        self.send(SignalKind::Lifecycle(kind));
    }

    pub fn unload(&self) {
        self.send(SignalKind::Lifecycle(LifecycleKind::Unload));
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use tokio::time::Instant;

    use crate::utils::clock::DefaultClock;

    use super::*;

    #[test]
    fn test_all_interactions_are_pulses() {
        let at = Instant::now();
        for kind in TRACKED_INTERACTIONS {
            let signal = Signal {
                kind: SignalKind::Interaction(kind),
                at,
            };
            assert_eq!(normalize(signal), TrackerEvent::Pulse(at));
        }
    }

    #[test]
    fn test_lifecycle_normalization() {
        let at = Instant::now();
        let lifecycle = |kind| Signal {
            kind: SignalKind::Lifecycle(kind),
            at,
        };
        assert_eq!(normalize(lifecycle(LifecycleKind::Hidden)), TrackerEvent::PageHidden);
        assert_eq!(
            normalize(lifecycle(LifecycleKind::Visible)),
            TrackerEvent::PageVisible(at)
        );
        assert_eq!(normalize(lifecycle(LifecycleKind::Unload)), TrackerEvent::Unload);
    }

    #[test]
    fn test_interaction_kind_names() {
        let kind: InteractionKind = serde_json::from_str("\"touch_start\"").unwrap();
        assert_eq!(kind, InteractionKind::TouchStart);
        assert_eq!(
            serde_json::to_string(&InteractionKind::PointerMove).unwrap(),
            "\"pointer_move\""
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_sender_stamps_signals() {
        let (sender, mut receiver) = signal_channel(Arc::new(DefaultClock));
        let start = Instant::now();
        sender.interaction(InteractionKind::Click);
        tokio::time::sleep(Duration::from_secs(3)).await;
        sender.visibility(false);

        let first = receiver.recv().await.unwrap();
        assert_eq!(first.kind, SignalKind::Interaction(InteractionKind::Click));
        assert_eq!(first.at, start);

        let second = receiver.recv().await.unwrap();
        assert_eq!(second.kind, SignalKind::Lifecycle(LifecycleKind::Hidden));
        assert_eq!(second.at, start + Duration::from_secs(3));
    }

    #[test]
    fn test_sending_after_close_is_silent() {
        let (sender, receiver) = signal_channel(Arc::new(DefaultClock));
        drop(receiver);
        assert!(sender.is_closed());
        sender.unload();
    }
}
