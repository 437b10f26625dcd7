//! Bridges a host that writes newline delimited JSON to the tracker. Every line is one signal,
//! for example `{"signal":"key_press"}`, `{"signal":"navigate","path":"/tasks"}` or
//! `{"signal":"visibility","visible":false}`.

use anyhow::Result;
use serde::Deserialize;
use tokio::{
    io::{AsyncBufReadExt, AsyncRead, BufReader},
    sync::watch,
};
use tracing::{debug, info, warn};

use crate::tracker::signals::{InteractionKind, SignalSender};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "signal", rename_all = "snake_case")]
pub enum HostSignal {
    KeyPress,
    PointerMove,
    PointerDown,
    Scroll,
    TouchStart,
    Click,
    Visibility { visible: bool },
    Navigate { path: String },
    Unload,
}

impl HostSignal {
    fn interaction(&self) -> Option<InteractionKind> {
        match self {
            HostSignal::KeyPress => Some(InteractionKind::KeyPress),
            HostSignal::PointerMove => Some(InteractionKind::PointerMove),
            HostSignal::PointerDown => Some(InteractionKind::PointerDown),
            HostSignal::Scroll => Some(InteractionKind::Scroll),
            HostSignal::TouchStart => Some(InteractionKind::TouchStart),
            HostSignal::Click => Some(InteractionKind::Click),
            _ => None,
        }
    }
}

/// Reads signals until the input ends or an `unload` signal arrives. Lines that can't be parsed
/// are logged and skipped.
pub async fn forward_signals(
    input: impl AsyncRead + Unpin,
    signals: &SignalSender,
    path: &watch::Sender<String>,
) -> Result<()> {
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let signal = match serde_json::from_str::<HostSignal>(line) {
            Ok(v) => v,
            Err(e) => {
                warn!("Ignoring illegal signal {line}: {e}");
                continue;
            }
        };

        if let Some(kind) = signal.interaction() {
            signals.interaction(kind);
            continue;
        }
        match signal {
            HostSignal::Visibility { visible } => signals.visibility(visible),
            HostSignal::Navigate { path: next } => {
                debug!("Navigated to {next}");
                path.send_replace(next);
            }
            HostSignal::Unload => {
                signals.unload();
                return Ok(());
            }
            _ => {}
        }
    }
    info!("Signal input closed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::Result;
    use tokio::sync::watch;

    use crate::{
        tracker::signals::{signal_channel, InteractionKind, LifecycleKind, SignalKind},
        utils::{clock::DefaultClock, logging::TEST_LOGGING},
    };

    use super::*;

    #[test]
    fn test_parse_signals() {
        let parse = |s: &str| serde_json::from_str::<HostSignal>(s).unwrap();
        assert_eq!(parse(r#"{"signal":"touch_start"}"#), HostSignal::TouchStart);
        assert_eq!(
            parse(r#"{"signal":"visibility","visible":false}"#),
            HostSignal::Visibility { visible: false }
        );
        assert_eq!(
            parse(r#"{"signal":"navigate","path":"/tasks"}"#),
            HostSignal::Navigate {
                path: "/tasks".into()
            }
        );
        assert!(serde_json::from_str::<HostSignal>(r#"{"signal":"wheel"}"#).is_err());
    }

    #[tokio::test]
    async fn test_forward_signals() -> Result<()> {
        *TEST_LOGGING;
        let input = "{\"signal\":\"key_press\"}\n\
                     not json\n\
                     \n\
                     {\"signal\":\"navigate\",\"path\":\"/reports\"}\n\
                     {\"signal\":\"visibility\",\"visible\":true}\n";
        let (signals, mut receiver) = signal_channel(Arc::new(DefaultClock));
        let (path, path_rx) = watch::channel("/".to_string());

        forward_signals(input.as_bytes(), &signals, &path).await?;

        assert_eq!(
            receiver.recv().await.map(|s| s.kind),
            Some(SignalKind::Interaction(InteractionKind::KeyPress))
        );
        assert_eq!(
            receiver.recv().await.map(|s| s.kind),
            Some(SignalKind::Lifecycle(LifecycleKind::Visible))
        );
        assert!(receiver.try_recv().is_err());
        assert_eq!(*path_rx.borrow(), "/reports");
        Ok(())
    }

    #[tokio::test]
    async fn test_unload_stops_reading() -> Result<()> {
        *TEST_LOGGING;
        let input = "{\"signal\":\"unload\"}\n{\"signal\":\"click\"}\n";
        let (signals, mut receiver) = signal_channel(Arc::new(DefaultClock));
        let (path, _path_rx) = watch::channel("/".to_string());

        forward_signals(input.as_bytes(), &signals, &path).await?;

        assert_eq!(
            receiver.recv().await.map(|s| s.kind),
            Some(SignalKind::Lifecycle(LifecycleKind::Unload))
        );
        assert!(receiver.try_recv().is_err());
        Ok(())
    }
}
