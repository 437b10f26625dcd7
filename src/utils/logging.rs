use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{fmt, fmt::format::FmtSpan, layer::SubscriberExt, EnvFilter};

pub const LOG_PREFIX: &str = "taskpulse";

/// Installs the global subscriber built by [logging_subscriber].
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let subscriber = logging_subscriber(prefix, application_data_path, log_level, show_std)?;
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Logs always go to a daily rotated file under `application_data_path/logs`, without colours,
/// and to stdout when `show_std` is set. Without an explicit level `RUST_LOG` is used, falling
/// back to `info`.
pub fn logging_subscriber(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<impl Subscriber + Send + Sync + 'static> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(prefix)
        .build(application_data_path.join("logs"))?;

    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()));

    let file = fmt::layer()
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(appender);
    let stdout = show_std.then(|| fmt::layer().with_span_events(FmtSpan::CLOSE));

    Ok(tracing_subscriber::registry()
        .with(EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with(file)
        .with(stdout))
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
