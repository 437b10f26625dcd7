pub mod input;
pub mod shutdown;

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::{info, level_filters::LevelFilter};

use crate::{
    api::http::{ClientConfig, HttpActivityClient},
    context::resolve_page_label,
    tracker::ActivityTracker,
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, LOG_PREFIX},
        runtime::run_single_threaded,
    },
};

#[derive(Parser, Debug)]
#[command(name = "taskpulse", version, long_about = None)]
#[command(about = "Measures active usage time and reports it to the task manager backend")]
pub struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
    #[arg(long = "log-console", global = true, help = "Also print logs to stdout")]
    log_console: bool,
    #[arg(long = "log-filter", global = true)]
    log: Option<LevelFilter>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Track activity from newline delimited JSON signals on stdin")]
    Track {
        #[command(flatten)]
        command: TrackCommand,
    },
    #[command(about = "Print the label reported for a navigation path")]
    Resolve { path: String },
}

#[derive(Parser, Debug)]
pub struct TrackCommand {
    #[arg(long, env = "TASKPULSE_API_BASE_URL", help = "Base url of the backend api")]
    api_base_url: String,
    #[arg(long, env = "TASKPULSE_TOKEN", hide_env_values = true, help = "Bearer token")]
    token: Option<String>,
    #[arg(long, default_value = "/", help = "Navigation path at startup")]
    initial_path: String,
    #[arg(long = "timeout-secs", default_value_t = 10, help = "Timeout of a single delivery")]
    timeout_secs: u64,
}

pub fn run_cli() -> Result<()> {
    let args = Args::parse();

    match args.commands {
        Commands::Resolve { path } => {
            println!("{}", resolve_page_label(&path));
            Ok(())
        }
        Commands::Track { command } => {
            let app_dir = args.dir.map_or_else(create_application_default_path, Ok)?;
            enable_logging(LOG_PREFIX, &app_dir, args.log, args.log_console)?;
            run_single_threaded(track(command))?
        }
    }
}

async fn track(command: TrackCommand) -> Result<()> {
    let client = HttpActivityClient::new(ClientConfig {
        api_base_url: command.api_base_url,
        token: command.token,
        timeout: Duration::from_secs(command.timeout_secs),
    })?;
    info!("Reporting activity to {}", client.endpoint());

    let (path, path_receiver) = watch::channel(command.initial_path);
    let handle = ActivityTracker::new(Arc::new(client), path_receiver).start();
    let signals = handle.signals();

    tokio::select! {
        _ = shutdown::detect_shutdown() => (),
        result = input::forward_signals(tokio::io::stdin(), &signals, &path) => result?,
    }

    handle.stop().await
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_track() {
        let args = Args::parse_from([
            "taskpulse",
            "track",
            "--api-base-url",
            "https://tasks.example.com/api",
            "--initial-path",
            "/tasks",
            "--log-console",
        ]);
        assert!(args.log_console);
        match args.commands {
            Commands::Track { command } => {
                assert_eq!(command.api_base_url, "https://tasks.example.com/api");
                assert_eq!(command.initial_path, "/tasks");
                assert_eq!(command.timeout_secs, 10);
            }
            other => panic!("Unexpected command {other:?}"),
        }
    }
}
