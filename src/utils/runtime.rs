use std::future::Future;

use anyhow::Result;

/// The tracker is a single cooperative event loop, so one thread is all it needs.
pub fn single_thread_runtime() -> Result<tokio::runtime::Runtime> {
    Ok(tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?)
}

/// Runs `future` to completion on a fresh single threaded runtime. Blocking work still pending
/// afterwards, like a read from stdin, is abandoned instead of keeping the process alive.
pub fn run_single_threaded<F: Future>(future: F) -> Result<F::Output> {
    let runtime = single_thread_runtime()?;
    let output = runtime.block_on(future);
    runtime.shutdown_background();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use anyhow::Result;

    use super::*;

    #[test]
    fn test_pending_blocking_work_does_not_hold_shutdown() -> Result<()> {
        let start = Instant::now();
        let value = run_single_threaded(async {
            let _sleeper = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(30)));
            tokio::task::yield_now().await;
            7
        })?;

        assert_eq!(value, 7);
        assert!(start.elapsed() < Duration::from_secs(10));
        Ok(())
    }
}
