use std::future::Future;
use std::time::Duration;

use anyhow::Result;
use tokio::time;
use tracing::{info, warn};

use crate::error::credential_kind;
use crate::reporter;

/// Run `cycle` now, then again `interval` after each cycle finishes, until
/// `shutdown` resolves.
///
/// Each cycle starts with a timestamped `status` line. Failed cycles are
/// logged and the loop keeps going, except for rejected credentials, which end
/// the loop with that error. Shutdown is only observed between cycles.
pub async fn run_poll_loop<F, Fut, S>(
    interval: Duration,
    status: &str,
    shutdown: S,
    mut cycle: F,
) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<()>>,
    S: Future<Output = ()>,
{
    tokio::pin!(shutdown);

    info!("Entering polling loop (interval: {}s). Press Ctrl+C to stop.", interval.as_secs());

    loop {
        reporter::report_status(status);
        if let Err(e) = cycle().await {
            if let Some(kind) = credential_kind(&e) {
                warn!("{kind} was rejected, stopping");
                return Err(e);
            }
            warn!("Poll cycle error: {e:#}");
        }

        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown signal received");
                break;
            }
            _ = time::sleep(interval) => {}
        }
    }

    Ok(())
}

/// Resolves on Ctrl+C. If the handler cannot be installed, never resolves.
pub async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {e}");
        std::future::pending::<()>().await;
    }
}
