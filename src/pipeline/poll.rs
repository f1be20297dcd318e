// Polling driver: run `tick` on a fixed interval until Ctrl-C.
//
// Remote failures are logged and retried on the next tick (the watermark
// hasn't moved, so nothing is lost). Store failures end the loop: without
// the store the bot can't tell what it already reshared.

use std::time::Duration;

use anyhow::Result;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use super::reshare::{is_store_failure, ReshareCoordinator};

/// Run the polling loop until the process is interrupted or the store fails.
pub async fn run(coordinator: &ReshareCoordinator, poll_interval: Duration) -> Result<()> {
    run_until(coordinator, poll_interval, shutdown_signal()).await
}

/// Run the polling loop until `shutdown` resolves.
pub async fn run_until<F>(
    coordinator: &ReshareCoordinator,
    poll_interval: Duration,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()>,
{
    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    info!(
        trigger = coordinator.classifier().trigger_name(),
        interval_secs = poll_interval.as_secs(),
        "Polling for mentions"
    );

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested, stopping");
                return Ok(());
            }
            _ = interval.tick() => {
                match coordinator.tick().await {
                    Ok(summary) => {
                        if summary.notifications > 0 {
                            info!(
                                notifications = summary.notifications,
                                mentions = summary.mentions,
                                reshared = summary.reshared,
                                skipped = summary.skipped,
                                watermark = %summary.watermark,
                                "Poll complete"
                            );
                        }
                    }
                    Err(e) if is_store_failure(&e) => {
                        error!(error = %format!("{e:#}"), "Store failure, stopping");
                        return Err(e);
                    }
                    Err(e) => {
                        warn!(error = %format!("{e:#}"), "Poll failed, retrying next tick");
                    }
                }
            }
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        // Without a signal handler, run until killed
        std::future::pending::<()>().await;
    }
}
