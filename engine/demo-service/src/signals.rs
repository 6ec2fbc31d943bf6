//! Signal handling for graceful shutdown

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

use crate::service::DemoService;

/// Setup signal handlers for graceful shutdown
pub fn setup_signal_handlers() -> Result<oneshot::Receiver<()>> {
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    #[cfg(unix)]
    let shutdown_flag = {
        use signal_hook::consts::SIGTERM;
        use std::sync::atomic::AtomicBool;

        let flag = Arc::new(AtomicBool::new(false));
        signal_hook::flag::register(SIGTERM, flag.clone())?;
        flag
    };

    tokio::spawn(async move {
        #[cfg(unix)]
        let sigterm = async {
            use std::sync::atomic::Ordering;

            // Poll for signal
            while !shutdown_flag.load(Ordering::Relaxed) {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
        };
        #[cfg(not(unix))]
        let sigterm = std::future::pending::<()>();

        tokio::select! {
            result = tokio::signal::ctrl_c() => match result {
                Ok(()) => info!("Ctrl+C signal received"),
                Err(e) => {
                    error!("Failed to listen for Ctrl+C signal: {}", e);
                    return;
                }
            },
            _ = sigterm => info!("SIGTERM signal received"),
        }

        let _ = shutdown_tx.send(());
    });

    Ok(shutdown_rx)
}

/// Graceful shutdown handler
pub async fn graceful_shutdown(
    service: Arc<DemoService>,
    logger_handle: JoinHandle<()>,
    command_handle: Option<JoinHandle<()>>,
) -> Result<()> {
    info!("Starting graceful shutdown...");

    // Stop the simulator first so the final snapshot is stable
    service.stop();
    info!(metrics = ?service.snapshot(), "MetricSimulator stopped");

    let shutdown_timeout = Duration::from_secs(service.config.service.shutdown_timeout_secs);
    match timeout(shutdown_timeout, logger_handle).await {
        Ok(Ok(())) => info!("Snapshot logger stopped gracefully"),
        Ok(Err(e)) => error!("Snapshot logger task failed: {}", e),
        Err(_) => warn!("Snapshot logger did not stop within timeout, forcing shutdown"),
    }

    if let Some(handle) = command_handle {
        match timeout(shutdown_timeout, handle).await {
            Ok(Ok(())) => info!("Command reader stopped gracefully"),
            Ok(Err(e)) => error!("Command reader task failed: {}", e),
            Err(_) => warn!("Command reader did not stop within timeout, forcing shutdown"),
        }
    }

    info!("Graceful shutdown complete");
    Ok(())
}
