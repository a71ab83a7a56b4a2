use std::sync::Arc;

use actix_web::dev::ServerHandle;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::JobScheduler;
use tracing::{error, info};

use crate::worker::CycleRunner;

/// Handles graceful shutdown of the application
///
/// This module orchestrates graceful shutdown by:
/// 1. Listening for shutdown signals (SIGTERM, SIGINT/CTRL+C)
/// 2. Stopping the HTTP server (stops accepting new requests)
/// 3. Signaling the scheduler to stop firing cycles
/// 4. Waiting for a cycle in progress to complete
/// 5. Flushing the seen store one last time
pub struct ShutdownCoordinator {
    server_handle: ServerHandle,
    server_task: JoinHandle<Result<(), std::io::Error>>,
    scheduler: JobScheduler,
    runner: Arc<CycleRunner>,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator
    pub fn new(
        server_handle: ServerHandle,
        server_task: JoinHandle<Result<(), std::io::Error>>,
        scheduler: JobScheduler,
        runner: Arc<CycleRunner>,
    ) -> Self {
        Self {
            server_handle,
            server_task,
            scheduler,
            runner,
        }
    }

    /// Wait for shutdown signal and perform graceful shutdown
    ///
    /// Blocks until CTRL+C or (on Unix) SIGTERM is received.
    pub async fn wait_for_shutdown(self) -> Result<(), std::io::Error> {
        let ctrl_c = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for CTRL+C: {:?}", e);
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let terminate = async {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut signal) => {
                    signal.recv().await;
                }
                Err(e) => {
                    error!("Failed to install SIGTERM signal handler: {:?}", e);
                    std::future::pending::<()>().await;
                }
            }
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received CTRL+C signal, initiating graceful shutdown...");
            }
            _ = terminate => {
                info!("Received SIGTERM signal, initiating graceful shutdown...");
            }
        }

        self.shutdown().await
    }

    /// Perform the actual shutdown sequence
    async fn shutdown(mut self) -> Result<(), std::io::Error> {
        // 1. Stop HTTP server; an in-flight /trigger finishes its cycle first
        info!("Stopping HTTP server (no longer accepting new requests)...");
        self.server_handle.stop(true).await;
        info!("HTTP server stopped accepting new requests");

        // 2. Stop the scheduler firing new ticks
        info!("Stopping scheduler...");
        match self.scheduler.shutdown().await {
            Ok(()) => info!("Scheduler stopped"),
            Err(e) => error!("Scheduler failed to stop: {:?}", e),
        }

        // 3. Let a cycle already in progress complete
        self.runner.wait_idle().await;
        info!("No cycle in progress");

        // 4. Wait for HTTP server task to complete
        match self.server_task.await {
            Ok(Ok(_)) => info!("HTTP server shut down successfully"),
            Ok(Err(e)) => error!("HTTP server encountered error during shutdown: {:?}", e),
            Err(e) => error!("HTTP server task panicked: {:?}", e),
        }

        // 5. Final flush of the seen store
        match self.runner.flush().await {
            Ok(()) => info!("Saved {} seen job(s)", self.runner.total_seen()),
            Err(e) => error!("Failed to save seen jobs on shutdown: {}", e),
        }

        info!("Graceful shutdown completed successfully");
        Ok(())
    }
}
