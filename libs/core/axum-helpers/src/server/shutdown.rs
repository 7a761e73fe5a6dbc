use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

/// Shared shutdown flag.
///
/// One task waits for SIGINT/SIGTERM and flips the flag; any number of
/// clones can await [`ShutdownCoordinator::wait_for_shutdown`].
#[derive(Clone)]
pub struct ShutdownCoordinator {
    tx: Arc<watch::Sender<bool>>,
    initiated: Arc<AtomicBool>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            initiated: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_shutting_down(&self) -> bool {
        self.initiated.load(Ordering::Acquire)
    }

    /// Idempotent; only the first call logs and notifies.
    pub fn shutdown(&self) {
        if self
            .initiated
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            info!("Initiating graceful shutdown");
            self.tx.send_replace(true);
        }
    }

    /// Resolve once [`shutdown`](Self::shutdown) has been called, even if
    /// that happened before this was awaited.
    pub async fn wait_for_shutdown(&self) {
        let mut rx = self.tx.subscribe();
        // Sender lives in self, so this only errors if it was dropped
        let _ = rx.wait_for(|stopped| *stopped).await;
    }

    /// Block until a termination signal arrives, then trigger shutdown.
    pub async fn wait_for_signal(&self) {
        shutdown_signal().await;
        self.shutdown();
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolve on Ctrl+C or SIGTERM. If a handler cannot be installed that
/// branch never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down gracefully"),
        _ = terminate => info!("Received SIGTERM, shutting down gracefully"),
    }
}
