//! Graceful shutdown
//!
//! The store connection is released exactly once, from a task the embedder
//! owns, instead of from process-wide signal handlers installed at
//! construction time.

use crate::feature_cache::FeatureCache;
use crate::traits::CacheProvider;
use cache_system::HashStore;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Resolves when the process receives SIGINT or (on unix) SIGTERM.
///
/// If a handler cannot be installed the failure is logged and that signal
/// is simply never observed.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received SIGINT"),
        _ = terminate => tracing::info!("Received SIGTERM"),
    }
}

impl<S: HashStore + 'static> FeatureCache<S> {
    /// Disconnect from the store once `shutdown` resolves.
    ///
    /// Operations still in flight at that point may fail with a store error.
    pub fn disconnect_when<F>(self: Arc<Self>, shutdown: F) -> JoinHandle<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(async move {
            shutdown.await;
            match self.disconnect().await {
                Ok(true) => tracing::info!("Feature cache disconnected"),
                Ok(false) => tracing::debug!("Feature cache was already disconnected"),
                Err(e) => tracing::error!(error = %e, "Feature cache disconnect failed"),
            }
        })
    }

    /// Disconnect from the store on SIGINT / SIGTERM
    pub fn disconnect_on_shutdown(self: Arc<Self>) -> JoinHandle<()> {
        self.disconnect_when(shutdown_signal())
    }
}
