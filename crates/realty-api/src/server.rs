use std::sync::Arc;

use realty_core::{routing, ConfigManager, Result};
use tokio::{net::TcpListener, signal};
use tracing::{info, warn};

use crate::{create_router, AppState};

pub struct Server {
    state: AppState,
    host: String,
    port: u16,
}

impl Server {
    pub async fn new(config: Arc<ConfigManager>) -> Result<Self> {
        routing::verify_tables()?;
        let state = AppState::from_config(&config).await?;
        let server = &state.settings.server;
        Ok(Self {
            host: server.host.clone(),
            port: server.port,
            state,
        })
    }

    pub async fn run(self) -> Result<()> {
        let router = create_router(self.state);

        let listener = TcpListener::bind((self.host.as_str(), self.port)).await?;
        let addr = listener.local_addr()?;
        info!("Realty API listening on http://{}", addr);
        info!("  GET  /api/listings - Filtered listings");
        info!("  GET  /api/routes/resolve?path=<path> - Resolve a localized path");
        info!("  POST /api/admin/login - Admin sign-in");

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        },
    }
}
