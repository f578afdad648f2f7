//! Exporter composition root.
//!
//! Wires the connection manager, the queue collector and the HTTP endpoint
//! together and runs them until shutdown.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};

use crate::adapter::inbound::http;
use crate::application::QueueCollector;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;
use crate::infrastructure::connection::ConnectionManager;
use crate::port::Transport;

/// Main application struct.
pub struct App;

impl App {
    /// Connect, bind the configured listen address and serve until `shutdown`
    /// turns `true`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the initial connect
    /// fails, or the listener cannot be bound.
    pub async fn run<T: Transport>(
        config: Config,
        transport: T,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        config.validate()?;
        let listener = TcpListener::bind(config.web.listen_address.as_str()).await?;
        Self::serve(config, transport, listener, shutdown).await
    }

    /// Like [`run`](Self::run), on an already bound listener.
    ///
    /// The connection is closed once the server has drained.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, the initial connect
    /// fails, or the server stops with an I/O error.
    pub async fn serve<T: Transport>(
        config: Config,
        transport: T,
        listener: TcpListener,
        shutdown: watch::Receiver<bool>,
    ) -> Result<()> {
        config.validate()?;
        let mq = config.mq.clone();
        let manager =
            tokio::task::spawn_blocking(move || ConnectionManager::open(mq, transport)).await??;

        let collector = match QueueCollector::new(manager.queues(), manager.timeout(), shutdown.clone())
        {
            Ok(collector) => Arc::new(collector),
            Err(e) => {
                close(manager).await;
                return Err(e);
            }
        };
        let router = match http::router(collector, &config.web.telemetry_path) {
            Ok(router) => router,
            Err(e) => {
                close(manager).await;
                return Err(e);
            }
        };

        info!(
            address = %listener.local_addr()?,
            telemetry_path = %config.web.telemetry_path,
            queues = config.mq.queues.len(),
            "Serving queue metrics"
        );
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_requested(shutdown))
            .await;
        if let Err(e) = &served {
            error!(error = %e, "HTTP server error");
        }

        info!("Shutting down");
        close(manager).await;
        served.map_err(Into::into)
    }
}

async fn close<T: Transport>(manager: ConnectionManager<T>) {
    if let Err(e) = tokio::task::spawn_blocking(move || manager.close()).await {
        error!(error = %e, "Failed to close connection");
    }
}

/// Resolves once `shutdown` is `true`; never if its sender is gone.
async fn shutdown_requested(mut shutdown: watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
