//! Build server front end
//!
//! A minimal loopback HTTP service serializing build requests through a
//! single admission permit. In-flight builds are never cancelled; `/stop`
//! and Ctrl-C only stop the listener, with a graceful drain.

pub mod routes;
pub mod status;

pub use routes::AppState;
pub use status::{BuildStatus, StatusBoard};

use crate::config::Config;
use crate::error::{StagehandError, StagehandResult};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

/// The HTTP front end
pub struct BuildServer {
    config: Config,
}

impl BuildServer {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Bind and serve until `/stop` or an interrupt
    pub async fn run(self) -> StagehandResult<()> {
        let addr = format!("{}:{}", self.config.server.host, self.config.server.port);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let state = AppState::new(self.config, shutdown_tx);
        let app = routes::router(state);

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| StagehandError::ServerBind {
                addr: addr.clone(),
                reason: e.to_string(),
            })?;

        info!("Build server listening on http://{addr}");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(shutdown_rx))
            .await
            .map_err(|e| StagehandError::io("serving HTTP", e))?;

        info!("Build server stopped");
        Ok(())
    }
}

async fn shutdown_signal(mut stop: watch::Receiver<bool>) {
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupt received, shutting down");
        }
        _ = stop.changed() => {
            info!("Stop endpoint hit, shutting down");
        }
    }
}
