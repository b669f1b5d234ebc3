//! Listener setup for the HTTP edge.

use std::io;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;

/// Binds a listener on `config.host:config.port`.
pub async fn bind(config: &ServerConfig) -> io::Result<TcpListener> {
    let addr = config
        .socket_addr()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, environment = ?config.environment, "Listening");
    Ok(listener)
}

/// Serves `app` on `listener` until the process stops.
pub async fn serve(listener: TcpListener, app: Router) -> io::Result<()> {
    axum::serve(listener, app).await
}
