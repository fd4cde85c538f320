//! TCP Server
//!
//! Accepts connections and spawns one handler task per client. The server
//! owns nothing but the listener and a handle to the shared registry; all
//! per-client state lives in [`Connection`].

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::Result;
use crate::network::Connection;
use crate::store::Registry;

/// TCP front end for the cache
pub struct Server {
    /// Bound listener, accepted from in [`Server::serve`]
    listener: TcpListener,
    /// Identity registry shared with every connection task
    registry: Arc<Registry>,
}

impl Server {
    /// Bind the listen address from `config`.
    ///
    /// Binding is split from serving so callers can learn the actual
    /// address (port 0 resolves here) before any connection is accepted.
    pub async fn bind(config: &Config, registry: Arc<Registry>) -> Result<Server> {
        let listener = TcpListener::bind(&config.listen_addr).await?;
        Ok(Server { listener, registry })
    }

    /// The address this server is listening on
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until the process exits.
    ///
    /// Each client runs in its own task; a client error is logged and ends
    /// only that client.
    pub async fn serve(self) -> Result<()> {
        tracing::info!("listening on {}", self.listener.local_addr()?);

        loop {
            let (stream, peer_addr) = self.listener.accept().await?;
            let registry = Arc::clone(&self.registry);

            tokio::spawn(async move {
                let mut connection = Connection::new(stream, peer_addr, registry);
                if let Err(err) = connection.run().await {
                    tracing::warn!("connection from {} failed: {}", peer_addr, err);
                }
            });
        }
    }
}
