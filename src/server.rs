//! ChatServer accept loop
//!
//! Binds the TCP listener, applies the admission ceiling to every
//! accepted connection and spawns one handler task per admitted client.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::handler::handle_connection;
use crate::hub::ChatHub;
use crate::message::SERVER_FULL;

/// The chat server
///
/// Owns the shared hub and the configuration handed to every handler.
pub struct ChatServer {
    hub: ChatHub,
    config: Arc<Config>,
}

impl ChatServer {
    /// Create a server with a fresh, empty hub
    pub fn new(config: Config) -> Self {
        Self {
            hub: ChatHub::new(config.max_clients),
            config: Arc::new(config),
        }
    }

    /// Handle to the shared chat state
    pub fn hub(&self) -> &ChatHub {
        &self.hub
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener, AppError> {
        let addr = self.config.addr();
        TcpListener::bind(addr)
            .await
            .map_err(|source| AppError::Bind { addr, source })
    }

    /// Bind and serve until the process exits
    pub async fn run(self) -> Result<(), AppError> {
        let listener = self.bind().await?;
        self.serve(listener).await;
        Ok(())
    }

    /// Accept connections on `listener` forever
    ///
    /// Accept failures are logged and do not stop the loop.
    pub async fn serve(self, listener: TcpListener) {
        if let Ok(addr) = listener.local_addr() {
            info!("Chat server listening on {}", addr);
            info!(
                "Connect with: nc {} {} (max {} clients)",
                connect_host(addr.ip()),
                addr.port(),
                self.hub.max_sessions()
            );
        }

        loop {
            match listener.accept().await {
                Ok((stream, addr)) => self.admit(stream, addr),
                Err(e) => {
                    error!("Failed to accept connection: {}", e);
                }
            }
        }
    }

    /// Spawn a handler for `stream`, or turn it away if the server is full
    fn admit(&self, stream: TcpStream, addr: SocketAddr) {
        let Some(admission) = self.hub.try_admit() else {
            warn!(
                "Rejecting {}: {} clients already connected",
                addr,
                self.hub.max_sessions()
            );
            tokio::spawn(async move {
                if let Err(e) = reject(stream).await {
                    debug!("Failed to send rejection to {}: {}", addr, e);
                }
            });
            return;
        };

        info!(
            "New connection from {} ({} active)",
            addr,
            self.hub.active_count()
        );

        let hub = self.hub.clone();
        let config = Arc::clone(&self.config);

        tokio::spawn(async move {
            // Held until the handler has fully torn down.
            let _admission = admission;
            if let Err(e) = handle_connection(stream, hub, config).await {
                debug!("Connection handler error for {}: {}", addr, e);
            }
            debug!("Connection from {} closed", addr);
        });
    }
}

/// Host to suggest to users; wildcard binds are reachable on localhost
fn connect_host(ip: IpAddr) -> String {
    if ip.is_unspecified() {
        "localhost".to_string()
    } else {
        ip.to_string()
    }
}

/// Tell a client the server is full and close the connection
async fn reject(mut stream: TcpStream) -> std::io::Result<()> {
    stream
        .write_all(format!("{SERVER_FULL}\n").as_bytes())
        .await?;
    stream.shutdown().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_connect_host() {
        assert_eq!(connect_host(IpAddr::V4(Ipv4Addr::UNSPECIFIED)), "localhost");
        assert_eq!(connect_host(IpAddr::V6(Ipv6Addr::UNSPECIFIED)), "localhost");
        assert_eq!(connect_host(IpAddr::V4(Ipv4Addr::LOCALHOST)), "127.0.0.1");
    }
}
