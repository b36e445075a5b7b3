use log::{error, info};
use std::future::{self, Future};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;

use crate::client::{ClientRegistry, ConnectionHandler, ConnectionId, SharedRegistry};
use crate::error::ChatServerError;
use crate::server::config::ServerConfig;

pub struct Server {
    registry: SharedRegistry,
    listener: TcpListener,
    config: Arc<ServerConfig>,
    next_connection_id: AtomicU64,
    shutdown: watch::Sender<bool>,
}

impl Server {
    /// Binds the listener and creates the empty client registry.
    pub async fn new(config: ServerConfig) -> Result<Self, ChatServerError> {
        let address = config.listen_socket();

        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ChatServerError::Bind {
                address: address.clone(),
                source,
            })?;
        info!("Server bound to {}", listener.local_addr()?);

        Ok(Self {
            registry: ClientRegistry::shared(config.max_clients),
            listener,
            config: Arc::new(config),
            next_connection_id: AtomicU64::new(1),
            shutdown: watch::Sender::new(false),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn registry(&self) -> SharedRegistry {
        Arc::clone(&self.registry)
    }

    /// Accepts connections forever.
    pub async fn start(&self) {
        self.run_until(future::pending()).await;
    }

    /// Accepts connections until `shutdown` completes, then tells every
    /// handler to close its connection and releases every registered client.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        info!(
            "Starting chat server on {} (max {} clients)",
            self.config.listen_socket(),
            self.config.max_clients
        );
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = self.listener.accept() => self.handle_accept(accepted),
            }
        }

        self.shutdown.send_replace(true);
        let released = self.registry.lock().await.drain();
        info!(
            "Chat server shutting down, released {} clients",
            released.len()
        );
    }

    fn handle_accept(&self, accepted: io::Result<(TcpStream, SocketAddr)>) {
        match accepted {
            Ok((stream, peer)) => {
                let raw_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
                let id = ConnectionId::new(raw_id);
                info!("New connection {} from {}", id, peer);

                let handler = ConnectionHandler::new(
                    stream,
                    peer,
                    id,
                    Arc::clone(&self.registry),
                    Arc::clone(&self.config),
                    self.shutdown.subscribe(),
                );

                // Handlers are never joined; each one cleans up after itself.
                tokio::spawn(handler.run());
            }
            Err(e) => {
                error!("Error accepting connection: {}", e);
            }
        }
    }
}
