//! Client registry
//!
//! Tracks every admitted client in join order, bounded by a fixed capacity.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::client::color::DisplayColor;
use crate::client::{Client, Connection, ConnectionId};
use crate::error::RegistryError;

/// Registry shared by the acceptor and every connection handler.
///
/// All operations run under this one lock, which keeps registration,
/// removal and broadcast snapshots mutually exclusive.
pub type SharedRegistry = Arc<Mutex<ClientRegistry>>;

/// Registry for tracking active clients
pub struct ClientRegistry {
    clients: Vec<Client>,
    capacity: usize,
}

impl ClientRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            clients: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Wraps a new registry for sharing across tasks.
    pub fn shared(capacity: usize) -> SharedRegistry {
        Arc::new(Mutex::new(Self::new(capacity)))
    }

    /// Admits a connection under `nickname`.
    ///
    /// The color comes from the registry size at the moment of insertion, so
    /// the k-th client of an undisturbed registry gets palette entry k.
    pub fn register(
        &mut self,
        connection: Connection,
        nickname: String,
    ) -> Result<Client, RegistryError> {
        if self.contains(connection.id()) {
            return Err(RegistryError::DuplicateConnection(connection.id()));
        }
        if self.clients.len() >= self.capacity {
            return Err(RegistryError::Full {
                capacity: self.capacity,
            });
        }

        let color = DisplayColor::for_index(self.clients.len());
        let client = Client::new(connection, nickname, color);
        self.clients.push(client.clone());
        Ok(client)
    }

    /// Removes the client registered for `id`, keeping the others in join
    /// order. Returns `None` when nothing was registered under `id`.
    pub fn unregister(&mut self, id: ConnectionId) -> Option<Client> {
        let position = self.clients.iter().position(|client| client.id() == id)?;
        Some(self.clients.remove(position))
    }

    /// Clients other than `exclude`, in join order.
    pub fn snapshot_except(&self, exclude: Option<ConnectionId>) -> Vec<Client> {
        self.clients
            .iter()
            .filter(|client| Some(client.id()) != exclude)
            .cloned()
            .collect()
    }

    /// Removes every client, used when the server shuts down.
    pub fn drain(&mut self) -> Vec<Client> {
        self.clients.drain(..).collect()
    }

    pub fn contains(&self, id: ConnectionId) -> bool {
        self.clients.iter().any(|client| client.id() == id)
    }

    pub fn nicknames(&self) -> Vec<String> {
        self.clients
            .iter()
            .map(|client| client.nickname().to_string())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
