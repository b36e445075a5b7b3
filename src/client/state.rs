//! Module `client`
//!
//! Defines the `Client` struct registered for every admitted connection, and
//! the `Connection` handle the registry uses to reach its socket.

use std::fmt;
use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::client::color::DisplayColor;
use crate::error::{ChatServerError, SendFailure};
use crate::relay::Payload;

/// Identity of one accepted TCP stream.
///
/// Allocated by the acceptor, unique for the lifetime of the process. The
/// registry keys clients by this value, never by nickname.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Registry-visible handle of a connection.
///
/// The socket halves stay with the connection handler and the writer task;
/// this handle only reaches the socket through the outbound queue.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    outbound: mpsc::Sender<Payload>,
}

impl Connection {
    pub fn new(id: ConnectionId, peer: SocketAddr, outbound: mpsc::Sender<Payload>) -> Self {
        Self { id, peer, outbound }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Queues `payload` for this connection's writer task without waiting.
    ///
    /// Fails when the queue is full because the peer stopped reading, or
    /// once the writer has stopped. The payload is dropped either way.
    pub fn send(&self, payload: Payload) -> Result<(), ChatServerError> {
        self.outbound.try_send(payload).map_err(|e| {
            let reason = match e {
                mpsc::error::TrySendError::Full(_) => SendFailure::QueueFull,
                mpsc::error::TrySendError::Closed(_) => SendFailure::WriterClosed,
            };
            ChatServerError::RecipientSendFailed {
                connection: self.id,
                peer: self.peer,
                reason,
            }
        })
    }
}

/// Represents a registered chat participant.
///
/// Nickname and color are fixed at registration.
#[derive(Debug, Clone)]
pub struct Client {
    connection: Connection,
    nickname: String,
    color: DisplayColor,
}

impl Client {
    pub fn new(connection: Connection, nickname: String, color: DisplayColor) -> Self {
        Self {
            connection,
            nickname,
            color,
        }
    }

    // --------------------
    // Getter methods
    // --------------------

    /// Returns the connection identity used for lookup and removal.
    pub fn id(&self) -> ConnectionId {
        self.connection.id()
    }

    /// Returns the handle used to deliver messages to this client.
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }

    pub fn color(&self) -> DisplayColor {
        self.color
    }
}
