//! Error types
//!
//! Defines domain-specific error types for each stage of a connection's life.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use crate::client::ConnectionId;

/// Handshake errors
#[derive(Debug)]
pub enum HandshakeError {
    ConnectionClosed,
    Io(io::Error),
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::ConnectionClosed => write!(f, "Connection closed before nickname"),
            HandshakeError::Io(e) => write!(f, "Failed to read nickname: {}", e),
        }
    }
}

impl std::error::Error for HandshakeError {}

impl From<io::Error> for HandshakeError {
    fn from(error: io::Error) -> Self {
        HandshakeError::Io(error)
    }
}

/// Client registry errors
#[derive(Debug, PartialEq, Eq)]
pub enum RegistryError {
    Full { capacity: usize },
    DuplicateConnection(ConnectionId),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::Full { capacity } => {
                write!(f, "Too many clients ({} max). Connection rejected", capacity)
            }
            RegistryError::DuplicateConnection(id) => {
                write!(f, "Connection {} is already registered", id)
            }
        }
    }
}

impl std::error::Error for RegistryError {}

/// Why a message could not be queued for a recipient
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendFailure {
    QueueFull,
    WriterClosed,
}

impl fmt::Display for SendFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SendFailure::QueueFull => write!(f, "outbound queue full"),
            SendFailure::WriterClosed => write!(f, "writer closed"),
        }
    }
}

/// General chat server error that encompasses all error types
#[derive(Debug)]
pub enum ChatServerError {
    Handshake(HandshakeError),
    Registry(RegistryError),
    Stream(io::Error),
    RecipientSendFailed {
        connection: ConnectionId,
        peer: SocketAddr,
        reason: SendFailure,
    },
    Bind {
        address: String,
        source: io::Error,
    },
    Config(config::ConfigError),
    Io(io::Error),
}

impl fmt::Display for ChatServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatServerError::Handshake(e) => write!(f, "Handshake failed: {}", e),
            ChatServerError::Registry(e) => write!(f, "Registration failed: {}", e),
            ChatServerError::Stream(e) => write!(f, "Stream error: {}", e),
            ChatServerError::RecipientSendFailed {
                connection,
                peer,
                reason,
            } => write!(f, "Send to {} ({}) failed: {}", connection, peer, reason),
            ChatServerError::Bind { address, source } => {
                write!(f, "Failed to bind to {}: {}", address, source)
            }
            ChatServerError::Config(e) => write!(f, "Configuration error: {}", e),
            ChatServerError::Io(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ChatServerError {}

// Implement conversions from specific errors to ChatServerError
impl From<HandshakeError> for ChatServerError {
    fn from(error: HandshakeError) -> Self {
        ChatServerError::Handshake(error)
    }
}

impl From<RegistryError> for ChatServerError {
    fn from(error: RegistryError) -> Self {
        ChatServerError::Registry(error)
    }
}

impl From<config::ConfigError> for ChatServerError {
    fn from(error: config::ConfigError) -> Self {
        ChatServerError::Config(error)
    }
}

impl From<io::Error> for ChatServerError {
    fn from(error: io::Error) -> Self {
        ChatServerError::Io(error)
    }
}
