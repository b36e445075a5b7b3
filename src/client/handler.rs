//! Connection handler
//!
//! Drives one accepted connection through
//! `AwaitingHandshake -> Active -> Terminated`.
//!
//! Messages are not framed: each read from the socket is relayed as one
//! message, so a fast sender's lines may arrive split or merged.

use log::{debug, info};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::{mpsc, watch};

use crate::client::{Client, Connection, ConnectionId, SharedRegistry};
use crate::error::handlers::handle_error;
use crate::error::{ChatServerError, HandshakeError};
use crate::relay::{Broadcaster, messages, spawn_writer};
use crate::server::config::ServerConfig;

/// Where a connection is in its life.
#[derive(Debug)]
pub enum HandlerState {
    AwaitingHandshake,
    Active(Client),
    /// `client` is set once registration succeeded; `cause` is `None` for a
    /// normal disconnect or a server shutdown.
    Terminated {
        client: Option<Client>,
        cause: Option<ChatServerError>,
    },
}

/// Result of one read that also watches for server shutdown.
enum ReadOutcome {
    Data(usize),
    Closed,
    Failed(io::Error),
    Shutdown,
}

pub struct ConnectionHandler {
    id: ConnectionId,
    peer: SocketAddr,
    reader: OwnedReadHalf,
    writer: Option<OwnedWriteHalf>,
    registry: SharedRegistry,
    broadcaster: Broadcaster,
    config: Arc<ServerConfig>,
    shutdown: watch::Receiver<bool>,
}

impl ConnectionHandler {
    pub fn new(
        stream: TcpStream,
        peer: SocketAddr,
        id: ConnectionId,
        registry: SharedRegistry,
        config: Arc<ServerConfig>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            id,
            peer,
            reader,
            writer: Some(writer),
            broadcaster: Broadcaster::new(Arc::clone(&registry)),
            registry,
            config,
            shutdown,
        }
    }

    /// Runs the connection to completion.
    pub async fn run(mut self) {
        let mut state = HandlerState::AwaitingHandshake;
        loop {
            state = match state {
                HandlerState::AwaitingHandshake => self.await_handshake().await,
                HandlerState::Active(client) => self.relay_messages(client).await,
                HandlerState::Terminated { client, cause } => {
                    self.terminate(client, cause).await;
                    return;
                }
            };
        }
    }

    /// Reads into `buffer` unless the server starts shutting down first.
    async fn read_or_shutdown(&mut self, buffer: &mut [u8]) -> ReadOutcome {
        if *self.shutdown.borrow() {
            return ReadOutcome::Shutdown;
        }

        tokio::select! {
            read = self.reader.read(buffer) => match read {
                Ok(0) => ReadOutcome::Closed,
                Ok(n) => ReadOutcome::Data(n),
                Err(e) => ReadOutcome::Failed(e),
            },
            // An error means the server itself is gone.
            _ = self.shutdown.changed() => ReadOutcome::Shutdown,
        }
    }

    fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Reads the nickname and admits the connection to the registry.
    async fn await_handshake(&mut self) -> HandlerState {
        let mut buffer = vec![0u8; self.config.max_nickname_length];
        let nickname = match self.read_or_shutdown(&mut buffer).await {
            ReadOutcome::Data(n) => decode_nickname(&buffer[..n]),
            ReadOutcome::Closed => return handshake_failed(HandshakeError::ConnectionClosed),
            ReadOutcome::Failed(e) => return handshake_failed(HandshakeError::from(e)),
            ReadOutcome::Shutdown => {
                return HandlerState::Terminated {
                    client: None,
                    cause: None,
                };
            }
        };

        let (outbound_tx, outbound_rx) = mpsc::channel(self.config.outbound_queue_size);
        let connection = Connection::new(self.id, self.peer, outbound_tx);

        let mut registry = self.registry.lock().await;
        let client = match registry.register(connection, nickname) {
            Ok(client) => client,
            Err(e) => {
                return HandlerState::Terminated {
                    client: None,
                    cause: Some(e.into()),
                };
            }
        };
        info!(
            "{} joined from {} ({}/{} clients)",
            client.nickname(),
            self.peer,
            registry.len(),
            registry.capacity()
        );
        drop(registry);

        if let Some(writer) = self.writer.take() {
            spawn_writer(writer, outbound_rx, self.peer);
        }

        self.broadcaster
            .broadcast(&messages::join_notice(client.nickname()), Some(self.id))
            .await;

        HandlerState::Active(client)
    }

    /// Relays every read to the other clients until the stream ends.
    async fn relay_messages(&mut self, client: Client) -> HandlerState {
        let mut buffer = vec![0u8; self.config.buffer_size];
        loop {
            let n = match self.read_or_shutdown(&mut buffer).await {
                ReadOutcome::Data(n) => n,
                ReadOutcome::Closed | ReadOutcome::Shutdown => {
                    return HandlerState::Terminated {
                        client: Some(client),
                        cause: None,
                    };
                }
                ReadOutcome::Failed(e) => {
                    return HandlerState::Terminated {
                        client: Some(client),
                        cause: Some(ChatServerError::Stream(e)),
                    };
                }
            };

            let message = messages::chat_line(&client, &buffer[..n], self.config.use_colors);
            debug!(
                "{}: {}",
                client.nickname(),
                String::from_utf8_lossy(&buffer[..n]).trim_end()
            );
            self.broadcaster.broadcast(&message, Some(self.id)).await;
        }
    }

    async fn terminate(&mut self, client: Option<Client>, cause: Option<ChatServerError>) {
        self.registry.lock().await.unregister(self.id);

        // Still present only if registration never happened; otherwise the
        // writer task closes it once the outbound queue is dropped.
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.shutdown().await {
                debug!("Failed to shut down connection {}: {}", self.id, e);
            }
        }

        if let Some(err) = &cause {
            handle_error(err);
        }

        match (client, cause) {
            (Some(client), None) if self.is_shutting_down() => {
                info!("Closing {} ({}) for shutdown", client.nickname(), self.peer);
            }
            (Some(client), None) => {
                info!("{} left the chat ({})", client.nickname(), self.peer);
                let notice = messages::leave_notice(client.nickname());
                drop(client);
                self.broadcaster.broadcast(&notice, None).await;
            }
            (Some(client), Some(_)) => {
                info!(
                    "{} disconnected with an error ({})",
                    client.nickname(),
                    self.peer
                );
            }
            (None, _) => debug!("Connection {} from {} closed", self.id, self.peer),
        }
    }
}

fn handshake_failed(err: HandshakeError) -> HandlerState {
    HandlerState::Terminated {
        client: None,
        cause: Some(err.into()),
    }
}

/// Nickname bytes as text, without the line ending a terminal client may
/// have sent along.
fn decode_nickname(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_nickname_strips_line_ending() {
        assert_eq!(decode_nickname(b"alice"), "alice");
        assert_eq!(decode_nickname(b"alice\n"), "alice");
        assert_eq!(decode_nickname(b"alice\r\n"), "alice");
    }

    #[test]
    fn test_decode_nickname_keeps_other_content() {
        assert_eq!(decode_nickname(b" bob  "), " bob  ");
        assert_eq!(decode_nickname(&[b'x', 0xff]), "x\u{fffd}");
    }
}
