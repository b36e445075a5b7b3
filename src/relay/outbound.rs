//! Outbound queues
//!
//! Every registered client gets a bounded queue and a writer task that owns
//! the socket's write half. Broadcasts only push onto queues, so a slow
//! reader delays nobody but itself; once its queue is full, further messages
//! for it are dropped.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{debug, warn};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Bytes queued for delivery, shared between all recipients of a broadcast.
pub type Payload = Arc<[u8]>;

/// Spawns the writer task for one client.
///
/// The task writes queued payloads in order and ends when every sender is
/// gone or a write fails. On a clean end it shuts the write half down, which
/// closes the connection once the reader side is dropped as well.
pub fn spawn_writer<W>(
    writer: W,
    outbound: mpsc::Receiver<Payload>,
    peer: SocketAddr,
) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(write_outbound(writer, outbound, peer))
}

async fn write_outbound<W>(
    mut writer: W,
    mut outbound: mpsc::Receiver<Payload>,
    peer: SocketAddr,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = outbound.recv().await {
        if let Err(e) = writer.write_all(&payload).await {
            warn!("Failed to write to {}: {}", peer, e);
            return;
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Failed to shut down writer for {}: {}", peer, e);
    }
}
