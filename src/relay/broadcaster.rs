//! Broadcaster
//!
//! Fans a message out to every registered client except an optional sender.

use std::sync::Arc;

use log::debug;

use crate::client::{ConnectionId, SharedRegistry};
use crate::error::handlers::handle_error;
use crate::relay::{DeliveryReport, Payload};

#[derive(Clone)]
pub struct Broadcaster {
    registry: SharedRegistry,
}

impl Broadcaster {
    pub fn new(registry: SharedRegistry) -> Self {
        Self { registry }
    }

    /// Queues `message` for every registered client other than `exclude`.
    ///
    /// Recipients come from one snapshot taken under the registry lock. A
    /// recipient whose queue is full or whose writer has stopped is logged
    /// and skipped; it stays registered until its own handler notices the
    /// broken stream.
    pub async fn broadcast(
        &self,
        message: &[u8],
        exclude: Option<ConnectionId>,
    ) -> DeliveryReport {
        let recipients = self.registry.lock().await.snapshot_except(exclude);
        let payload: Payload = Arc::from(message);
        let mut report = DeliveryReport::default();

        for recipient in &recipients {
            match recipient.connection().send(Arc::clone(&payload)) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    handle_error(&e);
                    report.failed += 1;
                }
            }
        }

        debug!(
            "Broadcast {} bytes: {} delivered, {} failed",
            message.len(),
            report.delivered,
            report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientRegistry, Connection};
    use std::net::SocketAddr;
    use tokio::sync::mpsc;

    async fn join_with_queue(
        registry: &SharedRegistry,
        raw: u64,
        nickname: &str,
        queue_size: usize,
    ) -> mpsc::Receiver<Payload> {
        let (tx, rx) = mpsc::channel(queue_size);
        let peer: SocketAddr = format!("127.0.0.1:{}", 40000 + raw).parse().unwrap();
        let connection = Connection::new(ConnectionId::new(raw), peer, tx);
        registry
            .lock()
            .await
            .register(connection, nickname.to_string())
            .unwrap();
        rx
    }

    async fn join(registry: &SharedRegistry, raw: u64, nickname: &str) -> mpsc::Receiver<Payload> {
        join_with_queue(registry, raw, nickname, 8).await
    }

    #[tokio::test]
    async fn test_broadcast_skips_excluded_sender() {
        let registry = ClientRegistry::shared(10);
        let mut alice = join(&registry, 1, "alice").await;
        let mut bob = join(&registry, 2, "bob").await;
        let mut carol = join(&registry, 3, "carol").await;
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        let report = broadcaster
            .broadcast(b"alice: hi\n", Some(ConnectionId::new(1)))
            .await;

        assert_eq!(report, DeliveryReport { delivered: 2, failed: 0 });
        assert!(alice.try_recv().is_err());
        assert_eq!(&*bob.try_recv().unwrap(), b"alice: hi\n");
        assert_eq!(&*carol.try_recv().unwrap(), b"alice: hi\n");
        assert!(bob.try_recv().is_err());
        assert!(carol.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_without_exclusion_reaches_everyone() {
        let registry = ClientRegistry::shared(10);
        let mut alice = join(&registry, 1, "alice").await;
        let mut bob = join(&registry, 2, "bob").await;
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        let report = broadcaster.broadcast(b"[SERVER] notice\n", None).await;

        assert_eq!(report.delivered, 2);
        assert!(alice.try_recv().is_ok());
        assert!(bob.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_failed_recipient_is_skipped_but_kept() {
        let registry = ClientRegistry::shared(10);
        let bob = join(&registry, 2, "bob").await;
        let mut carol = join(&registry, 3, "carol").await;
        drop(bob);
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        let report = broadcaster.broadcast(b"hello\n", None).await;

        assert_eq!(report, DeliveryReport { delivered: 1, failed: 1 });
        assert_eq!(&*carol.try_recv().unwrap(), b"hello\n");
        assert!(registry.lock().await.contains(ConnectionId::new(2)));
    }

    #[tokio::test]
    async fn test_broadcast_to_empty_registry() {
        let registry = ClientRegistry::shared(10);
        let broadcaster = Broadcaster::new(registry);

        let report = broadcaster.broadcast(b"anyone?\n", None).await;

        assert_eq!(report, DeliveryReport::default());
    }

    #[tokio::test]
    async fn test_full_queue_is_skipped_without_blocking_others() {
        let registry = ClientRegistry::shared(10);
        let mut stalled = join_with_queue(&registry, 1, "stalled", 2).await;
        let mut carol = join(&registry, 2, "carol").await;
        let broadcaster = Broadcaster::new(Arc::clone(&registry));

        let mut failed = 0;
        for n in 0..4 {
            let report = broadcaster.broadcast(format!("m{n}\n").as_bytes(), None).await;
            failed += report.failed;
        }

        assert_eq!(failed, 2);
        for n in 0..4 {
            assert_eq!(&*carol.try_recv().unwrap(), format!("m{n}\n").as_bytes());
        }
        assert_eq!(&*stalled.try_recv().unwrap(), b"m0\n");
        assert_eq!(&*stalled.try_recv().unwrap(), b"m1\n");
        assert!(stalled.try_recv().is_err());
        assert!(registry.lock().await.contains(ConnectionId::new(1)));
    }
}
