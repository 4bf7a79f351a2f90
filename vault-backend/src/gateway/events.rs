//! Fan-out of gateway messages to connected viewers.
//!
//! Each subscriber owns a bounded queue. Publishing uses `try_send`, so a
//! slow viewer only loses its own messages and never stalls the watcher.

use dashmap::DashMap;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use super::protocol::GatewayMessage;

pub type ClientId = String;

pub struct EventBroadcaster {
    clients: DashMap<ClientId, mpsc::Sender<GatewayMessage>>,
    client_buffer: usize,
}

impl EventBroadcaster {
    pub fn new(client_buffer: usize) -> Self {
        Self {
            clients: DashMap::new(),
            client_buffer: client_buffer.max(1),
        }
    }

    /// Register a new viewer. Only messages broadcast after this call are
    /// delivered; there is no backlog.
    pub fn subscribe(&self) -> (ClientId, mpsc::Receiver<GatewayMessage>) {
        let client_id = Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(self.client_buffer);
        self.clients.insert(client_id.clone(), tx);
        log::debug!("[Gateway] Client {} subscribed ({} total)", client_id, self.clients.len());
        (client_id, rx)
    }

    pub fn unsubscribe(&self, client_id: &str) {
        if self.clients.remove(client_id).is_some() {
            log::debug!("[Gateway] Client {} unsubscribed ({} left)", client_id, self.clients.len());
        }
    }

    /// Deliver to every subscriber without waiting. Returns how many
    /// subscribers accepted the message.
    pub fn broadcast(&self, message: GatewayMessage) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();

        for entry in self.clients.iter() {
            match entry.value().try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    log::debug!("[Gateway] Client {} not keeping up, dropping message", entry.key());
                }
                Err(TrySendError::Closed(_)) => closed.push(entry.key().clone()),
            }
        }

        // Removal happens after iteration; DashMap shards are locked while iterating
        for client_id in closed {
            self.unsubscribe(&client_id);
        }

        delivered
    }

    pub fn client_count(&self) -> usize {
        self.clients.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::protocol::FileEventKind;

    fn change(name: &str) -> GatewayMessage {
        GatewayMessage::file_event(FileEventKind::Change, name)
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_subscribers() {
        let broadcaster = EventBroadcaster::new(8);
        let (_a, mut rx_a) = broadcaster.subscribe();
        let (_b, mut rx_b) = broadcaster.subscribe();

        assert_eq!(broadcaster.broadcast(change("x.md")), 2);
        assert_eq!(rx_a.recv().await.unwrap(), change("x.md"));
        assert_eq!(rx_b.recv().await.unwrap(), change("x.md"));
    }

    #[tokio::test]
    async fn test_late_subscriber_gets_no_replay() {
        let broadcaster = EventBroadcaster::new(8);
        broadcaster.broadcast(change("early.md"));

        let (_id, mut rx) = broadcaster.subscribe();
        broadcaster.broadcast(change("late.md"));
        assert_eq!(rx.recv().await.unwrap(), change("late.md"));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_full_subscriber_is_skipped_not_blocking() {
        let broadcaster = EventBroadcaster::new(1);
        let (_slow, mut slow_rx) = broadcaster.subscribe();
        let (_fast, mut fast_rx) = broadcaster.subscribe();

        assert_eq!(broadcaster.broadcast(change("1.md")), 2);
        fast_rx.recv().await.unwrap();
        // slow_rx has not drained its single slot
        assert_eq!(broadcaster.broadcast(change("2.md")), 1);
        assert_eq!(fast_rx.recv().await.unwrap(), change("2.md"));

        assert_eq!(slow_rx.recv().await.unwrap(), change("1.md"));
        assert!(slow_rx.try_recv().is_err());
        assert_eq!(broadcaster.client_count(), 2);
    }

    #[tokio::test]
    async fn test_dropped_receiver_is_pruned() {
        let broadcaster = EventBroadcaster::new(4);
        let (_gone, rx) = broadcaster.subscribe();
        let (_kept, _rx_kept) = broadcaster.subscribe();
        drop(rx);

        assert_eq!(broadcaster.broadcast(change("x.md")), 1);
        assert_eq!(broadcaster.client_count(), 1);
    }

    #[test]
    fn test_unsubscribe() {
        let broadcaster = EventBroadcaster::new(4);
        let (id, _rx) = broadcaster.subscribe();
        broadcaster.unsubscribe(&id);
        assert_eq!(broadcaster.client_count(), 0);
        assert_eq!(broadcaster.broadcast(change("x.md")), 0);
    }
}
