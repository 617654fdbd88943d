use std::collections::HashMap;

use comms::event::Event;
use nanoid::nanoid;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

/// Bounded queue of events waiting to be written to one connection
pub type OutboundSender = mpsc::Sender<Event>;

/// [ClientId] is the identity of one open connection inside its room
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(String);

impl ClientId {
    pub(super) fn generate() -> Self {
        ClientId(nanoid!())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// [BroadcastHub] fans events out to the connections registered in a room.
///
/// Delivery never waits on a connection: events are pushed into each client's
/// bounded outbound queue, and a client whose queue is full or closed is
/// evicted. Dropping its sender closes the queue, which ends that client's session.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    clients: HashMap<ClientId, OutboundSender>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, client_id: ClientId, sender: OutboundSender) {
        self.clients.insert(client_id, sender);
    }

    /// Returns false if the client was not registered, e.g. it had been evicted
    pub fn remove(&mut self, client_id: &ClientId) -> bool {
        self.clients.remove(client_id).is_some()
    }

    pub fn contains(&self, client_id: &ClientId) -> bool {
        self.clients.contains_key(client_id)
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    /// Deliver `event` to every client except `exclude`.
    ///
    /// Returns the number of clients the event was queued for.
    pub fn broadcast(&mut self, exclude: Option<&ClientId>, event: &Event) -> usize {
        let mut delivered = 0;
        let mut evicted = Vec::new();

        for (client_id, sender) in &self.clients {
            if exclude == Some(client_id) {
                continue;
            }

            match sender.try_send(event.clone()) {
                Ok(()) => delivered += 1,
                Err(TrySendError::Full(_)) => {
                    warn!(client = client_id.as_str(), "outbound queue full, evicting client");
                    evicted.push(client_id.clone());
                }
                Err(TrySendError::Closed(_)) => evicted.push(client_id.clone()),
            }
        }

        for client_id in evicted {
            self.clients.remove(&client_id);
        }

        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reaches_everyone_but_the_excluded() {
        let mut hub = BroadcastHub::new();
        let (a, b) = (ClientId::generate(), ClientId::generate());
        let (a_tx, mut a_rx) = mpsc::channel(4);
        let (b_tx, mut b_rx) = mpsc::channel(4);
        hub.insert(a.clone(), a_tx);
        hub.insert(b.clone(), b_tx);

        assert_eq!(hub.broadcast(None, &Event::Pause), 2);
        assert_eq!(hub.broadcast(Some(&a), &Event::Next), 1);

        assert_eq!(a_rx.try_recv().unwrap(), Event::Pause);
        assert!(a_rx.try_recv().is_err());
        assert_eq!(b_rx.try_recv().unwrap(), Event::Pause);
        assert_eq!(b_rx.try_recv().unwrap(), Event::Next);
    }

    #[test]
    fn test_full_client_is_evicted_without_blocking_others() {
        let mut hub = BroadcastHub::new();
        let (slow, fast) = (ClientId::generate(), ClientId::generate());
        let (slow_tx, mut slow_rx) = mpsc::channel(1);
        let (fast_tx, mut fast_rx) = mpsc::channel(8);
        hub.insert(slow.clone(), slow_tx);
        hub.insert(fast.clone(), fast_tx);

        hub.broadcast(None, &Event::Pause);
        hub.broadcast(None, &Event::Next);

        assert!(!hub.contains(&slow));
        assert!(hub.contains(&fast));
        assert_eq!(fast_rx.try_recv().unwrap(), Event::Pause);
        assert_eq!(fast_rx.try_recv().unwrap(), Event::Next);

        // the evicted client drains what it had, then sees its queue closed
        assert_eq!(slow_rx.try_recv().unwrap(), Event::Pause);
        assert!(matches!(
            slow_rx.try_recv(),
            Err(mpsc::error::TryRecvError::Disconnected)
        ));
    }

    #[test]
    fn test_closed_client_is_evicted() {
        let mut hub = BroadcastHub::new();
        let gone = ClientId::generate();
        let (tx, rx) = mpsc::channel(1);
        hub.insert(gone.clone(), tx);
        drop(rx);

        assert_eq!(hub.broadcast(None, &Event::Prev), 0);
        assert!(hub.is_empty());
        assert!(!hub.remove(&gone));
    }
}
