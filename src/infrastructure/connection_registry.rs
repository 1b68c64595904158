use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::sync::mpsc;

pub type ConnectionId = u64;

struct Connection {
    tx: mpsc::UnboundedSender<String>,
    connected_at: Instant,
}

/// Open realtime connections eligible for pushes.
///
/// Every operation holds the lock for its whole body, so register, unregister
/// and broadcast never interleave.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<HashMap<ConnectionId, Connection>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection and returns the receiving end of its outbound queue.
    pub fn register(&self) -> (ConnectionId, mpsc::UnboundedReceiver<String>) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (tx, rx) = mpsc::unbounded_channel();

        let mut conn_map = self.connections.lock().unwrap();
        conn_map.insert(
            id,
            Connection {
                tx,
                connected_at: Instant::now(),
            },
        );
        let count = conn_map.len();
        drop(conn_map);

        tracing::info!(connection = id, active = count, "realtime client connected");
        (id, rx)
    }

    pub fn unregister(&self, id: ConnectionId) -> bool {
        let mut conn_map = self.connections.lock().unwrap();
        let removed = conn_map.remove(&id);
        let count = conn_map.len();
        drop(conn_map);

        match removed {
            Some(conn) => {
                tracing::info!(
                    connection = id,
                    active = count,
                    connected_secs = conn.connected_at.elapsed().as_secs(),
                    "realtime client disconnected"
                );
                true
            }
            None => false,
        }
    }

    /// Queues `message` on every connection. Connections whose queue is
    /// closed are dropped from the registry; the rest still get the message.
    /// Returns how many connections it was delivered to.
    pub fn broadcast(&self, message: &str) -> usize {
        let mut conn_map = self.connections.lock().unwrap();
        let mut dead = Vec::new();

        for (id, conn) in conn_map.iter() {
            if let Err(e) = conn.tx.send(message.to_owned()) {
                tracing::warn!(connection = *id, error = %e, "delivery failed, pruning connection");
                dead.push(*id);
            }
        }
        for id in &dead {
            conn_map.remove(id);
        }

        conn_map.len()
    }

    pub fn len(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
