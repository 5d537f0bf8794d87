//! Miss Queue Module
//!
//! Bounded FIFO of keys that failed to resolve locally, published for a
//! cooperating peer to fill out of band. Producers never block: when the
//! queue is full the key is dropped. This is a sampling mechanism, not a
//! guaranteed delivery queue.

use std::sync::OnceLock;

use parking_lot::Mutex;
use tokio::sync::mpsc;

// == Miss Queue ==
/// Bounded non-blocking key queue, lazily allocated on first push.
pub struct MissQueue {
    capacity: usize,
    chan: OnceLock<Channel>,
}

struct Channel {
    tx: mpsc::Sender<String>,
    rx: Mutex<mpsc::Receiver<String>>,
}

impl MissQueue {
    // == Constructor ==
    /// Creates a queue holding at most `capacity` keys.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            chan: OnceLock::new(),
        }
    }

    // == Try Push ==
    /// Enqueues a key without blocking; the key is dropped when the queue
    /// is full. Returns whether it was enqueued.
    pub fn try_push(&self, key: &str) -> bool {
        let chan = self.chan.get_or_init(|| {
            let (tx, rx) = mpsc::channel(self.capacity);
            Channel {
                tx,
                rx: Mutex::new(rx),
            }
        });
        chan.tx.try_send(key.to_string()).is_ok()
    }

    // == Try Pop ==
    /// Pops at most one pending key without blocking.
    pub fn try_pop(&self) -> Option<String> {
        let chan = self.chan.get()?;
        chan.rx.lock().try_recv().ok()
    }

    // == Pending ==
    /// Approximate number of keys waiting in the queue.
    pub fn pending(&self) -> usize {
        match self.chan.get() {
            Some(chan) => self.capacity - chan.tx.capacity(),
            None => 0,
        }
    }
}
