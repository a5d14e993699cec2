//! FIFO hand-off between the connection acceptor and the worker pool
//!
//! The acceptor pushes every accepted connection onto a `DispatchQueue` and
//! goes straight back to accepting. Idle workers park in `dequeue` until a
//! connection is available. Exactly one worker receives each entry:
//! - the receiving half of the channel sits behind a fair async mutex, so
//!   only one worker at a time can pop the head,
//! - waiting workers are served in the order they started waiting.
//!
//! The queue is unbounded unless a capacity is configured, in which case a
//! full queue hands the entry straight back to the caller.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, Mutex};

/// An accepted connection waiting for a worker.
#[derive(Debug)]
pub struct PendingConnection {
    /// Arrival order, starting at 1
    pub id: u64,
    pub peer: SocketAddr,
    pub stream: TcpStream,
}

/// Returned by [`DispatchQueue::enqueue`] when the entry was not accepted.
#[derive(Debug)]
pub struct Rejected<T>(pub T);

pub struct DispatchQueue<T> {
    sender: mpsc::UnboundedSender<T>,
    receiver: Mutex<mpsc::UnboundedReceiver<T>>,
    len: AtomicUsize,
    capacity: Option<usize>,
}

impl<T> DispatchQueue<T> {
    pub fn unbounded() -> Self {
        Self::with_capacity(None)
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            sender,
            receiver: Mutex::new(receiver),
            len: AtomicUsize::new(0),
            capacity,
        }
    }

    /// Appends an entry and returns the queue length including it.
    pub fn enqueue(&self, item: T) -> Result<usize, Rejected<T>> {
        let reserved = self
            .len
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |len| match self.capacity {
                Some(capacity) if len >= capacity => None,
                _ => Some(len + 1),
            });

        let Ok(previous) = reserved else {
            return Err(Rejected(item));
        };

        if let Err(mpsc::error::SendError(item)) = self.sender.send(item) {
            self.len.fetch_sub(1, Ordering::AcqRel);
            return Err(Rejected(item));
        }

        Ok(previous + 1)
    }

    /// Waits for the oldest entry and removes it.
    ///
    /// Returns `None` only if the channel has been closed, which cannot happen
    /// while the queue itself is alive.
    pub async fn dequeue(&self) -> Option<T> {
        let mut receiver = self.receiver.lock().await;
        let item = receiver.recv().await?;
        self.len.fetch_sub(1, Ordering::AcqRel);
        Some(item)
    }

    pub fn len(&self) -> usize {
        self.len.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
