//! Bounded progress reporting.
//!
//! Progress travels over a bounded `tokio` channel. Emitting waits for
//! channel capacity, so a slow consumer slows the producer down instead of
//! letting events pile up.

use log::debug;
use tokio::sync::mpsc;

/// Producer side of a progress stream. A disabled reporter drops events.
#[derive(Debug)]
pub struct Progress<E> {
    tx: Option<mpsc::Sender<E>>,
}

impl<E> Progress<E> {
    /// Create a reporter and the receiver that consumes its events.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<E>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Wrap an existing sender.
    pub fn from_sender(tx: mpsc::Sender<E>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A reporter that discards every event.
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Send an event, waiting for capacity.
    ///
    /// A consumer that went away is not an error for the producer.
    pub async fn emit(&self, event: E) {
        if let Some(tx) = &self.tx {
            if tx.send(event).await.is_err() {
                debug!("Progress receiver dropped, event discarded");
            }
        }
    }
}

impl<E> Clone for Progress<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> Default for Progress<E> {
    fn default() -> Self {
        Self::disabled()
    }
}
