//! Live snapshot channel between a store and one subscriber

use std::fmt;
use std::task::{Context, Poll};

use tokio::sync::mpsc;

use crate::errors::StoreResult;

/// Store side of a listener
pub type ListenerSender<T> = mpsc::UnboundedSender<StoreResult<T>>;

type ReleaseHook = Box<dyn FnOnce() + Send>;

/// Receiving end of a live store registration.
///
/// Snapshots arrive in the store's commit order. Releasing (explicitly or
/// on drop) runs the store's deregistration hook exactly once.
pub struct Listener<T> {
    receiver: mpsc::UnboundedReceiver<StoreResult<T>>,
    release: Option<ReleaseHook>,
}

impl<T> Listener<T> {
    /// Creates a connected sender/listener pair
    pub fn channel<F>(release: F) -> (ListenerSender<T>, Self)
    where
        F: FnOnce() + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self::new(rx, release))
    }

    pub fn new<F>(receiver: mpsc::UnboundedReceiver<StoreResult<T>>, release: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            receiver,
            release: Some(Box::new(release)),
        }
    }

    /// Waits for the next snapshot; `None` once the store hung up
    pub async fn recv(&mut self) -> Option<StoreResult<T>> {
        self.receiver.recv().await
    }

    pub fn poll_recv(&mut self, cx: &mut Context<'_>) -> Poll<Option<StoreResult<T>>> {
        self.receiver.poll_recv(cx)
    }

    /// Deregisters from the store and drops anything still buffered.
    pub fn release(&mut self) {
        self.receiver.close();
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_released(&self) -> bool {
        self.release.is_none()
    }
}

impl<T> Drop for Listener<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for Listener<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener")
            .field("released", &self.is_released())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_delivers_in_order() {
        let (tx, mut listener) = Listener::<u32>::channel(|| {});
        tx.send(Ok(1)).unwrap();
        tx.send(Ok(2)).unwrap();
        assert_eq!(listener.recv().await, Some(Ok(1)));
        assert_eq!(listener.recv().await, Some(Ok(2)));
    }

    #[test]
    fn test_release_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let (_tx, mut listener) = Listener::<u32>::channel(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listener.release();
        listener.release();
        drop(listener);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_sender_fails_after_release() {
        let (tx, mut listener) = Listener::<u32>::channel(|| {});
        listener.release();
        assert!(tx.send(Ok(1)).is_err());
    }
}
