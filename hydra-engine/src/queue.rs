use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};

use crate::error::EngineError;

/// Producer handle onto a bounded queue. Cheap to clone; every clone shares
/// the same backing channel, so any number of workers can hold one.
pub struct QueueSender<T>(mpsc::Sender<T>);

impl<T> Clone for QueueSender<T> {
    fn clone(&self) -> Self {
        QueueSender(self.0.clone())
    }
}

impl<T: Send> QueueSender<T> {
    pub async fn put(&self, item: T) -> Result<(), EngineError> {
        self.0.send(item).await.map_err(|_| EngineError::ChannelClosed)
    }
}

/// Consumer handle onto a bounded queue. Cloning shares the same underlying
/// receiver behind a mutex, giving the multi-consumer half of an MPMC queue
/// on top of tokio's MPSC primitive.
pub struct QueueReceiver<T>(Arc<Mutex<mpsc::Receiver<T>>>);

impl<T> Clone for QueueReceiver<T> {
    fn clone(&self) -> Self {
        QueueReceiver(Arc::clone(&self.0))
    }
}

impl<T: Send> QueueReceiver<T> {
    /// Blocks (yields) until an item is available, or returns `None` once
    /// every sender has been dropped and the channel has drained.
    pub async fn get(&self) -> Option<T> {
        let mut guard = self.0.lock().await;
        guard.recv().await
    }

    /// Non-blocking hint: drains whatever is currently buffered without
    /// waiting for more. Used by the supervisor's status loop to poll the
    /// main-return channel without stalling progress rendering.
    pub async fn try_get(&self) -> Option<T> {
        let mut guard = self.0.lock().await;
        guard.try_recv().ok()
    }
}

/// Creates a bounded MPMC queue with the given capacity.
pub fn bounded<T: Send>(capacity: usize) -> (QueueSender<T>, QueueReceiver<T>) {
    let (tx, rx) = mpsc::channel(capacity);
    (QueueSender(tx), QueueReceiver(Arc::new(Mutex::new(rx))))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_round_trip() {
        let (tx, rx) = bounded::<u32>(4);
        tx.put(7).await.unwrap();
        assert_eq!(rx.get().await, Some(7));
    }

    #[tokio::test]
    async fn cloned_receiver_shares_the_channel() {
        let (tx, rx) = bounded::<u32>(8);
        let rx2 = rx.clone();
        tx.put(1).await.unwrap();
        tx.put(2).await.unwrap();
        drop(tx);

        let mut seen = vec![rx.get().await.unwrap(), rx2.get().await.unwrap()];
        seen.sort_unstable();
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(rx.get().await, None);
    }
}
