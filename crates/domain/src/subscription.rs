use std::{
    pin::Pin,
    task::{Context, Poll},
};

use futures_util::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Source of collection snapshots.
///
/// Every published snapshot replaces the previous one. Subscribers that fall
/// behind only observe the latest snapshot.
#[derive(Debug)]
pub struct Publisher<T> {
    sender: watch::Sender<T>,
}

impl<T> Publisher<T>
where
    T: Clone + PartialEq + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            sender: watch::Sender::new(initial),
        }
    }

    /// Publish a snapshot. Returns `false` if it equals the current one and
    /// was therefore not delivered.
    pub fn publish(&self, snapshot: T) -> bool {
        self.sender.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        })
    }

    #[must_use]
    pub fn current(&self) -> T {
        self.sender.borrow().clone()
    }

    #[must_use]
    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            stream: Some(WatchStream::from_changes(self.sender.subscribe())),
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> Default for Publisher<T>
where
    T: Clone + Default + PartialEq + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Stream of snapshots published after the subscription was created.
pub struct Subscription<T> {
    stream: Option<WatchStream<T>>,
}

impl<T> Subscription<T> {
    /// A subscription that never yields a snapshot.
    #[must_use]
    pub fn closed() -> Self {
        Self { stream: None }
    }

    pub fn unsubscribe(&mut self) {
        self.stream = None;
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.stream.is_some()
    }
}

impl<T> Stream for Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.stream.as_mut() {
            Some(stream) => Pin::new(stream).poll_next(cx),
            None => Poll::Ready(None),
        }
    }
}
