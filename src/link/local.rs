//! Local (in-process) links using kanal channels.

use crate::error::{Error, Result};

/// Message passed between pipeline stages.
///
/// End-of-stream travels in-band, so it is queued behind every item sent
/// before it and can never overtake data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message<T> {
    /// A data item.
    Item(T),
    /// End of stream signal.
    Eos,
}

/// A bounded handoff buffer between two stages of the same process.
///
/// This is a thin wrapper around a kanal bounded channel. Each link has
/// exactly one producer and one consumer: neither half implements `Clone`.
///
/// # Example
///
/// ```rust
/// use tristage::link::{LocalLink, Message};
///
/// let (tx, rx) = LocalLink::bounded(16);
///
/// tx.send(7i64).unwrap();
/// tx.finish().unwrap();
///
/// assert_eq!(rx.recv().unwrap(), Message::Item(7));
/// assert_eq!(rx.recv().unwrap(), Message::Eos);
/// ```
pub struct LocalLink;

impl LocalLink {
    /// Create a bounded local link with the specified capacity.
    ///
    /// The sender blocks while `capacity` items are pending. A capacity of
    /// zero turns the link into a rendezvous channel.
    pub fn bounded<T>(capacity: usize) -> (LocalSender<T>, LocalReceiver<T>) {
        let (tx, rx) = kanal::bounded(capacity);
        (LocalSender { inner: tx }, LocalReceiver { inner: rx })
    }
}

/// Sender half of a local link.
pub struct LocalSender<T> {
    inner: kanal::Sender<Message<T>>,
}

impl<T> LocalSender<T> {
    /// Send an item through the link.
    ///
    /// Blocks while the link is full.
    pub fn send(&self, item: T) -> Result<()> {
        self.inner
            .send(Message::Item(item))
            .map_err(|_| Error::LinkClosed("downstream receiver dropped"))
    }

    /// Signal end-of-stream and release the sender.
    ///
    /// Consumes the sender, so no item can follow the signal and the signal
    /// cannot be sent twice.
    pub fn finish(self) -> Result<()> {
        self.inner
            .send(Message::Eos)
            .map_err(|_| Error::LinkClosed("downstream receiver dropped"))
    }

    /// Check if the receiving side is gone.
    pub fn is_closed(&self) -> bool {
        self.inner.is_disconnected()
    }

    /// Get the number of pending messages in the link.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the link is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Maximum number of pending messages.
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

/// Receiver half of a local link.
pub struct LocalReceiver<T> {
    inner: kanal::Receiver<Message<T>>,
}

impl<T> LocalReceiver<T> {
    /// Receive the next message from the link.
    ///
    /// Blocks until a message is available. If the sender disappears without
    /// sending [`Message::Eos`] first, the pending items are still delivered
    /// and then `Error::LinkClosed` is returned.
    pub fn recv(&self) -> Result<Message<T>> {
        self.inner
            .recv()
            .map_err(|_| Error::LinkClosed("upstream sender dropped before end of stream"))
    }

    /// Try to receive without blocking.
    ///
    /// Returns `Ok(None)` if nothing is pending.
    pub fn try_recv(&self) -> Result<Option<Message<T>>> {
        self.inner
            .try_recv()
            .map_err(|_| Error::LinkClosed("upstream sender dropped before end of stream"))
    }

    /// Check if the sending side is gone.
    pub fn is_closed(&self) -> bool {
        self.inner.is_disconnected()
    }

    /// Get the number of pending messages in the link.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Check if the link is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterate over received items until end-of-stream.
    ///
    /// Stops early, silently, if the sender vanished without signalling.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(|| match self.recv() {
            Ok(Message::Item(item)) => Some(item),
            Ok(Message::Eos) | Err(_) => None,
        })
    }
}
