//! Single-shot result handoff from the final stage to the caller.
//!
//! Built on `tokio::sync::oneshot`, whose slot holds exactly one value, so
//! delivering never blocks. The promise keeps an explicit fulfilled flag: a
//! second delivery is rejected with [`Error::AlreadyFulfilled`] rather than
//! waiting for a reader that will never come.

use std::future::{Future, IntoFuture};
use std::pin::Pin;

use tokio::sync::oneshot;

use crate::error::{Error, Result};

/// Create a connected promise/future pair.
pub fn oneshot<T>() -> (ResultPromise<T>, ResultFuture<T>) {
    let (tx, rx) = oneshot::channel();
    (ResultPromise { tx: Some(tx) }, ResultFuture { rx })
}

/// Writing side of the result handoff, owned by the final stage.
#[derive(Debug)]
pub struct ResultPromise<T> {
    tx: Option<oneshot::Sender<T>>,
}

impl<T> ResultPromise<T> {
    /// Deliver the value.
    ///
    /// Returns `Error::AlreadyFulfilled` on any call after the first, and
    /// `Error::ResultDropped` if the caller stopped waiting.
    pub fn fulfill(&mut self, value: T) -> Result<()> {
        let tx = self.tx.take().ok_or(Error::AlreadyFulfilled)?;
        tx.send(value).map_err(|_| Error::ResultDropped)
    }

    /// Whether `fulfill` has already been called.
    pub fn is_fulfilled(&self) -> bool {
        self.tx.is_none()
    }
}

/// Reading side of the result handoff, owned by the caller.
#[derive(Debug)]
pub struct ResultFuture<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> ResultFuture<T> {
    /// Block the current thread until the value arrives.
    ///
    /// Must not be called from inside an async context; use `.await` there.
    pub fn wait(self) -> Result<T> {
        self.rx.blocking_recv().map_err(|_| Error::ResultDropped)
    }

    /// Take the value if it has already been delivered.
    pub fn try_take(&mut self) -> Result<Option<T>> {
        match self.rx.try_recv() {
            Ok(value) => Ok(Some(value)),
            Err(oneshot::error::TryRecvError::Empty) => Ok(None),
            Err(oneshot::error::TryRecvError::Closed) => Err(Error::ResultDropped),
        }
    }
}

impl<T: Send + 'static> IntoFuture for ResultFuture<T> {
    type Output = Result<T>;
    type IntoFuture = Pin<Box<dyn Future<Output = Result<T>> + Send>>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.rx.await.map_err(|_| Error::ResultDropped) })
    }
}
