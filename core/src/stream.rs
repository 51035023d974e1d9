//! Push-based, cancellable source of at most one value.
//!
//! # Design
//! `CancellableSource` is cold: it only stores the executor and the options.
//! `subscribe` spawns the request on the tokio runtime with a fresh
//! `CancellationToken` and returns a `Subscription` that receives the outcome
//! over a oneshot channel. A oneshot can carry one message, which gives the
//! "one terminal event, nothing after it" rule for free:
//!
//! - success: `Some(Ok(value))`, then `None`
//! - failure: `Some(Err(error))`, then `None`
//! - cancellation: `None` (the task drops the sender without sending)
//!
//! Unsubscribing, explicitly or by dropping the subscription, fires the
//! token and aborts the in-flight request.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::stream::{FusedStream, Stream};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::RequestExecutor;
use crate::error::FetchError;
use crate::types::{FromBody, RequestOptions};

/// Returned by `RequestExecutor::execute_stream`.
pub struct CancellableSource<T> {
    executor: RequestExecutor,
    options: Arc<RequestOptions>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> CancellableSource<T>
where
    T: FromBody + Send + 'static,
{
    pub(crate) fn new(executor: RequestExecutor, options: RequestOptions) -> Self {
        Self {
            executor,
            options: Arc::new(options),
            _marker: PhantomData,
        }
    }

    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Start the request.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime, since the request runs as
    /// a spawned task.
    pub fn subscribe(&self) -> Subscription<T> {
        let token = CancellationToken::new();
        let (tx, rx) = oneshot::channel();

        let executor = self.executor.clone();
        let options = Arc::clone(&self.options);
        let task_token = token.clone();
        tokio::spawn(async move {
            let outcome = executor
                .perform(&options, Some(&task_token))
                .await
                .and_then(T::from_body);
            match outcome {
                Err(err) if err.is_cancelled() => {
                    debug!(url = %options.url, "subscription cancelled, completing without value");
                }
                outcome => {
                    // The receiver is gone if the subscriber already left.
                    let _ = tx.send(outcome);
                }
            }
        });

        Subscription {
            rx: Some(rx),
            token,
        }
    }
}

impl<T> Clone for CancellableSource<T> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            options: Arc::clone(&self.options),
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for CancellableSource<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellableSource")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// One running request. Yields at most one item, then ends.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: Option<oneshot::Receiver<Result<T, FetchError>>>,
    token: CancellationToken,
}

impl<T> Subscription<T> {
    /// Abort the request. Has no effect once a response is being decoded.
    pub fn unsubscribe(&self) {
        self.token.cancel();
    }

    pub fn is_unsubscribed(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = Result<T, FetchError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        let Some(rx) = this.rx.as_mut() else {
            return Poll::Ready(None);
        };
        match Pin::new(rx).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(received) => {
                this.rx = None;
                Poll::Ready(received.ok())
            }
        }
    }
}

impl<T> FusedStream for Subscription<T> {
    fn is_terminated(&self) -> bool {
        self.rx.is_none()
    }
}

impl<T> Drop for Subscription<T> {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
