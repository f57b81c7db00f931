use std::{future::Future, marker::PhantomData, sync::Arc, time::Duration};

use tokio::task::JoinHandle;
use tracing::debug;

/// Trailing-edge debouncer that owns its timer.
///
/// Every `schedule` within `delay` of the previous one replaces it; only the
/// last argument of a burst reaches the callback. Dropping the debouncer
/// cancels whatever is still waiting.
pub struct Debouncer<A, C> {
    delay: Duration,
    callback: Arc<C>,
    pending: Option<JoinHandle<()>>,
    _arg: PhantomData<fn(A)>,
}

impl<A, C, Fut> Debouncer<A, C>
where
    A: Send + 'static,
    C: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    pub fn new(delay: Duration, callback: C) -> Self {
        Self {
            delay,
            callback: Arc::new(callback),
            pending: None,
            _arg: PhantomData,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Must be called from within a tokio runtime.
    pub fn schedule(&mut self, arg: A) {
        if self.cancel() {
            debug!("debounce: replaced pending call");
        }

        let callback = Arc::clone(&self.callback);
        let delay = self.delay;

        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so a later schedule never aborts work already started.
            tokio::spawn(callback(arg));
        }));
    }
}

impl<A, C> Debouncer<A, C> {
    /// Drop the pending call. Returns true if one was waiting.
    pub fn cancel(&mut self) -> bool {
        match self.pending.take() {
            Some(handle) if !handle.is_finished() => {
                handle.abort();
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl<A, C> Drop for Debouncer<A, C> {
    fn drop(&mut self) {
        self.cancel();
    }
}
