//! Bounded off-thread execution for units of work.
//!
//! Each unit of work is spawned on the runtime and waits for a pool permit
//! before it starts, so at most `pool_size` run at once and the rest queue.
//! The request context is moved into the task by value and the request span is
//! entered only while the task is being polled, which leaves the worker
//! thread's own span untouched between polls.

use crate::domain::{DomainError, InternalKind, RequestContext};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::runtime::Handle;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span, debug, error, field, info_span};

/// Worker pool shared by all requests. Cheap to clone.
#[derive(Clone)]
pub struct AsyncDispatcher {
    runtime: Handle,
    permits: Arc<Semaphore>,
    pool_size: usize,
}

impl AsyncDispatcher {
    /// `pool_size` is clamped to at least 1.
    pub fn new(runtime: Handle, pool_size: usize) -> Self {
        let pool_size = pool_size.max(1);
        Self {
            runtime,
            permits: Arc::new(Semaphore::new(pool_size)),
            pool_size,
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Permits not currently held by a running unit of work.
    pub fn idle_workers(&self) -> usize {
        self.permits.available_permits()
    }

    /// Run `work` on the pool with `context` as its diagnostic context.
    ///
    /// Never blocks the caller. Work that cannot get a permit yet waits in the
    /// semaphore queue. Dropping the returned handle does not cancel the work.
    pub fn run_async<T, E, F, Fut>(&self, context: RequestContext, work: F) -> DispatchHandle<T, E>
    where
        T: Send + 'static,
        E: From<DomainError> + Send + 'static,
        F: FnOnce(RequestContext) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let span = request_span(&context);
        let permits = Arc::clone(&self.permits);
        let task = async move {
            let _permit = match permits.acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    return Err(E::from(DomainError::internal_with_source(
                        InternalKind::Worker,
                        "worker pool is closed",
                        e,
                    )));
                }
            };
            debug!("unit of work started");
            work(context).await
        };
        DispatchHandle {
            join: self.runtime.spawn(task.instrument(span)),
            runtime: self.runtime.clone(),
        }
    }
}

fn request_span(ctx: &RequestContext) -> Span {
    let caller = Span::current();
    let span = info_span!(
        parent: &caller,
        "request",
        method = ctx.method,
        item_id = ctx.item_id,
        author_id = field::Empty,
        rate = field::Empty,
    );
    if let Some(author_id) = ctx.author_id {
        span.record("author_id", author_id);
    }
    if let Some(rate) = ctx.rate {
        span.record("rate", rate);
    }
    span
}

/// Completion handle for a dispatched unit of work.
///
/// Resolves to the work's own result. A panicked or aborted task resolves to
/// `DomainError::Internal` (kind `Worker`) converted into `E`, with the join
/// error kept as its source.
#[must_use = "dropping the handle detaches the work; it still runs to completion"]
pub struct DispatchHandle<T, E = DomainError> {
    join: JoinHandle<Result<T, E>>,
    runtime: Handle,
}

impl<T, E> DispatchHandle<T, E>
where
    T: Send + 'static,
    E: From<DomainError> + Send + 'static,
{
    /// Run `callback` exactly once with the outcome, on the dispatcher's runtime.
    pub fn on_complete<F>(self, callback: F)
    where
        F: FnOnce(Result<T, E>) + Send + 'static,
    {
        let runtime = self.runtime.clone();
        runtime.spawn(async move { callback(self.await) }.instrument(Span::current()));
    }
}

impl<T, E: From<DomainError>> Future for DispatchHandle<T, E> {
    type Output = Result<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.join).poll(cx) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(join_err)) => {
                error!(error = %join_err, "unit of work did not complete");
                let message = if join_err.is_panic() {
                    "unit of work panicked"
                } else {
                    "unit of work was aborted"
                };
                Poll::Ready(Err(E::from(DomainError::internal_with_source(
                    InternalKind::Worker,
                    message,
                    join_err,
                ))))
            }
        }
    }
}
