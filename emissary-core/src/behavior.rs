//! # Pipeline Behaviors
//!
//! Middleware-style interceptors wrapped around a handler. A behavior gets
//! the request, the call's cancellation token and a [`Next`] continuation
//! for the rest of the chain. It may:
//!
//! - run work before and after `next.run()` (logging, metrics),
//! - replace or decorate the response,
//! - never call `next` at all, short-circuiting the handler (validation),
//! - call `next` more than once (retries).
//!
//! Behaviors bound to one request type implement [`PipelineBehavior`].
//! Behaviors that apply to every request type implement
//! [`OpenBehavior`](crate::OpenBehavior).

use crate::{handler::HandlerOutput, pipeline::Next, request::Request};
use futures::future::BoxFuture;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// A behavior wrapped around the handler of request type `R`.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a pipeline behavior for `{R}`",
    label = "missing `PipelineBehavior<{R}>` implementation",
    note = "Behaviors must implement `handle` for the request type `{R}`."
)]
pub trait PipelineBehavior<R: Request>: Send + Sync + 'static {
    /// Intercept the call. `next` runs the remaining behaviors and the handler.
    fn handle(
        &self,
        request: &R,
        cancellation: &CancellationToken,
        next: Next<'_, R>,
    ) -> impl Future<Output = HandlerOutput<R::Response>> + Send;
}

/// Object-safe version of [`PipelineBehavior`].
pub trait DynBehavior<R: Request>: Send + Sync + 'static {
    /// Intercept the call (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        cancellation: &'a CancellationToken,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, HandlerOutput<R::Response>>;
}

impl<R: Request, B: PipelineBehavior<R>> DynBehavior<R> for B {
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        cancellation: &'a CancellationToken,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, HandlerOutput<R::Response>> {
        Box::pin(self.handle(request, cancellation, next))
    }
}
