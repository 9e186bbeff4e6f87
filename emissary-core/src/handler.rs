//! # Handler
//!
//! The single authoritative computation for a request type. A handler is the
//! innermost link of every behavior chain: behaviors run around it, and the
//! continuation at the bottom of the chain is a call to the handler.
//!
//! # Usage Patterns
//!
//! 1. **Struct implementation**: `impl Handler<GetUser> for UserHandler`
//! 2. **Closure**: `handler_fn(|req: &GetUser, _| async move { ... })`
//!
//! Handlers return `Ok(None)` only by mistake: an absent response is
//! reported to the caller as [`MediatorError::NullResult`].
//!
//! [`MediatorError::NullResult`]: crate::MediatorError::NullResult

use crate::{error::BoxError, request::Request};
use futures::future::BoxFuture;
use std::{future::Future, marker::PhantomData};
use tokio_util::sync::CancellationToken;

/// What a handler or behavior produces: a response, no response, or a failure.
pub type HandlerOutput<T> = Result<Option<T>, BoxError>;

/// Computes the response for a request.
///
/// The cancellation token is the one chosen for the whole call; it is
/// advisory and the handler is expected to observe it.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot handle requests of type `{R}`",
    label = "missing `Handler<{R}>` implementation",
    note = "Handlers must implement `handle` for the request type `{R}`."
)]
pub trait Handler<R: Request>: Send + Sync + 'static {
    /// Handle the request.
    fn handle(
        &self,
        request: &R,
        cancellation: &CancellationToken,
    ) -> impl Future<Output = HandlerOutput<R::Response>> + Send;
}

/// Object-safe version of [`Handler`] used by registries.
pub trait DynHandler<R: Request>: Send + Sync + 'static {
    /// Handle the request (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        cancellation: &'a CancellationToken,
    ) -> BoxFuture<'a, HandlerOutput<R::Response>>;
}

impl<R: Request, H: Handler<R>> DynHandler<R> for H {
    fn handle_dyn<'a>(
        &'a self,
        request: &'a R,
        cancellation: &'a CancellationToken,
    ) -> BoxFuture<'a, HandlerOutput<R::Response>> {
        Box::pin(self.handle(request, cancellation))
    }
}

/// A handler built from a closure. See [`handler_fn`].
pub struct HandlerFn<R, F> {
    f: F,
    _request: PhantomData<fn(&R)>,
}

/// Wrap a closure as a [`Handler`].
///
/// The returned future cannot borrow the request; copy what the body needs
/// before the `async move` block.
///
/// ```rust,ignore
/// let echo = handler_fn(|req: &Echo, _token| {
///     let text = req.text.clone();
///     async move { Ok(Some(text)) }
/// });
/// ```
pub fn handler_fn<R, F, Fut>(f: F) -> HandlerFn<R, F>
where
    R: Request,
    F: Fn(&R, &CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutput<R::Response>> + Send + 'static,
{
    HandlerFn {
        f,
        _request: PhantomData,
    }
}

impl<R, F, Fut> Handler<R> for HandlerFn<R, F>
where
    R: Request,
    F: Fn(&R, &CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerOutput<R::Response>> + Send + 'static,
{
    fn handle(
        &self,
        request: &R,
        cancellation: &CancellationToken,
    ) -> impl Future<Output = HandlerOutput<R::Response>> + Send {
        (self.f)(request, cancellation)
    }
}
