//! Behavior chain construction.
//!
//! [`build`] turns a handler and an ordered list of behaviors into a single
//! continuation. For registration order `[A, B, C]` and handler `H` the
//! continuation executes as `A(B(C(H())))`: `A` sees the call first and
//! finishes last.

use crate::{
    behavior::DynBehavior,
    error::{BoxError, MediatorError},
    handler::{DynHandler, HandlerOutput},
    request::Request,
};
use futures::future::BoxFuture;
use std::{fmt, sync::Arc};
use tokio_util::sync::CancellationToken;

/// The rest of the chain, as seen by a behavior.
///
/// Running it invokes the next behavior, or the handler once no behaviors
/// remain. Every level has the same type, so behaviors nest to any depth.
/// `Next` is `Copy`; running it again re-runs the remainder of the chain.
pub struct Next<'a, R: Request> {
    request: &'a R,
    cancellation: &'a CancellationToken,
    behaviors: &'a [Arc<dyn DynBehavior<R>>],
    handler: &'a dyn DynHandler<R>,
}

impl<R: Request> Clone for Next<'_, R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R: Request> Copy for Next<'_, R> {}

impl<R: Request> fmt::Debug for Next<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("request", &std::any::type_name::<R>())
            .field("remaining_behaviors", &self.behaviors.len())
            .finish()
    }
}

impl<'a, R: Request> Next<'a, R> {
    /// The request travelling through the chain.
    pub fn request(&self) -> &'a R {
        self.request
    }

    /// The cancellation token shared by every link of this call.
    pub fn cancellation(&self) -> &'a CancellationToken {
        self.cancellation
    }

    /// Number of behaviors between this point and the handler.
    pub fn remaining(&self) -> usize {
        self.behaviors.len()
    }

    /// Run the remainder of the chain.
    ///
    /// An absent response from the inner link is reported as
    /// [`MediatorError::NullResult`]; errors raised inside propagate as-is.
    pub async fn run(&self) -> Result<R::Response, BoxError> {
        match self.invoke().await? {
            Some(response) => Ok(response),
            None => Err(MediatorError::null_result::<R>().into()),
        }
    }

    fn invoke(&self) -> BoxFuture<'a, HandlerOutput<R::Response>> {
        match self.behaviors.split_first() {
            Some((outer, inner)) => outer.handle_dyn(
                self.request,
                self.cancellation,
                Next {
                    behaviors: inner,
                    ..*self
                },
            ),
            None => self.handler.handle_dyn(self.request, self.cancellation),
        }
    }
}

/// Compose `behaviors` around `handler` for one call.
///
/// The first behavior becomes the outermost wrapper. Nothing runs until the
/// returned continuation is run.
pub fn build<'a, R: Request>(
    handler: &'a dyn DynHandler<R>,
    behaviors: &'a [Arc<dyn DynBehavior<R>>],
    request: &'a R,
    cancellation: &'a CancellationToken,
) -> Next<'a, R> {
    Next {
        request,
        cancellation,
        behaviors,
        handler,
    }
}
