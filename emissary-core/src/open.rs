//! Open behaviors: behaviors that apply to every request type.
//!
//! An open behavior cannot name the request or response type, so it works on
//! a type-erased view of the call: [`RequestInfo`] describes the request and
//! [`ErasedNext`] runs the rest of the chain, yielding the response as an
//! [`AnyResponse`]. The registry adapts an open behavior to each request type
//! it is dispatched for; handing back a response of a different type than the
//! one received is a contract violation.

use crate::{error::BoxError, pipeline::Next, request::Request};
use futures::future::BoxFuture;
use std::{any::Any, fmt, future::Future};
use tokio_util::sync::CancellationToken;

/// A response whose concrete type has been erased.
pub type AnyResponse = Box<dyn Any + Send>;

/// Result of an open behavior.
pub type OpenOutput = Result<AnyResponse, BoxError>;

/// Type-erased view of the request being dispatched.
#[derive(Clone, Copy)]
pub struct RequestInfo<'a> {
    type_name: &'static str,
    response_type_name: &'static str,
    request: &'a (dyn Any + Send + Sync),
}

impl<'a> RequestInfo<'a> {
    /// Describe a typed request.
    pub fn of<R: Request>(request: &'a R) -> Self {
        Self {
            type_name: std::any::type_name::<R>(),
            response_type_name: std::any::type_name::<R::Response>(),
            request,
        }
    }

    /// Full type name of the request.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Full type name of the expected response.
    pub fn response_type_name(&self) -> &'static str {
        self.response_type_name
    }

    /// Borrow the request as `T`, if that is its type.
    pub fn downcast_ref<T: Any>(&self) -> Option<&'a T> {
        self.request.downcast_ref::<T>()
    }
}

impl fmt::Debug for RequestInfo<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestInfo")
            .field("type_name", &self.type_name)
            .field("response_type_name", &self.response_type_name)
            .finish()
    }
}

trait ErasedRun: Send + Sync {
    fn run_erased(&self) -> BoxFuture<'_, OpenOutput>;
}

impl<R: Request> ErasedRun for Next<'_, R> {
    fn run_erased(&self) -> BoxFuture<'_, OpenOutput> {
        Box::pin(async move {
            self.run()
                .await
                .map(|response| Box::new(response) as AnyResponse)
        })
    }
}

/// The rest of the chain, seen through an open behavior.
#[derive(Clone, Copy)]
pub struct ErasedNext<'a> {
    inner: &'a (dyn ErasedRun + 'a),
}

impl<'a> ErasedNext<'a> {
    /// Erase a typed continuation.
    pub fn new<R: Request>(next: &'a Next<'a, R>) -> Self {
        Self { inner: next }
    }

    /// Run the remainder of the chain.
    ///
    /// An absent response is already reported as a `NullResult` error here.
    pub async fn run(&self) -> OpenOutput {
        self.inner.run_erased().await
    }
}

impl fmt::Debug for ErasedNext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErasedNext").finish_non_exhaustive()
    }
}

/// A behavior applied to every request type.
///
/// Registered once, it wraps the handler of any request dispatched through
/// the registry, at its registration position.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an open behavior",
    label = "missing `OpenBehavior` implementation",
    note = "Open behaviors must implement `handle` over `RequestInfo` and `ErasedNext`."
)]
pub trait OpenBehavior: Send + Sync + 'static {
    /// Intercept any call.
    fn handle(
        &self,
        request: RequestInfo<'_>,
        cancellation: &CancellationToken,
        next: ErasedNext<'_>,
    ) -> impl Future<Output = OpenOutput> + Send;
}

/// Object-safe version of [`OpenBehavior`].
pub trait DynOpenBehavior: Send + Sync + 'static {
    /// Intercept any call (dynamic dispatch version).
    fn handle_dyn<'a>(
        &'a self,
        request: RequestInfo<'a>,
        cancellation: &'a CancellationToken,
        next: ErasedNext<'a>,
    ) -> BoxFuture<'a, OpenOutput>;
}

impl<B: OpenBehavior> DynOpenBehavior for B {
    fn handle_dyn<'a>(
        &'a self,
        request: RequestInfo<'a>,
        cancellation: &'a CancellationToken,
        next: ErasedNext<'a>,
    ) -> BoxFuture<'a, OpenOutput> {
        Box::pin(self.handle(request, cancellation, next))
    }
}
