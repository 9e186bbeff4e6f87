//! Dispatcher core trait.

use crate::{error::MediatorError, request::Request};
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Something that dispatches requests to their handlers.
///
/// Code that only needs to send requests (including handlers that send
/// follow-up requests) should depend on this trait rather than on a concrete
/// dispatcher.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot send requests",
    label = "missing `Sender` implementation",
    note = "Implement `Sender` to dispatch requests to handlers."
)]
pub trait Sender: Send + Sync {
    /// Dispatch `request` and wait for its response.
    fn send<R: Request>(
        &self,
        request: R,
        cancellation: CancellationToken,
    ) -> impl Future<Output = Result<R::Response, MediatorError>> + Send;
}
