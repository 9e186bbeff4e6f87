//! Request trait for dispatchable messages.

/// A typed request that resolves to exactly one response.
///
/// The concrete type of the request selects the handler; the associated
/// [`Response`](Request::Response) type is what the caller gets back.
/// Requests must be `Send + Sync + 'static` so a single call can be driven
/// on any executor thread while every link of the chain borrows it.
///
/// # Example
///
/// ```rust,ignore
/// struct GetUser { id: u64 }
///
/// impl Request for GetUser {
///     type Response = User;
/// }
/// ```
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a valid Request",
    label = "missing `Request` implementation",
    note = "Declare the response with `impl Request for {Self} {{ type Response = ...; }}` or `#[derive(Request)]`."
)]
pub trait Request: Send + Sync + 'static {
    /// The value produced by the handler for this request.
    type Response: Send + 'static;
}

/// Static type names of a request, used in diagnostics and errors.
pub(crate) fn names<R: Request>() -> (&'static str, &'static str) {
    (
        std::any::type_name::<R>(),
        std::any::type_name::<R::Response>(),
    )
}
