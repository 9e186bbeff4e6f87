//! Cancellation arbitration.
//!
//! A call observes exactly one cancellation token. When the surrounding
//! operation (an inbound request, a job, a session) exposes its own token,
//! that ambient token bounds the call and the caller's explicit token is
//! ignored. Otherwise the explicit token is used unchanged.

use tokio_util::sync::CancellationToken;

/// Source of the ambient cancellation token for the current call, if any.
///
/// Implementations are consulted once per dispatch, before any behavior or
/// handler runs.
#[diagnostic::on_unimplemented(
    message = "`{Self}` cannot provide an ambient cancellation token",
    label = "missing `AmbientCancellation` implementation",
    note = "Implement `current` or pass a closure `Fn() -> Option<CancellationToken>`."
)]
pub trait AmbientCancellation: Send + Sync + 'static {
    /// The ambient token, or `None` outside any ambient operation.
    fn current(&self) -> Option<CancellationToken>;
}

/// An ambient provider that never has a token.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoAmbient;

impl AmbientCancellation for NoAmbient {
    fn current(&self) -> Option<CancellationToken> {
        None
    }
}

impl<F> AmbientCancellation for F
where
    F: Fn() -> Option<CancellationToken> + Send + Sync + 'static,
{
    fn current(&self) -> Option<CancellationToken> {
        (self)()
    }
}

/// Choose the token a call observes.
pub fn effective_token(
    ambient: Option<CancellationToken>,
    explicit: CancellationToken,
) -> CancellationToken {
    ambient.unwrap_or(explicit)
}
