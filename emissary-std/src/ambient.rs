//! Task-local ambient cancellation.
//!
//! A server that handles inbound operations can run each one inside
//! [`scope`], binding the operation's token to the task. Any `send` made by
//! a [`Mediator`](crate::Mediator) configured with [`TaskLocalAmbient`]
//! during that operation then observes the operation's token instead of the
//! one its caller passed.

use emissary_core::{AmbientCancellation, CancellationToken};
use std::future::Future;

tokio::task_local! {
    static AMBIENT_TOKEN: CancellationToken;
}

/// Run `future` with `token` as the ambient cancellation token.
///
/// Scopes nest; the innermost token is the ambient one.
pub async fn scope<F: Future>(token: CancellationToken, future: F) -> F::Output {
    AMBIENT_TOKEN.scope(token, future).await
}

/// The token bound by the enclosing [`scope`], if any.
pub fn current() -> Option<CancellationToken> {
    AMBIENT_TOKEN.try_with(CancellationToken::clone).ok()
}

/// Ambient provider backed by the task-local [`scope`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskLocalAmbient;

impl AmbientCancellation for TaskLocalAmbient {
    fn current(&self) -> Option<CancellationToken> {
        current()
    }
}
