//! The mediator: the public dispatch entry point.
//!
//! A call moves strictly forward through resolving, chaining, invoking and
//! validating, and ends succeeded or failed. The mediator never retries and
//! never recovers from a failure; retries belong in a behavior.

use crate::registry::HandlerRegistry;
use emissary_core::{
    AmbientCancellation, CancellationToken, MediatorError, NoAmbient, Request, Sender,
    effective_token,
};
use std::{any::type_name, future::Future, sync::Arc};
use tracing::Instrument;

/// Dispatches requests through a shared [`HandlerRegistry`].
///
/// Cloning is cheap; clones share the registry. The mediator holds no
/// per-call state, so one instance serves any number of concurrent calls.
///
/// # Example
///
/// ```rust,ignore
/// let mediator = Mediator::new(registry).with_ambient(TaskLocalAmbient);
/// let user = mediator.send(GetUser { id: 7 }, CancellationToken::new()).await?;
/// ```
pub struct Mediator<A = NoAmbient> {
    registry: Arc<HandlerRegistry>,
    ambient: A,
}

impl Mediator<NoAmbient> {
    /// Create a mediator without an ambient cancellation source.
    pub fn new(registry: HandlerRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Create a mediator over an already shared registry.
    pub fn from_shared(registry: Arc<HandlerRegistry>) -> Self {
        Self {
            registry,
            ambient: NoAmbient,
        }
    }
}

impl<A> Mediator<A> {
    /// Replace the ambient cancellation source.
    pub fn with_ambient<B: AmbientCancellation>(self, ambient: B) -> Mediator<B> {
        Mediator {
            registry: self.registry,
            ambient,
        }
    }

    /// The registry this mediator dispatches through.
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }
}

impl<A: AmbientCancellation> Mediator<A> {
    /// Dispatch `request` to its handler through the registered behaviors.
    ///
    /// `cancellation` is used only when the ambient source has no token.
    ///
    /// # Errors
    ///
    /// - [`MediatorError::HandlerNotFound`] when `R` has no handler; no
    ///   behavior runs.
    /// - [`MediatorError::NullResult`] when any link produced no response.
    /// - [`MediatorError::Handler`] carrying the original failure of a
    ///   handler or behavior.
    pub async fn send<R: Request>(
        &self,
        request: R,
        cancellation: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let span = tracing::debug_span!("send", request = type_name::<R>());
        self.dispatch(request, cancellation).instrument(span).await
    }

    async fn dispatch<R: Request>(
        &self,
        request: R,
        cancellation: CancellationToken,
    ) -> Result<R::Response, MediatorError> {
        let token = effective_token(self.ambient.current(), cancellation);
        tracing::trace!("resolving handler");

        let handler = self.registry.resolve_handler::<R>().inspect_err(|err| {
            tracing::warn!(error = %err, "request has no handler");
        })?;
        let behaviors = self.registry.resolve_behaviors::<R>()?;
        tracing::trace!(behaviors = behaviors.len(), "chain resolved");

        let next = emissary_core::build(handler.as_ref(), &behaviors, &request, &token);
        tracing::trace!("invoking chain");
        let outcome = next.run().await.map_err(MediatorError::from_boxed);

        match &outcome {
            Ok(_) => tracing::debug!("request handled"),
            Err(err) => tracing::debug!(error = %err, "request failed"),
        }
        outcome
    }
}

impl<A: Clone> Clone for Mediator<A> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            ambient: self.ambient.clone(),
        }
    }
}

impl<A> std::fmt::Debug for Mediator<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mediator")
            .field("registry", &self.registry)
            .field("ambient", &type_name::<A>())
            .finish()
    }
}

impl<A: AmbientCancellation> Sender for Mediator<A> {
    fn send<R: Request>(
        &self,
        request: R,
        cancellation: CancellationToken,
    ) -> impl Future<Output = Result<R::Response, MediatorError>> + Send {
        Mediator::send(self, request, cancellation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryBuilder;
    use emissary_core::{Handler, HandlerOutput};

    struct Ping;
    impl Request for Ping {
        type Response = String;
    }

    struct Unhandled;
    impl Request for Unhandled {
        type Response = ();
    }

    struct PingHandler;
    impl Handler<Ping> for PingHandler {
        async fn handle(&self, _: &Ping, _: &CancellationToken) -> HandlerOutput<String> {
            Ok(Some("pong".to_string()))
        }
    }

    fn mediator() -> Mediator {
        Mediator::new(
            RegistryBuilder::new()
                .register_handler::<Ping>(PingHandler)
                .build(),
        )
    }

    #[tokio::test]
    async fn test_send_returns_handler_value() {
        let out = mediator().send(Ping, CancellationToken::new()).await.unwrap();
        assert_eq!(out, "pong");
    }

    #[tokio::test]
    async fn test_send_unregistered_is_not_found() {
        let err = mediator()
            .send(Unhandled, CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_handler_not_found());
    }

    #[tokio::test]
    async fn test_clones_share_registry() {
        let first = mediator();
        let second = first.clone();
        assert!(std::ptr::eq(first.registry(), second.registry()));
        assert_eq!(second.send(Ping, CancellationToken::new()).await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_interleaved_sends_do_not_share_state() {
        let mediator = mediator();
        let calls = (0..8).map(|_| mediator.send(Ping, CancellationToken::new()));
        let results = futures::future::join_all(calls).await;
        assert!(results.into_iter().all(|r| r.is_ok_and(|out| out == "pong")));
    }

    async fn via_sender<S: Sender>(sender: &S) -> Result<String, MediatorError> {
        sender.send(Ping, CancellationToken::new()).await
    }

    #[tokio::test]
    async fn test_sender_trait_dispatches() {
        assert_eq!(via_sender(&mediator()).await.unwrap(), "pong");
    }
}
