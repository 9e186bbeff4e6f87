//! Validation behavior.

use emissary_core::{CancellationToken, HandlerOutput, Next, PipelineBehavior, Request};
use std::{error::Error, marker::PhantomData};

/// A behavior that checks the request before the handler sees it.
///
/// When the validator rejects the request, its error fails the call and the
/// rest of the chain is never run.
///
/// # Example
///
/// ```rust,ignore
/// let validate = ValidationBehavior::new(|req: &CreateUser| {
///     if req.name.is_empty() {
///         Err(InvalidUser::EmptyName)
///     } else {
///         Ok(())
///     }
/// });
/// let registry = RegistryBuilder::new()
///     .register_behavior::<CreateUser>(validate)
///     .register_handler::<CreateUser>(CreateUserHandler)
///     .build();
/// ```
pub struct ValidationBehavior<R, F> {
    validator: F,
    _request: PhantomData<fn(&R)>,
}

impl<R, F, E> ValidationBehavior<R, F>
where
    R: Request,
    F: Fn(&R) -> Result<(), E> + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    /// Create a validation behavior from a validator function.
    pub fn new(validator: F) -> Self {
        Self {
            validator,
            _request: PhantomData,
        }
    }
}

impl<R, F, E> PipelineBehavior<R> for ValidationBehavior<R, F>
where
    R: Request,
    F: Fn(&R) -> Result<(), E> + Send + Sync + 'static,
    E: Error + Send + Sync + 'static,
{
    async fn handle(
        &self,
        request: &R,
        _cancellation: &CancellationToken,
        next: Next<'_, R>,
    ) -> HandlerOutput<R::Response> {
        if let Err(rejection) = (self.validator)(request) {
            tracing::debug!(
                request = std::any::type_name::<R>(),
                %rejection,
                "request rejected by validator"
            );
            return Err(rejection.into());
        }
        next.run().await.map(Some)
    }
}
