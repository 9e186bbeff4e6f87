//! Retry behavior.

use emissary_core::{
    BoxError, CancellationToken, ErasedNext, MediatorError, OpenBehavior, OpenOutput, RequestInfo,
};
use std::{num::NonZeroU32, time::Duration};

/// An open behavior that re-runs the rest of the chain when it fails.
///
/// Stops retrying when:
/// - the attempt budget is spent,
/// - the call's cancellation token is cancelled,
/// - the failure is raised by the mediator itself (a missing handler, a
///   missing response or a broken registry entry does not get better by
///   trying again).
///
/// A handler failure that reached this behavior through a nested `send` is
/// retried like any other handler failure.
///
/// The last failure is returned unchanged.
#[derive(Clone, Copy, Debug)]
pub struct RetryBehavior {
    attempts: NonZeroU32,
    delay: Duration,
}

impl RetryBehavior {
    /// Allow up to `attempts` runs in total, back to back.
    pub fn new(attempts: NonZeroU32) -> Self {
        Self {
            attempts,
            delay: Duration::ZERO,
        }
    }

    /// Wait `delay` between attempts.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Total number of runs allowed.
    pub fn attempts(&self) -> u32 {
        self.attempts.get()
    }
}

fn is_dispatch_failure(error: &BoxError) -> bool {
    error
        .downcast_ref::<MediatorError>()
        .is_some_and(|err| !matches!(err, MediatorError::Handler(_)))
}

impl OpenBehavior for RetryBehavior {
    async fn handle(
        &self,
        request: RequestInfo<'_>,
        cancellation: &CancellationToken,
        next: ErasedNext<'_>,
    ) -> OpenOutput {
        let mut attempt = 1;
        loop {
            let error = match next.run().await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            let exhausted = attempt >= self.attempts.get();
            if exhausted || cancellation.is_cancelled() || is_dispatch_failure(&error) {
                return Err(error);
            }

            tracing::debug!(
                request = request.type_name(),
                attempt,
                %error,
                "retrying request"
            );
            attempt += 1;

            if !self.delay.is_zero() {
                tokio::select! {
                    () = tokio::time::sleep(self.delay) => {}
                    () = cancellation.cancelled() => return Err(error),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emissary_core::Request;

    struct Ping;
    impl Request for Ping {
        type Response = ();
    }

    #[derive(Debug, thiserror::Error)]
    #[error("flaky")]
    struct Flaky;

    #[test]
    fn test_mediator_failures_are_not_retried() {
        let not_found: BoxError = MediatorError::handler_not_found::<Ping>().into();
        let null: BoxError = MediatorError::null_result::<Ping>().into();
        assert!(is_dispatch_failure(&not_found));
        assert!(is_dispatch_failure(&null));
    }

    #[test]
    fn test_forwarded_handler_failures_are_retried() {
        let forwarded: BoxError = MediatorError::Handler(Box::new(Flaky)).into();
        let direct: BoxError = Box::new(Flaky);
        assert!(!is_dispatch_failure(&forwarded));
        assert!(!is_dispatch_failure(&direct));
    }
}
