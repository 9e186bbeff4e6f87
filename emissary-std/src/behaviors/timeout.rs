//! Timeout behavior for time-limited requests.
//!
//! The mediator imposes no deadline of its own. This behavior races the rest
//! of the chain against one, using the tokio timer.

use emissary_core::{CancellationToken, ErasedNext, OpenBehavior, OpenOutput, RequestInfo};
use std::time::Duration;
use thiserror::Error;

/// Error returned when the rest of the chain misses its deadline.
#[derive(Debug, Clone, Error)]
#[error("`{request}` timed out after {duration:?}")]
pub struct TimeoutError {
    request: &'static str,
    duration: Duration,
}

impl TimeoutError {
    /// The deadline that was exceeded.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Type name of the request that timed out.
    pub fn request(&self) -> &'static str {
        self.request
    }
}

/// An open behavior that fails the call with [`TimeoutError`] when the rest of
/// the chain takes longer than the configured duration.
///
/// The inner future is dropped at the deadline. Handlers that spawn work of
/// their own should also observe the cancellation token.
///
/// # Runtime Requirements
///
/// Requires a tokio runtime with the time driver enabled.
#[derive(Clone, Copy, Debug)]
pub struct TimeoutBehavior {
    duration: Duration,
}

impl TimeoutBehavior {
    /// Create a new `TimeoutBehavior`.
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }

    /// Create a `TimeoutBehavior` with the timeout specified in seconds.
    pub fn secs(seconds: u64) -> Self {
        Self::new(Duration::from_secs(seconds))
    }

    /// Create a `TimeoutBehavior` with the timeout specified in milliseconds.
    pub fn millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Get the configured timeout duration.
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl OpenBehavior for TimeoutBehavior {
    async fn handle(
        &self,
        request: RequestInfo<'_>,
        _cancellation: &CancellationToken,
        next: ErasedNext<'_>,
    ) -> OpenOutput {
        match tokio::time::timeout(self.duration, next.run()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    request = request.type_name(),
                    duration = ?self.duration,
                    "request timed out"
                );
                Err(TimeoutError {
                    request: request.type_name(),
                    duration: self.duration,
                }
                .into())
            }
        }
    }
}
