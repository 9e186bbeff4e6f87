//! Logging behavior for request observation.

use emissary_core::{CancellationToken, ErasedNext, OpenBehavior, OpenOutput, RequestInfo};
use std::time::Instant;

/// An open behavior that logs every request it wraps.
///
/// Entry is logged at `debug`, completion at `debug` with the elapsed time,
/// and failures at `warn`.
///
/// # Example
///
/// ```rust,ignore
/// let registry = RegistryBuilder::new()
///     .register_open_behavior(LoggingBehavior::named("billing"))
///     .register_handler::<Charge>(ChargeHandler)
///     .build();
/// ```
#[derive(Clone, Copy, Debug)]
pub struct LoggingBehavior {
    name: &'static str,
}

impl LoggingBehavior {
    /// Create a new `LoggingBehavior` with a default name.
    pub fn new() -> Self {
        Self { name: "mediator" }
    }

    /// Create a new `LoggingBehavior` with a custom name.
    ///
    /// The name is used in log records to identify the pipeline.
    pub fn named(name: &'static str) -> Self {
        Self { name }
    }

    /// The pipeline name used in log records.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Default for LoggingBehavior {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenBehavior for LoggingBehavior {
    async fn handle(
        &self,
        request: RequestInfo<'_>,
        _cancellation: &CancellationToken,
        next: ErasedNext<'_>,
    ) -> OpenOutput {
        tracing::debug!(
            pipeline = %self.name,
            request = request.type_name(),
            "handling request"
        );
        let started = Instant::now();
        let result = next.run().await;
        let elapsed = started.elapsed();

        match &result {
            Ok(_) => tracing::debug!(
                pipeline = %self.name,
                request = request.type_name(),
                ?elapsed,
                "request handled"
            ),
            Err(error) => tracing::warn!(
                pipeline = %self.name,
                request = request.type_name(),
                ?elapsed,
                %error,
                "request failed"
            ),
        }
        result
    }
}
