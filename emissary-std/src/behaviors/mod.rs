//! Standard pipeline behaviors.
//!
//! - [`LoggingBehavior`]: logs every request (open)
//! - [`TimeoutBehavior`]: fails requests that miss a deadline (open)
//! - [`RetryBehavior`]: re-runs failed requests (open)
//! - [`ValidationBehavior`]: rejects invalid requests before the handler

mod logging;
mod retry;
mod timeout;
mod validation;

pub use logging::LoggingBehavior;
pub use retry::RetryBehavior;
pub use timeout::{TimeoutBehavior, TimeoutError};
pub use validation::ValidationBehavior;
