//! # emissary - In-process request/response mediator
//!
//! `emissary` decouples the code that asks for something from the code that
//! computes it. A caller sends a typed [`Request`]; the [`Mediator`] finds
//! the single [`Handler`] registered for that request type, wraps it in the
//! registered [`PipelineBehavior`]s and returns the handler's response.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use emissary::prelude::*;
//!
//! #[derive(Request)]
//! #[request(response = String)]
//! struct Greet {
//!     name: String,
//! }
//!
//! struct GreetHandler;
//!
//! impl Handler<Greet> for GreetHandler {
//!     async fn handle(&self, req: &Greet, _: &CancellationToken) -> HandlerOutput<String> {
//!         Ok(Some(format!("hello, {}", req.name)))
//!     }
//! }
//!
//! let registry = RegistryBuilder::new()
//!     .register_open_behavior(LoggingBehavior::new())
//!     .register_handler::<Greet>(GreetHandler)
//!     .build();
//! let mediator = Mediator::new(registry);
//!
//! let greeting = mediator
//!     .send(Greet { name: "ada".into() }, CancellationToken::new())
//!     .await?;
//! ```
//!
//! ## Behaviors
//!
//! Behaviors run in registration order, the first registered outermost:
//! behaviors `[A, B, C]` around handler `H` execute as `A(B(C(H)))`.
//!
//! ## Cancellation
//!
//! A call observes exactly one token. When the mediator's ambient provider
//! (for example [`TaskLocalAmbient`]) has a token, it wins over the token
//! passed to `send`.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use emissary_core::{
    // Cancellation
    AmbientCancellation,
    // Open behaviors
    AnyResponse,
    // Errors
    BoxError,
    BoxFuture,
    CancellationToken,
    // Behaviors
    DynBehavior,
    DynHandler,
    DynOpenBehavior,
    ErasedNext,
    // Handler
    Handler,
    HandlerFn,
    HandlerOutput,
    MediatorError,
    Next,
    NoAmbient,
    OpenBehavior,
    OpenOutput,
    PipelineBehavior,
    // Request
    Request,
    RequestInfo,
    // Dispatch
    Sender,
    build,
    effective_token,
    handler_fn,
};

pub use emissary_std::{HandlerRegistry, Mediator, RegistryBuilder, RegistryKey, TaskLocalAmbient};

/// Task-local ambient cancellation.
pub mod ambient {
    pub use emissary_std::ambient::{TaskLocalAmbient, current, scope};
}

/// Standard behavior implementations.
pub mod behaviors {
    #![allow(clippy::wildcard_imports)]
    pub use emissary_std::behaviors::*;
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use emissary_std::testing::*;
}

/// Prelude module - common imports for Emissary.
///
/// # Usage
///
/// ```rust,ignore
/// use emissary::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        BoxError,
        CancellationToken,
        // Core traits
        Handler,
        HandlerOutput,
        MediatorError,
        Next,
        OpenBehavior,
        PipelineBehavior,
        Request,
        Sender,
        // Standard implementations
        Mediator,
        RegistryBuilder,
        TaskLocalAmbient,
        behaviors::{LoggingBehavior, RetryBehavior, TimeoutBehavior, ValidationBehavior},
        handler_fn,
    };
}

#[cfg(feature = "macros")]
pub use emissary_macros::Request;
