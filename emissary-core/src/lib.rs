//! # emissary-core
//!
//! Core traits for the Emissary request/response mediator.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that defines requests, handlers and behaviors without needing the
//! registry or dispatcher from `emissary-std`.
//!
//! # Building Blocks
//!
//! ## [`Request`]
//!
//! A typed message whose concrete type selects the handler and whose
//! associated `Response` type is what the caller receives.
//!
//! ## [`Handler`]
//!
//! The single computation for a request type. It is always the innermost
//! link of a call.
//!
//! ## [`PipelineBehavior`] and [`OpenBehavior`]
//!
//! Interceptors around the handler, run in registration order with the first
//! one outermost. A behavior receives a [`Next`] continuation and decides
//! whether, and how often, to run it. Open behaviors apply to every request
//! type through a type-erased view.
//!
//! ## Cancellation
//!
//! [`effective_token`] picks the single token a call observes: the ambient
//! one from an [`AmbientCancellation`] provider when present, the caller's
//! explicit token otherwise.
//!
//! # Error Types
//!
//! - [`MediatorError`] - every way a dispatch can fail
//! - [`BoxError`] - the error type carried through the chain

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod behavior;
mod cancellation;
mod error;
mod handler;
mod open;
mod pipeline;
mod request;
mod sender;

// Re-exports
pub use behavior::{DynBehavior, PipelineBehavior};
pub use cancellation::{AmbientCancellation, NoAmbient, effective_token};
pub use error::{BoxError, MediatorError};
pub use futures::future::BoxFuture;
pub use handler::{DynHandler, Handler, HandlerFn, HandlerOutput, handler_fn};
pub use open::{AnyResponse, DynOpenBehavior, ErasedNext, OpenBehavior, OpenOutput, RequestInfo};
pub use pipeline::{Next, build};
pub use request::Request;
pub use sender::Sender;
pub use tokio_util::sync::CancellationToken;
