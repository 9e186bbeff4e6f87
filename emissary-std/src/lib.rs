//! # emissary-std
//!
//! Standard implementations for the Emissary mediator.
//!
//! This crate provides:
//! - **Registry**: [`RegistryBuilder`], [`HandlerRegistry`]
//! - **Dispatch**: [`Mediator`]
//! - **Ambient cancellation**: [`TaskLocalAmbient`] and [`ambient::scope`]
//! - **Standard behaviors**: Logging, Timeout, Retry, Validation
//! - **Test doubles**: the [`testing`] module

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use emissary_core;

// Modules
pub mod ambient;
pub mod behaviors;
mod dispatcher;
mod registry;
pub mod testing;

pub use ambient::TaskLocalAmbient;
pub use dispatcher::Mediator;
pub use registry::{HandlerRegistry, RegistryBuilder, RegistryKey};
