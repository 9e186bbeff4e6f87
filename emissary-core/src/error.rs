//! Error types for Emissary.
//!
//! - [`MediatorError`] - every way a `send` call can fail
//! - [`BoxError`] - the error currency inside a behavior chain

use crate::request::{Request, names};
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors surfaced to the caller of a dispatch.
///
/// Handler and behavior failures keep their original type: the
/// [`Handler`](MediatorError::Handler) variant is transparent and can be
/// inspected with [`downcast_ref`](MediatorError::downcast_ref).
#[derive(Error, Debug)]
pub enum MediatorError {
    /// No handler is registered for the request/response pair.
    #[error("no handler registered for `{request}` responding with `{response}`")]
    HandlerNotFound {
        /// Request type name.
        request: &'static str,
        /// Response type name.
        response: &'static str,
    },

    /// A handler or behavior completed without producing a response.
    #[error("`{request}` produced no response")]
    NullResult {
        /// Request type name.
        request: &'static str,
    },

    /// A registry entry or open behavior did not have the expected shape.
    #[error("contract violation for `{request}`: {reason}")]
    ContractViolation {
        /// Request type name.
        request: &'static str,
        /// What was wrong with the entry.
        reason: String,
    },

    /// The failure raised by a handler or behavior, unchanged.
    #[error(transparent)]
    Handler(BoxError),
}

impl MediatorError {
    /// `HandlerNotFound` for request type `R`.
    pub fn handler_not_found<R: Request>() -> Self {
        let (request, response) = names::<R>();
        MediatorError::HandlerNotFound { request, response }
    }

    /// `NullResult` for request type `R`.
    pub fn null_result<R: Request>() -> Self {
        MediatorError::NullResult {
            request: std::any::type_name::<R>(),
        }
    }

    /// `ContractViolation` for request type `R`.
    pub fn contract_violation<R: Request>(reason: impl Into<String>) -> Self {
        MediatorError::ContractViolation {
            request: std::any::type_name::<R>(),
            reason: reason.into(),
        }
    }

    /// Recover a `MediatorError` from the chain's boxed error.
    ///
    /// Errors that are themselves `MediatorError`s (a nested `NullResult`,
    /// a failure returned from an inner `send`) come back as they were;
    /// anything else is a handler failure.
    pub fn from_boxed(err: BoxError) -> Self {
        match err.downcast::<MediatorError>() {
            Ok(inner) => *inner,
            Err(other) => MediatorError::Handler(other),
        }
    }

    /// Returns true for `HandlerNotFound`.
    pub fn is_handler_not_found(&self) -> bool {
        matches!(self, MediatorError::HandlerNotFound { .. })
    }

    /// Returns true for `NullResult`.
    pub fn is_null_result(&self) -> bool {
        matches!(self, MediatorError::NullResult { .. })
    }

    /// Borrow the original handler failure as `E`, if that is what it is.
    pub fn downcast_ref<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            MediatorError::Handler(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }

    /// Take the original handler failure out, or give `self` back.
    pub fn into_handler_failure(self) -> Result<BoxError, Self> {
        match self {
            MediatorError::Handler(inner) => Ok(inner),
            other => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;
    impl Request for Ping {
        type Response = String;
    }

    #[derive(Debug, Error)]
    #[error("ledger is closed")]
    struct LedgerClosed;

    #[test]
    fn test_from_boxed_keeps_mediator_errors() {
        let boxed: BoxError = Box::new(MediatorError::null_result::<Ping>());
        let err = MediatorError::from_boxed(boxed);
        assert!(err.is_null_result());
    }

    #[test]
    fn test_from_boxed_wraps_foreign_errors_transparently() {
        let err = MediatorError::from_boxed(Box::new(LedgerClosed));
        assert_eq!(err.to_string(), "ledger is closed");
        assert!(err.downcast_ref::<LedgerClosed>().is_some());

        let inner = err.into_handler_failure().unwrap();
        assert!(inner.downcast::<LedgerClosed>().is_ok());
    }

    #[test]
    fn test_handler_not_found_names_both_types() {
        let err = MediatorError::handler_not_found::<Ping>();
        assert!(err.is_handler_not_found());
        let message = err.to_string();
        assert!(message.contains("Ping"));
        assert!(message.contains("String"));
    }
}
