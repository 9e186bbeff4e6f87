//! Testing utilities for Emissary.
//!
//! This module provides test doubles for handlers and behaviors.
//!
//! # Features
//!
//! - [`CallLog`]: A shared, ordered record of what ran
//! - [`RecordingBehavior`]: An open behavior that logs entry and exit
//! - [`WrappingBehavior`]: A behavior that decorates `String` responses
//! - [`StaticHandler`], [`NullHandler`], [`FailingHandler`]: Fixed outcomes
//! - [`CountingHandler`], [`CaptureTokenHandler`]: Handlers you can inspect
//! - [`CaptureTokenBehavior`]: An open behavior that remembers its token
//! - [`ShortCircuitBehavior`], [`NullBehavior`]: Behaviors that skip the handler

use emissary_core::{
    CancellationToken, ErasedNext, Handler, HandlerOutput, Next, OpenBehavior, OpenOutput,
    PipelineBehavior, Request, RequestInfo,
};
use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};
use thiserror::Error;

// ============================================================================
// Call Log
// ============================================================================

/// A shared, ordered log of calls.
///
/// Clones share the same entries.
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let registry = RegistryBuilder::new()
///     .register_open_behavior(RecordingBehavior::new("outer", log.clone()))
///     .register_handler::<Ping>(RecordingHandler::new("pong".to_string(), log.clone()))
///     .build();
///
/// mediator.send(Ping, CancellationToken::new()).await?;
/// assert_eq!(log.entries(), ["enter outer", "handler", "exit outer"]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CallLog {
    entries: Arc<Mutex<Vec<String>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&self, entry: impl Into<String>) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    /// Get a copy of the entries, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Check if nothing has been logged.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

// ============================================================================
// Recording Behavior
// ============================================================================

/// An open behavior that logs `enter <label>` before and `exit <label>` after
/// the rest of the chain.
///
/// The exit entry is written whether the chain succeeded or failed.
#[derive(Clone, Debug)]
pub struct RecordingBehavior {
    label: &'static str,
    log: CallLog,
}

impl RecordingBehavior {
    /// Create a recording behavior writing to `log`.
    pub fn new(label: &'static str, log: CallLog) -> Self {
        Self { label, log }
    }
}

impl OpenBehavior for RecordingBehavior {
    async fn handle(
        &self,
        _request: RequestInfo<'_>,
        _cancellation: &CancellationToken,
        next: ErasedNext<'_>,
    ) -> OpenOutput {
        self.log.push(format!("enter {}", self.label));
        let result = next.run().await;
        self.log.push(format!("exit {}", self.label));
        result
    }
}

/// An open behavior that remembers the cancellation token it was given.
#[derive(Clone, Debug, Default)]
pub struct CaptureTokenBehavior {
    seen: Arc<Mutex<Option<CancellationToken>>>,
}

impl CaptureTokenBehavior {
    /// Create a capturing behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// The token seen by the most recent call.
    pub fn token(&self) -> Option<CancellationToken> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl OpenBehavior for CaptureTokenBehavior {
    async fn handle(
        &self,
        _request: RequestInfo<'_>,
        cancellation: &CancellationToken,
        next: ErasedNext<'_>,
    ) -> OpenOutput {
        *self.seen.lock().unwrap_or_else(PoisonError::into_inner) = Some(cancellation.clone());
        next.run().await
    }
}

// ============================================================================
// Wrapping Behavior
// ============================================================================

/// A behavior that turns the inner response `x` into `label(x)`.
///
/// Applies to any request whose response is a `String`.
#[derive(Clone, Copy, Debug)]
pub struct WrappingBehavior {
    label: &'static str,
}

impl WrappingBehavior {
    /// Create a wrapping behavior.
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl<R: Request<Response = String>> PipelineBehavior<R> for WrappingBehavior {
    async fn handle(
        &self,
        _request: &R,
        _cancellation: &CancellationToken,
        next: Next<'_, R>,
    ) -> HandlerOutput<String> {
        let inner = next.run().await?;
        Ok(Some(format!("{}({})", self.label, inner)))
    }
}

// ============================================================================
// Short-circuiting Behaviors
// ============================================================================

/// A behavior that answers with a fixed value and never runs the handler.
#[derive(Clone, Debug)]
pub struct ShortCircuitBehavior<T> {
    value: T,
}

impl<T> ShortCircuitBehavior<T> {
    /// Create a behavior answering with `value`.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<R, T> PipelineBehavior<R> for ShortCircuitBehavior<T>
where
    R: Request<Response = T>,
    T: Clone + Send + Sync + 'static,
{
    async fn handle(
        &self,
        _request: &R,
        _cancellation: &CancellationToken,
        _next: Next<'_, R>,
    ) -> HandlerOutput<T> {
        Ok(Some(self.value.clone()))
    }
}

/// A behavior that produces no response and never runs the handler.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullBehavior;

impl<R: Request> PipelineBehavior<R> for NullBehavior {
    async fn handle(
        &self,
        _request: &R,
        _cancellation: &CancellationToken,
        _next: Next<'_, R>,
    ) -> HandlerOutput<R::Response> {
        Ok(None)
    }
}

// ============================================================================
// Fixed-outcome Handlers
// ============================================================================

/// A handler that always returns a clone of the same value.
#[derive(Clone, Debug)]
pub struct StaticHandler<T> {
    value: T,
}

impl<T> StaticHandler<T> {
    /// Create a handler returning `value`.
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

impl<R, T> Handler<R> for StaticHandler<T>
where
    R: Request<Response = T>,
    T: Clone + Send + Sync + 'static,
{
    async fn handle(&self, _request: &R, _cancellation: &CancellationToken) -> HandlerOutput<T> {
        Ok(Some(self.value.clone()))
    }
}

/// A handler that produces no response.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullHandler;

impl<R: Request> Handler<R> for NullHandler {
    async fn handle(
        &self,
        _request: &R,
        _cancellation: &CancellationToken,
    ) -> HandlerOutput<R::Response> {
        Ok(None)
    }
}

/// Error raised by [`FailingHandler`].
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("test failure: {0}")]
pub struct TestFailure(pub String);

/// A handler that always fails with [`TestFailure`].
#[derive(Clone, Debug)]
pub struct FailingHandler {
    message: String,
}

impl FailingHandler {
    /// Create a handler failing with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl<R: Request> Handler<R> for FailingHandler {
    async fn handle(
        &self,
        _request: &R,
        _cancellation: &CancellationToken,
    ) -> HandlerOutput<R::Response> {
        Err(TestFailure(self.message.clone()).into())
    }
}

// ============================================================================
// Inspectable Handlers
// ============================================================================

/// A handler that logs `handler` to a [`CallLog`] and returns a fixed value.
#[derive(Clone, Debug)]
pub struct RecordingHandler<T> {
    value: T,
    log: CallLog,
}

impl<T> RecordingHandler<T> {
    /// Create a recording handler writing to `log`.
    pub fn new(value: T, log: CallLog) -> Self {
        Self { value, log }
    }
}

impl<R, T> Handler<R> for RecordingHandler<T>
where
    R: Request<Response = T>,
    T: Clone + Send + Sync + 'static,
{
    async fn handle(&self, _request: &R, _cancellation: &CancellationToken) -> HandlerOutput<T> {
        self.log.push("handler");
        Ok(Some(self.value.clone()))
    }
}

/// A handler that counts invocations and returns a fixed value.
///
/// # Example
///
/// ```rust,ignore
/// let counter = CountingHandler::new(());
/// let registry = RegistryBuilder::new()
///     .register_handler::<Ping>(counter.clone())
///     .build();
///
/// mediator.send(Ping, CancellationToken::new()).await?;
/// assert_eq!(counter.count(), 1);
/// ```
#[derive(Clone, Debug)]
pub struct CountingHandler<T> {
    value: T,
    count: Arc<AtomicUsize>,
}

impl<T> CountingHandler<T> {
    /// Create a counting handler returning `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Get the current count.
    pub fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }

    /// Reset the counter.
    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
    }
}

impl<R, T> Handler<R> for CountingHandler<T>
where
    R: Request<Response = T>,
    T: Clone + Send + Sync + 'static,
{
    async fn handle(&self, _request: &R, _cancellation: &CancellationToken) -> HandlerOutput<T> {
        self.count.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.value.clone()))
    }
}

/// A handler that remembers the cancellation token it was given.
#[derive(Clone, Debug)]
pub struct CaptureTokenHandler<T> {
    value: T,
    seen: Arc<Mutex<Option<CancellationToken>>>,
}

impl<T> CaptureTokenHandler<T> {
    /// Create a capturing handler returning `value`.
    pub fn new(value: T) -> Self {
        Self {
            value,
            seen: Arc::new(Mutex::new(None)),
        }
    }

    /// The token seen by the most recent call.
    pub fn token(&self) -> Option<CancellationToken> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl<R, T> Handler<R> for CaptureTokenHandler<T>
where
    R: Request<Response = T>,
    T: Clone + Send + Sync + 'static,
{
    async fn handle(&self, _request: &R, cancellation: &CancellationToken) -> HandlerOutput<T> {
        *self.seen.lock().unwrap_or_else(PoisonError::into_inner) = Some(cancellation.clone());
        Ok(Some(self.value.clone()))
    }
}
