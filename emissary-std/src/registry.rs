//! Handler registry.
//!
//! Entries are keyed by the `(request, response)` type pair. A
//! [`RegistryBuilder`] collects handlers and behaviors at startup; `build()`
//! freezes them into a [`HandlerRegistry`] that is only read during dispatch
//! and can be shared across threads behind an `Arc`.
//!
//! # Resolution rules
//!
//! - Lookup is exact on the type pair. There is no fallback.
//! - Registering a second handler for the same pair replaces the first:
//!   the last registration wins.
//! - Behaviors resolve in registration order, open behaviors included at the
//!   position they were registered. The registry never re-sorts.
//! - When a behavior type is registered both as an open behavior and as a
//!   behavior specialized for a request type, only the specialized
//!   registration runs for that request type.

use emissary_core::{
    CancellationToken, DynBehavior, DynHandler, DynOpenBehavior, ErasedNext, Handler,
    HandlerOutput, MediatorError, Next, OpenBehavior, PipelineBehavior, Request, RequestInfo,
};
use std::{
    any::{Any, TypeId, type_name, type_name_of_val},
    collections::{HashMap, HashSet},
    fmt,
    marker::PhantomData,
    sync::{Arc, PoisonError, RwLock},
};

/// Registry key: the request type and the response type it declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegistryKey {
    request: TypeId,
    response: TypeId,
}

impl RegistryKey {
    /// Key for request type `R`.
    pub fn of<R: Request>() -> Self {
        Self {
            request: TypeId::of::<R>(),
            response: TypeId::of::<R::Response>(),
        }
    }
}

struct HandlerEntry {
    name: &'static str,
    // Always an `Arc<dyn DynHandler<R>>` for the `R` of its key.
    handler: Box<dyn Any + Send + Sync>,
}

enum BehaviorSlot {
    Specialized {
        key: RegistryKey,
        kind: TypeId,
        name: &'static str,
        // Always an `Arc<dyn DynBehavior<R>>` for the `R` of its key.
        behavior: Box<dyn Any + Send + Sync>,
    },
    Open {
        kind: TypeId,
        name: &'static str,
        behavior: Arc<dyn DynOpenBehavior>,
    },
}

impl BehaviorSlot {
    fn name(&self) -> &'static str {
        match self {
            BehaviorSlot::Specialized { name, .. } | BehaviorSlot::Open { name, .. } => *name,
        }
    }

    fn resolve<R: Request>(&self) -> Result<Arc<dyn DynBehavior<R>>, MediatorError> {
        match self {
            BehaviorSlot::Specialized { name, behavior, .. } => behavior
                .downcast_ref::<Arc<dyn DynBehavior<R>>>()
                .cloned()
                .ok_or_else(|| {
                    MediatorError::contract_violation::<R>(format!(
                        "behavior `{name}` is stored under a key it does not handle"
                    ))
                }),
            BehaviorSlot::Open { behavior, .. } => {
                let adapted: Arc<dyn DynBehavior<R>> =
                    Arc::new(OpenAdapter::<R>::new(Arc::clone(behavior)));
                Ok(adapted)
            }
        }
    }
}

/// Slot indices of each chain, in registration order.
///
/// Request types with specialized behaviors get their own plan; every other
/// request type runs the open behaviors only.
struct ChainPlans {
    specialized: HashMap<RegistryKey, Vec<usize>>,
    open: Vec<usize>,
}

impl ChainPlans {
    fn new(slots: &[BehaviorSlot]) -> Self {
        let mut kinds: HashMap<RegistryKey, HashSet<TypeId>> = HashMap::new();
        for slot in slots {
            if let BehaviorSlot::Specialized { key, kind, .. } = slot {
                kinds.entry(*key).or_default().insert(*kind);
            }
        }

        let specialized = kinds
            .into_iter()
            .map(|(key, overridden)| {
                let plan = slots
                    .iter()
                    .enumerate()
                    .filter(|(_, slot)| match slot {
                        BehaviorSlot::Specialized { key: k, .. } => *k == key,
                        BehaviorSlot::Open { kind, .. } => !overridden.contains(kind),
                    })
                    .map(|(index, _)| index)
                    .collect();
                (key, plan)
            })
            .collect();

        let open = slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| matches!(slot, BehaviorSlot::Open { .. }))
            .map(|(index, _)| index)
            .collect();

        Self { specialized, open }
    }

    fn for_key(&self, key: &RegistryKey) -> &[usize] {
        self.specialized
            .get(key)
            .map_or(self.open.as_slice(), Vec::as_slice)
    }
}

fn type_id_of<T: 'static>(_: &T) -> TypeId {
    TypeId::of::<T>()
}

// ============================================================================
// RegistryBuilder - for constructing registries
// ============================================================================

/// Builder for constructing a [`HandlerRegistry`].
///
/// # Example
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .register_handler::<GetUser>(UserHandler::new(db))
///     .register_open_behavior(LoggingBehavior::new())
///     .register_behavior::<GetUser>(ValidationBehavior::new(validate_user))
///     .build();
/// ```
pub struct RegistryBuilder {
    handlers: HashMap<RegistryKey, HandlerEntry>,
    behaviors: Vec<BehaviorSlot>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
            behaviors: Vec::new(),
        }
    }

    /// Register the handler for request type `R`.
    pub fn register_handler<R: Request>(mut self, handler: impl Handler<R>) -> Self {
        self.register_handler_mut::<R>(handler);
        self
    }

    /// Register the handler for request type `R` (mutable version).
    ///
    /// Replaces any handler already registered for `R`.
    pub fn register_handler_mut<R: Request>(&mut self, handler: impl Handler<R>) {
        let name = type_name_of_val(&handler);
        let handler: Arc<dyn DynHandler<R>> = Arc::new(handler);
        let entry = HandlerEntry {
            name,
            handler: Box::new(handler),
        };
        if let Some(previous) = self.handlers.insert(RegistryKey::of::<R>(), entry) {
            tracing::debug!(
                request = type_name::<R>(),
                replaced = previous.name,
                handler = name,
                "handler replaced, last registration wins"
            );
        }
    }

    /// Register a behavior for request type `R`.
    pub fn register_behavior<R: Request>(mut self, behavior: impl PipelineBehavior<R>) -> Self {
        self.register_behavior_mut::<R>(behavior);
        self
    }

    /// Register a behavior for request type `R` (mutable version).
    pub fn register_behavior_mut<R: Request>(&mut self, behavior: impl PipelineBehavior<R>) {
        let kind = type_id_of(&behavior);
        let name = type_name_of_val(&behavior);
        let behavior: Arc<dyn DynBehavior<R>> = Arc::new(behavior);
        self.behaviors.push(BehaviorSlot::Specialized {
            key: RegistryKey::of::<R>(),
            kind,
            name,
            behavior: Box::new(behavior),
        });
    }

    /// Register a behavior that applies to every request type.
    pub fn register_open_behavior(mut self, behavior: impl OpenBehavior) -> Self {
        self.register_open_behavior_mut(behavior);
        self
    }

    /// Register a behavior that applies to every request type (mutable version).
    pub fn register_open_behavior_mut(&mut self, behavior: impl OpenBehavior) {
        let kind = type_id_of(&behavior);
        let name = type_name_of_val(&behavior);
        self.behaviors.push(BehaviorSlot::Open {
            kind,
            name,
            behavior: Arc::new(behavior),
        });
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of registered behaviors, open ones included.
    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }

    /// Check if nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty() && self.behaviors.is_empty()
    }

    /// Freeze the registrations.
    pub fn build(self) -> HandlerRegistry {
        tracing::debug!(
            handlers = self.handlers.len(),
            behaviors = self.behaviors.len(),
            "handler registry built"
        );
        HandlerRegistry {
            plans: ChainPlans::new(&self.behaviors),
            handlers: self.handlers,
            behaviors: self.behaviors,
            chains: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// HandlerRegistry - immutable, thread-safe storage
// ============================================================================

/// An immutable, thread-safe registry of handlers and behaviors.
pub struct HandlerRegistry {
    handlers: HashMap<RegistryKey, HandlerEntry>,
    behaviors: Vec<BehaviorSlot>,
    plans: ChainPlans,
    // Always an `Arc<[Arc<dyn DynBehavior<R>>]>` for the `R` of its key.
    chains: RwLock<HashMap<RegistryKey, Box<dyn Any + Send + Sync>>>,
}

impl HandlerRegistry {
    /// Start a new [`RegistryBuilder`].
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The handler for request type `R`.
    pub fn resolve_handler<R: Request>(&self) -> Result<Arc<dyn DynHandler<R>>, MediatorError> {
        let entry = self
            .handlers
            .get(&RegistryKey::of::<R>())
            .ok_or_else(MediatorError::handler_not_found::<R>)?;

        entry
            .handler
            .downcast_ref::<Arc<dyn DynHandler<R>>>()
            .cloned()
            .ok_or_else(|| {
                MediatorError::contract_violation::<R>(format!(
                    "handler `{}` is stored under a key it does not handle",
                    entry.name
                ))
            })
    }

    /// The behaviors wrapping request type `R`, outermost first.
    ///
    /// The chain is assembled on first use and shared by later calls.
    pub fn resolve_behaviors<R: Request>(
        &self,
    ) -> Result<Arc<[Arc<dyn DynBehavior<R>>]>, MediatorError> {
        let key = RegistryKey::of::<R>();
        let cached = self
            .chains
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&key)
            .and_then(|chain| chain.downcast_ref::<Arc<[Arc<dyn DynBehavior<R>>]>>())
            .cloned();
        if let Some(chain) = cached {
            return Ok(chain);
        }

        let chain = self
            .plans
            .for_key(&key)
            .iter()
            .map(|&index| self.behaviors[index].resolve::<R>())
            .collect::<Result<Arc<[_]>, _>>()?;
        self.chains
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, Box::new(Arc::clone(&chain)));
        Ok(chain)
    }

    /// Check if a handler is registered for request type `R`.
    pub fn contains<R: Request>(&self) -> bool {
        self.handlers.contains_key(&RegistryKey::of::<R>())
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Number of registered behaviors, open ones included.
    pub fn behavior_count(&self) -> usize {
        self.behaviors.len()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<&str> = self.handlers.values().map(|e| e.name).collect();
        handlers.sort_unstable();
        let behaviors: Vec<&str> = self.behaviors.iter().map(BehaviorSlot::name).collect();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &handlers)
            .field("behaviors", &behaviors)
            .finish()
    }
}

// ============================================================================
// OpenAdapter - an open behavior seen as a behavior for one request type
// ============================================================================

struct OpenAdapter<R> {
    inner: Arc<dyn DynOpenBehavior>,
    _request: PhantomData<fn(&R)>,
}

impl<R> OpenAdapter<R> {
    fn new(inner: Arc<dyn DynOpenBehavior>) -> Self {
        Self {
            inner,
            _request: PhantomData,
        }
    }
}

impl<R: Request> PipelineBehavior<R> for OpenAdapter<R> {
    async fn handle(
        &self,
        request: &R,
        cancellation: &CancellationToken,
        next: Next<'_, R>,
    ) -> HandlerOutput<R::Response> {
        let response = self
            .inner
            .handle_dyn(RequestInfo::of(request), cancellation, ErasedNext::new(&next))
            .await?;

        match response.downcast::<R::Response>() {
            Ok(response) => Ok(Some(*response)),
            Err(_) => Err(MediatorError::contract_violation::<R>(
                "open behavior returned a response of another type",
            )
            .into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use emissary_core::{AnyResponse, OpenOutput};

    struct Ping;
    impl Request for Ping {
        type Response = String;
    }

    struct Pong;
    impl Request for Pong {
        type Response = u32;
    }

    struct Fixed(&'static str);
    impl Handler<Ping> for Fixed {
        async fn handle(&self, _: &Ping, _: &CancellationToken) -> HandlerOutput<String> {
            Ok(Some(self.0.to_string()))
        }
    }

    struct Label(&'static str);
    impl PipelineBehavior<Ping> for Label {
        async fn handle(
            &self,
            _: &Ping,
            _: &CancellationToken,
            next: Next<'_, Ping>,
        ) -> HandlerOutput<String> {
            Ok(Some(format!("{}:{}", self.0, next.run().await?)))
        }
    }

    struct Observe;
    impl OpenBehavior for Observe {
        async fn handle(
            &self,
            _: RequestInfo<'_>,
            _: &CancellationToken,
            next: ErasedNext<'_>,
        ) -> OpenOutput {
            next.run().await
        }
    }

    impl PipelineBehavior<Ping> for Observe {
        async fn handle(
            &self,
            _: &Ping,
            _: &CancellationToken,
            next: Next<'_, Ping>,
        ) -> HandlerOutput<String> {
            Ok(Some(format!("observed:{}", next.run().await?)))
        }
    }

    struct Swap;
    impl OpenBehavior for Swap {
        async fn handle(
            &self,
            _: RequestInfo<'_>,
            _: &CancellationToken,
            _: ErasedNext<'_>,
        ) -> OpenOutput {
            Ok(Box::new(7_u64) as AnyResponse)
        }
    }

    async fn send(registry: &HandlerRegistry) -> Result<String, MediatorError> {
        let handler = registry.resolve_handler::<Ping>()?;
        let behaviors = registry.resolve_behaviors::<Ping>()?;
        let token = CancellationToken::new();
        emissary_core::build(handler.as_ref(), &behaviors, &Ping, &token)
            .run()
            .await
            .map_err(MediatorError::from_boxed)
    }

    #[test]
    fn test_missing_handler_is_not_found() {
        let registry = RegistryBuilder::new()
            .register_handler::<Ping>(Fixed("x"))
            .build();
        let err = registry.resolve_handler::<Pong>().err().unwrap();
        assert!(err.is_handler_not_found());
        assert!(registry.contains::<Ping>());
        assert!(!registry.contains::<Pong>());
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let registry = RegistryBuilder::new()
            .register_handler::<Ping>(Fixed("first"))
            .register_handler::<Ping>(Fixed("second"))
            .build();
        assert_eq!(registry.handler_count(), 1);
        assert_eq!(send(&registry).await.unwrap(), "second");
    }

    #[tokio::test]
    async fn test_behaviors_keep_registration_order() {
        let registry = RegistryBuilder::new()
            .register_behavior::<Ping>(Label("a"))
            .register_handler::<Ping>(Fixed("h"))
            .register_behavior::<Ping>(Label("b"))
            .build();
        assert_eq!(send(&registry).await.unwrap(), "a:b:h");
    }

    #[test]
    fn test_behaviors_are_scoped_to_their_request() {
        let registry = RegistryBuilder::new()
            .register_behavior::<Ping>(Label("a"))
            .register_open_behavior(Observe)
            .build();
        assert_eq!(registry.resolve_behaviors::<Ping>().unwrap().len(), 2);
        assert_eq!(registry.resolve_behaviors::<Pong>().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_specialized_registration_replaces_open_one() {
        let registry = RegistryBuilder::new()
            .register_open_behavior(Observe)
            .register_behavior::<Ping>(Label("a"))
            .register_behavior::<Ping>(Observe)
            .register_handler::<Ping>(Fixed("h"))
            .build();
        assert_eq!(registry.resolve_behaviors::<Ping>().unwrap().len(), 2);
        assert_eq!(send(&registry).await.unwrap(), "a:observed:h");
        // Requests without a specialization still get the open registration.
        assert_eq!(registry.resolve_behaviors::<Pong>().unwrap().len(), 1);
    }

    #[test]
    fn test_chains_are_assembled_once_per_request() {
        let registry = RegistryBuilder::new()
            .register_behavior::<Ping>(Label("a"))
            .register_open_behavior(Observe)
            .build();

        let first = registry.resolve_behaviors::<Ping>().unwrap();
        let second = registry.resolve_behaviors::<Ping>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let open_only = registry.resolve_behaviors::<Pong>().unwrap();
        assert_eq!(open_only.len(), 1);
        assert!(Arc::ptr_eq(
            &open_only,
            &registry.resolve_behaviors::<Pong>().unwrap()
        ));
    }

    #[tokio::test]
    async fn test_duplicate_registrations_are_not_deduplicated() {
        let registry = RegistryBuilder::new()
            .register_behavior::<Ping>(Label("a"))
            .register_behavior::<Ping>(Label("a"))
            .register_handler::<Ping>(Fixed("h"))
            .build();
        assert_eq!(send(&registry).await.unwrap(), "a:a:h");
    }

    #[tokio::test]
    async fn test_open_behavior_swapping_response_type_is_a_violation() {
        let registry = RegistryBuilder::new()
            .register_open_behavior(Swap)
            .register_handler::<Ping>(Fixed("h"))
            .build();
        let err = send(&registry).await.unwrap_err();
        assert!(matches!(err, MediatorError::ContractViolation { .. }));
    }

    #[test]
    fn test_debug_lists_registrations() {
        let registry = RegistryBuilder::new()
            .register_handler::<Ping>(Fixed("h"))
            .register_open_behavior(Observe)
            .build();
        let debug = format!("{registry:?}");
        assert!(debug.contains("Fixed"));
        assert!(debug.contains("Observe"));
    }
}
