#![forbid(unsafe_code)]

//! Keyed singleton services with deterministic teardown.
//!
//! A [`ServiceRegistry`] maps unique names to shared service instances.
//! Names unknown to the registry may still resolve through an alias factory,
//! which constructs the service on first lookup and caches it.
//!
//! # Invariants
//!
//! 1. A name is bound to at most one instance.
//! 2. [`dispose`](ServiceRegistry::dispose) visits services in registration
//!    order and always visits all of them; one failing teardown never stops
//!    the others.
//! 3. After `dispose` or `legacy_clear` the registry is empty; calling either
//!    again is a no-op.
//! 4. No registry borrow is held while a factory or a teardown runs, so
//!    either may call back into the registry.
//!
//! # Failure Modes
//!
//! | Operation | Failure | Result |
//! |-----------|---------|--------|
//! | `register_service` | name taken | `Err(DuplicateService)` |
//! | `register_service` | `None` instance | `Err(UndefinedInstance)` |
//! | `get_service` | no instance, no alias | `Err(NotRegistered)` |
//! | `get_service_as` | other concrete type | `Err(ServiceTypeMismatch)` |
//! | `dispose` | teardown errors or panics | logged at `error`, recorded in the report |

use std::any::{Any, type_name};
use std::cell::RefCell;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use formwork_core::error::{FormworkError, Result};

/// Log key: a service was disposed.
pub const DISPOSE_CALLED: &str = "DISPOSE_CALLED";
/// Log key: a service has no dispose method.
pub const DISPOSE_MISSING: &str = "DISPOSE_MISSING";
/// Log key: a service's dispose method needs arguments and was skipped.
pub const DISPOSE_0_ARG: &str = "DISPOSE_0_ARG";
/// Log key: a service's dispose method failed.
pub const DISPOSE_ERROR: &str = "DISPOSE_ERROR";

thread_local! {
    static GLOBAL_REGISTRY: ServiceRegistry = ServiceRegistry::new();
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Error a service reports from its teardown.
pub type DisposeError = Box<dyn Error>;

/// How a service wants to be torn down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Teardown {
    /// Nothing to do.
    Missing,
    /// Teardown needs arguments the registry cannot supply; skipped.
    RequiresArguments,
    /// Call [`Service::dispose`].
    Available,
}

/// A value that can live in a [`ServiceRegistry`].
///
/// Services with nothing to release can use the defaults. A service that
/// does release resources returns [`Teardown::Available`] and implements
/// [`dispose`](Service::dispose).
pub trait Service: Any {
    fn teardown(&self) -> Teardown {
        Teardown::Missing
    }

    fn dispose(&self) -> std::result::Result<(), DisposeError> {
        Ok(())
    }
}

/// A registered instance, usable both as a [`Service`] and for downcasting.
#[derive(Clone)]
pub struct ServiceHandle {
    any: Rc<dyn Any>,
    service: Rc<dyn Service>,
    type_name: &'static str,
}

impl ServiceHandle {
    /// Wrap a concrete service.
    #[must_use]
    pub fn new<S: Service>(service: Rc<S>) -> Self {
        Self {
            any: Rc::clone(&service) as Rc<dyn Any>,
            service,
            type_name: type_name::<S>(),
        }
    }

    /// The instance as its concrete type, if it is an `S`.
    #[must_use]
    pub fn downcast<S: Service>(&self) -> Option<Rc<S>> {
        Rc::clone(&self.any).downcast::<S>().ok()
    }

    #[must_use]
    pub fn service(&self) -> &Rc<dyn Service> {
        &self.service
    }

    /// Type name of the concrete service.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Whether both handles refer to one instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.any, &other.any)
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceHandle").field(&self.type_name).finish()
    }
}

/// Builds a service for an alias name on first lookup.
pub type ServiceFactory = Rc<dyn Fn() -> ServiceHandle>;

// ---------------------------------------------------------------------------
// Dispose report
// ---------------------------------------------------------------------------

/// What happened to one service during [`ServiceRegistry::dispose`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisposeOutcome {
    Disposed,
    Missing,
    RequiresArguments,
    /// Teardown returned an error or panicked; carries the message.
    Failed(String),
}

/// Per-service outcomes of one dispose pass, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisposeReport {
    entries: Vec<(String, DisposeOutcome)>,
}

impl DisposeReport {
    #[must_use]
    pub fn entries(&self) -> &[(String, DisposeOutcome)] {
        &self.entries
    }

    /// Outcome for `name`, if it was visited.
    #[must_use]
    pub fn outcome(&self, name: &str) -> Option<&DisposeOutcome> {
        self.entries
            .iter()
            .find(|(visited, _)| visited == name)
            .map(|(_, outcome)| outcome)
    }

    /// Names whose teardown failed.
    pub fn failures(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|(name, outcome)| {
            matches!(outcome, DisposeOutcome::Failed(_)).then_some(name.as_str())
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

#[derive(Default)]
struct RegistryState {
    services: HashMap<String, ServiceHandle>,
    order: Vec<String>,
    aliases: HashMap<String, ServiceFactory>,
}

/// Name-keyed service registry. Clones share the registry.
#[derive(Clone, Default)]
pub struct ServiceRegistry {
    state: Rc<RefCell<RegistryState>>,
}

impl ServiceRegistry {
    /// Empty registry with no aliases.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry preloaded with alias factories.
    #[must_use]
    pub fn with_aliases(aliases: impl IntoIterator<Item = (String, ServiceFactory)>) -> Self {
        let registry = Self::new();
        registry.state.borrow_mut().aliases.extend(aliases);
        registry
    }

    /// Access the thread-local global registry.
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Clone::clone)
    }

    /// Bind `instance` to `name`.
    ///
    /// # Errors
    ///
    /// `UndefinedInstance` for `None`; `DuplicateService` if `name` is taken.
    pub fn register_service<S: Service>(
        &self,
        name: impl Into<String>,
        instance: impl Into<Option<Rc<S>>>,
    ) -> Result<()> {
        let instance = instance.into().ok_or(FormworkError::UndefinedInstance)?;
        self.register_handle(name, ServiceHandle::new(instance))
    }

    /// Bind an already wrapped instance to `name`.
    ///
    /// # Errors
    ///
    /// `DuplicateService` if `name` is taken.
    pub fn register_handle(&self, name: impl Into<String>, handle: ServiceHandle) -> Result<()> {
        let name = name.into();
        let mut state = self.state.borrow_mut();
        if state.services.contains_key(&name) {
            return Err(FormworkError::DuplicateService(name));
        }
        tracing::trace!(service = %name, kind = handle.type_name(), "service registered");
        state.order.push(name.clone());
        state.services.insert(name, handle);
        Ok(())
    }

    /// Look up `name`, constructing it from its alias factory if needed.
    ///
    /// # Errors
    ///
    /// `NotRegistered` if there is neither an instance nor an alias.
    pub fn get_service(&self, name: &str) -> Result<ServiceHandle> {
        let factory = {
            let state = self.state.borrow();
            if let Some(handle) = state.services.get(name) {
                return Ok(handle.clone());
            }
            state.aliases.get(name).cloned()
        };
        let factory = factory.ok_or_else(|| FormworkError::NotRegistered(name.to_owned()))?;

        let built = factory();
        tracing::debug!(service = name, kind = built.type_name(), "service built from alias");
        // The factory may have registered the name itself.
        if let Some(existing) = self.state.borrow().services.get(name) {
            return Ok(existing.clone());
        }
        self.register_handle(name, built.clone())?;
        Ok(built)
    }

    /// Look up `name` as a concrete `S`.
    ///
    /// # Errors
    ///
    /// As [`get_service`](Self::get_service), plus `ServiceTypeMismatch`
    /// when the instance is not an `S`.
    pub fn get_service_as<S: Service>(&self, name: &str) -> Result<Rc<S>> {
        self.get_service(name)?
            .downcast::<S>()
            .ok_or_else(|| FormworkError::ServiceTypeMismatch {
                name: name.to_owned(),
                expected: type_name::<S>(),
            })
    }

    /// Whether an instance is bound to `name`. Aliases do not count.
    #[must_use]
    pub fn is_service_registered(&self, name: &str) -> bool {
        self.state.borrow().services.contains_key(name)
    }

    /// Unbind `name` without disposing it. Returns whether it was bound.
    pub fn deregister_service(&self, name: &str) -> bool {
        let mut state = self.state.borrow_mut();
        let removed = state.services.remove(name).is_some();
        if removed {
            state.order.retain(|registered| registered != name);
        }
        removed
    }

    /// Add or replace the alias factory for `name`.
    pub fn register_alias(&self, name: impl Into<String>, factory: impl Fn() -> ServiceHandle + 'static) {
        self.state
            .borrow_mut()
            .aliases
            .insert(name.into(), Rc::new(factory));
    }

    /// Bound names in registration order.
    #[must_use]
    pub fn service_names(&self) -> Vec<String> {
        self.state.borrow().order.clone()
    }

    /// Tear down every service in registration order, then empty the
    /// registry. Aliases survive.
    pub fn dispose(&self) -> DisposeReport {
        let services: Vec<(String, ServiceHandle)> = {
            let state = self.state.borrow();
            state
                .order
                .iter()
                .filter_map(|name| state.services.get(name).map(|h| (name.clone(), h.clone())))
                .collect()
        };

        let mut report = DisposeReport::default();
        for (name, handle) in services {
            let outcome = dispose_service(&name, handle.service().as_ref());
            report.entries.push((name, outcome));
        }
        self.legacy_clear();
        report
    }

    /// Empty the registry without disposing anything.
    pub fn legacy_clear(&self) {
        let mut state = self.state.borrow_mut();
        state.services.clear();
        state.order.clear();
    }
}

impl fmt::Debug for ServiceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ServiceRegistry")
            .field("services", &state.order)
            .field("aliases", &state.aliases.len())
            .finish()
    }
}

fn dispose_service(name: &str, service: &dyn Service) -> DisposeOutcome {
    match service.teardown() {
        Teardown::Missing => {
            tracing::debug!(key = DISPOSE_MISSING, service = name, "service has no dispose method");
            DisposeOutcome::Missing
        }
        Teardown::RequiresArguments => {
            tracing::info!(
                key = DISPOSE_0_ARG,
                service = name,
                "dispose method takes arguments; skipped"
            );
            DisposeOutcome::RequiresArguments
        }
        Teardown::Available => match catch_unwind(AssertUnwindSafe(|| service.dispose())) {
            Ok(Ok(())) => {
                tracing::debug!(key = DISPOSE_CALLED, service = name, "service disposed");
                DisposeOutcome::Disposed
            }
            Ok(Err(err)) => failed(name, err.to_string()),
            Err(panic) => failed(name, panic_message(panic.as_ref())),
        },
    }
}

fn failed(name: &str, message: String) -> DisposeOutcome {
    tracing::error!(key = DISPOSE_ERROR, service = name, error = %message, "service dispose failed");
    DisposeOutcome::Failed(message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "(non-string panic)".to_owned())
}

// ---------------------------------------------------------------------------
// Global helpers
// ---------------------------------------------------------------------------

/// Convenience: register on the global registry.
///
/// # Errors
///
/// See [`ServiceRegistry::register_service`].
pub fn register_service<S: Service>(
    name: impl Into<String>,
    instance: impl Into<Option<Rc<S>>>,
) -> Result<()> {
    ServiceRegistry::global().register_service(name, instance)
}

/// Convenience: look up on the global registry.
///
/// # Errors
///
/// See [`ServiceRegistry::get_service`].
pub fn get_service(name: &str) -> Result<ServiceHandle> {
    ServiceRegistry::global().get_service(name)
}

/// Convenience: typed lookup on the global registry.
///
/// # Errors
///
/// See [`ServiceRegistry::get_service_as`].
pub fn get_service_as<S: Service>(name: &str) -> Result<Rc<S>> {
    ServiceRegistry::global().get_service_as(name)
}

#[must_use]
pub fn is_service_registered(name: &str) -> bool {
    ServiceRegistry::global().is_service_registered(name)
}

pub fn deregister_service(name: &str) -> bool {
    ServiceRegistry::global().deregister_service(name)
}

pub fn register_alias(name: impl Into<String>, factory: impl Fn() -> ServiceHandle + 'static) {
    ServiceRegistry::global().register_alias(name, factory);
}

/// Convenience: dispose the global registry.
pub fn dispose() -> DisposeReport {
    ServiceRegistry::global().dispose()
}

/// Convenience: clear the global registry without disposing.
pub fn legacy_clear() {
    ServiceRegistry::global().legacy_clear();
}
