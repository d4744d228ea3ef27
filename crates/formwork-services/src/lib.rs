#![forbid(unsafe_code)]

//! Named singleton services for Formwork applications.
//!
//! Use a [`ServiceRegistry`] value directly, or the thread-local global
//! through [`ServiceRegistry::global`] and the free functions re-exported
//! here. Teardown outcomes are logged with `tracing` under this crate's
//! `registry` target, one event per service, keyed by the `DISPOSE_*`
//! constants.

pub mod registry;

pub use registry::{
    DISPOSE_0_ARG, DISPOSE_CALLED, DISPOSE_ERROR, DISPOSE_MISSING, DisposeError, DisposeOutcome,
    DisposeReport, Service, ServiceFactory, ServiceHandle, ServiceRegistry, Teardown, deregister_service,
    dispose, get_service, get_service_as, is_service_registered, legacy_clear, register_alias,
    register_service,
};
