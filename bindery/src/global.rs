//! Process-wide container, for applications which prefer ambient registration over passing a
//! [Container] around.
//!
//! The container is created on first access, with configuration read by
//! [ContainerConfig::init_from_environment]. Access is serialized by a mutex held for the whole
//! operation, so constructors resolved through this module must not call back into it.
//!
//! ```
//! use bindery::global;
//! use bindery::instance::InstancePtr;
//!
//! trait Clock: Send + Sync {
//!     fn height(&self) -> u64;
//! }
//!
//! struct FixedClock;
//!
//! impl Clock for FixedClock {
//!     fn height(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! global::register(|| InstancePtr::new(FixedClock) as InstancePtr<dyn Clock>).unwrap();
//! assert_eq!(global::resolve::<dyn Clock>().unwrap().height(), 42);
//! ```

use crate::config::ContainerConfig;
use crate::container::Container;
use crate::error::{RegistrationError, ResolutionError};
use crate::fill::Fill;
use crate::instance::InstancePtr;
use crate::invoke::{Callable, Outcome, Outputs};
use crate::options::{BindingOptions, ResolveOptions};
use once_cell::sync::Lazy;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

static CONTAINER: Lazy<Mutex<Container>> = Lazy::new(|| {
    let config = ContainerConfig::init_from_environment().unwrap_or_else(|error| {
        warn!("Cannot read container configuration, using defaults: {error}");
        Default::default()
    });

    Mutex::new(Container::with_config(config))
});

/// Runs given function with exclusive access to the global container.
pub fn with_container<T, F: FnOnce(&mut Container) -> T>(f: F) -> T {
    let mut container = CONTAINER.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut container)
}

/// See [Container::register].
pub fn register<F, Args, R>(constructor: F) -> Result<(), RegistrationError>
where
    F: Callable<Args, R>,
    Args: 'static,
    R: Outcome + 'static,
    R::Output: Outputs,
{
    with_container(|container| container.register(constructor))
}

/// See [Container::register_with].
pub fn register_with<F, Args, R>(
    constructor: F,
    options: BindingOptions,
) -> Result<(), RegistrationError>
where
    F: Callable<Args, R>,
    Args: 'static,
    R: Outcome + 'static,
    R::Output: Outputs,
{
    with_container(|container| container.register_with(constructor, options))
}

/// See [Container::register_instance].
pub fn register_instance<T>(instance: InstancePtr<T>) -> Result<(), RegistrationError>
where
    T: ?Sized + Send + Sync + 'static,
{
    with_container(|container| container.register_instance(instance))
}

/// See [Container::register_sub_interface].
pub fn register_sub_interface<Sub, Target, F>(cast: F) -> Result<(), RegistrationError>
where
    Sub: ?Sized + Send + Sync + 'static,
    Target: ?Sized + Send + Sync + 'static,
    F: Fn(InstancePtr<Target>) -> InstancePtr<Sub> + Send + Sync + 'static,
{
    with_container(|container| container.register_sub_interface(cast))
}

pub fn resolve<T: ?Sized + Send + Sync + 'static>() -> Result<InstancePtr<T>, ResolutionError> {
    with_container(Container::resolve::<T>)
}

pub fn resolve_with<T: ?Sized + Send + Sync + 'static>(
    options: ResolveOptions,
) -> Result<InstancePtr<T>, ResolutionError> {
    with_container(|container| container.resolve_with(options))
}

pub fn call<F, Args, R>(function: F) -> Result<R::Output, ResolutionError>
where
    F: Callable<Args, R>,
    R: Outcome,
{
    with_container(|container| container.call(function))
}

pub fn fill<S: Fill + ?Sized>(record: &mut S) -> Result<(), ResolutionError> {
    with_container(|container| container.fill(record))
}

/// Removes everything registered in the global container.
pub fn reset() {
    with_container(Container::reset)
}
