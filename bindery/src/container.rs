//! Core functionality for registering bindings and resolving instances.
//!
//! A [Container] maps abstract types to [BindingSet]s. Instances are resolved on demand, along
//! with all their dependencies, using the default binding of the requested type, unless a name is
//! given:
//!
//! ```
//! use bindery::container::Container;
//! use bindery::instance::InstancePtr;
//! use bindery::options::{BindingOptions, ResolveOptions};
//!
//! trait Store: Send + Sync {
//!     fn kind(&self) -> &'static str;
//! }
//!
//! struct LevelDbStore;
//!
//! impl Store for LevelDbStore {
//!     fn kind(&self) -> &'static str {
//!         "leveldb"
//!     }
//! }
//!
//! struct MemoryStore;
//!
//! impl Store for MemoryStore {
//!     fn kind(&self) -> &'static str {
//!         "memory"
//!     }
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register(|| InstancePtr::new(LevelDbStore) as InstancePtr<dyn Store>)
//!     .unwrap();
//! container
//!     .register_with(
//!         || InstancePtr::new(MemoryStore) as InstancePtr<dyn Store>,
//!         BindingOptions::new().name("memory"),
//!     )
//!     .unwrap();
//!
//! let store = container.resolve::<dyn Store>().unwrap();
//! assert_eq!(store.kind(), "leveldb");
//!
//! let store = container
//!     .resolve_with::<dyn Store>(ResolveOptions::new().name("memory"))
//!     .unwrap();
//! assert_eq!(store.kind(), "memory");
//! ```

use crate::binding::{Alias, Binding, BindingSet, ConstructorFn, Recipe};
use crate::config::ContainerConfig;
use crate::error::{RegistrationError, ResolutionError};
use crate::fill::{FieldHints, Fill};
use crate::instance::{caster, Caster, Instance, InstancePtr, TypeKey, Value};
use crate::invoke::{ArgumentResolver, Callable, Outcome, Outputs};
use crate::options::{BindingOptions, CallOptions, ResolveOptions};
use fxhash::{FxHashMap, FxHashSet};
use itertools::Itertools;
use std::any::type_name;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tracing::{debug, trace};

const RESOLVE_TARGET: &str = "resolve request";

/// Where a binding for a requested type lives, along with casts turning its instances into
/// instances of the requested type, when found through aliases.
pub(crate) struct Location {
    key: TypeKey,
    name: String,
    casts: Vec<Caster>,
}

/// Registry of bindings and the resolution engine working on them.
///
/// Cloning a container produces an independent registry: binding sets are copied, while
/// constructors and already resolved instances are shared.
#[derive(Debug, Default)]
pub struct Container {
    config: ContainerConfig,
    bindings: FxHashMap<TypeKey, BindingSet>,
    aliases: FxHashMap<TypeKey, Alias>,
    under_construction: FxHashSet<(TypeKey, String)>,
}

impl Clone for Container {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            bindings: self.bindings.clone(),
            aliases: self.aliases.clone(),
            under_construction: Default::default(),
        }
    }
}

impl Container {
    /// Creates an empty container with default configuration.
    pub fn new() -> Self {
        Default::default()
    }

    /// Creates an empty container with given configuration.
    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            config,
            ..Default::default()
        }
    }

    #[inline]
    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// Registers an unnamed singleton binding for each output of given constructor.
    pub fn register<F, Args, R>(&mut self, constructor: F) -> Result<(), RegistrationError>
    where
        F: Callable<Args, R>,
        Args: 'static,
        R: Outcome + 'static,
        R::Output: Outputs,
    {
        self.register_with(constructor, BindingOptions::new())
    }

    /// Registers a binding for each output of given constructor. Each output is registered under
    /// its declared abstract type, unless overridden by the interface at its position in
    /// `options`. Nothing is registered if any output fails validation.
    pub fn register_with<F, Args, R>(
        &mut self,
        constructor: F,
        options: BindingOptions,
    ) -> Result<(), RegistrationError>
    where
        F: Callable<Args, R>,
        Args: 'static,
        R: Outcome + 'static,
        R::Output: Outputs,
    {
        if let Some(marker) = <R::Output as Outputs>::pointer_markers().first() {
            return Err(RegistrationError::InvalidMarker(marker.name().to_string()));
        }

        let outputs = <R::Output as Outputs>::type_keys();
        let target = outputs
            .first()
            .ok_or_else(|| RegistrationError::InvalidConstructor {
                constructor: type_name::<F>().to_string(),
            })?
            .name();

        let mut registered = FxHashSet::default();
        let keys: Vec<(TypeKey, Option<Caster>)> = outputs
            .iter()
            .enumerate()
            .map(|(index, output)| {
                let (key, cast) = match options.interfaces.get(index).and_then(Option::as_ref) {
                    Some(interface) if interface.source == *output => {
                        (interface.target, Some(interface.cast.clone()))
                    }
                    Some(interface) => {
                        return Err(RegistrationError::InterfaceMismatch {
                            output: output.name().to_string(),
                            interface: interface.target.name().to_string(),
                        })
                    }
                    None => (*output, None),
                };

                let pending = !registered.insert(key);
                self.check_override(key, &options.name, pending)?;

                Ok((key, cast))
            })
            .try_collect()?;

        let erased: ConstructorFn = Arc::new(move |resolver: &mut ArgumentResolver<'_>| {
            Callable::<Args, R>::call_with(&constructor, resolver)?
                .into_outcome()
                .map(Outputs::into_instances)
                .map_err(ResolutionError::Constructor)
        });

        for (output, (key, cast)) in keys.into_iter().enumerate() {
            let binding = Binding::from_constructor(
                options.name.clone(),
                erased.clone(),
                target,
                output,
                cast,
            );

            self.insert_binding(key, configure(binding, &options));
        }

        Ok(())
    }

    /// Registers an already existing instance as the unnamed binding of `T`.
    pub fn register_instance<T>(
        &mut self,
        instance: InstancePtr<T>,
    ) -> Result<(), RegistrationError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.register_instance_with(instance, BindingOptions::new())
    }

    /// Registers an already existing instance with given options. An interface at position 0
    /// registers the instance under its target type instead of `T`. Argument hints and lifestyle
    /// have no effect on instances.
    pub fn register_instance_with<T>(
        &mut self,
        instance: InstancePtr<T>,
        options: BindingOptions,
    ) -> Result<(), RegistrationError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let marker = TypeKey::of::<T>();
        if marker.is_pointer() {
            return Err(RegistrationError::InvalidMarker(marker.name().to_string()));
        }

        let instance = Instance::new(instance);
        let (key, instance) = match options.interfaces.first().and_then(Option::as_ref) {
            Some(interface) => {
                let instance = (interface.source == marker)
                    .then(|| (interface.cast)(&instance))
                    .flatten()
                    .ok_or_else(|| RegistrationError::InterfaceMismatch {
                        output: marker.name().to_string(),
                        interface: interface.target.name().to_string(),
                    })?;

                (interface.target, instance)
            }
            None => (marker, instance),
        };

        self.check_override(key, &options.name, false)?;

        let mut binding = Binding::from_instance(options.name, instance);
        binding.is_default = options.is_default;
        self.insert_binding(key, binding);

        Ok(())
    }

    /// Makes `Sub` resolvable through bindings of `Target`, whenever `Sub` has no bindings of its
    /// own. The cast converts `Target` instances into `Sub` ones.
    pub fn register_sub_interface<Sub, Target, F>(
        &mut self,
        cast: F,
    ) -> Result<(), RegistrationError>
    where
        Sub: ?Sized + Send + Sync + 'static,
        Target: ?Sized + Send + Sync + 'static,
        F: Fn(InstancePtr<Target>) -> InstancePtr<Sub> + Send + Sync + 'static,
    {
        let sub = TypeKey::of::<Sub>();
        let target = TypeKey::of::<Target>();

        if let Some(marker) = [sub, target].into_iter().find(TypeKey::is_pointer) {
            return Err(RegistrationError::InvalidMarker(marker.name().to_string()));
        }

        debug!("Registering {sub} as a sub-interface of {target}.");

        self.aliases.insert(
            sub,
            Alias {
                target,
                cast: caster(cast),
            },
        );

        Ok(())
    }

    /// Changes the default binding of `T`.
    pub fn set_default_binding<T: ?Sized + 'static>(
        &mut self,
        name: &str,
    ) -> Result<(), RegistrationError> {
        let key = TypeKey::of::<T>();
        let switched = self
            .bindings
            .get_mut(&key)
            .map(|set| set.set_default(name))
            .unwrap_or(false);

        if !switched {
            return Err(RegistrationError::NotFound {
                requested: key.name().to_string(),
                name: name.to_string(),
            });
        }

        debug!("Switched default binding of {key} to '{name}'.");
        Ok(())
    }

    /// Resolves the default binding of `T`.
    #[inline]
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(
        &mut self,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        self.resolve_with(ResolveOptions::new())
    }

    /// Resolves a binding of `T` with given options. Arguments in `options` replace the specified
    /// parameters of the binding for this request only, and have no effect on singletons which have
    /// already been resolved.
    pub fn resolve_with<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        options: ResolveOptions,
    ) -> Result<InstancePtr<T>, ResolutionError> {
        let key = TypeKey::of::<T>();
        let location = self
            .lookup(key, options.name.as_deref())
            .ok_or_else(|| ResolutionError::UnresolvedDependency {
                requested: key.name().to_string(),
                name: options.name.clone(),
                target: RESOLVE_TARGET.to_string(),
            })?;

        self.resolve_location(&location, Some(&options.arguments))
            .and_then(|instance| downcast(&instance))
    }

    /// Resolves all bindings of `T`, in unspecified order.
    pub fn resolve_all<T: ?Sized + Send + Sync + 'static>(
        &mut self,
    ) -> Result<Vec<InstancePtr<T>>, ResolutionError> {
        self.locate_all(TypeKey::of::<T>())
            .iter()
            .map(|location| {
                self.resolve_location(location, None)
                    .and_then(|instance| downcast(&instance))
            })
            .try_collect()
    }

    /// Calls given function with resolved arguments and returns its result.
    #[inline]
    pub fn call<F, Args, R>(&mut self, function: F) -> Result<R::Output, ResolutionError>
    where
        F: Callable<Args, R>,
        R: Outcome,
    {
        self.call_with(function, CallOptions::new())
    }

    /// Calls given function with arguments resolved according to `options`. An error returned by
    /// the function is passed through as [ResolutionError::Constructor].
    pub fn call_with<F, Args, R>(
        &mut self,
        function: F,
        options: CallOptions,
    ) -> Result<R::Output, ResolutionError>
    where
        F: Callable<Args, R>,
        R: Outcome,
    {
        let mut resolver = ArgumentResolver::new(self, &options.hints, type_name::<F>());
        Callable::<Args, R>::call_with(&function, &mut resolver)?
            .into_outcome()
            .map_err(ResolutionError::Constructor)
    }

    /// Populates dependency fields of given record.
    #[inline]
    pub fn fill<S: Fill + ?Sized>(&mut self, record: &mut S) -> Result<(), ResolutionError> {
        record.fill(self)
    }

    /// Removes all bindings and aliases.
    pub fn reset(&mut self) {
        debug!("Resetting container.");

        self.bindings.clear();
        self.aliases.clear();
        self.under_construction.clear();
    }

    /// Checks if `T` can be resolved, either directly or through aliases.
    #[inline]
    pub fn is_registered<T: ?Sized + 'static>(&self) -> bool {
        self.lookup(TypeKey::of::<T>(), None).is_some()
    }

    /// Checks if `T` has a binding with given name, either directly or through aliases.
    #[inline]
    pub fn has_binding<T: ?Sized + 'static>(&self, name: &str) -> bool {
        self.lookup(TypeKey::of::<T>(), Some(name)).is_some()
    }

    /// Returns all bindings registered directly for `T`.
    #[inline]
    pub fn binding_set<T: ?Sized + 'static>(&self) -> Option<&BindingSet> {
        self.bindings.get(&TypeKey::of::<T>())
    }

    /// Finds the binding to use for given type: the type's own set if present, otherwise the first
    /// aliased type with a set. A name missing from the found set means no binding.
    pub(crate) fn lookup(&self, key: TypeKey, name: Option<&str>) -> Option<Location> {
        let mut current = key;
        let mut casts = Vec::new();
        let mut visited = FxHashSet::default();

        loop {
            if let Some(set) = self.bindings.get(&current) {
                let name = match name {
                    Some(name) if set.contains(name) => name.to_string(),
                    Some(_) => return None,
                    None => set.default_name().to_string(),
                };

                casts.reverse();
                return Some(Location {
                    key: current,
                    name,
                    casts,
                });
            }

            if !visited.insert(current) {
                return None;
            }

            let alias = self.aliases.get(&current)?;
            casts.push(alias.cast.clone());
            current = alias.target;
        }
    }

    fn locate_all(&self, key: TypeKey) -> Vec<Location> {
        let Some(location) = self.lookup(key, None) else {
            return Vec::new();
        };

        self.bindings
            .get(&location.key)
            .map(|set| {
                set.names()
                    .map(|name| Location {
                        key: location.key,
                        name: name.to_string(),
                        casts: location.casts.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub(crate) fn resolve_location(
        &mut self,
        location: &Location,
        arguments: Option<&FxHashMap<usize, Value>>,
    ) -> Result<Instance, ResolutionError> {
        let instance = self.resolve_binding(location.key, &location.name, arguments)?;

        location.casts.iter().try_fold(instance, |instance, cast| {
            cast(&instance)
                .ok_or_else(|| ResolutionError::IncompatibleInstance(instance.key().to_string()))
        })
    }

    pub(crate) fn field_instance<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        hints: &FieldHints,
    ) -> Result<Option<InstancePtr<T>>, ResolutionError> {
        let key = TypeKey::of::<T>();
        match self.lookup(key, hints.name) {
            Some(location) => self
                .resolve_location(&location, None)
                .and_then(|instance| downcast(&instance))
                .map(Some),
            None if hints.optional && self.lookup(key, None).is_none() => Ok(None),
            None => Err(unresolved_field(key, hints)),
        }
    }

    pub(crate) fn field_instances<T: ?Sized + Send + Sync + 'static>(
        &mut self,
        hints: &FieldHints,
    ) -> Result<Vec<InstancePtr<T>>, ResolutionError> {
        let key = TypeKey::of::<T>();
        let locations = self.locate_all(key);

        if locations.is_empty() && !hints.optional {
            return Err(unresolved_field(key, hints));
        }

        locations
            .iter()
            .map(|location| {
                self.resolve_location(location, None)
                    .and_then(|instance| downcast(&instance))
            })
            .try_collect()
    }

    fn resolve_binding(
        &mut self,
        key: TypeKey,
        name: &str,
        arguments: Option<&FxHashMap<usize, Value>>,
    ) -> Result<Instance, ResolutionError> {
        let binding = self
            .bindings
            .get(&key)
            .and_then(|set| set.get(name))
            .ok_or_else(|| ResolutionError::UnresolvedDependency {
                requested: key.name().to_string(),
                name: optional_name(name),
                target: RESOLVE_TARGET.to_string(),
            })?;

        if let Some(instance) = &binding.instance {
            trace!("Reusing instance of {key} named '{name}'.");
            return Ok(instance.clone());
        }

        let (constructor, target, output, cast) = match &binding.recipe {
            Recipe::Constructor {
                constructor,
                target,
                output,
                cast,
            } => (constructor.clone(), *target, *output, cast.clone()),
            Recipe::Instance => {
                return Err(ResolutionError::ConstructorReturnedNoValue {
                    target: key.name().to_string(),
                })
            }
        };

        let lifestyle = binding.lifestyle;
        let mut hints = binding.hints.clone();
        if let Some(arguments) = arguments.filter(|arguments| !arguments.is_empty()) {
            hints.parameters = arguments.clone();
        }

        let construction = (key, name.to_string());
        if self.config.detect_cycles && !self.under_construction.insert(construction.clone()) {
            return Err(ResolutionError::CircularDependency {
                requested: key.name().to_string(),
                name: optional_name(name),
            });
        }

        trace!("Constructing {key} named '{name}' as {lifestyle:?}.");

        let outputs = constructor(&mut ArgumentResolver::new(self, &hints, target));

        if self.config.detect_cycles {
            self.under_construction.remove(&construction);
        }

        let instance = outputs?.into_iter().nth(output).ok_or_else(|| {
            ResolutionError::ConstructorReturnedNoValue {
                target: target.to_string(),
            }
        })?;

        let instance = match cast {
            Some(cast) => cast(&instance)
                .ok_or_else(|| ResolutionError::IncompatibleInstance(key.name().to_string()))?,
            None => instance,
        };

        if !lifestyle.is_transient() {
            if let Some(binding) = self
                .bindings
                .get_mut(&key)
                .and_then(|set| set.get_mut(name))
            {
                binding.instance = Some(instance.clone());
            }
        }

        Ok(instance)
    }

    fn check_override(
        &self,
        key: TypeKey,
        name: &str,
        pending: bool,
    ) -> Result<(), RegistrationError> {
        let exists = pending
            || self
                .bindings
                .get(&key)
                .map(|set| set.contains(name))
                .unwrap_or(false);

        if exists && !self.config.allow_binding_override {
            return Err(RegistrationError::DuplicateBindingName {
                requested: key.name().to_string(),
                name: name.to_string(),
            });
        }

        Ok(())
    }

    fn insert_binding(&mut self, key: TypeKey, binding: Binding) {
        debug!(
            "Registering {key} named '{}' as {:?}.",
            binding.name, binding.lifestyle
        );

        match self.bindings.entry(key) {
            Entry::Occupied(mut entry) => entry.get_mut().insert(binding),
            Entry::Vacant(entry) => {
                entry.insert(BindingSet::new(binding));
            }
        }
    }
}

fn configure(mut binding: Binding, options: &BindingOptions) -> Binding {
    binding.hints = options.hints.clone();
    binding.lifestyle = options.lifestyle;
    binding.is_default = options.is_default;
    binding
}

fn downcast<T: ?Sized + 'static>(instance: &Instance) -> Result<InstancePtr<T>, ResolutionError> {
    instance
        .downcast()
        .ok_or_else(|| ResolutionError::IncompatibleInstance(instance.key().to_string()))
}

fn optional_name(name: &str) -> Option<String> {
    (!name.is_empty()).then(|| name.to_string())
}

fn unresolved_field(key: TypeKey, hints: &FieldHints) -> ResolutionError {
    ResolutionError::UnresolvedField {
        field: hints.field.to_string(),
        requested: key.name().to_string(),
        name: hints.name.map(str::to_string),
    }
}
