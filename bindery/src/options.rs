//! Configuration records applied when registering bindings, resolving instances and calling
//! functions.

use crate::binding::{ArgumentHints, Lifestyle};
use crate::instance::{caster, Caster, InstancePtr, TypeKey, Value};
use derivative::Derivative;
use fxhash::FxHashMap;

/// Registers a constructor output under a different abstract type than its declared one. The cast
/// ties the declared `Source` type to the `Target` it implements, which is validated against the
/// actual constructor output at registration time.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct InterfaceCast {
    pub(crate) source: TypeKey,
    pub(crate) target: TypeKey,
    #[derivative(Debug = "ignore")]
    pub(crate) cast: Caster,
}

impl InterfaceCast {
    /// Creates a cast from `Source` to `Target`. Typically `cast` is a simple unsizing coercion:
    /// `InterfaceCast::new(|store: InstancePtr<LevelDbStore>| store as InstancePtr<dyn Store>)`.
    pub fn new<Source, Target, F>(cast: F) -> Self
    where
        Source: ?Sized + Send + Sync + 'static,
        Target: ?Sized + Send + Sync + 'static,
        F: Fn(InstancePtr<Source>) -> InstancePtr<Target> + Send + Sync + 'static,
    {
        Self {
            source: TypeKey::of::<Source>(),
            target: TypeKey::of::<Target>(),
            cast: caster(cast),
        }
    }

    #[inline]
    pub fn source(&self) -> TypeKey {
        self.source
    }

    #[inline]
    pub fn target(&self) -> TypeKey {
        self.target
    }
}

/// Configuration of bindings created by a single registration. When a constructor has multiple
/// outputs, each output gets its own binding built from the same options.
#[derive(Clone, Default, Debug)]
pub struct BindingOptions {
    /// Binding identity within the set of its abstract type; empty for the unnamed binding.
    pub name: String,
    /// Positional overrides of the abstract types outputs are registered under.
    pub interfaces: Vec<Option<InterfaceCast>>,
    pub lifestyle: Lifestyle,
    /// Marks the binding as the default of its set.
    pub is_default: bool,
    pub hints: ArgumentHints,
}

impl BindingOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn name<T: ToString>(mut self, name: T) -> Self {
        self.name = name.to_string();
        self
    }

    /// Marks constructor parameter positions as tolerant of missing bindings.
    pub fn optional<I: IntoIterator<Item = usize>>(mut self, indexes: I) -> Self {
        self.hints.optional.extend(indexes);
        self
    }

    /// Registers the next output position under the abstract type of given cast.
    pub fn interface(mut self, cast: InterfaceCast) -> Self {
        self.interfaces.push(Some(cast));
        self
    }

    /// Keeps the declared abstract type for the next output position.
    pub fn skip_interface(mut self) -> Self {
        self.interfaces.push(None);
        self
    }

    pub fn lifestyle(mut self, lifestyle: Lifestyle) -> Self {
        self.lifestyle = lifestyle;
        self
    }

    pub fn transient(self) -> Self {
        self.lifestyle(Lifestyle::Transient)
    }

    /// Pins a constructor parameter to a named binding.
    pub fn depends_on<T: ToString>(mut self, index: usize, name: T) -> Self {
        self.hints.depends_on.insert(index, name.to_string());
        self
    }

    /// Supplies a literal value for a constructor parameter, bypassing resolution.
    pub fn parameter(mut self, index: usize, value: Value) -> Self {
        self.hints.parameters.insert(index, value);
        self
    }

    /// Marks the binding as the default of its set.
    pub fn as_default(mut self) -> Self {
        self.is_default = true;
        self
    }
}

/// Options for a single resolution request.
#[derive(Clone, Default, Debug)]
pub struct ResolveOptions {
    /// Binding to use instead of the default one.
    pub name: Option<String>,
    /// When not empty, replaces the specified parameters of the resolved binding for this request
    /// only.
    pub arguments: FxHashMap<usize, Value>,
}

impl ResolveOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn name<T: ToString>(mut self, name: T) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn argument(mut self, index: usize, value: Value) -> Self {
        self.arguments.insert(index, value);
        self
    }
}

/// Options for calling an arbitrary function with resolved arguments.
#[derive(Clone, Default, Debug)]
pub struct CallOptions {
    pub hints: ArgumentHints,
}

impl CallOptions {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn argument(mut self, index: usize, value: Value) -> Self {
        self.hints.parameters.insert(index, value);
        self
    }

    pub fn depends_on<T: ToString>(mut self, index: usize, name: T) -> Self {
        self.hints.depends_on.insert(index, name.to_string());
        self
    }

    pub fn optional<I: IntoIterator<Item = usize>>(mut self, indexes: I) -> Self {
        self.hints.optional.extend(indexes);
        self
    }
}
