//! Bindings are registered recipes (or fixed instances) producing values of a given abstract type.
//! All bindings for a single type form a [BindingSet], in which bindings are identified by name and
//! one of them is the default.
//!
//! Note: lifestyles are evaluated at construction time, which can lead to unexpected consequences
//! if they are mixed together, e.g. a [singleton](Lifestyle::Singleton) binding can depend on a
//! [transient](Lifestyle::Transient) one. In such case, when creating the singleton, a new instance
//! of the dependency will be created, but then that single instance will live as long as the
//! singleton lives.

use crate::error::ResolutionError;
use crate::instance::{Caster, Instance, TypeKey, Value};
use crate::invoke::ArgumentResolver;
use derivative::Derivative;
use fxhash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Decides whether a binding reuses its first instance or constructs a new one on each request.
#[derive(Default, Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Lifestyle {
    /// The first resolved instance is cached and shared. Stateless services are good candidates.
    #[default]
    Singleton,
    /// A new instance is constructed on every resolution, along with all its dependencies.
    Transient,
}

impl Lifestyle {
    #[inline]
    pub fn is_transient(&self) -> bool {
        *self == Lifestyle::Transient
    }
}

/// Per-parameter hints used when resolving arguments of a callable.
#[derive(Clone, Default, Debug)]
pub struct ArgumentHints {
    /// Literal values used instead of resolving given parameter positions.
    pub parameters: FxHashMap<usize, Value>,
    /// Names of bindings which should supply given parameter positions.
    pub depends_on: FxHashMap<usize, String>,
    /// Parameter positions which fall back to their zero value when no binding exists.
    pub optional: FxHashSet<usize>,
}

/// Type-erased constructor returning all its outputs as instances.
pub type ConstructorFn = Arc<
    dyn Fn(&mut ArgumentResolver<'_>) -> Result<Vec<Instance>, ResolutionError> + Send + Sync,
>;

#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub(crate) enum Recipe {
    Constructor {
        #[derivative(Debug = "ignore")]
        constructor: ConstructorFn,
        /// Name of the primary output type, used in diagnostics.
        target: &'static str,
        /// Output position this binding takes its instance from.
        output: usize,
        #[derivative(Debug = "ignore")]
        cast: Option<Caster>,
    },
    Instance,
}

/// A single registered way of obtaining an instance of an abstract type.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Binding {
    pub(crate) name: String,
    pub(crate) recipe: Recipe,
    pub(crate) hints: ArgumentHints,
    pub(crate) lifestyle: Lifestyle,
    pub(crate) is_default: bool,
    pub(crate) instance: Option<Instance>,
}

impl Binding {
    pub(crate) fn from_constructor(
        name: String,
        constructor: ConstructorFn,
        target: &'static str,
        output: usize,
        cast: Option<Caster>,
    ) -> Self {
        Self {
            name,
            recipe: Recipe::Constructor {
                constructor,
                target,
                output,
                cast,
            },
            hints: Default::default(),
            lifestyle: Default::default(),
            is_default: false,
            instance: None,
        }
    }

    pub(crate) fn from_instance(name: String, instance: Instance) -> Self {
        Self {
            name,
            recipe: Recipe::Instance,
            hints: Default::default(),
            lifestyle: Default::default(),
            is_default: false,
            instance: Some(instance),
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn lifestyle(&self) -> Lifestyle {
        self.lifestyle
    }

    #[inline]
    pub fn hints(&self) -> &ArgumentHints {
        &self.hints
    }

    /// Checks if this binding already holds an instance, either fixed or cached.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.instance.is_some()
    }
}

/// All bindings registered for a single abstract type.
#[derive(Clone, Debug)]
pub struct BindingSet {
    bindings: FxHashMap<String, Binding>,
    default: String,
}

impl BindingSet {
    pub(crate) fn new(binding: Binding) -> Self {
        let default = binding.name.clone();
        Self {
            bindings: [(default.clone(), binding)].into_iter().collect(),
            default,
        }
    }

    /// Adds a binding, replacing one with the same name. The first binding of a set, or one marked
    /// as default, becomes the default.
    pub(crate) fn insert(&mut self, binding: Binding) {
        if binding.is_default {
            self.default = binding.name.clone();
        }

        self.bindings.insert(binding.name.clone(), binding);
    }

    pub(crate) fn set_default(&mut self, name: &str) -> bool {
        if self.bindings.contains_key(name) {
            self.default = name.to_string();
            true
        } else {
            false
        }
    }

    #[inline]
    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut Binding> {
        self.bindings.get_mut(name)
    }

    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    #[inline]
    pub fn default_name(&self) -> &str {
        &self.default
    }

    #[inline]
    pub fn default_binding(&self) -> Option<&Binding> {
        self.bindings.get(&self.default)
    }

    /// Names of all bindings, in unspecified order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Fallback from one abstract type to another, with the cast turning target instances into
/// instances of the aliased type.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub(crate) struct Alias {
    pub(crate) target: TypeKey,
    #[derivative(Debug = "ignore")]
    pub(crate) cast: Caster,
}

#[cfg(test)]
mod tests {
    use crate::binding::{Binding, BindingSet, ConstructorFn, Lifestyle};
    use crate::error::ResolutionError;
    use crate::instance::{Instance, InstancePtr};
    use crate::invoke::ArgumentResolver;
    use std::sync::Arc;

    fn constructor() -> ConstructorFn {
        Arc::new(|_resolver: &mut ArgumentResolver<'_>| {
            Ok::<_, ResolutionError>(vec![Instance::new(InstancePtr::new(0u8))])
        })
    }

    fn create_binding(name: &str, is_default: bool) -> Binding {
        let mut binding = Binding::from_constructor(name.to_string(), constructor(), "u8", 0, None);
        binding.is_default = is_default;
        binding
    }

    #[test]
    fn should_make_first_binding_default() {
        let mut set = BindingSet::new(create_binding("a", false));
        set.insert(create_binding("b", false));

        assert_eq!(set.default_name(), "a");
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn should_switch_default_on_marked_binding() {
        let mut set = BindingSet::new(create_binding("a", false));
        set.insert(create_binding("b", true));

        assert_eq!(set.default_binding().unwrap().name(), "b");
    }

    #[test]
    fn should_replace_binding_with_same_name() {
        let mut set = BindingSet::new(create_binding("a", false));

        let mut replacement = create_binding("a", false);
        replacement.lifestyle = Lifestyle::Transient;
        set.insert(replacement);

        assert_eq!(set.len(), 1);
        assert_eq!(
            set.default_binding().unwrap().lifestyle(),
            Lifestyle::Transient
        );
    }

    #[test]
    fn should_reject_unknown_default() {
        let mut set = BindingSet::new(create_binding("a", false));
        assert!(!set.set_default("b"));
        assert!(set.set_default("a"));
    }

    #[test]
    fn should_hold_fixed_instances() {
        let binding =
            Binding::from_instance(String::new(), Instance::new(InstancePtr::new(1u8)));
        assert!(binding.is_resolved());
        assert_eq!(binding.lifestyle(), Lifestyle::Singleton);
    }
}
