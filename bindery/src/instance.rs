//! Type-erased representation of abstract types, instances and literal values.

use std::any::{type_name, Any, TypeId};
use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Pointer type used for all resolved instances.
pub type InstancePtr<T> = Arc<T>;

/// Type-erased pointer; for instances it always holds an [InstancePtr] of the abstract type.
pub type InstanceAnyPtr = Arc<dyn Any + Send + Sync + 'static>;

/// Identifies an abstract type at runtime. Equality and hashing use only the [TypeId]; the name is
/// kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

const POINTER_PREFIXES: [&str; 6] = [
    "alloc::sync::Arc<",
    "alloc::rc::Rc<",
    "alloc::boxed::Box<",
    "core::option::Option<",
    "&",
    "*",
];

impl TypeKey {
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Checks if this key names a pointer to a type instead of the type itself, which is never a
    /// valid abstract type marker.
    ///
    /// This is a best-effort check based on [type_name], whose output is not guaranteed to be
    /// stable between compiler versions. It recognizes `Arc`, `Rc`, `Box`, `Option`, references
    /// and raw pointers by their current path prefixes.
    pub fn is_pointer(&self) -> bool {
        POINTER_PREFIXES
            .iter()
            .any(|prefix| self.name.starts_with(prefix))
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// A resolved instance of some abstract type.
#[derive(Clone)]
pub struct Instance {
    key: TypeKey,
    value: InstanceAnyPtr,
}

impl Instance {
    pub fn new<T: ?Sized + Send + Sync + 'static>(instance: InstancePtr<T>) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            value: Arc::new(instance),
        }
    }

    /// Abstract type this instance was created for.
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Returns the typed pointer, if this instance holds a `T`.
    #[inline]
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<InstancePtr<T>> {
        self.value.downcast_ref::<InstancePtr<T>>().cloned()
    }
}

impl Debug for Instance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Instance").field(&self.key).finish()
    }
}

/// Caster between two instance types, e.g. from a concrete component to a `dyn Trait` it
/// implements.
pub type Caster = Arc<dyn Fn(&Instance) -> Option<Instance> + Send + Sync>;

/// Creates a [Caster] converting `Source` instances to `Target` ones with given function.
pub fn caster<Source, Target, F>(cast: F) -> Caster
where
    Source: ?Sized + Send + Sync + 'static,
    Target: ?Sized + Send + Sync + 'static,
    F: Fn(InstancePtr<Source>) -> InstancePtr<Target> + Send + Sync + 'static,
{
    Arc::new(move |instance: &Instance| {
        instance
            .downcast::<Source>()
            .map(|source| Instance::new(cast(source)))
    })
}

/// Literal argument value supplied instead of resolving a parameter. The empty value forces the
/// parameter to its zero value.
#[derive(Clone)]
pub struct Value {
    value: Option<InstanceAnyPtr>,
    type_name: &'static str,
}

impl Value {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            value: Some(Arc::new(value)),
            type_name: type_name::<T>(),
        }
    }

    pub fn empty() -> Self {
        Self {
            value: None,
            type_name: "()",
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.value.as_ref().and_then(|value| value.downcast_ref())
    }
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            f.write_str("Value(<empty>)")
        } else {
            f.debug_tuple("Value").field(&self.type_name).finish()
        }
    }
}
