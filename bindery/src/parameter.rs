//! Types which can appear as parameters of constructors and called functions.
//!
//! * `InstancePtr<T>` - a required dependency on abstract type `T`
//! * `Option<InstancePtr<T>>` - a dependency which becomes `None` when marked optional and missing
//! * plain values (`String`, numbers, `bool`, ...) - usually supplied as literal arguments
//! * records implementing [Fill] and [Clone] - supplied as literal arguments and filled with their
//!   own dependencies before use

use crate::container::Container;
use crate::error::ResolutionError;
use crate::fill::Fill;
use crate::instance::{Instance, InstancePtr, TypeKey, Value};

/// A single parameter of a callable resolved by the container.
pub trait Parameter: Sized + 'static {
    /// Abstract type looked up when no literal value is supplied.
    fn type_key() -> TypeKey;

    /// Converts a resolved instance into the parameter.
    fn from_instance(instance: &Instance) -> Option<Self>;

    /// Converts a literal value into the parameter. Returns `None` for values of a wrong type.
    fn from_value(value: &Value, container: &mut Container)
        -> Result<Option<Self>, ResolutionError>;

    /// Value used for optional parameters without a binding and for explicitly empty arguments.
    fn zero() -> Option<Self>;
}

impl<T: ?Sized + Send + Sync + 'static> Parameter for InstancePtr<T> {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<T>()
    }

    #[inline]
    fn from_instance(instance: &Instance) -> Option<Self> {
        instance.downcast()
    }

    fn from_value(
        value: &Value,
        _container: &mut Container,
    ) -> Result<Option<Self>, ResolutionError> {
        Ok(value.downcast_ref::<InstancePtr<T>>().cloned())
    }

    #[inline]
    fn zero() -> Option<Self> {
        None
    }
}

impl<T: ?Sized + Send + Sync + 'static> Parameter for Option<InstancePtr<T>> {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<T>()
    }

    #[inline]
    fn from_instance(instance: &Instance) -> Option<Self> {
        instance.downcast().map(Some)
    }

    fn from_value(
        value: &Value,
        _container: &mut Container,
    ) -> Result<Option<Self>, ResolutionError> {
        Ok(value
            .downcast_ref::<InstancePtr<T>>()
            .cloned()
            .map(Some)
            .or_else(|| value.downcast_ref::<Option<InstancePtr<T>>>().cloned()))
    }

    #[inline]
    fn zero() -> Option<Self> {
        Some(None)
    }
}

impl<S: Fill + Clone + Send + Sync + 'static> Parameter for S {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<S>()
    }

    fn from_instance(instance: &Instance) -> Option<Self> {
        instance
            .downcast::<S>()
            .map(|record| record.as_ref().clone())
    }

    fn from_value(
        value: &Value,
        container: &mut Container,
    ) -> Result<Option<Self>, ResolutionError> {
        let record = value
            .downcast_ref::<S>()
            .cloned()
            .or_else(|| {
                value
                    .downcast_ref::<InstancePtr<S>>()
                    .map(|record| record.as_ref().clone())
            });

        match record {
            Some(mut record) => {
                container.fill(&mut record)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    #[inline]
    fn zero() -> Option<Self> {
        None
    }
}

macro_rules! plain_parameter {
    ($($ty:ty),+ $(,)?) => {
        $(
        impl Parameter for $ty {
            #[inline]
            fn type_key() -> TypeKey {
                TypeKey::of::<$ty>()
            }

            fn from_instance(instance: &Instance) -> Option<Self> {
                instance.downcast::<$ty>().map(|value| value.as_ref().clone())
            }

            fn from_value(
                value: &Value,
                _container: &mut Container,
            ) -> Result<Option<Self>, ResolutionError> {
                Ok(value.downcast_ref::<$ty>().cloned())
            }

            #[inline]
            fn zero() -> Option<Self> {
                Some(Default::default())
            }
        }
        )+
    };
}

plain_parameter!(
    String,
    &'static str,
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
);
