//! Calling constructors and arbitrary functions with resolved arguments.
//!
//! [Callable] is implemented for all functions with up to 10 [Parameter]s. Return values are
//! interpreted by [Outcome], which separates constructor errors from results, and [Outputs], which
//! turns results into instances for registration.

use crate::binding::ArgumentHints;
use crate::container::Container;
use crate::error::{ErrorPtr, ResolutionError};
use crate::instance::{Instance, InstancePtr, TypeKey};
use crate::parameter::Parameter;
use std::error::Error;

/// Resolves arguments of a single invocation, in parameter order.
pub struct ArgumentResolver<'a> {
    container: &'a mut Container,
    hints: &'a ArgumentHints,
    target: &'static str,
}

impl<'a> ArgumentResolver<'a> {
    pub(crate) fn new(
        container: &'a mut Container,
        hints: &'a ArgumentHints,
        target: &'static str,
    ) -> Self {
        Self {
            container,
            hints,
            target,
        }
    }

    /// Resolves the parameter at given position: a literal value has precedence, then the named or
    /// default binding for the parameter type, then the zero value for optional parameters.
    pub fn argument<P: Parameter>(&mut self, index: usize) -> Result<P, ResolutionError> {
        if let Some(value) = self.hints.parameters.get(&index) {
            if value.is_empty() {
                return P::zero().ok_or_else(|| ResolutionError::NoZeroValue {
                    index,
                    parameter: P::type_key().name().to_string(),
                    target: self.target.to_string(),
                });
            }

            return P::from_value(value, self.container)?.ok_or_else(|| {
                ResolutionError::ArgumentTypeMismatch {
                    index,
                    expected: P::type_key().name().to_string(),
                    target: self.target.to_string(),
                }
            });
        }

        let key = P::type_key();
        let name = self.hints.depends_on.get(&index).map(String::as_str);

        match self.container.lookup(key, name) {
            Some(location) => {
                let instance = self.container.resolve_location(&location, None)?;
                P::from_instance(&instance)
                    .ok_or_else(|| ResolutionError::IncompatibleInstance(key.name().to_string()))
            }
            None => {
                let zero = if self.hints.optional.contains(&index) {
                    P::zero()
                } else {
                    None
                };

                zero.ok_or_else(|| ResolutionError::UnresolvedDependency {
                    requested: key.name().to_string(),
                    name: name.map(str::to_string),
                    target: self.target.to_string(),
                })
            }
        }
    }
}

/// A function callable with arguments provided by an [ArgumentResolver]. `Args` is a tuple of the
/// parameter types.
pub trait Callable<Args, Ret>: Send + Sync + 'static {
    fn call_with(&self, resolver: &mut ArgumentResolver<'_>) -> Result<Ret, ResolutionError>;
}

macro_rules! callable_tuple ({ $($param:ident $index:tt)* } => {
    impl<Func, Ret, $($param,)*> Callable<($($param,)*), Ret> for Func
    where
        Func: Fn($($param),*) -> Ret + Send + Sync + 'static,
        $($param: Parameter,)*
    {
        #[inline]
        #[allow(non_snake_case, unused_variables)]
        fn call_with(&self, resolver: &mut ArgumentResolver<'_>) -> Result<Ret, ResolutionError> {
            $(let $param = resolver.argument::<$param>($index)?;)*
            Ok((self)($($param),*))
        }
    }
});

callable_tuple! {}
callable_tuple! { A 0 }
callable_tuple! { A 0 B 1 }
callable_tuple! { A 0 B 1 C 2 }
callable_tuple! { A 0 B 1 C 2 D 3 }
callable_tuple! { A 0 B 1 C 2 D 3 E 4 }
callable_tuple! { A 0 B 1 C 2 D 3 E 4 F 5 }
callable_tuple! { A 0 B 1 C 2 D 3 E 4 F 5 G 6 }
callable_tuple! { A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 }
callable_tuple! { A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 I 8 }
callable_tuple! { A 0 B 1 C 2 D 3 E 4 F 5 G 6 H 7 I 8 J 9 }

/// Interpretation of a return value: either the results or an error raised by the callee.
pub trait Outcome {
    type Output;

    fn into_outcome(self) -> Result<Self::Output, ErrorPtr>;
}

impl<T, E: Into<Box<dyn Error + Send + Sync>>> Outcome for Result<T, E> {
    type Output = T;

    #[inline]
    fn into_outcome(self) -> Result<Self::Output, ErrorPtr> {
        self.map_err(|error| {
            let error: Box<dyn Error + Send + Sync> = error.into();
            ErrorPtr::from(error)
        })
    }
}

impl Outcome for () {
    type Output = ();

    #[inline]
    fn into_outcome(self) -> Result<Self::Output, ErrorPtr> {
        Ok(())
    }
}

impl<O: Output> Outcome for O {
    type Output = O;

    #[inline]
    fn into_outcome(self) -> Result<Self::Output, ErrorPtr> {
        Ok(self)
    }
}

/// A single value which can be stored as an instance of its own type.
pub trait Output: 'static {
    fn type_key() -> TypeKey;

    /// Checks if the output is an instance pointer wrapping another pointer, instead of the
    /// abstract type itself. Plain values are never markers.
    #[inline]
    fn is_pointer_marker() -> bool {
        false
    }

    fn into_instance(self) -> Instance;
}

impl<T: ?Sized + Send + Sync + 'static> Output for InstancePtr<T> {
    #[inline]
    fn type_key() -> TypeKey {
        TypeKey::of::<T>()
    }

    #[inline]
    fn is_pointer_marker() -> bool {
        <Self as Output>::type_key().is_pointer()
    }

    #[inline]
    fn into_instance(self) -> Instance {
        Instance::new(self)
    }
}

macro_rules! plain_output {
    ($($ty:ty),+ $(,)?) => {
        $(
        impl Output for $ty {
            #[inline]
            fn type_key() -> TypeKey {
                TypeKey::of::<$ty>()
            }

            #[inline]
            fn into_instance(self) -> Instance {
                Instance::new(InstancePtr::new(self))
            }
        }
        )+
    };
}

plain_output!(
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

/// All results of a constructor, one instance per output position.
pub trait Outputs {
    /// Declared abstract types of all output positions.
    fn type_keys() -> Vec<TypeKey>;

    /// Declared types of output positions which name pointers instead of abstract types.
    fn pointer_markers() -> Vec<TypeKey>;

    fn into_instances(self) -> Vec<Instance>;
}

impl Outputs for () {
    #[inline]
    fn type_keys() -> Vec<TypeKey> {
        Vec::new()
    }

    #[inline]
    fn pointer_markers() -> Vec<TypeKey> {
        Vec::new()
    }

    #[inline]
    fn into_instances(self) -> Vec<Instance> {
        Vec::new()
    }
}

impl<O: Output> Outputs for O {
    #[inline]
    fn type_keys() -> Vec<TypeKey> {
        vec![O::type_key()]
    }

    #[inline]
    fn pointer_markers() -> Vec<TypeKey> {
        O::is_pointer_marker()
            .then(O::type_key)
            .into_iter()
            .collect()
    }

    #[inline]
    fn into_instances(self) -> Vec<Instance> {
        vec![self.into_instance()]
    }
}

macro_rules! output_tuple ({ $($output:ident)+ } => {
    impl<$($output: Output,)+> Outcome for ($($output,)+) {
        type Output = Self;

        #[inline]
        fn into_outcome(self) -> Result<Self::Output, ErrorPtr> {
            Ok(self)
        }
    }

    impl<$($output: Output,)+> Outputs for ($($output,)+) {
        #[inline]
        fn type_keys() -> Vec<TypeKey> {
            vec![$($output::type_key(),)+]
        }

        #[inline]
        fn pointer_markers() -> Vec<TypeKey> {
            [$(($output::is_pointer_marker(), $output::type_key()),)+]
                .into_iter()
                .filter_map(|(is_marker, key)| is_marker.then_some(key))
                .collect()
        }

        #[inline]
        #[allow(non_snake_case)]
        fn into_instances(self) -> Vec<Instance> {
            let ($($output,)+) = self;
            vec![$($output.into_instance(),)+]
        }
    }
});

output_tuple! { A B }
output_tuple! { A B C }
output_tuple! { A B C D }

#[cfg(test)]
mod tests {
    use crate::binding::ArgumentHints;
    use crate::container::Container;
    use crate::error::ResolutionError;
    use crate::instance::{InstancePtr, TypeKey, Value};
    use crate::invoke::{ArgumentResolver, Callable, Outcome, Outputs};

    trait TestTrait: Send + Sync {}

    struct TestComponent;

    impl TestTrait for TestComponent {}

    fn two_parameters(_dependency: InstancePtr<dyn TestTrait>, height: u64) -> u64 {
        height
    }

    #[test]
    fn should_call_with_supplied_arguments() {
        let mut container = Container::new();
        let mut hints = ArgumentHints::default();
        hints.parameters.insert(
            0,
            Value::new(InstancePtr::new(TestComponent) as InstancePtr<dyn TestTrait>),
        );
        hints.parameters.insert(1, Value::new(15u64));

        let mut resolver = ArgumentResolver::new(&mut container, &hints, "u64");
        assert_eq!(two_parameters.call_with(&mut resolver).unwrap(), 15);
    }

    #[test]
    fn should_report_missing_dependency() {
        let mut container = Container::new();
        let hints = ArgumentHints::default();

        let mut resolver = ArgumentResolver::new(&mut container, &hints, "u64");
        assert!(matches!(
            two_parameters.call_with(&mut resolver).err().unwrap(),
            ResolutionError::UnresolvedDependency { target, .. } if target == "u64"
        ));
    }

    #[test]
    fn should_use_zero_value_for_optional_parameters() {
        let mut container = Container::new();
        let mut hints = ArgumentHints::default();
        hints.optional.insert(0);

        let mut resolver = ArgumentResolver::new(&mut container, &hints, "()");
        let dependency = resolver
            .argument::<Option<InstancePtr<dyn TestTrait>>>(0)
            .unwrap();
        assert!(dependency.is_none());
        assert!(matches!(
            resolver.argument::<InstancePtr<dyn TestTrait>>(0).err().unwrap(),
            ResolutionError::UnresolvedDependency { .. }
        ));
    }

    #[test]
    fn should_reject_empty_value_without_zero() {
        let mut container = Container::new();
        let mut hints = ArgumentHints::default();
        hints.parameters.insert(0, Value::empty());
        hints.parameters.insert(1, Value::empty());

        let mut resolver = ArgumentResolver::new(&mut container, &hints, "()");
        assert_eq!(resolver.argument::<u64>(1).unwrap(), 0);
        assert!(matches!(
            resolver.argument::<InstancePtr<dyn TestTrait>>(0).err().unwrap(),
            ResolutionError::NoZeroValue { index: 0, .. }
        ));
    }

    #[test]
    fn should_separate_errors_from_results() {
        let failed: Result<InstancePtr<dyn TestTrait>, String> = Err("input nil".to_string());
        assert_eq!(failed.into_outcome().err().unwrap().to_string(), "input nil");

        let outputs = (
            InstancePtr::new(TestComponent) as InstancePtr<dyn TestTrait>,
            InstancePtr::new(5u8),
        );
        assert_eq!(
            <(InstancePtr<dyn TestTrait>, InstancePtr<u8>)>::type_keys(),
            vec![TypeKey::of::<dyn TestTrait>(), TypeKey::of::<u8>()]
        );
        assert_eq!(outputs.into_instances().len(), 2);
        assert!(<()>::type_keys().is_empty());
    }

    #[test]
    fn should_find_pointer_markers_only_in_instance_outputs() {
        assert!(<(&'static str, String)>::pointer_markers().is_empty());
        assert_eq!(
            <(InstancePtr<dyn TestTrait>, InstancePtr<Box<u8>>)>::pointer_markers(),
            vec![TypeKey::of::<Box<u8>>()]
        );
    }
}
