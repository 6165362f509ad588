//! Filling dependency fields of existing records in place.
//!
//! A record implementing [Fill] forwards each eligible field to its [FieldSlot] implementation,
//! along with [FieldHints] read from the field metadata. The trait is usually derived:
//!
//! ```
//! use bindery::container::Container;
//! use bindery::instance::InstancePtr;
//! use bindery::Fill;
//!
//! trait Store: Send + Sync {}
//!
//! #[derive(Fill)]
//! struct BlockStoreArgs {
//!     // default binding of dyn Store
//!     store: Option<InstancePtr<dyn Store>>,
//!     // named binding, left empty when missing
//!     #[fill(optional, name = "backup")]
//!     backup: Option<InstancePtr<dyn Store>>,
//!     // all bindings of dyn Store
//!     all_stores: Vec<InstancePtr<dyn Store>>,
//!     // plain fields are left untouched
//!     chain_id: String,
//! }
//! ```
//!
//! ### Supported `#[fill]` field configuration
//!
//! * `optional` - don't fail when no binding exists for the field type
//! * `name = "name"` - use the binding with given name instead of the default one
//! * `skip` - leave the field untouched even if its type is injectable

use crate::container::Container;
use crate::error::ResolutionError;
use crate::instance::InstancePtr;

/// Records whose dependency fields can be populated by a [Container].
pub trait Fill {
    /// Populates all eligible fields using bindings from given container.
    fn fill(&mut self, container: &mut Container) -> Result<(), ResolutionError>;
}

/// Metadata of a single field being filled.
#[derive(Clone, Copy, Eq, PartialEq, Debug)]
pub struct FieldHints {
    pub field: &'static str,
    pub optional: bool,
    pub name: Option<&'static str>,
}

impl FieldHints {
    pub const fn new(field: &'static str) -> Self {
        Self {
            field,
            optional: false,
            name: None,
        }
    }

    pub const fn optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    pub const fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }
}

/// A field type which can receive resolved instances.
pub trait FieldSlot {
    fn fill_slot(
        &mut self,
        container: &mut Container,
        hints: &FieldHints,
    ) -> Result<(), ResolutionError>;
}

impl<T: ?Sized + Send + Sync + 'static> FieldSlot for InstancePtr<T> {
    fn fill_slot(
        &mut self,
        container: &mut Container,
        hints: &FieldHints,
    ) -> Result<(), ResolutionError> {
        if let Some(instance) = container.field_instance::<T>(hints)? {
            *self = instance;
        }

        Ok(())
    }
}

impl<T: ?Sized + Send + Sync + 'static> FieldSlot for Option<InstancePtr<T>> {
    fn fill_slot(
        &mut self,
        container: &mut Container,
        hints: &FieldHints,
    ) -> Result<(), ResolutionError> {
        if let Some(instance) = container.field_instance::<T>(hints)? {
            *self = Some(instance);
        }

        Ok(())
    }
}

impl<T: ?Sized + Send + Sync + 'static> FieldSlot for Vec<InstancePtr<T>> {
    fn fill_slot(
        &mut self,
        container: &mut Container,
        hints: &FieldHints,
    ) -> Result<(), ResolutionError> {
        let instances = container.field_instances::<T>(hints)?;
        self.extend(instances);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::container::Container;
    use crate::error::ResolutionError;
    use crate::fill::{FieldHints, FieldSlot, Fill};
    use crate::instance::InstancePtr;
    use crate::options::BindingOptions;

    trait TestTrait: Send + Sync {
        fn id(&self) -> &'static str;
    }

    struct TestComponent(&'static str);

    impl TestTrait for TestComponent {
        fn id(&self) -> &'static str {
            self.0
        }
    }

    #[derive(Default)]
    struct TestRecord {
        dependency: Option<InstancePtr<dyn TestTrait>>,
        named: Option<InstancePtr<dyn TestTrait>>,
        all: Vec<InstancePtr<dyn TestTrait>>,
        untouched: i8,
    }

    impl Fill for TestRecord {
        fn fill(&mut self, container: &mut Container) -> Result<(), ResolutionError> {
            self.dependency
                .fill_slot(container, &FieldHints::new("dependency"))?;
            self.named
                .fill_slot(container, &FieldHints::new("named").name("b"))?;
            self.all.fill_slot(container, &FieldHints::new("all"))?;
            Ok(())
        }
    }

    fn register(container: &mut Container, id: &'static str) {
        container
            .register_with(
                move || InstancePtr::new(TestComponent(id)) as InstancePtr<dyn TestTrait>,
                BindingOptions::new().name(id),
            )
            .unwrap();
    }

    #[test]
    fn should_fill_record_fields() {
        let mut container = Container::new();
        register(&mut container, "a");
        register(&mut container, "b");

        let mut record = TestRecord {
            untouched: 3,
            ..Default::default()
        };
        container.fill(&mut record).unwrap();

        assert_eq!(record.dependency.unwrap().id(), "a");
        assert_eq!(record.named.unwrap().id(), "b");
        assert_eq!(record.all.len(), 2);
        assert_eq!(record.untouched, 3);
    }

    #[test]
    fn should_fail_on_missing_required_field() {
        let mut container = Container::new();

        let mut record = TestRecord::default();
        assert!(matches!(
            container.fill(&mut record).unwrap_err(),
            ResolutionError::UnresolvedField { field, .. } if field == "dependency"
        ));
    }

    #[test]
    fn should_skip_missing_optional_field() {
        let mut container = Container::new();

        let mut dependency: Option<InstancePtr<dyn TestTrait>> = None;
        dependency
            .fill_slot(&mut container, &FieldHints::new("dependency").optional(true))
            .unwrap();
        assert!(dependency.is_none());

        let mut all: Vec<InstancePtr<dyn TestTrait>> = Vec::new();
        all.fill_slot(&mut container, &FieldHints::new("all").optional(true))
            .unwrap();
        assert!(all.is_empty());
    }

    #[test]
    fn should_fail_on_missing_named_field() {
        let mut container = Container::new();
        register(&mut container, "a");

        let mut named: Option<InstancePtr<dyn TestTrait>> = None;
        assert!(matches!(
            named
                .fill_slot(&mut container, &FieldHints::new("named").name("c"))
                .unwrap_err(),
            ResolutionError::UnresolvedField { name: Some(name), .. } if name == "c"
        ));
    }
}
