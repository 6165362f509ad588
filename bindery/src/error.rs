use std::error::Error;
use std::sync::Arc;
use thiserror::Error;

/// Shared pointer to an error raised by a user constructor.
pub type ErrorPtr = Arc<dyn Error + Send + Sync>;

fn named(name: &Option<String>) -> String {
    name.as_ref()
        .map(|name| format!(" named '{name}'"))
        .unwrap_or_default()
}

/// Errors related to registering bindings in a [Container](crate::container::Container).
#[derive(Error, Clone, Debug)]
pub enum RegistrationError {
    #[error("Constructor {constructor} does not produce any instance")]
    InvalidConstructor { constructor: String },
    #[error("Constructor output {output} cannot be registered as {interface}")]
    InterfaceMismatch { output: String, interface: String },
    #[error("Type marker {0} must name an abstract type, not a pointer to one")]
    InvalidMarker(String),
    #[error("Cannot find binding named '{name}' for type {requested}")]
    NotFound { requested: String, name: String },
    #[error("Attempted to register a duplicated binding named '{name}' for type {requested}")]
    DuplicateBindingName { requested: String, name: String },
}

/// Errors related to resolving instances, calling functions and filling structs.
#[derive(Error, Clone, Debug)]
pub enum ResolutionError {
    #[error("Cannot find binding{} for {requested} required by {target}", named(.name))]
    UnresolvedDependency {
        requested: String,
        name: Option<String>,
        target: String,
    },
    #[error("Cannot resolve field '{field}' of type {requested}{}", named(.name))]
    UnresolvedField {
        field: String,
        requested: String,
        name: Option<String>,
    },
    #[error("Constructor for {target} did not return an instance")]
    ConstructorReturnedNoValue { target: String },
    #[error("Dependency cycle detected while constructing {requested}{}", named(.name))]
    CircularDependency {
        requested: String,
        name: Option<String>,
    },
    #[error("Argument {index} for {target} is not a value of type {expected}")]
    ArgumentTypeMismatch {
        index: usize,
        expected: String,
        target: String,
    },
    #[error("Argument {index} for {target} of type {parameter} cannot be left empty")]
    NoZeroValue {
        index: usize,
        parameter: String,
        target: String,
    },
    #[error("Tried to downcast instance to incompatible type: {0}")]
    IncompatibleInstance(String),
    #[error("{0}")]
    Constructor(ErrorPtr),
}

impl ResolutionError {
    /// Returns the error raised by a user constructor, if this is one.
    pub fn constructor_error(&self) -> Option<&ErrorPtr> {
        match self {
            ResolutionError::Constructor(error) => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::error::{RegistrationError, ResolutionError};
    use std::io;
    use std::sync::Arc;

    #[test]
    fn should_display_binding_name_when_present() {
        let error = ResolutionError::UnresolvedDependency {
            requested: "dyn Store".to_string(),
            name: Some("leveldb".to_string()),
            target: "dyn BlockStore".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot find binding named 'leveldb' for dyn Store required by dyn BlockStore"
        );

        let error = ResolutionError::UnresolvedDependency {
            requested: "dyn Store".to_string(),
            name: None,
            target: "dyn BlockStore".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot find binding for dyn Store required by dyn BlockStore"
        );
    }

    #[test]
    fn should_keep_constructor_message_verbatim() {
        let error = ResolutionError::Constructor(Arc::new(io::Error::new(
            io::ErrorKind::Other,
            "input nil",
        )));
        assert_eq!(error.to_string(), "input nil");
        assert!(error.constructor_error().is_some());
    }

    #[test]
    fn should_describe_missing_default_binding() {
        let error = RegistrationError::NotFound {
            requested: "dyn Store".to_string(),
            name: "mysql".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Cannot find binding named 'mysql' for type dyn Store"
        );
    }
}
