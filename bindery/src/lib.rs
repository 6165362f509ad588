//! Runtime binding registry and resolution engine for dependency injection.
//!
//! Constructors (any function taking dependencies as parameters) are registered as bindings for the
//! abstract types they produce, usually `dyn Trait` types. Consumers ask a
//! [Container](container::Container) for an abstract type and receive a shared instance, with the
//! whole dependency graph below it constructed on demand:
//!
//! ```
//! use bindery::container::Container;
//! use bindery::instance::InstancePtr;
//!
//! trait Store: Send + Sync {
//!     fn get(&self, key: &str) -> Option<String>;
//! }
//!
//! trait Ledger: Send + Sync {
//!     fn height(&self) -> Option<String>;
//! }
//!
//! struct MemoryStore;
//!
//! impl Store for MemoryStore {
//!     fn get(&self, key: &str) -> Option<String> {
//!         (key == "height").then(|| "42".to_string())
//!     }
//! }
//!
//! struct StoreLedger(InstancePtr<dyn Store>);
//!
//! impl Ledger for StoreLedger {
//!     fn height(&self) -> Option<String> {
//!         self.0.get("height")
//!     }
//! }
//!
//! let mut container = Container::new();
//! container
//!     .register(|| InstancePtr::new(MemoryStore) as InstancePtr<dyn Store>)
//!     .unwrap();
//! container
//!     .register(|store: InstancePtr<dyn Store>| {
//!         InstancePtr::new(StoreLedger(store)) as InstancePtr<dyn Ledger>
//!     })
//!     .unwrap();
//!
//! let ledger = container.resolve::<dyn Ledger>().unwrap();
//! assert_eq!(ledger.height().as_deref(), Some("42"));
//! ```
//!
//! Bindings can be named, transient, have literal or optional parameters, and abstract types can
//! fall back to other types with [sub-interfaces](container::Container::register_sub_interface).
//! Existing structs can have their dependency fields populated with [Fill].
//!
//! ### Features
//!
//! * `derive` - automatically derive [Fill] for structs (enabled by default)

pub mod binding;
pub mod config;
pub mod container;
pub mod error;
pub mod fill;
pub mod global;
pub mod instance;
pub mod invoke;
pub mod options;
pub mod parameter;

pub use fill::Fill;

#[cfg(feature = "derive")]
pub use bindery_derive::Fill;
