// note: this example assumes you've analyzed the previous one

use bindery::container::Container;
use bindery::instance::{InstancePtr, Value};
use bindery::options::{BindingOptions, ResolveOptions};

trait Store: Send + Sync {
    fn kind(&self) -> String;
}

trait Chain: Send + Sync {
    fn describe(&self) -> String;
}

struct NamedStore(&'static str);

impl Store for NamedStore {
    fn kind(&self) -> String {
        self.0.to_string()
    }
}

struct StoreChain {
    id: String,
    store: InstancePtr<dyn Store>,
    archive: Option<InstancePtr<dyn Store>>,
}

impl Chain for StoreChain {
    fn describe(&self) -> String {
        format!(
            "{} on {} (archive: {})",
            self.id,
            self.store.kind(),
            self.archive
                .as_ref()
                .map(|archive| archive.kind())
                .unwrap_or_else(|| "none".to_string())
        )
    }
}

fn create_chain(
    store: InstancePtr<dyn Store>,
    archive: Option<InstancePtr<dyn Store>>,
    id: String,
) -> InstancePtr<dyn Chain> {
    InstancePtr::new(StoreChain { id, store, archive })
}

fn main() {
    let mut container = Container::new();

    // the first binding registered for a type becomes its default
    container
        .register_with(
            || InstancePtr::new(NamedStore("leveldb")) as InstancePtr<dyn Store>,
            BindingOptions::new().name("leveldb"),
        )
        .expect("error registering leveldb store");
    container
        .register_with(
            || InstancePtr::new(NamedStore("mysql")) as InstancePtr<dyn Store>,
            BindingOptions::new().name("mysql"),
        )
        .expect("error registering mysql store");

    // parameters are identified by position: the first one uses the named binding, the second one
    // is optional and becomes None, since there's no "archive" store, and the third one is a
    // literal
    container
        .register_with(
            create_chain,
            BindingOptions::new()
                .transient()
                .depends_on(0, "mysql")
                .depends_on(1, "archive")
                .optional([1])
                .parameter(2, Value::new("chain1".to_string())),
        )
        .expect("error registering chain");

    // prints "chain1 on mysql (archive: none)"
    let chain = container
        .resolve::<dyn Chain>()
        .expect("error resolving chain");
    println!("{}", chain.describe());

    // transient bindings accept different arguments on each resolution
    // prints "chain2 on mysql (archive: none)"
    let chain = container
        .resolve_with::<dyn Chain>(
            ResolveOptions::new().argument(2, Value::new("chain2".to_string())),
        )
        .expect("error resolving chain");
    println!("{}", chain.describe());

    // the default binding can be changed later
    container
        .set_default_binding::<dyn Store>("mysql")
        .expect("error changing default store");

    // prints "mysql"
    let store = container
        .resolve::<dyn Store>()
        .expect("error resolving store");
    println!("{}", store.kind());

    // specific bindings can be resolved by name
    // prints "leveldb"
    let store = container
        .resolve_with::<dyn Store>(ResolveOptions::new().name("leveldb"))
        .expect("error resolving store");
    println!("{}", store.kind());
}
