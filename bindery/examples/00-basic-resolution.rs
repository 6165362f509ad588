use bindery::container::Container;
use bindery::instance::InstancePtr;
use bindery::options::{BindingOptions, InterfaceCast};

// abstract types are usually traits used as trait objects, which need to be Send + Sync, since
// instances can be shared between threads
trait Store: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
}

trait Ledger: Send + Sync {
    fn height(&self) -> u64;
}

struct MemoryStore;

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        (key == "height").then(|| "42".to_string())
    }
}

struct StoreLedger {
    store: InstancePtr<dyn Store>,
}

impl Ledger for StoreLedger {
    fn height(&self) -> u64 {
        self.store
            .get("height")
            .and_then(|height| height.parse().ok())
            .unwrap_or_default()
    }
}

// constructors are plain functions - their parameters are dependencies resolved by the container
fn create_ledger(store: InstancePtr<dyn Store>) -> InstancePtr<dyn Ledger> {
    InstancePtr::new(StoreLedger { store })
}

fn main() {
    let mut container = Container::new();

    // a constructor can return a concrete type and register it under a trait it implements
    container
        .register_with(
            || InstancePtr::new(MemoryStore),
            BindingOptions::new().interface(InterfaceCast::new(
                |store: InstancePtr<MemoryStore>| store as InstancePtr<dyn Store>,
            )),
        )
        .expect("error registering store");
    container
        .register(create_ledger)
        .expect("error registering ledger");

    // resolving dyn Ledger constructs dyn Store first, then passes it to create_ledger
    let ledger = container
        .resolve::<dyn Ledger>()
        .expect("error resolving ledger");

    // prints "Height: 42"
    println!("Height: {}", ledger.height());

    // bindings are singletons by default, so the same instance is returned every time
    let same_ledger = container
        .resolve::<dyn Ledger>()
        .expect("error resolving ledger");
    assert!(InstancePtr::ptr_eq(&ledger, &same_ledger));
}
