// note: this example assumes you've analyzed the previous ones

use bindery::container::Container;
use bindery::instance::InstancePtr;
use bindery::options::BindingOptions;
use bindery::Fill;

trait Store: Send + Sync {
    fn kind(&self) -> String;
}

struct NamedStore(&'static str);

impl Store for NamedStore {
    fn kind(&self) -> String {
        self.0.to_string()
    }
}

// existing structs can have their dependency fields populated in place - fields holding instance
// pointers, optional instance pointers and vectors of instance pointers are filled, while other
// fields are left untouched
#[derive(Fill, Default)]
struct NodeArgs {
    store: Option<InstancePtr<dyn Store>>,
    // fields can reference a specific binding by name
    #[fill(name = "archive")]
    archive: Option<InstancePtr<dyn Store>>,
    // optional fields are left untouched when there's no binding for their type
    #[fill(optional)]
    cache: Option<InstancePtr<dyn Cache>>,
    // vectors receive all bindings of their type
    all_stores: Vec<InstancePtr<dyn Store>>,
    node_id: String,
}

trait Cache: Send + Sync {}

fn main() {
    let mut container = Container::new();

    for name in ["leveldb", "archive"] {
        container
            .register_instance_with(
                InstancePtr::new(NamedStore(name)) as InstancePtr<dyn Store>,
                BindingOptions::new().name(name),
            )
            .expect("error registering store");
    }

    let mut args = NodeArgs {
        node_id: "node1".to_string(),
        ..Default::default()
    };
    container.fill(&mut args).expect("error filling args");

    // prints "node1: leveldb, archive, 2 stores, no cache"
    println!(
        "{}: {}, {}, {} stores, {}",
        args.node_id,
        args.store.map(|store| store.kind()).unwrap_or_default(),
        args.archive.map(|store| store.kind()).unwrap_or_default(),
        args.all_stores.len(),
        if args.cache.is_some() { "cache" } else { "no cache" }
    );
}
