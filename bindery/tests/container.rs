mod container_test {
    use bindery::container::Container;
    use bindery::error::ResolutionError;
    use bindery::instance::{InstancePtr, Value};
    use bindery::options::{BindingOptions, ResolveOptions};
    use mockall::automock;
    use std::error::Error;
    use std::fmt::{Display, Formatter};
    use std::sync::Mutex;

    #[automock]
    trait Store {
        fn get(&self, key: &str) -> Option<String>;
    }

    #[automock]
    trait Logger {
        fn log(&self, message: &str);
    }

    trait Chain: Send + Sync {
        fn id(&self) -> String;
    }

    trait Blocks: Send + Sync {
        fn count(&self) -> usize;
    }

    type StorePtr = InstancePtr<dyn Store + Send + Sync>;
    type LoggerPtr = InstancePtr<dyn Logger + Send + Sync>;

    struct BlockChain {
        id: String,
        store: Option<StorePtr>,
        blocks: Mutex<Vec<String>>,
    }

    impl Chain for BlockChain {
        fn id(&self) -> String {
            self.id.clone()
        }
    }

    impl Blocks for BlockChain {
        fn count(&self) -> usize {
            self.blocks.lock().unwrap().len()
        }
    }

    #[derive(Debug)]
    struct InputMissing;

    impl Display for InputMissing {
        fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
            f.write_str("store is missing")
        }
    }

    impl Error for InputMissing {}

    fn store(value: &'static str) -> StorePtr {
        let mut store = MockStore::new();
        store
            .expect_get()
            .returning(move |_| Some(value.to_string()));
        InstancePtr::new(store)
    }

    fn chain(store: StorePtr, id: String) -> InstancePtr<BlockChain> {
        InstancePtr::new(BlockChain {
            id,
            store: Some(store),
            blocks: Default::default(),
        })
    }

    fn chain_with_optional_store(
        store: Option<StorePtr>,
        id: String,
    ) -> Result<InstancePtr<dyn Chain>, InputMissing> {
        store
            .map(|store| {
                InstancePtr::new(BlockChain {
                    id,
                    store: Some(store),
                    blocks: Default::default(),
                }) as InstancePtr<dyn Chain>
            })
            .ok_or(InputMissing)
    }

    #[test]
    fn should_return_same_singleton_regardless_of_arguments() {
        let mut container = Container::new();
        container.register_instance(store("leveldb")).unwrap();
        container
            .register_with(
                chain,
                BindingOptions::new().parameter(1, Value::new("chain1".to_string())),
            )
            .unwrap();

        let first = container.resolve::<BlockChain>().unwrap();
        let second = container
            .resolve_with::<BlockChain>(
                ResolveOptions::new().argument(1, Value::new("chain2".to_string())),
            )
            .unwrap();

        assert!(InstancePtr::ptr_eq(&first, &second));
        assert_eq!(second.id(), "chain1");
    }

    #[test]
    fn should_construct_isolated_transients() {
        let mut container = Container::new();
        container.register_instance(store("leveldb")).unwrap();
        container
            .register_with(
                chain,
                BindingOptions::new()
                    .transient()
                    .parameter(1, Value::new("chain1".to_string())),
            )
            .unwrap();

        let first = container.resolve::<BlockChain>().unwrap();
        first.blocks.lock().unwrap().push("genesis".to_string());
        let second = container.resolve::<BlockChain>().unwrap();

        assert!(!InstancePtr::ptr_eq(&first, &second));
        assert_eq!(first.count(), 1);
        assert_eq!(second.count(), 0);
    }

    #[test]
    fn should_tolerate_missing_optional_dependency() {
        let mut container = Container::new();
        container
            .register_with(
                |store: Option<StorePtr>, id: String| {
                    InstancePtr::new(BlockChain {
                        id,
                        store,
                        blocks: Default::default(),
                    })
                },
                BindingOptions::new()
                    .optional([0])
                    .parameter(1, Value::new("chain1".to_string())),
            )
            .unwrap();

        let chain = container.resolve::<BlockChain>().unwrap();
        assert!(chain.store.is_none());
    }

    #[test]
    fn should_fail_on_missing_required_dependency() {
        let mut container = Container::new();
        container
            .register_with(
                chain,
                BindingOptions::new().parameter(1, Value::new("chain1".to_string())),
            )
            .unwrap();

        assert!(matches!(
            container.resolve::<BlockChain>().err().unwrap(),
            ResolutionError::UnresolvedDependency { requested, .. } if requested.contains("Store")
        ));
        assert!(!container
            .binding_set::<BlockChain>()
            .unwrap()
            .default_binding()
            .unwrap()
            .is_resolved());
    }

    #[test]
    fn should_prefer_named_bindings() {
        let mut container = Container::new();
        container
            .register_instance_with(store("a"), BindingOptions::new().name("a"))
            .unwrap();
        container
            .register_instance_with(store("b"), BindingOptions::new().name("b"))
            .unwrap();

        let named = container
            .resolve_with::<dyn Store + Send + Sync>(ResolveOptions::new().name("b"))
            .unwrap();
        let default = container.resolve::<dyn Store + Send + Sync>().unwrap();

        assert_eq!(named.get("key").as_deref(), Some("b"));
        assert_eq!(default.get("key").as_deref(), Some("a"));
    }

    #[test]
    fn should_fall_back_to_aliased_type() {
        let mut container = Container::new();
        container.register_instance(store("leveldb")).unwrap();
        container
            .register_with(
                chain,
                BindingOptions::new().parameter(1, Value::new("chain1".to_string())),
            )
            .unwrap();

        let mut unaliased = container.clone();

        container
            .register_sub_interface::<dyn Chain, BlockChain, _>(|chain| {
                chain as InstancePtr<dyn Chain>
            })
            .unwrap();

        assert_eq!(container.resolve::<dyn Chain>().unwrap().id(), "chain1");
        assert!(matches!(
            unaliased.resolve::<dyn Chain>().err().unwrap(),
            ResolutionError::UnresolvedDependency { .. }
        ));
    }

    #[test]
    fn should_propagate_constructor_errors() {
        let mut container = Container::new();
        container.register(|| "chain1".to_string()).unwrap();
        container
            .register_with(
                chain_with_optional_store,
                BindingOptions::new().transient().optional([0]),
            )
            .unwrap();

        let error = container.resolve::<dyn Chain>().err().unwrap();
        assert_eq!(error.to_string(), "store is missing");
        assert!(error
            .constructor_error()
            .unwrap()
            .downcast_ref::<InputMissing>()
            .is_some());

        container.register_instance(store("a")).unwrap();
        assert_eq!(container.resolve::<dyn Chain>().unwrap().id(), "chain1");
    }

    #[test]
    fn should_isolate_cloned_defaults() {
        let mut container = Container::new();
        container
            .register_instance_with(store("a"), BindingOptions::new().name("a"))
            .unwrap();
        container
            .register_instance_with(store("b"), BindingOptions::new().name("b"))
            .unwrap();

        let mut cloned = container.clone();
        cloned
            .set_default_binding::<dyn Store + Send + Sync>("b")
            .unwrap();

        assert_eq!(
            container
                .resolve::<dyn Store + Send + Sync>()
                .unwrap()
                .get("key")
                .as_deref(),
            Some("a")
        );
        assert_eq!(
            cloned
                .resolve::<dyn Store + Send + Sync>()
                .unwrap()
                .get("key")
                .as_deref(),
            Some("b")
        );
    }

    #[test]
    fn should_clear_bindings_on_reset() {
        let mut container = Container::new();
        container.register_instance(store("leveldb")).unwrap();
        container.reset();

        assert!(matches!(
            container.resolve::<dyn Store + Send + Sync>().err().unwrap(),
            ResolutionError::UnresolvedDependency { .. }
        ));
    }

    #[test]
    fn should_call_with_resolved_dependencies() {
        let mut logger = MockLogger::new();
        logger
            .expect_log()
            .withf(|message| message.ends_with("42"))
            .times(1)
            .return_const(());

        let mut container = Container::new();
        container.register_instance(store("42")).unwrap();
        container
            .register_instance(InstancePtr::new(logger) as LoggerPtr)
            .unwrap();

        container
            .call(|store: StorePtr, logger: LoggerPtr| {
                let height = store.get("height").unwrap_or_default();
                logger.log(&format!("height {height}"));
            })
            .unwrap();
    }

    #[test]
    fn should_construct_singletons_once() {
        let mut store = MockStore::new();
        store.expect_get().times(1).returning(|_| None);

        let mut container = Container::new();
        container
            .register_instance(InstancePtr::new(store) as StorePtr)
            .unwrap();
        container
            .register(|store: StorePtr| {
                store.get("height");
                InstancePtr::new(BlockChain {
                    id: "chain1".to_string(),
                    store: Some(store),
                    blocks: Default::default(),
                })
            })
            .unwrap();

        container.resolve::<BlockChain>().unwrap();
        container.resolve::<BlockChain>().unwrap();
    }
}
