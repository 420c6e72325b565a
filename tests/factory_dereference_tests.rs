//! Producers: plain names yield products, `&name` yields the producer.

mod common;

use common::*;
use component_registry::definition::ManagedDefinition;
use component_registry::lifecycle::ObjectPostProcessor;
use component_registry::registry::{ObjectFactory, ObjectFactoryExt, Registry};
use component_registry::{ManagedObject, RegistryError, TypeDescriptor};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn registry_with_producer(shared_product: bool) -> (Arc<Registry>, Arc<AtomicUsize>) {
    let produced = Arc::new(AtomicUsize::new(0));
    let registry = Registry::builder()
        .definition(connection_factory_definition(
            "connection",
            &produced,
            shared_product,
        ))
        .definition(clock_definition("clock"))
        .build()
        .unwrap();
    (registry, produced)
}

#[test]
fn test_plain_name_returns_product() {
    init_test_logging();
    let (registry, produced) = registry_with_producer(true);

    let connection = registry.get::<Connection>("connection").unwrap();
    assert_eq!(connection.serial, 1);

    let producer = registry.get::<ConnectionFactory>("&connection").unwrap();
    assert_eq!(producer.produced.load(Ordering::SeqCst), 1);
    assert_eq!(produced.load(Ordering::SeqCst), 1);
}

#[test]
fn test_shared_product_is_cached() {
    let (registry, produced) = registry_with_producer(true);

    let first = registry.get::<Connection>("connection").unwrap();
    let second = registry.get::<Connection>("connection").unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(produced.load(Ordering::SeqCst), 1);
    assert!(registry.is_shared("connection").unwrap());
    assert_eq!(registry.stats().cached_products, 1);
}

#[test]
fn test_non_shared_product_produced_per_request() {
    let (registry, produced) = registry_with_producer(false);

    let first = registry.get::<Connection>("connection").unwrap();
    let second = registry.get::<Connection>("connection").unwrap();

    assert_eq!((first.serial, second.serial), (1, 2));
    assert_eq!(produced.load(Ordering::SeqCst), 2);
    // The producer itself is still one shared object
    let producer_a = registry.get_object("&connection").unwrap();
    let producer_b = registry.get_object("&connection").unwrap();
    assert!(Arc::ptr_eq(&producer_a, &producer_b));

    assert!(!registry.is_shared("connection").unwrap());
    assert!(registry.is_independent("connection").unwrap());
    assert!(registry.is_shared("&connection").unwrap());
}

#[test]
fn test_uncreated_producer_assumed_shared() {
    let (registry, _) = registry_with_producer(false);

    // Nothing created yet: the producer's product policy is unknown
    assert!(registry.is_shared("connection").unwrap());
    assert!(!registry.is_independent("connection").unwrap());
}

#[test]
fn test_dereference_of_plain_object_is_not_a_factory() {
    let (registry, _) = registry_with_producer(true);

    match registry.get_object("&clock") {
        Err(RegistryError::NotAFactory { name }) => assert_eq!(name, "clock"),
        other => panic!("Expected NotAFactory, got {other:?}"),
    }
    assert!(!registry.contains_object("&clock"));
    assert!(registry.contains_object("&connection"));
}

#[test]
fn test_type_queries_distinguish_product_and_producer() {
    let (registry, _) = registry_with_producer(true);

    assert_eq!(
        registry.type_of("connection").unwrap(),
        Some(TypeDescriptor::of::<Connection>())
    );
    assert_eq!(
        registry.type_of("&connection").unwrap(),
        Some(TypeDescriptor::of::<ConnectionFactory>())
    );
    assert!(registry.is_type_match::<Connection>("connection").unwrap());
    assert!(!registry.is_type_match::<ConnectionFactory>("connection").unwrap());
    assert!(registry.is_type_match::<ConnectionFactory>("&connection").unwrap());
    assert_eq!(registry.type_of("&clock").unwrap(), None);
}

#[test]
fn test_undeclared_product_type_is_indeterminate_until_created() {
    let produced = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&produced);
    let registry = Registry::builder()
        .definition(
            ManagedDefinition::shared("connection")
                .constructs(move |_| {
                    Ok(ConnectionFactory {
                        produced: Arc::clone(&counter),
                        shared_product: true,
                    })
                })
                .producer()
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    assert_eq!(registry.type_of("connection").unwrap(), None);
    assert!(!registry.is_type_match::<Connection>("connection").unwrap());

    registry.get_object("&connection").unwrap();
    // Once the producer exists it reports its product type
    assert_eq!(
        registry.type_of("connection").unwrap(),
        Some(TypeDescriptor::of::<Connection>())
    );
    assert_eq!(produced.load(Ordering::SeqCst), 0);
}

#[test]
fn test_by_type_lookup_sees_products_and_producers() {
    let (registry, _) = registry_with_producer(true);

    let connection = registry.get_by_type::<Connection>().unwrap();
    assert_eq!(connection.serial, 1);
    let producer = registry.get_by_type::<ConnectionFactory>().unwrap();
    assert_eq!(producer.produced.load(Ordering::SeqCst), 1);
}

#[test]
fn test_products_pass_through_after_initialization_processors() {
    struct Tagging(HookLog);

    impl ObjectPostProcessor for Tagging {
        fn before_initialization(
            &self,
            object: Box<dyn ManagedObject>,
            name: &str,
        ) -> anyhow::Result<Box<dyn ManagedObject>> {
            self.0.push(format!("{name}:before:{}", object.object_type().short_name()));
            Ok(object)
        }

        fn after_initialization(
            &self,
            object: Box<dyn ManagedObject>,
            name: &str,
        ) -> anyhow::Result<Box<dyn ManagedObject>> {
            self.0.push(format!("{name}:after:{}", object.object_type().short_name()));
            Ok(object)
        }
    }

    let log = HookLog::new();
    let produced = Arc::new(AtomicUsize::new(0));
    let registry = Registry::builder()
        .definition(connection_factory_definition("connection", &produced, true))
        .post_processor(Arc::new(Tagging(log.clone())))
        .build()
        .unwrap();

    registry.get_object("connection").unwrap();

    assert_eq!(
        log.entries(),
        vec![
            "connection:before:ConnectionFactory",
            "connection:after:ConnectionFactory",
            "connection:after:Connection",
        ]
    );
}

#[test]
fn test_products_resolve_through_child_registry() {
    let (root, _) = registry_with_producer(true);
    let child = Registry::builder()
        .parent(root.clone())
        .build()
        .unwrap();

    let from_child = child.get::<Connection>("connection").unwrap();
    let from_root = root.get::<Connection>("connection").unwrap();
    assert!(Arc::ptr_eq(&from_child, &from_root));
    assert!(child.get::<ConnectionFactory>("&connection").is_ok());
    assert!(child.contains_object("&connection"));
}

#[test]
fn test_shutdown_destroys_producer_not_products() {
    let (registry, _) = registry_with_producer(true);
    registry.get_object("connection").unwrap();

    let report = registry.shutdown();

    assert_eq!(report.destroyed, vec!["connection"]);
    assert_eq!(registry.stats().cached_products, 0);
}
