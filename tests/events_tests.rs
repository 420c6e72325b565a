//! Container events published around object creation and shutdown.

mod common;

use common::*;
use component_registry::constants::events;
use component_registry::definition::ManagedDefinition;
use component_registry::events::PublishedEvent;
use component_registry::lifecycle::{Capabilities, ManagedObject};
use component_registry::registry::{ObjectFactory, ObjectFactoryExt, Registry};
use serde_json::json;
use tokio::sync::broadcast::Receiver;

fn drain(receiver: &mut Receiver<PublishedEvent>) -> Vec<PublishedEvent> {
    let mut received = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        received.push(event);
    }
    received
}

#[tokio::test]
async fn test_creation_publishes_object_created() {
    let registry = Registry::builder()
        .display_name("events")
        .definition(clock_definition("clock"))
        .build()
        .unwrap();
    let mut receiver = registry.subscribe();

    registry.get_object("clock").unwrap();
    let event = receiver.recv().await.unwrap();

    assert_eq!(event.name, events::OBJECT_CREATED);
    assert_eq!(event.context_str("registry"), Some("events"));
    assert_eq!(event.context_str("name"), Some("clock"));
    assert_eq!(event.context_str("scope"), Some("shared"));

    // Cache hits publish nothing
    registry.get_object("clock").unwrap();
    assert!(drain(&mut receiver).is_empty());
}

#[tokio::test]
async fn test_shutdown_publishes_destroy_events_then_closed() {
    let log = HookLog::new();
    let registry = Registry::builder()
        .definition(recording_definition("healthy", &log))
        .definition(recording_definition_failing("flaky", &log, Some("custom_destroy")))
        .build()
        .unwrap();
    registry.get_object("healthy").unwrap();
    registry.get_object("flaky").unwrap();

    let mut receiver = registry.subscribe();
    registry.shutdown();

    let names: Vec<(String, Option<String>)> = drain(&mut receiver)
        .into_iter()
        .map(|event| {
            let subject = event.context_str("name").map(str::to_string);
            (event.name, subject)
        })
        .collect();

    assert_eq!(
        names,
        vec![
            (events::OBJECT_DESTROY_FAILED.to_string(), Some("flaky".to_string())),
            (events::OBJECT_DESTROYED.to_string(), Some("healthy".to_string())),
            (events::REGISTRY_CLOSED.to_string(), None),
        ]
    );
}

#[test]
fn test_independent_creation_publishes_each_time() {
    let registry = Registry::builder()
        .definition(
            ManagedDefinition::independent("ticket")
                .constructs(|_| Ok(Clock))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let mut receiver = registry.subscribe();

    registry.get_object("ticket").unwrap();
    registry.get_object("ticket").unwrap();

    tokio_test::block_on(async {
        for _ in 0..2 {
            let event = receiver.recv().await.unwrap();
            assert_eq!(event.name, events::OBJECT_CREATED);
            assert_eq!(event.context_str("scope"), Some("independent"));
        }
    });
    assert!(drain(&mut receiver).is_empty());
}

#[tokio::test]
async fn test_closed_event_counts_outcomes() {
    let registry = Registry::builder()
        .definition(clock_definition("clock"))
        .build()
        .unwrap();
    registry.get_object("clock").unwrap();
    let mut receiver = registry.subscribe();

    registry.shutdown();
    let closed = drain(&mut receiver)
        .into_iter()
        .find(|event| event.name == events::REGISTRY_CLOSED)
        .unwrap();

    assert_eq!(closed.context["destroyed"], json!(1));
    assert_eq!(closed.context["failures"], json!(0));
}

#[tokio::test]
async fn test_event_aware_object_publishes_on_container_channel() {
    #[derive(Default)]
    struct Auditor {
        publisher: Option<component_registry::events::EventPublisher>,
    }

    impl ManagedObject for Auditor {
        fn capabilities(&self) -> Capabilities {
            Capabilities::EVENT_PUBLISHER_AWARE
        }

        fn set_event_publisher(
            &mut self,
            publisher: component_registry::events::EventPublisher,
        ) -> anyhow::Result<()> {
            self.publisher = Some(publisher);
            Ok(())
        }
    }

    let registry = Registry::builder()
        .definition(
            ManagedDefinition::shared("auditor")
                .constructs(|_| Ok(Auditor::default()))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();
    let auditor = registry.get::<Auditor>("auditor").unwrap();
    let mut receiver = registry.subscribe();

    auditor
        .publisher
        .as_ref()
        .unwrap()
        .publish("audit.recorded", json!({"name": "order-42"}))
        .unwrap();

    let event = receiver.recv().await.unwrap();
    assert_eq!(event.name, "audit.recorded");
    assert_eq!(event.context_str("name"), Some("order-42"));
}
