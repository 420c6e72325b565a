//! Managed objects and processors that record every hook they see.

use component_registry::definition::ManagedDefinition;
use component_registry::events::EventPublisher;
use component_registry::lifecycle::{
    Capabilities, DestructionAwareProcessor, Environment, ManagedObject, MessageSource,
    ObjectPostProcessor, ValueResolver,
};
use component_registry::registry::{ObjectProducer, RegistryHandle};
use component_registry::TypeDescriptor;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared, ordered log of hook invocations
#[derive(Debug, Clone, Default)]
pub struct HookLog(Arc<Mutex<Vec<String>>>);

impl HookLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Entries with the given prefix, prefix stripped
    pub fn entries_for(&self, prefix: &str) -> Vec<String> {
        self.entries()
            .into_iter()
            .filter_map(|entry| entry.strip_prefix(prefix).map(str::to_string))
            .collect()
    }

    pub fn clear(&self) {
        self.0.lock().clear();
    }
}

/// Object advertising every capability and logging each hook as `label:hook`
pub struct RecordingObject {
    pub label: String,
    pub log: HookLog,
    pub assigned_name: Option<String>,
    pub environment: Option<Arc<Environment>>,
    pub registry: Option<RegistryHandle>,
    pub resolver: Option<ValueResolver>,
    pub publisher: Option<EventPublisher>,
    pub messages: Option<Arc<dyn MessageSource>>,
    pub fail_on: Option<&'static str>,
}

impl RecordingObject {
    pub fn new(label: impl Into<String>, log: HookLog) -> Self {
        Self {
            label: label.into(),
            log,
            assigned_name: None,
            environment: None,
            registry: None,
            resolver: None,
            publisher: None,
            messages: None,
            fail_on: None,
        }
    }

    pub fn failing_on(mut self, hook: &'static str) -> Self {
        self.fail_on = Some(hook);
        self
    }

    fn hook(&self, hook: &str) -> anyhow::Result<()> {
        self.log.push(format!("{}:{hook}", self.label));
        if self.fail_on == Some(hook) {
            anyhow::bail!("{} failed in {hook}", self.label);
        }
        Ok(())
    }
}

impl ManagedObject for RecordingObject {
    fn capabilities(&self) -> Capabilities {
        Capabilities::all()
    }

    fn set_object_name(&mut self, name: &str) -> anyhow::Result<()> {
        self.assigned_name = Some(name.to_string());
        self.hook("name")
    }

    fn set_environment(&mut self, environment: Arc<Environment>) -> anyhow::Result<()> {
        self.environment = Some(environment);
        self.hook("environment")
    }

    fn set_registry(&mut self, registry: RegistryHandle) -> anyhow::Result<()> {
        self.registry = Some(registry);
        self.hook("registry")
    }

    fn set_value_resolver(&mut self, resolver: ValueResolver) -> anyhow::Result<()> {
        self.resolver = Some(resolver);
        self.hook("value_resolver")
    }

    fn set_event_publisher(&mut self, publisher: EventPublisher) -> anyhow::Result<()> {
        self.publisher = Some(publisher);
        self.hook("event_publisher")
    }

    fn set_message_source(&mut self, source: Arc<dyn MessageSource>) -> anyhow::Result<()> {
        self.messages = Some(source);
        self.hook("message_source")
    }

    fn after_properties_set(&mut self) -> anyhow::Result<()> {
        self.hook("after_properties_set")
    }

    fn destroy(&self) -> anyhow::Result<()> {
        self.hook("destroy")
    }
}

/// Shared recording definition with `custom_init` / `custom_destroy` operations
pub fn recording_definition(name: &str, log: &HookLog) -> ManagedDefinition {
    recording_definition_failing(name, log, None)
}

pub fn recording_definition_failing(
    name: &str,
    log: &HookLog,
    fail_on: Option<&'static str>,
) -> ManagedDefinition {
    let label = name.to_string();
    let log = log.clone();
    ManagedDefinition::shared(name)
        .constructs(move |_| {
            log.push(format!("{label}:construct"));
            let object = RecordingObject::new(label.clone(), log.clone());
            Ok(match fail_on {
                Some(hook) => object.failing_on(hook),
                None => object,
            })
        })
        .init_operation("custom_init", |object: &mut RecordingObject| {
            object.hook("custom_init")
        })
        .destroy_operation("custom_destroy", |object: &RecordingObject| {
            object.hook("custom_destroy")
        })
        .build()
        .expect("valid recording definition")
}

/// Creation hooks in their required order, for one label
pub fn expected_creation_log(label: &str) -> Vec<String> {
    [
        "construct",
        "name",
        "environment",
        "registry",
        "value_resolver",
        "event_publisher",
        "message_source",
        "after_properties_set",
        "custom_init",
    ]
    .iter()
    .map(|hook| format!("{label}:{hook}"))
    .collect()
}

/// Post processor and destruction processor logging as `tag.phase:name`
pub struct RecordingProcessor {
    pub tag: String,
    pub log: HookLog,
}

impl RecordingProcessor {
    pub fn new(tag: impl Into<String>, log: &HookLog) -> Arc<Self> {
        Arc::new(Self {
            tag: tag.into(),
            log: log.clone(),
        })
    }
}

impl ObjectPostProcessor for RecordingProcessor {
    fn before_initialization(
        &self,
        object: Box<dyn ManagedObject>,
        name: &str,
    ) -> anyhow::Result<Box<dyn ManagedObject>> {
        self.log.push(format!("{name}:{}.before", self.tag));
        Ok(object)
    }

    fn after_initialization(
        &self,
        object: Box<dyn ManagedObject>,
        name: &str,
    ) -> anyhow::Result<Box<dyn ManagedObject>> {
        self.log.push(format!("{name}:{}.after", self.tag));
        Ok(object)
    }
}

impl DestructionAwareProcessor for RecordingProcessor {
    fn before_destruction(
        &self,
        _object: &(dyn ManagedObject + 'static),
        name: &str,
    ) -> anyhow::Result<()> {
        self.log.push(format!("{name}:{}.destruction", self.tag));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Clock;

impl ManagedObject for Clock {}

#[derive(Debug, Default)]
pub struct Calendar;

impl ManagedObject for Calendar {}

#[derive(Debug)]
pub struct Mailer {
    pub host: String,
}

impl ManagedObject for Mailer {}

pub fn clock_definition(name: &str) -> ManagedDefinition {
    ManagedDefinition::shared(name)
        .constructs(|_| Ok(Clock))
        .build()
        .expect("valid clock definition")
}

pub fn mailer_definition(name: &str, host: &str) -> ManagedDefinition {
    let host = host.to_string();
    ManagedDefinition::shared(name)
        .constructs(move |_| Ok(Mailer { host: host.clone() }))
        .build()
        .expect("valid mailer definition")
}

/// Product of [`ConnectionFactory`]
#[derive(Debug)]
pub struct Connection {
    pub serial: usize,
}

impl ManagedObject for Connection {}

/// Producer of numbered connections
pub struct ConnectionFactory {
    pub produced: Arc<AtomicUsize>,
    pub shared_product: bool,
}

impl ManagedObject for ConnectionFactory {
    fn as_producer(&self) -> Option<&dyn ObjectProducer> {
        Some(self)
    }
}

impl ObjectProducer for ConnectionFactory {
    fn produce(&self) -> anyhow::Result<Box<dyn ManagedObject>> {
        let serial = self.produced.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Box::new(Connection { serial }))
    }

    fn produced_type(&self) -> Option<TypeDescriptor> {
        Some(TypeDescriptor::of::<Connection>())
    }

    fn is_shared_product(&self) -> bool {
        self.shared_product
    }
}

pub fn connection_factory_definition(
    name: &str,
    produced: &Arc<AtomicUsize>,
    shared_product: bool,
) -> ManagedDefinition {
    let produced = Arc::clone(produced);
    ManagedDefinition::shared(name)
        .constructs(move |_| {
            Ok(ConnectionFactory {
                produced: Arc::clone(&produced),
                shared_product,
            })
        })
        .producer_of::<Connection>()
        .build()
        .expect("valid producer definition")
}
