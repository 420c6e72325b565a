use crate::constants::naming::FACTORY_DEREFERENCE_PREFIX;
use crate::lifecycle::ManagedObject;
use crate::types::TypeDescriptor;

/// An object that produces other objects.
///
/// A plain lookup of a producer's name returns its product; a lookup of
/// `&name` returns the producer itself.
pub trait ObjectProducer: Send + Sync {
    fn produce(&self) -> anyhow::Result<Box<dyn ManagedObject>>;

    /// Type of the product, when known before producing
    fn produced_type(&self) -> Option<TypeDescriptor> {
        None
    }

    /// Whether one product is cached and reused for a shared producer
    fn is_shared_product(&self) -> bool {
        true
    }
}

/// A requested name split into its canonical part and the dereference flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectName<'a> {
    base: &'a str,
    dereference: bool,
}

impl<'a> ObjectName<'a> {
    /// Parse a requested name; repeated prefixes collapse into one
    pub fn parse(raw: &'a str) -> Self {
        let base = raw.trim_start_matches(FACTORY_DEREFERENCE_PREFIX);
        Self {
            base,
            dereference: base.len() != raw.len(),
        }
    }

    pub fn base(&self) -> &'a str {
        self.base
    }

    /// Whether the producer itself was asked for
    pub fn is_dereference(&self) -> bool {
        self.dereference
    }

    /// The same request against another base name
    pub fn with_base(&self, base: &str) -> String {
        if self.dereference {
            dereference_name(base)
        } else {
            base.to_string()
        }
    }
}

/// `&name`: the request for the producer registered as `name`
pub fn dereference_name(name: &str) -> String {
    format!("{FACTORY_DEREFERENCE_PREFIX}{name}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_and_prefixed_names() {
        let plain = ObjectName::parse("connection");
        assert_eq!(plain.base(), "connection");
        assert!(!plain.is_dereference());

        let prefixed = ObjectName::parse("&connection");
        assert_eq!(prefixed.base(), "connection");
        assert!(prefixed.is_dereference());

        let repeated = ObjectName::parse("&&connection");
        assert_eq!(repeated.base(), "connection");
        assert!(repeated.is_dereference());
    }

    #[test]
    fn test_with_base_keeps_prefix() {
        assert_eq!(ObjectName::parse("&pool").with_base("db"), "&db");
        assert_eq!(ObjectName::parse("pool").with_base("db"), "db");
        assert_eq!(dereference_name("pool"), "&pool");
    }
}
