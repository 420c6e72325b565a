//! Container services handed to awareness-declaring objects.

use dashmap::DashMap;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const PLACEHOLDER_PREFIX: &str = "${";
const PLACEHOLDER_SUFFIX: char = '}';
const DEFAULT_SEPARATOR: char = ':';

/// Read-only property set of one registry level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    properties: HashMap<String, String>,
}

impl Environment {
    pub fn new(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn contains_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn property_names(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaceholderError {
    #[error("Could not resolve placeholder '{key}'")]
    Unresolvable { key: String },

    #[error("Unterminated placeholder starting at byte {position}")]
    Unterminated { position: usize },

    #[error("Circular placeholder reference '{key}'")]
    Circular { key: String },
}

/// Resolves `${key}` and `${key:default}` placeholders against an environment.
///
/// Property values may themselves contain placeholders; they are resolved
/// recursively and self-referencing properties are rejected.
#[derive(Debug, Clone)]
pub struct ValueResolver {
    environment: Arc<Environment>,
}

impl ValueResolver {
    pub fn new(environment: Arc<Environment>) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn resolve(&self, text: &str) -> Result<String, PlaceholderError> {
        let mut visiting = HashSet::new();
        self.resolve_nested(text, &mut visiting)
    }

    fn resolve_nested(
        &self,
        text: &str,
        visiting: &mut HashSet<String>,
    ) -> Result<String, PlaceholderError> {
        let mut output = String::with_capacity(text.len());
        let mut rest = text;
        let mut offset = 0;

        while let Some(start) = rest.find(PLACEHOLDER_PREFIX) {
            output.push_str(&rest[..start]);
            let body_start = start + PLACEHOLDER_PREFIX.len();
            let Some(body_len) = rest[body_start..].find(PLACEHOLDER_SUFFIX) else {
                return Err(PlaceholderError::Unterminated {
                    position: offset + start,
                });
            };

            let body = &rest[body_start..body_start + body_len];
            let (key, default) = match body.split_once(DEFAULT_SEPARATOR) {
                Some((key, default)) => (key, Some(default)),
                None => (body, None),
            };

            output.push_str(&self.resolve_key(key, default, visiting)?);

            let consumed = body_start + body_len + 1;
            offset += consumed;
            rest = &rest[consumed..];
        }

        output.push_str(rest);
        Ok(output)
    }

    fn resolve_key(
        &self,
        key: &str,
        default: Option<&str>,
        visiting: &mut HashSet<String>,
    ) -> Result<String, PlaceholderError> {
        match self.environment.property(key) {
            Some(raw) => {
                if !visiting.insert(key.to_string()) {
                    return Err(PlaceholderError::Circular {
                        key: key.to_string(),
                    });
                }
                let resolved = self.resolve_nested(raw, visiting);
                visiting.remove(key);
                resolved
            }
            None => default
                .map(str::to_string)
                .ok_or_else(|| PlaceholderError::Unresolvable {
                    key: key.to_string(),
                }),
        }
    }
}

/// Source of localized, parameterized messages
pub trait MessageSource: Send + Sync + fmt::Debug {
    /// Message for `code` with `args` substituted, or `None` when unknown
    fn message(&self, code: &str, args: &[&str]) -> Option<String>;

    /// Message for `code`, falling back to `default` when unknown
    fn message_or(&self, code: &str, args: &[&str], default: &str) -> String {
        self.message(code, args)
            .unwrap_or_else(|| format_message(default, args))
    }
}

/// In-memory message source with `{0}`, `{1}`, ... argument substitution
#[derive(Debug, Default)]
pub struct StaticMessageSource {
    messages: DashMap<String, String>,
}

impl StaticMessageSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_message(self, code: impl Into<String>, template: impl Into<String>) -> Self {
        self.add_message(code, template);
        self
    }

    pub fn add_message(&self, code: impl Into<String>, template: impl Into<String>) {
        self.messages.insert(code.into(), template.into());
    }
}

impl MessageSource for StaticMessageSource {
    fn message(&self, code: &str, args: &[&str]) -> Option<String> {
        self.messages
            .get(code)
            .map(|template| format_message(template.value(), args))
    }
}

fn format_message(template: &str, args: &[&str]) -> String {
    args.iter()
        .enumerate()
        .fold(template.to_string(), |message, (index, arg)| {
            message.replace(&format!("{{{index}}}"), arg)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(pairs: &[(&str, &str)]) -> ValueResolver {
        let properties = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ValueResolver::new(Arc::new(Environment::new(properties)))
    }

    #[test]
    fn test_resolves_placeholders() {
        let resolver = resolver(&[("smtp.host", "mail.local"), ("smtp.port", "25")]);
        assert_eq!(
            resolver.resolve("${smtp.host}:${smtp.port}").unwrap(),
            "mail.local:25"
        );
        assert_eq!(resolver.resolve("plain text").unwrap(), "plain text");
    }

    #[test]
    fn test_default_values() {
        let resolver = resolver(&[]);
        assert_eq!(resolver.resolve("${timeout:30}s").unwrap(), "30s");
        assert_eq!(resolver.resolve("${empty:}").unwrap(), "");
    }

    #[test]
    fn test_unresolvable_and_unterminated() {
        let resolver = resolver(&[]);
        assert_eq!(
            resolver.resolve("x ${missing}"),
            Err(PlaceholderError::Unresolvable {
                key: "missing".to_string()
            })
        );
        assert_eq!(
            resolver.resolve("ab${open"),
            Err(PlaceholderError::Unterminated { position: 2 })
        );
    }

    #[test]
    fn test_nested_and_circular_properties() {
        let resolver = resolver(&[
            ("base", "/srv"),
            ("logs", "${base}/logs"),
            ("loop.a", "${loop.b}"),
            ("loop.b", "${loop.a}"),
        ]);
        assert_eq!(resolver.resolve("${logs}").unwrap(), "/srv/logs");
        assert!(matches!(
            resolver.resolve("${loop.a}"),
            Err(PlaceholderError::Circular { .. })
        ));
    }

    #[test]
    fn test_same_key_twice_is_not_circular() {
        let resolver = resolver(&[("name", "x")]);
        assert_eq!(resolver.resolve("${name}-${name}").unwrap(), "x-x");
    }

    #[test]
    fn test_static_message_source() {
        let source = StaticMessageSource::new()
            .with_message("greeting", "Hello {0}, you have {1} messages");

        assert_eq!(
            source.message("greeting", &["Ada", "3"]).as_deref(),
            Some("Hello Ada, you have 3 messages")
        );
        assert!(source.message("farewell", &[]).is_none());
        assert_eq!(source.message_or("farewell", &["Ada"], "Bye {0}"), "Bye Ada");
    }
}
