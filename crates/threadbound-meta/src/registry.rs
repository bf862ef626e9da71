//! Method registry
//!
//! Maps (declaring type, method name) to a meta-method so a dispatch layer
//! can resolve `obj.getCount()` style calls by name. Registration and lookup
//! may happen from any thread.

use crate::method::MetaMethod;
use crate::property::ThreadManagedProperty;
use crate::{MetaError, MetaResult};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;
use threadbound_store::Value;

/// Registry key: declaring type and external method name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodKey {
    declaring_type: Arc<str>,
    name: Arc<str>,
}

impl MethodKey {
    /// Create a key
    pub fn new(declaring_type: &str, name: &str) -> Self {
        Self {
            declaring_type: Arc::from(declaring_type),
            name: Arc::from(name),
        }
    }

    /// Declaring type
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Concurrent registry of meta-methods
#[derive(Debug, Default)]
pub struct MethodRegistry {
    methods: DashMap<MethodKey, Arc<dyn MetaMethod>>,
}

impl MethodRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a method under its own name
    pub fn register(&self, method: Arc<dyn MetaMethod>) -> MetaResult<()> {
        let key = MethodKey::new(method.declaring_type(), method.name());
        match self.methods.entry(key) {
            Entry::Occupied(occupied) => Err(MetaError::DuplicateMethod {
                declaring_type: occupied.key().declaring_type().to_string(),
                name: occupied.key().name().to_string(),
            }),
            Entry::Vacant(vacant) => {
                tracing::debug!(
                    declaring_type = vacant.key().declaring_type(),
                    method = vacant.key().name(),
                    "registered meta-method"
                );
                vacant.insert(method);
                Ok(())
            }
        }
    }

    /// Register both accessors of a property
    ///
    /// Either both accessors are registered or neither is.
    pub fn register_property(&self, property: &ThreadManagedProperty) -> MetaResult<()> {
        let getter: Arc<dyn MetaMethod> = property.getter().clone();
        let setter: Arc<dyn MetaMethod> = property.setter().clone();
        let getter_key = MethodKey::new(getter.declaring_type(), getter.name());

        self.register(getter)?;
        if let Err(err) = self.register(setter) {
            self.methods.remove(&getter_key);
            return Err(err);
        }
        Ok(())
    }

    /// Remove a method
    pub fn unregister(&self, declaring_type: &str, name: &str) -> Option<Arc<dyn MetaMethod>> {
        self.methods
            .remove(&MethodKey::new(declaring_type, name))
            .map(|(_, method)| method)
    }

    /// Look up a method by name
    pub fn lookup(&self, declaring_type: &str, name: &str) -> Option<Arc<dyn MetaMethod>> {
        self.methods
            .get(&MethodKey::new(declaring_type, name))
            .map(|method| method.value().clone())
    }

    /// All methods declared on a type, sorted by name
    pub fn methods_of(&self, declaring_type: &str) -> Vec<Arc<dyn MetaMethod>> {
        let mut methods: Vec<_> = self
            .methods
            .iter()
            .filter(|entry| entry.key().declaring_type() == declaring_type)
            .map(|entry| entry.value().clone())
            .collect();
        methods.sort_by(|a, b| a.name().cmp(b.name()));
        methods
    }

    /// Resolve and invoke a method, checking its arity first
    pub fn invoke(
        &self,
        declaring_type: &str,
        name: &str,
        target: &Value,
        args: &[Value],
    ) -> MetaResult<Value> {
        let method = self
            .lookup(declaring_type, name)
            .ok_or_else(|| MetaError::UnknownMethod {
                declaring_type: declaring_type.to_string(),
                name: name.to_string(),
            })?;

        if args.len() != method.arity() {
            return Err(MetaError::InvalidArity {
                method: name.to_string(),
                expected: method.arity(),
                found: args.len(),
            });
        }

        method.invoke(target, args)
    }

    /// Number of registered methods
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadbound_store::{DefaultValue, ValueType};

    fn count_property() -> ThreadManagedProperty {
        ThreadManagedProperty::new("Worker", "count", ValueType::Int, DefaultValue::value(0i64))
            .unwrap()
    }

    #[test]
    fn test_register_property() {
        let registry = MethodRegistry::new();
        assert!(registry.is_empty());

        registry.register_property(&count_property()).unwrap();
        assert_eq!(registry.len(), 2);

        assert!(registry.lookup("Worker", "getCount").is_some());
        assert!(registry.lookup("Worker", "setCount").is_some());
        assert!(registry.lookup("Worker", "count").is_none());
        assert!(registry.lookup("Other", "getCount").is_none());

        let names: Vec<_> = registry
            .methods_of("Worker")
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["getCount", "setCount"]);
    }

    #[test]
    fn test_duplicate_registration_is_atomic() {
        let registry = MethodRegistry::new();
        let prop = count_property();
        registry.register(prop.setter().clone()).unwrap();

        let err = registry.register_property(&prop).unwrap_err();
        assert!(matches!(err, MetaError::DuplicateMethod { .. }));

        // The getter was rolled back
        assert_eq!(registry.len(), 1);
        assert!(registry.lookup("Worker", "getCount").is_none());
    }

    #[test]
    fn test_invoke_through_registry() {
        let registry = MethodRegistry::new();
        registry.register_property(&count_property()).unwrap();
        let target = Value::object(());

        assert_eq!(
            registry.invoke("Worker", "getCount", &target, &[]).unwrap(),
            Value::int(0)
        );
        registry
            .invoke("Worker", "setCount", &target, &[Value::int(4)])
            .unwrap();
        assert_eq!(
            registry.invoke("Worker", "getCount", &target, &[]).unwrap(),
            Value::int(4)
        );
    }

    #[test]
    fn test_invoke_errors() {
        let registry = MethodRegistry::new();
        registry.register_property(&count_property()).unwrap();
        let target = Value::object(());

        let err = registry
            .invoke("Worker", "getCount", &target, &[Value::int(1)])
            .unwrap_err();
        assert_eq!(
            err,
            MetaError::InvalidArity {
                method: "getCount".to_string(),
                expected: 0,
                found: 1,
            }
        );

        let err = registry.invoke("Worker", "getSize", &target, &[]).unwrap_err();
        assert!(matches!(err, MetaError::UnknownMethod { .. }));
    }

    #[test]
    fn test_unregister() {
        let registry = MethodRegistry::new();
        registry.register_property(&count_property()).unwrap();

        assert!(registry.unregister("Worker", "getCount").is_some());
        assert!(registry.unregister("Worker", "getCount").is_none());
        assert_eq!(registry.len(), 1);
    }
}
