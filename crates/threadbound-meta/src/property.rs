//! Thread-managed properties
//!
//! A `ThreadManagedProperty` behaves like an instance field whose value is
//! bound to the current thread. Threads spawned through
//! `threadbound_store::thread` start with their parent's values; writes in a
//! child never reach the parent.

use crate::accessor::{ThreadBoundGetter, ThreadBoundSetter};
use crate::descriptor::PropertyDescriptor;
use crate::MetaResult;
use std::sync::Arc;
use threadbound_store::{DefaultValue, Value, ValueType};

/// A property declaration together with its accessor pair
#[derive(Debug, Clone)]
pub struct ThreadManagedProperty {
    descriptor: Arc<PropertyDescriptor>,
    getter: Arc<ThreadBoundGetter>,
    setter: Arc<ThreadBoundSetter>,
}

impl ThreadManagedProperty {
    /// Declare a property on `declaring_type`
    pub fn new(
        declaring_type: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        value_type: ValueType,
        initial_value: DefaultValue,
    ) -> MetaResult<Self> {
        let descriptor = PropertyDescriptor::new(declaring_type, name, value_type, initial_value)?;
        Ok(Self::from_descriptor(Arc::new(descriptor)))
    }

    /// Build the accessor pair for an existing descriptor
    pub fn from_descriptor(descriptor: Arc<PropertyDescriptor>) -> Self {
        Self {
            getter: Arc::new(ThreadBoundGetter::new(descriptor.clone())),
            setter: Arc::new(ThreadBoundSetter::new(descriptor.clone())),
            descriptor,
        }
    }

    /// Property descriptor
    pub fn descriptor(&self) -> &Arc<PropertyDescriptor> {
        &self.descriptor
    }

    /// Property name
    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    /// Declared value type
    pub fn value_type(&self) -> ValueType {
        self.descriptor.value_type()
    }

    /// Value every thread starts from
    pub fn initial_value(&self) -> &DefaultValue {
        self.descriptor.default_value()
    }

    /// The synthesized getter
    pub fn getter(&self) -> &Arc<ThreadBoundGetter> {
        &self.getter
    }

    /// The synthesized setter
    pub fn setter(&self) -> &Arc<ThreadBoundSetter> {
        &self.setter
    }

    /// Read the calling thread's value for `target`
    pub fn get(&self, target: &Value) -> MetaResult<Value> {
        self.getter.get(target)
    }

    /// Write the calling thread's value for `target`, returning the previous one
    pub fn set(&self, target: &Value, value: Value) -> MetaResult<Option<Value>> {
        self.setter.set(target, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::method::MetaMethod;

    #[test]
    fn test_property_accessors_share_descriptor() {
        let prop = ThreadManagedProperty::new(
            "Worker",
            "active",
            ValueType::Bool,
            DefaultValue::value(false),
        )
        .unwrap();

        assert!(Arc::ptr_eq(prop.getter().descriptor(), prop.descriptor()));
        assert!(Arc::ptr_eq(prop.setter().descriptor(), prop.descriptor()));
        assert_eq!(prop.getter().name(), "isActive");
        assert_eq!(prop.setter().name(), "setActive");
        assert_eq!(prop.initial_value().fixed(), Some(&Value::bool(false)));
    }

    #[test]
    fn test_property_get_set() {
        let prop =
            ThreadManagedProperty::new("Worker", "label", ValueType::Str, DefaultValue::None)
                .unwrap();
        let target = Value::object(());

        assert_eq!(prop.get(&target).unwrap(), Value::Null);
        assert_eq!(prop.set(&target, Value::str("a")).unwrap(), Some(Value::Null));
        assert_eq!(prop.set(&target, Value::str("b")).unwrap(), Some(Value::str("a")));
        assert_eq!(prop.get(&target).unwrap(), Value::str("b"));
    }

    #[test]
    fn test_two_properties_do_not_interfere() {
        let a = ThreadManagedProperty::new("Worker", "a", ValueType::Int, DefaultValue::value(0i64))
            .unwrap();
        let b = ThreadManagedProperty::new("Worker", "b", ValueType::Int, DefaultValue::value(0i64))
            .unwrap();
        let target = Value::object(());

        a.set(&target, Value::int(1)).unwrap();
        assert_eq!(b.get(&target).unwrap(), Value::int(0));
    }
}
