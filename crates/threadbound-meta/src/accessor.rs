//! Synthesized accessor pair
//!
//! Both accessors are stateless beyond their descriptor and cached name;
//! every value lives in the calling thread's store mapping.

use crate::descriptor::PropertyDescriptor;
use crate::method::MetaMethod;
use crate::naming::{getter_name, setter_name};
use crate::{MetaError, MetaResult};
use std::sync::Arc;
use threadbound_store::{store, Value, ValueType};

/// Reads a thread-scoped property
#[derive(Debug, Clone)]
pub struct ThreadBoundGetter {
    descriptor: Arc<PropertyDescriptor>,
    name: String,
}

impl ThreadBoundGetter {
    /// Create the getter for a property
    pub fn new(descriptor: Arc<PropertyDescriptor>) -> Self {
        let name = getter_name(descriptor.name(), &descriptor.value_type());
        Self { descriptor, name }
    }

    /// Descriptor of the property read
    pub fn descriptor(&self) -> &Arc<PropertyDescriptor> {
        &self.descriptor
    }

    /// Read the calling thread's value for `target`
    pub fn get(&self, target: &Value) -> MetaResult<Value> {
        Ok(store::get(
            target,
            self.descriptor.name(),
            self.descriptor.default_value(),
        )?)
    }
}

impl MetaMethod for ThreadBoundGetter {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        self.descriptor.declaring_type()
    }

    fn parameter_types(&self) -> &[ValueType] {
        &[]
    }

    fn return_type(&self) -> ValueType {
        self.descriptor.value_type()
    }

    // Arity is enforced by the dispatch layer
    fn invoke(&self, target: &Value, _args: &[Value]) -> MetaResult<Value> {
        self.get(target)
    }
}

/// Writes a thread-scoped property
#[derive(Debug, Clone)]
pub struct ThreadBoundSetter {
    descriptor: Arc<PropertyDescriptor>,
    name: String,
    parameter_types: [ValueType; 1],
}

impl ThreadBoundSetter {
    /// Create the setter for a property
    pub fn new(descriptor: Arc<PropertyDescriptor>) -> Self {
        let name = setter_name(descriptor.name());
        let parameter_types = [descriptor.value_type()];
        Self {
            descriptor,
            name,
            parameter_types,
        }
    }

    /// Descriptor of the property written
    pub fn descriptor(&self) -> &Arc<PropertyDescriptor> {
        &self.descriptor
    }

    /// Write the calling thread's value for `target`
    ///
    /// Returns the previously stored value, if any.
    pub fn set(&self, target: &Value, value: Value) -> MetaResult<Option<Value>> {
        let value_type = self.descriptor.value_type();
        if !value_type.accepts(&value) {
            return Err(MetaError::InvalidArgument(format!(
                "{} expects a {}, got {:?}",
                self.name, value_type, value
            )));
        }
        Ok(store::set(target, self.descriptor.name(), value)?)
    }
}

impl MetaMethod for ThreadBoundSetter {
    fn name(&self) -> &str {
        &self.name
    }

    fn declaring_type(&self) -> &str {
        self.descriptor.declaring_type()
    }

    fn parameter_types(&self) -> &[ValueType] {
        &self.parameter_types
    }

    fn return_type(&self) -> ValueType {
        self.descriptor.value_type()
    }

    fn invoke(&self, target: &Value, args: &[Value]) -> MetaResult<Value> {
        let [value] = args else {
            return Err(MetaError::InvalidArgument(format!(
                "{} takes exactly one argument, got {}",
                self.name,
                args.len()
            )));
        };
        Ok(self.set(target, value.clone())?.unwrap_or(Value::Null))
    }
}
