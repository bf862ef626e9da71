//! Property descriptors

use crate::{MetaError, MetaResult};
use std::sync::Arc;
use threadbound_store::store::validate_property_name;
use threadbound_store::{DefaultValue, ValueType};

/// Immutable declaration of a thread-scoped property
///
/// Created once when the property is declared and shared by its accessors.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    declaring_type: Arc<str>,
    name: Arc<str>,
    value_type: ValueType,
    default: DefaultValue,
}

impl PropertyDescriptor {
    /// Declare a property
    ///
    /// Fails if the name is not an identifier, the declaring type is empty,
    /// or a fixed default is not admitted by `value_type`.
    pub fn new(
        declaring_type: impl Into<Arc<str>>,
        name: impl Into<Arc<str>>,
        value_type: ValueType,
        default: DefaultValue,
    ) -> MetaResult<Self> {
        let declaring_type = declaring_type.into();
        let name = name.into();

        if declaring_type.is_empty() {
            return Err(MetaError::InvalidArgument(
                "declaring type name is empty".to_string(),
            ));
        }
        validate_property_name(&name)?;
        if let Some(value) = default.fixed() {
            if !value_type.accepts(value) {
                return Err(MetaError::InvalidArgument(format!(
                    "default {:?} is not a {} for property {}",
                    value, value_type, name
                )));
            }
        }

        Ok(Self {
            declaring_type,
            name,
            value_type,
            default,
        })
    }

    /// Type the property is declared on
    pub fn declaring_type(&self) -> &str {
        &self.declaring_type
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value type
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Configured default
    pub fn default_value(&self) -> &DefaultValue {
        &self.default
    }
}
