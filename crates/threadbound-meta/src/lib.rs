//! Threadbound meta-methods
//!
//! Presents thread-scoped storage to a reflective dispatch layer as ordinary
//! getter/setter methods:
//! - `PropertyDescriptor`: immutable declaration of one property
//! - `ThreadBoundGetter` / `ThreadBoundSetter`: the synthesized accessor pair
//! - `ThreadManagedProperty`: a descriptor with its accessors
//! - `MethodRegistry`: name-based lookup and invocation for the dispatch layer
//!
//! # Example
//!
//! ```
//! use threadbound_meta::{ThreadManagedProperty, MetaMethod};
//! use threadbound_store::{DefaultValue, Value, ValueType};
//!
//! let count = ThreadManagedProperty::new(
//!     "Worker",
//!     "count",
//!     ValueType::Int,
//!     DefaultValue::value(Value::int(0)),
//! )
//! .unwrap();
//!
//! let worker = Value::object(());
//! assert_eq!(count.getter().name(), "getCount");
//! assert_eq!(count.getter().invoke(&worker, &[]).unwrap(), Value::int(0));
//! count.setter().invoke(&worker, &[Value::int(3)]).unwrap();
//! assert_eq!(count.get(&worker).unwrap(), Value::int(3));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod accessor;
pub mod descriptor;
pub mod method;
pub mod naming;
pub mod property;
pub mod registry;

pub use accessor::{ThreadBoundGetter, ThreadBoundSetter};
pub use descriptor::PropertyDescriptor;
pub use method::{MetaMethod, Modifiers};
pub use property::ThreadManagedProperty;
pub use registry::{MethodKey, MethodRegistry};

use threadbound_store::StoreError;

/// Meta-method errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MetaError {
    /// Null target, malformed name, or an argument the property cannot hold
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Wrong number of arguments for a method
    #[error("Method {method} expects {expected} argument(s), got {found}")]
    InvalidArity {
        /// Method name
        method: String,
        /// Declared arity
        expected: usize,
        /// Supplied argument count
        found: usize,
    },

    /// No method registered under the name
    #[error("No method {name} on {declaring_type}")]
    UnknownMethod {
        /// Type searched
        declaring_type: String,
        /// Method name searched
        name: String,
    },

    /// A method with the same name is already registered
    #[error("Method {name} already registered on {declaring_type}")]
    DuplicateMethod {
        /// Type registered on
        declaring_type: String,
        /// Conflicting method name
        name: String,
    },
}

impl MetaError {
    /// Check if this is an invalid-argument failure
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, MetaError::InvalidArgument(_))
    }
}

impl From<StoreError> for MetaError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidArgument(msg) => MetaError::InvalidArgument(msg),
        }
    }
}

/// Meta-method result
pub type MetaResult<T> = Result<T, MetaError>;
