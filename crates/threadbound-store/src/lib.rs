//! Threadbound Store
//!
//! Thread-scoped storage for dynamic object properties:
//! - One private mapping per thread, created lazily on first access
//! - Entries keyed by object identity and property name, never by content
//! - Weak entries that never keep their target object alive
//! - Inheritance-on-spawn: a child thread starts with a copy of its parent's mapping
//!
//! # Example
//!
//! ```
//! use threadbound_store::{store, DefaultValue, Value};
//!
//! let session = Value::object(String::from("session"));
//! let default = DefaultValue::value(Value::int(0));
//!
//! assert_eq!(store::get(&session, "counter", &default).unwrap(), Value::int(0));
//! store::set(&session, "counter", Value::int(5)).unwrap();
//! assert_eq!(store::get(&session, "counter", &default).unwrap(), Value::int(5));
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod context;
pub mod identity;
pub mod options;
pub mod store;
pub mod table;
pub mod thread;
pub mod value;

pub use context::{MappingId, MappingSnapshot, ThreadContext};
pub use identity::{IdentityCode, ObjectId};
pub use options::StoreOptions;
pub use table::PropertyTable;
pub use thread::InheritedContext;
pub use value::{DefaultValue, ObjectRef, Value, ValueType, WeakObjectRef};

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Missing target object or malformed property name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Store operation result
pub type StoreResult<T> = Result<T, StoreError>;
