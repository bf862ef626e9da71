//! Value representation
//!
//! Values flow between the dispatch layer and the store. Primitive values are
//! stored inline; objects are shared handles compared by identity.

use crate::identity::ObjectId;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

/// Owning handle to a target object
///
/// Cloning the handle shares the object. Two handles are equal only if they
/// refer to the same allocation, regardless of the object's contents.
#[derive(Clone)]
pub struct ObjectRef(Arc<dyn Any + Send + Sync>);

impl ObjectRef {
    /// Allocate a new shared object
    pub fn new<T: Any + Send + Sync>(object: T) -> Self {
        ObjectRef(Arc::new(object))
    }

    /// Wrap an existing shared allocation
    pub fn from_arc<T: Any + Send + Sync>(object: Arc<T>) -> Self {
        ObjectRef(object)
    }

    /// Get the identity of the referenced object
    #[inline]
    pub fn identity(&self) -> ObjectId {
        ObjectId::from_addr(Arc::as_ptr(&self.0) as *const () as usize)
    }

    /// Check if both handles refer to the same object
    #[inline]
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        self.identity() == other.identity()
    }

    /// Create a non-owning handle to the object
    pub fn downgrade(&self) -> WeakObjectRef {
        WeakObjectRef {
            id: self.identity(),
            weak: Arc::downgrade(&self.0),
        }
    }

    /// Borrow the object as a concrete type
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        (*self.0).downcast_ref::<T>()
    }

    /// Number of owning handles to the object
    pub fn strong_count(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for ObjectRef {}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef({})", self.identity())
    }
}

/// Non-owning handle to a target object
///
/// The handle remembers the identity of its target. As long as the handle
/// exists the target's allocation is not reused, so identity comparison stays
/// exact even after the target itself has been dropped.
#[derive(Clone)]
pub struct WeakObjectRef {
    id: ObjectId,
    weak: Weak<dyn Any + Send + Sync>,
}

impl WeakObjectRef {
    /// Identity of the target object
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Check if the target object is still alive
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.weak.strong_count() > 0
    }

    /// Recover an owning handle, if the target is still alive
    pub fn upgrade(&self) -> Option<ObjectRef> {
        self.weak.upgrade().map(ObjectRef)
    }

    /// Check if this handle observes `object`
    #[inline]
    pub fn is(&self, object: &ObjectRef) -> bool {
        self.id == object.identity()
    }
}

impl fmt::Debug for WeakObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeakObjectRef")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

/// Semantic type tag of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean
    Bool,
    /// 64-bit signed integer
    Int,
    /// 64-bit float
    Float,
    /// String
    Str,
    /// Object reference
    Object,
    /// Any value
    Any,
}

impl ValueType {
    /// Check if a value is admitted by this type without coercion
    ///
    /// `Null` is admitted by the reference types only.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (ValueType::Any, _) => true,
            (ValueType::Str | ValueType::Object, Value::Null) => true,
            (ValueType::Bool, Value::Bool(_))
            | (ValueType::Int, Value::Int(_))
            | (ValueType::Float, Value::Float(_))
            | (ValueType::Str, Value::Str(_))
            | (ValueType::Object, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Check if this is the boolean type
    pub fn is_boolean(&self) -> bool {
        matches!(self, ValueType::Bool)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "boolean",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Str => "string",
            ValueType::Object => "object",
            ValueType::Any => "any",
        };
        f.write_str(name)
    }
}

/// Dynamically typed runtime value
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Immutable string
    Str(Arc<str>),
    /// Shared object
    Object(ObjectRef),
}

impl Value {
    /// Create a null value
    pub const fn null() -> Self {
        Value::Null
    }

    /// Create a boolean value
    pub const fn bool(b: bool) -> Self {
        Value::Bool(b)
    }

    /// Create an integer value
    pub const fn int(i: i64) -> Self {
        Value::Int(i)
    }

    /// Create a float value
    pub const fn float(f: f64) -> Self {
        Value::Float(f)
    }

    /// Create a string value
    pub fn str(s: impl Into<Arc<str>>) -> Self {
        Value::Str(s.into())
    }

    /// Allocate a new object and wrap it
    pub fn object<T: std::any::Any + Send + Sync>(object: T) -> Self {
        Value::Object(ObjectRef::new(object))
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Extract boolean value
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extract integer value
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Extract float value
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Borrow string value
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow object handle
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Type tag of this value (None for null)
    pub fn value_type(&self) -> Option<ValueType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ValueType::Bool),
            Value::Int(_) => Some(ValueType::Int),
            Value::Float(_) => Some(ValueType::Float),
            Value::Str(_) => Some(ValueType::Str),
            Value::Object(_) => Some(ValueType::Object),
        }
    }
}

// Objects compare by identity, everything else by content
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<ObjectRef> for Value {
    fn from(o: ObjectRef) -> Self {
        Value::Object(o)
    }
}

/// Value a property reads as before it was ever written on a thread
#[derive(Clone, Default)]
pub enum DefaultValue {
    /// No default; reads materialize `Value::Null`
    #[default]
    None,
    /// Fixed initial value
    Value(Value),
    /// Computed once per thread and object, on first read
    Lazy(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Create a fixed default
    pub fn value(value: impl Into<Value>) -> Self {
        DefaultValue::Value(value.into())
    }

    /// Create a lazily computed default
    pub fn lazy<F>(supplier: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        DefaultValue::Lazy(Arc::new(supplier))
    }

    /// Produce the value to store for an unwritten slot
    pub fn materialize(&self) -> Value {
        match self {
            DefaultValue::None => Value::Null,
            DefaultValue::Value(v) => v.clone(),
            DefaultValue::Lazy(supplier) => supplier(),
        }
    }

    /// The fixed default, if any
    pub fn fixed(&self) -> Option<&Value> {
        match self {
            DefaultValue::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Check if this default is computed on demand
    pub fn is_lazy(&self) -> bool {
        matches!(self, DefaultValue::Lazy(_))
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::None => f.write_str("None"),
            DefaultValue::Value(v) => f.debug_tuple("Value").field(v).finish(),
            DefaultValue::Lazy(_) => f.write_str("Lazy(..)"),
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(value: Value) -> Self {
        DefaultValue::Value(value)
    }
}
