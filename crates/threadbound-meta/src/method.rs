//! Meta-method calling convention

use crate::MetaResult;
use std::fmt;
use threadbound_store::{Value, ValueType};

/// Member modifiers exposed for reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Public visibility
    pub is_public: bool,
    /// Static member
    pub is_static: bool,
}

impl Modifiers {
    /// Public instance member
    pub const PUBLIC: Modifiers = Modifiers {
        is_public: true,
        is_static: false,
    };
}

/// A method the dispatch layer can register by name and invoke
pub trait MetaMethod: fmt::Debug + Send + Sync {
    /// External name the method is registered under
    fn name(&self) -> &str;

    /// Type the method is declared on
    fn declaring_type(&self) -> &str;

    /// Declared parameter types
    fn parameter_types(&self) -> &[ValueType];

    /// Declared return type
    fn return_type(&self) -> ValueType;

    /// Member modifiers
    fn modifiers(&self) -> Modifiers {
        Modifiers::PUBLIC
    }

    /// Number of arguments the method takes
    fn arity(&self) -> usize {
        self.parameter_types().len()
    }

    /// Invoke the method on `target`
    fn invoke(&self, target: &Value, args: &[Value]) -> MetaResult<Value>;
}
