//! Accessor naming convention
//!
//! `count` becomes `getCount` / `setCount`; boolean properties read through
//! `isX` instead of `getX`.

use threadbound_store::ValueType;

const GETTER_PREFIX: &str = "get";
const BOOLEAN_GETTER_PREFIX: &str = "is";
const SETTER_PREFIX: &str = "set";

/// Name of the getter for a property
pub fn getter_name(property: &str, value_type: &ValueType) -> String {
    let prefix = if value_type.is_boolean() {
        BOOLEAN_GETTER_PREFIX
    } else {
        GETTER_PREFIX
    };
    prefixed(prefix, property)
}

/// Name of the setter for a property
pub fn setter_name(property: &str) -> String {
    prefixed(SETTER_PREFIX, property)
}

fn prefixed(prefix: &str, property: &str) -> String {
    let mut chars = property.chars();
    let mut name = String::with_capacity(prefix.len() + property.len());
    name.push_str(prefix);
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}
