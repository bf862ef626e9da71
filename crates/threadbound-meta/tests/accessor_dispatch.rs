//! Integration tests for the synthesized accessor pair
//!
//! Tests cover:
//! - Accessor naming
//! - Dispatch through the method registry
//! - Per-thread values seen through the accessors
//! - Invalid invocations leaving stored values untouched

use std::sync::Arc;
use threadbound_meta::{MetaError, MetaMethod, MethodRegistry, ThreadManagedProperty};
use threadbound_store::thread;
use threadbound_store::{DefaultValue, Value, ValueType};

struct Connection {
    _port: u16,
}

fn connection() -> Value {
    Value::object(Connection { _port: 5432 })
}

fn registry_with(props: &[&ThreadManagedProperty]) -> MethodRegistry {
    let registry = MethodRegistry::new();
    for prop in props {
        registry.register_property(prop).unwrap();
    }
    registry
}

#[test]
fn test_accessor_naming() {
    let active =
        ThreadManagedProperty::new("Connection", "active", ValueType::Bool, DefaultValue::None)
            .unwrap();
    let count =
        ThreadManagedProperty::new("Connection", "count", ValueType::Int, DefaultValue::None)
            .unwrap();

    assert_eq!(active.getter().name(), "isActive");
    assert_eq!(count.getter().name(), "getCount");
    assert_eq!(count.setter().name(), "setCount");
}

#[test]
fn test_dispatch_round_trip() {
    let count = ThreadManagedProperty::new(
        "Connection",
        "count",
        ValueType::Int,
        DefaultValue::value(0i64),
    )
    .unwrap();
    let registry = registry_with(&[&count]);
    let conn = connection();

    assert_eq!(
        registry.invoke("Connection", "getCount", &conn, &[]).unwrap(),
        Value::int(0)
    );
    assert_eq!(
        registry
            .invoke("Connection", "setCount", &conn, &[Value::int(7)])
            .unwrap(),
        Value::int(0)
    );
    assert_eq!(count.get(&conn).unwrap(), Value::int(7));
}

#[test]
fn test_accessor_values_are_per_thread() {
    let count = Arc::new(
        ThreadManagedProperty::new(
            "Connection",
            "count",
            ValueType::Int,
            DefaultValue::value(0i64),
        )
        .unwrap(),
    );
    let conn = connection();
    count.set(&conn, Value::int(1)).unwrap();

    let (prop, target) = (count.clone(), conn.clone());
    let inherited = thread::spawn(move || {
        let seen = prop.get(&target).unwrap();
        prop.set(&target, Value::int(2)).unwrap();
        seen
    })
    .join()
    .unwrap();

    let (prop, target) = (count.clone(), conn.clone());
    let fresh = std::thread::spawn(move || prop.get(&target).unwrap())
        .join()
        .unwrap();

    assert_eq!(inherited, Value::int(1));
    assert_eq!(fresh, Value::int(0));
    assert_eq!(count.get(&conn).unwrap(), Value::int(1));
}

#[test]
fn test_setter_without_arguments_leaves_value() {
    let count = ThreadManagedProperty::new(
        "Connection",
        "count",
        ValueType::Int,
        DefaultValue::value(0i64),
    )
    .unwrap();
    let conn = connection();
    count.set(&conn, Value::int(3)).unwrap();

    let err = count.setter().invoke(&conn, &[]).unwrap_err();
    assert!(matches!(err, MetaError::InvalidArgument(_)));
    assert_eq!(count.get(&conn).unwrap(), Value::int(3));
}

#[test]
fn test_registry_arity_failure_leaves_value() {
    let count = ThreadManagedProperty::new(
        "Connection",
        "count",
        ValueType::Int,
        DefaultValue::value(0i64),
    )
    .unwrap();
    let registry = registry_with(&[&count]);
    let conn = connection();
    count.set(&conn, Value::int(3)).unwrap();

    let err = registry
        .invoke("Connection", "setCount", &conn, &[])
        .unwrap_err();
    assert!(matches!(err, MetaError::InvalidArity { expected: 1, found: 0, .. }));
    assert_eq!(count.get(&conn).unwrap(), Value::int(3));
}

#[test]
fn test_failed_invocation_does_not_touch_other_properties() {
    let count = ThreadManagedProperty::new(
        "Connection",
        "count",
        ValueType::Int,
        DefaultValue::value(0i64),
    )
    .unwrap();
    let label = ThreadManagedProperty::new(
        "Connection",
        "label",
        ValueType::Str,
        DefaultValue::value("primary"),
    )
    .unwrap();
    let conn = connection();
    count.set(&conn, Value::int(1)).unwrap();

    assert!(label.setter().invoke(&conn, &[Value::int(5)]).is_err());
    assert!(label.setter().invoke(&Value::Null, &[Value::str("x")]).is_err());

    assert_eq!(count.get(&conn).unwrap(), Value::int(1));
    assert_eq!(label.get(&conn).unwrap(), Value::str("primary"));
}

#[test]
fn test_lazy_default_per_thread_instance() {
    let buffer = Arc::new(
        ThreadManagedProperty::new(
            "Connection",
            "buffer",
            ValueType::Object,
            DefaultValue::lazy(|| Value::object(Vec::<u8>::with_capacity(64))),
        )
        .unwrap(),
    );
    let conn = connection();

    let here = buffer.get(&conn).unwrap();
    assert_eq!(buffer.get(&conn).unwrap(), here);

    let (prop, target) = (buffer.clone(), conn.clone());
    let there = std::thread::spawn(move || prop.get(&target).unwrap())
        .join()
        .unwrap();

    // Each thread materializes its own instance
    assert_ne!(here, there);
}
