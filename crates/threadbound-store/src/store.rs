//! Thread-scoped value store
//!
//! Every operation works on the calling thread's private mapping only; no
//! operation takes a lock shared with other threads.

use crate::context::{self, MappingSnapshot};
use crate::options::StoreOptions;
use crate::table::PropertyTable;
use crate::value::{DefaultValue, ObjectRef, Value};
use crate::{StoreError, StoreResult};

/// Get the calling thread's value of `target.name`
///
/// An unwritten slot is populated with the materialized default, which is
/// then returned by every later read on this thread until overwritten.
pub fn get(target: &Value, name: &str, default: &DefaultValue) -> StoreResult<Value> {
    get_or_insert_with(target, name, || default.materialize())
}

/// Get the calling thread's value of `target.name`, initializing it with `init`
///
/// `init` runs outside the mapping borrow, so it may use the store itself.
/// If it stores a value into the same slot, that value wins.
pub fn get_or_insert_with<F>(target: &Value, name: &str, init: F) -> StoreResult<Value>
where
    F: FnOnce() -> Value,
{
    let object = target_object(target)?;
    validate_property_name(name)?;

    if let Some(value) = context::with_current(|ctx| ctx.table().get(object, name).cloned()) {
        return Ok(value);
    }

    let initial = init();
    tracing::trace!(target_id = %object.identity(), property = name, "materialized default");
    let (current, rejected) =
        context::with_current(|ctx| ctx.table_mut().insert_if_absent(object, name, initial));
    drop(rejected);
    Ok(current)
}

/// Set the calling thread's value of `target.name`
///
/// Returns the value previously stored on this thread, if any.
///
/// The value is held strongly. Storing a value that refers back to `target`
/// keeps `target` alive until the entry is removed, the mapping is cleared,
/// or the thread exits.
pub fn set(target: &Value, name: &str, value: Value) -> StoreResult<Option<Value>> {
    let object = target_object(target)?;
    validate_property_name(name)?;
    Ok(context::with_current(|ctx| {
        ctx.table_mut().insert(object, name, value)
    }))
}

/// Forget the calling thread's value of `target.name`
///
/// The next read materializes the default again.
pub fn remove(target: &Value, name: &str) -> StoreResult<Option<Value>> {
    let object = target_object(target)?;
    validate_property_name(name)?;
    Ok(context::with_current(|ctx| ctx.table_mut().remove(object, name)))
}

/// Check if the calling thread has a value for `target.name`
pub fn contains(target: &Value, name: &str) -> StoreResult<bool> {
    let object = target_object(target)?;
    validate_property_name(name)?;
    Ok(context::with_current(|ctx| ctx.table().contains(object, name)))
}

/// Snapshot of the calling thread's mapping, creating the mapping if needed
pub fn current_thread_mapping() -> MappingSnapshot {
    context::with_current(|ctx| MappingSnapshot::of(ctx))
}

/// Run `f` with direct access to the calling thread's mapping
///
/// `f` must not call back into the store.
pub fn with_current_mapping<R>(f: impl FnOnce(&mut PropertyTable) -> R) -> R {
    context::with_current(|ctx| f(ctx.table_mut()))
}

/// Evict dead entries from the calling thread's mapping
pub fn sweep() -> usize {
    context::with_current(|ctx| ctx.table_mut().sweep())
}

/// Remove every entry from the calling thread's mapping
pub fn clear() {
    let drained = context::with_current(|ctx| ctx.table_mut().clear());
    drop(drained);
}

/// Replace the options of the calling thread's mapping
///
/// Existing entries are kept and rehashed. Threads spawned afterwards
/// inherit the new options.
pub fn configure_current_thread(options: StoreOptions) {
    context::with_current(|ctx| {
        tracing::debug!(mapping = ctx.id().as_u64(), ?options, "reconfigured thread mapping");
        ctx.table_mut().reconfigure(options);
    });
}

/// Options of the calling thread's mapping
pub fn current_options() -> StoreOptions {
    context::with_current(|ctx| ctx.table().options().clone())
}

/// Check that `name` is usable as a property name
///
/// Names must be non-empty identifiers: a letter or `_`, followed by letters,
/// digits or `_`.
pub fn validate_property_name(name: &str) -> StoreResult<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_alphabetic() || first == '_')
                && chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidArgument(format!(
            "invalid property name {:?}",
            name
        )))
    }
}

fn target_object(target: &Value) -> StoreResult<&ObjectRef> {
    match target {
        Value::Object(object) => Ok(object),
        Value::Null => Err(StoreError::InvalidArgument(
            "target object is null".to_string(),
        )),
        other => Err(StoreError::InvalidArgument(format!(
            "target has no object identity: {:?}",
            other
        ))),
    }
}
