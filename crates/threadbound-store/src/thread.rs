//! Inheritance-on-spawn
//!
//! A child thread's mapping starts as a copy of its parent's mapping taken at
//! spawn time. The copy is made on the parent thread, before the child
//! exists, so it never observes the parent mid-write; afterwards the two
//! mappings are fully independent.
//!
//! Threads started with `std::thread::spawn` directly begin with an empty
//! mapping. Foreign spawners (pools, scoped threads) can use
//! [`InheritedContext`] to carry the parent's mapping across by hand.

use crate::context::{self, MappingId, ThreadContext};
use crate::table::PropertyTable;
use std::io;
use std::thread::{JoinHandle, Scope, ScopedJoinHandle};

/// A parent's mapping, captured for installation in another thread
#[derive(Debug)]
pub struct InheritedContext {
    parent: MappingId,
    table: PropertyTable,
}

impl InheritedContext {
    /// Capture the calling thread's mapping
    ///
    /// Honors the mapping's `inherit` option: when disabled, the capture
    /// carries the options but no entries.
    pub fn capture() -> Self {
        context::with_current(|ctx| {
            let table = if ctx.table().options().inherit {
                ctx.table().snapshot()
            } else {
                PropertyTable::with_options(ctx.table().options().clone())
            };
            Self {
                parent: ctx.id(),
                table,
            }
        })
    }

    /// Capture only the calling thread's options
    pub fn detached() -> Self {
        context::with_current(|ctx| Self {
            parent: ctx.id(),
            table: PropertyTable::with_options(ctx.table().options().clone()),
        })
    }

    /// Mapping this capture was taken from
    pub fn parent(&self) -> MappingId {
        self.parent
    }

    /// Number of live entries carried
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if no entries are carried
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Install as the calling thread's mapping, replacing any existing one
    ///
    /// Returns the ID of the new mapping.
    pub fn install(self) -> MappingId {
        let ctx = ThreadContext::inherited(self.parent, self.table);
        let id = ctx.id();
        tracing::trace!(
            mapping = id.as_u64(),
            parent = self.parent.as_u64(),
            entries = ctx.table().entry_count(),
            "installed inherited thread mapping"
        );
        drop(context::replace_current(Some(ctx)));
        id
    }

    /// Run `f` with this capture as the calling thread's mapping
    ///
    /// The thread's previous mapping is restored afterwards, even if `f`
    /// panics.
    pub fn run<R>(self, f: impl FnOnce() -> R) -> R {
        let ctx = ThreadContext::inherited(self.parent, self.table);
        let _restore = RestoreGuard {
            previous: Some(context::replace_current(Some(ctx))),
        };
        f()
    }
}

struct RestoreGuard {
    previous: Option<Option<ThreadContext>>,
}

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        if let Some(previous) = self.previous.take() {
            drop(context::replace_current(previous));
        }
    }
}

/// Thread factory that hands the caller's mapping down to the child
#[derive(Debug)]
pub struct Builder {
    inner: std::thread::Builder,
    inherit: bool,
}

impl Builder {
    /// Create a builder that inherits the caller's mapping
    pub fn new() -> Self {
        Self {
            inner: std::thread::Builder::new(),
            inherit: true,
        }
    }

    /// Name the thread
    pub fn name(mut self, name: String) -> Self {
        self.inner = self.inner.name(name);
        self
    }

    /// Set the thread's stack size in bytes
    pub fn stack_size(mut self, size: usize) -> Self {
        self.inner = self.inner.stack_size(size);
        self
    }

    /// Choose whether the child starts with a copy of the caller's entries
    pub fn inherit(mut self, inherit: bool) -> Self {
        self.inherit = inherit;
        self
    }

    /// Spawn the thread
    pub fn spawn<F, T>(self, f: F) -> io::Result<JoinHandle<T>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let inherited = self.capture();
        self.inner.spawn(move || {
            inherited.install();
            f()
        })
    }

    /// Spawn a scoped thread
    pub fn spawn_scoped<'scope, 'env, F, T>(
        self,
        scope: &'scope Scope<'scope, 'env>,
        f: F,
    ) -> io::Result<ScopedJoinHandle<'scope, T>>
    where
        F: FnOnce() -> T + Send + 'scope,
        T: Send + 'scope,
    {
        let inherited = self.capture();
        self.inner.spawn_scoped(scope, move || {
            inherited.install();
            f()
        })
    }

    fn capture(&self) -> InheritedContext {
        if self.inherit {
            InheritedContext::capture()
        } else {
            InheritedContext::detached()
        }
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a thread that starts with a copy of the caller's mapping
///
/// # Panics
///
/// Panics if the OS fails to create the thread, like `std::thread::spawn`.
pub fn spawn<F, T>(f: F) -> JoinHandle<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    Builder::new().spawn(f).expect("failed to spawn thread")
}

/// ID of the calling thread's mapping
pub fn current_mapping_id() -> MappingId {
    context::with_current(|ctx| ctx.id())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::StoreOptions;
    use crate::store;
    use crate::value::{DefaultValue, Value};

    #[test]
    fn test_child_starts_with_copy() {
        let target = Value::object(0u64);
        store::set(&target, "count", Value::int(1)).unwrap();
        let parent = current_mapping_id();

        let child_target = target.clone();
        let (seen, child_parent) = spawn(move || {
            let mapping = store::current_thread_mapping();
            let seen = store::get(&child_target, "count", &DefaultValue::None).unwrap();
            (seen, mapping.parent())
        })
        .join()
        .unwrap();

        assert_eq!(seen, Value::int(1));
        assert_eq!(child_parent, Some(parent));
    }

    #[test]
    fn test_builder_without_inheritance() {
        let target = Value::object(0u64);
        store::set(&target, "count", Value::int(1)).unwrap();

        let child_target = target.clone();
        let seen = Builder::new()
            .name("detached-child".to_string())
            .inherit(false)
            .spawn(move || store::get(&child_target, "count", &DefaultValue::None).unwrap())
            .unwrap()
            .join()
            .unwrap();

        assert_eq!(seen, Value::Null);
    }

    #[test]
    fn test_inherit_option_is_propagated() {
        spawn(|| {
            store::configure_current_thread(StoreOptions::without_inheritance());
            let target = Value::object(0u64);
            store::set(&target, "count", Value::int(1)).unwrap();

            let child_target = target.clone();
            let (seen, options) = spawn(move || {
                (
                    store::get(&child_target, "count", &DefaultValue::None).unwrap(),
                    store::current_options(),
                )
            })
            .join()
            .unwrap();

            assert_eq!(seen, Value::Null);
            assert!(!options.inherit);
        })
        .join()
        .unwrap();
    }

    #[test]
    fn test_scoped_spawn() {
        let target = Value::object(0u64);
        store::set(&target, "count", Value::int(5)).unwrap();

        let seen = std::thread::scope(|scope| {
            Builder::new()
                .spawn_scoped(scope, || {
                    store::get(&target, "count", &DefaultValue::None).unwrap()
                })
                .unwrap()
                .join()
                .unwrap()
        });

        assert_eq!(seen, Value::int(5));
    }

    #[test]
    fn test_run_restores_previous_mapping() {
        let target = Value::object(0u64);
        store::set(&target, "count", Value::int(1)).unwrap();
        let before = current_mapping_id();

        let inherited = std::thread::spawn(InheritedContext::capture)
            .join()
            .unwrap();
        assert!(inherited.is_empty());

        let inside = inherited.run(|| {
            (
                current_mapping_id(),
                store::get(&target, "count", &DefaultValue::None).unwrap(),
            )
        });

        assert_ne!(inside.0, before);
        assert_eq!(inside.1, Value::Null);
        assert_eq!(current_mapping_id(), before);
        assert_eq!(
            store::get(&target, "count", &DefaultValue::None).unwrap(),
            Value::int(1)
        );
    }
}
