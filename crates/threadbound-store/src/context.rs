//! Thread contexts
//!
//! Each thread owns at most one `ThreadContext`, stored in thread-local
//! storage and created lazily on first access. Contexts are never registered
//! anywhere else: when the thread exits, its context and every entry in it
//! go away with the thread's TLS.

use crate::options::StoreOptions;
use crate::table::PropertyTable;
use crate::value::{ObjectRef, Value};
use std::cell::RefCell;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier of a thread's mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MappingId(u64);

impl MappingId {
    /// Create a new unique mapping ID
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        MappingId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for MappingId {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread's private property mapping
#[derive(Debug)]
pub struct ThreadContext {
    id: MappingId,
    parent: Option<MappingId>,
    table: PropertyTable,
}

impl ThreadContext {
    /// Create an empty context
    pub fn new(options: StoreOptions) -> Self {
        Self {
            id: MappingId::new(),
            parent: None,
            table: PropertyTable::with_options(options),
        }
    }

    /// Create a context seeded with a parent's snapshot
    pub fn inherited(parent: MappingId, table: PropertyTable) -> Self {
        Self {
            id: MappingId::new(),
            parent: Some(parent),
            table,
        }
    }

    /// Get the mapping ID
    pub fn id(&self) -> MappingId {
        self.id
    }

    /// Mapping this one was inherited from, if any
    pub fn parent(&self) -> Option<MappingId> {
        self.parent
    }

    /// Get the property table
    pub fn table(&self) -> &PropertyTable {
        &self.table
    }

    /// Get a mutable reference to the property table
    pub fn table_mut(&mut self) -> &mut PropertyTable {
        &mut self.table
    }
}

thread_local! {
    static CURRENT: RefCell<Option<ThreadContext>> = const { RefCell::new(None) };
}

/// Run `f` against the calling thread's context, creating it if needed
///
/// Entries evicted while `f` runs are dropped after the context borrow is
/// released. During TLS teardown `f` runs against a transient empty context.
pub(crate) fn with_current<R>(f: impl FnOnce(&mut ThreadContext) -> R) -> R {
    let mut f = Some(f);
    let attempt = CURRENT.try_with(|slot| {
        let f = f.take()?;
        let (result, evicted) = {
            let mut slot = slot.borrow_mut();
            let ctx = slot.get_or_insert_with(|| {
                let ctx = ThreadContext::new(StoreOptions::default());
                tracing::trace!(mapping = ctx.id.as_u64(), "created thread mapping");
                ctx
            });
            let result = f(ctx);
            (result, ctx.table.take_graveyard())
        };
        drop(evicted);
        Some(result)
    });

    match (attempt, f.take()) {
        (Ok(Some(result)), _) => result,
        (_, Some(f)) => {
            tracing::warn!(
                "thread mapping accessed during thread teardown, using a transient mapping"
            );
            let mut transient = ThreadContext::new(StoreOptions::default());
            f(&mut transient)
        }
        (_, None) => unreachable!("context closure consumed without a result"),
    }
}

/// Install `ctx` as the calling thread's context, returning the previous one
pub(crate) fn replace_current(ctx: Option<ThreadContext>) -> Option<ThreadContext> {
    CURRENT
        .try_with(|slot| std::mem::replace(&mut *slot.borrow_mut(), ctx))
        .unwrap_or_else(|_| {
            tracing::warn!("cannot install thread mapping during thread teardown");
            None
        })
}

/// Read-only copy of a thread's mapping
#[derive(Debug, Clone)]
pub struct MappingSnapshot {
    id: MappingId,
    parent: Option<MappingId>,
    table: PropertyTable,
}

impl MappingSnapshot {
    pub(crate) fn of(ctx: &ThreadContext) -> Self {
        Self {
            id: ctx.id,
            parent: ctx.parent,
            table: ctx.table.snapshot(),
        }
    }

    /// ID of the mapping this snapshot was taken from
    pub fn id(&self) -> MappingId {
        self.id
    }

    /// Mapping the source was inherited from, if any
    pub fn parent(&self) -> Option<MappingId> {
        self.parent
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the snapshot has no live entries
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Value stored for `object.name`
    pub fn get(&self, object: &ObjectRef, name: &str) -> Option<&Value> {
        self.table.get(object, name)
    }

    /// Check if a value is stored for `object.name`
    pub fn contains(&self, object: &ObjectRef, name: &str) -> bool {
        self.table.contains(object, name)
    }

    /// Options of the source mapping
    pub fn options(&self) -> &StoreOptions {
        self.table.options()
    }
}
