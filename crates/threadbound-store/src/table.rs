//! Per-thread property table
//!
//! # Layout
//!
//! ```text
//! property name ──► identity code ──► bucket [ (weak target, value), ... ]
//! ```
//!
//! The identity code only narrows the search. Entries inside a bucket are
//! matched by full object identity, so two objects whose codes collide keep
//! separate values.
//!
//! Entries hold their target weakly. A dropped target leaves a dead entry
//! behind that lookups skip; dead entries are evicted when their bucket is
//! written to and by periodic sweeps. Evicted entries are parked in a
//! graveyard so the owner can drop them after releasing its borrow of the
//! table (dropping a value may run arbitrary user code).
//!
//! Values are held strongly. A value that refers back to its own target
//! (directly or through other objects) keeps that target alive, and the
//! entry is only released when it is removed or the mapping is cleared or
//! dropped.

use crate::identity::IdentityCode;
use crate::options::StoreOptions;
use crate::value::{ObjectRef, Value, WeakObjectRef};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// A weakly held (target, value) pair
#[derive(Debug, Clone)]
pub struct Entry {
    target: WeakObjectRef,
    value: Value,
}

impl Entry {
    /// Handle to the target object
    pub fn target(&self) -> &WeakObjectRef {
        &self.target
    }

    /// Stored value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Check if the target object is still alive
    pub fn is_alive(&self) -> bool {
        self.target.is_alive()
    }
}

type Bucket = Vec<Entry>;
type Slots = FxHashMap<Arc<str>, FxHashMap<IdentityCode, Bucket>>;

/// Mapping from (object identity, property name) to value
#[derive(Debug, Clone, Default)]
pub struct PropertyTable {
    slots: Slots,
    options: StoreOptions,
    writes_since_sweep: usize,
    graveyard: Vec<Entry>,
}

impl PropertyTable {
    /// Create an empty table with default options
    pub fn new() -> Self {
        Self::with_options(StoreOptions::default())
    }

    /// Create an empty table with specific options
    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            slots: FxHashMap::default(),
            options,
            writes_since_sweep: 0,
            graveyard: Vec::new(),
        }
    }

    /// Get the table options
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Get the value stored for `object.name`
    pub fn get(&self, object: &ObjectRef, name: &str) -> Option<&Value> {
        self.entry(object, name).map(Entry::value)
    }

    /// Check if a value is stored for `object.name`
    pub fn contains(&self, object: &ObjectRef, name: &str) -> bool {
        self.entry(object, name).is_some()
    }

    /// Store a value, returning the one it replaces
    pub fn insert(&mut self, object: &ObjectRef, name: &str, value: Value) -> Option<Value> {
        let code = self.code_of(object);
        let bucket = Self::bucket_mut(&mut self.slots, name, code);
        Self::evict_dead(bucket, &mut self.graveyard);

        let previous = match bucket.iter_mut().find(|e| e.target.is(object)) {
            Some(entry) => Some(std::mem::replace(&mut entry.value, value)),
            None => {
                bucket.push(Entry {
                    target: object.downgrade(),
                    value,
                });
                None
            }
        };

        self.note_write();
        previous
    }

    /// Store `value` unless a value is already present
    ///
    /// Returns the current value, and `value` itself when it was rejected so
    /// the caller decides where it is dropped.
    pub fn insert_if_absent(
        &mut self,
        object: &ObjectRef,
        name: &str,
        value: Value,
    ) -> (Value, Option<Value>) {
        if let Some(existing) = self.get(object, name) {
            return (existing.clone(), Some(value));
        }
        let current = value.clone();
        self.insert(object, name, value);
        (current, None)
    }

    /// Forget the value stored for `object.name`
    pub fn remove(&mut self, object: &ObjectRef, name: &str) -> Option<Value> {
        let code = self.code_of(object);
        let by_code = self.slots.get_mut(name)?;
        let bucket = by_code.get_mut(&code)?;
        let index = bucket.iter().position(|e| e.target.is(object))?;
        let removed = bucket.swap_remove(index);

        if bucket.is_empty() {
            by_code.remove(&code);
        }
        if by_code.is_empty() {
            self.slots.remove(name);
        }

        self.note_write();
        Some(removed.value)
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.entries().filter(|e| e.is_alive()).count()
    }

    /// Check if the table has no live entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of entries including dead ones not yet swept
    pub fn entry_count(&self) -> usize {
        self.entries().count()
    }

    /// Iterate over live entries with their property names
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> + '_ {
        self.slots.iter().flat_map(|(name, by_code)| {
            by_code
                .values()
                .flatten()
                .filter(|e| e.is_alive())
                .map(move |e| (name.as_ref(), e))
        })
    }

    /// Evict every dead entry, returning how many were evicted
    pub fn sweep(&mut self) -> usize {
        let before = self.graveyard.len();

        for by_code in self.slots.values_mut() {
            for bucket in by_code.values_mut() {
                Self::evict_dead(bucket, &mut self.graveyard);
            }
            by_code.retain(|_, bucket| !bucket.is_empty());
        }
        self.slots.retain(|_, by_code| !by_code.is_empty());
        self.writes_since_sweep = 0;

        let removed = self.graveyard.len() - before;
        if removed > 0 {
            tracing::debug!(removed, remaining = self.entry_count(), "swept dead property entries");
        }
        removed
    }

    /// Take the entries evicted since the last call
    pub fn take_graveyard(&mut self) -> Vec<Entry> {
        std::mem::take(&mut self.graveyard)
    }

    /// Remove every entry, returning them
    pub fn clear(&mut self) -> Vec<Entry> {
        let mut drained: Vec<Entry> = self
            .slots
            .drain()
            .flat_map(|(_, by_code)| by_code.into_values().flatten())
            .collect();
        drained.append(&mut self.graveyard);
        self.writes_since_sweep = 0;
        drained
    }

    /// Copy the live entries into a fresh table with the same options
    pub fn snapshot(&self) -> PropertyTable {
        let mut copy = PropertyTable::with_options(self.options.clone());
        for (name, by_code) in &self.slots {
            for (code, bucket) in by_code {
                let live: Bucket = bucket.iter().filter(|e| e.is_alive()).cloned().collect();
                if !live.is_empty() {
                    copy.slots.entry(name.clone()).or_default().insert(*code, live);
                }
            }
        }
        copy
    }

    /// Replace the options, rehashing every live entry
    pub fn reconfigure(&mut self, options: StoreOptions) {
        let bits = options.effective_identity_bits();
        let old = std::mem::take(&mut self.slots);
        self.options = options;

        for (name, by_code) in old {
            for entry in by_code.into_values().flatten() {
                if !entry.is_alive() {
                    self.graveyard.push(entry);
                    continue;
                }
                let code = IdentityCode::of(entry.target.id(), bits);
                self.slots
                    .entry(name.clone())
                    .or_default()
                    .entry(code)
                    .or_default()
                    .push(entry);
            }
        }
        self.writes_since_sweep = 0;
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.slots.values().flat_map(|by_code| by_code.values().flatten())
    }

    fn entry(&self, object: &ObjectRef, name: &str) -> Option<&Entry> {
        let code = self.code_of(object);
        self.slots
            .get(name)?
            .get(&code)?
            .iter()
            .find(|e| e.target.is(object))
    }

    fn code_of(&self, object: &ObjectRef) -> IdentityCode {
        IdentityCode::of(object.identity(), self.options.effective_identity_bits())
    }

    fn note_write(&mut self) {
        if !self.options.sweeps_automatically() {
            return;
        }
        self.writes_since_sweep += 1;
        if self.writes_since_sweep >= self.options.sweep_interval {
            self.sweep();
        }
    }

    fn bucket_mut<'a>(slots: &'a mut Slots, name: &str, code: IdentityCode) -> &'a mut Bucket {
        if !slots.contains_key(name) {
            slots.insert(Arc::from(name), FxHashMap::default());
        }
        match slots.get_mut(name) {
            Some(by_code) => by_code.entry(code).or_default(),
            None => unreachable!("property slot inserted above"),
        }
    }

    fn evict_dead(bucket: &mut Bucket, graveyard: &mut Vec<Entry>) {
        let mut i = 0;
        while i < bucket.len() {
            if bucket[i].is_alive() {
                i += 1;
            } else {
                graveyard.push(bucket.swap_remove(i));
            }
        }
    }
}
