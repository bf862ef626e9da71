//! Object identity
//!
//! Entries are keyed by the identity of the target object, derived from the
//! address of its shared allocation. Identity codes are a lossy hash of that
//! address and may collide; callers must always confirm a match with a full
//! identity comparison.

use rustc_hash::FxHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Runtime identity of an object (address of its shared allocation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(usize);

impl ObjectId {
    pub(crate) const fn from_addr(addr: usize) -> Self {
        ObjectId(addr)
    }

    /// Get the raw address
    pub fn addr(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Lossy identity hash used to pick a bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityCode(u32);

impl IdentityCode {
    /// Compute the identity code of an object, keeping the low `bits` bits
    ///
    /// `bits` is clamped to 32. With `bits == 0` every object maps to the
    /// same code.
    pub fn of(id: ObjectId, bits: u32) -> Self {
        let mut hasher = FxHasher::default();
        id.addr().hash(&mut hasher);
        let full = hasher.finish();
        let folded = (full ^ (full >> 32)) as u32;
        IdentityCode(folded & Self::mask(bits))
    }

    /// Get the raw code
    pub fn as_u32(&self) -> u32 {
        self.0
    }

    fn mask(bits: u32) -> u32 {
        if bits >= 32 {
            u32::MAX
        } else {
            (1u32 << bits) - 1
        }
    }
}
