//! Per-thread store options

/// Options for a thread's property mapping
///
/// Options are applied per thread and travel with the inherited snapshot
/// into spawned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Mutating operations between automatic sweeps of dead entries (0 = never)
    pub sweep_interval: usize,

    /// Bits of the identity code used to select a bucket (clamped to 32)
    pub identity_bits: u32,

    /// Whether spawned children start with a copy of this mapping
    pub inherit: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            sweep_interval: 64,
            identity_bits: 32,
            inherit: true,
        }
    }
}

impl StoreOptions {
    /// Create options with a specific sweep interval
    pub fn with_sweep_interval(sweep_interval: usize) -> Self {
        Self {
            sweep_interval,
            ..Default::default()
        }
    }

    /// Create options with a specific identity code width
    pub fn with_identity_bits(identity_bits: u32) -> Self {
        Self {
            identity_bits,
            ..Default::default()
        }
    }

    /// Create options that do not hand the mapping down to children
    pub fn without_inheritance() -> Self {
        Self {
            inherit: false,
            ..Default::default()
        }
    }

    /// Identity code width actually used
    pub fn effective_identity_bits(&self) -> u32 {
        self.identity_bits.min(32)
    }

    /// Check if automatic sweeping is enabled
    pub fn sweeps_automatically(&self) -> bool {
        self.sweep_interval > 0
    }
}
