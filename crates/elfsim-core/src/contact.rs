//! Contact de-duplication.
//!
//! Overlap detectors report contacts from both sides and on every tick the
//! overlap persists. A collision must be resolved once per unordered pair
//! per overlap event, so contacts are normalised into [`ContactPair`]s and
//! filtered through an [`OverlapTracker`] that only reports new overlaps.

use std::collections::BTreeSet;

use elfsim_types::ElfId;

/// Whether the side `own` should resolve a contact with `other`.
///
/// Exactly one side of a mutual contact gets `true`: the one with the
/// lower identity. Self-contact never resolves.
pub fn should_resolve(own: ElfId, other: ElfId) -> bool {
    own < other
}

/// Unordered pair of distinct elves, stored lower identity first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactPair {
    low: ElfId,
    high: ElfId,
}

impl ContactPair {
    /// Normalise a contact between `a` and `b`. Returns `None` for
    /// self-contact.
    pub fn new(a: ElfId, b: ElfId) -> Option<Self> {
        match a.cmp(&b) {
            core::cmp::Ordering::Less => Some(Self { low: a, high: b }),
            core::cmp::Ordering::Greater => Some(Self { low: b, high: a }),
            core::cmp::Ordering::Equal => None,
        }
    }

    /// The elf with the lower identity: the resolving side.
    pub const fn low(&self) -> ElfId {
        self.low
    }

    /// The elf with the higher identity.
    pub const fn high(&self) -> ElfId {
        self.high
    }

    /// Whether `id` is one of the two elves.
    pub fn involves(&self, id: ElfId) -> bool {
        self.low == id || self.high == id
    }
}

/// Tracks which pairs overlapped on the previous tick.
#[derive(Debug, Clone, Default)]
pub struct OverlapTracker {
    active: BTreeSet<ContactPair>,
}

impl OverlapTracker {
    /// Create a tracker with no active overlaps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active set with this tick's overlaps and return the
    /// pairs that were not overlapping last tick, in identity order.
    pub fn update(&mut self, current: impl IntoIterator<Item = ContactPair>) -> Vec<ContactPair> {
        let current: BTreeSet<ContactPair> = current.into_iter().collect();
        let entered = current.difference(&self.active).copied().collect();
        self.active = current;
        entered
    }

    /// Drop every active pair involving `id`, e.g. after it despawned.
    pub fn forget(&mut self, id: ElfId) {
        self.active.retain(|pair| !pair.involves(id));
    }

    /// Whether `pair` overlapped on the last update.
    pub fn is_active(&self, pair: &ContactPair) -> bool {
        self.active.contains(pair)
    }

    /// Number of pairs overlapping on the last update.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }
}
