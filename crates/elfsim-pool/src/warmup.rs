//! Startup warmup plans.

use elfsim_types::Archetype;
use serde::Deserialize;
use tracing::{debug, info};

use crate::pool::{Instantiator, ObjectPool};

/// Pre-create `count` instances of one archetype.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WarmupEntry {
    /// Archetype to pre-create. Entries with an empty name are skipped.
    pub archetype: Archetype,
    /// How many instances to create. Zero is skipped.
    #[serde(default)]
    pub count: usize,
}

/// Ordered list of warmup entries applied once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct WarmupPlan {
    /// Entries in application order.
    pub entries: Vec<WarmupEntry>,
}

/// Outcome of applying a [`WarmupPlan`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WarmupReport {
    /// Sum of the counts of the entries that were applied.
    pub requested: usize,
    /// Instances actually created.
    pub created: usize,
    /// Entries skipped for an empty archetype or a zero count.
    pub skipped: usize,
}

impl WarmupPlan {
    /// Build a plan from `(archetype, count)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (Archetype, usize)>) -> Self {
        Self {
            entries: entries
                .into_iter()
                .map(|(archetype, count)| WarmupEntry { archetype, count })
                .collect(),
        }
    }

    /// Apply every entry to `pool`, in order.
    pub fn apply<I: Instantiator>(&self, pool: &mut ObjectPool<I>) -> WarmupReport {
        let mut report = WarmupReport::default();
        for entry in &self.entries {
            if entry.archetype.as_str().is_empty() || entry.count == 0 {
                debug!(archetype = %entry.archetype, count = entry.count, "Warmup entry skipped");
                report.skipped = report.skipped.saturating_add(1);
                continue;
            }
            let created = pool.warmup(&entry.archetype, entry.count);
            report.requested = report.requested.saturating_add(entry.count);
            report.created = report.created.saturating_add(created);
        }
        info!(
            requested = report.requested,
            created = report.created,
            skipped = report.skipped,
            total = pool.total(),
            "Pool warmup complete"
        );
        report
    }
}
